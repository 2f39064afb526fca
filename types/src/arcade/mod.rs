//! Arcade domain types.
//!
//! Defines game modes, round phases, the balance ledger, streak state and the
//! persisted session record used by the execution layer.

mod codec;
mod constants;
mod error;
mod game;
mod ledger;
mod record;
mod streak;

pub use codec::{read_string, string_encode_size, write_string};
pub use constants::*;
pub use error::*;
pub use game::*;
pub use ledger::*;
pub use record::*;
pub use streak::*;
