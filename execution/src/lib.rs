pub mod autobet;
pub mod games;
pub mod odds;
pub mod session;
pub mod streak;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod state;

pub use autobet::{AutoBetPlan, AutoBetSummary, AutoPlay, CancelHandle, StopReason};
pub use games::{RoundEngine, SettlementReport, StepResult};
pub use session::{Games, Session};
pub use state::{Memory, Store};
