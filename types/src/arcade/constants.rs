/// Maximum username length stored in a session record
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Balance granted to a session that has never been saved
pub const STARTING_BALANCE: u64 = 10_000;

/// Gems granted to a session that has never been saved
pub const STARTING_GEMS: u64 = 0;

/// Level of a fresh session
pub const STARTING_LEVEL: u32 = 1;

/// Number of recent outcomes remembered per mode
pub const STREAK_HISTORY_LEN: usize = 10;

/// Mines board is a 5x5 grid
pub const MINES_GRID_SIZE: u8 = 25;

/// At least one safe tile must remain on a Mines board
pub const MAX_MINES: u8 = MINES_GRID_SIZE - 1;

/// Rows on a Towers board
pub const TOWER_ROWS: usize = 8;

/// Gems awarded for revealing the Towers jackpot tile
pub const TOWERS_JACKPOT_GEMS: u64 = 5;

/// Keno numbers are drawn from 1..=KENO_POOL_SIZE
pub const KENO_POOL_SIZE: u8 = 25;

/// Maximum numbers a player may pick in Keno
pub const KENO_MAX_PICKS: usize = 7;

/// Numbers drawn per Keno round
pub const KENO_DRAWS: usize = 9;

/// Cards in a Hilo deck (13 ranks x 4 suits)
pub const DECK_SIZE: u8 = 52;

/// Supported Plinko row counts
pub const PLINKO_ROW_COUNTS: [u8; 4] = [7, 9, 11, 13];
