//! Helpers for driving engines in tests.

use arcade_types::{
    arcade::{MINES_GRID_SIZE, TOWER_ROWS},
    EngineConfig,
};

use crate::{
    games::{Mines, Towers},
    session::Session,
    state::Memory,
};

/// Opens a session backed by an empty in-memory store.
pub async fn create_session(id: &str, seed: u64) -> Session<Memory> {
    create_session_with(id, seed, EngineConfig::default()).await
}

pub async fn create_session_with(id: &str, seed: u64, config: EngineConfig) -> Session<Memory> {
    Session::open(Memory::default(), id, config, Some(seed)).await
}

/// Tiles without a mine in the active round, in board order.
pub fn safe_tiles(mines: &Mines) -> Vec<u8> {
    let bombs = mines.peek_mines();
    (0..MINES_GRID_SIZE)
        .filter(|tile| !bombs.contains(tile))
        .collect()
}

/// One safe column per row of the active round, bottom row first.
pub fn safe_path(towers: &Towers) -> Vec<u8> {
    let columns = towers.difficulty().columns();
    let bombs = towers.peek_bombs();
    (0..TOWER_ROWS)
        .map(|row| {
            (0..columns)
                .find(|column| !bombs[row].contains(column))
                .unwrap_or(0)
        })
        .collect()
}
