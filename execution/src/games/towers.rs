//! Towers implementation.
//!
//! The player climbs `TOWER_ROWS` rows, picking one tile per row. Every row
//! hides `difficulty.bombs()` bombs among `difficulty.columns()` tiles. One
//! safe tile per round is a jackpot tile that awards gems when picked.

use arcade_types::{
    arcade::{
        BalanceLedger, Difficulty, GameMode, InvalidBet, Outcome, Phase, RoundError,
        StreakState, TOWER_ROWS,
    },
    config::TowersConfig,
};
use tracing::{debug, info};

use super::{RoundCore, RoundEngine, SettlementReport, StepResult};
use crate::{odds, streak};

/// Widest row any difficulty uses.
const MAX_COLUMNS: usize = 3;

/// Snapshot of a Towers round. `bombs` and `jackpot` are only filled once the
/// round is resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct TowersView {
    pub phase: Phase,
    pub bet: u64,
    pub difficulty: Difficulty,
    /// Row the next pick goes into (0 is the bottom row).
    pub current_row: usize,
    /// Column picked in each cleared row (and the losing pick, if any).
    pub picks: Vec<u8>,
    pub multipliers: [f64; TOWER_ROWS],
    pub multiplier: f64,
    pub bombs: Option<Vec<Vec<u8>>>,
    pub jackpot: Option<(usize, u8)>,
    pub jackpot_found: bool,
}

pub struct Towers {
    core: RoundCore,
    config: TowersConfig,
    difficulty: Difficulty,
    grid: [[bool; MAX_COLUMNS]; TOWER_ROWS],
    jackpot: (usize, u8),
    jackpot_found: bool,
    picks: Vec<u8>,
    row: usize,
    multipliers: [f64; TOWER_ROWS],
}

impl Towers {
    pub fn new(config: TowersConfig, seed: u64, streak: StreakState) -> Self {
        let difficulty = config.default_difficulty;
        Self {
            core: RoundCore::new(GameMode::Towers, seed, streak),
            multipliers: odds::tower_multipliers(difficulty, config.house_edge),
            config,
            difficulty,
            grid: [[false; MAX_COLUMNS]; TOWER_ROWS],
            jackpot: (0, 0),
            jackpot_found: false,
            picks: Vec::new(),
            row: 0,
        }
    }

    /// Set the difficulty for the next round.
    pub fn configure(&mut self, difficulty: Difficulty) -> Result<(), RoundError> {
        self.core
            .require_betting("difficulty can only change between rounds")?;
        self.difficulty = difficulty;
        self.multipliers = odds::tower_multipliers(difficulty, self.config.house_edge);
        Ok(())
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn current_row(&self) -> usize {
        self.row
    }

    pub fn current_multiplier(&self) -> f64 {
        match self.row {
            0 => 1.0,
            row => self.multipliers[row - 1],
        }
    }

    /// Pick a tile in the current row.
    pub fn reveal_row(
        &mut self,
        ledger: &mut BalanceLedger,
        column: u8,
    ) -> Result<StepResult, RoundError> {
        self.core.require_active("no active round")?;
        if column >= self.difficulty.columns() {
            return Err(RoundError::IllegalState("column is off the tower"));
        }
        let row = self.row;
        self.picks.push(column);

        if self.grid[row][column as usize] {
            debug!(row, column, "bomb revealed");
            let report = self.core.settle(ledger, Outcome::Lost, 0.0, streak::NO_BONUS);
            return Ok(StepResult::Settled(report));
        }

        if self.jackpot == (row, column) {
            ledger.award_gems(self.config.jackpot_gems);
            self.jackpot_found = true;
            info!(row, column, gems = self.config.jackpot_gems, "jackpot tile found");
        }
        self.row += 1;

        let multiplier = self.current_multiplier();
        debug!(row, column, multiplier, "row cleared");
        if self.row == TOWER_ROWS {
            return Ok(StepResult::Settled(self.settle_win(ledger)));
        }
        Ok(StepResult::Continue { multiplier })
    }

    fn settle_win(&mut self, ledger: &mut BalanceLedger) -> SettlementReport {
        let bonus = streak::towers_bonus(&self.core.streak, self.difficulty, &self.config);
        let multiplier = self.current_multiplier();
        self.core.settle(ledger, Outcome::Won, multiplier, bonus)
    }

    /// Check that `selection` (one column per row, bottom first) fits the tower.
    pub fn check_selection(&self, selection: &[u8]) -> Result<(), InvalidBet> {
        if selection.is_empty() {
            return Err(InvalidBet::EmptySelection);
        }
        if selection.len() > TOWER_ROWS
            || selection
                .iter()
                .any(|column| *column >= self.difficulty.columns())
        {
            return Err(InvalidBet::InvalidSelection);
        }
        Ok(())
    }

    fn bomb_columns(&self) -> Vec<Vec<u8>> {
        let columns = self.difficulty.columns();
        self.grid
            .iter()
            .map(|row| (0..columns).filter(|c| row[*c as usize]).collect())
            .collect()
    }

    pub fn view(&self) -> TowersView {
        let resolved = self.core.phase.is_resolved();
        TowersView {
            phase: self.core.phase,
            bet: self.core.bet,
            difficulty: self.difficulty,
            current_row: self.row,
            picks: self.picks.clone(),
            multipliers: self.multipliers,
            multiplier: self.current_multiplier(),
            bombs: resolved.then(|| self.bomb_columns()),
            jackpot: resolved.then_some(self.jackpot),
            jackpot_found: self.jackpot_found,
        }
    }

    /// Bomb columns of every row in the active round.
    #[cfg(any(test, feature = "mocks"))]
    pub fn peek_bombs(&self) -> Vec<Vec<u8>> {
        self.bomb_columns()
    }

    #[cfg(any(test, feature = "mocks"))]
    pub fn peek_jackpot(&self) -> (usize, u8) {
        self.jackpot
    }
}

impl RoundEngine for Towers {
    fn mode(&self) -> GameMode {
        GameMode::Towers
    }

    fn phase(&self) -> Phase {
        self.core.phase
    }

    fn place_bet(&mut self, ledger: &mut BalanceLedger, amount: u64) -> Result<(), RoundError> {
        let mut rng = self.core.begin(ledger, amount)?;
        let columns = self.difficulty.columns();
        let bombs = self.difficulty.bombs() as usize;

        self.grid = [[false; MAX_COLUMNS]; TOWER_ROWS];
        for row in self.grid.iter_mut() {
            for column in rng.sample(columns, bombs) {
                row[column as usize] = true;
            }
        }

        // Jackpot sits on a random safe tile of a random row
        let jackpot_row = rng.next_bounded(TOWER_ROWS as u8) as usize;
        let safe: Vec<u8> = (0..columns)
            .filter(|c| !self.grid[jackpot_row][*c as usize])
            .collect();
        let jackpot_column = safe[rng.next_bounded(safe.len() as u8) as usize];
        self.jackpot = (jackpot_row, jackpot_column);
        self.jackpot_found = false;

        self.picks.clear();
        self.row = 0;
        self.multipliers = odds::tower_multipliers(self.difficulty, self.config.house_edge);
        Ok(())
    }

    fn cashout(&mut self, ledger: &mut BalanceLedger) -> Result<SettlementReport, RoundError> {
        self.core.require_active("no active round")?;
        if self.row == 0 {
            return Err(RoundError::IllegalState("clear a row before cashing out"));
        }
        Ok(self.settle_win(ledger))
    }

    fn finish(&mut self) -> Result<(), RoundError> {
        self.core.finish()
    }

    fn streak(&self) -> &StreakState {
        &self.core.streak
    }

    fn settlements(&self) -> u64 {
        self.core.settled
    }
}
