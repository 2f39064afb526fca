//! Mines implementation.
//!
//! A 5x5 board hides a configurable number of mines. Every safe reveal raises
//! the multiplier; revealing a mine loses the stake. The player may cash out
//! after the first safe reveal, and clearing every safe cell wins automatically.

use arcade_types::{
    arcade::{
        BalanceLedger, GameMode, InvalidBet, Outcome, Phase, RoundError, StreakState, MAX_MINES,
        MINES_GRID_SIZE,
    },
    config::MinesConfig,
};
use tracing::debug;

use super::{check_distinct, RoundCore, RoundEngine, SettlementReport, StepResult};
use crate::{odds, streak};

/// Snapshot of a Mines round. `mines` is only filled once the round is resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct MinesView {
    pub phase: Phase,
    pub bet: u64,
    pub mine_count: u8,
    pub revealed: Vec<u8>,
    pub mines: Option<Vec<u8>>,
    pub multiplier: f64,
    pub next_multiplier: Option<f64>,
}

pub struct Mines {
    core: RoundCore,
    config: MinesConfig,
    mine_count: u8,
    board: [bool; MINES_GRID_SIZE as usize],
    revealed: Vec<u8>,
    stake_fraction: f64,
}

impl Mines {
    pub fn new(config: MinesConfig, seed: u64, streak: StreakState) -> Self {
        Self {
            core: RoundCore::new(GameMode::Mines, seed, streak),
            mine_count: config.default_mines,
            config,
            board: [false; MINES_GRID_SIZE as usize],
            revealed: Vec::new(),
            stake_fraction: 0.0,
        }
    }

    /// Set the number of mines for the next round.
    pub fn configure(&mut self, mines: u8) -> Result<(), RoundError> {
        self.core.require_betting("mines can only change between rounds")?;
        if mines == 0 || mines > MAX_MINES {
            return Err(InvalidBet::InvalidSelection.into());
        }
        self.mine_count = mines;
        Ok(())
    }

    pub fn mine_count(&self) -> u8 {
        self.mine_count
    }

    fn safe_cells(&self) -> u8 {
        MINES_GRID_SIZE - self.mine_count
    }

    fn uncovered(&self) -> u8 {
        self.revealed.len() as u8
    }

    fn multiplier_at(&self, revealed: u8) -> f64 {
        odds::mines_multiplier(
            MINES_GRID_SIZE,
            self.mine_count,
            revealed,
            self.stake_fraction,
            &self.config,
        )
    }

    /// Multiplier the round would cash out at right now (0 once a mine is hit).
    pub fn current_multiplier(&self) -> f64 {
        if self.core.phase == Phase::Resolved(Outcome::Lost) {
            return 0.0;
        }
        self.multiplier_at(self.uncovered())
    }

    /// Reveal a tile (0..25, row-major).
    pub fn reveal(
        &mut self,
        ledger: &mut BalanceLedger,
        tile: u8,
    ) -> Result<StepResult, RoundError> {
        self.core.require_active("no active round")?;
        if tile >= MINES_GRID_SIZE {
            return Err(RoundError::IllegalState("tile is off the board"));
        }
        if self.revealed.contains(&tile) {
            return Err(RoundError::IllegalState("tile already revealed"));
        }
        self.revealed.push(tile);

        if self.board[tile as usize] {
            debug!(tile, "mine revealed");
            let report = self.core.settle(ledger, Outcome::Lost, 0.0, streak::NO_BONUS);
            return Ok(StepResult::Settled(report));
        }

        let multiplier = self.current_multiplier();
        debug!(tile, revealed = self.uncovered(), multiplier, "safe tile revealed");
        if self.uncovered() == self.safe_cells() {
            return Ok(StepResult::Settled(self.settle_win(ledger)));
        }
        Ok(StepResult::Continue { multiplier })
    }

    fn settle_win(&mut self, ledger: &mut BalanceLedger) -> SettlementReport {
        let uncovered_ratio = self.uncovered() as f64 / self.safe_cells() as f64;
        let density = self.mine_count as f64 / MINES_GRID_SIZE as f64;
        let bonus = streak::mines_bonus(
            &self.core.streak,
            uncovered_ratio,
            density,
            ledger.level,
            &self.config,
        );
        let multiplier = self.current_multiplier();
        self.core.settle(ledger, Outcome::Won, multiplier, bonus)
    }

    /// Check that `selection` could be revealed in full during one round.
    pub fn check_selection(&self, selection: &[u8]) -> Result<(), InvalidBet> {
        if selection.is_empty() {
            return Err(InvalidBet::EmptySelection);
        }
        if selection.len() > self.safe_cells() as usize {
            return Err(InvalidBet::InvalidSelection);
        }
        check_distinct(selection, MINES_GRID_SIZE)
    }

    pub fn view(&self) -> MinesView {
        let active = self.core.phase.is_active();
        let mines = self.core.phase.is_resolved().then(|| self.mine_positions());
        let next_multiplier = (active && self.uncovered() < self.safe_cells())
            .then(|| self.multiplier_at(self.uncovered() + 1));
        MinesView {
            phase: self.core.phase,
            bet: self.core.bet,
            mine_count: self.mine_count,
            revealed: self.revealed.clone(),
            mines,
            multiplier: self.current_multiplier(),
            next_multiplier,
        }
    }

    fn mine_positions(&self) -> Vec<u8> {
        (0..MINES_GRID_SIZE)
            .filter(|tile| self.board[*tile as usize])
            .collect()
    }

    /// Mine positions of the active round.
    #[cfg(any(test, feature = "mocks"))]
    pub fn peek_mines(&self) -> Vec<u8> {
        self.mine_positions()
    }
}

impl RoundEngine for Mines {
    fn mode(&self) -> GameMode {
        GameMode::Mines
    }

    fn phase(&self) -> Phase {
        self.core.phase
    }

    fn place_bet(&mut self, ledger: &mut BalanceLedger, amount: u64) -> Result<(), RoundError> {
        self.core.check(ledger, amount)?;
        // Measured against the balance before the stake leaves it
        let stake_fraction = amount as f64 / ledger.balance as f64;
        let mut rng = self.core.begin(ledger, amount)?;

        self.board = [false; MINES_GRID_SIZE as usize];
        for tile in rng.sample(MINES_GRID_SIZE, self.mine_count as usize) {
            self.board[tile as usize] = true;
        }
        self.revealed.clear();
        self.stake_fraction = stake_fraction;
        Ok(())
    }

    fn cashout(&mut self, ledger: &mut BalanceLedger) -> Result<SettlementReport, RoundError> {
        self.core.require_active("no active round")?;
        if self.revealed.is_empty() {
            return Err(RoundError::IllegalState("reveal a tile before cashing out"));
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
