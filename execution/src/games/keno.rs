//! Keno implementation.
//!
//! The player picks up to `KENO_MAX_PICKS` numbers from `1..=KENO_POOL_SIZE`.
//! Once the bet is placed `KENO_DRAWS` numbers are drawn one at a time without
//! replacement; after the last draw the payout table decides the round.

use arcade_types::arcade::{
    BalanceLedger, GameMode, InvalidBet, Phase, RoundError, StreakState, KENO_DRAWS,
    KENO_MAX_PICKS, KENO_POOL_SIZE,
};
use tracing::debug;

use super::{
    check_distinct, table_outcome, RoundCore, RoundEngine, SettlementReport, StepResult,
};
use crate::{odds, streak};

/// Snapshot of a Keno round.
#[derive(Clone, Debug, PartialEq)]
pub struct KenoView {
    pub phase: Phase,
    pub bet: u64,
    pub picks: Vec<u8>,
    pub drawn: Vec<u8>,
    pub hits: usize,
    /// Multiplier the current hit count would pay.
    pub multiplier: f64,
}

pub struct Keno {
    core: RoundCore,
    picks: Vec<u8>,
    draws: Vec<u8>,
    drawn: usize,
}

impl Keno {
    pub fn new(seed: u64, streak: StreakState) -> Self {
        Self {
            core: RoundCore::new(GameMode::Keno, seed, streak),
            picks: Vec::new(),
            draws: Vec::new(),
            drawn: 0,
        }
    }

    /// Replace the picks for the next round.
    pub fn select_numbers(&mut self, numbers: &[u8]) -> Result<(), RoundError> {
        self.core
            .require_betting("numbers can only change between rounds")?;
        if numbers.is_empty() {
            return Err(InvalidBet::EmptySelection.into());
        }
        if numbers.len() > KENO_MAX_PICKS || numbers.contains(&0) {
            return Err(InvalidBet::InvalidSelection.into());
        }
        let offsets: Vec<u8> = numbers.iter().map(|number| number - 1).collect();
        check_distinct(&offsets, KENO_POOL_SIZE)?;

        let mut picks = numbers.to_vec();
        picks.sort_unstable();
        debug!(?picks, "numbers selected");
        self.picks = picks;
        Ok(())
    }

    /// Replace the picks with `count` random numbers.
    pub fn quick_pick(&mut self, count: usize) -> Result<Vec<u8>, RoundError> {
        self.core
            .require_betting("numbers can only change between rounds")?;
        if count == 0 || count > KENO_MAX_PICKS {
            return Err(InvalidBet::InvalidSelection.into());
        }
        let numbers: Vec<u8> = self
            .core
            .player_rng()
            .sample(KENO_POOL_SIZE, count)
            .into_iter()
            .map(|offset| offset + 1)
            .collect();
        self.select_numbers(&numbers)?;
        Ok(self.picks.clone())
    }

    pub fn clear_picks(&mut self) -> Result<(), RoundError> {
        self.core
            .require_betting("numbers can only change between rounds")?;
        self.picks.clear();
        Ok(())
    }

    pub fn picks(&self) -> &[u8] {
        &self.picks
    }

    pub fn drawn(&self) -> &[u8] {
        &self.draws[..self.drawn]
    }

    pub fn hits(&self) -> usize {
        self.drawn()
            .iter()
            .filter(|number| self.picks.contains(number))
            .count()
    }

    /// Reveal the next number. The ninth draw settles the round.
    pub fn draw(&mut self, ledger: &mut BalanceLedger) -> Result<StepResult, RoundError> {
        self.core.require_active("no active round")?;
        let Some(&number) = self.draws.get(self.drawn) else {
            return Err(RoundError::IllegalState("every number has been drawn"));
        };
        self.drawn += 1;

        let hits = self.hits();
        let multiplier = odds::keno_payout(self.picks.len(), hits);
        debug!(number, draw = self.drawn, hits, "number drawn");
        if self.drawn < KENO_DRAWS {
            return Ok(StepResult::Continue { multiplier });
        }
        let report = self.core
            .settle(ledger, table_outcome(multiplier), multiplier, streak::NO_BONUS);
        Ok(StepResult::Settled(report))
    }

    /// Run every remaining draw and settle the round.
    pub fn draw_all(&mut self, ledger: &mut BalanceLedger) -> Result<SettlementReport, RoundError> {
        loop {
            if let StepResult::Settled(report) = self.draw(ledger)? {
                return Ok(report);
            }
        }
    }

    pub fn view(&self) -> KenoView {
        let hits = self.hits();
        KenoView {
            phase: self.core.phase,
            bet: self.core.bet,
            picks: self.picks.clone(),
            drawn: self.drawn().to_vec(),
            hits,
            multiplier: odds::keno_payout(self.picks.len(), hits),
        }
    }

    /// Numbers the active round will draw, in order.
    #[cfg(any(test, feature = "mocks"))]
    pub fn peek_draws(&self) -> Vec<u8> {
        self.draws.clone()
    }
}

impl RoundEngine for Keno {
    fn mode(&self) -> GameMode {
        GameMode::Keno
    }

    fn phase(&self) -> Phase {
        self.core.phase
    }

    fn place_bet(&mut self, ledger: &mut BalanceLedger, amount: u64) -> Result<(), RoundError> {
        self.core.check(ledger, amount)?;
        if self.picks.is_empty() {
            return Err(InvalidBet::EmptySelection.into());
        }
        let mut rng = self.core.begin(ledger, amount)?;
        self.draws = rng
            .sample(KENO_POOL_SIZE, KENO_DRAWS)
            .into_iter()
            .map(|offset| offset + 1)
            .collect();
        self.drawn = 0;
        Ok(())
    }

    fn cashout(&mut self, _: &mut BalanceLedger) -> Result<SettlementReport, RoundError> {
        Err(RoundError::IllegalState("keno rounds settle after the last draw"))
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
