//! Plinko implementation.
//!
//! The physics of the falling ball is left to the caller; this engine only
//! decides where a ball lands and which bucket that is. A drop either targets
//! a bucket chosen by the caller or samples one from a fair left/right path.

use arcade_types::{
    arcade::{BalanceLedger, GameMode, InvalidBet, Phase, RiskLevel, RoundError, StreakState},
    config::PlinkoConfig,
};
use tracing::debug;

use super::{
    table_outcome, GameRng, RoundCore, RoundEngine, SettlementReport, BOARD_STREAM,
};
use crate::{odds, streak};

/// Width of every bucket on the normalised board.
pub const BUCKET_WIDTH: f64 = 1.0;

/// Where a ball ended up.
#[derive(Clone, Debug, PartialEq)]
pub struct Landing {
    /// Bounces taken (`true` = right). Empty when the bucket was targeted.
    pub path: Vec<bool>,
    pub target: usize,
    /// Horizontal landing position, `0.0..buckets * BUCKET_WIDTH`.
    pub final_x: f64,
    pub bucket: usize,
    pub report: SettlementReport,
}

/// Snapshot of the Plinko board.
#[derive(Clone, Debug, PartialEq)]
pub struct PlinkoView {
    pub phase: Phase,
    pub bet: u64,
    pub risk: RiskLevel,
    pub rows: u8,
    pub multipliers: Vec<f64>,
    pub last_bucket: Option<usize>,
}

pub struct Plinko {
    core: RoundCore,
    config: PlinkoConfig,
    risk: RiskLevel,
    rows: u8,
    multipliers: Vec<f64>,
    last_bucket: Option<usize>,
}

impl Plinko {
    pub fn new(config: PlinkoConfig, seed: u64, streak: StreakState) -> Self {
        let (risk, rows) = (config.default_risk, config.default_rows);
        let multipliers = odds::plinko_multipliers(risk, rows).unwrap_or_default();
        Self {
            core: RoundCore::new(GameMode::Plinko, seed, streak),
            config,
            risk,
            rows,
            multipliers,
            last_bucket: None,
        }
    }

    /// Pick the payout table and board height for the next drop.
    pub fn configure(&mut self, risk: RiskLevel, rows: u8) -> Result<(), RoundError> {
        self.core
            .require_betting("board can only change between drops")?;
        let multipliers =
            odds::plinko_multipliers(risk, rows).ok_or(InvalidBet::InvalidSelection)?;
        self.risk = risk;
        self.rows = rows;
        self.multipliers = multipliers;
        Ok(())
    }

    pub fn buckets(&self) -> usize {
        self.multipliers.len()
    }

    pub fn multipliers(&self) -> &[f64] {
        &self.multipliers
    }

    /// Release the ball and settle the round.
    pub fn drop(
        &mut self,
        ledger: &mut BalanceLedger,
        target: Option<usize>,
    ) -> Result<Landing, RoundError> {
        self.core.require_active("place a bet before dropping")?;
        let buckets = self.buckets();
        if target.is_some_and(|bucket| bucket >= buckets) {
            return Err(InvalidBet::InvalidSelection.into());
        }

        let mut rng = GameRng::new(self.core.seed, self.core.nonce, BOARD_STREAM);
        let (target, path) = match target {
            Some(bucket) => (bucket, Vec::new()),
            None => {
                let path: Vec<bool> = (0..self.rows).map(|_| rng.next_bool()).collect();
                let rights = path.iter().filter(|right| **right).count();
                (rights, path)
            }
        };
        let jitter = (rng.next_f64() * 2.0 - 1.0) * self.config.jitter;
        let final_x = (target as f64 + 0.5 + jitter) * BUCKET_WIDTH;
        let bucket = odds::resolve_bucket(final_x, BUCKET_WIDTH, buckets);
        let multiplier = self.multipliers.get(bucket).copied().unwrap_or(0.0);
        debug!(target, final_x, bucket, multiplier, "ball landed");

        let report = self.core
            .settle(ledger, table_outcome(multiplier), multiplier, streak::NO_BONUS);
        self.last_bucket = Some(bucket);
        Ok(Landing {
            path,
            target,
            final_x,
            bucket,
            report,
        })
    }

    /// Place a bet and drop in one step.
    pub fn play(
        &mut self,
        ledger: &mut BalanceLedger,
        amount: u64,
        target: Option<usize>,
    ) -> Result<Landing, RoundError> {
        if target.is_some_and(|bucket| bucket >= self.buckets()) {
            return Err(InvalidBet::InvalidSelection.into());
        }
        self.place_bet(ledger, amount)?;
        self.drop(ledger, target)
    }

    pub fn view(&self) -> PlinkoView {
        PlinkoView {
            phase: self.core.phase,
            bet: self.core.bet,
            risk: self.risk,
            rows: self.rows,
            multipliers: self.multipliers.clone(),
            last_bucket: self.last_bucket,
        }
    }
}

impl RoundEngine for Plinko {
    fn mode(&self) -> GameMode {
        GameMode::Plinko
    }

    fn phase(&self) -> Phase {
        self.core.phase
    }

    fn place_bet(&mut self, ledger: &mut BalanceLedger, amount: u64) -> Result<(), RoundError> {
        if self.multipliers.is_empty() {
            return Err(InvalidBet::InvalidSelection.into());
        }
        self.core.begin(ledger, amount)?;
        self.last_bucket = None;
        Ok(())
    }

    fn cashout(&mut self, _: &mut BalanceLedger) -> Result<SettlementReport, RoundError> {
        Err(RoundError::IllegalState("plinko rounds settle when the ball lands"))
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
