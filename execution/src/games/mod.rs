//! Round engines for the arcade mini-games.
//!
//! This module contains the game logic for all modes:
//! - Mines
//! - Towers
//! - Hilo
//! - Keno
//! - Plinko
//!
//! Every engine follows the same lifecycle (`Betting -> Active -> Resolved -> Betting`)
//! and settles against a [BalanceLedger] passed in by the caller.

pub mod hilo;
pub mod keno;
pub mod mines;
pub mod plinko;
pub mod towers;

use arcade_types::arcade::{
    BalanceLedger, GameMode, InvalidBet, Outcome, Phase, RoundError, StreakState, DECK_SIZE,
};
use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use rand::{rngs::OsRng, RngCore};
use tracing::{debug, info};

pub use hilo::Hilo;
pub use keno::Keno;
pub use mines::Mines;
pub use plinko::Plinko;
pub use towers::Towers;

/// Stream used for the board of a round.
pub const BOARD_STREAM: u32 = 0;

/// Stream used for choices made on behalf of the player (quick picks).
pub const PLAYER_STREAM: u32 = u32::MAX;

/// Draw a fresh seed from the operating system.
pub fn random_seed() -> u64 {
    OsRng.next_u64()
}

/// Deterministic random number generator for a single round.
///
/// Uses SHA256 hash chains over the session seed, the round nonce and a stream
/// id, so replaying a session with the same seed reproduces every board.
#[derive(Clone)]
pub struct GameRng {
    state: [u8; 32],
    index: usize,
}

impl GameRng {
    /// Create a new RNG from a seed, round nonce and stream id.
    pub fn new(seed: u64, round: u64, stream: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&seed.to_be_bytes());
        hasher.update(&round.to_be_bytes());
        hasher.update(&stream.to_be_bytes());
        Self {
            state: hasher.finalize().0,
            index: 0,
        }
    }

    fn next_byte(&mut self) -> u8 {
        if self.index >= 32 {
            // Rehash to get more bytes
            let mut hasher = Sha256::new();
            hasher.update(&self.state);
            self.state = hasher.finalize().0;
            self.index = 0;
        }
        let result = self.state[self.index];
        self.index += 1;
        result
    }

    pub fn next_u8(&mut self) -> u8 {
        self.next_byte()
    }

    pub fn next_u32(&mut self) -> u32 {
        u32::from_be_bytes([
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
        ])
    }

    pub fn next_u64(&mut self) -> u64 {
        (self.next_u32() as u64) << 32 | self.next_u32() as u64
    }

    /// Get a random f64 value in range [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    pub fn next_bool(&mut self) -> bool {
        self.next_byte() & 1 == 1
    }

    /// Get a random value in range [0, max).
    pub fn next_bounded(&mut self, max: u8) -> u8 {
        if max == 0 {
            return 0;
        }
        // Rejection sampling for an unbiased distribution
        let limit = u8::MAX - (u8::MAX % max);
        loop {
            let value = self.next_u8();
            if value < limit {
                return value % max;
            }
        }
    }

    /// Shuffle a slice in place using Fisher-Yates.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_bounded((i + 1) as u8) as usize;
            slice.swap(i, j);
        }
    }

    /// Pick `count` distinct values from `0..population` (uniform, without replacement).
    pub fn sample(&mut self, population: u8, count: usize) -> Vec<u8> {
        let mut pool: Vec<u8> = (0..population).collect();
        let count = count.min(pool.len());
        // Partial Fisher-Yates: the first `count` slots end up uniformly sampled
        for i in 0..count {
            let j = i + self.next_bounded((pool.len() - i) as u8) as usize;
            pool.swap(i, j);
        }
        pool.truncate(count);
        pool
    }

    /// Create a shuffled deck of 52 cards.
    pub fn create_deck(&mut self) -> Vec<u8> {
        let mut deck: Vec<u8> = (0..DECK_SIZE).collect();
        self.shuffle(&mut deck);
        deck
    }
}

/// What a single reveal, guess or draw produced.
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
    /// The round is still active at the given multiplier.
    Continue { multiplier: f64 },
    /// The step ended the round.
    Settled(SettlementReport),
}

impl StepResult {
    pub fn report(&self) -> Option<&SettlementReport> {
        match self {
            StepResult::Continue { .. } => None,
            StepResult::Settled(report) => Some(report),
        }
    }
}

/// Summary of a settled round.
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementReport {
    pub mode: GameMode,
    pub outcome: Outcome,
    pub bet: u64,
    /// Odds multiplier at settlement (0 for a busted round).
    pub multiplier: f64,
    /// Streak bonus applied on top of `multiplier` (1 when none applies).
    pub bonus: f64,
    /// Total credited to the ledger, stake included.
    pub payout: u64,
    pub profit: i64,
    /// Ledger balance after settlement.
    pub balance: u64,
}

/// Operations shared by every round engine.
pub trait RoundEngine {
    fn mode(&self) -> GameMode;

    fn phase(&self) -> Phase;

    /// Validate the bet, debit it and start a new round.
    fn place_bet(&mut self, ledger: &mut BalanceLedger, amount: u64) -> Result<(), RoundError>;

    /// Settle an active round at its current multiplier.
    fn cashout(&mut self, ledger: &mut BalanceLedger) -> Result<SettlementReport, RoundError>;

    /// Leave the settling window and accept a new bet.
    fn finish(&mut self) -> Result<(), RoundError>;

    fn streak(&self) -> &StreakState;

    /// Rounds settled since the engine was created.
    fn settlements(&self) -> u64;
}

/// Bookkeeping shared by every engine: phase, stake, seed and streak.
#[derive(Clone, Debug)]
pub(crate) struct RoundCore {
    pub mode: GameMode,
    pub seed: u64,
    pub nonce: u64,
    pub phase: Phase,
    pub bet: u64,
    pub streak: StreakState,
    pub settled: u64,
    /// Player-stream draws made since the last bet.
    pub player_draws: u32,
}

impl RoundCore {
    pub fn new(mode: GameMode, seed: u64, streak: StreakState) -> Self {
        Self {
            mode,
            seed,
            nonce: 0,
            phase: Phase::Betting,
            bet: 0,
            streak,
            settled: 0,
            player_draws: 0,
        }
    }

    pub fn require_betting(&self, action: &'static str) -> Result<(), RoundError> {
        if self.phase != Phase::Betting {
            return Err(RoundError::IllegalState(action));
        }
        Ok(())
    }

    pub fn require_active(&self, action: &'static str) -> Result<(), RoundError> {
        if !self.phase.is_active() {
            return Err(RoundError::IllegalState(action));
        }
        Ok(())
    }

    /// Check the bet without touching the ledger.
    pub fn check(&self, ledger: &BalanceLedger, amount: u64) -> Result<(), RoundError> {
        self.require_betting("bet placed outside betting phase")?;
        ledger.check_bet(amount)?;
        Ok(())
    }

    /// Debit the stake and open the round. Returns the board RNG for the round.
    pub fn begin(
        &mut self,
        ledger: &mut BalanceLedger,
        amount: u64,
    ) -> Result<GameRng, RoundError> {
        self.check(ledger, amount)?;
        let balance = ledger.debit_bet(self.mode, amount)?;
        self.nonce += 1;
        self.player_draws = 0;
        self.bet = amount;
        self.phase = Phase::Active;
        debug!(
            mode = self.mode.name(),
            round = self.nonce,
            bet = amount,
            balance,
            "bet placed"
        );
        Ok(GameRng::new(self.seed, self.nonce, BOARD_STREAM))
    }

    /// RNG for choices made on the player's behalf before the next round.
    ///
    /// Every call between two bets gets its own stream, counting down from
    /// [PLAYER_STREAM].
    pub fn player_rng(&mut self) -> GameRng {
        let stream = PLAYER_STREAM - self.player_draws;
        self.player_draws = self.player_draws.saturating_add(1).min(PLAYER_STREAM - 1);
        GameRng::new(self.seed, self.nonce + 1, stream)
    }

    /// Credit the ledger, update the streak and enter the settling window.
    ///
    /// The streak bonus only applies to wins. A lost round still credits a
    /// positive multiplier as a partial refund.
    pub fn settle(
        &mut self,
        ledger: &mut BalanceLedger,
        outcome: Outcome,
        multiplier: f64,
        bonus: f64,
    ) -> SettlementReport {
        let bonus = match outcome {
            Outcome::Won => bonus.max(1.0),
            Outcome::Lost => 1.0,
        };
        let payout = payout_for(self.bet, multiplier * bonus);
        let balance = if payout > 0 {
            ledger.credit_payout(self.bet, payout)
        } else {
            ledger.balance
        };
        match outcome {
            Outcome::Won => self.streak.record_win(),
            Outcome::Lost => self.streak.record_loss(),
        }

        let report = SettlementReport {
            mode: self.mode,
            outcome,
            bet: self.bet,
            multiplier,
            bonus,
            payout,
            profit: payout as i64 - self.bet as i64,
            balance,
        };
        info!(
            mode = self.mode.name(),
            round = self.nonce,
            bet = self.bet,
            multiplier,
            bonus,
            payout,
            balance,
            streak = self.streak.win_streak,
            "round settled"
        );
        self.phase = Phase::Resolved(outcome);
        self.settled += 1;
        report
    }

    pub fn finish(&mut self) -> Result<(), RoundError> {
        if !self.phase.is_resolved() {
            return Err(RoundError::IllegalState("no settled round to finish"));
        }
        self.phase = Phase::Betting;
        self.bet = 0;
        Ok(())
    }
}

/// Outcome of a round decided by a payout table (Keno, Plinko): anything
/// below the stake loses.
pub(crate) fn table_outcome(multiplier: f64) -> Outcome {
    if multiplier >= 1.0 {
        Outcome::Won
    } else {
        Outcome::Lost
    }
}

/// Total return for a stake at `multiplier`, rounded down to whole units.
pub fn payout_for(bet: u64, multiplier: f64) -> u64 {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return 0;
    }
    let payout = (bet as f64 * multiplier).floor();
    if payout >= u64::MAX as f64 {
        u64::MAX
    } else {
        payout as u64
    }
}

/// Reject selections with values outside `0..limit` or repeated values.
pub(crate) fn check_distinct(values: &[u8], limit: u8) -> Result<(), InvalidBet> {
    let mut seen = 0u64;
    for &value in values {
        if value >= limit || value >= 64 || seen & (1u64 << value) != 0 {
            return Err(InvalidBet::InvalidSelection);
        }
        seen |= 1u64 << value;
    }
    Ok(())
}
