//! Hi-Lo implementation.
//!
//! A single shuffled deck is dealt one card at a time. The player guesses
//! whether the next card ranks higher or lower than the current one; each
//! correct guess multiplies the pot by the inverse of its chance (less the
//! house edge). Equal ranks lose, and a guess too likely to raise the pot is
//! refused. Dealing the last card ends the round: a win at the current
//! multiplier after a correct guess, a loss otherwise.
//!
//! Card ids run 0..52 and rank as `id % 13` (0 = Two, 12 = Ace).

use arcade_types::{
    arcade::{BalanceLedger, GameMode, Guess, Outcome, Phase, RoundError, StreakState},
    config::HiloConfig,
};
use tracing::debug;

use super::{RoundCore, RoundEngine, SettlementReport, StepResult};
use crate::odds::{self, HiloChances};
use crate::streak;

/// Snapshot of a Hilo round. `remaining` is only filled once the round is resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct HiloView {
    pub phase: Phase,
    pub bet: u64,
    pub current: Option<u8>,
    /// Cards dealt so far, oldest first, including the current card.
    pub dealt: Vec<u8>,
    pub cards_left: usize,
    pub correct_guesses: u32,
    pub multiplier: f64,
    pub chances: HiloChances,
    pub remaining: Option<Vec<u8>>,
}

pub struct Hilo {
    core: RoundCore,
    config: HiloConfig,
    deck: Vec<u8>,
    position: usize,
    multiplier: f64,
    correct: u32,
}

impl Hilo {
    pub fn new(config: HiloConfig, seed: u64, streak: StreakState) -> Self {
        Self {
            core: RoundCore::new(GameMode::Hilo, seed, streak),
            config,
            deck: Vec::new(),
            position: 0,
            multiplier: 1.0,
            correct: 0,
        }
    }

    pub fn current_card(&self) -> Option<u8> {
        self.deck.get(self.position).copied()
    }

    fn remaining(&self) -> &[u8] {
        self.deck.get(self.position + 1..).unwrap_or(&[])
    }

    /// Odds of the next card against the current one.
    pub fn chances(&self) -> HiloChances {
        match self.current_card() {
            Some(card) => odds::hilo_chances(card, self.remaining()),
            None => HiloChances::default(),
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn guess(
        &mut self,
        ledger: &mut BalanceLedger,
        guess: Guess,
    ) -> Result<StepResult, RoundError> {
        self.core.require_active("no active round")?;
        let chances = self.chances();
        let chance = match guess {
            Guess::Higher => chances.higher,
            Guess::Lower => chances.lower,
        };
        if chance <= 0.0 {
            return Err(RoundError::IllegalState("no card left can win this guess"));
        }
        let raised = odds::hilo_step(self.multiplier, chance, self.config.house_edge);
        if raised <= self.multiplier {
            return Err(RoundError::IllegalState("guess cannot raise the multiplier"));
        }
        let (Some(previous), Some(&next)) = (self.current_card(), self.remaining().first()) else {
            return Err(RoundError::IllegalState("deck is empty"));
        };
        self.position += 1;

        let (previous_rank, next_rank) = (odds::card_rank(previous), odds::card_rank(next));
        let correct = match guess {
            Guess::Higher => next_rank > previous_rank,
            Guess::Lower => next_rank < previous_rank,
        };
        debug!(?guess, previous, next, chance, correct, "card drawn");
        if !correct {
            let report = self
                .core
                .settle(ledger, Outcome::Lost, 0.0, streak::NO_BONUS);
            return Ok(StepResult::Settled(report));
        }

        self.multiplier = raised;
        self.correct += 1;
        Ok(self.after_deal(ledger))
    }

    /// Discard the current card and deal the next one without touching the pot.
    pub fn skip(&mut self, ledger: &mut BalanceLedger) -> Result<StepResult, RoundError> {
        self.core.require_active("no active round")?;
        let Some(&next) = self.remaining().first() else {
            return Err(RoundError::IllegalState("deck is empty"));
        };
        self.position += 1;
        debug!(card = next, "card skipped");
        Ok(self.after_deal(ledger))
    }

    /// Settle the round once the last card is showing.
    fn after_deal(&mut self, ledger: &mut BalanceLedger) -> StepResult {
        if !self.remaining().is_empty() {
            return StepResult::Continue {
                multiplier: self.multiplier,
            };
        }
        debug!(correct = self.correct, "deck exhausted");
        let report = match self.correct {
            0 => self
                .core
                .settle(ledger, Outcome::Lost, 0.0, streak::NO_BONUS),
            _ => self
                .core
                .settle(ledger, Outcome::Won, self.multiplier, streak::NO_BONUS),
        };
        StepResult::Settled(report)
    }

    pub fn view(&self) -> HiloView {
        let resolved = self.core.phase.is_resolved();
        let dealt = match self.deck.is_empty() {
            true => Vec::new(),
            false => self.deck[..=self.position.min(self.deck.len() - 1)].to_vec(),
        };
        HiloView {
            phase: self.core.phase,
            bet: self.core.bet,
            current: self.current_card(),
            dealt,
            cards_left: self.remaining().len(),
            correct_guesses: self.correct,
            multiplier: self.multiplier,
            chances: self.chances(),
            remaining: resolved.then(|| self.remaining().to_vec()),
        }
    }

    /// Undealt cards of the active round, next card first.
    #[cfg(any(test, feature = "mocks"))]
    pub fn peek_deck(&self) -> Vec<u8> {
        self.remaining().to_vec()
    }
}

impl RoundEngine for Hilo {
    fn mode(&self) -> GameMode {
        GameMode::Hilo
    }

    fn phase(&self) -> Phase {
        self.core.phase
    }

    fn place_bet(&mut self, ledger: &mut BalanceLedger, amount: u64) -> Result<(), RoundError> {
        let mut rng = self.core.begin(ledger, amount)?;
        self.deck = rng.create_deck();
        self.position = 0;
        self.multiplier = 1.0;
        self.correct = 0;
        Ok(())
    }

    fn cashout(&mut self, ledger: &mut BalanceLedger) -> Result<SettlementReport, RoundError> {
        self.core.require_active("no active round")?;
        if self.correct == 0 {
            return Err(RoundError::IllegalState("guess correctly before cashing out"));
        }
        Ok(self
            .core
            .settle(ledger, Outcome::Won, self.multiplier, streak::NO_BONUS))
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
