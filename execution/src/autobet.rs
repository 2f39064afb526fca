//! Unattended play for Mines and Towers.
//!
//! Each auto-bet round runs to completion in one step: bet, reveal the planned
//! selection until a bomb or the end of the selection, cash out if the round
//! is still open and return to betting. The runner waits the configured settle
//! delay between rounds and only checks for cancellation between them.

use arcade_types::arcade::{BalanceLedger, GameMode, InvalidBet, Outcome, RoundError};
use commonware_runtime::Clock;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::info;

use crate::{
    games::{Mines, RoundEngine, SettlementReport, StepResult, Towers},
    session::Session,
    state::Store,
};

/// Rounds to play and how to play each of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoBetPlan {
    pub rounds: u32,
    pub bet: u64,
    /// Tiles to reveal (Mines) or the column to pick in each row (Towers).
    pub selection: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Completed,
    Cancelled,
    InsufficientFunds,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AutoBetSummary {
    pub rounds_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub net_profit: i64,
    pub stop: StopReason,
}

impl AutoBetSummary {
    fn new() -> Self {
        Self {
            rounds_played: 0,
            wins: 0,
            losses: 0,
            net_profit: 0,
            stop: StopReason::Completed,
        }
    }

    fn record(&mut self, report: &SettlementReport) {
        self.rounds_played += 1;
        match report.outcome {
            Outcome::Won => self.wins += 1,
            Outcome::Lost => self.losses += 1,
        }
        self.net_profit = self.net_profit.saturating_add(report.profit);
    }
}

/// Stops an auto-bet run before its next round.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Engines that can play a whole round from a fixed selection.
pub trait AutoPlay: RoundEngine {
    /// Reject selections that could not be played out in full.
    fn validate_selection(&self, selection: &[u8]) -> Result<(), InvalidBet>;

    /// Make one pick of the selection.
    fn pick(&mut self, ledger: &mut BalanceLedger, choice: u8) -> Result<StepResult, RoundError>;

    fn auto_round(
        &mut self,
        ledger: &mut BalanceLedger,
        bet: u64,
        selection: &[u8],
    ) -> Result<SettlementReport, RoundError> {
        self.validate_selection(selection)?;
        self.place_bet(ledger, bet)?;
        let mut settled = None;
        for choice in selection {
            if let StepResult::Settled(report) = self.pick(ledger, *choice)? {
                settled = Some(report);
                break;
            }
        }
        let report = match settled {
            Some(report) => report,
            None => self.cashout(ledger)?,
        };
        self.finish()?;
        Ok(report)
    }
}

impl AutoPlay for Mines {
    fn validate_selection(&self, selection: &[u8]) -> Result<(), InvalidBet> {
        self.check_selection(selection)
    }

    fn pick(&mut self, ledger: &mut BalanceLedger, choice: u8) -> Result<StepResult, RoundError> {
        self.reveal(ledger, choice)
    }
}

impl AutoPlay for Towers {
    fn validate_selection(&self, selection: &[u8]) -> Result<(), InvalidBet> {
        self.check_selection(selection)
    }

    fn pick(&mut self, ledger: &mut BalanceLedger, choice: u8) -> Result<StepResult, RoundError> {
        self.reveal_row(ledger, choice)
    }
}

/// Play `plan` on `mode`, sleeping the configured settle delay between rounds.
///
/// Invalid plans are rejected before any round is played.
pub async fn run<E: Clock, S: Store>(
    context: &E,
    session: &mut Session<S>,
    mode: GameMode,
    plan: &AutoBetPlan,
    cancel: &CancelHandle,
) -> Result<AutoBetSummary, RoundError> {
    session.check_plan(mode, plan)?;
    let mut summary = AutoBetSummary::new();
    let delay = session.config().autobet.settle_delay();
    for round in 0..plan.rounds {
        if round > 0 {
            context.sleep(delay).await;
        }
        if cancel.is_cancelled() {
            summary.stop = StopReason::Cancelled;
            break;
        }
        if plan.bet > session.ledger().balance {
            summary.stop = StopReason::InsufficientFunds;
            break;
        }
        let report = session.auto_round(mode, plan).await?;
        summary.record(&report);
    }
    info!(
        mode = mode.name(),
        rounds = summary.rounds_played,
        wins = summary.wins,
        losses = summary.losses,
        net_profit = summary.net_profit,
        stop = ?summary.stop,
        "auto-bet finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Memory;
    use arcade_types::{
        arcade::{Difficulty, Phase, STARTING_BALANCE},
        EngineConfig,
    };
    use commonware_macros::test_traced;
    use commonware_runtime::{deterministic, Metrics, Runner, Spawner};
    use std::time::Duration;

    fn plan(rounds: u32, bet: u64, selection: Vec<u8>) -> AutoBetPlan {
        AutoBetPlan {
            rounds,
            bet,
            selection,
        }
    }

    #[test_traced("INFO")]
    fn test_runs_every_round() {
        let executor = deterministic::Runner::default();
        executor.start(|context| async move {
            let mut session =
                Session::open(Memory::default(), "auto", EngineConfig::default(), Some(1)).await;
            let start = context.current();

            let summary = session
                .auto_bet(
                    &context,
                    GameMode::Mines,
                    &plan(5, 100, vec![0, 1, 2]),
                    &CancelHandle::default(),
                )
                .await
                .unwrap();
            assert_eq!(summary.stop, StopReason::Completed);
            assert_eq!(summary.rounds_played, 5);
            assert_eq!(summary.wins + summary.losses, 5);
            assert_eq!(
                session.ledger().balance as i64,
                STARTING_BALANCE as i64 + summary.net_profit
            );
            assert_eq!(session.ledger().bets_for(GameMode::Mines), 5);
            assert_eq!(session.games().mines.phase(), Phase::Betting);

            // Four pauses between five rounds
            let elapsed = context.current().duration_since(start).unwrap();
            assert!(elapsed >= Duration::from_millis(4 * 1_500));
            assert!(elapsed < Duration::from_millis(5 * 1_500));

            // Every round was saved
            let stored = session.store().load_record("auto").await.unwrap();
            assert_eq!(stored, session.record());
        });
    }

    #[test]
    fn test_towers_rounds() {
        let executor = deterministic::Runner::default();
        executor.start(|context| async move {
            let mut session =
                Session::open(Memory::default(), "tower", EngineConfig::default(), Some(2)).await;
            session
                .play(|games, _| games.towers.configure(Difficulty::Medium))
                .await
                .unwrap();

            let summary = session
                .auto_bet(
                    &context,
                    GameMode::Towers,
                    &plan(3, 50, vec![0, 1]),
                    &CancelHandle::default(),
                )
                .await
                .unwrap();
            assert_eq!(summary.rounds_played, 3);
            assert_eq!(session.ledger().bets_for(GameMode::Towers), 3);
        });
    }

    #[test]
    fn test_invalid_plan_plays_nothing() {
        let executor = deterministic::Runner::default();
        executor.start(|context| async move {
            let mut session =
                Session::open(Memory::default(), "empty", EngineConfig::default(), Some(1)).await;
            let cancel = CancelHandle::default();

            let result = session
                .auto_bet(&context, GameMode::Mines, &plan(3, 100, vec![]), &cancel)
                .await;
            assert_eq!(
                result,
                Err(RoundError::InvalidBet(InvalidBet::EmptySelection))
            );
            let result = session
                .auto_bet(&context, GameMode::Towers, &plan(3, 100, vec![5]), &cancel)
                .await;
            assert_eq!(
                result,
                Err(RoundError::InvalidBet(InvalidBet::InvalidSelection))
            );
            assert_eq!(session.ledger().balance, STARTING_BALANCE);
            assert_eq!(session.ledger().bets_placed, 0);
        });
    }

    #[test]
    fn test_stops_when_funds_run_out() {
        let executor = deterministic::Runner::default();
        executor.start(|context| async move {
            // Any round returns at most a couple of units on a 100 stake
            let mut config = EngineConfig::default();
            config.mines.house_edge = 0.01;
            config.session.starting_balance = 250;
            let mut session = Session::open(Memory::default(), "poor", config, Some(4)).await;

            let summary = session
                .auto_bet(
                    &context,
                    GameMode::Mines,
                    &plan(10, 100, vec![12]),
                    &CancelHandle::default(),
                )
                .await
                .unwrap();
            assert_eq!(summary.stop, StopReason::InsufficientFunds);
            assert_eq!(summary.rounds_played, 2);
            assert!(session.ledger().balance < 100);
            assert_eq!(session.ledger().bets_for(GameMode::Mines), 2);
            assert!(summary.net_profit < -190);
        });
    }

    #[test_traced("INFO")]
    fn test_cancel_between_rounds() {
        let executor = deterministic::Runner::default();
        executor.start(|context| async move {
            let mut session =
                Session::open(Memory::default(), "cancel", EngineConfig::default(), Some(7)).await;
            let delay = session.config().autobet.settle_delay();
            let cancel = CancelHandle::default();

            // Cancel while the runner waits after its third round
            context.with_label("canceller").spawn({
                let cancel = cancel.clone();
                move |context| async move {
                    context.sleep(delay * 5 / 2).await;
                    cancel.cancel();
                }
            });

            let summary = session
                .auto_bet(&context, GameMode::Mines, &plan(10, 10, vec![3, 7]), &cancel)
                .await
                .unwrap();
            assert_eq!(summary.stop, StopReason::Cancelled);
            assert_eq!(summary.rounds_played, 3);
            assert_eq!(session.ledger().bets_for(GameMode::Mines), 3);
            assert_eq!(session.games().mines.phase(), Phase::Betting);
        });
    }
}
