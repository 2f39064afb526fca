//! Player session: the ledger, one engine per mode and persistence.
//!
//! A session is loaded once from the [Store] and written back as a whole
//! after every settled round.

use arcade_types::{
    arcade::{
        BalanceLedger, GameMode, InvalidBet, RoundError, SessionRecord, StreakState,
        MAX_USERNAME_LENGTH,
    },
    EngineConfig,
};
use commonware_runtime::Clock;
use tracing::{debug, info};

use crate::{
    autobet::{self, AutoBetPlan, AutoBetSummary, AutoPlay, CancelHandle},
    games::{random_seed, GameRng, Hilo, Keno, Mines, Plinko, RoundEngine, SettlementReport, Towers},
    state::Store,
};

/// Round used to derive per-mode seeds (engines start counting at 1).
const SEED_ROUND: u64 = 0;

/// Derive the seed of one mode from the session seed.
fn mode_seed(seed: u64, mode: GameMode) -> u64 {
    GameRng::new(seed, SEED_ROUND, mode.index() as u32).next_u64()
}

/// One engine per game mode.
pub struct Games {
    pub mines: Mines,
    pub towers: Towers,
    pub hilo: Hilo,
    pub keno: Keno,
    pub plinko: Plinko,
}

impl Games {
    pub fn new(config: &EngineConfig, seed: u64, streaks: &[StreakState; GameMode::COUNT]) -> Self {
        let streak = |mode: GameMode| streaks[mode.index()].clone();
        let seed_for = |mode: GameMode| mode_seed(seed, mode);
        Self {
            mines: Mines::new(
                config.mines.clone(),
                seed_for(GameMode::Mines),
                streak(GameMode::Mines),
            ),
            towers: Towers::new(
                config.towers.clone(),
                seed_for(GameMode::Towers),
                streak(GameMode::Towers),
            ),
            hilo: Hilo::new(
                config.hilo.clone(),
                seed_for(GameMode::Hilo),
                streak(GameMode::Hilo),
            ),
            keno: Keno::new(seed_for(GameMode::Keno), streak(GameMode::Keno)),
            plinko: Plinko::new(
                config.plinko.clone(),
                seed_for(GameMode::Plinko),
                streak(GameMode::Plinko),
            ),
        }
    }

    pub fn engine(&self, mode: GameMode) -> &dyn RoundEngine {
        match mode {
            GameMode::Mines => &self.mines,
            GameMode::Towers => &self.towers,
            GameMode::Hilo => &self.hilo,
            GameMode::Keno => &self.keno,
            GameMode::Plinko => &self.plinko,
        }
    }

    pub fn engine_mut(&mut self, mode: GameMode) -> &mut dyn RoundEngine {
        match mode {
            GameMode::Mines => &mut self.mines,
            GameMode::Towers => &mut self.towers,
            GameMode::Hilo => &mut self.hilo,
            GameMode::Keno => &mut self.keno,
            GameMode::Plinko => &mut self.plinko,
        }
    }

    /// Engines that can play unattended rounds.
    pub fn auto_engine(&mut self, mode: GameMode) -> Result<&mut dyn AutoPlay, RoundError> {
        match mode {
            GameMode::Mines => Ok(&mut self.mines),
            GameMode::Towers => Ok(&mut self.towers),
            _ => Err(RoundError::IllegalState(
                "auto-bet is only offered for mines and towers",
            )),
        }
    }

    /// Rounds settled across every mode.
    pub fn settlements(&self) -> u64 {
        GameMode::ALL
            .iter()
            .map(|mode| self.engine(*mode).settlements())
            .sum()
    }

    pub fn streaks(&self) -> [StreakState; GameMode::COUNT] {
        GameMode::ALL.map(|mode| self.engine(mode).streak().clone())
    }
}

pub struct Session<S: Store> {
    store: S,
    id: String,
    username: String,
    config: EngineConfig,
    ledger: BalanceLedger,
    games: Games,
    persisted: u64,
}

impl<S: Store> Session<S> {
    /// Load the player `id` (or create it) and build its engines.
    ///
    /// Without a `seed` the boards are seeded from the operating system.
    pub async fn open(store: S, id: &str, config: EngineConfig, seed: Option<u64>) -> Self {
        let record = match store.load_record(id).await {
            Some(record) => {
                debug!(id, balance = record.balance, "session loaded");
                record
            }
            None => {
                info!(id, balance = config.session.starting_balance, "new session");
                SessionRecord::new(username_for(id), config.session.starting_balance)
            }
        };
        let seed = seed.unwrap_or_else(random_seed);
        let games = Games::new(&config, seed, &record.streaks);
        Self {
            store,
            id: id.to_string(),
            username: record.username.clone(),
            ledger: record.ledger(),
            config,
            games,
            persisted: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    pub fn games(&self) -> &Games {
        &self.games
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current state as it would be persisted.
    pub fn record(&self) -> SessionRecord {
        SessionRecord::from_parts(self.username.clone(), &self.ledger, self.games.streaks())
    }

    /// Run an engine action against the ledger, persisting if a round settled.
    pub async fn play<T>(
        &mut self,
        action: impl FnOnce(&mut Games, &mut BalanceLedger) -> Result<T, RoundError>,
    ) -> Result<T, RoundError> {
        let result = action(&mut self.games, &mut self.ledger);
        if self.games.settlements() != self.persisted {
            self.persist().await;
        }
        result
    }

    /// Write the whole record to the store.
    pub async fn persist(&mut self) {
        let record = self.record();
        self.store.save_record(&self.id, &record).await;
        self.persisted = self.games.settlements();
        debug!(id = %self.id, balance = record.balance, "session saved");
    }

    /// Reject an auto-bet plan that could not be played on `mode`.
    pub fn check_plan(&mut self, mode: GameMode, plan: &AutoBetPlan) -> Result<(), RoundError> {
        if plan.bet == 0 {
            return Err(InvalidBet::NonPositive.into());
        }
        self.games
            .auto_engine(mode)?
            .validate_selection(&plan.selection)?;
        Ok(())
    }

    /// Play one complete unattended round and persist it.
    pub async fn auto_round(
        &mut self,
        mode: GameMode,
        plan: &AutoBetPlan,
    ) -> Result<SettlementReport, RoundError> {
        self.play(|games, ledger| {
            games
                .auto_engine(mode)?
                .auto_round(ledger, plan.bet, &plan.selection)
        })
        .await
    }

    /// Play up to `plan.rounds` rounds, pausing between them.
    pub async fn auto_bet<E: Clock>(
        &mut self,
        context: &E,
        mode: GameMode,
        plan: &AutoBetPlan,
        cancel: &CancelHandle,
    ) -> Result<AutoBetSummary, RoundError> {
        autobet::run(context, self, mode, plan, cancel).await
    }
}

/// Usernames are bounded; long ids are cut at a character boundary.
fn username_for(id: &str) -> String {
    let mut username = id.to_string();
    while username.len() > MAX_USERNAME_LENGTH {
        username.pop();
    }
    username
}
