use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

use super::{
    read_string, string_encode_size, write_string, BalanceLedger, GameMode, StreakState,
    MAX_USERNAME_LENGTH,
};

/// Everything persisted for a player between sessions.
///
/// Saved as a whole after every settlement and loaded once when a session opens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub username: String,
    pub balance: u64,
    pub gems: u64,
    pub level: u32,
    pub bets_placed: u64,
    pub total_won: u64,
    pub biggest_win: u64,
    pub mode_bets: [u64; GameMode::COUNT],
    pub streaks: [StreakState; GameMode::COUNT],
}

impl SessionRecord {
    /// Fresh record for a player that has never been saved.
    pub fn new(username: String, starting_balance: u64) -> Self {
        Self::from_parts(username, &BalanceLedger::new(starting_balance), Default::default())
    }

    pub fn from_parts(
        username: String,
        ledger: &BalanceLedger,
        streaks: [StreakState; GameMode::COUNT],
    ) -> Self {
        Self {
            username,
            balance: ledger.balance,
            gems: ledger.gems,
            level: ledger.level,
            bets_placed: ledger.bets_placed,
            total_won: ledger.total_won,
            biggest_win: ledger.biggest_win,
            mode_bets: ledger.mode_bets,
            streaks,
        }
    }

    pub fn ledger(&self) -> BalanceLedger {
        BalanceLedger {
            balance: self.balance,
            gems: self.gems,
            level: self.level,
            total_won: self.total_won,
            biggest_win: self.biggest_win,
            bets_placed: self.bets_placed,
            mode_bets: self.mode_bets,
        }
    }

    pub fn streak(&self, mode: GameMode) -> &StreakState {
        &self.streaks[mode.index()]
    }
}

impl Write for SessionRecord {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.username, writer);
        self.balance.write(writer);
        self.gems.write(writer);
        self.level.write(writer);
        self.bets_placed.write(writer);
        self.total_won.write(writer);
        self.biggest_win.write(writer);
        for bets in &self.mode_bets {
            bets.write(writer);
        }
        for streak in &self.streaks {
            streak.write(writer);
        }
    }
}

impl Read for SessionRecord {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let username = read_string(reader, MAX_USERNAME_LENGTH)?;
        let balance = u64::read(reader)?;
        let gems = u64::read(reader)?;
        let level = u32::read(reader)?;
        let bets_placed = u64::read(reader)?;
        let total_won = u64::read(reader)?;
        let biggest_win = u64::read(reader)?;

        let mut mode_bets = [0u64; GameMode::COUNT];
        for bets in mode_bets.iter_mut() {
            *bets = u64::read(reader)?;
        }
        let mut streaks: [StreakState; GameMode::COUNT] = Default::default();
        for streak in streaks.iter_mut() {
            *streak = StreakState::read(reader)?;
        }

        Ok(Self {
            username,
            balance,
            gems,
            level,
            bets_placed,
            total_won,
            biggest_win,
            mode_bets,
            streaks,
        })
    }
}

impl EncodeSize for SessionRecord {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.username)
            + self.balance.encode_size()
            + self.gems.encode_size()
            + self.level.encode_size()
            + self.bets_placed.encode_size()
            + self.total_won.encode_size()
            + self.biggest_win.encode_size()
            + self.mode_bets.iter().map(EncodeSize::encode_size).sum::<usize>()
            + self.streaks.iter().map(EncodeSize::encode_size).sum::<usize>()
    }
}
