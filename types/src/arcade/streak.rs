use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};
use std::collections::VecDeque;

use super::STREAK_HISTORY_LEN;

/// Consecutive-win streak of one game mode plus its recent outcomes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreakState {
    pub win_streak: u32,
    /// Oldest first, `true` for a win. Never longer than [STREAK_HISTORY_LEN].
    pub history: VecDeque<bool>,
}

impl StreakState {
    pub fn record_win(&mut self) {
        self.win_streak = self.win_streak.saturating_add(1);
        self.push(true);
    }

    pub fn record_loss(&mut self) {
        self.win_streak = 0;
        self.push(false);
    }

    /// Losses among the remembered outcomes.
    pub fn recent_losses(&self) -> u32 {
        self.history.iter().filter(|won| !**won).count() as u32
    }

    fn push(&mut self, won: bool) {
        if self.history.len() == STREAK_HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(won);
    }

    fn history_vec(&self) -> Vec<bool> {
        self.history.iter().copied().collect()
    }
}

impl Write for StreakState {
    fn write(&self, writer: &mut impl BufMut) {
        self.win_streak.write(writer);
        self.history_vec().write(writer);
    }
}

impl Read for StreakState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let win_streak = u32::read(reader)?;
        let history = Vec::<bool>::read_range(reader, 0..=STREAK_HISTORY_LEN)?;
        Ok(Self {
            win_streak,
            history: history.into(),
        })
    }
}

impl EncodeSize for StreakState {
    fn encode_size(&self) -> usize {
        self.win_streak.encode_size() + self.history_vec().encode_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loss_resets_streak() {
        let mut streak = StreakState::default();
        streak.record_win();
        streak.record_win();
        assert_eq!(streak.win_streak, 2);

        streak.record_loss();
        assert_eq!(streak.win_streak, 0);
        assert_eq!(streak.recent_losses(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut streak = StreakState::default();
        for _ in 0..3 {
            streak.record_loss();
        }
        for _ in 0..STREAK_HISTORY_LEN {
            streak.record_win();
        }
        assert_eq!(streak.history.len(), STREAK_HISTORY_LEN);
        // Old losses have been evicted
        assert_eq!(streak.recent_losses(), 0);
        assert_eq!(streak.win_streak, STREAK_HISTORY_LEN as u32);
    }
}
