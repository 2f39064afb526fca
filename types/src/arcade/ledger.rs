use super::{GameMode, InvalidBet, STARTING_BALANCE, STARTING_GEMS, STARTING_LEVEL};

/// Spendable balance and cumulative statistics of a player.
///
/// The ledger is only mutated by round settlement: `debit_bet` when a round
/// starts and `credit_payout` when a round is won.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceLedger {
    pub balance: u64,
    pub gems: u64,
    pub level: u32,
    /// Cumulative net-positive profit across all rounds.
    pub total_won: u64,
    /// Largest profit made by a single round.
    pub biggest_win: u64,
    pub bets_placed: u64,
    pub mode_bets: [u64; GameMode::COUNT],
}

impl Default for BalanceLedger {
    fn default() -> Self {
        Self::new(STARTING_BALANCE)
    }
}

impl BalanceLedger {
    pub fn new(balance: u64) -> Self {
        Self {
            balance,
            gems: STARTING_GEMS,
            level: STARTING_LEVEL,
            total_won: 0,
            biggest_win: 0,
            bets_placed: 0,
            mode_bets: [0; GameMode::COUNT],
        }
    }

    /// Check a bet against the balance without mutating anything.
    pub fn check_bet(&self, amount: u64) -> Result<(), InvalidBet> {
        if amount == 0 {
            return Err(InvalidBet::NonPositive);
        }
        if amount > self.balance {
            return Err(InvalidBet::ExceedsBalance {
                bet: amount,
                balance: self.balance,
            });
        }
        Ok(())
    }

    /// Take a bet out of the balance and count it. Returns the new balance.
    pub fn debit_bet(&mut self, mode: GameMode, amount: u64) -> Result<u64, InvalidBet> {
        self.check_bet(amount)?;
        self.balance -= amount;
        self.bets_placed = self.bets_placed.saturating_add(1);
        let counter = &mut self.mode_bets[mode.index()];
        *counter = counter.saturating_add(1);
        Ok(self.balance)
    }

    /// Pay out a settled round. Returns the new balance.
    ///
    /// `payout` is the total return (stake included); only the part above `bet`
    /// counts towards `total_won` and `biggest_win`.
    pub fn credit_payout(&mut self, bet: u64, payout: u64) -> u64 {
        self.balance = self.balance.saturating_add(payout);
        let profit = payout.saturating_sub(bet);
        if profit > 0 {
            self.total_won = self.total_won.saturating_add(profit);
            self.biggest_win = self.biggest_win.max(profit);
        }
        self.balance
    }

    pub fn award_gems(&mut self, gems: u64) {
        self.gems = self.gems.saturating_add(gems);
    }

    pub fn bets_for(&self, mode: GameMode) -> u64 {
        self.mode_bets[mode.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_rejects_zero_and_overdraw() {
        let mut ledger = BalanceLedger::new(100);
        assert_eq!(
            ledger.debit_bet(GameMode::Mines, 0),
            Err(InvalidBet::NonPositive)
        );
        assert_eq!(
            ledger.debit_bet(GameMode::Mines, 101),
            Err(InvalidBet::ExceedsBalance {
                bet: 101,
                balance: 100
            })
        );
        assert_eq!(ledger.balance, 100);
        assert_eq!(ledger.bets_placed, 0);
    }

    #[test]
    fn test_debit_counts_per_mode() {
        let mut ledger = BalanceLedger::new(100);
        assert_eq!(ledger.debit_bet(GameMode::Keno, 40), Ok(60));
        assert_eq!(ledger.debit_bet(GameMode::Keno, 60), Ok(0));
        assert_eq!(ledger.bets_placed, 2);
        assert_eq!(ledger.bets_for(GameMode::Keno), 2);
        assert_eq!(ledger.bets_for(GameMode::Mines), 0);
    }

    #[test]
    fn test_credit_tracks_profit_only() {
        let mut ledger = BalanceLedger::new(0);

        // Stake returned: no profit recorded
        ledger.credit_payout(100, 100);
        assert_eq!(ledger.total_won, 0);
        assert_eq!(ledger.biggest_win, 0);

        ledger.credit_payout(100, 350);
        ledger.credit_payout(100, 150);
        assert_eq!(ledger.balance, 600);
        assert_eq!(ledger.total_won, 300);
        assert_eq!(ledger.biggest_win, 250);
    }
}
