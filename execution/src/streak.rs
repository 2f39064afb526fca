//! Streak bonus formulas.
//!
//! The bonus is a multiplier applied on top of the odds multiplier of a won
//! round. It is always computed from the streak as it stood before the round
//! being settled is recorded, and is exactly 1 while there is no streak.

use arcade_types::{
    arcade::{Difficulty, StreakState},
    config::{MinesConfig, TowersConfig},
};

/// Mines bonus: grows with the streak, the share of the board uncovered, the
/// mine density and the player level.
pub fn mines_bonus(
    streak: &StreakState,
    uncovered_ratio: f64,
    mine_density: f64,
    level: u32,
    config: &MinesConfig,
) -> f64 {
    if streak.win_streak == 0 {
        return 1.0;
    }
    let growth = config
        .level_growth
        .powi(level.min(i32::MAX as u32) as i32);
    let raw = 1.0
        + uncovered_ratio.clamp(0.0, 1.0)
            * mine_density.clamp(0.0, 1.0)
            * (streak.win_streak as f64 + 1.0).ln()
            * config.streak_scale
            * growth;
    cap(raw, config.bonus_cap)
}

pub fn difficulty_factor(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 1.0,
        Difficulty::Medium => 1.15,
        Difficulty::Hard => 1.3,
    }
}

/// Towers bonus: grows with the streak and difficulty, with a small mercy
/// boost for every recent loss.
pub fn towers_bonus(streak: &StreakState, difficulty: Difficulty, config: &TowersConfig) -> f64 {
    if streak.win_streak == 0 {
        return 1.0;
    }
    let raw = (1.0 + (streak.win_streak as f64 + 1.0).ln() * config.streak_scale)
        * difficulty_factor(difficulty)
        * (1.0 + streak.recent_losses() as f64 * config.mercy_per_loss);
    cap(raw, config.bonus_cap)
}

/// Bonus for modes that track a streak without rewarding it.
pub const NO_BONUS: f64 = 1.0;

fn cap(raw: f64, limit: f64) -> f64 {
    if !raw.is_finite() {
        return limit;
    }
    raw.clamp(1.0, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn streak_of(wins: u32, losses: u32) -> StreakState {
        let mut streak = StreakState::default();
        for _ in 0..losses {
            streak.record_loss();
        }
        for _ in 0..wins {
            streak.record_win();
        }
        streak
    }

    #[test]
    fn test_no_streak_no_bonus() {
        let streak = streak_of(0, 4);
        assert_eq!(
            mines_bonus(&streak, 1.0, 0.5, 10, &MinesConfig::default()),
            1.0
        );
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(
                towers_bonus(&streak, difficulty, &TowersConfig::default()),
                1.0
            );
        }
    }

    #[test]
    fn test_mines_bonus_formula() {
        let streak = streak_of(2, 0);
        let bonus = mines_bonus(&streak, 0.5, 0.12, 1, &MinesConfig::default());
        let expected = 1.0 + 0.5 * 0.12 * 3f64.ln() * 1.25 * 1.15;
        assert!((bonus - expected).abs() < 1e-9);
    }

    #[test]
    fn test_mines_bonus_capped() {
        let streak = streak_of(1_000, 0);
        assert_eq!(
            mines_bonus(&streak, 1.0, 0.96, 200, &MinesConfig::default()),
            25.0
        );
    }

    #[test]
    fn test_towers_bonus_formula() {
        let streak = streak_of(3, 2);
        let bonus = towers_bonus(&streak, Difficulty::Hard, &TowersConfig::default());
        let expected = (1.0 + 4f64.ln() * 0.1) * 1.3 * (1.0 + 2.0 * 0.02);
        assert!((bonus - expected).abs() < 1e-9);
    }

    #[test]
    fn test_towers_bonus_capped() {
        let streak = StreakState {
            win_streak: 1_000_000,
            history: Default::default(),
        };
        assert!(towers_bonus(&streak, Difficulty::Hard, &TowersConfig::default()) <= 2.5);
    }

    proptest! {
        #[test]
        fn bonuses_stay_in_range(
            wins in 0u32..500,
            losses in 0u32..10,
            ratio in 0.0f64..=1.0,
            density in 0.0f64..=1.0,
            level in 0u32..100,
        ) {
            let streak = streak_of(wins, losses);
            let mines = mines_bonus(&streak, ratio, density, level, &MinesConfig::default());
            prop_assert!((1.0..=25.0).contains(&mines));
            for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
                let towers = towers_bonus(&streak, difficulty, &TowersConfig::default());
                prop_assert!((1.0..=2.5).contains(&towers));
            }
        }

        #[test]
        fn mines_bonus_never_shrinks_with_streak(
            wins in 0u32..300,
            ratio in 0.0f64..=1.0,
            density in 0.0f64..=1.0,
            level in 0u32..50,
        ) {
            let config = MinesConfig::default();
            let shorter = mines_bonus(&streak_of(wins, 0), ratio, density, level, &config);
            let longer = mines_bonus(&streak_of(wins + 1, 0), ratio, density, level, &config);
            prop_assert!(longer >= shorter);
        }

        #[test]
        fn towers_bonus_grows_with_streak(wins in 1u32..200) {
            let config = TowersConfig { bonus_cap: f64::MAX, ..Default::default() };
            let shorter = towers_bonus(&streak_of(wins, 0), Difficulty::Easy, &config);
            let longer = towers_bonus(&streak_of(wins + 1, 0), Difficulty::Easy, &config);
            prop_assert!(longer > shorter);
        }
    }
}
