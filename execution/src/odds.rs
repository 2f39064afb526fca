//! Pure odds and payout functions shared by the round engines.
//!
//! Nothing here touches a ledger or a round: every function maps its inputs to
//! a probability, a multiplier or a bucket index.

use arcade_types::{
    arcade::{Difficulty, RiskLevel, TOWER_ROWS},
    config::MinesConfig,
};

/// Probability of revealing `revealed` safe cells in a row on a board of
/// `total` cells hiding `bombs` bombs.
pub fn safe_probability(total: u8, bombs: u8, revealed: u8) -> f64 {
    let safe = total.saturating_sub(bombs);
    if revealed > safe {
        return 0.0;
    }
    let mut p = 1.0;
    for i in 0..revealed {
        p *= (safe - i) as f64 / (total - i) as f64;
    }
    p
}

/// Inverse of the survival probability, scaled by the house edge.
///
/// Nothing revealed (or nothing to avoid) pays exactly the stake; an
/// impossible reveal count pays nothing.
pub fn fair_multiplier(total: u8, bombs: u8, revealed: u8, house_edge: f64) -> f64 {
    if revealed == 0 || bombs == 0 {
        return 1.0;
    }
    let p = safe_probability(total, bombs, revealed);
    if p <= 0.0 {
        return 0.0;
    }
    (1.0 / p) * house_edge
}

/// Mines multiplier after `revealed` safe cells, including the mine-count and
/// stake-size bonuses.
pub fn mines_multiplier(
    total: u8,
    bombs: u8,
    revealed: u8,
    stake_fraction: f64,
    config: &MinesConfig,
) -> f64 {
    if revealed == 0 {
        return 1.0;
    }
    let fair = fair_multiplier(total, bombs, revealed, config.house_edge);
    if fair <= 0.0 || total == 0 {
        return fair;
    }
    let density = bombs as f64 / total as f64;
    let stake = if stake_fraction.is_finite() {
        stake_fraction.clamp(0.0, config.risk_cap)
    } else {
        0.0
    };
    fair * (1.0 + density * config.mine_bonus_scale) * (1.0 + stake * config.risk_scale)
}

/// Multiplier earned by clearing a single Towers row.
pub fn tower_row_multiplier(difficulty: Difficulty, house_edge: f64) -> f64 {
    fair_multiplier(difficulty.columns(), difficulty.bombs(), 1, house_edge)
}

/// Cumulative multiplier after clearing each row: entry `r` is the payout
/// once `r + 1` rows are cleared.
pub fn tower_multipliers(difficulty: Difficulty, house_edge: f64) -> [f64; TOWER_ROWS] {
    let step = tower_row_multiplier(difficulty, house_edge);
    let mut table = [0.0; TOWER_ROWS];
    let mut current = 1.0;
    for entry in table.iter_mut() {
        current *= step;
        *entry = current;
    }
    table
}

/// Keno payouts indexed by `[picked][hits]`.
const KENO_TABLE: [&[f64]; 8] = [
    &[],
    &[0.0, 2.5],
    &[0.0, 1.0, 5.0],
    &[0.0, 0.0, 2.0, 20.0],
    &[0.0, 0.0, 1.5, 5.0, 40.0],
    &[0.0, 0.0, 0.0, 1.0, 10.0, 60.0],
    &[0.0, 0.0, 0.0, 1.0, 4.0, 25.0, 120.0],
    &[0.0, 0.0, 0.0, 0.0, 2.0, 10.0, 50.0, 250.0],
];

/// Keno multiplier for `hits` matches out of `picked` numbers (0 when the
/// pair is not in the table).
pub fn keno_payout(picked: usize, hits: usize) -> f64 {
    KENO_TABLE
        .get(picked)
        .and_then(|row| row.get(hits))
        .copied()
        .unwrap_or(0.0)
}

/// Rank of a card id: 0 = Two up to 12 = Ace.
pub fn card_rank(card: u8) -> u8 {
    card % 13
}

/// Percent chance that the next card is higher, lower or ties the current one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HiloChances {
    pub higher: f64,
    pub lower: f64,
    pub tie: f64,
}

pub fn hilo_chances(current: u8, remaining: &[u8]) -> HiloChances {
    if remaining.is_empty() {
        return HiloChances::default();
    }
    let rank = card_rank(current);
    let (mut higher, mut lower, mut tie) = (0usize, 0usize, 0usize);
    for card in remaining {
        match card_rank(*card).cmp(&rank) {
            std::cmp::Ordering::Greater => higher += 1,
            std::cmp::Ordering::Less => lower += 1,
            std::cmp::Ordering::Equal => tie += 1,
        }
    }
    let total = remaining.len() as f64;
    HiloChances {
        higher: higher as f64 * 100.0 / total,
        lower: lower as f64 * 100.0 / total,
        tie: tie as f64 * 100.0 / total,
    }
}

/// Hilo multiplier after a correct guess that had `chance` percent to win.
pub fn hilo_step(multiplier: f64, chance: f64, house_edge: f64) -> f64 {
    if chance <= 0.0 {
        return multiplier;
    }
    multiplier * (1.0 / (chance / 100.0)) * house_edge
}

/// Left half (edge to centre) of each Plinko table; the right half mirrors it.
fn plinko_half(risk: RiskLevel, rows: u8) -> Option<&'static [f64]> {
    let half: &'static [f64] = match (rows, risk) {
        (7, RiskLevel::Low) => &[5.6, 2.1, 1.1, 0.5],
        (7, RiskLevel::Medium) => &[13.0, 3.0, 1.0, 0.4],
        (7, RiskLevel::High) => &[29.0, 4.0, 0.8, 0.2],
        (9, RiskLevel::Low) => &[5.6, 2.0, 1.6, 1.0, 0.7],
        (9, RiskLevel::Medium) => &[18.0, 4.0, 1.7, 0.9, 0.5],
        (9, RiskLevel::High) => &[43.0, 7.0, 2.0, 0.6, 0.2],
        (11, RiskLevel::Low) => &[8.4, 3.0, 1.9, 1.3, 1.0, 0.7],
        (11, RiskLevel::Medium) => &[24.0, 6.0, 3.0, 1.8, 0.7, 0.5],
        (11, RiskLevel::High) => &[120.0, 14.0, 5.2, 1.4, 0.4, 0.2],
        (13, RiskLevel::Low) => &[8.1, 4.0, 3.0, 1.9, 1.2, 0.9, 0.7],
        (13, RiskLevel::Medium) => &[43.0, 13.0, 6.0, 3.0, 1.3, 0.7, 0.4],
        (13, RiskLevel::High) => &[260.0, 37.0, 11.0, 4.0, 1.0, 0.2, 0.2],
        _ => return None,
    };
    Some(half)
}

/// Bucket multipliers for a board of `rows` rows (`rows + 1` buckets), or
/// `None` for an unsupported row count.
pub fn plinko_multipliers(risk: RiskLevel, rows: u8) -> Option<Vec<f64>> {
    let half = plinko_half(risk, rows)?;
    let mut table = half.to_vec();
    table.extend(half.iter().rev());
    Some(table)
}

/// Bucket a ball landing at `final_x` falls into, clamped to the board.
pub fn resolve_bucket(final_x: f64, bucket_width: f64, bucket_count: usize) -> usize {
    if bucket_count == 0 || !final_x.is_finite() || bucket_width <= 0.0 {
        return 0;
    }
    let index = (final_x / bucket_width).floor();
    if index <= 0.0 {
        0
    } else {
        (index as usize).min(bucket_count - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_types::arcade::{MINES_GRID_SIZE, PLINKO_ROW_COUNTS};
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_safe_probability() {
        assert!(approx(safe_probability(25, 3, 0), 1.0));
        assert!(approx(safe_probability(25, 3, 1), 22.0 / 25.0));
        assert!(approx(
            safe_probability(25, 3, 2),
            (22.0 / 25.0) * (21.0 / 24.0)
        ));
        assert_eq!(safe_probability(25, 3, 23), 0.0);
    }

    #[test]
    fn test_fair_multiplier_edges() {
        assert_eq!(fair_multiplier(25, 3, 0, 0.98), 1.0);
        assert_eq!(fair_multiplier(25, 0, 5, 0.98), 1.0);
        assert_eq!(fair_multiplier(25, 3, 23, 0.98), 0.0);
        assert!(approx(fair_multiplier(25, 1, 1, 0.98), 25.0 / 24.0 * 0.98));
    }

    #[test]
    fn test_mines_multiplier_before_bonuses() {
        // 25 cells, 3 mines, 5 safe reveals with the bonus terms switched off
        let config = MinesConfig {
            mine_bonus_scale: 0.0,
            risk_scale: 0.0,
            ..Default::default()
        };
        let expected = 0.98 * (25.0 * 24.0 * 23.0 * 22.0 * 21.0)
            / (22.0 * 21.0 * 20.0 * 19.0 * 18.0);
        let multiplier = mines_multiplier(25, 3, 5, 0.1, &config);
        assert!(approx(multiplier, expected));
        assert!((multiplier - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_mines_multiplier_bonuses() {
        let config = MinesConfig::default();
        let fair = fair_multiplier(25, 3, 5, 0.98);
        let juiced = mines_multiplier(25, 3, 5, 0.1, &config);
        let expected = fair * (1.0 + 3.0 / 25.0 * 0.3) * (1.0 + 0.1 * 0.15);
        assert!(approx(juiced, expected));

        // Staking more than the cap counts as the cap
        let all_in = mines_multiplier(25, 3, 5, 4.0, &config);
        assert!(approx(all_in, fair * (1.0 + 3.0 / 25.0 * 0.3) * 1.15));

        assert_eq!(mines_multiplier(25, 3, 0, 0.5, &config), 1.0);
    }

    #[test]
    fn test_tower_multipliers() {
        let hard = tower_multipliers(Difficulty::Hard, 0.98);
        assert!(approx(hard[0], 3.0 * 0.98));
        assert!(approx(hard[TOWER_ROWS - 1], (3.0f64 * 0.98).powi(8)));

        let medium = tower_multipliers(Difficulty::Medium, 0.98);
        assert!(approx(medium[2], (2.0f64 * 0.98).powi(3)));

        let easy = tower_row_multiplier(Difficulty::Easy, 0.98);
        assert!(approx(easy, 1.5 * 0.98));
    }

    #[test]
    fn test_keno_payout() {
        assert_eq!(keno_payout(5, 3), 1.0);
        assert_eq!(keno_payout(5, 5), 60.0);
        assert_eq!(keno_payout(1, 1), 2.5);
        assert_eq!(keno_payout(7, 7), 250.0);
        assert_eq!(keno_payout(3, 1), 0.0);
        assert_eq!(keno_payout(0, 0), 0.0);
        assert_eq!(keno_payout(8, 3), 0.0);
        assert_eq!(keno_payout(4, 5), 0.0);
    }

    #[test]
    fn test_hilo_chances() {
        // Current card is a Two (id 0): nothing is lower
        let remaining: Vec<u8> = (1..52).collect();
        let chances = hilo_chances(0, &remaining);
        assert_eq!(chances.lower, 0.0);
        assert!(approx(chances.tie, 3.0 * 100.0 / 51.0));
        assert!(approx(chances.higher, 48.0 * 100.0 / 51.0));
        assert!(approx(chances.higher + chances.lower + chances.tie, 100.0));

        assert_eq!(hilo_chances(5, &[]), HiloChances::default());
    }

    #[test]
    fn test_hilo_step() {
        assert!(approx(hilo_step(1.0, 50.0, 0.97), 1.94));
        assert!(approx(hilo_step(2.0, 25.0, 0.97), 2.0 * 4.0 * 0.97));
        assert_eq!(hilo_step(1.5, 0.0, 0.97), 1.5);
    }

    #[test]
    fn test_plinko_tables() {
        for rows in PLINKO_ROW_COUNTS {
            for risk in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
                let table = plinko_multipliers(risk, rows).unwrap();
                assert_eq!(table.len(), rows as usize + 1);
                // Symmetric with the largest payouts on the edges
                for i in 0..table.len() {
                    assert_eq!(table[i], table[table.len() - 1 - i]);
                    assert!(table[i] <= table[0]);
                }
            }
        }
        assert!(plinko_multipliers(RiskLevel::Low, 8).is_none());
    }

    #[test]
    fn test_resolve_bucket() {
        assert_eq!(resolve_bucket(0.0, 10.0, 10), 0);
        assert_eq!(resolve_bucket(9.99, 10.0, 10), 0);
        assert_eq!(resolve_bucket(10.0, 10.0, 10), 1);
        assert_eq!(resolve_bucket(-5.0, 10.0, 10), 0);
        assert_eq!(resolve_bucket(1_000.0, 10.0, 10), 9);
        assert_eq!(resolve_bucket(f64::NAN, 10.0, 10), 0);
        assert_eq!(resolve_bucket(5.0, 0.0, 10), 0);
    }

    proptest! {
        #[test]
        fn mines_multiplier_grows_with_reveals(bombs in 1u8..=24, stake in 0.0f64..1.0) {
            let config = MinesConfig::default();
            let safe = MINES_GRID_SIZE - bombs;
            let mut previous = mines_multiplier(MINES_GRID_SIZE, bombs, 0, stake, &config);
            for revealed in 1..=safe {
                let current = mines_multiplier(MINES_GRID_SIZE, bombs, revealed, stake, &config);
                prop_assert!(current > previous);
                previous = current;
            }
        }

        #[test]
        fn mines_multiplier_grows_with_mines(revealed in 1u8..=23, stake in 0.0f64..1.0) {
            let config = MinesConfig::default();
            let most = MINES_GRID_SIZE - revealed;
            let mut previous = mines_multiplier(MINES_GRID_SIZE, 1, revealed, stake, &config);
            for bombs in 2..=most {
                let current = mines_multiplier(MINES_GRID_SIZE, bombs, revealed, stake, &config);
                prop_assert!(current > previous);
                previous = current;
            }
        }

        #[test]
        fn bucket_always_on_board(x in -1.0e6f64..1.0e6, width in 0.01f64..100.0, count in 1usize..20) {
            prop_assert!(resolve_bucket(x, width, count) < count);
        }

        #[test]
        fn hilo_chances_sum_to_hundred(current in 0u8..52, len in 1usize..52) {
            let remaining: Vec<u8> = (0..52).filter(|card| *card != current).take(len).collect();
            let chances = hilo_chances(current, &remaining);
            prop_assert!((chances.higher + chances.lower + chances.tie - 100.0).abs() < 1e-9);
        }
    }
}
