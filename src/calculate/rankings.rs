//! Per-stat ranking calculators.
//!
//! Every stat produces a full ranking. The single-leader view is the first
//! entry of that ranking, so both views always agree.

use rust_decimal::Decimal;

use crate::ledger::{Aggregate, AggregateRow};
use crate::models::StatType;

/// Default minimum number of games for the consistency stat.
pub const DEFAULT_CONSISTENCY_MIN_GAMES: u32 = 3;

/// Tunables for the calculators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculatorOptions {
    pub consistency_min_games: u32,
}

impl Default for CalculatorOptions {
    fn default() -> Self {
        Self {
            consistency_min_games: DEFAULT_CONSISTENCY_MIN_GAMES,
        }
    }
}

/// A row with its 1-based position in the ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub rank: u32,
    /// Aggregate the ranking was sorted on.
    pub value: Decimal,
    pub row: AggregateRow,
}

/// Aggregate each stat is ranked on.
pub fn aggregate_for(stat_type: StatType) -> Aggregate {
    match stat_type {
        StatType::TopProfitPlayer | StatType::BiggestLoser => Aggregate::Sum,
        StatType::MostActivePlayer => Aggregate::CountDistinctGames,
        StatType::HighestSingleGameProfit => Aggregate::Max,
        StatType::MostConsistentPlayer => Aggregate::StdDev,
    }
}

/// Qualifying value of a row, or `None` if the row is left out of the stat.
///
/// A missing aggregate never qualifies; it is not the same as zero.
pub fn qualifying_value(
    stat_type: StatType,
    row: &AggregateRow,
    options: &CalculatorOptions,
) -> Option<Decimal> {
    let value = row.aggregate?;
    match stat_type {
        StatType::MostConsistentPlayer
            if row.qualifying_games < options.consistency_min_games =>
        {
            None
        }
        _ => Some(value),
    }
}

/// Filter, sort and rank rows for a stat.
///
/// Sorting is stable, so equal values keep the order the rows came in.
pub fn rank_players(
    stat_type: StatType,
    rows: Vec<AggregateRow>,
    options: &CalculatorOptions,
) -> Vec<RankedRow> {
    let mut qualified: Vec<(Decimal, AggregateRow)> = rows
        .into_iter()
        .filter_map(|row| qualifying_value(stat_type, &row, options).map(|v| (v, row)))
        .collect();

    if stat_type.ascending() {
        qualified.sort_by(|a, b| a.0.cmp(&b.0));
    } else {
        qualified.sort_by(|a, b| b.0.cmp(&a.0));
    }

    qualified
        .into_iter()
        .enumerate()
        .map(|(idx, (value, row))| RankedRow {
            rank: idx as u32 + 1,
            value,
            row,
        })
        .collect()
}

/// Top entry of the ranking.
pub fn leader(
    stat_type: StatType,
    rows: Vec<AggregateRow>,
    options: &CalculatorOptions,
) -> Option<RankedRow> {
    rank_players(stat_type, rows, options).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{PlayerIdentity, PlayerKey};

    fn row(user_id: i64, aggregate: Option<i64>, games: u32) -> AggregateRow {
        AggregateRow {
            player: PlayerIdentity {
                key: PlayerKey::User(user_id),
                full_name: format!("Player {}", user_id),
                profile_image_url: None,
            },
            aggregate: aggregate.map(Decimal::from),
            games_played: games,
            qualifying_games: games,
            total_profit: None,
            average_profit: None,
        }
    }

    fn user_order(ranked: &[RankedRow]) -> Vec<i64> {
        ranked
            .iter()
            .map(|r| r.row.player.key.user_id().unwrap())
            .collect()
    }

    #[test]
    fn test_aggregate_for_each_stat() {
        assert_eq!(aggregate_for(StatType::TopProfitPlayer), Aggregate::Sum);
        assert_eq!(
            aggregate_for(StatType::MostActivePlayer),
            Aggregate::CountDistinctGames
        );
        assert_eq!(
            aggregate_for(StatType::HighestSingleGameProfit),
            Aggregate::Max
        );
        assert_eq!(
            aggregate_for(StatType::MostConsistentPlayer),
            Aggregate::StdDev
        );
        assert_eq!(aggregate_for(StatType::BiggestLoser), Aggregate::Sum);
    }

    #[test]
    fn test_descending_stats() {
        let rows = vec![row(1, Some(10), 1), row(2, Some(90), 1), row(3, Some(-5), 1)];
        let options = CalculatorOptions::default();

        for stat_type in [
            StatType::TopProfitPlayer,
            StatType::MostActivePlayer,
            StatType::HighestSingleGameProfit,
        ] {
            let ranked = rank_players(stat_type, rows.clone(), &options);
            assert_eq!(user_order(&ranked), vec![2, 1, 3]);
        }
    }

    #[test]
    fn test_biggest_loser_ascends() {
        let rows = vec![row(1, Some(-20), 1), row(2, Some(30), 1), row(3, Some(-75), 1)];
        let ranked = rank_players(StatType::BiggestLoser, rows, &CalculatorOptions::default());

        assert_eq!(user_order(&ranked), vec![3, 1, 2]);
        assert_eq!(ranked[0].value, Decimal::from(-75));
    }

    #[test]
    fn test_consistency_threshold_and_direction() {
        let rows = vec![
            row(1, Some(40), 3),
            row(2, Some(5), 2), // lowest spread but too few games
            row(3, Some(12), 5),
        ];
        let ranked = rank_players(
            StatType::MostConsistentPlayer,
            rows,
            &CalculatorOptions::default(),
        );

        assert_eq!(user_order(&ranked), vec![3, 1]);
    }

    #[test]
    fn test_consistency_threshold_is_configurable() {
        let rows = vec![row(1, Some(40), 3), row(2, Some(5), 2)];
        let options = CalculatorOptions {
            consistency_min_games: 2,
        };
        let ranked = rank_players(StatType::MostConsistentPlayer, rows, &options);
        assert_eq!(user_order(&ranked), vec![2, 1]);
    }

    #[test]
    fn test_missing_aggregate_never_qualifies() {
        let rows = vec![row(1, None, 1), row(2, Some(0), 1), row(3, Some(-10), 1)];
        let ranked = rank_players(
            StatType::TopProfitPlayer,
            rows,
            &CalculatorOptions::default(),
        );

        assert_eq!(user_order(&ranked), vec![2, 3]);
    }

    #[test]
    fn test_ranks_contiguous_and_ties_keep_input_order() {
        let rows = vec![
            row(4, Some(50), 1),
            row(1, Some(50), 1),
            row(9, Some(80), 1),
            row(2, Some(50), 1),
        ];
        let ranked = rank_players(
            StatType::TopProfitPlayer,
            rows,
            &CalculatorOptions::default(),
        );

        let ranks: Vec<u32> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(user_order(&ranked), vec![9, 4, 1, 2]);
    }

    #[test]
    fn test_leader_is_first_ranked() {
        let rows = vec![row(1, Some(10), 1), row(2, Some(90), 1)];
        let options = CalculatorOptions::default();

        let top = leader(StatType::TopProfitPlayer, rows.clone(), &options).unwrap();
        let ranked = rank_players(StatType::TopProfitPlayer, rows, &options);
        assert_eq!(top, ranked[0]);
        assert_eq!(top.rank, 1);
    }

    #[test]
    fn test_leader_empty() {
        assert!(leader(
            StatType::BiggestLoser,
            Vec::new(),
            &CalculatorOptions::default()
        )
        .is_none());
    }
}
