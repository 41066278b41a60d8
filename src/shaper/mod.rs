//! Response shaping.
//!
//! Turns ranked calculator output into the external JSON shape: sanitized
//! names, `null` for missing images, rounded floats, ranks, labels and the
//! messages that tell the two empty outcomes apart.

mod sanitize;

pub use sanitize::*;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::calculate::{RankedRow, DEFAULT_CONSISTENCY_MIN_GAMES};
use crate::ledger::LeagueTotals;
use crate::models::{AdditionalData, League, LeagueId, PlayerStat, StatType};

/// Message for a window without any completed game.
pub const NO_COMPLETED_GAMES: &str = "No completed games found for this year";

/// Message when games exist but nobody qualified for the stat.
pub const NO_QUALIFYING_PLAYERS: &str = "No players qualified for this stat";

/// Default number of decimal places in formatted values.
pub const DEFAULT_VALUE_DECIMALS: u32 = 2;

/// Single-leader response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleStatResponse {
    #[serde(rename = "type")]
    pub stat_type: StatType,
    pub label: String,
    pub year: i32,
    pub data: Option<PlayerStat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Full ranking response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    #[serde(rename = "type")]
    pub stat_type: StatType,
    pub label: String,
    pub year: i32,
    pub data: Vec<PlayerStat>,
    /// Same entry as `data[0]`, for hero-card views.
    pub top_player: Option<PlayerStat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// League-wide rollups without ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStatsResponse {
    pub league_id: LeagueId,
    pub league_name: String,
    pub year: i32,
    pub total_games: u32,
    pub completed_games: u32,
    pub active_games: u32,
    pub total_players: u32,
    pub total_buy_ins: f64,
    pub total_buy_outs: f64,
    pub total_play_minutes: i64,
    pub average_game_minutes: f64,
    pub longest_game_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Formats calculator output for the boundary.
#[derive(Debug, Clone, Copy)]
pub struct ResponseShaper {
    pub value_decimals: u32,
    pub consistency_min_games: u32,
}

impl Default for ResponseShaper {
    fn default() -> Self {
        Self {
            value_decimals: DEFAULT_VALUE_DECIMALS,
            consistency_min_games: DEFAULT_CONSISTENCY_MIN_GAMES,
        }
    }
}

impl ResponseShaper {
    pub fn new(value_decimals: u32, consistency_min_games: u32) -> Self {
        Self {
            value_decimals,
            consistency_min_games,
        }
    }

    /// Decimal to rounded float. Missing or unrepresentable values become 0.
    pub fn format_value(&self, value: Option<Decimal>) -> f64 {
        value
            .map(|v| v.round_dp_with_strategy(self.value_decimals, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|v| v.to_f64())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    /// Build the external entry for a ranked row.
    ///
    /// `rank` is `None` in single-leader mode.
    pub fn player_stat(&self, stat_type: StatType, ranked: &RankedRow, rank: Option<u32>) -> PlayerStat {
        let row = &ranked.row;
        let mut additional = AdditionalData {
            games_played: row.games_played,
            ..Default::default()
        };

        let value = match stat_type {
            StatType::TopProfitPlayer => ranked.value,
            StatType::MostActivePlayer | StatType::HighestSingleGameProfit => {
                additional.total_profit = row.total_profit.map(|v| self.format_value(Some(v)));
                ranked.value
            }
            StatType::MostConsistentPlayer => {
                additional.average_profit = row.average_profit.map(|v| self.format_value(Some(v)));
                ranked.value
            }
            StatType::BiggestLoser => {
                additional.actual_loss = Some(self.format_value(Some(ranked.value)));
                ranked.value.abs()
            }
        };

        PlayerStat {
            user_id: row.player.key.user_id(),
            full_name: display_name(&row.player.full_name),
            profile_image_url: normalize_image_url(row.player.profile_image_url.as_deref()),
            value: self.format_value(Some(value)),
            rank,
            additional_data: additional,
        }
    }

    fn empty_message(&self, stat_type: StatType) -> String {
        match stat_type {
            StatType::MostConsistentPlayer => format!(
                "No players with at least {} completed games this year",
                self.consistency_min_games
            ),
            _ => NO_QUALIFYING_PLAYERS.to_string(),
        }
    }

    /// Single-leader response from the top of a ranking.
    pub fn single(&self, stat_type: StatType, year: i32, leader: Option<&RankedRow>) -> SingleStatResponse {
        let data = leader.map(|r| self.player_stat(stat_type, r, None));
        let message = data.is_none().then(|| self.empty_message(stat_type));
        SingleStatResponse {
            stat_type,
            label: stat_type.label().to_string(),
            year,
            data,
            message,
        }
    }

    /// Ranking response; ranks follow list position.
    pub fn ranking(&self, stat_type: StatType, year: i32, ranked: &[RankedRow]) -> RankingResponse {
        let data: Vec<PlayerStat> = ranked
            .iter()
            .map(|r| self.player_stat(stat_type, r, Some(r.rank)))
            .collect();
        let message = data.is_empty().then(|| self.empty_message(stat_type));
        RankingResponse {
            stat_type,
            label: stat_type.label().to_string(),
            year,
            top_player: data.first().cloned(),
            data,
            message,
        }
    }

    pub fn no_games_single(&self, stat_type: StatType, year: i32) -> SingleStatResponse {
        SingleStatResponse {
            stat_type,
            label: stat_type.label().to_string(),
            year,
            data: None,
            message: Some(NO_COMPLETED_GAMES.to_string()),
        }
    }

    pub fn no_games_ranking(&self, stat_type: StatType, year: i32) -> RankingResponse {
        RankingResponse {
            stat_type,
            label: stat_type.label().to_string(),
            year,
            data: Vec::new(),
            top_player: None,
            message: Some(NO_COMPLETED_GAMES.to_string()),
        }
    }

    /// General league rollups.
    pub fn general(&self, league: &League, year: i32, totals: &LeagueTotals) -> GeneralStatsResponse {
        let average_game_minutes = if totals.timed_games > 0 {
            let avg = totals.total_play_minutes as f64 / totals.timed_games as f64;
            (avg * 10.0).round() / 10.0
        } else {
            0.0
        };

        GeneralStatsResponse {
            league_id: league.id,
            league_name: display_name(&league.name),
            year,
            total_games: totals.completed_games + totals.active_games,
            completed_games: totals.completed_games,
            active_games: totals.active_games,
            total_players: totals.total_players,
            total_buy_ins: self.format_value(Some(totals.total_buy_ins)),
            total_buy_outs: self.format_value(Some(totals.total_buy_outs)),
            total_play_minutes: totals.total_play_minutes,
            average_game_minutes,
            longest_game_minutes: totals.longest_game_minutes,
            message: (totals.completed_games == 0).then(|| NO_COMPLETED_GAMES.to_string()),
        }
    }
}
