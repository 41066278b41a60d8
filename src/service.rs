//! Stats service.
//!
//! Validates input, runs the completed-games precondition and wires the
//! ledger reader through the calculators into the response shaper.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::{aggregate_for, leader, rank_players, CalculatorOptions};
use crate::config::StatsConfig;
use crate::ledger::{LedgerQuery, LedgerRepository};
use crate::models::{League, LeagueId, StatType, YearWindow};
use crate::shaper::{GeneralStatsResponse, RankingResponse, ResponseShaper, SingleStatResponse};
use crate::storage::StorageError;

/// Earliest year a league can be queried for.
pub const MIN_YEAR: i32 = 2000;

/// Stats pipeline errors.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Invalid league id: {0}")]
    InvalidLeagueId(String),

    #[error("Invalid year: {0}")]
    InvalidYear(String),

    #[error("Unsupported stat type: {0}")]
    UnsupportedStatType(String),

    #[error("statType is required")]
    MissingStatType,

    #[error("League not found: {0}")]
    LeagueNotFound(LeagueId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Parse a league id path segment. Only positive integers are accepted.
pub fn validate_league_id(raw: &str) -> Result<LeagueId, StatsError> {
    match raw.trim().parse::<LeagueId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(StatsError::InvalidLeagueId(raw.to_string())),
    }
}

/// Resolve the requested year into its window.
///
/// A missing year means `current_year`. A given year must be exactly four
/// digits and fall in `MIN_YEAR..=current_year + 1`.
pub fn parse_year(raw: Option<&str>, current_year: i32) -> Result<YearWindow, StatsError> {
    let year = match raw {
        None => current_year,
        Some(s) => {
            if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(StatsError::InvalidYear(s.to_string()));
            }
            let year: i32 = s
                .parse()
                .map_err(|_| StatsError::InvalidYear(s.to_string()))?;
            if !(MIN_YEAR..=current_year + 1).contains(&year) {
                return Err(StatsError::InvalidYear(s.to_string()));
            }
            year
        }
    };

    YearWindow::for_year(year).ok_or_else(|| StatsError::InvalidYear(year.to_string()))
}

pub fn parse_stat_type(raw: &str) -> Result<StatType, StatsError> {
    raw.parse::<StatType>()
        .map_err(|e| StatsError::UnsupportedStatType(e.0))
}

/// Entry point for every stats request.
#[derive(Clone)]
pub struct StatsService {
    repo: Arc<dyn LedgerRepository>,
    options: CalculatorOptions,
    shaper: ResponseShaper,
    include_anonymous: bool,
}

impl StatsService {
    pub fn new(repo: Arc<dyn LedgerRepository>, config: &StatsConfig) -> Self {
        Self {
            repo,
            options: CalculatorOptions {
                consistency_min_games: config.consistency_min_games,
            },
            shaper: ResponseShaper::new(config.value_decimals, config.consistency_min_games),
            include_anonymous: config.include_anonymous,
        }
    }

    fn query(&self, league_id: LeagueId, window: YearWindow) -> LedgerQuery {
        LedgerQuery::new(league_id, window).with_anonymous(self.include_anonymous)
    }

    /// Missing and inactive leagues are both reported as not found.
    async fn require_league(&self, league_id: LeagueId) -> Result<League, StatsError> {
        match self.repo.league(league_id).await? {
            Some(league) if league.is_active => Ok(league),
            _ => Err(StatsError::LeagueNotFound(league_id)),
        }
    }

    /// `None` when the window holds no completed game.
    async fn completed_query(
        &self,
        league_id: LeagueId,
        window: YearWindow,
    ) -> Result<Option<LedgerQuery>, StatsError> {
        self.require_league(league_id).await?;
        let query = self.query(league_id, window);
        let completed = self.repo.count_completed_games(&query).await?;
        if completed == 0 {
            info!(league_id, year = window.year, "No completed games in window");
            return Ok(None);
        }
        debug!(league_id, year = window.year, completed, "Computing stats");
        Ok(Some(query))
    }

    /// Leader of one stat.
    pub async fn single_stat(
        &self,
        league_id: LeagueId,
        stat_type: StatType,
        window: YearWindow,
    ) -> Result<SingleStatResponse, StatsError> {
        let Some(query) = self.completed_query(league_id, window).await? else {
            return Ok(self.shaper.no_games_single(stat_type, window.year));
        };

        let rows = self.repo.aggregate(&query, aggregate_for(stat_type)).await?;
        let top = leader(stat_type, rows, &self.options);
        Ok(self.shaper.single(stat_type, window.year, top.as_ref()))
    }

    /// Full ranking of one stat.
    pub async fn ranking(
        &self,
        league_id: LeagueId,
        stat_type: StatType,
        window: YearWindow,
    ) -> Result<RankingResponse, StatsError> {
        let Some(query) = self.completed_query(league_id, window).await? else {
            return Ok(self.shaper.no_games_ranking(stat_type, window.year));
        };

        let rows = self.repo.aggregate(&query, aggregate_for(stat_type)).await?;
        let ranked = rank_players(stat_type, rows, &self.options);
        debug!(league_id, %stat_type, players = ranked.len(), "Ranked players");
        Ok(self.shaper.ranking(stat_type, window.year, &ranked))
    }

    /// League-wide rollups.
    pub async fn general_stats(
        &self,
        league_id: LeagueId,
        window: YearWindow,
    ) -> Result<GeneralStatsResponse, StatsError> {
        let league = self.require_league(league_id).await?;
        let totals = self
            .repo
            .league_totals(&self.query(league_id, window))
            .await?;
        Ok(self.shaper.general(&league, window.year, &totals))
    }
}
