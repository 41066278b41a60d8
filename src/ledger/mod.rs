//! Read-only projection over the game ledger.
//!
//! The stats pipeline talks to storage exclusively through
//! [`LedgerRepository`]. Every call is a fresh read; nothing is cached.

mod snapshot;
mod store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use snapshot::*;
pub use store::*;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::calculate;
use crate::models::{GamePlayerId, League, LeagueId, UserId, YearWindow};
use crate::storage::StorageError;

/// Display name used for anonymous seats without a table name.
pub const ANONYMOUS_NAME: &str = "Anonymous Player";

/// Scope of a ledger read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerQuery {
    pub league_id: LeagueId,
    pub window: YearWindow,
    /// Count each anonymous seat as its own player.
    pub include_anonymous: bool,
}

impl LedgerQuery {
    pub fn new(league_id: LeagueId, window: YearWindow) -> Self {
        Self {
            league_id,
            window,
            include_anonymous: false,
        }
    }

    pub fn with_anonymous(mut self, include: bool) -> Self {
        self.include_anonymous = include;
        self
    }
}

/// Aggregate function applied to a player's per-game profits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Max,
    CountDistinctGames,
    Avg,
    StdDev,
}

impl Aggregate {
    /// Apply over known profits. Unknown profits never reach this point.
    pub fn apply(&self, profits: &[Decimal], games_played: u32) -> Option<Decimal> {
        match self {
            Aggregate::Sum => calculate::sum(profits),
            Aggregate::Max => calculate::max(profits),
            Aggregate::CountDistinctGames => Some(Decimal::from(games_played)),
            Aggregate::Avg => calculate::mean(profits),
            Aggregate::StdDev => calculate::sample_std_dev(profits),
        }
    }
}

/// Grouping key of a leaderboard row.
///
/// Registered users sort before anonymous seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlayerKey {
    User(UserId),
    Anonymous(GamePlayerId),
}

impl PlayerKey {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            PlayerKey::User(id) => Some(*id),
            PlayerKey::Anonymous(_) => None,
        }
    }
}

/// Raw display data joined onto a row. Names are unsanitized here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub key: PlayerKey,
    pub full_name: String,
    pub profile_image_url: Option<String>,
}

/// One grouped row of the projection.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub player: PlayerIdentity,
    /// Requested aggregate; `None` when no known profit was aggregated.
    pub aggregate: Option<Decimal>,
    /// Distinct games the player sat in.
    pub games_played: u32,
    /// Distinct games with a known profit.
    pub qualifying_games: u32,
    pub total_profit: Option<Decimal>,
    pub average_profit: Option<Decimal>,
}

/// League-wide rollups for the general stats view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeagueTotals {
    pub completed_games: u32,
    pub active_games: u32,
    pub total_players: u32,
    pub total_buy_ins: Decimal,
    pub total_buy_outs: Decimal,
    pub total_play_minutes: i64,
    /// Completed games with a usable start/end pair.
    pub timed_games: u32,
    pub longest_game_minutes: Option<i64>,
}

/// Typed read access to the ledger.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Look up a league by id.
    async fn league(&self, league_id: LeagueId) -> Result<Option<League>, StorageError>;

    /// Completed games of the league that ended inside the window.
    async fn count_completed_games(&self, query: &LedgerQuery) -> Result<u64, StorageError>;

    /// Per-player rows with the requested aggregate over profit.
    async fn aggregate(
        &self,
        query: &LedgerQuery,
        aggregate: Aggregate,
    ) -> Result<Vec<AggregateRow>, StorageError>;

    /// League-wide rollups.
    async fn league_totals(&self, query: &LedgerQuery) -> Result<LeagueTotals, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_apply() {
        let profits = vec![Decimal::from(50), Decimal::from(-10), Decimal::from(20)];

        assert_eq!(Aggregate::Sum.apply(&profits, 3), Some(Decimal::from(60)));
        assert_eq!(Aggregate::Max.apply(&profits, 3), Some(Decimal::from(50)));
        assert_eq!(Aggregate::Avg.apply(&profits, 3), Some(Decimal::from(20)));
        assert_eq!(
            Aggregate::CountDistinctGames.apply(&profits, 4),
            Some(Decimal::from(4))
        );
        assert!(Aggregate::StdDev.apply(&profits, 3).is_some());
    }

    #[test]
    fn test_aggregate_apply_without_profits() {
        assert_eq!(Aggregate::Sum.apply(&[], 2), None);
        assert_eq!(Aggregate::Max.apply(&[], 2), None);
        assert_eq!(Aggregate::StdDev.apply(&[], 2), None);
        // Game counts do not depend on known profits
        assert_eq!(
            Aggregate::CountDistinctGames.apply(&[], 2),
            Some(Decimal::from(2))
        );
    }

    #[test]
    fn test_player_key_order() {
        let mut keys = vec![
            PlayerKey::Anonymous(1),
            PlayerKey::User(9),
            PlayerKey::User(2),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![PlayerKey::User(2), PlayerKey::User(9), PlayerKey::Anonymous(1)]
        );
        assert_eq!(PlayerKey::Anonymous(1).user_id(), None);
    }
}
