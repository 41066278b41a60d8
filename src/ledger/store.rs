//! JSONL-backed ledger repository.

use async_trait::async_trait;
use tracing::debug;

use super::{
    is_counted, Aggregate, AggregateRow, LedgerQuery, LedgerRepository, LedgerSnapshot,
    LeagueTotals,
};
use crate::models::{CashIn, Game, GamePlayer, League, LeagueId, LeagueMember, User};
use crate::storage::{JsonlReader, JsonlWriter, LedgerTable, StorageConfig, StorageError};

/// Reads the ledger tables from disk on every call.
#[derive(Debug, Clone)]
pub struct JsonlLedgerStore {
    config: StorageConfig,
}

impl JsonlLedgerStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Load the tables, keeping only the league-scoped rows of one league.
    pub fn load_league(&self, league_id: LeagueId) -> Result<LedgerSnapshot, StorageError> {
        let leagues = JsonlReader::<League>::for_table(&self.config, LedgerTable::Leagues)
            .read_where(|l| l.id == league_id)?;
        let members =
            JsonlReader::<LeagueMember>::for_table(&self.config, LedgerTable::LeagueMembers)
                .read_where(|m| m.league_id == league_id)?;
        let games = JsonlReader::<Game>::for_table(&self.config, LedgerTable::Games)
            .read_where(|g| g.league_id == league_id)?;

        let snapshot = LedgerSnapshot {
            leagues,
            members,
            users: JsonlReader::<User>::for_table(&self.config, LedgerTable::Users).read_all()?,
            games,
            game_players: JsonlReader::<GamePlayer>::for_table(
                &self.config,
                LedgerTable::GamePlayers,
            )
            .read_all()?,
            cash_ins: JsonlReader::<CashIn>::for_table(&self.config, LedgerTable::CashIns)
                .read_all()?,
        };

        debug!(
            league_id,
            games = snapshot.games.len(),
            seats = snapshot.game_players.len(),
            "Loaded league ledger"
        );
        Ok(snapshot)
    }

    /// Replace every table with the snapshot's rows.
    pub fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), StorageError> {
        JsonlWriter::for_table(&self.config, LedgerTable::Leagues).write_all(&snapshot.leagues)?;
        JsonlWriter::for_table(&self.config, LedgerTable::LeagueMembers)
            .write_all(&snapshot.members)?;
        JsonlWriter::for_table(&self.config, LedgerTable::Users).write_all(&snapshot.users)?;
        JsonlWriter::for_table(&self.config, LedgerTable::Games).write_all(&snapshot.games)?;
        JsonlWriter::for_table(&self.config, LedgerTable::GamePlayers)
            .write_all(&snapshot.game_players)?;
        JsonlWriter::for_table(&self.config, LedgerTable::CashIns).write_all(&snapshot.cash_ins)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for JsonlLedgerStore {
    async fn league(&self, league_id: LeagueId) -> Result<Option<League>, StorageError> {
        let mut leagues = JsonlReader::<League>::for_table(&self.config, LedgerTable::Leagues)
            .read_where(|l| l.id == league_id)?;
        Ok(leagues.pop())
    }

    async fn count_completed_games(&self, query: &LedgerQuery) -> Result<u64, StorageError> {
        let games = JsonlReader::<Game>::for_table(&self.config, LedgerTable::Games)
            .read_where(|g| is_counted(g, query))?;
        Ok(games.len() as u64)
    }

    async fn aggregate(
        &self,
        query: &LedgerQuery,
        aggregate: Aggregate,
    ) -> Result<Vec<AggregateRow>, StorageError> {
        Ok(self
            .load_league(query.league_id)?
            .aggregate_rows(query, aggregate))
    }

    async fn league_totals(&self, query: &LedgerQuery) -> Result<LeagueTotals, StorageError> {
        Ok(self.load_league(query.league_id)?.totals(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::fixtures::LedgerFixture;
    use crate::ledger::PlayerKey;
    use crate::models::YearWindow;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn sample_fixture() -> LedgerFixture {
        let mut fx = LedgerFixture::new();
        fx.add_user(1, "Alice");
        fx.add_user(2, "Bob");
        let g1 = fx.add_completed_game(2024, 3, 1);
        fx.add_seat(g1, Some(1), 100, 150);
        fx.add_seat(g1, Some(2), 100, 50);
        fx
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlLedgerStore::new(StorageConfig::new(temp_dir.path().to_path_buf()));
        let fx = sample_fixture();

        store.save(&fx.snapshot).unwrap();
        let loaded = store.load_league(LedgerFixture::LEAGUE_ID).unwrap();

        assert_eq!(loaded.leagues, fx.snapshot.leagues);
        assert_eq!(loaded.games, fx.snapshot.games);
        assert_eq!(loaded.cash_ins, fx.snapshot.cash_ins);
    }

    #[test]
    fn test_empty_data_dir_reads_as_empty_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlLedgerStore::new(StorageConfig::new(temp_dir.path().to_path_buf()));
        let query = LedgerQuery::new(1, YearWindow::for_year(2024).unwrap());

        let count = tokio_test::block_on(store.count_completed_games(&query)).unwrap();
        assert_eq!(count, 0);
        assert!(tokio_test::block_on(store.league(1)).unwrap().is_none());
    }

    #[test]
    fn test_load_league_filters_other_leagues() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlLedgerStore::new(StorageConfig::new(temp_dir.path().to_path_buf()));
        let mut fx = sample_fixture();
        fx.add_game_in_league(2, crate::models::GameStatus::Completed, Some((2024, 1, 5)));
        store.save(&fx.snapshot).unwrap();

        let snapshot = store.load_league(LedgerFixture::LEAGUE_ID).unwrap();
        assert_eq!(snapshot.games.len(), 1);
        assert_eq!(snapshot.leagues.len(), 1);
    }

    #[tokio::test]
    async fn test_repository_reads_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlLedgerStore::new(StorageConfig::new(temp_dir.path().to_path_buf()));
        store.save(&sample_fixture().snapshot).unwrap();

        let query = LedgerQuery::new(LedgerFixture::LEAGUE_ID, YearWindow::for_year(2024).unwrap());
        assert_eq!(store.count_completed_games(&query).await.unwrap(), 1);

        let rows = store.aggregate(&query, Aggregate::Sum).await.unwrap();
        let sums: Vec<_> = rows.iter().map(|r| (r.player.key, r.aggregate)).collect();
        assert_eq!(
            sums,
            vec![
                (PlayerKey::User(1), Some(Decimal::from(50))),
                (PlayerKey::User(2), Some(Decimal::from(-50))),
            ]
        );

        let league = store.league(LedgerFixture::LEAGUE_ID).await.unwrap().unwrap();
        assert_eq!(league.name, "Friday Night Poker");
    }
}
