//! In-memory ledger tables and the projection logic over them.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use super::{
    Aggregate, AggregateRow, LedgerQuery, LedgerRepository, LeagueTotals, PlayerIdentity,
    PlayerKey, ANONYMOUS_NAME,
};
use crate::calculate;
use crate::models::{
    CashIn, Game, GameId, GamePlayer, GamePlayerId, GameStatus, League, LeagueId, LeagueMember,
    SeatTotals, User, UserId,
};
use crate::storage::StorageError;

/// Point-in-time copy of the ledger tables.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    pub leagues: Vec<League>,
    pub members: Vec<LeagueMember>,
    pub users: Vec<User>,
    pub games: Vec<Game>,
    pub game_players: Vec<GamePlayer>,
    pub cash_ins: Vec<CashIn>,
}

/// One seat that passed every filter, with its derived totals.
#[derive(Debug, Clone)]
struct Seat<'a> {
    key: PlayerKey,
    game_id: GameId,
    player: &'a GamePlayer,
    totals: SeatTotals,
}

/// Whether a game counts toward the query: completed, in the league, and
/// ended inside the window. Games without an end time never count.
pub fn is_counted(game: &Game, query: &LedgerQuery) -> bool {
    game.league_id == query.league_id
        && game.is_completed()
        && game.ended_at.is_some_and(|ended| query.window.contains(ended))
}

impl LedgerSnapshot {
    /// Completed games of the league whose end time falls in the window.
    pub fn completed_games<'a>(&'a self, query: &'a LedgerQuery) -> impl Iterator<Item = &'a Game> {
        self.games.iter().filter(move |g| is_counted(g, query))
    }

    fn active_member_ids(&self, league_id: LeagueId) -> HashSet<UserId> {
        self.members
            .iter()
            .filter(|m| m.league_id == league_id && m.is_active)
            .map(|m| m.user_id)
            .collect()
    }

    fn cash_ins_by_seat(&self) -> HashMap<GamePlayerId, Vec<&CashIn>> {
        let mut index: HashMap<GamePlayerId, Vec<&CashIn>> = HashMap::new();
        for entry in &self.cash_ins {
            index.entry(entry.game_player_id).or_default().push(entry);
        }
        index
    }

    /// Seats in qualifying games, joined and filtered.
    ///
    /// User seats need an active membership and a user row; anonymous seats
    /// are kept only when the query asks for them.
    fn seats<'a>(&'a self, query: &'a LedgerQuery) -> Vec<Seat<'a>> {
        let game_ids: HashSet<GameId> = self.completed_games(query).map(|g| g.id).collect();
        if game_ids.is_empty() {
            return Vec::new();
        }

        let members = self.active_member_ids(query.league_id);
        let known_users: HashSet<UserId> = self.users.iter().map(|u| u.id).collect();
        let cash_ins = self.cash_ins_by_seat();

        self.game_players
            .iter()
            .filter(|gp| game_ids.contains(&gp.game_id))
            .filter_map(|gp| {
                let key = match gp.user_id {
                    Some(user_id) => {
                        if !members.contains(&user_id) || !known_users.contains(&user_id) {
                            return None;
                        }
                        PlayerKey::User(user_id)
                    }
                    None if query.include_anonymous => PlayerKey::Anonymous(gp.id),
                    None => return None,
                };

                let entries = cash_ins.get(&gp.id).map(Vec::as_slice).unwrap_or_default();
                Some(Seat {
                    key,
                    game_id: gp.game_id,
                    player: gp,
                    totals: SeatTotals::from_entries(entries.iter().copied()),
                })
            })
            .collect()
    }

    fn identity(&self, seat: &Seat<'_>, users: &HashMap<UserId, &User>) -> PlayerIdentity {
        match seat.key {
            PlayerKey::User(user_id) => {
                let user = users.get(&user_id);
                PlayerIdentity {
                    key: seat.key,
                    full_name: user.map(|u| u.full_name.clone()).unwrap_or_default(),
                    profile_image_url: user.and_then(|u| u.profile_image_url.clone()),
                }
            }
            PlayerKey::Anonymous(_) => PlayerIdentity {
                key: seat.key,
                full_name: seat
                    .player
                    .display_name
                    .clone()
                    .unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
                profile_image_url: None,
            },
        }
    }

    /// Group seats by player and compute the requested aggregate.
    ///
    /// Rows come back ordered by [`PlayerKey`].
    pub fn aggregate_rows(&self, query: &LedgerQuery, aggregate: Aggregate) -> Vec<AggregateRow> {
        struct Group {
            identity: PlayerIdentity,
            profits: Vec<Decimal>,
            games: BTreeSet<GameId>,
            profitable_games: BTreeSet<GameId>,
        }

        let users: HashMap<UserId, &User> = self.users.iter().map(|u| (u.id, u)).collect();
        let mut groups: BTreeMap<PlayerKey, Group> = BTreeMap::new();

        for seat in self.seats(query) {
            let group = groups.entry(seat.key).or_insert_with(|| Group {
                identity: self.identity(&seat, &users),
                profits: Vec::new(),
                games: BTreeSet::new(),
                profitable_games: BTreeSet::new(),
            });

            group.games.insert(seat.game_id);
            if let Some(profit) = seat.totals.profit() {
                group.profits.push(profit);
                group.profitable_games.insert(seat.game_id);
            }
        }

        debug!(
            league_id = query.league_id,
            year = query.window.year,
            ?aggregate,
            players = groups.len(),
            "Aggregated ledger rows"
        );

        groups
            .into_values()
            .map(|group| {
                let games_played = group.games.len() as u32;
                AggregateRow {
                    player: group.identity,
                    aggregate: aggregate.apply(&group.profits, games_played),
                    games_played,
                    qualifying_games: group.profitable_games.len() as u32,
                    total_profit: calculate::sum(&group.profits),
                    average_profit: calculate::mean(&group.profits),
                }
            })
            .collect()
    }

    /// League-wide rollups over the same filtered seats.
    pub fn totals(&self, query: &LedgerQuery) -> LeagueTotals {
        let mut totals = LeagueTotals::default();

        for game in self.completed_games(query) {
            totals.completed_games += 1;
            if let Some(minutes) = game.duration_minutes() {
                totals.timed_games += 1;
                totals.total_play_minutes += minutes;
                totals.longest_game_minutes = Some(
                    totals
                        .longest_game_minutes
                        .map_or(minutes, |longest| longest.max(minutes)),
                );
            }
        }

        totals.active_games = self
            .games
            .iter()
            .filter(|g| {
                g.league_id == query.league_id
                    && g.status == GameStatus::Active
                    && query.window.contains(g.started_at)
            })
            .count() as u32;

        let mut players: HashSet<PlayerKey> = HashSet::new();
        for seat in self.seats(query) {
            players.insert(seat.key);
            totals.total_buy_ins = totals
                .total_buy_ins
                .saturating_add(seat.totals.total_buy_ins.unwrap_or(Decimal::ZERO));
            totals.total_buy_outs = totals
                .total_buy_outs
                .saturating_add(seat.totals.total_buy_outs.unwrap_or(Decimal::ZERO));
        }
        totals.total_players = players.len() as u32;

        totals
    }

    pub fn find_league(&self, league_id: LeagueId) -> Option<&League> {
        self.leagues.iter().find(|l| l.id == league_id)
    }
}

#[async_trait]
impl LedgerRepository for LedgerSnapshot {
    async fn league(&self, league_id: LeagueId) -> Result<Option<League>, StorageError> {
        Ok(self.find_league(league_id).cloned())
    }

    async fn count_completed_games(&self, query: &LedgerQuery) -> Result<u64, StorageError> {
        Ok(self.completed_games(query).count() as u64)
    }

    async fn aggregate(
        &self,
        query: &LedgerQuery,
        aggregate: Aggregate,
    ) -> Result<Vec<AggregateRow>, StorageError> {
        Ok(self.aggregate_rows(query, aggregate))
    }

    async fn league_totals(&self, query: &LedgerQuery) -> Result<LeagueTotals, StorageError> {
        Ok(self.totals(query))
    }
}
