//! Ledger builders for tests.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use super::LedgerSnapshot;
use crate::models::{
    CashIn, CashInType, Game, GameId, GamePlayer, GamePlayerId, GameStatus, League, LeagueId,
    LeagueMember, MemberRole, User, UserId,
};

/// Builds a ledger for one league, handing out sequential ids.
pub struct LedgerFixture {
    pub snapshot: LedgerSnapshot,
    next_id: i64,
}

impl LedgerFixture {
    pub const LEAGUE_ID: LeagueId = 1;
    pub const GAME_MINUTES: i64 = 180;

    pub fn new() -> Self {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.leagues.push(League {
            id: Self::LEAGUE_ID,
            name: "Friday Night Poker".to_string(),
            is_active: true,
        });
        Self {
            snapshot,
            next_id: 100,
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Register a user with an active membership.
    pub fn add_user(&mut self, user_id: UserId, full_name: &str) {
        self.snapshot.users.push(User {
            id: user_id,
            full_name: full_name.to_string(),
            profile_image_url: None,
        });
        self.snapshot.members.push(LeagueMember {
            league_id: Self::LEAGUE_ID,
            user_id,
            role: MemberRole::Member,
            is_active: true,
        });
    }

    pub fn deactivate_member(&mut self, user_id: UserId) {
        for member in &mut self.snapshot.members {
            if member.user_id == user_id {
                member.is_active = false;
            }
        }
    }

    /// Completed game ending at 22:00 UTC on the given day.
    pub fn add_completed_game(&mut self, year: i32, month: u32, day: u32) -> GameId {
        self.add_game(GameStatus::Completed, Some((year, month, day)))
    }

    pub fn add_game(&mut self, status: GameStatus, ended_on: Option<(i32, u32, u32)>) -> GameId {
        self.add_game_in_league(Self::LEAGUE_ID, status, ended_on)
    }

    pub fn add_game_in_league(
        &mut self,
        league_id: LeagueId,
        status: GameStatus,
        ended_on: Option<(i32, u32, u32)>,
    ) -> GameId {
        let id = self.next_id();
        let (started_at, ended_at) = match ended_on {
            Some((y, m, d)) => {
                let ended = Utc.with_ymd_and_hms(y, m, d, 22, 0, 0).unwrap();
                (ended - Duration::minutes(Self::GAME_MINUTES), Some(ended))
            }
            None => (Utc.with_ymd_and_hms(2024, 6, 1, 19, 0, 0).unwrap(), None),
        };
        self.snapshot.games.push(Game {
            id,
            league_id,
            status,
            started_at,
            ended_at,
        });
        id
    }

    /// Seat with one buy-in and, when non-zero, one buy-out.
    pub fn add_seat(
        &mut self,
        game_id: GameId,
        user_id: Option<UserId>,
        buy_in: i64,
        buy_out: i64,
    ) -> GamePlayerId {
        let seat = self.add_empty_seat(game_id, user_id);
        self.add_cash_in(seat, CashInType::BuyIn, buy_in);
        if buy_out != 0 {
            self.add_cash_in(seat, CashInType::BuyOut, buy_out);
        }
        seat
    }

    /// Seat with no ledger entries.
    pub fn add_empty_seat(&mut self, game_id: GameId, user_id: Option<UserId>) -> GamePlayerId {
        let id = self.next_id();
        self.snapshot.game_players.push(GamePlayer {
            id,
            game_id,
            user_id,
            display_name: None,
        });
        id
    }

    pub fn add_cash_in(&mut self, seat: GamePlayerId, kind: CashInType, amount: i64) {
        let id = self.next_id();
        self.snapshot.cash_ins.push(CashIn {
            id,
            game_player_id: seat,
            amount: Decimal::from(amount),
            kind,
            created_at: None,
        });
    }
}
