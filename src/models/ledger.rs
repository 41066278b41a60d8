//! Ledger entities owned by the game/buy-in side of the system.
//!
//! The stats core only ever reads these.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// League identifier.
pub type LeagueId = i64;

/// User identifier.
pub type UserId = i64;

/// Game identifier.
pub type GameId = i64;

/// Game-player (seat) identifier.
pub type GamePlayerId = i64;

/// A poker league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Role of a member within a league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Member,
}

/// A user's membership in a league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueMember {
    pub league_id: LeagueId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub is_active: bool,
}

/// Lifecycle state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Active,
    Completed,
}

/// A single poker session within a league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub league_id: LeagueId,
    pub status: GameStatus,
    pub started_at: DateTime<Utc>,
    /// Unset while the game is still running.
    pub ended_at: Option<DateTime<Utc>>,
}

impl Game {
    pub fn is_completed(&self) -> bool {
        self.status == GameStatus::Completed
    }

    /// Length of a finished game in whole minutes.
    ///
    /// `None` when the game has no end time or the timestamps are inverted.
    pub fn duration_minutes(&self) -> Option<i64> {
        let ended_at = self.ended_at?;
        if ended_at < self.started_at {
            return None;
        }
        Some((ended_at - self.started_at).num_minutes())
    }
}

/// A seat at a game. Anonymous players have no `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePlayer {
    pub id: GamePlayerId,
    pub game_id: GameId,
    pub user_id: Option<UserId>,
    /// Table name for anonymous players.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashInType {
    BuyIn,
    BuyOut,
}

/// Raw ledger entry. Amounts are stored as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashIn {
    pub id: i64,
    pub game_player_id: GamePlayerId,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: CashInType,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Display data for a registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

/// Buy-in/buy-out totals of one game player, derived from its cash-ins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeatTotals {
    pub total_buy_ins: Option<Decimal>,
    pub total_buy_outs: Option<Decimal>,
}

impl SeatTotals {
    /// Fold a set of cash-in entries into totals.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a CashIn>) -> Self {
        let mut totals = SeatTotals::default();
        for entry in entries {
            let slot = match entry.kind {
                CashInType::BuyIn => &mut totals.total_buy_ins,
                CashInType::BuyOut => &mut totals.total_buy_outs,
            };
            *slot = Some(slot.unwrap_or(Decimal::ZERO).saturating_add(entry.amount));
        }
        totals
    }

    /// Buy-outs minus buy-ins.
    ///
    /// Unknown when the seat has no entries at all or the difference overflows.
    pub fn profit(&self) -> Option<Decimal> {
        if self.total_buy_ins.is_none() && self.total_buy_outs.is_none() {
            return None;
        }
        let buy_outs = self.total_buy_outs.unwrap_or(Decimal::ZERO);
        let buy_ins = self.total_buy_ins.unwrap_or(Decimal::ZERO);
        buy_outs.checked_sub(buy_ins)
    }
}
