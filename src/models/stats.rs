//! Stat types, the yearly window and the player stat output shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Leaderboard statistics a league can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatType {
    TopProfitPlayer,
    MostActivePlayer,
    HighestSingleGameProfit,
    MostConsistentPlayer,
    BiggestLoser,
}

impl StatType {
    pub const ALL: [StatType; 5] = [
        StatType::TopProfitPlayer,
        StatType::MostActivePlayer,
        StatType::HighestSingleGameProfit,
        StatType::MostConsistentPlayer,
        StatType::BiggestLoser,
    ];

    /// Wire name used in query strings and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatType::TopProfitPlayer => "top-profit-player",
            StatType::MostActivePlayer => "most-active-player",
            StatType::HighestSingleGameProfit => "highest-single-game-profit",
            StatType::MostConsistentPlayer => "most-consistent-player",
            StatType::BiggestLoser => "biggest-loser",
        }
    }

    /// Human-readable title.
    pub fn label(&self) -> &'static str {
        match self {
            StatType::TopProfitPlayer => "Top Profit Player",
            StatType::MostActivePlayer => "Most Active Player",
            StatType::HighestSingleGameProfit => "Highest Single Game Profit",
            StatType::MostConsistentPlayer => "Most Consistent Player",
            StatType::BiggestLoser => "Biggest Loser",
        }
    }

    /// Lower aggregate ranks first.
    pub fn ascending(&self) -> bool {
        matches!(
            self,
            StatType::MostConsistentPlayer | StatType::BiggestLoser
        )
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a stat type name is not one of the known variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatType(pub String);

impl fmt::Display for UnknownStatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported stat type: {}", self.0)
    }
}

impl std::error::Error for UnknownStatType {}

impl FromStr for StatType {
    type Err = UnknownStatType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| UnknownStatType(s.to_string()))
    }
}

/// Inclusive calendar-year window in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub year: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl YearWindow {
    /// Window covering Jan 1 00:00:00.000 through Dec 31 23:59:59.999.
    ///
    /// Returns `None` for years chrono cannot represent.
    pub fn for_year(year: i32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let next = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
        let start = Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0)?);
        let end = Utc.from_utc_datetime(&next.and_hms_opt(0, 0, 0)?) - Duration::milliseconds(1);
        Some(Self { year, start, end })
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// Optional per-stat details shown next to the headline value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalData {
    pub games_played: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_profit: Option<f64>,
    /// Signed sum behind a biggest-loser value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_loss: Option<f64>,
}

/// One player's entry in a stat response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStat {
    /// `None` for anonymous players.
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub profile_image_url: Option<String>,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub additional_data: AdditionalData,
}
