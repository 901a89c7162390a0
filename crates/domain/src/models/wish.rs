//! Wish domain model.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a wish.
///
/// `Draft` only exists inside the creation wizard; persisted wishes start at
/// `Scheduled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishStatus {
    Draft,
    Scheduled,
    Active,
    Expired,
}

impl WishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WishStatus::Draft => "draft",
            WishStatus::Scheduled => "scheduled",
            WishStatus::Active => "active",
            WishStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WishStatus::Expired)
    }
}

impl std::fmt::Display for WishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may see a wish once it is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Private,
}

/// Source of the background music.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicType {
    #[default]
    Preset,
    Custom,
}

/// Computes the reveal instant.
///
/// Dates and times are interpreted as UTC; a missing time means midnight.
pub fn reveal_instant(date: NaiveDate, time: Option<NaiveTime>) -> DateTime<Utc> {
    let naive = date.and_time(time.unwrap_or(NaiveTime::MIN));
    Utc.from_utc_datetime(&naive)
}

/// A persisted wish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wish {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub custom_url: String,
    pub recipient_name: String,
    pub gradient_id: String,
    pub note_message: Option<String>,
    pub note_author: Option<String>,
    pub music_type: MusicType,
    pub music_preset: Option<String>,
    pub music_url: Option<String>,
    pub birthday_date: NaiveDate,
    pub birthday_time: NaiveTime,
    pub reveal_at: DateTime<Utc>,
    pub privacy: Privacy,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub status: WishStatus,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wish {
    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.owner_id == account_id
    }

    pub fn is_revealed_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.reveal_at
    }
}

/// Values for a wish row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewWish {
    pub owner_id: Uuid,
    pub custom_url: String,
    pub recipient_name: String,
    pub gradient_id: String,
    pub note_message: Option<String>,
    pub note_author: Option<String>,
    pub music_type: MusicType,
    pub music_preset: Option<String>,
    pub birthday_date: NaiveDate,
    pub birthday_time: NaiveTime,
    pub reveal_at: DateTime<Utc>,
    pub privacy: Privacy,
    pub password_hash: Option<String>,
}

/// What a visitor sees once the gate has let them through.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishView {
    pub id: Uuid,
    pub custom_url: String,
    pub recipient_name: String,
    pub gradient_id: String,
    pub note_message: Option<String>,
    pub note_author: Option<String>,
    pub music_type: MusicType,
    pub music_preset: Option<String>,
    pub music_url: Option<String>,
    pub birthday_date: NaiveDate,
    pub birthday_time: NaiveTime,
    pub status: WishStatus,
    pub views_count: i64,
}

impl From<&Wish> for WishView {
    fn from(wish: &Wish) -> Self {
        Self {
            id: wish.id,
            custom_url: wish.custom_url.clone(),
            recipient_name: wish.recipient_name.clone(),
            gradient_id: wish.gradient_id.clone(),
            note_message: wish.note_message.clone(),
            note_author: wish.note_author.clone(),
            music_type: wish.music_type,
            music_preset: wish.music_preset.clone(),
            music_url: wish.music_url.clone(),
            birthday_date: wish.birthday_date,
            birthday_time: wish.birthday_time,
            status: wish.status,
            views_count: wish.views_count,
        }
    }
}

/// Owner dashboard entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishSummary {
    pub id: Uuid,
    pub custom_url: String,
    pub recipient_name: String,
    pub gradient_id: String,
    pub status: WishStatus,
    pub privacy: Privacy,
    pub birthday_date: NaiveDate,
    pub reveal_at: DateTime<Utc>,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Wish> for WishSummary {
    fn from(wish: Wish) -> Self {
        Self {
            id: wish.id,
            custom_url: wish.custom_url,
            recipient_name: wish.recipient_name,
            gradient_id: wish.gradient_id,
            status: wish.status,
            privacy: wish.privacy,
            birthday_date: wish.birthday_date,
            reveal_at: wish.reveal_at,
            views_count: wish.views_count,
            created_at: wish.created_at,
        }
    }
}
