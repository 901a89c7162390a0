//! Wish entity (database row mapping).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::models::{MusicType, Privacy, Wish, WishStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for wish status. `draft` is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "wish_status", rename_all = "lowercase")]
pub enum WishStatusDb {
    Scheduled,
    Active,
    Expired,
}

impl From<WishStatusDb> for WishStatus {
    fn from(status: WishStatusDb) -> Self {
        match status {
            WishStatusDb::Scheduled => WishStatus::Scheduled,
            WishStatusDb::Active => WishStatus::Active,
            WishStatusDb::Expired => WishStatus::Expired,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "wish_privacy", rename_all = "lowercase")]
pub enum PrivacyDb {
    Public,
    Private,
}

impl From<PrivacyDb> for Privacy {
    fn from(privacy: PrivacyDb) -> Self {
        match privacy {
            PrivacyDb::Public => Privacy::Public,
            PrivacyDb::Private => Privacy::Private,
        }
    }
}

impl From<Privacy> for PrivacyDb {
    fn from(privacy: Privacy) -> Self {
        match privacy {
            Privacy::Public => PrivacyDb::Public,
            Privacy::Private => PrivacyDb::Private,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "music_type", rename_all = "lowercase")]
pub enum MusicTypeDb {
    Preset,
    Custom,
}

impl From<MusicTypeDb> for MusicType {
    fn from(music_type: MusicTypeDb) -> Self {
        match music_type {
            MusicTypeDb::Preset => MusicType::Preset,
            MusicTypeDb::Custom => MusicType::Custom,
        }
    }
}

impl From<MusicType> for MusicTypeDb {
    fn from(music_type: MusicType) -> Self {
        match music_type {
            MusicType::Preset => MusicTypeDb::Preset,
            MusicType::Custom => MusicTypeDb::Custom,
        }
    }
}

/// Database row mapping for the wishes table.
#[derive(Debug, Clone, FromRow)]
pub struct WishEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub custom_url: String,
    pub recipient_name: String,
    pub gradient_id: String,
    pub note_message: Option<String>,
    pub note_author: Option<String>,
    pub music_type: MusicTypeDb,
    pub music_preset: Option<String>,
    pub music_url: Option<String>,
    pub birthday_date: NaiveDate,
    pub birthday_time: NaiveTime,
    pub reveal_at: DateTime<Utc>,
    pub privacy: PrivacyDb,
    pub password_hash: Option<String>,
    pub status: WishStatusDb,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WishEntity> for Wish {
    fn from(entity: WishEntity) -> Self {
        Self {
            id: entity.id,
            owner_id: entity.owner_id,
            custom_url: entity.custom_url,
            recipient_name: entity.recipient_name,
            gradient_id: entity.gradient_id,
            note_message: entity.note_message,
            note_author: entity.note_author,
            music_type: entity.music_type.into(),
            music_preset: entity.music_preset,
            music_url: entity.music_url,
            birthday_date: entity.birthday_date,
            birthday_time: entity.birthday_time,
            reveal_at: entity.reveal_at,
            privacy: entity.privacy.into(),
            password_hash: entity.password_hash,
            status: entity.status.into(),
            views_count: entity.views_count,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_conversions() {
        assert_eq!(WishStatus::from(WishStatusDb::Expired), WishStatus::Expired);
        assert_eq!(PrivacyDb::from(Privacy::Private), PrivacyDb::Private);
        assert_eq!(Privacy::from(PrivacyDb::Public), Privacy::Public);
        assert_eq!(MusicTypeDb::from(MusicType::Custom), MusicTypeDb::Custom);
        assert_eq!(MusicType::from(MusicTypeDb::Preset), MusicType::Preset);
    }
}
