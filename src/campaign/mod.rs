use std::fmt::{Debug, Display};

use chrono::{DateTime, Utc};
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub const MAX_NAME_LENGTH: usize = 200;

/// Identifier of a stored campaign. Always positive; the store hands these
/// out and they never change afterwards.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CampaignId(i64);

impl CampaignId {
    pub fn from_raw(raw: i64) -> Option<CampaignId> {
        if raw > 0 {
            Some(CampaignId(raw))
        } else {
            None
        }
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Display::fmt(&self.0, f)
    }
}

impl Debug for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Display::fmt(self, f)
    }
}

impl<'de> Deserialize<'de> for CampaignId {
    fn deserialize<D>(deserializer: D) -> Result<CampaignId, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        CampaignId::from_raw(raw).ok_or_else(|| {
            serde::de::Error::custom(format_args!(
                "campaign id must be a positive integer, got {}",
                raw
            ))
        })
    }
}

impl From<CampaignId> for Bson {
    fn from(campaign_id: CampaignId) -> Bson {
        Bson::Int64(campaign_id.0)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub name: String,
    #[serde(default, with = "option_chrono_datetime_as_bson_datetime")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// A validated campaign that has not been assigned an id yet.
#[derive(Clone, Debug)]
pub struct CampaignDraft {
    pub name: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Field subset applied by an update. `None` leaves a field untouched; for
/// the due date, `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct CampaignPatch {
    pub name: Option<String>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl CampaignPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.due_date.is_none()
    }
}

mod option_chrono_datetime_as_bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(bson::DateTime::from_chrono).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<bson::DateTime>::deserialize(deserializer)?;
        Ok(value.map(bson::DateTime::to_chrono))
    }
}
