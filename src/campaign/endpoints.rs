use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, put, HttpResponse};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;

use super::{manager, Campaign, CampaignId, CampaignPatch};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateCampaignBody {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpdateCampaignBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    // an absent due date leaves the stored one alone, an explicit null clears it
    #[serde(
        default,
        deserialize_with = "deserialize_due_date_patch",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CampaignBody {
    pub id: CampaignId,
    pub name: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            name: campaign.name,
            due_date: campaign.due_date,
            created_at: campaign.created_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CampaignListBody {
    pub campaigns: Vec<CampaignBody>,
    pub total: usize,
}

#[post("/campaigns")]
#[tracing::instrument(skip(db))]
async fn create_campaign(
    db: Data<Box<dyn Database>>,
    body: Json<CreateCampaignBody>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();

    let campaign = manager::create_campaign(&***db, body.name, body.due_date).await?;

    Ok(HttpResponse::Created().json(CampaignBody::render(campaign)))
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
async fn get_campaigns(db: Data<Box<dyn Database>>) -> Result<Json<CampaignListBody>, Error> {
    let campaigns = manager::get_campaigns(&***db).await?;

    let campaigns: Vec<CampaignBody> = campaigns.into_iter().map(CampaignBody::render).collect();

    Ok(Json(CampaignListBody {
        total: campaigns.len(),
        campaigns,
    }))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::get_campaign_by_id(&***db, campaign_id).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[put("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn update_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    body: Json<UpdateCampaignBody>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let body = body.into_inner();

    let patch = CampaignPatch {
        name: body.name,
        due_date: body.due_date,
    };

    let campaign = manager::update_campaign(&***db, campaign_id, patch).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[delete("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
async fn delete_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<HttpResponse, Error> {
    let campaign_id = params.into_inner();

    let deleted = manager::delete_campaign(&***db, campaign_id).await?;
    if !deleted {
        return Err(Error::CampaignNotFound { campaign_id });
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Accepts either a full RFC 3339 timestamp or a bare ISO-8601 date, which
/// is read as midnight UTC.
fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match raw.parse::<DateTime<Utc>>() {
        Ok(datetime) => Ok(datetime),
        Err(_) => Ok(raw.parse::<NaiveDate>()?.and_time(NaiveTime::MIN).and_utc()),
    }
}

fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|raw| parse_due_date(&raw).map_err(de::Error::custom))
        .transpose()
}

fn deserialize_due_date_patch<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_due_date(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_timestamps() {
        let parsed = parse_due_date("2025-01-01T10:30:00Z").unwrap();

        assert_eq!(parsed.to_rfc3339(), "2025-01-01T10:30:00+00:00");
    }

    #[test]
    fn parses_bare_dates_as_midnight() {
        let parsed = parse_due_date("2025-01-01").unwrap();

        assert_eq!(parsed.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert!(parse_due_date("next tuesday").is_err());
    }
}
