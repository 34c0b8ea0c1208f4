use chrono::{DateTime, Utc};

use crate::database::Database;
use crate::error::Error;

use super::{Campaign, CampaignDraft, CampaignId, CampaignPatch, MAX_NAME_LENGTH};

#[tracing::instrument(skip(db))]
pub async fn create_campaign(
    db: &dyn Database,
    name: String,
    due_date: Option<DateTime<Utc>>,
) -> Result<Campaign, Error> {
    let name = validate_name(&name)?;

    let draft = CampaignDraft {
        name,
        due_date,
        created_at: Utc::now(),
    };

    let campaign = db.campaigns().insert_campaign(draft).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, Error> {
    let campaigns = db.campaigns().fetch_campaigns().await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn update_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
    mut patch: CampaignPatch,
) -> Result<Campaign, Error> {
    // a missing campaign outranks any problem with the supplied fields
    db.campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    if let Some(name) = patch.name.take() {
        patch.name = Some(validate_name(&name)?);
    }

    if patch.is_empty() {
        return Err(Error::EmptyCampaignUpdate);
    }

    let campaign = db
        .campaigns()
        .update_campaign(campaign_id, patch)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn delete_campaign(db: &dyn Database, campaign_id: CampaignId) -> Result<bool, Error> {
    let deleted = db.campaigns().delete_campaign(campaign_id).await?;

    Ok(deleted)
}

fn validate_name(name: &str) -> Result<String, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::CampaignNameEmpty);
    }

    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(Error::CampaignNameTooLong { length });
    }

    Ok(name.to_string())
}
