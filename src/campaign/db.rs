use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, Bson};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

use crate::database::{MemoryCampaignStore, MongoCampaignStore};
use crate::error::Error;

use super::{Campaign, CampaignDraft, CampaignId, CampaignPatch};

const CAMPAIGN_ID_COUNTER: &str = "campaign_id";

#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Assigns a fresh id to the draft, persists it, and returns the stored
    /// campaign.
    async fn insert_campaign(&self, draft: CampaignDraft) -> Result<Campaign, Error>;

    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error>;

    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error>;

    /// Merges the supplied fields into the stored campaign. The patch must
    /// contain at least one field. Returns `None` if the id does not exist.
    async fn update_campaign(
        &self,
        campaign_id: CampaignId,
        patch: CampaignPatch,
    ) -> Result<Option<Campaign>, Error>;

    /// Returns whether a campaign was actually removed.
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<bool, Error>;
}

impl MongoCampaignStore {
    async fn next_campaign_id(&self) -> Result<CampaignId, Error> {
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let counter = self
            .counters
            .find_one_and_update(
                bson::doc! { "_id": CAMPAIGN_ID_COUNTER },
                bson::doc! { "$inc": { "seq": 1i64 } },
                options,
            )
            .await?
            .ok_or_else(|| {
                Error::ExistentialState("campaign id counter upsert returned nothing".to_string())
            })?;

        CampaignId::from_raw(counter.seq).ok_or(Error::IdSpaceExhausted)
    }
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, draft: CampaignDraft) -> Result<Campaign, Error> {
        let campaign = Campaign {
            id: self.next_campaign_id().await?,
            name: draft.name,
            due_date: draft.due_date,
            created_at: draft.created_at,
        };

        self.campaigns.insert_one(&campaign, None).await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let campaigns: Vec<Campaign> = self
            .campaigns
            .find(bson::doc! {}, None)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> = self
            .campaigns
            .find_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign(
        &self,
        campaign_id: CampaignId,
        patch: CampaignPatch,
    ) -> Result<Option<Campaign>, Error> {
        let mut changes = bson::Document::new();
        if let Some(name) = patch.name {
            changes.insert("name", name);
        }
        if let Some(due_date) = patch.due_date {
            let due_date = due_date
                .map(|due_date| Bson::DateTime(bson::DateTime::from_chrono(due_date)))
                .unwrap_or(Bson::Null);
            changes.insert("due_date", due_date);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let campaign = self
            .campaigns
            .find_one_and_update(
                bson::doc! { "_id": campaign_id },
                bson::doc! { "$set": changes },
                options,
            )
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<bool, Error> {
        let result = self
            .campaigns
            .delete_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, draft: CampaignDraft) -> Result<Campaign, Error> {
        let mut state = self.state()?;

        let raw = state.next_id.checked_add(1).ok_or(Error::IdSpaceExhausted)?;
        let id = CampaignId::from_raw(raw).ok_or(Error::IdSpaceExhausted)?;
        state.next_id = raw;

        let campaign = Campaign {
            id,
            name: draft.name,
            due_date: draft.due_date,
            created_at: draft.created_at,
        };
        state.campaigns.push(campaign.clone());

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let state = self.state()?;

        Ok(state.campaigns.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let state = self.state()?;

        let campaign = state
            .campaigns
            .iter()
            .find(|campaign| campaign.id == campaign_id)
            .cloned();

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign(
        &self,
        campaign_id: CampaignId,
        patch: CampaignPatch,
    ) -> Result<Option<Campaign>, Error> {
        let mut state = self.state()?;

        let campaign = match state
            .campaigns
            .iter_mut()
            .find(|campaign| campaign.id == campaign_id)
        {
            Some(campaign) => campaign,
            None => return Ok(None),
        };

        if let Some(name) = patch.name {
            campaign.name = name;
        }
        if let Some(due_date) = patch.due_date {
            campaign.due_date = due_date;
        }

        Ok(Some(campaign.clone()))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<bool, Error> {
        let mut state = self.state()?;

        let before = state.campaigns.len();
        state.campaigns.retain(|campaign| campaign.id != campaign_id);

        Ok(state.campaigns.len() < before)
    }
}
