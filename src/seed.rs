use chrono::Utc;
use tracing::info;

use crate::campaign::CampaignDraft;
use crate::database::Database;
use crate::error::Error;

const SEED_CAMPAIGNS: [&str; 2] = ["Summer Launch", "Winter Launch"];

/// Populates an empty store with a couple of starter campaigns. Does nothing
/// if any campaigns already exist.
pub async fn seed(db: &dyn Database) -> Result<(), Error> {
    let existing = db.campaigns().fetch_campaigns().await?;
    if !existing.is_empty() {
        info!("skipping seed, store already holds {} campaigns", existing.len());
        return Ok(());
    }

    let now = Utc::now();
    for name in SEED_CAMPAIGNS {
        let campaign = db
            .campaigns()
            .insert_campaign(CampaignDraft {
                name: name.to_string(),
                due_date: Some(now),
                created_at: now,
            })
            .await?;
        info!("seeded campaign {} ({})", campaign.name, campaign.id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::database::{Database, MemoryDatabase};

    use super::*;

    #[tokio::test]
    async fn seed_populates_an_empty_store_once() {
        let db = MemoryDatabase::new();

        seed(&db).await.unwrap();
        let campaigns = db.campaigns().fetch_campaigns().await.unwrap();
        assert_eq!(campaigns.len(), 2);

        seed(&db).await.unwrap();
        let campaigns = db.campaigns().fetch_campaigns().await.unwrap();
        assert_eq!(campaigns.len(), 2);
    }
}
