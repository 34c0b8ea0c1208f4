use std::sync::{Arc, Mutex, MutexGuard};

use mongodb::Collection;
use serde::Deserialize;

use crate::campaign::db::CampaignStore;
use crate::campaign::Campaign;
use crate::error::Error;

pub trait Database: Send + Sync {
    fn campaigns(&self) -> &dyn CampaignStore;
}

/// Document holding the last id handed out for a collection. Ids are
/// allocated with an atomic `$inc` upsert so they stay unique under
/// concurrent inserts.
#[derive(Debug, Deserialize)]
pub struct CounterDocument {
    pub seq: i64,
}

#[derive(Clone, Debug)]
pub struct MongoCampaignStore {
    pub(crate) campaigns: Collection<Campaign>,
    pub(crate) counters: Collection<CounterDocument>,
}

#[derive(Clone, Debug)]
pub struct MongoDatabase {
    campaigns: MongoCampaignStore,
}

impl MongoDatabase {
    pub fn new(db: mongodb::Database) -> MongoDatabase {
        MongoDatabase {
            campaigns: MongoCampaignStore {
                campaigns: db.collection("campaigns"),
                counters: db.collection("counters"),
            },
        }
    }
}

impl Database for MongoDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryDatabase {
    campaigns: MemoryCampaignStore,
}

impl MemoryDatabase {
    pub fn new() -> MemoryDatabase {
        MemoryDatabase::default()
    }
}

impl Database for MemoryDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }
}

/// Volatile store: the whole collection and the id counter sit behind one
/// mutex, which serializes every operation.
#[derive(Clone, Debug, Default)]
pub struct MemoryCampaignStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    pub(crate) campaigns: Vec<Campaign>,
    pub(crate) next_id: i64,
}

impl MemoryCampaignStore {
    pub(crate) fn state(&self) -> Result<MutexGuard<'_, MemoryState>, Error> {
        self.state
            .lock()
            .map_err(|_| Error::ExistentialState("campaign store lock was poisoned".to_string()))
    }
}
