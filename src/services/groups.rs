use crate::errors::ApiError;
use crate::models::{Group, Identity, NewGroup};
use crate::policy::{ReadRules, ResourceKind};
use crate::store::{Store, StoreError};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Read-only: groups are managed out of band (see [`seed_groups_from_file`]).
pub struct GroupService<'a> {
    store: &'a Store,
    rules: ReadRules,
}

impl<'a> GroupService<'a> {
    pub fn new(store: &'a Store, rules: ReadRules) -> Self {
        Self { store, rules }
    }

    pub fn list(&self, identity: Option<&Identity>) -> Result<Vec<Group>, ApiError> {
        self.rules.authorize_read(identity, ResourceKind::Group)?;
        Ok(self.store.groups())
    }

    pub fn retrieve(&self, identity: Option<&Identity>, id: i64) -> Result<Group, ApiError> {
        self.rules.authorize_read(identity, ResourceKind::Group)?;
        self.store.group(id).ok_or(ApiError::NotFound)
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("reading group seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing group seed file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("group {slug:?}: {source}")]
    Store { slug: String, source: StoreError },
}

pub fn seed_groups(store: &Store, groups: Vec<NewGroup>) -> Result<usize, SeedError> {
    let count = groups.len();
    for group in groups {
        let slug = group.slug.clone();
        store
            .insert_group(group)
            .map_err(|source| SeedError::Store { slug, source })?;
    }
    Ok(count)
}

/// Loads a JSON array of `{"title", "slug", "description"}` into the store.
pub fn seed_groups_from_file(store: &Store, path: &Path) -> Result<usize, SeedError> {
    let raw = std::fs::read_to_string(path)?;
    let groups: Vec<NewGroup> = serde_json::from_str(&raw)?;
    let count = seed_groups(store, groups)?;
    info!("Seeded {} groups from {}", count, path.display());
    Ok(count)
}
