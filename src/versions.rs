//! Object version history and linking of modify outcomes to the revision they
//! replaced.
use crate::context::UpdateContext;
use crate::model::{Action, PreparedUpdate};
use crate::rpsl::{CIString, ObjectType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};

/// Identifies the stored row written by one update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UpdateInfo {
    pub object_id: u64,
    pub sequence_id: u32,
}

/// Outcome of resolving the revision an update replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionLookup {
    Found(i32),
    NotFound,
    /// The version written by this update is gone from the history, which
    /// happens when a later update in the same batch deleted the object.
    Vanished,
}

/// Version history of a single object, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLookupResult {
    pub object_type: ObjectType,
    pub key: CIString,
    pub history: Vec<UpdateInfo>,
}

impl VersionLookupResult {
    /// 1-based version number of the revision `update_info` produced.
    pub fn version_id_for(&self, update_info: &UpdateInfo) -> RevisionLookup {
        match self.history.iter().position(|v| v == update_info) {
            Some(idx) => RevisionLookup::Found(idx as i32 + 1),
            None => RevisionLookup::Vanished,
        }
    }
}

pub trait VersionStore: Send + Sync {
    fn find_by_key(&self, object_type: ObjectType, key: &CIString) -> Option<VersionLookupResult>;
}

#[derive(Debug, Default)]
pub struct InMemoryVersionStore {
    histories: RwLock<HashMap<(ObjectType, CIString), Vec<UpdateInfo>>>,
}

impl InMemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a revision to the object's history.
    pub fn record(&self, object_type: ObjectType, key: CIString, info: UpdateInfo) {
        if let Ok(mut histories) = self.histories.write() {
            histories.entry((object_type, key)).or_default().push(info);
        }
    }
}

impl VersionStore for InMemoryVersionStore {
    fn find_by_key(&self, object_type: ObjectType, key: &CIString) -> Option<VersionLookupResult> {
        let histories = self.histories.read().ok()?;
        let history = histories.get(&(object_type, key.clone()))?;
        Some(VersionLookupResult {
            object_type,
            key: key.clone(),
            history: history.clone(),
        })
    }
}

/// Resolve the revision a modify replaced, without touching the context.
pub fn lookup_revision(
    versions: &dyn VersionStore,
    update: &PreparedUpdate,
    context: &UpdateContext,
) -> RevisionLookup {
    let Some(result) = versions.find_by_key(update.object_type(), update.key()) else {
        return RevisionLookup::NotFound;
    };
    let Some(update_info) = context.update_info(update.id()) else {
        return RevisionLookup::NotFound;
    };
    match result.version_id_for(update_info) {
        RevisionLookup::Found(version_id) => RevisionLookup::Found(version_id - 1),
        other => other,
    }
}

/// Attach the previous revision id of a modified object to the context.
/// Only modifies outside dry runs qualify; lookups that come back empty are
/// logged and skipped.
pub fn attach_revision(
    versions: &dyn VersionStore,
    update: &PreparedUpdate,
    context: &mut UpdateContext,
) -> Option<i32> {
    if update.action() != Action::Modify || context.is_dry_run() {
        return None;
    }

    match lookup_revision(versions, update, context) {
        RevisionLookup::Found(version_id) => {
            context.set_version_id(update.id(), version_id);
            Some(version_id)
        }
        RevisionLookup::NotFound => {
            info!(update = %update, "failed to find version lookup result");
            None
        }
        RevisionLookup::Vanished => {
            debug!(update = %update, "revision vanished; object deleted later in batch");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OverrideOptions, Update, UpdateId, UpdateStatus};
    use crate::rpsl::RpslObject;

    const MNT: &str = "mntner: TEST-MNT\nsource: TEST\n";

    fn modify(id: usize) -> PreparedUpdate {
        let obj = RpslObject::parse(MNT).unwrap();
        PreparedUpdate::new(
            Update::new(UpdateId(id), obj.clone()),
            Some(obj.clone()),
            Some(obj),
            Action::Modify,
            OverrideOptions::default(),
        )
    }

    fn store_with_history(infos: &[UpdateInfo]) -> InMemoryVersionStore {
        let store = InMemoryVersionStore::new();
        for info in infos {
            store.record(ObjectType::Mntner, CIString::new("TEST-MNT"), *info);
        }
        store
    }

    fn info(sequence_id: u32) -> UpdateInfo {
        UpdateInfo { object_id: 42, sequence_id }
    }

    #[test]
    fn attaches_previous_version() {
        let store = store_with_history(&[info(1), info(2), info(3)]);
        let update = modify(0);
        let mut ctx = UpdateContext::new();
        ctx.set_update_info(update.id(), info(3));

        assert_eq!(attach_revision(&store, &update, &mut ctx), Some(2));
        assert_eq!(ctx.version_id(update.id()), Some(2));
    }

    #[test]
    fn key_lookup_ignores_case() {
        let store = store_with_history(&[info(1), info(2)]);
        let found = store.find_by_key(ObjectType::Mntner, &CIString::new("test-mnt"));
        assert_eq!(found.map(|r| r.history.len()), Some(2));
    }

    #[test]
    fn missing_history_is_not_an_error() {
        let store = InMemoryVersionStore::new();
        let update = modify(0);
        let mut ctx = UpdateContext::new();
        ctx.set_update_info(update.id(), info(1));

        assert_eq!(lookup_revision(&store, &update, &ctx), RevisionLookup::NotFound);
        assert_eq!(attach_revision(&store, &update, &mut ctx), None);
        assert_eq!(ctx.version_id(update.id()), None);
    }

    #[test]
    fn vanished_revision_is_swallowed() {
        let store = store_with_history(&[info(1)]);
        let update = modify(0);
        let mut ctx = UpdateContext::new();
        ctx.set_update_info(update.id(), info(9));

        assert_eq!(lookup_revision(&store, &update, &ctx), RevisionLookup::Vanished);
        assert_eq!(attach_revision(&store, &update, &mut ctx), None);
    }

    #[test]
    fn skips_non_modify_and_dry_run() {
        let store = store_with_history(&[info(1), info(2)]);
        let obj = RpslObject::parse(MNT).unwrap();
        let create = PreparedUpdate::new(
            Update::new(UpdateId(1), obj.clone()),
            None,
            Some(obj),
            Action::Create,
            OverrideOptions::default(),
        );
        let mut ctx = UpdateContext::new();
        ctx.set_prepared_update(create.clone(), UpdateStatus::Success);
        ctx.set_update_info(create.id(), info(2));
        assert_eq!(attach_revision(&store, &create, &mut ctx), None);

        let update = modify(2);
        let mut ctx = UpdateContext::new();
        ctx.dry_run();
        ctx.set_update_info(update.id(), info(2));
        assert_eq!(attach_revision(&store, &update, &mut ctx), None);
        assert_eq!(ctx.version_id(update.id()), None);
    }
}
