//! Per-transaction state shared between update processing and notification.
use crate::model::{PreparedUpdate, UpdateId, UpdateStatus};
use crate::rpsl::RpslObject;
use crate::versions::UpdateInfo;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct UpdateContext {
    dry_run: bool,
    prepared: HashMap<UpdateId, Arc<PreparedUpdate>>,
    statuses: HashMap<UpdateId, UpdateStatus>,
    update_infos: HashMap<UpdateId, UpdateInfo>,
    pending_candidates: HashMap<UpdateId, Vec<RpslObject>>,
    version_ids: HashMap<UpdateId, i32>,
}

impl UpdateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(&mut self) {
        self.dry_run = true;
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn set_prepared_update(&mut self, prepared: PreparedUpdate, status: UpdateStatus) {
        let id = prepared.id();
        self.prepared.insert(id, Arc::new(prepared));
        self.statuses.insert(id, status);
    }

    /// `None` until the transaction has processed the update.
    pub fn prepared_update(&self, id: UpdateId) -> Option<Arc<PreparedUpdate>> {
        self.prepared.get(&id).cloned()
    }

    pub fn set_status(&mut self, id: UpdateId, status: UpdateStatus) {
        self.statuses.insert(id, status);
    }

    pub fn status(&self, id: UpdateId) -> Option<UpdateStatus> {
        self.statuses.get(&id).copied()
    }

    pub fn set_update_info(&mut self, id: UpdateId, info: UpdateInfo) {
        self.update_infos.insert(id, info);
    }

    pub fn update_info(&self, id: UpdateId) -> Option<&UpdateInfo> {
        self.update_infos.get(&id)
    }

    pub fn set_pending_authentication_candidates(&mut self, id: UpdateId, candidates: Vec<RpslObject>) {
        self.pending_candidates.insert(id, candidates);
    }

    /// Maintainers that may still authenticate a pending update.
    pub fn pending_authentication_candidates(&self, id: UpdateId) -> &[RpslObject] {
        self.pending_candidates
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn set_version_id(&mut self, id: UpdateId, version_id: i32) {
        self.version_ids.insert(id, version_id);
    }

    /// Previous revision of the object touched by the update, if one was linked.
    pub fn version_id(&self, id: UpdateId) -> Option<i32> {
        self.version_ids.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, OverrideOptions, Update};

    #[test]
    fn unknown_update_has_no_outcome() {
        let ctx = UpdateContext::new();
        assert!(ctx.prepared_update(UpdateId(7)).is_none());
        assert!(ctx.status(UpdateId(7)).is_none());
        assert!(ctx.pending_authentication_candidates(UpdateId(7)).is_empty());
        assert!(ctx.version_id(UpdateId(7)).is_none());
    }

    #[test]
    fn stores_prepared_update_with_status() {
        let obj = RpslObject::parse("mntner: A-MNT\n").unwrap();
        let prepared = PreparedUpdate::new(
            Update::new(UpdateId(1), obj.clone()),
            None,
            Some(obj),
            Action::Create,
            OverrideOptions::default(),
        );
        let mut ctx = UpdateContext::new();
        ctx.set_prepared_update(prepared, UpdateStatus::Success);
        assert_eq!(ctx.status(UpdateId(1)), Some(UpdateStatus::Success));
        assert_eq!(ctx.prepared_update(UpdateId(1)).unwrap().action(), Action::Create);

        ctx.set_status(UpdateId(1), UpdateStatus::FailedAuthentication);
        assert_eq!(ctx.status(UpdateId(1)), Some(UpdateStatus::FailedAuthentication));
    }
}
