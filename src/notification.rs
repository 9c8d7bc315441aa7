//! Per-recipient accumulation of update outcomes.
use crate::model::PreparedUpdate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Why a recipient hears about an update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Success,
    SuccessReference,
    FailedAuthentication,
    PendingUpdate,
}

impl NoteKind {
    pub const ALL: [NoteKind; 4] = [
        NoteKind::Success,
        NoteKind::SuccessReference,
        NoteKind::FailedAuthentication,
        NoteKind::PendingUpdate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Success => "SUCCESS",
            NoteKind::SuccessReference => "SUCCESS_REFERENCE",
            NoteKind::FailedAuthentication => "FAILED_AUTHENTICATION",
            NoteKind::PendingUpdate => "PENDING_UPDATE",
        }
    }
}

/// An update as seen by a recipient, with the revision it replaced when known.
#[derive(Debug, Clone)]
pub struct NotifiedUpdate {
    pub update: Arc<PreparedUpdate>,
    pub version_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NoteEntry {
    pub kind: NoteKind,
    pub update: NotifiedUpdate,
}

/// Everything one address is told about a batch. Becomes exactly one message.
#[derive(Debug, Clone)]
pub struct Notification {
    email: String,
    entries: Vec<NoteEntry>,
}

impl Notification {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            entries: Vec::new(),
        }
    }

    /// Address as first spelled by the object that produced it.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn add(&mut self, kind: NoteKind, update: Arc<PreparedUpdate>, version_id: Option<i32>) {
        self.entries.push(NoteEntry {
            kind,
            update: NotifiedUpdate { update, version_id },
        });
    }

    pub fn entries(&self) -> &[NoteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has(&self, kind: NoteKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    pub fn updates(&self, kind: NoteKind) -> impl Iterator<Item = &NotifiedUpdate> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| &e.update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, OverrideOptions, Update, UpdateId};
    use crate::rpsl::RpslObject;

    fn update(id: usize) -> Arc<PreparedUpdate> {
        let obj = RpslObject::parse("mntner: A-MNT\n").unwrap();
        Arc::new(PreparedUpdate::new(
            Update::new(UpdateId(id), obj.clone()),
            None,
            Some(obj),
            Action::Create,
            OverrideOptions::default(),
        ))
    }

    #[test]
    fn groups_entries_by_kind_in_insertion_order() {
        let mut n = Notification::new("Foo@Example.com");
        n.add(NoteKind::Success, update(1), None);
        n.add(NoteKind::FailedAuthentication, update(2), None);
        n.add(NoteKind::Success, update(3), Some(4));

        assert_eq!(n.email(), "Foo@Example.com");
        assert_eq!(n.len(), 3);
        assert!(n.has(NoteKind::Success));
        assert!(!n.has(NoteKind::PendingUpdate));

        let ids: Vec<usize> = n.updates(NoteKind::Success).map(|u| u.update.id().0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(n.updates(NoteKind::Success).last().and_then(|u| u.version_id), Some(4));
    }
}
