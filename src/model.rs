use crate::rpsl::{AttributeType, CIString, ObjectType, RpslObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Modify,
    Delete,
    Noop,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Modify => "MODIFY",
            Action::Delete => "DELETE",
            Action::Noop => "NOOP",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one update after the transaction has processed it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    Success,
    Failed,
    FailedAuthentication,
    PendingAuthentication,
    Exception,
}

impl UpdateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStatus::Success => "SUCCESS",
            UpdateStatus::Failed => "FAILED",
            UpdateStatus::FailedAuthentication => "FAILED_AUTHENTICATION",
            UpdateStatus::PendingAuthentication => "PENDING_AUTHENTICATION",
            UpdateStatus::Exception => "EXCEPTION",
        }
    }
}

/// Operator flags attached to a single update.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OverrideOptions {
    pub notify_override: bool,
    pub notify: bool,
}

impl OverrideOptions {
    pub fn is_notify_override(&self) -> bool {
        self.notify_override
    }

    pub fn is_notify(&self) -> bool {
        self.notify
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UpdateId(pub usize);

impl fmt::Display for UpdateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One submitted change to one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub id: UpdateId,
    pub submitted: RpslObject,
}

impl Update {
    pub fn new(id: UpdateId, submitted: RpslObject) -> Self {
        Self { id, submitted }
    }

    pub fn object_type(&self) -> ObjectType {
        self.submitted.object_type()
    }

    pub fn key(&self) -> &CIString {
        self.submitted.key()
    }
}

/// An update once the transaction has resolved which object it touches and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedUpdate {
    update: Update,
    original: Option<RpslObject>,
    updated: Option<RpslObject>,
    action: Action,
    override_options: OverrideOptions,
}

impl PreparedUpdate {
    pub fn new(
        update: Update,
        original: Option<RpslObject>,
        updated: Option<RpslObject>,
        action: Action,
        override_options: OverrideOptions,
    ) -> Self {
        Self {
            update,
            original,
            updated,
            action,
            override_options,
        }
    }

    pub fn id(&self) -> UpdateId {
        self.update.id
    }

    pub fn update(&self) -> &Update {
        &self.update
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn override_options(&self) -> &OverrideOptions {
        &self.override_options
    }

    pub fn original_object(&self) -> Option<&RpslObject> {
        self.original.as_ref()
    }

    pub fn updated_object(&self) -> Option<&RpslObject> {
        self.updated.as_ref()
    }

    /// The object as it stands after the update, or as it stood before a delete.
    pub fn reference_object(&self) -> &RpslObject {
        let preferred = match self.action {
            Action::Delete => self.original.as_ref(),
            _ => self.updated.as_ref(),
        };
        preferred.unwrap_or(&self.update.submitted)
    }

    pub fn object_type(&self) -> ObjectType {
        self.reference_object().object_type()
    }

    pub fn key(&self) -> &CIString {
        self.reference_object().key()
    }

    /// Values of `attribute_type` added or removed by this update. A delete
    /// removes everything the original carried.
    pub fn differences(&self, attribute_type: AttributeType) -> Vec<CIString> {
        let original = values(self.original.as_ref(), attribute_type);
        if self.action == Action::Delete {
            return original;
        }
        let updated = values(self.updated.as_ref(), attribute_type);

        let in_original: HashSet<&CIString> = original.iter().collect();
        let in_updated: HashSet<&CIString> = updated.iter().collect();
        let removed = original.iter().filter(|v| !in_updated.contains(v));
        let added = updated.iter().filter(|v| !in_original.contains(v));
        removed.chain(added).cloned().collect()
    }
}

impl fmt::Display for PreparedUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.update.id,
            self.action,
            self.object_type(),
            self.key()
        )
    }
}

fn values(object: Option<&RpslObject>, attribute_type: AttributeType) -> Vec<CIString> {
    let mut seen = HashSet::new();
    object
        .map(|o| o.get_values_for_attribute(attribute_type))
        .unwrap_or_default()
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OriginKind {
    Mail,
    SyncApi,
    RestApi,
}

/// Where a batch of updates came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Origin {
    pub kind: OriginKind,
    pub id: String,
    pub from: String,
    pub received_at: DateTime<Utc>,
}

impl Origin {
    pub fn new(kind: OriginKind, id: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            from: from.into(),
            received_at: Utc::now(),
        }
    }
}

/// All updates submitted together in one transaction.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub origin: Origin,
    pub updates: Vec<Update>,
}

impl UpdateRequest {
    pub fn new(origin: Origin, updates: Vec<Update>) -> Self {
        Self { origin, updates }
    }
}
