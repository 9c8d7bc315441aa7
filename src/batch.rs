//! YAML batch files: the processed outcome of one update transaction, as
//! handed to the notifier by the command line tool.
use crate::context::UpdateContext;
use crate::model::{
    Action, Origin, OriginKind, OverrideOptions, PreparedUpdate, Update, UpdateId, UpdateRequest,
    UpdateStatus,
};
use crate::rpsl::{CIString, ObjectType, RpslObject};
use crate::store::{InMemoryObjectStore, ObjectStore};
use crate::versions::{InMemoryVersionStore, UpdateInfo};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct BatchFile {
    #[serde(default)]
    dry_run: bool,
    origin: OriginSpec,
    updates: Vec<UpdateSpec>,
    #[serde(default)]
    history: Vec<HistorySpec>,
}

#[derive(Debug, Deserialize)]
struct OriginSpec {
    kind: OriginKind,
    id: String,
    from: String,
    #[serde(default)]
    received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct UpdateSpec {
    action: Action,
    /// Absent when the transaction never got to this update.
    #[serde(default)]
    status: Option<UpdateStatus>,
    object: String,
    #[serde(default)]
    original: Option<String>,
    #[serde(default, rename = "override")]
    override_options: OverrideOptions,
    #[serde(default)]
    update_info: Option<UpdateInfo>,
    /// Maintainer keys that may still authenticate a pending update.
    #[serde(default)]
    pending_candidates: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HistorySpec {
    #[serde(rename = "type")]
    object_type: ObjectType,
    key: String,
    versions: Vec<UpdateInfo>,
}

/// Everything the notifier needs for one batch.
#[derive(Debug)]
pub struct LoadedBatch {
    pub request: UpdateRequest,
    pub context: UpdateContext,
    pub versions: InMemoryVersionStore,
}

pub fn load(path: &Path, objects: &InMemoryObjectStore) -> Result<LoadedBatch> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file {}", path.display()))?;
    parse(&content, objects)
}

/// Build the request and context from batch YAML. Originals of modifies and
/// deletes default to the stored object with the same type and key.
pub fn parse(content: &str, objects: &InMemoryObjectStore) -> Result<LoadedBatch> {
    let file: BatchFile = serde_yaml::from_str(content).context("invalid batch YAML")?;

    let mut context = UpdateContext::new();
    if file.dry_run {
        context.dry_run();
    }

    let versions = InMemoryVersionStore::new();
    for h in file.history {
        let key = CIString::new(h.key);
        for info in h.versions {
            versions.record(h.object_type, key.clone(), info);
        }
    }

    let mut updates = Vec::with_capacity(file.updates.len());
    for (idx, spec) in file.updates.into_iter().enumerate() {
        let id = UpdateId(idx);
        let submitted = RpslObject::parse(&spec.object)
            .with_context(|| format!("update {}: invalid object", idx))?;

        let original = match spec.original.as_deref() {
            Some(text) => Some(
                RpslObject::parse(text)
                    .with_context(|| format!("update {}: invalid original object", idx))?,
            ),
            None => match spec.action {
                Action::Create => None,
                Action::Delete => Some(
                    objects
                        .get(submitted.object_type(), submitted.key())
                        .cloned()
                        .unwrap_or_else(|| submitted.clone()),
                ),
                Action::Modify | Action::Noop => objects
                    .get(submitted.object_type(), submitted.key())
                    .cloned(),
            },
        };
        let updated = match spec.action {
            Action::Delete => None,
            _ => Some(submitted.clone()),
        };

        let update = Update::new(id, submitted);
        if let Some(status) = spec.status {
            let prepared = PreparedUpdate::new(
                update.clone(),
                original,
                updated,
                spec.action,
                spec.override_options,
            );
            context.set_prepared_update(prepared, status);
        }
        if let Some(info) = spec.update_info {
            context.set_update_info(id, info);
        }
        if !spec.pending_candidates.is_empty() {
            let keys: Vec<CIString> = spec.pending_candidates.into_iter().map(CIString::new).collect();
            context.set_pending_authentication_candidates(id, objects.get_by_keys(ObjectType::Mntner, &keys));
        }
        updates.push(update);
    }

    let mut origin = Origin::new(file.origin.kind, file.origin.id, file.origin.from);
    if let Some(received_at) = file.origin.received_at {
        origin.received_at = received_at;
    }

    Ok(LoadedBatch {
        request: UpdateRequest::new(origin, updates),
        context,
        versions,
    })
}
