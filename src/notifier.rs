//! Post-update notification: work out who needs to hear about a batch of
//! updates and send each of them one message.
use crate::compose::MessageComposer;
use crate::context::UpdateContext;
use crate::gateway::MailGateway;
use crate::model::{Origin, PreparedUpdate, UpdateRequest, UpdateStatus};
use crate::notification::{NoteKind, Notification};
use crate::overrides::is_suppressed;
use crate::rpsl::{CIString, RpslObject};
use crate::rules::{rules_for, RelatedObjects};
use crate::store::ObjectStore;
use crate::versions::{attach_revision, VersionStore};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Notifications keyed by recipient address, compared without case.
pub type Notifications = HashMap<CIString, Notification>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
}

/// One recipient's share of a batch, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientPlan {
    pub email: String,
    pub notes: Vec<PlannedNote>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedNote {
    pub kind: NoteKind,
    pub update: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<i32>,
}

pub struct UpdateNotifier {
    objects: Arc<dyn ObjectStore>,
    versions: Arc<dyn VersionStore>,
    composer: Arc<dyn MessageComposer>,
    gateway: Arc<dyn MailGateway>,
}

impl UpdateNotifier {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        versions: Arc<dyn VersionStore>,
        composer: Arc<dyn MessageComposer>,
        gateway: Arc<dyn MailGateway>,
    ) -> Self {
        Self {
            objects,
            versions,
            composer,
            gateway,
        }
    }

    /// Aggregate and send. Nothing happens for a dry run, and delivery
    /// failures are logged per recipient without stopping the rest.
    #[instrument(skip_all, fields(origin = %request.origin.id, updates = request.updates.len()))]
    pub fn send_notifications(&self, request: &UpdateRequest, context: &mut UpdateContext) {
        if context.is_dry_run() {
            debug!("dry run; skipping notifications");
            return;
        }

        let notifications = self.aggregate(request, context);
        let recipients = notifications.len();
        let summary = self.dispatch(notifications, &request.origin);
        info!(
            recipients,
            sent = summary.sent,
            failed = summary.failed,
            "notifications dispatched"
        );
    }

    /// Build one notification per recipient address across the whole batch.
    /// Successful modifies get their previous revision linked on the context
    /// first.
    pub fn aggregate(&self, request: &UpdateRequest, context: &mut UpdateContext) -> Notifications {
        let mut notifications = Notifications::new();
        if context.is_dry_run() {
            return notifications;
        }

        for update in &request.updates {
            let (Some(prepared), Some(status)) =
                (context.prepared_update(update.id), context.status(update.id))
            else {
                debug!(update = %update.id, "update not processed; no notifications");
                continue;
            };
            if is_suppressed(&prepared) {
                debug!(update = %prepared, "notifications disabled by override");
                continue;
            }

            if status == UpdateStatus::Success {
                attach_revision(self.versions.as_ref(), &prepared, context);
            }
            let version_id = context.version_id(prepared.id());

            for rule in rules_for(status) {
                for object in self.related_objects(rule.related, &prepared, context) {
                    for email in object.get_values_for_attribute(rule.recipients) {
                        notifications
                            .entry(email)
                            .or_insert_with_key(|email| Notification::new(email.as_str()))
                            .add(rule.kind, Arc::clone(&prepared), version_id);
                    }
                }
            }
        }

        notifications
    }

    /// Compose and send one message per notification.
    pub fn dispatch(&self, notifications: Notifications, origin: &Origin) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        for notification in notifications.into_values() {
            let message = self.composer.compose(origin, &notification);
            match self.gateway.send_email(notification.email(), &message) {
                Ok(()) => {
                    summary.sent += 1;
                    info!(
                        email = notification.email(),
                        notes = notification.len(),
                        "notification sent"
                    );
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(?err, email = notification.email(), "failed to send notification");
                }
            }
        }
        summary
    }

    fn related_objects(
        &self,
        related: RelatedObjects,
        update: &PreparedUpdate,
        context: &UpdateContext,
    ) -> Vec<RpslObject> {
        match related {
            RelatedObjects::Subject => vec![update.reference_object().clone()],
            RelatedObjects::Referenced {
                object_type,
                attribute,
            } => {
                let keys = update.reference_object().get_values_for_attribute(attribute);
                self.objects.get_by_keys(object_type, &keys)
            }
            RelatedObjects::Differences {
                object_type,
                attribute,
            } => self
                .objects
                .get_by_keys(object_type, &update.differences(attribute)),
            RelatedObjects::PendingAuthenticationCandidates => {
                context.pending_authentication_candidates(update.id()).to_vec()
            }
        }
    }
}

/// Recipients sorted by address with their notes in message order.
pub fn plan(notifications: &Notifications) -> Vec<RecipientPlan> {
    let mut plans: Vec<RecipientPlan> = notifications
        .values()
        .map(|n| RecipientPlan {
            email: n.email().to_string(),
            notes: n
                .entries()
                .iter()
                .map(|e| PlannedNote {
                    kind: e.kind,
                    update: e.update.update.to_string(),
                    previous_version: e.update.version_id,
                })
                .collect(),
        })
        .collect();
    plans.sort_by_key(|p| p.email.to_lowercase());
    plans
}
