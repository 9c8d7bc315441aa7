use crate::model::{Origin, OriginKind};
use crate::notification::{NoteKind, Notification};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// A message ready for the mail gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseMessage {
    pub subject: String,
    pub body: String,
}

pub trait MessageComposer: Send + Sync {
    fn compose(&self, origin: &Origin, notification: &Notification) -> ResponseMessage;
}

/// Plain-text summary listing every update the recipient is told about,
/// grouped by why they are told.
#[derive(Debug, Clone)]
pub struct SummaryComposer {
    source: String,
}

impl SummaryComposer {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    fn section_heading(kind: NoteKind) -> &'static str {
        match kind {
            NoteKind::Success => "Some objects in which you are referenced have been updated.",
            NoteKind::SuccessReference => {
                "Some objects referring to your organisation or incident response team have been updated."
            }
            NoteKind::FailedAuthentication => {
                "Some objects in which you are referenced as a maintainer were requested to be changed, but the authorisation failed."
            }
            NoteKind::PendingUpdate => {
                "Some objects are waiting for your authorisation before they can be created."
            }
        }
    }
}

impl MessageComposer for SummaryComposer {
    fn compose(&self, origin: &Origin, notification: &Notification) -> ResponseMessage {
        let origin_line = match origin.kind {
            OriginKind::Mail => format!("mail from {} ({})", origin.from, origin.id),
            OriginKind::SyncApi => format!("sync update from {}", origin.from),
            OriginKind::RestApi => format!("REST API request from {}", origin.from),
        };

        let mut body = String::new();
        let _ = writeln!(body, "This is to notify you of changes in the {} Database", self.source);
        let _ = writeln!(body, "caused by a {} received at {}.", origin_line, origin.received_at.to_rfc3339());

        for kind in NoteKind::ALL {
            if !notification.has(kind) {
                continue;
            }
            let _ = writeln!(body, "\n{}", Self::section_heading(kind));
            for notified in notification.updates(kind) {
                let update = &notified.update;
                let _ = write!(
                    body,
                    "\n---\n{} {} {}",
                    update.action(),
                    update.object_type(),
                    update.key()
                );
                if let Some(version_id) = notified.version_id {
                    let _ = write!(body, " (previous version {})", version_id);
                }
                let _ = write!(body, "\n\n{}", update.reference_object());
            }
        }

        ResponseMessage {
            subject: format!("Notification of {} Database changes", self.source),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, OverrideOptions, PreparedUpdate, Update, UpdateId};
    use crate::rpsl::RpslObject;
    use std::sync::Arc;

    #[test]
    fn summary_lists_sections_and_previous_version() {
        let obj = RpslObject::parse("mntner: A-MNT\nsource: TEST\n").unwrap();
        let update = Arc::new(PreparedUpdate::new(
            Update::new(UpdateId(0), obj.clone()),
            Some(obj.clone()),
            Some(obj),
            Action::Modify,
            OverrideOptions::default(),
        ));
        let mut n = Notification::new("a@example.net");
        n.add(NoteKind::Success, update, Some(3));

        let origin = Origin::new(OriginKind::Mail, "<1@example.net>", "me@example.net");
        let msg = SummaryComposer::new("TEST").compose(&origin, &n);

        assert_eq!(msg.subject, "Notification of TEST Database changes");
        assert!(msg.body.contains("MODIFY mntner A-MNT (previous version 3)"));
        assert!(msg.body.contains("mail from me@example.net"));
        assert!(!msg.body.contains("authorisation failed"));
    }
}
