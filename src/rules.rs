//! Which objects' contact attributes are notified for each update status.
use crate::model::UpdateStatus;
use crate::notification::NoteKind;
use crate::rpsl::{AttributeType, ObjectType};

/// Where to find the objects whose attributes hold recipient addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedObjects {
    /// The updated object itself.
    Subject,
    /// Objects of `object_type` named by `attribute` on the updated object.
    Referenced {
        object_type: ObjectType,
        attribute: AttributeType,
    },
    /// Objects of `object_type` whose references under `attribute` were added
    /// or removed by the update.
    Differences {
        object_type: ObjectType,
        attribute: AttributeType,
    },
    /// Maintainers that can still authenticate a pending update.
    PendingAuthenticationCandidates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipientRule {
    pub related: RelatedObjects,
    pub recipients: AttributeType,
    pub kind: NoteKind,
}

const MAINTAINERS: RelatedObjects = RelatedObjects::Referenced {
    object_type: ObjectType::Mntner,
    attribute: AttributeType::MntBy,
};

static SUCCESS_RULES: [RecipientRule; 4] = [
    RecipientRule {
        related: RelatedObjects::Subject,
        recipients: AttributeType::Notify,
        kind: NoteKind::Success,
    },
    RecipientRule {
        related: MAINTAINERS,
        recipients: AttributeType::MntNfy,
        kind: NoteKind::Success,
    },
    RecipientRule {
        related: RelatedObjects::Differences {
            object_type: ObjectType::Organisation,
            attribute: AttributeType::Org,
        },
        recipients: AttributeType::RefNfy,
        kind: NoteKind::SuccessReference,
    },
    RecipientRule {
        related: RelatedObjects::Differences {
            object_type: ObjectType::Irt,
            attribute: AttributeType::MntIrt,
        },
        recipients: AttributeType::RefNfy,
        kind: NoteKind::SuccessReference,
    },
];

static FAILED_AUTHENTICATION_RULES: [RecipientRule; 1] = [RecipientRule {
    related: MAINTAINERS,
    recipients: AttributeType::UpdTo,
    kind: NoteKind::FailedAuthentication,
}];

static PENDING_AUTHENTICATION_RULES: [RecipientRule; 1] = [RecipientRule {
    related: RelatedObjects::PendingAuthenticationCandidates,
    recipients: AttributeType::UpdTo,
    kind: NoteKind::PendingUpdate,
}];

/// Rules in message-section order. Statuses without rules notify nobody.
pub fn rules_for(status: UpdateStatus) -> &'static [RecipientRule] {
    match status {
        UpdateStatus::Success => &SUCCESS_RULES,
        UpdateStatus::FailedAuthentication => &FAILED_AUTHENTICATION_RULES,
        UpdateStatus::PendingAuthentication => &PENDING_AUTHENTICATION_RULES,
        UpdateStatus::Failed | UpdateStatus::Exception => &[],
    }
}
