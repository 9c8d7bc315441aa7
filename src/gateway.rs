//! Outbound mail delivery.
use crate::compose::ResponseMessage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("recipient rejected: {0}")]
    Rejected(String),
}

pub trait MailGateway: Send + Sync {
    fn send_email(&self, to: &str, message: &ResponseMessage) -> Result<(), GatewayError>;
}

/// Gateway used while outgoing mail is disabled: logs instead of sending.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMailGateway;

impl MailGateway for LoggingMailGateway {
    fn send_email(&self, to: &str, message: &ResponseMessage) -> Result<(), GatewayError> {
        info!(to, subject = %message.subject, "outgoing mail disabled; not sending");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SpoolEnvelope<'a> {
    id: Uuid,
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
    queued_at: DateTime<Utc>,
}

/// Writes one JSON envelope per message into a spool directory for an MTA
/// to pick up.
#[derive(Debug, Clone)]
pub struct SpoolMailGateway {
    dir: PathBuf,
    from: String,
}

impl SpoolMailGateway {
    pub fn new(dir: impl Into<PathBuf>, from: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            from: from.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MailGateway for SpoolMailGateway {
    #[instrument(skip_all, fields(to = %to))]
    fn send_email(&self, to: &str, message: &ResponseMessage) -> Result<(), GatewayError> {
        if to.trim().is_empty() {
            return Err(GatewayError::Rejected(to.to_string()));
        }
        let envelope = SpoolEnvelope {
            id: Uuid::new_v4(),
            from: &self.from,
            to,
            subject: &message.subject,
            body: &message.body,
            queued_at: Utc::now(),
        };
        fs::create_dir_all(&self.dir)?;
        let name = format!(
            "{}-{}.json",
            envelope.queued_at.format("%Y%m%dT%H%M%S%.3f"),
            envelope.id
        );
        let path = self.dir.join(name);
        fs::write(&path, serde_json::to_vec_pretty(&envelope)?)?;
        info!(path = %path.display(), "spooled notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn message() -> ResponseMessage {
        ResponseMessage {
            subject: "Notification of TEST Database changes".into(),
            body: "body".into(),
        }
    }

    #[test]
    fn spool_writes_envelope() {
        let td = tempdir().unwrap();
        let spool = td.path().join("spool");
        let gateway = SpoolMailGateway::new(&spool, "noreply@example.net");
        gateway.send_email("a@example.net", &message()).unwrap();

        let entries: Vec<_> = fs::read_dir(&spool).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let path = entries[0].as_ref().unwrap().path();
        let json: serde_json::Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(json["to"], "a@example.net");
        assert_eq!(json["from"], "noreply@example.net");
        assert_eq!(json["subject"], "Notification of TEST Database changes");
    }

    #[test]
    fn spool_rejects_blank_recipient() {
        let td = tempdir().unwrap();
        let gateway = SpoolMailGateway::new(td.path(), "noreply@example.net");
        let err = gateway.send_email("  ", &message()).unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));
    }

    #[test]
    fn logging_gateway_accepts_everything() {
        assert!(LoggingMailGateway.send_email("a@example.net", &message()).is_ok());
    }
}
