//! Post-update notification for an RPSL object database.
//!
//! After a batch of updates has been processed, [`notifier::UpdateNotifier`]
//! works out every address that needs to hear about the outcome, merges all of
//! a recipient's notes into a single [`notification::Notification`], and sends
//! one message per recipient through a [`gateway::MailGateway`].

pub mod batch;
pub mod compose;
pub mod config;
pub mod context;
pub mod gateway;
pub mod model;
pub mod notification;
pub mod notifier;
pub mod overrides;
pub mod rpsl;
pub mod rules;
pub mod store;
pub mod versions;
