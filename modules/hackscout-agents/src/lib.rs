//! Agents for candidate acquisition and outreach: source cascade,
//! dedup, message composition, and delivery dispatch.

pub mod cascade;
pub mod cli;
pub mod composer;
pub mod dedup;
pub mod dispatcher;
pub mod mailer;
pub mod sources;

pub use cascade::{AcquisitionCascade, AcquisitionReport};
pub use composer::{MessageComposer, TextGenerator};
pub use dedup::ProfileDeduplicator;
pub use dispatcher::{OutreachDispatcher, INVITE_SUBJECT};
pub use mailer::{MailError, MailTransport, MemoryMailer, NoopMailer, SmtpMailer};
pub use sources::{LiveScrapeSource, PublicSearchSource, SourceAdapter, SyntheticSource};
