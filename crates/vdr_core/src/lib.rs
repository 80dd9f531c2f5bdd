pub mod domain;
pub mod ports;
pub mod query;
pub mod schema;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use domain::{Alarm, Session, SessionBody, SessionData};
pub use ports::{PortError, PortResult, SnapshotService};
pub use query::{Pagination, RawDump, SummaryPage};
pub use schema::{validate, FieldError, ValidationError};
pub use store::SessionStore;
