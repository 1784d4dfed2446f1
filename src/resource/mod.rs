//! Machinery shared by every stored resource.
//!
//! - `Record<C>`: server-owned fields around client-writable content
//! - `VersionedStore<C>`: in-memory storage with change log, revert and
//!   per-organization external identifiers
//! - Field-list projection for views and payloads
//! - Collection search and ordering
//! - The route table of every resource

mod fields;
mod filter;
mod route_table;
mod store;
mod types;

pub use fields::{accept, project, view};
pub use filter::{FilterFields, ListFilter};
pub use route_table::{resolve, Operation, Resource, Route, ROUTES};
pub use store::VersionedStore;
pub use types::{
    ChangeLogEntry, FieldViolation, Provenance, Record, RecordContent, RecordId, StoreError,
    StoreResult,
};
pub(crate) use types::{check_optional, check_required, check_url, summarize};
