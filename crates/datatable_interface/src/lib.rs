//! Trait definitions for the DataTables server-side adapter.
//!
//! The translation engine talks to its collaborators only through these
//! traits: the raw request payload ([`ParamSource`]), the record store
//! ([`RecordSource`]) and custom search logic ([`Matcher`]).

mod matcher;
mod params;
mod record_source;

pub use matcher::Matcher;
pub use params::ParamSource;
pub use record_source::RecordSource;
