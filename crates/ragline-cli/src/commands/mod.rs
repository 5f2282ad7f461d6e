//! Command implementations

pub mod ask;
pub mod chat;
pub mod collection;
pub mod ingest;
