//! Outbound adapters implementing the domain ports over PostgreSQL and the
//! local filesystem.

pub mod persistence;
pub mod storage;
