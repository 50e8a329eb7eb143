//! Actix middleware components.

pub mod trace;

pub use trace::{Trace, TraceId};
