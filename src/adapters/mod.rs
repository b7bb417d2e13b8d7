//! Infrastructure adapters for external systems.

pub mod commerce;
pub mod email;
pub mod sqlite;
