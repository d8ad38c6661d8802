//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **security**: bcrypt password hashing
//! - **storage**: avatar files under a capability-scoped directory
//!
//! Adapters translate between domain types and infrastructure
//! representations and hold no business rules.

pub mod persistence;
pub mod security;
pub mod storage;
