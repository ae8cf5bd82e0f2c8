//! Domain types shared across all Rahala services.
//!
//! Pure types and predicates; no framework dependencies.

pub mod permission;
pub mod profile;
pub mod role;
pub mod route;
pub mod section;
pub mod session;
