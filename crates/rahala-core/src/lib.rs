//! Service plumbing shared by Rahala services: configuration loading, tracing
//! setup and request ids.

pub mod config;
pub mod middleware;
pub mod tracing;
