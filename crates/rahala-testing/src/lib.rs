//! Test utilities for Rahala services.
//!
//! Provides profile and identity fixture builders.
//! Dev-dependency only; production code never imports it.

pub mod profile;
