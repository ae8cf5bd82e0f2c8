pub mod generation;
pub mod guard;
pub mod profile;
pub mod provision;
pub mod registry;
pub mod session;
pub mod sign_in;
