pub mod access;
pub mod guard;
pub mod health;
pub mod profiles;
pub mod session;
