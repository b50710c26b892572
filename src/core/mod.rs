pub mod branching;
pub mod config;
pub mod error;
pub mod message;
pub mod models;
pub mod personality;
pub mod session;
pub mod templates;
