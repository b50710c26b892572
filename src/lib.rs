//! lil-guy keeps chat conversations as branching trees of checkpoints.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation tree, the live chat session, user
//!   preferences, and the built-in personality, template and model tables.
//! - [`storage`] saves trees and linear chat histories as JSON under the
//!   user's home directory and searches them.
//! - [`cli`] parses command-line arguments and runs one command per
//!   invocation.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod cli;
pub mod core;
pub mod storage;
pub mod utils;
