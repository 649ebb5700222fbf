//! Utility functions for working with A2A types.
//!
//! Helpers for building messages, parts, artifacts and tasks, plus the
//! JSON-RPC method names shared by client and server.

pub mod artifact;
pub mod constants;
pub mod message;
pub mod parts;
pub mod task;

pub use artifact::*;
pub use constants::*;
pub use message::*;
pub use parts::*;
pub use task::*;
