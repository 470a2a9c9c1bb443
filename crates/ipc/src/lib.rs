//! IPC message protocol for the Cartman editor
//!
//! Defines the command and notification types exchanged between the UI
//! layer and the editing core. Screen-space commands name the window they
//! came from so the core can map them into world space.

mod commands;
mod error;
mod messages;
mod types;

pub use commands::*;
pub use error::*;
pub use messages::*;
pub use types::*;
