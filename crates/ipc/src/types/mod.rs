//! Type definitions for IPC messages.

mod paint;
mod summary;
mod view;

pub use paint::*;
pub use summary::*;
pub use view::*;
