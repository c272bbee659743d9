//! Bookshelf application library
//!
//! Project modules plus the bootstrap that runs them behind the HTTP server.

pub mod bootstrap;
pub mod modules;

/// Re-export commonly used types
pub use modules::*;
