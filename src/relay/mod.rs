//! External process relay module
//!
//! Owns the subprocess boundary: allow-list validation of command
//! tokens, spawning the external interpreter, and capturing its output.

mod process;
mod token;

// Re-export public types
pub use process::{spawn_relay, RelayError, RelayHandle, RelayOutcome};
pub use token::CommandToken;
