//! Request handler module
//!
//! Routing dispatch plus the page, static asset, and command relay handlers.

pub mod page;
pub mod router;
pub mod static_files;
pub mod submit;

// Re-export main entry point
pub use router::handle_request;
