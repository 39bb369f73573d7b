//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the handlers, decoupled from
//! business logic.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response,
    build_422_response, build_500_response, build_options_response,
};
