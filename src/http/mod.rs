//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request (any path)
//!     → server.rs (Axum setup, request ID, wildcard handler)
//!     → fetch subsystem (cache-aside origin GET)
//!     → routing::ContentClass decides the behavior
//!     → transform subsystem for HTML layouts
//!     → response.rs (Cache-Control policy, outbound body)
//! ```

pub mod response;
pub mod server;

pub use server::{AppState, DirectiveHook, MirrorServer};
