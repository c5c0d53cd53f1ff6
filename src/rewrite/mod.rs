//! Reference rewriting subsystem.
//!
//! Pure string rules deciding whether a reference against the origin should
//! point at the CDN, at this proxy, or be left untouched.

pub mod url;

pub use url::UrlRewriter;
