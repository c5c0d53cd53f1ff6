//! HTML transformation subsystem.
//!
//! # Data Flow
//! ```text
//! fetched HTML body
//!     → document.rs (tag/attribute reference rewriting)
//!     → compose.rs (layout resolution + replace/override/inject directives)
//!     → serialized page, origin references stripped
//! ```

pub mod compose;
pub mod document;

pub use compose::{ComposeError, LayoutComposer, LayoutSource};
pub use document::{DocumentTransformer, RewrittenDocument, TransformError};
