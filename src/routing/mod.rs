//! Response routing subsystem.
//!
//! Decides, per fetched origin response, which of the three behaviors
//! applies: HTML-layout composition, text-asset rewrite-and-pass-through, or
//! opaque pass-through. The dispatch itself lives in the HTTP handler; this
//! module owns the classification.

pub mod classifier;

pub use classifier::ContentClass;
