//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (ASSET_MIRROR_* environment overrides)
//!     → validation.rs (semantic checks)
//!     → MirrorConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no runtime reload
//! - All fields except the origin URL have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::CachePolicyConfig;
pub use schema::ListenerConfig;
pub use schema::MirrorConfig;
pub use schema::ObservabilityConfig;
pub use schema::OriginConfig;
