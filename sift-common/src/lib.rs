//! Common utilities shared across the sift crates.
//!
//! Today this is only the tracing setup in [`observability`]; the crate stays
//! dependency-light so the core extraction crate can pull it in for tests
//! without dragging in the CLI stack.
//!
//! ```rust
//! use sift_common::observability::{LogConfig, LogFormat};
//!
//! let cfg = LogConfig {
//!     format: LogFormat::Json,
//!     ..LogConfig::default()
//! };
//! assert_eq!(cfg.app_name, "sift");
//! assert!(cfg.emit_stderr);
//! ```

pub mod observability;

pub use observability::{init_logging, LogConfig, LogFormat};
