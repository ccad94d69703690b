//! chamber-board/crates/cb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for chamber-board.

pub mod coerce;
pub mod error;
pub mod mail;
pub mod models;
pub mod retention;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use mail::*;
pub use models::*;
pub use retention::RetentionPolicy;
pub use traits::*;
