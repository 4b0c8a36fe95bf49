//! PREHEAT Core - Identifier and Object Types
//!
//! Pure data structures shared by the resolution cache and its callers.
//! This crate contains ONLY data types and their validation - no caching
//! or store access.

mod config;
mod entities;
mod enums;
mod error;
mod filter;
mod identifier;
mod identity;

pub use config::*;
pub use entities::*;
pub use enums::*;
pub use error::*;
pub use filter::*;
pub use identifier::*;
pub use identity::*;
