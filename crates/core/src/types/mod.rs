//! Core types for La Matera.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::format_ars;
pub use slug::{Slug, SlugError};
pub use status::{OrderStatus, StatusTransitionError};
