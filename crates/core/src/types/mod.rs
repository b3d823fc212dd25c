//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod code;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use code::{OneTimeCode, OneTimeCodeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::*;
