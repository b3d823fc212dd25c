//! Domain types for the Bazaar API.
//!
//! These are validated domain objects; repositories in [`crate::db`] map
//! them to and from `PostgreSQL` rows.

pub mod cart;
pub mod catalog;
pub mod domain;
pub mod order;
pub mod otp;
pub mod session;
pub mod user;
pub mod vendor;

pub use cart::{CartItem, CartLine, cart_total};
pub use catalog::{Category, Product};
pub use domain::CustomDomain;
pub use order::{Order, OrderItem};
pub use otp::OtpCode;
pub use session::{SessionState, SessionStateError, session_keys};
pub use user::User;
pub use vendor::Vendor;
