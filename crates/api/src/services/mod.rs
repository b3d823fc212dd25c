//! Business-logic services sitting between routes and repositories.

pub mod email;
pub mod otp;
