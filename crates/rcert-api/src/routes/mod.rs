//! # Route Modules
//!
//! One Axum router per surface area, assembled in [`crate::app`].

pub mod batches;
pub mod certificates;
pub mod public;
pub mod works;
