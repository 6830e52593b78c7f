//! Core types for StoreChat.
//!
//! This module provides type-safe wrappers for the chat domain.

pub mod email;
pub mod id;
pub mod price;
pub mod sender;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use sender::Sender;
