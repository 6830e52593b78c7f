//! StoreChat Core - Shared domain types.
//!
//! This crate provides the types shared by every StoreChat component:
//! - `server` - HTTP API for the support chat widget
//! - `cli` - Migrations and seed data
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encoding is opt-in via the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed UUID identifiers, message senders, emails and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
