//! StoreChat server library.
//!
//! The chat widget API as a library, so the router can be driven in tests
//! against the in-memory store and reused by the CLI for migrations and
//! seeding.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
