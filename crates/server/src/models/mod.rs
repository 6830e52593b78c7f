//! Domain models for StoreChat.
//!
//! These are validated domain objects, separate from database row types.
//! They serialize with camelCase keys, matching the widget's JSON contract.

pub mod conversation;
pub mod message;
pub mod product;
pub mod stats;
pub mod user;

pub use conversation::{Conversation, conversation_title};
pub use message::Message;
pub use product::{NewProduct, Product};
pub use stats::StoreStats;
pub use user::{DEMO_PASSWORD, NewUser, User};
