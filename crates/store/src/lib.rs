//! Persistence for agents, grounding items and chats.

pub mod json;
pub mod traits;

pub use json::JsonStore;
pub use traits::Store;
