pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod grounding;
pub mod message;
pub mod stream;
pub mod temperature;
pub mod tool;
pub mod trace;
