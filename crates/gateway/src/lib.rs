pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod extract;
pub mod runtime;
pub mod state;
