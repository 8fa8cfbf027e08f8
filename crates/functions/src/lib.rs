//! Local functions the model may call.
//!
//! The registry is built once at startup and shared read-only
//! (`Arc<FunctionRegistry>`); agents reference entries by name.

pub mod date;
pub mod registry;

pub use registry::{default_registry, FunctionExecutor, FunctionHandler, FunctionRegistry};
