use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use ym_domain::error::{Error, Result};
use ym_domain::tool::ToolDefinition;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Traits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One callable function: its schema plus the code behind it.
#[async_trait::async_trait]
pub trait FunctionHandler: Send + Sync {
    fn definition(&self) -> ToolDefinition;
    async fn call(&self, args: Value) -> Result<Value>;
}

/// Executes a function by name. The chat pipeline depends on this seam
/// rather than on the concrete registry.
#[async_trait::async_trait]
pub trait FunctionExecutor: Send + Sync {
    async fn execute(&self, name: &str, args: Value) -> Result<Value>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FunctionRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct Entry {
    definition: ToolDefinition,
    handler: Arc<dyn FunctionHandler>,
}

/// Immutable name → function table. Built with [`FunctionRegistry::register`]
/// chaining, then shared behind an `Arc`.
#[derive(Default)]
pub struct FunctionRegistry {
    entries: BTreeMap<String, Entry>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function. Returns self for chaining; a later registration
    /// under the same name replaces the earlier one.
    pub fn register(mut self, handler: Arc<dyn FunctionHandler>) -> Self {
        let definition = handler.definition();
        self.entries.insert(
            definition.name.clone(),
            Entry {
                definition,
                handler,
            },
        );
        self
    }

    /// Full definition for `name`, if registered.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.entries.get(name).map(|e| &e.definition)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.entries.values().map(|e| e.definition.clone()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names from `requested` that are not registered.
    pub fn unknown<'a>(&self, requested: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        requested
            .into_iter()
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect()
    }
}

#[async_trait::async_trait]
impl FunctionExecutor for FunctionRegistry {
    async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| Error::not_found("function", name))?;

        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };

        let started = Instant::now();
        let result = entry.handler.call(args).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(value) => {
                tracing::debug!(function = name, duration_ms, "function executed");
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(function = name, duration_ms, error = %e, "function failed");
                Err(match e {
                    err @ Error::Function { .. } => err,
                    other => Error::Function {
                        name: name.to_string(),
                        message: other.to_string(),
                    },
                })
            }
        }
    }
}

/// Build the registry with every built-in function.
pub fn default_registry() -> FunctionRegistry {
    FunctionRegistry::new().register(Arc::new(crate::date::CurrentDateFunction))
}
