use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Tool definition exposed to the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema for the tool's parameters.
    #[serde(default = "empty_object")]
    pub parameters: Value,
}

impl ToolDefinition {
    /// A definition known only by name (description/schema resolved later
    /// against the function registry).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameters: empty_object(),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Function reference as it may appear in stored or submitted agent JSON:
/// either a bare function name or an inline definition object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FunctionRef {
    Name(String),
    Inline(ToolDefinition),
}

impl FunctionRef {
    pub fn into_definition(self) -> ToolDefinition {
        match self {
            FunctionRef::Name(name) => ToolDefinition::named(name),
            FunctionRef::Inline(def) => def,
        }
    }
}

/// Serde helper: accept a list of [`FunctionRef`]s and normalize every entry
/// to a [`ToolDefinition`]. Entries with an empty name are dropped.
pub fn deserialize_function_refs<'de, D>(de: D) -> Result<Vec<ToolDefinition>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs: Option<Vec<FunctionRef>> = Option::deserialize(de)?;
    Ok(refs
        .unwrap_or_default()
        .into_iter()
        .map(FunctionRef::into_definition)
        .filter(|d| !d.name.is_empty())
        .collect())
}
