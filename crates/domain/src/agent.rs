use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::temperature::Temperature;
use crate::tool::{deserialize_function_refs, ToolDefinition};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_ICON: &str = "bot";

/// A named configuration bundle: prompt, model, temperature, allowed
/// functions and grounding scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub temperature: Temperature,
    #[serde(default = "default_model")]
    pub model: String,
    /// Functions the agent may invoke, normalized on read.
    #[serde(default, deserialize_with = "deserialize_function_refs")]
    pub functions: Vec<ToolDefinition>,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub category: AgentCategory,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentCategory {
    Analysis,
    Content,
    Seo,
    #[default]
    General,
}

impl std::str::FromStr for AgentCategory {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analysis" => Ok(Self::Analysis),
            "content" => Ok(Self::Content),
            "seo" => Ok(Self::Seo),
            "general" => Ok(Self::General),
            other => Err(crate::error::Error::Validation(format!(
                "unknown agent category {other:?}"
            ))),
        }
    }
}

/// Fields accepted when creating an agent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    #[serde(default)]
    pub temperature: Option<Temperature>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "deserialize_function_refs")]
    pub functions: Vec<ToolDefinition>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<AgentCategory>,
    #[serde(default)]
    pub is_default: bool,
}

/// Partial update of an agent; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<Temperature>,
    pub model: Option<String>,
    #[serde(default, deserialize_with = "deserialize_patch_functions")]
    pub functions: Option<Vec<ToolDefinition>>,
    pub icon: Option<String>,
    pub category: Option<AgentCategory>,
}

fn deserialize_patch_functions<'de, D>(de: D) -> Result<Option<Vec<ToolDefinition>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_function_refs(de).map(Some)
}

impl Agent {
    pub fn from_new(id: String, new: NewAgent, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            system_prompt: new.system_prompt,
            temperature: new.temperature.unwrap_or_default(),
            model: new.model.filter(|m| !m.is_empty()).unwrap_or_else(default_model),
            functions: new.functions,
            icon: new.icon.unwrap_or_else(default_icon),
            category: new.category.unwrap_or_default(),
            is_default: new.is_default,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: AgentPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.system_prompt {
            self.system_prompt = v;
        }
        if let Some(v) = patch.temperature {
            self.temperature = v;
        }
        if let Some(v) = patch.model {
            self.model = v;
        }
        if let Some(v) = patch.functions {
            self.functions = v;
        }
        if let Some(v) = patch.icon {
            self.icon = v;
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        self.updated_at = now;
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_icon() -> String {
    DEFAULT_ICON.into()
}
