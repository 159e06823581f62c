//! Tool request and wire payload structures

use crate::config::ConversationIds;
use crate::error::{Result, ToolError};
use serde::Serialize;
use uuid::Uuid;

/// Parameters passed to a remote tool; the shape is tool-specific
pub type ToolParameters = serde_json::Map<String, serde_json::Value>;

/// Successful server response, returned as-is
pub type ToolResponse = serde_json::Value;

/// A single remote tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRequest {
    /// Name of the tool to run (e.g. "execute_bash")
    pub tool: String,

    /// Parameters to pass to the tool
    pub parameters: ToolParameters,

    /// Target environment, e.g. "django.14520"
    pub instance_id: Option<String>,

    /// Groups calls for server-side tracking; generated when absent
    pub conversation_id: Option<String>,
}

/// Body of `POST /api/v1/execute`
#[derive(Debug, Serialize)]
pub(crate) struct ExecutePayload<'a> {
    pub tool: &'a str,
    pub parameters: &'a ToolParameters,
    pub conversation_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<&'a str>,
}

impl ToolRequest {
    /// Create a new request for a tool
    pub fn new<S: Into<String>>(tool: S, parameters: ToolParameters) -> Self {
        Self {
            tool: tool.into(),
            parameters,
            instance_id: None,
            conversation_id: None,
        }
    }

    /// Target a specific instance
    pub fn with_instance_id<S: Into<String>>(mut self, instance_id: S) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    /// Attach to an existing conversation
    pub fn with_conversation_id<S: Into<String>>(mut self, conversation_id: S) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Reject requests that can never succeed
    pub fn validate(&self) -> Result<()> {
        if self.tool.trim().is_empty() {
            return Err(ToolError::InvalidRequest {
                message: "tool name cannot be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// The conversation id to send, generating one when absent
    pub fn resolve_conversation_id(&self, style: ConversationIds) -> String {
        match &self.conversation_id {
            Some(id) => id.clone(),
            None => generate_conversation_id(style),
        }
    }

    pub(crate) fn payload<'a>(&'a self, conversation_id: &'a str) -> ExecutePayload<'a> {
        ExecutePayload {
            tool: &self.tool,
            parameters: &self.parameters,
            conversation_id,
            // An empty id means no particular instance
            instance_id: self.instance_id.as_deref().filter(|id| !id.is_empty()),
        }
    }
}

/// Generate a conversation id in the given style
pub fn generate_conversation_id(style: ConversationIds) -> String {
    match style {
        ConversationIds::Timestamp => timestamp_conversation_id(chrono::Utc::now().timestamp()),
        ConversationIds::Random => format!("conv-{}", Uuid::new_v4().simple()),
    }
}

/// `conv-<unix seconds>`
pub fn timestamp_conversation_id(unix_secs: i64) -> String {
    format!("conv-{}", unix_secs)
}
