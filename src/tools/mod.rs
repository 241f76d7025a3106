pub mod bitable;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Static metadata describing a callable operation, exposed for discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub operation_id: String,
    pub description: String,
    /// JSON schema for the invocation parameters. Opaque to this layer.
    pub parameters: serde_json::Value,
    /// JSON schema for the result shape. Opaque to this layer.
    pub returns: serde_json::Value,
}

/// What a tool produces when it succeeds.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub message: String,
    /// Remote response payload, passed through to the caller untouched.
    pub details: serde_json::Value,
}

/// Uniform envelope returned for every invocation regardless of outcome.
/// Exactly one of: success with message + details, or failure with message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// A callable operation: its descriptor plus the work itself.
#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> OperationDescriptor;
    async fn invoke(&self, parameters: &serde_json::Value) -> Result<ToolOutput>;
}

/// All registered operations, keyed by operation id. Reads are the hot
/// path; the write lock is only taken during startup registration.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let id = tool.descriptor().operation_id;
        self.tools.write().await.insert(id, tool);
    }

    pub async fn get(&self, operation_id: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().await.get(operation_id).cloned()
    }

    /// Invoke an operation by id.
    ///
    /// `None` means the id is unknown; the transport layer turns that into
    /// a client error. A tool failure still produces an envelope: the
    /// `success` flag carries the outcome, not the transport status.
    pub async fn invoke(
        &self,
        operation_id: &str,
        parameters: &serde_json::Value,
    ) -> Option<InvocationResult> {
        let tool = self.get(operation_id).await?;
        let result = match tool.invoke(parameters).await {
            Ok(output) => InvocationResult {
                success: true,
                message: output.message,
                details: Some(output.details),
            },
            Err(e) => InvocationResult {
                success: false,
                message: e.to_string(),
                details: None,
            },
        };
        Some(result)
    }

    /// Descriptors for every registered operation, in stable id order.
    pub async fn descriptors(&self) -> Vec<OperationDescriptor> {
        let mut all: Vec<_> = self
            .tools
            .read()
            .await
            .values()
            .map(|t| t.descriptor())
            .collect();
        all.sort_by(|a, b| a.operation_id.cmp(&b.operation_id));
        all
    }
}
