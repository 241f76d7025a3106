//! The one supported operation: batch-append records to a Bitable table.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::feishu::FeishuClient;

use super::{OperationDescriptor, Tool, ToolOutput};

pub const OPERATION_ID: &str = "append_to_bitable";

/// Appends caller-supplied records to the configured Bitable table.
pub struct AppendToBitable {
    client: Arc<FeishuClient>,
}

impl AppendToBitable {
    pub fn new(client: Arc<FeishuClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for AppendToBitable {
    fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor {
            operation_id: OPERATION_ID.to_string(),
            description: "Append records to a Feishu Bitable table".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "records": {
                        "type": "array",
                        "description": "Records to append",
                        "items": { "type": "object" }
                    }
                },
                "required": ["records"]
            }),
            returns: json!({
                "type": "object",
                "properties": {
                    "success": { "type": "boolean" },
                    "message": { "type": "string" }
                }
            }),
        }
    }

    async fn invoke(&self, parameters: &serde_json::Value) -> Result<ToolOutput> {
        // Only the shape is checked here; record contents go through
        // untouched and the remote service validates them.
        let records = parameters
            .get("records")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| anyhow::anyhow!("parameters.records must be an array"))?;

        // The batch call cannot be authenticated until the exchange
        // completes, so the two calls are strictly sequential.
        let token = self.client.tenant_access_token().await?;
        let details = self.client.batch_create(&token, records).await?;

        Ok(ToolOutput {
            message: format!("appended {} records", records.len()),
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feishu::FeishuConfig;

    fn tool() -> AppendToBitable {
        AppendToBitable::new(Arc::new(FeishuClient::new(FeishuConfig::default())))
    }

    #[test]
    fn descriptor_advertises_the_append_operation() {
        let descriptor = tool().descriptor();
        assert_eq!(descriptor.operation_id, "append_to_bitable");
        assert_eq!(descriptor.parameters["required"][0], "records");
        assert_eq!(descriptor.parameters["properties"]["records"]["type"], "array");
    }

    #[tokio::test]
    async fn invoke_rejects_missing_records() {
        let err = tool().invoke(&json!({})).await.unwrap_err();
        assert!(err.to_string().contains("records"));
    }

    #[tokio::test]
    async fn invoke_rejects_non_array_records() {
        let err = tool().invoke(&json!({ "records": "nope" })).await.unwrap_err();
        assert!(err.to_string().contains("must be an array"));
    }

    #[tokio::test]
    async fn invoke_rejects_null_parameters() {
        let err = tool().invoke(&serde_json::Value::Null).await.unwrap_err();
        assert!(err.to_string().contains("records"));
    }
}
