//! The `ModelerApi` trait defines the capability surface of the modeler
//! backend (queue client, test doubles).

use async_trait::async_trait;
use serde_json::Value;
use tm_domain::capability::Capability;
use tm_domain::error::Result;

use crate::client::RpcClient;
use crate::envelope::Envelope;
use crate::types::{
    AutoFix, ChatReply, ComponentTemplate, ExportedFile, GeneratedMesh, ParamValues,
    ParsedParameters, Validation,
};
use crate::unpack::{file_at, list_at, params_at, text_at, value_at};

/// Abstraction over the modeler backend's remote capabilities.
///
/// Every method is an error boundary: failures of any kind come back as a
/// failed [`Envelope`] carrying a displayable message, never as an `Err`.
#[async_trait]
pub trait ModelerApi: Send + Sync {
    /// Turn a natural-language request into script code.
    async fn chat_to_code(
        &self,
        message: &str,
        history: &[Value],
        current_code: &str,
    ) -> Envelope<ChatReply>;

    /// Run the script and produce a mesh file.
    async fn generate_mesh(&self, code: &str, params: &ParamValues) -> Envelope<GeneratedMesh>;

    /// Extract the script's parameter block.
    async fn parse_parameters(&self, code: &str) -> Envelope<ParsedParameters>;

    async fn validate_code(&self, code: &str) -> Envelope<Validation>;

    async fn auto_fix_code(&self, code: &str) -> Envelope<AutoFix>;

    /// Export the model as an STL file.
    async fn export_stl(&self, code: &str, params: &ParamValues) -> Envelope<ExportedFile>;

    /// Fetch the script template for a library component.
    async fn get_component_template(
        &self,
        component_id: &str,
        params: &ParamValues,
    ) -> Envelope<ComponentTemplate>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Typed calls
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

impl RpcClient {
    async fn try_chat_to_code(
        &self,
        message: &str,
        history: &[Value],
        current_code: &str,
    ) -> Result<ChatReply> {
        let args = vec![
            Value::from(message),
            Value::Array(history.to_vec()),
            Value::from(current_code),
        ];
        let data = self.call(Capability::ChatToCode, args).await?;
        Ok(ChatReply {
            code: text_at(&data, 0),
            status: text_at(&data, 1),
            history: list_at(&data, 2),
        })
    }

    async fn try_generate_mesh(&self, code: &str, params: &ParamValues) -> Result<GeneratedMesh> {
        let args = vec![Value::from(code), Value::from(serde_json::to_string(params)?)];
        let data = self.call(Capability::GenerateMesh, args).await?;
        Ok(GeneratedMesh {
            mesh_url: file_at(self.base_url(), &data, 0),
            status: text_at(&data, 1),
            mesh_info: value_at(&data, 2),
        })
    }

    async fn try_parse_parameters(&self, code: &str) -> Result<ParsedParameters> {
        let data = self
            .call(Capability::ParseParameters, vec![Value::from(code)])
            .await?;
        Ok(ParsedParameters {
            params: params_at(&data, 0),
            status: text_at(&data, 1),
        })
    }

    async fn try_validate_code(&self, code: &str) -> Result<Validation> {
        let data = self
            .call(Capability::ValidateCode, vec![Value::from(code)])
            .await?;
        Ok(Validation {
            message: text_at(&data, 0),
            warnings: list_at(&data, 1),
        })
    }

    async fn try_auto_fix_code(&self, code: &str) -> Result<AutoFix> {
        let data = self
            .call(Capability::AutoFixCode, vec![Value::from(code)])
            .await?;
        Ok(AutoFix {
            fixed_code: text_at(&data, 0),
            status: text_at(&data, 1),
            fixes: list_at(&data, 2),
        })
    }

    async fn try_export_stl(&self, code: &str, params: &ParamValues) -> Result<ExportedFile> {
        let args = vec![Value::from(code), Value::from(serde_json::to_string(params)?)];
        let data = self.call(Capability::ExportStl, args).await?;
        Ok(ExportedFile {
            file_url: file_at(self.base_url(), &data, 0),
            status: text_at(&data, 1),
        })
    }

    async fn try_get_component_template(
        &self,
        component_id: &str,
        params: &ParamValues,
    ) -> Result<ComponentTemplate> {
        let args = vec![
            Value::from(component_id),
            Value::from(serde_json::to_string(params)?),
        ];
        let data = self.call(Capability::GetComponentTemplate, args).await?;
        Ok(ComponentTemplate {
            code: text_at(&data, 0),
            description: text_at(&data, 1),
        })
    }
}

/// Close the error boundary, logging what the caller will only see as text.
fn envelope<T>(capability: Capability, result: Result<T>) -> Envelope<T> {
    if let Err(e) = &result {
        tracing::warn!(capability = %capability, error = %e, "capability call failed");
    }
    Envelope::from(result)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl ModelerApi for RpcClient {
    async fn chat_to_code(
        &self,
        message: &str,
        history: &[Value],
        current_code: &str,
    ) -> Envelope<ChatReply> {
        let result = self.try_chat_to_code(message, history, current_code).await;
        envelope(Capability::ChatToCode, result)
    }

    async fn generate_mesh(&self, code: &str, params: &ParamValues) -> Envelope<GeneratedMesh> {
        let result = self.try_generate_mesh(code, params).await;
        envelope(Capability::GenerateMesh, result)
    }

    async fn parse_parameters(&self, code: &str) -> Envelope<ParsedParameters> {
        let result = self.try_parse_parameters(code).await;
        envelope(Capability::ParseParameters, result)
    }

    async fn validate_code(&self, code: &str) -> Envelope<Validation> {
        let result = self.try_validate_code(code).await;
        envelope(Capability::ValidateCode, result)
    }

    async fn auto_fix_code(&self, code: &str) -> Envelope<AutoFix> {
        let result = self.try_auto_fix_code(code).await;
        envelope(Capability::AutoFixCode, result)
    }

    async fn export_stl(&self, code: &str, params: &ParamValues) -> Envelope<ExportedFile> {
        let result = self.try_export_stl(code, params).await;
        envelope(Capability::ExportStl, result)
    }

    async fn get_component_template(
        &self,
        component_id: &str,
        params: &ParamValues,
    ) -> Envelope<ComponentTemplate> {
        let result = self.try_get_component_template(component_id, params).await;
        envelope(Capability::GetComponentTemplate, result)
    }
}
