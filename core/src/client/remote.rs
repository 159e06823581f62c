//! Remote tool execution client

use super::retry::{AttemptFailure, RetryPolicy};
use super::transport::{HttpRequest, HttpTransport, Method, Transport};
use crate::config::ClientConfig;
use crate::error::{ConfigError, Error, Result, ToolError};
use crate::tools::builtin::{
    bash_parameters, code_cell_parameters, edit_file_parameters, EDIT_FILE, EXECUTE_BASH,
    EXECUTE_IPYTHON_CELL,
};
use crate::tools::{LineRange, ToolParameters, ToolRequest, ToolResponse};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Health probe path
pub const HEALTH_PATH: &str = "/api/health";

/// Tool execution path
pub const EXECUTE_PATH: &str = "/api/v1/execute";

/// Client for a remote tool execution server
///
/// Holds only read-only configuration and a shared transport, so one client
/// can serve many concurrent tasks.
#[derive(Clone)]
pub struct RemoteToolClient {
    config: ClientConfig,
    headers: HeaderMap,
    policy: RetryPolicy,
    transport: Arc<dyn Transport>,
}

impl RemoteToolClient {
    /// Build a client without touching the network
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new()?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Build a client on top of a custom transport
    pub fn with_transport(mut config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.endpoint = crate::config::normalize_endpoint(&config.endpoint);
        config.validate()?;

        let headers = build_headers(&config.api_key)?;
        let policy = RetryPolicy::from_config(&config);

        Ok(Self {
            config,
            headers,
            policy,
            transport,
        })
    }

    /// Build a client and probe the server once.
    ///
    /// A failed probe is only logged unless `require_healthy` is set, so a
    /// client can be created while the server is still coming up.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let client = Self::new(config)?;
        client.ensure_ready().await?;
        Ok(client)
    }

    /// Probe the server, honouring `require_healthy`
    pub async fn ensure_ready(&self) -> Result<()> {
        let healthy = self.check_connection().await;
        if !healthy && self.config.require_healthy {
            return Err(Error::Connection {
                endpoint: self.config.endpoint.clone(),
            });
        }
        Ok(())
    }

    /// The resolved configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The retry policy in effect
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Check whether the server answers its health endpoint with 200.
    ///
    /// Never fails; any error is logged and reported as `false`.
    pub async fn check_connection(&self) -> bool {
        let request = self.request(Method::Get, HEALTH_PATH, None);

        match self.transport.send(request).await {
            Ok(response) if response.status == 200 => {
                info!("Successfully connected to tool server at {}", self.config.endpoint);
                true
            }
            Ok(response) => {
                warn!("Server returned status code {}", response.status);
                false
            }
            Err(e) => {
                error!("Failed to connect to server: {}", e);
                false
            }
        }
    }

    /// Execute a tool on the server
    pub async fn execute_tool(
        &self,
        tool: &str,
        parameters: ToolParameters,
        instance_id: Option<&str>,
        conversation_id: Option<&str>,
    ) -> Result<ToolResponse> {
        let mut request = ToolRequest::new(tool, parameters);
        request.instance_id = instance_id.map(str::to_string);
        request.conversation_id = conversation_id.map(str::to_string);
        self.execute(&request).await
    }

    /// Execute a prepared tool request, retrying per the client's policy
    pub async fn execute(&self, request: &ToolRequest) -> Result<ToolResponse> {
        request.validate()?;

        let conversation_id = request.resolve_conversation_id(self.config.conversation_ids);
        let body = serde_json::to_value(request.payload(&conversation_id))?;
        let max_attempts = self.policy.max_attempts;

        debug!(
            "Executing tool '{}' (conversation {})",
            request.tool, conversation_id
        );

        let mut attempt = 0;
        loop {
            let http = self.request(Method::Post, EXECUTE_PATH, Some(body.clone()));

            let failure = match self.transport.send(http).await {
                Ok(response) if response.status == 200 => {
                    match serde_json::from_str::<ToolResponse>(&response.body) {
                        Ok(result) => return Ok(result),
                        Err(e) => {
                            warn!(
                                "Attempt {}/{} returned an unreadable body: {}",
                                attempt + 1,
                                max_attempts,
                                e
                            );
                            AttemptFailure::Decode {
                                message: e.to_string(),
                                body: response.body,
                            }
                        }
                    }
                }
                Ok(response) => {
                    warn!(
                        "Attempt {}/{} failed with status {}: {}",
                        attempt + 1,
                        max_attempts,
                        response.status,
                        response.body
                    );
                    AttemptFailure::Status {
                        status: response.status,
                        body: response.body,
                    }
                }
                Err(e) => {
                    error!(
                        "Request error on attempt {}/{}: {}",
                        attempt + 1,
                        max_attempts,
                        e
                    );
                    AttemptFailure::Transport(e)
                }
            };

            if !self.policy.is_retryable(&failure) || !self.policy.has_attempts_left(attempt) {
                return Err(ToolError::ExecutionFailed {
                    tool: request.tool.clone(),
                    attempts: attempt + 1,
                    detail: failure.detail(),
                }
                .into());
            }

            tokio::time::sleep(self.policy.delay_for(attempt)).await;
            attempt += 1;
        }
    }

    /// Run a shell command
    pub async fn execute_bash(
        &self,
        command: &str,
        instance_id: Option<&str>,
        conversation_id: Option<&str>,
    ) -> Result<ToolResponse> {
        self.execute_tool(
            EXECUTE_BASH,
            bash_parameters(command),
            instance_id,
            conversation_id,
        )
        .await
    }

    /// Run an IPython code cell
    pub async fn execute_code_cell(
        &self,
        code: &str,
        instance_id: Option<&str>,
        conversation_id: Option<&str>,
    ) -> Result<ToolResponse> {
        self.execute_tool(
            EXECUTE_IPYTHON_CELL,
            code_cell_parameters(code),
            instance_id,
            conversation_id,
        )
        .await
    }

    /// Alias for [`execute_code_cell`](Self::execute_code_cell)
    pub async fn execute_python(
        &self,
        code: &str,
        instance_id: Option<&str>,
        conversation_id: Option<&str>,
    ) -> Result<ToolResponse> {
        self.execute_code_cell(code, instance_id, conversation_id)
            .await
    }

    /// Replace `range` of the file at `path` with `new_content_draft`
    pub async fn edit_file(
        &self,
        path: &str,
        new_content_draft: &str,
        range: LineRange,
        instance_id: Option<&str>,
        conversation_id: Option<&str>,
    ) -> Result<ToolResponse> {
        self.execute_tool(
            EDIT_FILE,
            edit_file_parameters(path, new_content_draft, range),
            instance_id,
            conversation_id,
        )
        .await
    }

    fn request(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{}", self.config.endpoint, path),
            headers: self.headers.clone(),
            body,
            timeout: self.config.timeout,
        }
    }
}

impl std::fmt::Debug for RemoteToolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteToolClient")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn build_headers(api_key: &str) -> Result<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
        ConfigError::InvalidValue {
            field: "api_key".to_string(),
            value: "contains characters not allowed in an HTTP header".to_string(),
        }
    })?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}
