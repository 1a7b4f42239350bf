//! Request dispatch.
//!
//! A request moves through four stages: decode the method, resolve and
//! validate the target capability, execute its handler, and encode the
//! outcome. Protocol errors (unknown method, unknown capability, invalid
//! arguments) stop at the stage that detects them and become JSON-RPC error
//! responses. Tool faults are not protocol errors: they are encoded as a
//! normal result with `isError: true`.
//!
//! The dispatcher owns no I/O. It maps one [`IncomingMessage`] to at most one
//! [`Outgoing`] message, which keeps it usable from tests without a transport.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::mcp::protocol::{
    ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, Outgoing, RequestId, MCP_PROTOCOL_VERSION,
};
use crate::mcp::types::{
    InitializeParams, InitializeResult, NamedCallParams, ReadResourceParams, ReadResourceResult,
    ResourceContents, ServerCapabilities, ServerInfo, ToolCallResult,
};
use crate::registry::{Arguments, Category, Registry, RegistryError};

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// The methods this server understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Capability negotiation handshake.
    Initialize,
    /// Liveness check.
    Ping,
    /// Enumerate tools.
    ListTools,
    /// Invoke a tool.
    CallTool,
    /// Enumerate resources.
    ListResources,
    /// Read a resource.
    ReadResource,
    /// Enumerate prompts.
    ListPrompts,
    /// Render a prompt.
    GetPrompt,
}

impl Method {
    /// Every method, in documentation order.
    pub const ALL: [Self; 8] = [
        Self::Initialize,
        Self::Ping,
        Self::ListTools,
        Self::CallTool,
        Self::ListResources,
        Self::ReadResource,
        Self::ListPrompts,
        Self::GetPrompt,
    ];

    /// Parses a wire method name.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    /// Wire method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Ping => "ping",
            Self::ListTools => "tools/list",
            Self::CallTool => "tools/call",
            Self::ListResources => "resources/list",
            Self::ReadResource => "resources/read",
            Self::ListPrompts => "prompts/list",
            Self::GetPrompt => "prompts/get",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protocol-level failure. Each variant becomes a JSON-RPC error response
/// and the dispatch loop carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The method is not in the supported set.
    #[error("Method not found: {method}")]
    UnknownMethod {
        /// The rejected method name.
        method: String,
    },

    /// The method is known but names an unregistered capability.
    #[error("Unknown {category} capability: {name}")]
    UnknownCapability {
        /// Category searched.
        category: Category,
        /// The unknown name or URI.
        name: String,
    },

    /// Parameters are missing, malformed, or fail the capability's schema.
    #[error("Invalid arguments: {message}")]
    InvalidArguments {
        /// What is wrong.
        message: String,
    },

    /// A second `initialize` arrived.
    #[error("Server already initialised")]
    AlreadyInitialised,

    /// A request arrived before the handshake completed.
    #[error("Server not initialised")]
    NotInitialised,

    /// Something went wrong inside the server.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl DispatchError {
    /// JSON-RPC code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownMethod { .. } => ErrorCode::MethodNotFound,
            Self::UnknownCapability { .. } => ErrorCode::CapabilityNotFound,
            Self::InvalidArguments { .. } => ErrorCode::InvalidParams,
            Self::AlreadyInitialised | Self::NotInitialised => ErrorCode::InvalidRequest,
            Self::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Converts into a JSON-RPC error response for request `id`.
    #[must_use]
    pub fn into_response(self, id: RequestId) -> JsonRpcError {
        let code = self.code();
        let data = match &self {
            Self::UnknownCapability { category, name } => {
                Some(json!({ "category": category.as_str(), "name": name }))
            }
            _ => None,
        };

        let mut error = JsonRpcErrorData::new(code, self.to_string());
        if let Some(data) = data {
            error = error.with_data(data);
        }
        JsonRpcError::new(Some(id), error)
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<RegistryError> for DispatchError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound { category, name } => Self::UnknownCapability { category, name },
            RegistryError::Duplicate { .. } => Self::internal(e.to_string()),
        }
    }
}

/// Routes decoded messages to capabilities in a shared [`Registry`].
pub struct Dispatcher {
    /// Read-only capability table.
    registry: Arc<Registry>,
    /// Identity and lifecycle settings.
    settings: ServerConfig,
    /// Current lifecycle state.
    state: ServerState,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
}

impl Dispatcher {
    /// Creates a dispatcher with default settings.
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_settings(registry, ServerConfig::default())
    }

    /// Creates a dispatcher with the given settings.
    #[must_use]
    pub const fn with_settings(registry: Arc<Registry>, settings: ServerConfig) -> Self {
        Self {
            registry,
            settings,
            state: ServerState::AwaitingInit,
            protocol_version: None,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, if initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Returns the capability registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Marks the session as shutting down.
    pub fn shut_down(&mut self) {
        self.state = ServerState::ShuttingDown;
    }

    /// Handles one decoded message.
    ///
    /// Requests always yield exactly one response; notifications yield none.
    pub fn dispatch(&mut self, message: &IncomingMessage) -> Option<Outgoing> {
        match message {
            IncomingMessage::Request(req) => Some(self.handle_request(req)),
            IncomingMessage::Notification(notif) => {
                self.handle_notification(notif);
                None
            }
        }
    }

    /// Handles an incoming request.
    pub fn handle_request(&mut self, req: &JsonRpcRequest) -> Outgoing {
        debug!(id = %req.id, method = %req.method, "Handling request");

        match self.route(req) {
            Ok(result) => JsonRpcResponse::success(req.id.clone(), result).into(),
            Err(error) => {
                debug!(id = %req.id, error = %error, "Request failed");
                error.into_response(req.id.clone()).into()
            }
        }
    }

    fn route(&mut self, req: &JsonRpcRequest) -> Result<Value, DispatchError> {
        let method = Method::from_wire(&req.method).ok_or_else(|| DispatchError::UnknownMethod {
            method: req.method.clone(),
        })?;

        if !matches!(method, Method::Initialize | Method::Ping) {
            self.require_running()?;
        }

        let params = req.params.as_ref();
        match method {
            Method::Initialize => self.initialize(params),
            Method::Ping => Ok(json!({})),
            Method::ListTools => Ok(self.list(Category::Tools)),
            Method::ListResources => Ok(self.list(Category::Resources)),
            Method::ListPrompts => Ok(self.list(Category::Prompts)),
            Method::CallTool => self.call_tool(params),
            Method::ReadResource => self.read_resource(params),
            Method::GetPrompt => self.get_prompt(params),
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            self.state = ServerState::Running;
            info!("Client initialisation complete");
        } else {
            debug!(method = %notif.method, "Ignoring notification");
        }
    }

    /// Ensures the handshake is done when the settings demand it.
    fn require_running(&self) -> Result<(), DispatchError> {
        if self.settings.require_initialization && self.state != ServerState::Running {
            return Err(DispatchError::NotInitialised);
        }
        Ok(())
    }

    /// Handles the initialize request.
    fn initialize(&mut self, params: Option<&Value>) -> Result<Value, DispatchError> {
        if self.state != ServerState::AwaitingInit {
            return Err(DispatchError::AlreadyInitialised);
        }

        let params: InitializeParams = match params {
            Some(p) => decode_params(p, Method::Initialize)?,
            None => InitializeParams::default(),
        };

        if let Some(ref client) = params.client_info {
            info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                requested_version = params.protocol_version.as_deref().unwrap_or("unspecified"),
                "Client connected"
            );
        }

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();
        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        encode(&InitializeResult {
            protocol_version: negotiated_version,
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo::named(self.settings.name.clone()),
            instructions: self.settings.instructions.clone(),
        })
    }

    /// Lists one category of capabilities.
    fn list(&self, category: Category) -> Value {
        let mut result = serde_json::Map::new();
        result.insert(category.as_str().to_string(), json!(self.registry.list(category)));
        Value::Object(result)
    }

    /// Handles the tools/call request.
    fn call_tool(&self, params: Option<&Value>) -> Result<Value, DispatchError> {
        let params: NamedCallParams = require_params(params, Method::CallTool)?;
        let entry = self.registry.tool(&params.name)?;
        let arguments = params.arguments.unwrap_or_default();

        entry
            .descriptor
            .input_schema
            .validate(&arguments)
            .map_err(|v| DispatchError::invalid(v.to_string()))?;

        let result = match (entry.handler)(&arguments) {
            Ok(text) => ToolCallResult::text(text),
            Err(fault) => {
                warn!(tool = %params.name, error = %fault, "Tool reported a fault");
                ToolCallResult::error(format!("Error: {fault}"))
            }
        };

        encode(&result)
    }

    /// Handles the resources/read request.
    fn read_resource(&self, params: Option<&Value>) -> Result<Value, DispatchError> {
        let params: ReadResourceParams = require_params(params, Method::ReadResource)?;
        let entry = self.registry.resource(&params.uri)?;

        let text = (entry.reader)().map_err(|fault| {
            warn!(uri = %params.uri, error = %fault, "Resource read failed");
            DispatchError::internal(fault.to_string())
        })?;

        encode(&ReadResourceResult {
            contents: vec![ResourceContents {
                uri: entry.descriptor.uri.clone(),
                mime_type: entry.descriptor.mime_type.clone(),
                text,
            }],
        })
    }

    /// Handles the prompts/get request.
    fn get_prompt(&self, params: Option<&Value>) -> Result<Value, DispatchError> {
        let params: NamedCallParams = require_params(params, Method::GetPrompt)?;
        let entry = self.registry.prompt(&params.name)?;
        let arguments: Arguments = params.arguments.unwrap_or_default();

        entry
            .descriptor
            .validate(&arguments)
            .map_err(|v| DispatchError::invalid(v.to_string()))?;

        let rendered = (entry.renderer)(&arguments).map_err(|fault| {
            warn!(prompt = %params.name, error = %fault, "Prompt rendering failed");
            DispatchError::internal(fault.to_string())
        })?;

        encode(&rendered)
    }
}

fn require_params<T: DeserializeOwned>(
    params: Option<&Value>,
    method: Method,
) -> Result<T, DispatchError> {
    let params =
        params.ok_or_else(|| DispatchError::invalid(format!("Missing {method} params")))?;
    decode_params(params, method)
}

fn decode_params<T: DeserializeOwned>(params: &Value, method: Method) -> Result<T, DispatchError> {
    T::deserialize(params)
        .map_err(|e| DispatchError::invalid(format!("Invalid {method} params: {e}")))
}

fn encode<T: Serialize>(result: &T) -> Result<Value, DispatchError> {
    serde_json::to_value(result).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialise result");
        DispatchError::internal("failed to serialise result")
    })
}
