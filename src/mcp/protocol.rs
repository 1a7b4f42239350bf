//! JSON-RPC 2.0 envelopes as used by MCP.
//!
//! Incoming lines are classified as a [`JsonRpcRequest`] (has `id`) or a
//! [`JsonRpcNotification`] (no `id`). Everything written back is an
//! [`Outgoing`] message: a success or an error, never both.
//!
//! MCP narrows JSON-RPC in one respect: request ids are strings or integers,
//! never `null`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Default server name for capability negotiation.
pub const SERVER_NAME: &str = "basic-mcp-server";

const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// String request ID.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// A request expecting exactly one response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Correlates the response.
    pub id: RequestId,
    /// Method name, never empty.
    pub method: String,
    /// Method parameters, if any.
    #[serde(default)]
    pub params: Option<Value>,
}

/// A one-way message; never answered.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcNotification {
    /// Notification name.
    pub method: String,
    /// Notification parameters, if any.
    #[serde(default)]
    pub params: Option<Value>,
}

/// A decoded inbound message.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// Has an `id`, gets a response.
    Request(JsonRpcRequest),
    /// No `id`, gets nothing.
    Notification(JsonRpcNotification),
}

/// Error codes this server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The frame was not JSON.
    ParseError,
    /// JSON, but not a JSON-RPC 2.0 request.
    InvalidRequest,
    /// Unsupported method.
    MethodNotFound,
    /// Parameters missing or failing the schema.
    InvalidParams,
    /// Reader, renderer or encoder failure.
    InternalError,
    /// No tool, resource or prompt under that name.
    CapabilityNotFound,
}

impl ErrorCode {
    /// Numeric wire value.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::CapabilityNotFound => -32002,
        }
    }

    const fn summary(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::CapabilityNotFound => "Capability not found",
        }
    }
}

/// The `error` member of an error response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorData {
    /// Numeric code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorData {
    /// Error with a custom message.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured detail.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl From<ErrorCode> for JsonRpcErrorData {
    fn from(code: ErrorCode) -> Self {
        Self::new(code, code.summary())
    }
}

/// A successful response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    /// Id of the answered request.
    pub id: RequestId,
    /// Method result.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Wraps `result` for request `id`.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// An error response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    jsonrpc: &'static str,
    /// Id of the failed request; `null` on the wire when it could not be
    /// recovered.
    pub id: Option<RequestId>,
    /// Error details.
    pub error: JsonRpcErrorData,
}

impl JsonRpcError {
    /// Error response for `id`.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JsonRpcErrorData contains String
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error,
        }
    }

    /// The frame could not be decoded; the id is unknown.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::new(None, ErrorCode::ParseError.into())
    }

    /// The value is not a JSON-RPC 2.0 message.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>) -> Self {
        Self::new(id, ErrorCode::InvalidRequest.into())
    }
}

/// Any message the server writes back to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outgoing {
    /// A success response.
    Response(JsonRpcResponse),
    /// An error response.
    Error(JsonRpcError),
}

impl From<JsonRpcResponse> for Outgoing {
    fn from(response: JsonRpcResponse) -> Self {
        Self::Response(response)
    }
}

impl From<JsonRpcError> for Outgoing {
    fn from(error: JsonRpcError) -> Self {
        Self::Error(error)
    }
}

/// Classifies a decoded JSON value as a request or a notification.
///
/// # Errors
///
/// Returns an invalid request error, carrying the id when one could be read,
/// if the value is not a JSON-RPC 2.0 object with a non-empty method.
pub fn parse_value(value: Value) -> Result<IncomingMessage, JsonRpcError> {
    let Value::Object(obj) = value else {
        return Err(JsonRpcError::invalid_request(None));
    };

    let id = obj
        .get("id")
        .and_then(|v| RequestId::deserialize(v).ok());

    if obj.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(JsonRpcError::invalid_request(id));
    }

    let has_id = obj.contains_key("id");
    let message = if has_id {
        decode::<JsonRpcRequest>(obj).map(IncomingMessage::Request)
    } else {
        decode::<JsonRpcNotification>(obj).map(IncomingMessage::Notification)
    };

    match message {
        Some(IncomingMessage::Request(req)) if req.method.is_empty() => {
            Err(JsonRpcError::invalid_request(Some(req.id)))
        }
        Some(message) => Ok(message),
        None => Err(JsonRpcError::invalid_request(id)),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(obj: Map<String, Value>) -> Option<T> {
    serde_json::from_value(Value::Object(obj)).ok()
}

/// Decodes a JSON string into an incoming message.
///
/// # Errors
///
/// Returns a parse error if `json` is not JSON, otherwise any error from
/// [`parse_value`].
pub fn parse_message(json: &str) -> Result<IncomingMessage, JsonRpcError> {
    let value: Value = serde_json::from_str(json).map_err(|_| JsonRpcError::parse_error())?;
    parse_value(value)
}
