//! Request and response envelopes.

use serde::{Deserialize, Serialize};

/// Outer wire structure; exactly one per transport message.
///
/// `exchange` is optional on the wire so that a peer speaking a newer
/// protocol revision still decodes; the client treats a missing exchange as
/// an unexpected message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// What this message carries.
    #[serde(default)]
    pub exchange: Option<Exchange>,
}

/// Exchange kind tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exchange {
    /// A call from client to server.
    Request(Request),
    /// The answer to a call.
    Response(Response),
}

impl Exchange {
    /// Short name of the exchange kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Exchange::Request(_) => "request",
            Exchange::Response(_) => "response",
        }
    }
}

/// Call envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Unique per invocation.
    pub call_id: String,
    /// Remote method name.
    pub method: String,
    /// Serialized arguments.
    pub payload: Vec<u8>,
}

/// Response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Identifier of the call being answered. Empty when the peer does not
    /// echo identifiers.
    #[serde(default)]
    pub call_id: String,
    /// Serialized reply, absent when the peer had nothing to return.
    #[serde(default)]
    pub payload: Option<Vec<u8>>,
    /// Non-empty when the peer failed to handle the call.
    #[serde(default)]
    pub error: String,
}

impl Message {
    /// Wrap a new call envelope.
    pub fn request(call_id: impl Into<String>, method: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            exchange: Some(Exchange::Request(Request {
                call_id: call_id.into(),
                method: method.into(),
                payload,
            })),
        }
    }

    /// Wrap a successful response.
    pub fn response(call_id: impl Into<String>, payload: Option<Vec<u8>>) -> Self {
        Self {
            exchange: Some(Exchange::Response(Response {
                call_id: call_id.into(),
                payload,
                error: String::new(),
            })),
        }
    }

    /// Wrap a failed response.
    pub fn error_response(call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            exchange: Some(Exchange::Response(Response {
                call_id: call_id.into(),
                payload: None,
                error: error.into(),
            })),
        }
    }

    /// Short name of the carried exchange, `"none"` when absent.
    pub fn kind(&self) -> &'static str {
        self.exchange.as_ref().map_or("none", Exchange::kind)
    }
}

impl Response {
    /// Whether this response answers `call_id`.
    ///
    /// Responses without an identifier are assumed to answer the
    /// outstanding call.
    pub fn answers(&self, call_id: &str) -> bool {
        self.call_id.is_empty() || self.call_id == call_id
    }
}
