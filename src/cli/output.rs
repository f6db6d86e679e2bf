//! output formatting utilities for scriptable CLI output
//!
//! uses JSON-RPC 2.0 format for machine-readable output:
//! - success: {"jsonrpc": "2.0", "result": {...}, "id": null}
//! - error: {"jsonrpc": "2.0", "error": {"code": N, "message": "...", "data": {...}}, "id": null}

use serde::Serialize;
use std::io::IsTerminal;

use crate::conditions::{CompiledExpression, CompiledTokenKind, LexedToken, Token};

/// JSON-RPC version constant
const JSONRPC_VERSION: &str = "2.0";

/// output mode determines how results are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// human-readable text output
    Text,
    /// machine-readable JSON-RPC 2.0 output
    Json,
    /// no output on success (errors still go to stderr)
    Quiet,
}

impl OutputMode {
    /// determine output mode from CLI flags and environment
    ///
    /// priority: quiet > json > no_json > auto-detect
    pub fn from_flags(json: bool, no_json: bool, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        if json {
            return Self::Json;
        }
        if no_json {
            return Self::Text;
        }
        // auto-detect: JSON when stdout is not a TTY (piped)
        if !std::io::stdout().is_terminal() {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }
}

/// JSON-RPC 2.0 success response
#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// null for CLI responses (no request id)
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

/// JSON-RPC 2.0 error response
#[derive(Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub error: RpcError,
    pub id: Option<String>,
}

/// JSON-RPC 2.0 error object
#[derive(Serialize)]
pub struct RpcError {
    /// error code (exit code offset by -32000 for app-specific errors)
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

/// additional error data
#[derive(Serialize)]
pub struct ErrorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl JsonRpcError {
    /// create error with standard JSON-RPC error code range
    /// editcond uses -32000 to -32099 for application errors (per JSON-RPC spec)
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(code),
                message: message.into(),
                data: None,
            },
            id: None,
        }
    }

    pub fn with_suggestions(
        code: i32,
        message: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        let mut error = Self::new(code, message);
        if !suggestions.is_empty() {
            error.error.data = Some(ErrorData {
                suggestions: Some(suggestions),
                details: None,
            });
        }
        error
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = Some(details.into());
        match &mut self.error.data {
            Some(data) => data.details = details,
            None => {
                self.error.data = Some(ErrorData {
                    suggestions: None,
                    details,
                })
            }
        }
        self
    }
}

/// convert exit code to JSON-RPC error code
/// JSON-RPC reserves -32000 to -32099 for server/application errors
fn to_jsonrpc_code(exit_code: i32) -> i32 {
    -32000 - exit_code
}

// ============================================================================
// Result data structures for different commands
// ============================================================================

/// result data for the check command
#[derive(Serialize)]
pub struct CheckData {
    pub source: String,
    /// compiled sequence in postfix order
    pub postfix: Vec<TokenData>,
    pub properties: Vec<String>,
}

/// result data for `check --tokens`
#[derive(Serialize)]
pub struct TokensData {
    pub source: String,
    pub tokens: Vec<TokenData>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TokenData {
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub text: String,
    pub position: usize,
}

impl TokenData {
    pub fn from_lexed(lexed: &LexedToken) -> Self {
        Self {
            token_type: token_type(&lexed.token),
            text: lexed.token.to_string(),
            position: lexed.position,
        }
    }
}

fn token_type(token: &Token) -> &'static str {
    match token {
        Token::Operator(_) => "operator",
        Token::Bool(_) => "bool",
        Token::Number(_) => "number",
        Token::Null => "null",
        Token::Property(_) => "property",
        Token::Enum { .. } => "enum",
    }
}

impl CheckData {
    pub fn from_expression(expr: &CompiledExpression) -> Self {
        let postfix = expr
            .tokens()
            .iter()
            .map(|t| TokenData {
                token_type: match t.kind {
                    CompiledTokenKind::Operand => token_type(&t.token),
                    CompiledTokenKind::PreUnary => "unary",
                    CompiledTokenKind::Binary => "binary",
                },
                text: t.token.to_string(),
                position: t.position,
            })
            .collect();

        let mut properties: Vec<String> = Vec::new();
        for name in expr.property_names() {
            if !properties.iter().any(|p| p == name) {
                properties.push(name.to_string());
            }
        }

        Self {
            source: expr.source().to_string(),
            postfix,
            properties,
        }
    }
}

/// result data for the eval command
#[derive(Serialize)]
pub struct EvalData {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub subject: String,
    pub instances: usize,
    pub result: bool,
}

// ============================================================================
// Output functions
// ============================================================================

/// print JSON-RPC success response to stdout
pub fn print_json<T: Serialize>(data: &T) {
    let response = JsonRpcResponse::new(data);
    if let Ok(json) = serde_json::to_string(&response) {
        println!("{}", json);
    }
}

/// print JSON-RPC error with suggestions
pub fn print_json_error_with_suggestions(code: i32, message: &str, suggestions: Vec<String>) {
    let error = JsonRpcError::with_suggestions(code, message, suggestions);
    if let Ok(json) = serde_json::to_string(&error) {
        println!("{}", json);
    }
}
