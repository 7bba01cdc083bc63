//! Error types for the tokenwire access-token client

use thiserror::Error;

/// Main error type for tokenwire
#[derive(Error, Debug)]
pub enum TokenWireError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Textual SAS/GAS parsing and field encoding errors
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Protocol errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Network errors
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

/// Client configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Per-attempt timeout must be greater than zero")]
    ZeroTimeout,

    #[error("At least one attempt is required, got {attempts}")]
    InvalidAttempts { attempts: u32 },
}

/// Errors raised while turning caller input into wire fields
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid SAS '{sas}': {reason}")]
    InvalidSas { sas: String, reason: String },

    #[error("Invalid GAS: {reason}")]
    InvalidGas { reason: String },

    #[error("Cannot encode {field}: {reason}")]
    Encoding { field: &'static str, reason: String },

    #[error("Expected {expected} SAS entries, got {got}")]
    CountMismatch { expected: usize, got: usize },
}

/// Protocol-level errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// The server answered with the 4-byte error frame
    #[error("Server returned error code {code} (type {msg_type})")]
    ServerError { msg_type: i16, code: i16 },

    #[error("Malformed message: expected {expected} bytes, got {got}")]
    MalformedMessage { expected: usize, got: usize },

    #[error("Malformed {field} field: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("Unexpected response type: expected {expected}, got {got}")]
    UnexpectedResponseType { expected: i16, got: i16 },
}

/// Network-level errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Unreachable host {host}:{port}")]
    UnreachableHost { host: String, port: u16 },

    #[error("Too many attempts ({attempts}) without a reply, connection closed")]
    TooManyAttempts { attempts: u32 },

    #[error("Session already closed")]
    SessionClosed,

    #[error("Socket bind failed on {addr}: {reason}")]
    BindFailed { addr: String, reason: String },

    #[error("Send failed: {reason}")]
    SendFailed { reason: String },

    #[error("Receive failed: {reason}")]
    ReceiveFailed { reason: String },
}

impl TokenWireError {
    /// Get a user-friendly error message with suggested action
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(NetworkError::UnreachableHost { host, port }) => {
                format!(
                    "Could not resolve {}:{}.\n  \
                    Check the host name and port.",
                    host, port
                )
            }

            Self::Network(NetworkError::TooManyAttempts { attempts }) => {
                format!(
                    "No reply after {} attempts.\n  \
                    Check that the token server is running and UDP traffic is allowed.",
                    attempts
                )
            }

            Self::Format(FormatError::InvalidSas { sas, .. }) => {
                format!(
                    "Invalid SAS '{}'.\n  \
                    Expected <student_id>:<nonce>:<token>.",
                    sas
                )
            }

            Self::Format(FormatError::InvalidGas { reason }) => {
                format!(
                    "Invalid GAS ({}).\n  \
                    Expected <sas>+<sas>+...+<group_token>.",
                    reason
                )
            }

            _ => format!("{}", self),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Format(_) => 2,
            Self::Network(_) => 3,
            Self::Protocol(_) => 4,
        }
    }
}

/// Result type alias for tokenwire operations
pub type Result<T> = std::result::Result<T, TokenWireError>;
