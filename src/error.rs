// Error taxonomy shared across the protocol engine

use thiserror::Error;

/// Bundle-level framing failures. The datagram is dropped and no session
/// state is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid buffer length: {0}")]
    InvalidBufferLength(usize),
    #[error("invalid message count: {0}")]
    InvalidMessageCount(u8),
    #[error("invalid bundle length: message {index} declares {declared} bytes, {remaining} remaining")]
    InvalidBundleLength {
        index: usize,
        declared: usize,
        remaining: usize,
    },
    #[error("unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),
}

/// A message body (or connect-phase text) did not match its layout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("body truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    #[error("invalid field {field}: {value}")]
    InvalidField { field: &'static str, value: i64 },
    #[error("unrecognized connect message: {0}")]
    UnknownConnectMessage(String),
}

/// Violations of the server/game rules, reported back to the acting client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("server is full")]
    ServerFull,
    #[error("user {0} is not logged in")]
    NotLoggedIn(u16),
    #[error("user {0} is already logged in")]
    AlreadyLoggedIn(u16),
    #[error("login denied: {0}")]
    LoginDenied(String),
    #[error("user {0} not found")]
    UserNotFound(u16),
    #[error("game {0} not found")]
    GameNotFound(u32),
    #[error("user {0} is not in a game")]
    NotInGame(u16),
    #[error("user {0} is already in a game")]
    AlreadyInGame(u16),
    #[error("game {0} is full")]
    GameFull(u32),
    #[error("only the owner of game {0} may do that")]
    NotOwner(u32),
    #[error("game {game_id} is {status}")]
    WrongStatus { game_id: u32, status: &'static str },
    #[error("invalid player number {0}")]
    InvalidPlayerNumber(u8),
    #[error("game data rejected: {0}")]
    GameData(String),
    #[error("game {0} is desynched")]
    Desynched(u32),
    #[error("{0}")]
    Denied(String),
}

/// Returned by command actions. `Fatal` closes the session, everything else
/// is logged and the next message is processed.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("fatal: {0}")]
    Fatal(String),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("send failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ActionError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ActionError::Fatal(_))
    }
}

/// Reasons a new V086 session could not be created. `ServerFull` maps to
/// the `TOO` connect response.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("server is full")]
    ServerFull,
    #[error("unsupported protocol {0}")]
    UnsupportedProtocol(String),
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Action router construction failures. These abort startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("message ID 0x{id:02X} out of range for {action}")]
    InvalidMessageId { id: u8, action: &'static str },
    #[error("duplicate action mapping for message ID 0x{id:02X}: {existing} and {duplicate}")]
    DuplicateAction {
        id: u8,
        existing: &'static str,
        duplicate: &'static str,
    },
    #[error("duplicate {scope} event renderer for {kind}")]
    DuplicateRenderer { scope: &'static str, kind: String },
    #[error("missing handlers for message IDs: {0}")]
    MissingActions(String),
}
