// Structured logging field definitions
// This module centralizes all field names used in tracing logs

// Connection & Network fields
pub const ADDR: &str = "addr";
pub const PORT: &str = "port";
pub const PACKET_SIZE: &str = "packet_size";
pub const PROTOCOL: &str = "protocol";

// User fields
pub const USER_NAME: &str = "user_name";
pub const USER_ID: &str = "user_id";
pub const CONNECTION_TYPE: &str = "connection_type";
pub const PING: &str = "ping";

// Game fields
pub const GAME_ID: &str = "game_id";
pub const GAME_NAME: &str = "game_name";
pub const PLAYER_COUNT: &str = "player_count";

// Message fields
pub const MESSAGE_TYPE: &str = "message_type";
pub const MESSAGE_NUMBER: &str = "message_number";
pub const CHAT_MESSAGE: &str = "chat_message";

// Operation fields
pub const ERROR: &str = "error";
pub const REASON: &str = "reason";

// Performance fields
pub const QUEUE_SIZE: &str = "queue_size";
pub const RETRY_COUNT: &str = "retry_count";

// Server fields
pub const CONFIG_SOURCE: &str = "config_source";

// Game sync fields
pub const PLAYER_NUMBER: &str = "player_number";
pub const CACHE_POSITION: &str = "cache_position";
pub const DATA_LENGTH: &str = "data_length";
pub const TIMEOUT_NUMBER: &str = "timeout_number";

// Kick/Drop fields
pub const KICKED_USER_ID: &str = "kicked_user_id";
