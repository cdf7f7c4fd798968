use serde::Deserialize;
use std::fs;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "kaillera.toml";

// Configuration structures
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub connect: ConnectConfig,
    #[serde(default)]
    pub v086: V086Config,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Well-known port that answers HELLO/PING.
#[derive(Debug, Deserialize, Clone)]
pub struct ConnectConfig {
    #[serde(default = "default_connect_port")]
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_connect_buffer_size")]
    pub buffer_size: usize,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            port: default_connect_port(),
            bind_address: default_bind_address(),
            buffer_size: default_connect_buffer_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct V086Config {
    #[serde(default = "default_port_range_start")]
    pub port_range_start: u16,
    /// Ports in the pool beyond one per allowed user.
    #[serde(default = "default_extra_ports")]
    pub extra_ports: usize,
    #[serde(default = "default_v086_buffer_size")]
    pub buffer_size: usize,
    /// Protocol strings accepted in HELLO.
    #[serde(default = "default_client_types")]
    pub client_types: Vec<String>,
}

impl Default for V086Config {
    fn default() -> Self {
        Self {
            port_range_start: default_port_range_start(),
            extra_ports: default_extra_ports(),
            buffer_size: default_v086_buffer_size(),
            client_types: default_client_types(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_name")]
    pub server_name: String,
    #[serde(default = "default_max_users")]
    pub max_users: usize,
    /// Milliseconds. Logins above it are refused; also the resend rate limit.
    #[serde(default = "default_max_ping")]
    pub max_ping: u32,
    /// 0 means unlimited.
    #[serde(default)]
    pub max_games: usize,
    #[serde(default = "default_welcome_messages")]
    pub welcome_messages: Vec<String>,
    #[serde(default = "default_keepalive_timeout_secs")]
    pub keepalive_timeout_secs: u64,
    /// Characters. 0 means unlimited.
    #[serde(default = "default_max_user_name_length")]
    pub max_user_name_length: usize,
    /// Characters of the emulator name. 0 means unlimited.
    #[serde(default = "default_max_client_name_length")]
    pub max_client_name_length: usize,
    /// Lets one address log in under several names at once.
    #[serde(default = "default_allow_multiple_connections")]
    pub allow_multiple_connections: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            max_users: default_max_users(),
            max_ping: default_max_ping(),
            max_games: 0,
            welcome_messages: default_welcome_messages(),
            keepalive_timeout_secs: default_keepalive_timeout_secs(),
            max_user_name_length: default_max_user_name_length(),
            max_client_name_length: default_max_client_name_length(),
            allow_multiple_connections: default_allow_multiple_connections(),
        }
    }
}

impl ServerConfig {
    pub fn keepalive_timeout(&self) -> Duration {
        Duration::from_secs(self.keepalive_timeout_secs)
    }

    pub fn max_ping_duration(&self) -> Duration {
        Duration::from_millis(self.max_ping as u64)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GameConfig {
    /// Per-player action ring size, multiplied by the player count.
    #[serde(default = "default_game_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "default_timeout_millis")]
    pub timeout_millis: u64,
    /// Consecutive timeouts after which a lagging player is desynched.
    #[serde(default = "default_desynch_timeouts")]
    pub desynch_timeouts: u32,
    #[serde(default = "default_max_players")]
    pub max_players: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_game_buffer_size(),
            timeout_millis: default_timeout_millis(),
            desynch_timeouts: default_desynch_timeouts(),
            max_players: default_max_players(),
        }
    }
}

impl GameConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TracingConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            level: default_level(),
        }
    }
}

fn default_connect_port() -> u16 {
    27888
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_connect_buffer_size() -> usize {
    1024
}

fn default_port_range_start() -> u16 {
    27889
}

fn default_extra_ports() -> usize {
    10
}

fn default_v086_buffer_size() -> usize {
    2048
}

fn default_client_types() -> Vec<String> {
    vec!["0.83".to_string()]
}

fn default_server_name() -> String {
    "Kaillera Relay".to_string()
}

fn default_max_users() -> usize {
    25
}

fn default_max_ping() -> u32 {
    250
}

fn default_welcome_messages() -> Vec<String> {
    vec!["Welcome to the server!".to_string()]
}

fn default_keepalive_timeout_secs() -> u64 {
    190
}

fn default_max_user_name_length() -> usize {
    45
}

fn default_max_client_name_length() -> usize {
    100
}

fn default_allow_multiple_connections() -> bool {
    true
}

fn default_game_buffer_size() -> usize {
    1024
}

fn default_timeout_millis() -> u64 {
    1250
}

fn default_desynch_timeouts() -> u32 {
    4
}

fn default_max_players() -> u8 {
    4
}

fn default_format() -> String {
    "compact".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Number of ports the V086 pool is seeded with.
    pub fn port_pool_size(&self) -> usize {
        self.server.max_users + self.v086.extra_ports
    }
}

// Load configuration from `path`, falling back to defaults
pub fn load_config(path: &str) -> Config {
    match fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                eprintln!("Configuration loaded from {}", path);
                config
            }
            Err(e) => {
                eprintln!("Failed to parse {}: {}", path, e);
                eprintln!("Using default configuration");
                Config::default()
            }
        },
        Err(_) => {
            eprintln!("{} not found, using default configuration", path);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.connect.port, 27888);
        assert_eq!(config.v086.port_range_start, 27889);
        assert_eq!(config.v086.client_types, vec!["0.83".to_string()]);
        assert_eq!(config.server.max_ping, 250);
        assert_eq!(config.game.timeout_millis, 1250);
        assert_eq!(config.game.desynch_timeouts, 4);
        assert_eq!(config.port_pool_size(), 35);
        assert_eq!(config.server.max_user_name_length, 45);
        assert_eq!(config.server.max_client_name_length, 100);
        assert!(config.server.allow_multiple_connections);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            max_users = 4
            allow_multiple_connections = false
            welcome_messages = ["hi"]

            [game]
            timeout_millis = 500

            [tracing]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.max_users, 4);
        assert_eq!(config.server.max_ping, 250);
        assert!(!config.server.allow_multiple_connections);
        assert_eq!(config.server.max_user_name_length, 45);
        assert_eq!(config.server.welcome_messages, vec!["hi".to_string()]);
        assert_eq!(config.game.timeout(), Duration::from_millis(500));
        assert_eq!(config.game.buffer_size, 1024);
        assert_eq!(config.tracing.format, "json");
        assert_eq!(config.tracing.level, "info");
        assert_eq!(config.connect.port, 27888);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config("/nonexistent/kaillera.toml");
        assert_eq!(config.server.max_users, 25);
    }
}
