use bytes::Bytes;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use super::event::{Event, ServerEvent, UserEvent};
use super::game::{Game, GameSnapshot};
use super::user::{User, CONNECTION_TYPES};
use crate::config::{Config, GameConfig, ServerConfig};
use crate::error::ModelError;
use crate::fields;

/// Users and games of one relay. Every rule violation comes back as a
/// `ModelError`; every visible change goes out as events to the affected
/// users' handlers.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    game_config: GameConfig,
    users: RwLock<HashMap<u16, Arc<User>>>,
    games: RwLock<HashMap<u32, Arc<Game>>>,
    next_user_id: AtomicU16,
    next_game_id: AtomicU32,
}

impl Server {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.server.clone(),
            game_config: config.game.clone(),
            users: RwLock::new(HashMap::new()),
            games: RwLock::new(HashMap::new()),
            next_user_id: AtomicU16::new(1),
            next_game_id: AtomicU32::new(1),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub async fn user(&self, user_id: u16) -> Option<Arc<User>> {
        self.users.read().await.get(&user_id).cloned()
    }

    pub async fn users(&self) -> Vec<Arc<User>> {
        self.users.read().await.values().cloned().collect()
    }

    pub async fn num_users(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn game(&self, game_id: u32) -> Option<Arc<Game>> {
        self.games.read().await.get(&game_id).cloned()
    }

    pub async fn games(&self) -> Vec<Arc<Game>> {
        self.games.read().await.values().cloned().collect()
    }

    // Lock-free ID generation; 0 is never handed out
    fn next_user_id(&self) -> u16 {
        loop {
            let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
            if id != 0 {
                return id;
            }
        }
    }

    fn next_game_id(&self) -> u32 {
        loop {
            let id = self.next_game_id.fetch_add(1, Ordering::SeqCst);
            if id != 0 {
                return id;
            }
        }
    }

    /// Registers a user for a new session. The receiver carries every event
    /// addressed to that user.
    pub async fn new_connection(
        &self,
        addr: SocketAddr,
        protocol: &str,
    ) -> Result<(Arc<User>, mpsc::UnboundedReceiver<Event>), ModelError> {
        let mut users = self.users.write().await;
        if users.len() >= self.config.max_users {
            return Err(ModelError::ServerFull);
        }
        let mut id = self.next_user_id();
        while users.contains_key(&id) {
            id = self.next_user_id();
        }
        let (user, events) = User::new(id, addr, protocol);
        let user = Arc::new(user);
        users.insert(id, user.clone());
        info!(
            { fields::USER_ID } = id,
            { fields::ADDR } = %addr,
            "User connected"
        );
        Ok((user, events))
    }

    async fn logged_in_user(&self, user_id: u16) -> Result<Arc<User>, ModelError> {
        let user = self
            .user(user_id)
            .await
            .ok_or(ModelError::UserNotFound(user_id))?;
        if !user.is_logged_in() {
            return Err(ModelError::NotLoggedIn(user_id));
        }
        Ok(user)
    }

    async fn game_of(&self, user: &User) -> Result<Arc<Game>, ModelError> {
        let game_id = user.game_id().ok_or(ModelError::NotInGame(user.id()))?;
        self.game(game_id)
            .await
            .ok_or(ModelError::GameNotFound(game_id))
    }

    async fn broadcast(&self, event: ServerEvent) {
        for user in self.users.read().await.values() {
            if user.is_logged_in() {
                user.send(event.clone());
            }
        }
    }

    async fn broadcast_status(&self, game: &Game) {
        self.broadcast(ServerEvent::GameStatusChanged {
            game: game.snapshot(),
        })
        .await;
    }

    /// Completes a login once name, emulator, connection type and ping are
    /// known. A logged-in user with the same name from the same address is
    /// treated as a stale session of this client and replaced.
    pub async fn login(&self, user_id: u16) -> Result<(), ModelError> {
        let user = self
            .user(user_id)
            .await
            .ok_or(ModelError::UserNotFound(user_id))?;
        if user.is_logged_in() {
            return Err(ModelError::AlreadyLoggedIn(user_id));
        }

        let info = user.info();
        if info.name.trim().is_empty() {
            return Err(ModelError::LoginDenied("Empty name".to_string()));
        }
        if self.config.max_user_name_length > 0
            && info.name.chars().count() > self.config.max_user_name_length
        {
            return Err(ModelError::LoginDenied(format!(
                "Name longer than {} characters",
                self.config.max_user_name_length
            )));
        }
        if info.name.chars().any(is_illegal_name_char) {
            return Err(ModelError::LoginDenied(
                "Illegal characters in name".to_string(),
            ));
        }
        if self.config.max_client_name_length > 0
            && info.emulator.chars().count() > self.config.max_client_name_length
        {
            return Err(ModelError::LoginDenied(format!(
                "Emulator name longer than {} characters",
                self.config.max_client_name_length
            )));
        }
        if !CONNECTION_TYPES.contains(&info.connection_type) {
            return Err(ModelError::LoginDenied(format!(
                "Invalid connection type {}",
                info.connection_type
            )));
        }
        if self.config.max_ping > 0 && info.ping > self.config.max_ping {
            return Err(ModelError::LoginDenied(format!(
                "Ping {} ms exceeds the {} ms limit",
                info.ping, self.config.max_ping
            )));
        }

        let mut stale = Vec::new();
        for other in self.users().await {
            if other.id() == user_id || !other.is_logged_in() || other.addr().ip() != info.addr.ip()
            {
                continue;
            }
            let other_name = other.name();
            if other_name == info.name {
                stale.push(other.id());
            } else if !self.config.allow_multiple_connections {
                return Err(ModelError::LoginDenied(format!(
                    "Address already logged in as {}",
                    other_name
                )));
            }
        }
        for old_id in stale {
            info!(
                { fields::USER_ID } = user_id,
                replaced_user_id = old_id,
                "Reconnect replaces stale session"
            );
            if let Err(e) = self.quit(old_id, "Reconnected").await {
                debug!({ fields::ERROR } = %e, "Stale session already gone");
            }
        }

        user.set_logged_in();
        info!(
            { fields::USER_ID } = user_id,
            { fields::USER_NAME } = %info.name,
            { fields::PING } = info.ping,
            { fields::CONNECTION_TYPE } = info.connection_type,
            "User logged in"
        );

        user.send(UserEvent::Connected);
        self.broadcast(ServerEvent::UserJoined { user: user.info() })
            .await;
        for message in &self.config.welcome_messages {
            user.send(UserEvent::InfoMessage {
                source: "server".to_string(),
                message: message.clone(),
            });
        }
        Ok(())
    }

    /// Removes the user, leaving any game first. Quitting an unknown user is
    /// `UserNotFound`, which teardown paths ignore.
    pub async fn quit(&self, user_id: u16, message: &str) -> Result<(), ModelError> {
        let user = self
            .users
            .write()
            .await
            .remove(&user_id)
            .ok_or(ModelError::UserNotFound(user_id))?;

        if user.game_id().is_some() {
            if let Err(e) = self.leave_game(&user).await {
                debug!({ fields::ERROR } = %e, "Leave game on quit failed");
            }
        }

        info!(
            { fields::USER_ID } = user_id,
            { fields::REASON } = message,
            "User quit"
        );
        let event = ServerEvent::UserQuit {
            user: user.info(),
            message: message.to_string(),
        };
        // the quitting user's own handler stops when it sees this
        user.send(event.clone());
        if user.is_logged_in() {
            self.broadcast(event).await;
        }
        Ok(())
    }

    pub async fn chat(&self, user_id: u16, message: String) -> Result<(), ModelError> {
        let user = self.logged_in_user(user_id).await?;
        if message.trim().is_empty() {
            return Err(ModelError::Denied("Empty message".to_string()));
        }
        info!(
            { fields::USER_ID } = user_id,
            { fields::CHAT_MESSAGE } = %message,
            "Chat"
        );
        self.broadcast(ServerEvent::Chat {
            user: user.info(),
            message,
        })
        .await;
        Ok(())
    }

    pub async fn create_game(&self, user_id: u16, name: String) -> Result<Arc<Game>, ModelError> {
        let user = self.logged_in_user(user_id).await?;
        if user.game_id().is_some() {
            return Err(ModelError::AlreadyInGame(user_id));
        }

        let game = {
            let mut games = self.games.write().await;
            if self.config.max_games > 0 && games.len() >= self.config.max_games {
                return Err(ModelError::Denied("Too many games".to_string()));
            }
            let game = Arc::new(Game::new(
                self.next_game_id(),
                name,
                user.clone(),
                self.game_config.clone(),
            ));
            games.insert(game.id(), game.clone());
            game
        };
        info!(
            { fields::GAME_ID } = game.id(),
            { fields::GAME_NAME } = game.name(),
            { fields::USER_ID } = user_id,
            "Game created"
        );

        self.broadcast(ServerEvent::GameCreated {
            game: game.snapshot(),
        })
        .await;
        game.join(&user)?;
        self.broadcast_status(&game).await;
        Ok(game)
    }

    pub async fn join_game(&self, user_id: u16, game_id: u32) -> Result<Arc<Game>, ModelError> {
        let user = self.logged_in_user(user_id).await?;
        if user.game_id().is_some() {
            return Err(ModelError::AlreadyInGame(user_id));
        }
        let game = self
            .game(game_id)
            .await
            .ok_or(ModelError::GameNotFound(game_id))?;
        game.join(&user)?;
        self.broadcast_status(&game).await;
        Ok(game)
    }

    pub async fn quit_game(&self, user_id: u16) -> Result<(), ModelError> {
        let user = self.logged_in_user(user_id).await?;
        self.leave_game(&user).await
    }

    /// The owner leaving closes the game for everyone.
    async fn leave_game(&self, user: &Arc<User>) -> Result<(), ModelError> {
        let game = self.game_of(user).await?;
        game.quit(user)?;
        if user.id() == game.owner_id() {
            self.close_game(&game, user).await
        } else {
            self.broadcast_status(&game).await;
            Ok(())
        }
    }

    async fn close_game(&self, game: &Arc<Game>, user: &User) -> Result<(), ModelError> {
        game.close(user)?;
        self.games.write().await.remove(&game.id());
        self.broadcast(ServerEvent::GameClosed { game_id: game.id() })
            .await;
        Ok(())
    }

    pub async fn start_game(&self, user_id: u16) -> Result<(), ModelError> {
        let user = self.logged_in_user(user_id).await?;
        let game = self.game_of(&user).await?;
        game.start(&user)?;
        self.broadcast_status(&game).await;
        Ok(())
    }

    pub async fn ready(&self, user_id: u16) -> Result<(), ModelError> {
        let user = self.logged_in_user(user_id).await?;
        let game = self.game_of(&user).await?;
        if game.ready(&user)? {
            self.broadcast_status(&game).await;
        }
        Ok(())
    }

    pub async fn drop_game(&self, user_id: u16) -> Result<(), ModelError> {
        let user = self.logged_in_user(user_id).await?;
        let game = self.game_of(&user).await?;
        if game.drop_player(&user)? {
            self.broadcast_status(&game).await;
        }
        Ok(())
    }

    pub async fn kick(&self, user_id: u16, target_id: u16) -> Result<(), ModelError> {
        let user = self.logged_in_user(user_id).await?;
        let game = self.game_of(&user).await?;
        let target = game.kick(&user, target_id)?;
        target.send(UserEvent::InfoMessage {
            source: "server".to_string(),
            message: format!("You were kicked from {}", game.name()),
        });
        self.leave_game(&target).await
    }

    pub async fn game_chat(&self, user_id: u16, message: String) -> Result<(), ModelError> {
        let user = self.logged_in_user(user_id).await?;
        let game = self.game_of(&user).await?;
        game.chat(&user, message)
    }

    /// Sequence gap on `user_id`'s session.
    pub async fn dropped_packet(&self, user_id: u16) {
        let Some(user) = self.user(user_id).await else {
            return;
        };
        if let Ok(game) = self.game_of(&user).await {
            warn!(
                { fields::USER_ID } = user_id,
                { fields::GAME_ID } = game.id(),
                "Dropped packet during game"
            );
            game.dropped_packet(&user);
        }
    }

    pub async fn add_game_data(&self, user_id: u16, data: Bytes) -> Result<(), ModelError> {
        let user = self.logged_in_user(user_id).await?;
        let game = self.game_of(&user).await?;
        game.add_data(&user, data).await
    }

    pub async fn game_snapshots(&self) -> Vec<GameSnapshot> {
        self.games().await.iter().map(|g| g.snapshot()).collect()
    }
}

/// Control, bidi override and zero-width characters.
fn is_illegal_name_char(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' | '\u{200B}'..='\u{200D}' | '\u{FEFF}'
        )
}
