use std::net::SocketAddr;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::event::Event;
use crate::lock;

/// Wire values for the user status byte in server status lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UserStatus {
    Playing = 0,
    Idle = 1,
    Connecting = 2,
}

/// Connection types a client may claim: 1 = LAN ... 6 = Bad. Also the
/// number of actions the client packs into one game data message.
pub const CONNECTION_TYPES: std::ops::RangeInclusive<u8> = 1..=6;

/// Point-in-time copy of a user, carried in events and used by renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: u16,
    pub name: String,
    pub emulator: String,
    pub connection_type: u8,
    pub ping: u32,
    pub status: UserStatus,
    pub addr: SocketAddr,
    pub game_id: Option<u32>,
    pub player_number: u8,
}

#[derive(Debug)]
struct UserState {
    name: String,
    emulator: String,
    connection_type: u8,
    ping: u32,
    status: UserStatus,
    logged_in: bool,
    game_id: Option<u32>,
    player_number: u8,
}

#[derive(Debug)]
pub struct User {
    id: u16,
    addr: SocketAddr,
    protocol: String,
    connected_at: Instant,
    state: Mutex<UserState>,
    events: mpsc::UnboundedSender<Event>,
}

impl User {
    pub fn new(
        id: u16,
        addr: SocketAddr,
        protocol: &str,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        let user = Self {
            id,
            addr,
            protocol: protocol.to_string(),
            connected_at: Instant::now(),
            state: Mutex::new(UserState {
                name: String::new(),
                emulator: String::new(),
                connection_type: 0,
                ping: 0,
                status: UserStatus::Connecting,
                logged_in: false,
                game_id: None,
                player_number: 0,
            }),
            events,
        };
        (user, rx)
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    pub fn info(&self) -> UserInfo {
        let state = lock(&self.state);
        UserInfo {
            id: self.id,
            name: state.name.clone(),
            emulator: state.emulator.clone(),
            connection_type: state.connection_type,
            ping: state.ping,
            status: state.status,
            addr: self.addr,
            game_id: state.game_id,
            player_number: state.player_number,
        }
    }

    pub fn name(&self) -> String {
        lock(&self.state).name.clone()
    }

    pub fn set_login_info(&self, name: String, emulator: String, connection_type: u8) {
        let mut state = lock(&self.state);
        state.name = name;
        state.emulator = emulator;
        state.connection_type = connection_type;
    }

    pub fn connection_type(&self) -> u8 {
        lock(&self.state).connection_type
    }

    pub fn set_ping(&self, ping: u32) {
        lock(&self.state).ping = ping;
    }

    pub fn is_logged_in(&self) -> bool {
        lock(&self.state).logged_in
    }

    pub fn set_logged_in(&self) {
        let mut state = lock(&self.state);
        state.logged_in = true;
        state.status = UserStatus::Idle;
    }

    pub fn status(&self) -> UserStatus {
        lock(&self.state).status
    }

    pub fn set_status(&self, status: UserStatus) {
        lock(&self.state).status = status;
    }

    pub fn game_id(&self) -> Option<u32> {
        lock(&self.state).game_id
    }

    pub fn player_number(&self) -> u8 {
        lock(&self.state).player_number
    }

    pub fn set_player_number(&self, player_number: u8) {
        lock(&self.state).player_number = player_number;
    }

    pub(crate) fn join_game(&self, game_id: u32, player_number: u8) {
        let mut state = lock(&self.state);
        state.game_id = Some(game_id);
        state.player_number = player_number;
    }

    pub(crate) fn leave_game(&self) {
        let mut state = lock(&self.state);
        state.game_id = None;
        state.player_number = 0;
        state.status = UserStatus::Idle;
    }

    /// Queues an event for this user's handler. Events for a handler that has
    /// already gone away are discarded.
    pub fn send(&self, event: impl Into<Event>) {
        let _ = self.events.send(event.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::UserEvent;

    #[tokio::test]
    async fn test_user_lifecycle() {
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let (user, mut rx) = User::new(7, addr, "0.83");
        assert_eq!(user.status(), UserStatus::Connecting);
        assert!(!user.is_logged_in());

        user.set_login_info("alice".to_string(), "MAME".to_string(), 1);
        user.set_ping(12);
        user.set_logged_in();
        let info = user.info();
        assert_eq!(info.name, "alice");
        assert_eq!(info.ping, 12);
        assert_eq!(info.status, UserStatus::Idle);

        user.join_game(3, 2);
        assert_eq!(user.game_id(), Some(3));
        assert_eq!(user.player_number(), 2);
        user.leave_game();
        assert_eq!(user.game_id(), None);

        user.send(UserEvent::Connected);
        assert!(matches!(rx.recv().await, Some(Event::User(UserEvent::Connected))));
    }
}
