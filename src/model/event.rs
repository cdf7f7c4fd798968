// Domain events raised by the server and game model, one tagged union per
// scope. Each client handler receives the events addressed to its user and
// renders them into protocol messages.

use bytes::Bytes;
use std::fmt::Debug;
use std::hash::Hash;

use super::game::GameSnapshot;
use super::user::UserInfo;

/// Common surface the action router needs from an event scope.
pub trait RoutedEvent: Debug + Send + Sync + 'static {
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    const SCOPE: &'static str;

    fn kind(&self) -> Self::Kind;

    /// Kind whose renderer handles this one when it has none of its own.
    fn fallback(_kind: Self::Kind) -> Option<Self::Kind> {
        None
    }
}

#[derive(Debug, Clone)]
pub enum ServerEvent {
    Chat { user: UserInfo, message: String },
    UserJoined { user: UserInfo },
    UserQuit { user: UserInfo, message: String },
    GameCreated { game: GameSnapshot },
    GameClosed { game_id: u32 },
    GameStatusChanged { game: GameSnapshot },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerEventKind {
    Chat,
    UserJoined,
    UserQuit,
    GameCreated,
    GameClosed,
    GameStatusChanged,
}

impl RoutedEvent for ServerEvent {
    type Kind = ServerEventKind;

    const SCOPE: &'static str = "server";

    fn kind(&self) -> ServerEventKind {
        match self {
            ServerEvent::Chat { .. } => ServerEventKind::Chat,
            ServerEvent::UserJoined { .. } => ServerEventKind::UserJoined,
            ServerEvent::UserQuit { .. } => ServerEventKind::UserQuit,
            ServerEvent::GameCreated { .. } => ServerEventKind::GameCreated,
            ServerEvent::GameClosed { .. } => ServerEventKind::GameClosed,
            ServerEvent::GameStatusChanged { .. } => ServerEventKind::GameStatusChanged,
        }
    }
}

#[derive(Debug, Clone)]
pub enum GameEvent {
    UserJoinedGame {
        game_id: u32,
        user: UserInfo,
        /// Everyone in the game after the join, in player order.
        players: Vec<UserInfo>,
    },
    UserQuitGame {
        game_id: u32,
        user: UserInfo,
    },
    GameStarted {
        game_id: u32,
        num_players: u8,
    },
    AllReady {
        game_id: u32,
    },
    UserDropped {
        game_id: u32,
        user: UserInfo,
        player_number: u8,
    },
    GameChat {
        game_id: u32,
        user: UserInfo,
        message: String,
    },
    /// Merged input for one user; only ever sent to that user.
    GameData {
        game_id: u32,
        data: Bytes,
    },
    GameInfo {
        game_id: u32,
        message: String,
    },
    GameTimeout {
        game_id: u32,
        user: UserInfo,
        timeout_number: u32,
    },
    PlayerDesynch {
        game_id: u32,
        user: UserInfo,
        message: String,
    },
    GameDesynch {
        game_id: u32,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEventKind {
    UserJoinedGame,
    UserQuitGame,
    GameStarted,
    AllReady,
    UserDropped,
    GameChat,
    GameData,
    GameInfo,
    GameTimeout,
    PlayerDesynch,
    GameDesynch,
}

impl GameEvent {
    pub fn game_id(&self) -> u32 {
        match self {
            GameEvent::UserJoinedGame { game_id, .. }
            | GameEvent::UserQuitGame { game_id, .. }
            | GameEvent::GameStarted { game_id, .. }
            | GameEvent::AllReady { game_id }
            | GameEvent::UserDropped { game_id, .. }
            | GameEvent::GameChat { game_id, .. }
            | GameEvent::GameData { game_id, .. }
            | GameEvent::GameInfo { game_id, .. }
            | GameEvent::GameTimeout { game_id, .. }
            | GameEvent::PlayerDesynch { game_id, .. }
            | GameEvent::GameDesynch { game_id, .. } => *game_id,
        }
    }

    /// Text shown to players by the generic game info renderer.
    pub fn info_message(&self) -> Option<String> {
        match self {
            GameEvent::GameInfo { message, .. }
            | GameEvent::PlayerDesynch { message, .. }
            | GameEvent::GameDesynch { message, .. } => Some(message.clone()),
            GameEvent::GameTimeout {
                user,
                timeout_number,
                ..
            } => Some(format!(
                "{} is lagging (timeout #{})",
                user.name, timeout_number
            )),
            _ => None,
        }
    }
}

impl RoutedEvent for GameEvent {
    type Kind = GameEventKind;

    const SCOPE: &'static str = "game";

    fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::UserJoinedGame { .. } => GameEventKind::UserJoinedGame,
            GameEvent::UserQuitGame { .. } => GameEventKind::UserQuitGame,
            GameEvent::GameStarted { .. } => GameEventKind::GameStarted,
            GameEvent::AllReady { .. } => GameEventKind::AllReady,
            GameEvent::UserDropped { .. } => GameEventKind::UserDropped,
            GameEvent::GameChat { .. } => GameEventKind::GameChat,
            GameEvent::GameData { .. } => GameEventKind::GameData,
            GameEvent::GameInfo { .. } => GameEventKind::GameInfo,
            GameEvent::GameTimeout { .. } => GameEventKind::GameTimeout,
            GameEvent::PlayerDesynch { .. } => GameEventKind::PlayerDesynch,
            GameEvent::GameDesynch { .. } => GameEventKind::GameDesynch,
        }
    }

    fn fallback(kind: GameEventKind) -> Option<GameEventKind> {
        match kind {
            GameEventKind::GameTimeout
            | GameEventKind::PlayerDesynch
            | GameEventKind::GameDesynch => Some(GameEventKind::GameInfo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum UserEvent {
    /// Login completed.
    Connected,
    InfoMessage { source: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserEventKind {
    Connected,
    InfoMessage,
}

impl RoutedEvent for UserEvent {
    type Kind = UserEventKind;

    const SCOPE: &'static str = "user";

    fn kind(&self) -> UserEventKind {
        match self {
            UserEvent::Connected => UserEventKind::Connected,
            UserEvent::InfoMessage { .. } => UserEventKind::InfoMessage,
        }
    }
}

/// Everything that can be queued to a user's handler.
#[derive(Debug, Clone)]
pub enum Event {
    Server(ServerEvent),
    Game(GameEvent),
    User(UserEvent),
}

impl From<ServerEvent> for Event {
    fn from(event: ServerEvent) -> Self {
        Event::Server(event)
    }
}

impl From<GameEvent> for Event {
    fn from(event: GameEvent) -> Self {
        Event::Game(event)
    }
}

impl From<UserEvent> for Event {
    fn from(event: UserEvent) -> Self {
        Event::User(event)
    }
}
