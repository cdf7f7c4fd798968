use bytes::Bytes;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::event::GameEvent;
use super::user::{User, UserInfo, UserStatus};
use crate::config::GameConfig;
use crate::error::ModelError;
use crate::player_action_queue::{PlayerActionQueue, PlayerTimeout};
use crate::{fields, lock};

/// Wire values for the game status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GameStatus {
    Waiting = 0,
    Playing = 1,
    Synchronizing = 2,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Playing => "playing",
            GameStatus::Synchronizing => "synchronizing",
        }
    }
}

/// Point-in-time copy of a game for server-wide notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub id: u32,
    pub name: String,
    pub emulator: String,
    pub owner_id: u16,
    pub owner_name: String,
    pub status: GameStatus,
    pub num_players: u8,
    pub max_players: u8,
}

#[derive(Debug)]
struct GameState {
    status: GameStatus,
    players: Vec<Arc<User>>,
    /// One per player at start time, indexed by player number - 1.
    queues: Vec<Arc<PlayerActionQueue>>,
    /// Users the queues belong to, in the same order.
    queue_users: Vec<Arc<User>>,
    actions_per_message: usize,
    synched: bool,
    kicked: HashSet<u16>,
}

impl GameState {
    fn emit(&self, event: GameEvent) {
        for player in &self.players {
            player.send(event.clone());
        }
    }

    fn synched_count(&self) -> usize {
        self.queues.iter().filter(|q| q.is_synched()).count()
    }

    fn desynch_all(&mut self) {
        self.synched = false;
        for queue in &self.queues {
            queue.set_synched(false);
        }
    }

    fn queue_for(&self, user: &User) -> Result<(u8, Arc<PlayerActionQueue>), ModelError> {
        let player_number = user.player_number();
        if player_number == 0 || player_number as usize > self.queues.len() {
            return Err(ModelError::InvalidPlayerNumber(player_number));
        }
        Ok((
            player_number,
            self.queues[player_number as usize - 1].clone(),
        ))
    }
}

#[derive(Debug)]
pub struct Game {
    id: u32,
    name: String,
    emulator: String,
    owner: Arc<User>,
    config: GameConfig,
    state: Mutex<GameState>,
}

impl Game {
    pub fn new(id: u32, name: String, owner: Arc<User>, config: GameConfig) -> Self {
        let emulator = owner.info().emulator;
        Self {
            id,
            name,
            emulator,
            owner,
            config,
            state: Mutex::new(GameState {
                status: GameStatus::Waiting,
                players: Vec::new(),
                queues: Vec::new(),
                queue_users: Vec::new(),
                actions_per_message: 0,
                synched: false,
                kicked: HashSet::new(),
            }),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner_id(&self) -> u16 {
        self.owner.id()
    }

    pub fn status(&self) -> GameStatus {
        lock(&self.state).status
    }

    pub fn is_synched(&self) -> bool {
        lock(&self.state).synched
    }

    pub fn num_players(&self) -> usize {
        lock(&self.state).players.len()
    }

    pub fn players(&self) -> Vec<UserInfo> {
        lock(&self.state).players.iter().map(|p| p.info()).collect()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let state = lock(&self.state);
        GameSnapshot {
            id: self.id,
            name: self.name.clone(),
            emulator: self.emulator.clone(),
            owner_id: self.owner.id(),
            owner_name: self.owner.name(),
            status: state.status,
            num_players: state.players.len() as u8,
            max_players: self.config.max_players,
        }
    }

    /// Adds `user` and returns its player number.
    pub fn join(&self, user: &Arc<User>) -> Result<u8, ModelError> {
        let mut state = lock(&self.state);
        if state.players.iter().any(|p| p.id() == user.id()) {
            return Err(ModelError::AlreadyInGame(user.id()));
        }
        if state.kicked.contains(&user.id()) {
            return Err(ModelError::Denied(format!(
                "You were kicked from {}",
                self.name
            )));
        }
        if state.status != GameStatus::Waiting {
            return Err(ModelError::WrongStatus {
                game_id: self.id,
                status: state.status.as_str(),
            });
        }
        if state.players.len() >= self.config.max_players as usize {
            return Err(ModelError::GameFull(self.id));
        }

        state.players.push(user.clone());
        let player_number = state.players.len() as u8;
        user.join_game(self.id, player_number);
        info!(
            { fields::GAME_ID } = self.id,
            { fields::USER_ID } = user.id(),
            { fields::PLAYER_NUMBER } = player_number,
            "User joined game"
        );

        let players = state.players.iter().map(|p| p.info()).collect();
        state.emit(GameEvent::UserJoinedGame {
            game_id: self.id,
            user: user.info(),
            players,
        });
        Ok(player_number)
    }

    pub fn start(&self, user: &User) -> Result<(), ModelError> {
        let mut state = lock(&self.state);
        if user.id() != self.owner.id() {
            return Err(ModelError::NotOwner(self.id));
        }
        if state.status != GameStatus::Waiting {
            return Err(ModelError::WrongStatus {
                game_id: self.id,
                status: state.status.as_str(),
            });
        }
        if state.players.is_empty() {
            return Err(ModelError::Denied("No players in game".to_string()));
        }

        let connection_type = self.owner.connection_type();
        if state
            .players
            .iter()
            .any(|p| p.connection_type() != connection_type)
        {
            state.emit(GameEvent::GameInfo {
                game_id: self.id,
                message: format!(
                    "All players must use connection type {} to start",
                    connection_type
                ),
            });
            return Err(ModelError::Denied(
                "Connection types do not match".to_string(),
            ));
        }

        let num_players = state.players.len();
        let queues: Vec<Arc<PlayerActionQueue>> = state
            .players
            .iter()
            .enumerate()
            .map(|(i, player)| {
                let player_number = (i + 1) as u8;
                player.set_player_number(player_number);
                player.set_status(UserStatus::Playing);
                Arc::new(PlayerActionQueue::new(
                    player_number,
                    player.id(),
                    num_players,
                    self.config.buffer_size,
                    self.config.timeout(),
                ))
            })
            .collect();

        state.queue_users = state.players.clone();
        state.queues = queues;
        state.actions_per_message = connection_type as usize;
        state.synched = false;
        state.status = GameStatus::Synchronizing;
        info!(
            { fields::GAME_ID } = self.id,
            { fields::PLAYER_COUNT } = num_players,
            "Game started"
        );

        state.emit(GameEvent::GameStarted {
            game_id: self.id,
            num_players: num_players as u8,
        });
        Ok(())
    }

    /// Marks `user` ready. Returns true once every player is ready and the
    /// game has moved to Playing.
    pub fn ready(&self, user: &User) -> Result<bool, ModelError> {
        let mut state = lock(&self.state);
        if !state.players.iter().any(|p| p.id() == user.id()) {
            return Err(ModelError::NotInGame(user.id()));
        }
        if state.status != GameStatus::Synchronizing {
            return Err(ModelError::WrongStatus {
                game_id: self.id,
                status: state.status.as_str(),
            });
        }
        let (player_number, queue) = state.queue_for(user)?;
        queue.set_synched(true);
        debug!(
            { fields::GAME_ID } = self.id,
            { fields::PLAYER_NUMBER } = player_number,
            "Player ready"
        );

        if state.synched_count() == state.queues.len() {
            state.status = GameStatus::Playing;
            state.synched = true;
            info!({ fields::GAME_ID } = self.id, "All players ready");
            state.emit(GameEvent::AllReady { game_id: self.id });
            return Ok(true);
        }
        Ok(false)
    }

    /// Stops `user` playing without leaving the game. Returns true if the
    /// game fell back to Waiting.
    pub fn drop_player(&self, user: &User) -> Result<bool, ModelError> {
        let mut state = lock(&self.state);
        if !state.players.iter().any(|p| p.id() == user.id()) {
            return Err(ModelError::NotInGame(user.id()));
        }
        if state.queues.is_empty() {
            return Err(ModelError::WrongStatus {
                game_id: self.id,
                status: state.status.as_str(),
            });
        }
        let (player_number, queue) = state.queue_for(user)?;
        queue.set_synched(false);
        user.set_status(UserStatus::Idle);
        info!(
            { fields::GAME_ID } = self.id,
            { fields::PLAYER_NUMBER } = player_number,
            "Player dropped"
        );

        if state.synched && state.synched_count() < 2 {
            state.desynch_all();
            info!(
                { fields::GAME_ID } = self.id,
                "Game desynched: less than 2 players playing"
            );
        }

        let mut back_to_waiting = false;
        if !state
            .players
            .iter()
            .any(|p| p.status() == UserStatus::Playing)
        {
            state.status = GameStatus::Waiting;
            state.queues.clear();
            state.queue_users.clear();
            back_to_waiting = true;
        }

        state.emit(GameEvent::UserDropped {
            game_id: self.id,
            user: user.info(),
            player_number,
        });
        Ok(back_to_waiting)
    }

    /// Removes `user`. A player still playing is dropped first.
    pub fn quit(&self, user: &Arc<User>) -> Result<(), ModelError> {
        if user.status() == UserStatus::Playing && self.status() != GameStatus::Waiting {
            if let Err(e) = self.drop_player(user) {
                debug!({ fields::ERROR } = %e, "Drop before quit failed");
            }
        }

        let mut state = lock(&self.state);
        let before = state.players.len();
        state.players.retain(|p| p.id() != user.id());
        if state.players.len() == before {
            return Err(ModelError::NotInGame(user.id()));
        }
        user.leave_game();

        if state.status == GameStatus::Waiting {
            for (i, player) in state.players.iter().enumerate() {
                player.set_player_number((i + 1) as u8);
            }
        }
        info!(
            { fields::GAME_ID } = self.id,
            { fields::USER_ID } = user.id(),
            "User quit game"
        );

        let event = GameEvent::UserQuitGame {
            game_id: self.id,
            user: user.info(),
        };
        user.send(event.clone());
        state.emit(event);
        Ok(())
    }

    /// Owner-only. Returns the kicked user; the caller makes them quit.
    pub fn kick(&self, user: &User, target_id: u16) -> Result<Arc<User>, ModelError> {
        let mut state = lock(&self.state);
        if user.id() != self.owner.id() {
            return Err(ModelError::NotOwner(self.id));
        }
        if target_id == user.id() {
            return Err(ModelError::Denied("You cannot kick yourself".to_string()));
        }
        let target = state
            .players
            .iter()
            .find(|p| p.id() == target_id)
            .cloned()
            .ok_or(ModelError::UserNotFound(target_id))?;
        state.kicked.insert(target_id);
        info!(
            { fields::GAME_ID } = self.id,
            { fields::KICKED_USER_ID } = target_id,
            "User kicked"
        );
        Ok(target)
    }

    /// Owner-only teardown; every remaining player is released.
    pub fn close(&self, user: &User) -> Result<(), ModelError> {
        let mut state = lock(&self.state);
        if user.id() != self.owner.id() {
            return Err(ModelError::NotOwner(self.id));
        }
        if state.synched {
            state.desynch_all();
        }
        for player in state.players.drain(..) {
            player.leave_game();
        }
        state.queues.clear();
        state.queue_users.clear();
        info!({ fields::GAME_ID } = self.id, "Game closed");
        Ok(())
    }

    pub fn chat(&self, user: &User, message: String) -> Result<(), ModelError> {
        let state = lock(&self.state);
        if !state.players.iter().any(|p| p.id() == user.id()) {
            return Err(ModelError::NotInGame(user.id()));
        }
        state.emit(GameEvent::GameChat {
            game_id: self.id,
            user: user.info(),
            message,
        });
        Ok(())
    }

    pub fn announce(&self, message: String) {
        lock(&self.state).emit(GameEvent::GameInfo {
            game_id: self.id,
            message,
        });
    }

    /// The session saw a gap in `user`'s sequence numbers; their input can
    /// no longer be trusted.
    pub fn dropped_packet(&self, user: &User) {
        let mut state = lock(&self.state);
        if !state.synched {
            return;
        }
        let Ok((player_number, queue)) = state.queue_for(user) else {
            return;
        };
        if !queue.is_synched() {
            return;
        }
        queue.set_synched(false);
        warn!(
            { fields::GAME_ID } = self.id,
            { fields::PLAYER_NUMBER } = player_number,
            "Player desynched: dropped a packet"
        );
        state.emit(GameEvent::PlayerDesynch {
            game_id: self.id,
            user: user.info(),
            message: format!("{} desynched: dropped a packet", user.name()),
        });
        self.desynch_if_alone(&mut state);
    }

    fn desynch_if_alone(&self, state: &mut GameState) {
        if state.synched && state.synched_count() < 2 {
            state.desynch_all();
            info!(
                { fields::GAME_ID } = self.id,
                "Game desynched: less than 2 players synched"
            );
            state.emit(GameEvent::GameDesynch {
                game_id: self.id,
                message: "Game desynched: less than 2 players synched".to_string(),
            });
        }
    }

    /// Broadcast merge for one game data message from `user`. Queues the
    /// user's input, then collects one slot per player per action from every
    /// queue and sends the merged block back to `user` alone.
    ///
    /// The game lock is never held while waiting on a queue.
    pub async fn add_data(&self, user: &User, data: Bytes) -> Result<(), ModelError> {
        let (queues, actions, player_number) = {
            let state = lock(&self.state);
            if !state.synched {
                return Err(ModelError::Desynched(self.id));
            }
            let (player_number, _) = state.queue_for(user)?;
            (
                state.queues.clone(),
                state.actions_per_message,
                player_number,
            )
        };

        if actions == 0 {
            return Err(ModelError::GameData("no actions per message".to_string()));
        }
        let bytes_per_action = data.len() / actions;
        if bytes_per_action == 0 {
            return Err(ModelError::GameData(format!(
                "{} bytes cannot hold {} actions",
                data.len(),
                actions
            )));
        }
        let num_players = queues.len();
        let stride = num_players * bytes_per_action;

        queues[player_number as usize - 1].add_actions(&data);

        let mut response = vec![0u8; actions * stride];
        let mut timeout_counter = 0u32;
        for action in 0..actions {
            for (slot, queue) in queues.iter().enumerate() {
                let offset = action * stride + slot * bytes_per_action;
                let dest = &mut response[offset..offset + bytes_per_action];
                while self.is_synched() {
                    match queue.get_action(player_number, dest).await {
                        Ok(()) => break,
                        Err(mut timeout) => {
                            timeout_counter += 1;
                            timeout.timeout_number = timeout_counter;
                            self.handle_timeout(timeout);
                        }
                    }
                }
            }
        }

        if !self.is_synched() {
            return Err(ModelError::Desynched(self.id));
        }
        user.send(GameEvent::GameData {
            game_id: self.id,
            data: Bytes::from(response),
        });
        Ok(())
    }

    fn handle_timeout(&self, timeout: PlayerTimeout) {
        let mut state = lock(&self.state);
        if !state.synched {
            return;
        }
        let index = timeout.player_number as usize;
        if index == 0 || index > state.queues.len() {
            return;
        }
        let queue = state.queues[index - 1].clone();
        let player = state.queue_users[index - 1].clone();
        if !queue.is_synched() || queue.last_timeout() == Some(timeout) {
            return;
        }
        queue.set_last_timeout(timeout);

        info!(
            { fields::GAME_ID } = self.id,
            { fields::PLAYER_NUMBER } = timeout.player_number,
            { fields::TIMEOUT_NUMBER } = timeout.timeout_number,
            "Player timeout"
        );
        if timeout.timeout_number < self.config.desynch_timeouts {
            state.emit(GameEvent::GameTimeout {
                game_id: self.id,
                user: player.info(),
                timeout_number: timeout.timeout_number,
            });
        } else {
            queue.set_synched(false);
            warn!(
                { fields::GAME_ID } = self.id,
                { fields::PLAYER_NUMBER } = timeout.player_number,
                "Player desynched: lagged"
            );
            state.emit(GameEvent::PlayerDesynch {
                game_id: self.id,
                user: player.info(),
                message: format!("{} desynched: lagged", player.name()),
            });
            self.desynch_if_alone(&mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::Event;
    use std::net::SocketAddr;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn user(id: u16, connection_type: u8) -> (Arc<User>, UnboundedReceiver<Event>) {
        let addr: SocketAddr = format!("127.0.0.1:{}", 4000 + id).parse().unwrap();
        let (user, rx) = User::new(id, addr, "0.83");
        user.set_login_info(format!("p{}", id), "MAME".to_string(), connection_type);
        user.set_logged_in();
        (Arc::new(user), rx)
    }

    fn config(timeout_millis: u64) -> GameConfig {
        GameConfig {
            buffer_size: 64,
            timeout_millis,
            desynch_timeouts: 2,
            max_players: 4,
        }
    }

    fn drain(rx: &mut UnboundedReceiver<Event>) -> Vec<GameEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let Event::Game(e) = event {
                out.push(e);
            }
        }
        out
    }

    type Player = (Arc<User>, UnboundedReceiver<Event>);

    fn two_player_game(timeout_millis: u64) -> (Arc<Game>, Vec<Player>) {
        let a = user(1, 1);
        let b = user(2, 1);
        let game = Arc::new(Game::new(
            10,
            "Street Fighter".to_string(),
            a.0.clone(),
            config(timeout_millis),
        ));
        game.join(&a.0).unwrap();
        game.join(&b.0).unwrap();
        game.start(&a.0).unwrap();
        assert!(!game.ready(&a.0).unwrap());
        assert!(game.ready(&b.0).unwrap());
        (game, vec![a, b])
    }

    #[test]
    fn test_join_rules() {
        let (owner, _rx) = user(1, 1);
        let game = Game::new(1, "g".to_string(), owner.clone(), config(100));
        assert_eq!(game.join(&owner).unwrap(), 1);
        assert_eq!(game.join(&owner), Err(ModelError::AlreadyInGame(1)));

        let others: Vec<_> = (2..=4).map(|id| user(id, 1)).collect();
        for (i, (u, _)) in others.iter().enumerate() {
            assert_eq!(game.join(u).unwrap(), (i + 2) as u8);
        }
        let (late, _rx) = user(5, 1);
        assert_eq!(game.join(&late), Err(ModelError::GameFull(1)));
        assert_eq!(game.snapshot().num_players, 4);
    }

    #[test]
    fn test_start_and_ready() {
        let (game, mut users) = two_player_game(100);
        assert_eq!(game.status(), GameStatus::Playing);
        assert!(game.is_synched());

        let events = drain(&mut users[1].1);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::GameStarted { num_players: 2, .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::AllReady { .. })));
    }

    #[test]
    fn test_only_owner_starts() {
        let (owner, _a) = user(1, 1);
        let (guest, _b) = user(2, 1);
        let game = Game::new(1, "g".to_string(), owner.clone(), config(100));
        game.join(&owner).unwrap();
        game.join(&guest).unwrap();
        assert_eq!(game.start(&guest), Err(ModelError::NotOwner(1)));
        assert!(game.kick(&guest, 1).is_err());
    }

    #[test]
    fn test_connection_type_mismatch_blocks_start() {
        let (owner, mut rx) = user(1, 1);
        let (guest, _b) = user(2, 3);
        let game = Game::new(1, "g".to_string(), owner.clone(), config(100));
        game.join(&owner).unwrap();
        game.join(&guest).unwrap();
        assert!(matches!(game.start(&owner), Err(ModelError::Denied(_))));
        assert_eq!(game.status(), GameStatus::Waiting);
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, GameEvent::GameInfo { .. })));
    }

    #[tokio::test]
    async fn test_merge_interleaves_players() {
        let (game, mut users) = two_player_game(500);
        let (a, _) = &users[0];
        let (b, _) = &users[1];

        let game_b = game.clone();
        let b2 = b.clone();
        let second =
            tokio::spawn(async move { game_b.add_data(&b2, Bytes::from_static(&[3, 4])).await });
        game.add_data(a, Bytes::from_static(&[1, 2])).await.unwrap();
        second.await.unwrap().unwrap();

        for (_, rx) in users.iter_mut() {
            let data: Vec<Bytes> = drain(rx)
                .into_iter()
                .filter_map(|e| match e {
                    GameEvent::GameData { data, .. } => Some(data),
                    _ => None,
                })
                .collect();
            assert_eq!(data, vec![Bytes::from_static(&[1, 2, 3, 4])]);
        }
    }

    #[tokio::test]
    async fn test_merge_is_action_major() {
        let a = user(1, 2);
        let b = user(2, 2);
        let game = Arc::new(Game::new(3, "g".to_string(), a.0.clone(), config(500)));
        game.join(&a.0).unwrap();
        game.join(&b.0).unwrap();
        game.start(&a.0).unwrap();
        game.ready(&a.0).unwrap();
        game.ready(&b.0).unwrap();

        let game_b = game.clone();
        let user_b = b.0.clone();
        let second = tokio::spawn(async move {
            game_b
                .add_data(&user_b, Bytes::from_static(&[0xB1, 0xB2]))
                .await
        });
        game.add_data(&a.0, Bytes::from_static(&[0xA1, 0xA2]))
            .await
            .unwrap();
        second.await.unwrap().unwrap();

        let mut rx = a.1;
        let merged = drain(&mut rx)
            .into_iter()
            .find_map(|e| match e {
                GameEvent::GameData { data, .. } => Some(data),
                _ => None,
            })
            .unwrap();
        // two actions of one byte each: [a0 b0 a1 b1]
        assert_eq!(&merged[..], &[0xA1, 0xB1, 0xA2, 0xB2]);
    }

    #[tokio::test]
    async fn test_lagging_player_desynchs_game() {
        let (game, mut users) = two_player_game(20);
        let (a, _) = &users[0];

        let result = game.add_data(a, Bytes::from_static(&[1, 2])).await;
        assert_eq!(result, Err(ModelError::Desynched(10)));
        assert!(!game.is_synched());

        let events = drain(&mut users[0].1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameTimeout { timeout_number: 1, .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerDesynch { .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameDesynch { .. })));
    }

    #[test]
    fn test_dropped_packet_desynchs_player() {
        let (game, mut users) = two_player_game(100);
        drain(&mut users[0].1);
        game.dropped_packet(&users[1].0);
        assert!(!game.is_synched());
        let events = drain(&mut users[0].1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerDesynch { .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameDesynch { .. })));
    }

    #[test]
    fn test_drop_and_quit() {
        let (game, mut users) = two_player_game(100);
        let (a, _) = &users[0];
        let (b, _) = &users[1];
        assert!(!game.drop_player(b).unwrap());
        assert!(game.drop_player(a).unwrap());
        assert_eq!(game.status(), GameStatus::Waiting);

        game.quit(b).unwrap();
        assert_eq!(b.game_id(), None);
        assert_eq!(game.num_players(), 1);
        assert_eq!(game.quit(b), Err(ModelError::NotInGame(2)));

        let events = drain(&mut users[1].1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::UserDropped { player_number: 2, .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::UserQuitGame { .. })));
    }

    #[test]
    fn test_kicked_user_cannot_rejoin() {
        let (owner, _a) = user(1, 1);
        let (guest, _b) = user(2, 1);
        let game = Game::new(1, "g".to_string(), owner.clone(), config(100));
        game.join(&owner).unwrap();
        game.join(&guest).unwrap();
        let kicked = game.kick(&owner, 2).unwrap();
        game.quit(&kicked).unwrap();
        assert!(matches!(game.join(&guest), Err(ModelError::Denied(_))));
    }
}
