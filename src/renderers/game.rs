use tracing::debug;

use super::deliver;
use crate::client_handler::ClientHandler;
use crate::fields;
use crate::handlers::util;
use crate::kaillera::message_types as msg;
use crate::model::event::{GameEvent, GameEventKind};
use crate::model::user::UserInfo;

/// Frame delay announced in every start game notification.
const FRAME_DELAY: u16 = 2;

/// Sender name for server notices shown in game chat.
const SERVER_CHAT_NAME: &str = "Server";

event_renderer!(JoinGameRenderer, GameEvent, GameEventKind::UserJoinedGame, render_join_game);
event_renderer!(QuitGameRenderer, GameEvent, GameEventKind::UserQuitGame, render_quit_game);
event_renderer!(StartGameRenderer, GameEvent, GameEventKind::GameStarted, render_start_game);
event_renderer!(AllReadyRenderer, GameEvent, GameEventKind::AllReady, render_all_ready);
event_renderer!(DropGameRenderer, GameEvent, GameEventKind::UserDropped, render_drop_game);
event_renderer!(GameChatRenderer, GameEvent, GameEventKind::GameChat, render_game_chat);
event_renderer!(GameDataRenderer, GameEvent, GameEventKind::GameData, render_game_data);
event_renderer!(GameInfoRenderer, GameEvent, GameEventKind::GameInfo, render_game_info);
event_renderer!(GameTimeoutRenderer, GameEvent, GameEventKind::GameTimeout, render_game_timeout);

/// The joining user first gets the list of everyone already in the game.
async fn render_join_game(event: &GameEvent, handler: &ClientHandler) {
    let GameEvent::UserJoinedGame {
        game_id,
        user,
        players,
    } = event
    else {
        return;
    };
    if user.id == handler.user_id() {
        let others: Vec<&UserInfo> = players.iter().filter(|p| p.id != user.id).collect();
        deliver(
            handler,
            msg::PLAYER_INFORMATION,
            util::build_player_information(&others),
        )
        .await;
    }
    deliver(handler, msg::JOIN_GAME, util::build_join_game(*game_id, user)).await;
}

async fn render_quit_game(event: &GameEvent, handler: &ClientHandler) {
    let GameEvent::UserQuitGame { user, .. } = event else {
        return;
    };
    deliver(handler, msg::QUIT_GAME, util::build_quit_game(&user.name, user.id)).await;
}

async fn render_start_game(event: &GameEvent, handler: &ClientHandler) {
    let GameEvent::GameStarted { num_players, .. } = event else {
        return;
    };
    let player_number = handler.user().player_number();
    deliver(
        handler,
        msg::START_GAME,
        util::build_start_game(FRAME_DELAY, player_number, *num_players),
    )
    .await;
}

/// Both data caches start empty for every match.
async fn render_all_ready(_event: &GameEvent, handler: &ClientHandler) {
    handler.reset_game_data_cache();
    deliver(handler, msg::READY_TO_PLAY, util::build_all_ready()).await;
}

async fn render_drop_game(event: &GameEvent, handler: &ClientHandler) {
    let GameEvent::UserDropped {
        user,
        player_number,
        ..
    } = event
    else {
        return;
    };
    deliver(
        handler,
        msg::DROP_GAME,
        util::build_player_drop(&user.name, *player_number),
    )
    .await;
}

async fn render_game_chat(event: &GameEvent, handler: &ClientHandler) {
    let GameEvent::GameChat { user, message, .. } = event else {
        return;
    };
    deliver(handler, msg::GAME_CHAT, util::build_chat(&user.name, message)).await;
}

/// Repeats of data already sent go out as a one byte cache key.
async fn render_game_data(event: &GameEvent, handler: &ClientHandler) {
    let GameEvent::GameData { data, .. } = event else {
        return;
    };
    let cached = {
        let mut cache = handler.server_cache();
        match cache.index_of(data) {
            Some(key) => Some(key),
            None => {
                cache.add(data.clone());
                None
            }
        }
    };
    match cached {
        Some(key) => deliver(handler, msg::GAME_CACHE, util::build_cached_game_data(key)).await,
        None => deliver(handler, msg::GAME_DATA, util::build_game_data(data)).await,
    }
}

async fn render_game_info(event: &GameEvent, handler: &ClientHandler) {
    let Some(message) = event.info_message() else {
        return;
    };
    deliver(
        handler,
        msg::GAME_CHAT,
        util::build_chat(SERVER_CHAT_NAME, &message),
    )
    .await;
}

/// The lagging player gets its recent messages again; everyone else only
/// logs the timeout.
async fn render_game_timeout(event: &GameEvent, handler: &ClientHandler) {
    let GameEvent::GameTimeout {
        game_id,
        user,
        timeout_number,
    } = event
    else {
        return;
    };
    if user.id == handler.user_id() {
        debug!(
            { fields::GAME_ID } = game_id,
            { fields::TIMEOUT_NUMBER } = timeout_number,
            "Timeout on own input, resending"
        );
        handler.resend(*timeout_number).await;
    } else {
        debug!(
            { fields::GAME_ID } = game_id,
            { fields::USER_ID } = user.id,
            { fields::TIMEOUT_NUMBER } = timeout_number,
            "Timeout from other player"
        );
    }
}
