use tracing::debug;

use super::deliver;
use crate::client_handler::ClientHandler;
use crate::fields;
use crate::handlers::util;
use crate::kaillera::message_types as msg;
use crate::model::event::{ServerEvent, ServerEventKind};

event_renderer!(ChatRenderer, ServerEvent, ServerEventKind::Chat, render_chat);
event_renderer!(UserJoinedRenderer, ServerEvent, ServerEventKind::UserJoined, render_user_joined);
event_renderer!(UserQuitRenderer, ServerEvent, ServerEventKind::UserQuit, render_user_quit);
event_renderer!(GameCreatedRenderer, ServerEvent, ServerEventKind::GameCreated, render_game_created);
event_renderer!(GameClosedRenderer, ServerEvent, ServerEventKind::GameClosed, render_game_closed);
event_renderer!(
    GameStatusRenderer,
    ServerEvent,
    ServerEventKind::GameStatusChanged,
    render_game_status
);

async fn render_chat(event: &ServerEvent, handler: &ClientHandler) {
    let ServerEvent::Chat { user, message } = event else {
        return;
    };
    deliver(handler, msg::GLOBAL_CHAT, util::build_chat(&user.name, message)).await;
}

async fn render_user_joined(event: &ServerEvent, handler: &ClientHandler) {
    let ServerEvent::UserJoined { user } = event else {
        return;
    };
    deliver(handler, msg::USER_JOINED, util::build_user_joined(user)).await;
}

/// A user's own quit is the last thing its session sends.
async fn render_user_quit(event: &ServerEvent, handler: &ClientHandler) {
    let ServerEvent::UserQuit { user, message } = event else {
        return;
    };
    deliver(
        handler,
        msg::USER_QUIT,
        util::build_user_quit(&user.name, user.id, message),
    )
    .await;
    if user.id == handler.user_id() {
        debug!({ fields::USER_ID } = user.id, "Own quit rendered, stopping session");
        handler.stop();
    }
}

async fn render_game_created(event: &ServerEvent, handler: &ClientHandler) {
    let ServerEvent::GameCreated { game } = event else {
        return;
    };
    deliver(handler, msg::CREATE_GAME, util::build_new_game_notification(game)).await;
}

async fn render_game_closed(event: &ServerEvent, handler: &ClientHandler) {
    let ServerEvent::GameClosed { game_id } = event else {
        return;
    };
    deliver(handler, msg::CLOSE_GAME, util::build_close_game(*game_id)).await;
}

async fn render_game_status(event: &ServerEvent, handler: &ClientHandler) {
    let ServerEvent::GameStatusChanged { game } = event else {
        return;
    };
    deliver(handler, msg::UPDATE_GAME_STATUS, util::build_game_status(game)).await;
}
