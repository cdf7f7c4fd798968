use super::deliver;
use crate::client_handler::ClientHandler;
use crate::handlers::util;
use crate::kaillera::message_types as msg;
use crate::model::event::{UserEvent, UserEventKind};
use crate::model::user::UserInfo;

event_renderer!(ConnectedRenderer, UserEvent, UserEventKind::Connected, render_connected);
event_renderer!(InfoMessageRenderer, UserEvent, UserEventKind::InfoMessage, render_info_message);

/// Server status snapshot sent once the login completes: every other
/// logged-in user and every game.
async fn render_connected(_event: &UserEvent, handler: &ClientHandler) {
    let server = handler.server();
    let users: Vec<UserInfo> = server
        .users()
        .await
        .iter()
        .filter(|u| u.id() != handler.user_id() && u.is_logged_in())
        .map(|u| u.info())
        .collect();
    let games = server.game_snapshots().await;
    deliver(handler, msg::SERVER_STATUS, util::build_server_status(&users, &games)).await;
}

async fn render_info_message(event: &UserEvent, handler: &ClientHandler) {
    let UserEvent::InfoMessage { source, message } = event else {
        return;
    };
    deliver(
        handler,
        msg::SERVER_INFORMATION,
        util::build_information_message(source, message),
    )
    .await;
}
