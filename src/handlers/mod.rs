// Command actions, one per client message type.

use std::sync::Arc;

use crate::action_router::CommandAction;

/// Wraps `async fn(&V086Message, &ClientHandler) -> Result<(), ActionError>`
/// in a unit struct the action router can hold.
macro_rules! command_action {
    ($action:ident, $message_id:expr, $handle:ident) => {
        pub struct $action;

        impl crate::action_router::CommandAction for $action {
            fn message_id(&self) -> u8 {
                $message_id
            }

            fn name(&self) -> &'static str {
                stringify!($action)
            }

            fn perform<'a>(
                &'a self,
                message: &'a crate::kaillera::protocol::V086Message,
                handler: &'a crate::client_handler::ClientHandler,
            ) -> crate::action_router::ActionFuture<'a> {
                Box::pin($handle(message, handler))
            }
        }
    };
}

pub mod chat;
pub mod create_game;
pub mod drop_game;
pub mod game_cache;
pub mod game_data;
pub mod join_game;
pub mod keep_alive;
pub mod kick_user;
pub mod quit_game;
pub mod start_game;
pub mod user_login;
pub mod user_quit;

pub mod util;

/// Every built-in action; covers each required message ID exactly once.
pub fn default_actions() -> Vec<Arc<dyn CommandAction>> {
    vec![
        Arc::new(user_login::LoginAction),
        Arc::new(user_login::AckAction),
        Arc::new(chat::ChatAction),
        Arc::new(chat::GameChatAction),
        Arc::new(keep_alive::KeepAliveAction),
        Arc::new(create_game::CreateGameAction),
        Arc::new(join_game::JoinGameAction),
        Arc::new(quit_game::QuitGameAction),
        Arc::new(user_quit::QuitAction),
        Arc::new(start_game::StartGameAction),
        Arc::new(start_game::ReadyAction),
        Arc::new(kick_user::KickUserAction),
        Arc::new(game_data::GameDataAction),
        Arc::new(game_cache::CachedGameDataAction),
        Arc::new(drop_game::DropGameAction),
    ]
}
