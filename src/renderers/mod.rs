// Event renderers: turn domain events addressed to a user into outbound
// protocol messages on that user's session.

use bytes::BytesMut;
use std::sync::Arc;
use tracing::warn;

use crate::action_router::EventRenderer;
use crate::client_handler::ClientHandler;
use crate::fields;
use crate::kaillera::message_types as msg;
use crate::model::event::{GameEvent, ServerEvent, UserEvent};

/// Wraps `async fn(&Event, &ClientHandler)` in a unit struct registered for
/// one event kind.
macro_rules! event_renderer {
    ($renderer:ident, $event:ty, $kind:expr, $render:ident) => {
        pub struct $renderer;

        impl crate::action_router::EventRenderer<$event> for $renderer {
            fn kind(&self) -> <$event as crate::model::event::RoutedEvent>::Kind {
                $kind
            }

            fn name(&self) -> &'static str {
                stringify!($renderer)
            }

            fn render<'a>(
                &'a self,
                event: &'a $event,
                handler: &'a crate::client_handler::ClientHandler,
            ) -> crate::action_router::RenderFuture<'a> {
                Box::pin($render(event, handler))
            }
        }
    };
}

pub mod game;
pub mod server;
pub mod user;

/// Renderers never fail the event loop; a send error is only logged.
async fn deliver(handler: &ClientHandler, message_type: u8, body: BytesMut) {
    if let Err(e) = handler.send(message_type, body).await {
        warn!(
            { fields::USER_ID } = handler.user_id(),
            { fields::MESSAGE_TYPE } = msg::message_type_name(message_type),
            { fields::ERROR } = %e,
            "Failed to send"
        );
    }
}

pub fn server_renderers() -> Vec<Arc<dyn EventRenderer<ServerEvent>>> {
    vec![
        Arc::new(server::ChatRenderer),
        Arc::new(server::UserJoinedRenderer),
        Arc::new(server::UserQuitRenderer),
        Arc::new(server::GameCreatedRenderer),
        Arc::new(server::GameClosedRenderer),
        Arc::new(server::GameStatusRenderer),
    ]
}

/// Desynch notices have no renderer of their own and fall back to the game
/// info renderer.
pub fn game_renderers() -> Vec<Arc<dyn EventRenderer<GameEvent>>> {
    vec![
        Arc::new(game::JoinGameRenderer),
        Arc::new(game::QuitGameRenderer),
        Arc::new(game::StartGameRenderer),
        Arc::new(game::AllReadyRenderer),
        Arc::new(game::DropGameRenderer),
        Arc::new(game::GameChatRenderer),
        Arc::new(game::GameDataRenderer),
        Arc::new(game::GameInfoRenderer),
        Arc::new(game::GameTimeoutRenderer),
    ]
}

pub fn user_renderers() -> Vec<Arc<dyn EventRenderer<UserEvent>>> {
    vec![
        Arc::new(user::ConnectedRenderer),
        Arc::new(user::InfoMessageRenderer),
    ]
}
