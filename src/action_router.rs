// Dispatch tables from inbound message IDs to command actions and from
// domain event kinds to renderers. Built once at startup and read-only after.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

use crate::client_handler::ClientHandler;
use crate::error::{ActionError, RouterError};
use crate::kaillera::message_types::{self as msg, MAX_MESSAGE_ID, REQUIRED_MESSAGE_IDS};
use crate::kaillera::protocol::V086Message;
use crate::model::event::{GameEvent, RoutedEvent, ServerEvent, UserEvent};

pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ActionError>> + Send + 'a>>;
pub type RenderFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Handles one inbound message type.
pub trait CommandAction: Send + Sync {
    fn message_id(&self) -> u8;

    fn name(&self) -> &'static str;

    fn perform<'a>(&'a self, message: &'a V086Message, handler: &'a ClientHandler)
        -> ActionFuture<'a>;
}

/// Turns one kind of domain event into outbound messages for a session.
pub trait EventRenderer<E: RoutedEvent>: Send + Sync {
    fn kind(&self) -> E::Kind;

    fn name(&self) -> &'static str;

    fn render<'a>(&'a self, event: &'a E, handler: &'a ClientHandler) -> RenderFuture<'a>;
}

pub struct RendererTable<E: RoutedEvent> {
    renderers: HashMap<E::Kind, Arc<dyn EventRenderer<E>>>,
}

impl<E: RoutedEvent> RendererTable<E> {
    fn build(renderers: Vec<Arc<dyn EventRenderer<E>>>) -> Result<Self, RouterError> {
        let mut table: HashMap<E::Kind, Arc<dyn EventRenderer<E>>> = HashMap::new();
        for renderer in renderers {
            let kind = renderer.kind();
            if table.contains_key(&kind) {
                return Err(RouterError::DuplicateRenderer {
                    scope: E::SCOPE,
                    kind: format!("{:?}", kind),
                });
            }
            debug!(scope = E::SCOPE, kind = ?kind, renderer = renderer.name(), "Renderer registered");
            table.insert(kind, renderer);
        }
        Ok(Self { renderers: table })
    }

    /// Renderer for `kind`, or for the nearest kind it falls back to.
    pub fn route(&self, kind: E::Kind) -> Option<&Arc<dyn EventRenderer<E>>> {
        let mut next = Some(kind);
        // fallback chains are short; the bound only guards a cyclic definition
        for _ in 0..=self.renderers.len() {
            let current = next?;
            if let Some(renderer) = self.renderers.get(&current) {
                return Some(renderer);
            }
            next = E::fallback(current);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

pub struct ActionRouter {
    actions: [Option<Arc<dyn CommandAction>>; MAX_MESSAGE_ID],
    server: RendererTable<ServerEvent>,
    game: RendererTable<GameEvent>,
    user: RendererTable<UserEvent>,
}

impl fmt::Debug for ActionRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions: Vec<&'static str> = self.actions.iter().flatten().map(|a| a.name()).collect();
        f.debug_struct("ActionRouter")
            .field("actions", &actions)
            .field("server_renderers", &self.server.len())
            .field("game_renderers", &self.game.len())
            .field("user_renderers", &self.user.len())
            .finish()
    }
}

impl ActionRouter {
    /// Fails on an out-of-range or duplicated message ID, a duplicated
    /// renderer, or any required message ID left without an action.
    pub fn new(
        actions: Vec<Arc<dyn CommandAction>>,
        server_renderers: Vec<Arc<dyn EventRenderer<ServerEvent>>>,
        game_renderers: Vec<Arc<dyn EventRenderer<GameEvent>>>,
        user_renderers: Vec<Arc<dyn EventRenderer<UserEvent>>>,
    ) -> Result<Self, RouterError> {
        let mut table: [Option<Arc<dyn CommandAction>>; MAX_MESSAGE_ID] =
            std::array::from_fn(|_| None);

        for action in actions {
            let id = action.message_id();
            let slot = table
                .get_mut(id as usize)
                .ok_or(RouterError::InvalidMessageId {
                    id,
                    action: action.name(),
                })?;
            if let Some(existing) = slot {
                return Err(RouterError::DuplicateAction {
                    id,
                    existing: existing.name(),
                    duplicate: action.name(),
                });
            }
            debug!(
                message_type = msg::message_type_name(id),
                action = action.name(),
                "Action registered"
            );
            *slot = Some(action);
        }

        let missing: Vec<String> = REQUIRED_MESSAGE_IDS
            .iter()
            .filter(|&&id| table[id as usize].is_none())
            .map(|&id| format!("0x{:02X} ({})", id, msg::message_type_name(id)))
            .collect();
        if !missing.is_empty() {
            return Err(RouterError::MissingActions(missing.join(", ")));
        }

        Ok(Self {
            actions: table,
            server: RendererTable::build(server_renderers)?,
            game: RendererTable::build(game_renderers)?,
            user: RendererTable::build(user_renderers)?,
        })
    }

    /// Router wired with every built-in action and renderer.
    pub fn with_defaults() -> Result<Self, RouterError> {
        Self::new(
            crate::handlers::default_actions(),
            crate::renderers::server_renderers(),
            crate::renderers::game_renderers(),
            crate::renderers::user_renderers(),
        )
    }

    pub fn action(&self, message_id: u8) -> Option<&Arc<dyn CommandAction>> {
        self.actions.get(message_id as usize)?.as_ref()
    }

    pub fn server_renderer(&self, event: &ServerEvent) -> Option<&Arc<dyn EventRenderer<ServerEvent>>> {
        self.server.route(event.kind())
    }

    pub fn game_renderer(&self, event: &GameEvent) -> Option<&Arc<dyn EventRenderer<GameEvent>>> {
        self.game.route(event.kind())
    }

    pub fn user_renderer(&self, event: &UserEvent) -> Option<&Arc<dyn EventRenderer<UserEvent>>> {
        self.user.route(event.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::{GameEventKind, ServerEventKind};

    struct NoopAction(u8, &'static str);

    impl CommandAction for NoopAction {
        fn message_id(&self) -> u8 {
            self.0
        }

        fn name(&self) -> &'static str {
            self.1
        }

        fn perform<'a>(
            &'a self,
            _message: &'a V086Message,
            _handler: &'a ClientHandler,
        ) -> ActionFuture<'a> {
            Box::pin(async { Ok(()) })
        }
    }

    struct NoopGameRenderer(GameEventKind, &'static str);

    impl EventRenderer<GameEvent> for NoopGameRenderer {
        fn kind(&self) -> GameEventKind {
            self.0
        }

        fn name(&self) -> &'static str {
            self.1
        }

        fn render<'a>(&'a self, _event: &'a GameEvent, _handler: &'a ClientHandler) -> RenderFuture<'a> {
            Box::pin(async {})
        }
    }

    struct NoopServerRenderer(ServerEventKind);

    impl EventRenderer<ServerEvent> for NoopServerRenderer {
        fn kind(&self) -> ServerEventKind {
            self.0
        }

        fn name(&self) -> &'static str {
            "NoopServerRenderer"
        }

        fn render<'a>(
            &'a self,
            _event: &'a ServerEvent,
            _handler: &'a ClientHandler,
        ) -> RenderFuture<'a> {
            Box::pin(async {})
        }
    }

    fn required_actions() -> Vec<Arc<dyn CommandAction>> {
        REQUIRED_MESSAGE_IDS
            .iter()
            .map(|&id| Arc::new(NoopAction(id, msg::message_type_name(id))) as Arc<dyn CommandAction>)
            .collect()
    }

    #[test]
    fn test_all_required_routes_resolve() {
        let router = ActionRouter::new(required_actions(), vec![], vec![], vec![]).unwrap();
        for id in REQUIRED_MESSAGE_IDS {
            assert_eq!(router.action(id).unwrap().message_id(), id);
        }
        assert!(router.action(msg::SERVER_STATUS).is_none());
        assert!(router.action(200).is_none());
    }

    #[test]
    fn test_missing_required_action_fails() {
        let mut actions = required_actions();
        actions.retain(|a| a.message_id() != msg::GAME_DATA);
        match ActionRouter::new(actions, vec![], vec![], vec![]) {
            Err(RouterError::MissingActions(ids)) => assert!(ids.contains("0x12")),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_duplicate_action_fails() {
        let mut actions = required_actions();
        actions.push(Arc::new(NoopAction(msg::GLOBAL_CHAT, "SecondChat")));
        assert_eq!(
            ActionRouter::new(actions, vec![], vec![], vec![]).map(|_| ()),
            Err(RouterError::DuplicateAction {
                id: msg::GLOBAL_CHAT,
                existing: "GlobalChat",
                duplicate: "SecondChat",
            })
        );
    }

    #[test]
    fn test_out_of_range_id_fails() {
        let mut actions = required_actions();
        actions.push(Arc::new(NoopAction(MAX_MESSAGE_ID as u8, "TooBig")));
        assert!(matches!(
            ActionRouter::new(actions, vec![], vec![], vec![]),
            Err(RouterError::InvalidMessageId { .. })
        ));
    }

    #[test]
    fn test_duplicate_renderer_fails() {
        let renderers: Vec<Arc<dyn EventRenderer<ServerEvent>>> = vec![
            Arc::new(NoopServerRenderer(ServerEventKind::Chat)),
            Arc::new(NoopServerRenderer(ServerEventKind::Chat)),
        ];
        assert!(matches!(
            ActionRouter::new(required_actions(), renderers, vec![], vec![]),
            Err(RouterError::DuplicateRenderer { scope: "server", .. })
        ));
    }

    #[test]
    fn test_renderer_fallback() {
        let renderers: Vec<Arc<dyn EventRenderer<GameEvent>>> = vec![
            Arc::new(NoopGameRenderer(GameEventKind::GameInfo, "info")),
            Arc::new(NoopGameRenderer(GameEventKind::GameTimeout, "timeout")),
        ];
        let router = ActionRouter::new(required_actions(), vec![], renderers, vec![]).unwrap();

        let desynch = GameEvent::GameDesynch {
            game_id: 1,
            message: "x".to_string(),
        };
        assert_eq!(router.game_renderer(&desynch).unwrap().name(), "info");

        let all_ready = GameEvent::AllReady { game_id: 1 };
        assert!(router.game_renderer(&all_ready).is_none());
    }

    #[test]
    fn test_default_router_builds() {
        let router = ActionRouter::with_defaults().unwrap();
        for id in REQUIRED_MESSAGE_IDS {
            assert!(router.action(id).is_some());
        }
        let timeout_kind = GameEventKind::GameTimeout;
        assert_eq!(router.game.route(timeout_kind).unwrap().kind(), timeout_kind);
        assert_eq!(
            router.game.route(GameEventKind::PlayerDesynch).unwrap().kind(),
            GameEventKind::GameInfo
        );
    }
}
