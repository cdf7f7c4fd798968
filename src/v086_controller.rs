// Registry of live V086 sessions. Creates a session per accepted HELLO and
// tears it down when its handler finishes.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::RwLock;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::action_router::ActionRouter;
use crate::client_handler::ClientHandler;
use crate::config::Config;
use crate::error::ConnectError;
use crate::fields;
use crate::model::server::Server;
use crate::port_allocator::PortAllocator;

type ClientMap = Arc<RwLock<HashMap<u16, Arc<ClientHandler>>>>;

pub struct V086Controller {
    config: Config,
    server: Arc<Server>,
    router: Arc<ActionRouter>,
    ports: PortAllocator,
    clients: ClientMap,
}

impl V086Controller {
    pub fn new(
        config: &Config,
        server: Arc<Server>,
        router: Arc<ActionRouter>,
        ports: PortAllocator,
    ) -> Self {
        info!(
            { fields::PORT } = config.v086.port_range_start,
            { fields::QUEUE_SIZE } = ports.capacity(),
            client_types = ?config.v086.client_types,
            "V086 controller ready"
        );
        Self {
            config: config.clone(),
            server,
            router,
            ports,
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn client_types(&self) -> &[String] {
        &self.config.v086.client_types
    }

    pub fn supports(&self, protocol: &str) -> bool {
        self.client_types().iter().any(|t| t == protocol)
    }

    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }

    pub fn available_ports(&self) -> usize {
        self.ports.available_count()
    }

    /// Starts a session for `client_addr` and returns the port it listens
    /// on. The port goes back to the pool when the session ends.
    pub async fn new_connection(
        &self,
        client_addr: SocketAddr,
        protocol: &str,
    ) -> Result<u16, ConnectError> {
        if !self.supports(protocol) {
            return Err(ConnectError::UnsupportedProtocol(protocol.to_string()));
        }
        if self.server.num_users().await >= self.config.server.max_users {
            return Err(ConnectError::ServerFull);
        }
        let port = self.ports.allocate().ok_or(ConnectError::ServerFull)?;

        let socket = match UdpSocket::bind((self.config.connect.bind_address.as_str(), port)).await
        {
            Ok(socket) => socket,
            Err(source) => {
                self.ports.release(port);
                return Err(ConnectError::Bind { port, source });
            }
        };

        let (user, events) = match self.server.new_connection(client_addr, protocol).await {
            Ok(pair) => pair,
            Err(e) => {
                debug!({ fields::ERROR } = %e, "Server refused new connection");
                self.ports.release(port);
                return Err(ConnectError::ServerFull);
            }
        };
        let user_id = user.id();

        let handler = match ClientHandler::new(
            socket,
            client_addr.ip(),
            user,
            self.server.clone(),
            self.router.clone(),
            &self.config,
        ) {
            Ok(handler) => Arc::new(handler),
            Err(source) => {
                let _ = self.server.quit(user_id, "session failed to start").await;
                self.ports.release(port);
                return Err(ConnectError::Bind { port, source });
            }
        };
        let port = handler.port();

        self.clients.write().await.insert(user_id, handler.clone());
        info!(
            { fields::USER_ID } = user_id,
            { fields::PORT } = port,
            { fields::ADDR } = %client_addr,
            "Session started"
        );

        let clients = self.clients.clone();
        let server = self.server.clone();
        let ports = self.ports.clone();
        let span = info_span!(
            "session",
            { fields::PORT } = port,
            { fields::ADDR } = %client_addr,
            { fields::USER_ID } = user_id
        );
        tokio::spawn(
            async move {
                handler.run(events).await;

                clients.write().await.remove(&user_id);
                if let Err(e) = server.quit(user_id, "connection closed").await {
                    debug!({ fields::ERROR } = %e, "User already gone at teardown");
                }
                // the socket closes with the last handler reference
                drop(handler);
                ports.release(port);
                info!(
                    available_ports = ports.available_count(),
                    "Session closed"
                );
            }
            .instrument(span),
        );

        Ok(port)
    }

    pub async fn client_handler(&self, user_id: u16) -> Option<Arc<ClientHandler>> {
        self.clients.read().await.get(&user_id).cloned()
    }

    pub async fn num_clients(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Stops every live session. Their teardown runs on their own tasks.
    pub async fn stop(&self) {
        let clients = self.clients.read().await;
        if !clients.is_empty() {
            warn!(sessions = clients.len(), "Stopping all sessions");
        }
        for handler in clients.values() {
            handler.stop();
        }
    }
}
