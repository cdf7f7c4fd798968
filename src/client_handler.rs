// One V086 client session: a private UDP socket, the inbound sequence
// tracking that feeds command actions, and the outbound bundle ring that
// rendered events are written through.

use bytes::BytesMut;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, trace, warn};

use crate::action_router::ActionRouter;
use crate::config::Config;
use crate::error::ActionError;
use crate::fields;
use crate::game_cache::GameDataCache;
use crate::kaillera::message_types as msg;
use crate::kaillera::protocol::{is_newer, parse_bundle, UDPPacketGenerator, V086Message};
use crate::lock;
use crate::model::event::Event;
use crate::model::server::Server;
use crate::model::user::User;

#[derive(Debug, Default)]
struct InboundState {
    last_seq: Option<u16>,
    prev_seq: Option<u16>,
    retry_count: u32,
}

#[derive(Debug, Default)]
struct OutboundState {
    generator: UDPPacketGenerator,
    last_resend: Option<Instant>,
}

#[derive(Debug)]
struct SpeedTest {
    started: Instant,
    last: Instant,
    count: u32,
    best: Option<Duration>,
}

impl SpeedTest {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last: now,
            count: 0,
            best: None,
        }
    }
}

/// What the inbound pass decided to do with one datagram once the inbound
/// lock is released.
enum Inbound {
    Dispatch(Vec<(V086Message, bool)>),
    Resend(u32),
}

pub struct ClientHandler {
    port: u16,
    socket: UdpSocket,
    client_ip: IpAddr,
    remote: Mutex<Option<SocketAddr>>,
    user: Arc<User>,
    server: Arc<Server>,
    router: Arc<ActionRouter>,
    buffer_size: usize,
    keepalive_timeout: Duration,
    max_ping: Duration,
    inbound: Mutex<InboundState>,
    outbound: tokio::sync::Mutex<OutboundState>,
    client_cache: Mutex<GameDataCache>,
    server_cache: Mutex<GameDataCache>,
    speed_test: Mutex<SpeedTest>,
    stopped: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl ClientHandler {
    /// `socket` is already bound to the session port. Only datagrams from
    /// `client_ip` are accepted; the remote port is taken from the first one.
    pub fn new(
        socket: UdpSocket,
        client_ip: IpAddr,
        user: Arc<User>,
        server: Arc<Server>,
        router: Arc<ActionRouter>,
        config: &Config,
    ) -> io::Result<Self> {
        let port = socket.local_addr()?.port();
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            port,
            socket,
            client_ip,
            remote: Mutex::new(None),
            user,
            server,
            router,
            buffer_size: config.v086.buffer_size,
            keepalive_timeout: config.server.keepalive_timeout(),
            max_ping: config.server.max_ping_duration(),
            inbound: Mutex::new(InboundState::default()),
            outbound: tokio::sync::Mutex::new(OutboundState::default()),
            client_cache: Mutex::new(GameDataCache::new()),
            server_cache: Mutex::new(GameDataCache::new()),
            speed_test: Mutex::new(SpeedTest::new()),
            stopped: AtomicBool::new(false),
            shutdown,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> &Arc<User> {
        &self.user
    }

    pub fn user_id(&self) -> u16 {
        self.user.id()
    }

    pub fn server(&self) -> &Arc<Server> {
        &self.server
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        *lock(&self.remote)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Ends both session loops. Safe to call any number of times from any
    /// task, including from inside an action or renderer.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!({ fields::PORT } = self.port, "Stopping client handler");
        self.shutdown.send_replace(true);
    }

    /// Drives the session until it is stopped or the client goes quiet for
    /// longer than the keep-alive timeout.
    pub async fn run(&self, events: mpsc::UnboundedReceiver<Event>) {
        info!("Client handler started");
        tokio::join!(
            self.receive_loop(self.shutdown.subscribe()),
            self.event_loop(events, self.shutdown.subscribe()),
        );
        info!("Client handler finished");
    }

    async fn receive_loop(&self, mut shutdown: watch::Receiver<bool>) {
        let mut buf = vec![0u8; self.buffer_size];
        let mut last_received = Instant::now();

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = sleep_until(last_received + self.keepalive_timeout) => {
                    info!(
                        { fields::USER_ID } = self.user_id(),
                        timeout = ?self.keepalive_timeout,
                        "Keep-alive timeout"
                    );
                    if let Err(e) = self.server.quit(self.user_id(), "timeout").await {
                        debug!({ fields::ERROR } = %e, "Quit after timeout failed");
                    }
                    self.stop();
                    break;
                }
                result = self.socket.recv_from(&mut buf) => {
                    let (len, src) = match result {
                        Ok(ok) => ok,
                        Err(e) => {
                            debug!({ fields::ERROR } = %e, "recv_from failed, continuing");
                            continue;
                        }
                    };
                    if src.ip() != self.client_ip {
                        debug!({ fields::ADDR } = %src, "Datagram from foreign address ignored");
                        continue;
                    }
                    last_received = Instant::now();
                    if let Err(e) = self.handle_datagram(&buf[..len], src).await {
                        warn!({ fields::ERROR } = %e, "Fatal action, closing connection");
                        self.stop();
                        break;
                    }
                }
            }
        }
    }

    async fn handle_datagram(&self, data: &[u8], src: SocketAddr) -> Result<(), ActionError> {
        {
            let mut remote = lock(&self.remote);
            if remote.is_none() {
                debug!({ fields::ADDR } = %src, "Remote address learned");
                *remote = Some(src);
            }
        }

        trace!({ fields::PACKET_SIZE } = data.len(), "Datagram received");

        let inbound = {
            let mut state = lock(&self.inbound);
            let bundle = match parse_bundle(data, state.last_seq) {
                Ok(bundle) => bundle,
                Err(e) => {
                    warn!(
                        { fields::PACKET_SIZE } = data.len(),
                        { fields::ERROR } = %e,
                        "Failed to parse bundle"
                    );
                    return Ok(());
                }
            };

            if bundle.is_empty() {
                state.retry_count += 1;
                Inbound::Resend(state.retry_count)
            } else {
                state.retry_count = 0;
                let mut accepted = Vec::with_capacity(bundle.len());
                for message in bundle.oldest_first() {
                    if let Some(last) = state.last_seq {
                        if !is_newer(message.seq, last) {
                            continue;
                        }
                    }
                    state.prev_seq = state.last_seq;
                    state.last_seq = Some(message.seq);
                    let gap = matches!(state.prev_seq, Some(prev) if prev.wrapping_add(1) != message.seq);
                    accepted.push((message.clone(), gap));
                }
                Inbound::Dispatch(accepted)
            }
        };

        let messages = match inbound {
            Inbound::Resend(retry) => {
                debug!({ fields::RETRY_COUNT } = retry, "Client requested retransmit");
                self.resend(retry).await;
                return Ok(());
            }
            Inbound::Dispatch(messages) => messages,
        };

        for (message, gap) in messages {
            if gap {
                warn!(
                    { fields::USER_ID } = self.user_id(),
                    { fields::MESSAGE_NUMBER } = message.seq,
                    "Dropped a packet"
                );
                self.server.dropped_packet(self.user_id()).await;
            }
            self.perform(&message).await?;
        }
        Ok(())
    }

    async fn perform(&self, message: &V086Message) -> Result<(), ActionError> {
        let Some(action) = self.router.action(message.message_type) else {
            error!(
                { fields::MESSAGE_TYPE } = msg::message_type_name(message.message_type),
                "No action defined to handle client message"
            );
            return Ok(());
        };

        match action.perform(message, self).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(
                    { fields::MESSAGE_NUMBER } = message.seq,
                    { fields::MESSAGE_TYPE } = action.name(),
                    { fields::ERROR } = %e,
                    "Failed to handle message"
                );
                Ok(())
            }
        }
    }

    async fn event_loop(
        &self,
        mut events: mpsc::UnboundedReceiver<Event>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = shutdown.changed() => break,
                event = events.recv() => match event {
                    Some(event) => self.render(event).await,
                    None => break,
                },
            }
        }
    }

    async fn render(&self, event: Event) {
        trace!(?event, "Rendering event");
        match &event {
            Event::Server(e) => match self.router.server_renderer(e) {
                Some(renderer) => renderer.render(e, self).await,
                None => error!(?event, "No renderer registered for server event"),
            },
            Event::Game(e) => match self.router.game_renderer(e) {
                Some(renderer) => renderer.render(e, self).await,
                None => error!(?event, "No renderer registered for game event"),
            },
            Event::User(e) => match self.router.user_renderer(e) {
                Some(renderer) => renderer.render(e, self).await,
                None => error!(?event, "No renderer registered for user event"),
            },
        }
    }

    /// Queue one message and send it along with the previous ones still in
    /// the ring.
    pub async fn send(&self, message_type: u8, body: BytesMut) -> io::Result<()> {
        let mut outbound = self.outbound.lock().await;
        let packet = outbound
            .generator
            .make_send_packet(message_type, body.freeze());
        trace!(
            { fields::MESSAGE_TYPE } = msg::message_type_name(message_type),
            { fields::PACKET_SIZE } = packet.len(),
            "Sending"
        );
        self.transmit(&packet).await
    }

    /// Answer the `retry_count`th consecutive retransmit request. Skipped if
    /// the previous resend was less than the maximum ping ago.
    pub async fn resend(&self, retry_count: u32) {
        let mut outbound = self.outbound.lock().await;
        if let Some(last) = outbound.last_resend {
            if last.elapsed() <= self.max_ping {
                debug!("Skipping resend");
                return;
            }
        }
        let Some(packet) = outbound.generator.make_resend_packet(retry_count) else {
            return;
        };
        if let Err(e) = self.transmit(&packet).await {
            warn!({ fields::ERROR } = %e, "Resend failed");
        }
        outbound.last_resend = Some(Instant::now());
    }

    async fn transmit(&self, packet: &[u8]) -> io::Result<()> {
        let remote = *lock(&self.remote);
        let Some(remote) = remote else {
            debug!("No remote address yet, dropping outbound datagram");
            return Ok(());
        };
        self.socket.send_to(packet, remote).await.map(|_| ())
    }

    pub fn start_speed_test(&self) {
        *lock(&self.speed_test) = SpeedTest::new();
    }

    pub fn add_speed_measurement(&self) {
        let mut test = lock(&self.speed_test);
        let now = Instant::now();
        let elapsed = now - test.last;
        test.best = Some(test.best.map_or(elapsed, |best| best.min(elapsed)));
        test.count += 1;
        test.last = now;
    }

    pub fn speed_measurement_count(&self) -> u32 {
        lock(&self.speed_test).count
    }

    /// Fastest ACK round trip seen during the speed test.
    pub fn best_network_speed(&self) -> Duration {
        lock(&self.speed_test).best.unwrap_or_default()
    }

    pub fn average_network_speed(&self) -> Duration {
        let test = lock(&self.speed_test);
        if test.count == 0 {
            return Duration::ZERO;
        }
        (test.last - test.started) / test.count
    }

    /// Game data the client sent, indexed by the keys it references.
    pub fn client_cache(&self) -> MutexGuard<'_, GameDataCache> {
        lock(&self.client_cache)
    }

    /// Game data sent to the client, so repeats can go out as cache keys.
    pub fn server_cache(&self) -> MutexGuard<'_, GameDataCache> {
        lock(&self.server_cache)
    }

    pub fn reset_game_data_cache(&self) {
        self.client_cache().clear();
        self.server_cache().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kaillera::protocol::{write_bundle, V086Bundle};
    use bytes::{BufMut, Bytes};
    use std::collections::VecDeque;

    struct TestClient {
        socket: UdpSocket,
        generator: UDPPacketGenerator,
        last_seen: Option<u16>,
        pending: VecDeque<V086Message>,
    }

    impl TestClient {
        async fn new() -> Self {
            Self {
                socket: UdpSocket::bind("127.0.0.1:0").await.unwrap(),
                generator: UDPPacketGenerator::new(),
                last_seen: None,
                pending: VecDeque::new(),
            }
        }

        async fn send(&mut self, port: u16, message_type: u8, body: &[u8]) {
            let packet = self
                .generator
                .make_send_packet(message_type, Bytes::copy_from_slice(body));
            self.send_packet(port, &packet).await;
        }

        async fn send_packet(&self, port: u16, packet: &[u8]) {
            self.socket
                .send_to(packet, ("127.0.0.1", port))
                .await
                .unwrap();
        }

        /// Sends a bundle holding only messages the session has already seen.
        async fn send_stale(&self, port: u16) {
            let mut packet = BytesMut::new();
            write_bundle(
                &V086Bundle::new(vec![V086Message::new(0, msg::CLIENT_KEEP_ALIVE, vec![0u8])]),
                &mut packet,
            );
            self.send_packet(port, &packet).await;
        }

        /// Burns one sequence number, then sends a keep-alive on its own so
        /// the session sees a hole.
        async fn send_with_gap(&mut self, port: u16) {
            self.generator.push(msg::CLIENT_KEEP_ALIVE, vec![0u8]);
            self.generator.push(msg::CLIENT_KEEP_ALIVE, vec![0u8]);
            let mut packet = BytesMut::new();
            write_bundle(&self.generator.bundle(1), &mut packet);
            self.send_packet(port, &packet).await;
        }

        async fn recv_raw(&self, wait: Duration) -> Option<V086Bundle> {
            let mut buf = [0u8; 2048];
            let (len, _) = tokio::time::timeout(wait, self.socket.recv_from(&mut buf))
                .await
                .ok()?
                .unwrap();
            Some(parse_bundle(&buf[..len], None).unwrap())
        }

        async fn recv(&mut self) -> V086Bundle {
            let mut buf = [0u8; 2048];
            let (len, _) = tokio::time::timeout(Duration::from_secs(2), self.socket.recv_from(&mut buf))
                .await
                .unwrap()
                .unwrap();
            let bundle = parse_bundle(&buf[..len], self.last_seen).unwrap();
            if let Some(newest) = bundle.messages.first() {
                self.last_seen = Some(newest.seq);
            }
            bundle
        }

        async fn next_message(&mut self) -> V086Message {
            loop {
                if let Some(message) = self.pending.pop_front() {
                    return message;
                }
                let bundle = self.recv().await;
                self.pending.extend(bundle.oldest_first().cloned());
            }
        }

        async fn wait_for(&mut self, message_type: u8) -> Bytes {
            loop {
                let message = self.next_message().await;
                if message.message_type == message_type {
                    return message.body;
                }
            }
        }

        /// Next merged game frame, either full data or a cache key.
        async fn next_frame(&mut self) -> (u8, Vec<u8>) {
            loop {
                let message = self.next_message().await;
                if message.message_type == msg::GAME_DATA || message.message_type == msg::GAME_CACHE
                {
                    return (message.message_type, message.body.to_vec());
                }
            }
        }

        /// Reads until the session has been quiet for a while.
        async fn drain(&mut self) {
            while self.recv_raw(Duration::from_millis(200)).await.is_some() {}
            self.pending.clear();
        }

        async fn log_in(&mut self, port: u16, name: &str) {
            let mut body = BytesMut::new();
            body.put_slice(name.as_bytes());
            body.put_slice(b"\0emu\0");
            body.put_u8(1);
            self.send(port, msg::USER_LOGIN, &body).await;
            self.wait_for(msg::SERVER_TO_CLIENT_ACK).await;
            for _ in 0..4 {
                self.send(port, msg::CLIENT_TO_SERVER_ACK, &[0; 17]).await;
            }
            self.wait_for(msg::SERVER_STATUS).await;
        }
    }

    async fn session_on(
        server: Arc<Server>,
        router: Arc<ActionRouter>,
        config: &Config,
    ) -> (Arc<ClientHandler>, TestClient, tokio::task::JoinHandle<()>) {
        let client = TestClient::new().await;
        let (user, events) = server
            .new_connection(client.socket.local_addr().unwrap(), "0.83")
            .await
            .unwrap();
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let handler = Arc::new(
            ClientHandler::new(
                socket,
                "127.0.0.1".parse().unwrap(),
                user,
                server,
                router,
                config,
            )
            .unwrap(),
        );
        let task = tokio::spawn({
            let handler = handler.clone();
            async move { handler.run(events).await }
        });
        (handler, client, task)
    }

    async fn session(config: Config) -> (Arc<ClientHandler>, TestClient, tokio::task::JoinHandle<()>) {
        let server = Arc::new(Server::new(&config));
        let router = Arc::new(ActionRouter::with_defaults().unwrap());
        session_on(server, router, &config).await
    }

    struct Player {
        handler: Arc<ClientHandler>,
        client: TestClient,
        task: tokio::task::JoinHandle<()>,
    }

    impl Player {
        fn port(&self) -> u16 {
            self.handler.port()
        }

        async fn send(&mut self, message_type: u8, body: &[u8]) {
            let port = self.port();
            self.client.send(port, message_type, body).await;
        }

        async fn finish(self) {
            self.handler.stop();
            self.task.await.unwrap();
        }
    }

    fn game_data_body(data: &[u8]) -> Vec<u8> {
        let mut body = vec![0u8];
        body.extend_from_slice(&(data.len() as u16).to_le_bytes());
        body.extend_from_slice(data);
        body
    }

    /// Two logged-in sessions on one server whose game has reached Playing.
    /// `before_ready` runs once both have seen the start notification.
    async fn playing_pair(before_ready: impl FnOnce(&Player, &Player)) -> (Player, Player, u32) {
        let config = Config::default();
        let server = Arc::new(Server::new(&config));
        let router = Arc::new(ActionRouter::with_defaults().unwrap());
        let mut players = Vec::new();
        for name in ["p1", "p2"] {
            let (handler, client, task) = session_on(server.clone(), router.clone(), &config).await;
            let mut player = Player {
                handler,
                client,
                task,
            };
            let port = player.port();
            player.client.log_in(port, name).await;
            players.push(player);
        }
        let mut p2 = players.pop().unwrap();
        let mut p1 = players.pop().unwrap();

        p1.send(msg::CREATE_GAME, b"\0kof\0\0\xff\xff\xff\xff").await;
        let created = p2.client.wait_for(msg::CREATE_GAME).await;
        let game_id = u32::from_le_bytes(created[created.len() - 4..].try_into().unwrap());

        let mut join = vec![0u8];
        join.extend_from_slice(&game_id.to_le_bytes());
        join.extend_from_slice(&[0, 0, 0, 0, 0, 0xff, 0xff, 1]);
        p2.send(msg::JOIN_GAME, &join).await;
        p2.client.wait_for(msg::JOIN_GAME).await;

        p1.send(msg::START_GAME, &[0, 0xff, 0xff, 0xff, 0xff]).await;
        p1.client.wait_for(msg::START_GAME).await;
        p2.client.wait_for(msg::START_GAME).await;
        before_ready(&p1, &p2);

        p1.send(msg::READY_TO_PLAY, &[0]).await;
        p2.send(msg::READY_TO_PLAY, &[0]).await;
        p1.client.wait_for(msg::READY_TO_PLAY).await;
        p2.client.wait_for(msg::READY_TO_PLAY).await;
        (p1, p2, game_id)
    }

    fn login_body() -> Vec<u8> {
        let mut body = BytesMut::new();
        body.put_slice(b"tester\0emu\0");
        body.put_u8(1);
        body.to_vec()
    }

    #[tokio::test]
    async fn test_login_gets_server_ack() {
        let (handler, mut client, task) = session(Config::default()).await;
        client
            .send(handler.port(), msg::USER_LOGIN, &login_body())
            .await;

        let bundle = client.recv().await;
        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.messages[0].message_type, msg::SERVER_TO_CLIENT_ACK);
        assert_eq!(handler.user().name(), "tester");
        assert_eq!(handler.remote_addr(), Some(client.socket.local_addr().unwrap()));

        handler.stop();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_speed_test_completes_login() {
        let (handler, mut client, task) = session(Config::default()).await;
        client
            .send(handler.port(), msg::USER_LOGIN, &login_body())
            .await;
        client.recv().await;

        for _ in 0..4 {
            client
                .send(handler.port(), msg::CLIENT_TO_SERVER_ACK, &[0, 0, 0, 0, 0])
                .await;
        }

        let mut types = Vec::new();
        while !types.contains(&msg::SERVER_STATUS) {
            let bundle = client.recv().await;
            types.extend(bundle.oldest_first().map(|m| m.message_type));
        }
        assert!(handler.user().is_logged_in());
        assert_eq!(handler.speed_measurement_count(), 4);

        handler.stop();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_keepalive_timeout_ends_session() {
        let mut config = Config::default();
        config.server.keepalive_timeout_secs = 1;
        let (handler, _client, task) = session(config).await;

        tokio::time::timeout(Duration::from_secs(3), task)
            .await
            .unwrap()
            .unwrap();
        assert!(handler.is_stopped());
        assert!(handler.server().user(handler.user_id()).await.is_none());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (handler, _client, task) = session(Config::default()).await;
        handler.stop();
        handler.stop();
        task.await.unwrap();
        assert!(handler.is_stopped());
    }

    #[tokio::test]
    async fn test_speed_measurements() {
        let (handler, _client, task) = session(Config::default()).await;
        handler.start_speed_test();
        assert_eq!(handler.speed_measurement_count(), 0);
        assert_eq!(handler.average_network_speed(), Duration::ZERO);
        handler.add_speed_measurement();
        handler.add_speed_measurement();
        assert_eq!(handler.speed_measurement_count(), 2);
        assert!(handler.best_network_speed() <= handler.average_network_speed() * 2);

        handler.stop();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_caches_reset() {
        let (handler, _client, task) = session(Config::default()).await;
        handler.client_cache().add(Bytes::from_static(b"abc"));
        handler.server_cache().add(Bytes::from_static(b"def"));
        handler.reset_game_data_cache();
        assert!(handler.client_cache().is_empty());
        assert!(handler.server_cache().is_empty());

        handler.stop();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_bundle_triggers_rate_limited_resend() {
        let (handler, mut client, task) = session(Config::default()).await;
        let port = handler.port();
        client.log_in(port, "tester").await;
        client.drain().await;

        // first retry: three messages; an immediate second retry is skipped
        client.send_stale(port).await;
        client.send_stale(port).await;
        let resent = client.recv_raw(Duration::from_secs(2)).await.unwrap();
        assert_eq!(resent.len(), 3);
        assert!(client.recv_raw(Duration::from_millis(150)).await.is_none());

        // once max_ping has passed the third retry resends the whole ring
        tokio::time::sleep(handler.max_ping).await;
        client.send_stale(port).await;
        let resent = client.recv_raw(Duration::from_secs(2)).await.unwrap();
        assert_eq!(resent.len(), 5);
        let seqs: Vec<u16> = resent.messages.iter().map(|m| m.seq).collect();
        assert!(seqs.windows(2).all(|w| w[0] == w[1].wrapping_add(1)));

        // new input resets the retry count
        client.send(port, msg::CLIENT_KEEP_ALIVE, &[0]).await;
        tokio::time::sleep(handler.max_ping).await;
        client.drain().await;
        client.send_stale(port).await;
        assert_eq!(client.recv_raw(Duration::from_secs(2)).await.unwrap().len(), 3);

        handler.stop();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_sequence_gap_desynchs_player() {
        let (mut p1, mut p2, game_id) = playing_pair(|_, _| {}).await;
        let game = p1.handler.server().game(game_id).await.unwrap();
        assert!(game.is_synched());

        let port = p2.port();
        p2.client.send_with_gap(port).await;

        let notice = p1.client.wait_for(msg::GAME_CHAT).await;
        assert_eq!(notice.as_ref(), b"Server\0p2 desynched: dropped a packet\0");
        assert!(!game.is_synched());
        assert!(!p2.handler.is_stopped());

        p1.finish().await;
        p2.finish().await;
    }

    #[tokio::test]
    async fn test_game_data_cache_round_trip() {
        let (mut p1, mut p2, _) = playing_pair(|p1, _| {
            // leftovers from an earlier match must not survive AllReady
            p1.handler.client_cache().add(Bytes::from_static(b"old"));
            p1.handler
                .server_cache()
                .add(Bytes::from_static(&[1, 2, 3, 4]));
        })
        .await;
        assert!(p1.handler.client_cache().is_empty());
        assert!(p1.handler.server_cache().is_empty());

        p1.send(msg::GAME_DATA, &game_data_body(&[1, 2])).await;
        p2.send(msg::GAME_DATA, &game_data_body(&[3, 4])).await;
        for player in [&mut p1, &mut p2] {
            assert_eq!(
                player.client.next_frame().await,
                (msg::GAME_DATA, vec![0, 4, 0, 1, 2, 3, 4])
            );
        }

        // the same merged frame again goes out as its cache key
        p1.send(msg::GAME_DATA, &game_data_body(&[1, 2])).await;
        p2.send(msg::GAME_DATA, &game_data_body(&[3, 4])).await;
        for player in [&mut p1, &mut p2] {
            assert_eq!(player.client.next_frame().await, (msg::GAME_CACHE, vec![0, 0]));
        }

        // p1 refers back to its first input by key
        p1.send(msg::GAME_CACHE, &[0, 0]).await;
        p2.send(msg::GAME_DATA, &game_data_body(&[5, 6])).await;
        for player in [&mut p1, &mut p2] {
            assert_eq!(
                player.client.next_frame().await,
                (msg::GAME_DATA, vec![0, 4, 0, 1, 2, 5, 6])
            );
        }

        // an unknown key is dropped without ending the session
        p1.send(msg::GAME_CACHE, &[0, 200]).await;
        p1.send(msg::GAME_DATA, &game_data_body(&[7, 8])).await;
        p2.send(msg::GAME_DATA, &game_data_body(&[9, 9])).await;
        for player in [&mut p1, &mut p2] {
            assert_eq!(
                player.client.next_frame().await,
                (msg::GAME_DATA, vec![0, 4, 0, 7, 8, 9, 9])
            );
        }
        assert!(!p1.handler.is_stopped());
        assert_eq!(p1.handler.client_cache().len(), 3);

        p1.finish().await;
        p2.finish().await;
    }
}
