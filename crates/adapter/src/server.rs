//! TCP server for the remote adapter
//!
//! Accepts connections, runs the hello handshake, forwards controller
//! commands to the game loop and fans observations out to clients.
//!
//! All per-client bookkeeping lives in one [`Registry`] behind a single lock,
//! so role assignment and promotion never observe a half-updated client list.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::protocol::{
    create_error, create_welcome, map_command, parse_message, salvage_seq, AssignedRole,
    ClientMessage, CommandMessage, ErrorCode, ErrorMessage, HelloMessage, ObservationMessage,
    ParsedMessage, ServerMessage,
};
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};
use color_connect_types::{BOARD_COLS, BOARD_ROWS};

/// Major protocol version accepted in `hello`.
const PROTOCOL_MAJOR: &str = "1.";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    /// Depth of the command queue towards the game loop.
    pub max_pending_commands: usize,
    /// Board size announced in `welcome`.
    pub rows: u8,
    pub cols: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: "1.0.0".to_string(),
            max_pending_commands: 16,
            rows: BOARD_ROWS,
            cols: BOARD_COLS,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `COLOR_CONNECT_AI_HOST`, `COLOR_CONNECT_AI_PORT`
    /// and `COLOR_CONNECT_AI_MAX_PENDING`.
    pub fn from_env() -> Self {
        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok()?.trim().parse().ok()
        }

        let defaults = Self::default();
        Self {
            host: std::env::var("COLOR_CONNECT_AI_HOST").unwrap_or(defaults.host),
            port: parsed("COLOR_CONNECT_AI_PORT").unwrap_or(defaults.port),
            max_pending_commands: parsed("COLOR_CONNECT_AI_MAX_PENDING")
                .unwrap_or(defaults.max_pending_commands),
            ..defaults
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }

    /// `COLOR_CONNECT_AI_DISABLED` set to `1` or `true`.
    pub fn is_disabled() -> bool {
        std::env::var("COLOR_CONNECT_AI_DISABLED")
            .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    }
}

type ClientTx = mpsc::UnboundedSender<ServerMessage>;

struct ClientSlot {
    tx: ClientTx,
    /// Highest `seq` seen; `None` until the hello.
    last_seq: Option<u64>,
}

impl ClientSlot {
    fn handshaken(&self) -> bool {
        self.last_seq.is_some()
    }
}

/// Connected clients, keyed by id in connection order.
#[derive(Default)]
struct Registry {
    clients: BTreeMap<usize, ClientSlot>,
    controller: Option<usize>,
}

impl Registry {
    fn join(&mut self, id: usize, tx: ClientTx) {
        self.clients.insert(id, ClientSlot { tx, last_seq: None });
    }

    /// Record a hello and return the role it earns.
    fn admit(&mut self, id: usize, seq: u64) -> Result<AssignedRole, ErrorCode> {
        let slot = self.clients.get_mut(&id).ok_or(ErrorCode::InvalidCommand)?;
        if slot.last_seq.is_some_and(|last| seq <= last) {
            return Err(ErrorCode::InvalidCommand);
        }
        slot.last_seq = Some(seq);
        let controller = *self.controller.get_or_insert(id);
        Ok(if controller == id {
            AssignedRole::Controller
        } else {
            AssignedRole::Observer
        })
    }

    /// Check a command against handshake, ordering and role, in that order.
    ///
    /// The seq is consumed even when the sender turns out not to be controller.
    fn authorize(&mut self, id: usize, seq: u64) -> Result<(), (ErrorCode, &'static str)> {
        let slot = self
            .clients
            .get_mut(&id)
            .filter(|s| s.handshaken())
            .ok_or((ErrorCode::HandshakeRequired, "send hello before command"))?;
        if slot.last_seq.is_some_and(|last| seq <= last) {
            return Err((ErrorCode::InvalidCommand, "seq must be strictly increasing"));
        }
        slot.last_seq = Some(seq);
        if self.controller != Some(id) {
            return Err((ErrorCode::NotController, "only the controller may send commands"));
        }
        Ok(())
    }

    /// Drop a client. A departing controller hands over to the oldest
    /// handshaken client; returns the new controller when that happens.
    fn leave(&mut self, id: usize) -> Option<usize> {
        self.clients.remove(&id);
        if self.controller != Some(id) {
            return None;
        }
        self.controller = self
            .clients
            .iter()
            .find(|(_, slot)| slot.handshaken())
            .map(|(&id, _)| id);
        self.controller
    }

    fn send_to(&self, id: usize, msg: ServerMessage) {
        if let Some(slot) = self.clients.get(&id) {
            let _ = slot.tx.send(msg);
        }
    }

    fn broadcast(&self, obs: &ObservationMessage) {
        for slot in self.clients.values().filter(|s| s.handshaken()) {
            let _ = slot.tx.send(ServerMessage::Observation(obs.clone()));
        }
    }
}

struct Shared {
    config: ServerConfig,
    registry: Mutex<Registry>,
}

/// Run the TCP server until the listener fails.
///
/// `ready_tx` receives the bound address once the listener is up, which lets
/// tests bind port 0.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind adapter on {}", addr))?;
    let bound = listener.local_addr()?;
    info!(%bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let shared = Arc::new(Shared {
        config,
        registry: Mutex::new(Registry::default()),
    });
    tokio::spawn(dispatch_outbound(Arc::clone(&shared), out_rx));

    for client_id in 1.. {
        let (socket, peer) = listener.accept().await?;
        info!(client_id, %peer, "client connected");
        let shared = Arc::clone(&shared);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = serve_client(socket, client_id, &shared, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
    Ok(())
}

/// Route game-loop output to clients.
async fn dispatch_outbound(shared: Arc<Shared>, mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>) {
    while let Some(msg) = out_rx.recv().await {
        let registry = shared.registry.lock().await;
        match msg {
            OutboundMessage::ToClientAck { client_id, ack } => {
                registry.send_to(client_id, ServerMessage::Ack(ack))
            }
            OutboundMessage::ToClientObservation { client_id, obs } => {
                registry.send_to(client_id, ServerMessage::Observation(obs))
            }
            OutboundMessage::BroadcastObservation { obs } => registry.broadcast(&obs),
        }
    }
}

/// Whether the connection stays open after a line.
enum Flow {
    Continue,
    Close,
}

/// One connection: a writer task draining the client's queue, and this task
/// reading lines until EOF or a fatal protocol error.
async fn serve_client(
    socket: TcpStream,
    client_id: usize,
    shared: &Shared,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    shared.registry.lock().await.join(client_id, tx.clone());

    let writer_task = tokio::spawn(async move {
        let mut buf = Vec::with_capacity(1024);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if let Err(e) = serde_json::to_writer(&mut buf, &msg) {
                warn!(error = %e, "dropping unencodable message");
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
        }
    });

    let session = ClientSession {
        id: client_id,
        shared,
        tx,
        command_tx,
    };
    let mut lines = BufReader::new(reader).lines();
    let result = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(e) => break Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!(client_id, line, "recv");
        if let Flow::Close = session.on_line(line).await {
            break Ok(());
        }
    };

    // The writer ends once every sender is gone: ours here, the registry's on leave.
    drop(session);
    if let Some(next) = shared.registry.lock().await.leave(client_id) {
        info!(client_id = next, "controller promoted");
    }
    let _ = writer_task.await;
    result
}

struct ClientSession<'a> {
    id: usize,
    shared: &'a Shared,
    tx: ClientTx,
    command_tx: mpsc::Sender<InboundCommand>,
}

impl ClientSession<'_> {
    fn reply_error(&self, seq: u64, code: ErrorCode, message: impl Into<String>) {
        let err: ErrorMessage = create_error(seq, code, message);
        debug!(client_id = self.id, code = ?err.code, seq, "error reply");
        let _ = self.tx.send(ServerMessage::Error(err));
    }

    async fn on_line(&self, line: &str) -> Flow {
        match parse_message(line) {
            Ok(ParsedMessage::Client(ClientMessage::Hello(hello))) => self.on_hello(hello).await,
            Ok(ParsedMessage::Client(ClientMessage::Command(cmd))) => {
                self.on_command(cmd).await;
                Flow::Continue
            }
            Ok(ParsedMessage::Unknown { seq }) => {
                self.reply_error(seq, ErrorCode::InvalidCommand, "unknown message type");
                Flow::Continue
            }
            Err(e) => {
                self.reply_error(
                    salvage_seq(line),
                    ErrorCode::InvalidCommand,
                    format!("malformed message: {}", e),
                );
                Flow::Continue
            }
        }
    }

    async fn on_hello(&self, hello: HelloMessage) -> Flow {
        if !hello.protocol_version.starts_with(PROTOCOL_MAJOR) {
            self.reply_error(
                hello.seq,
                ErrorCode::ProtocolMismatch,
                format!("protocol version {} not supported", hello.protocol_version),
            );
            return Flow::Close;
        }

        let admitted = self.shared.registry.lock().await.admit(self.id, hello.seq);
        let role = match admitted {
            Ok(role) => role,
            Err(code) => {
                self.reply_error(hello.seq, code, "seq must be strictly increasing");
                return Flow::Continue;
            }
        };
        info!(client_id = self.id, name = %hello.client.name, ?role, "handshake");

        let config = &self.shared.config;
        let welcome = create_welcome(
            hello.seq,
            &config.protocol_version,
            self.id as u64,
            role,
            config.rows,
            config.cols,
        );
        let _ = self.tx.send(ServerMessage::Welcome(welcome));

        // The game loop answers with an observation for this client.
        let _ = self.command_tx.try_send(InboundCommand {
            client_id: self.id,
            seq: hello.seq,
            payload: InboundPayload::SnapshotRequest,
        });
        Flow::Continue
    }

    async fn on_command(&self, cmd: CommandMessage) {
        let authorized = self.shared.registry.lock().await.authorize(self.id, cmd.seq);
        if let Err((code, message)) = authorized {
            self.reply_error(cmd.seq, code, message);
            return;
        }
        let command = match map_command(&cmd) {
            Ok(command) => command,
            Err(message) => {
                self.reply_error(cmd.seq, ErrorCode::InvalidCommand, message);
                return;
            }
        };

        // The ack comes from the game loop once the command is applied.
        let inbound = InboundCommand {
            client_id: self.id,
            seq: cmd.seq,
            payload: InboundPayload::Command(command),
        };
        if self.command_tx.try_send(inbound).is_err() {
            self.reply_error(cmd.seq, ErrorCode::Backpressure, "command queue is full");
        }
    }
}
