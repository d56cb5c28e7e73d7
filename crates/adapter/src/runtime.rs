//! Adapter runtime integration.
//!
//! The game loop is synchronous and owns the session; the server runs on a
//! small tokio runtime of its own. The two only share channels: commands flow
//! in through a bounded queue (its depth is the backpressure limit) and
//! replies flow out through an unbounded one.

use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::protocol::{AckMessage, ClientCommand, ObservationMessage};
use crate::server::{run_server, ServerConfig};

/// Work handed to the game loop by a connection task.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    /// Validated controller command; answer with an ack once applied.
    Command(ClientCommand),
    /// A client finished its handshake and wants the current state.
    SnapshotRequest,
}

/// Reply from the game loop, routed by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
}

/// A running server and the game loop's ends of its channels.
///
/// Dropping it shuts the runtime down and closes every connection.
pub struct Adapter {
    _runtime: Runtime,
    inbound: mpsc::Receiver<InboundCommand>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start with [`ServerConfig::from_env`] and the given board size.
    ///
    /// `Ok(None)` when `COLOR_CONNECT_AI_DISABLED` is set.
    pub fn start_from_env(rows: u8, cols: u8) -> anyhow::Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            info!("adapter disabled via COLOR_CONNECT_AI_DISABLED");
            return Ok(None);
        }
        let config = ServerConfig {
            rows,
            cols,
            ..ServerConfig::from_env()
        };
        Self::start(config).map(Some)
    }

    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        // Fail fast on a bad address instead of inside the background task.
        config.socket_addr()?;

        let (command_tx, inbound) = mpsc::channel(config.max_pending_commands.max(1));
        let (outbound, out_rx) = mpsc::unbounded_channel();

        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("color-connect-adapter")
            .enable_all()
            .build()?;
        runtime.spawn(async move {
            if let Err(e) = run_server(config, command_tx, out_rx, None).await {
                warn!(error = %e, "adapter stopped");
            }
        });

        Ok(Self {
            _runtime: runtime,
            inbound,
            outbound,
        })
    }

    /// Next queued command, without blocking.
    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.inbound.try_recv().ok()
    }

    /// Queue a reply; silently dropped once the server has stopped.
    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.outbound.send(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_address_fails_before_spawning() {
        let config = ServerConfig {
            host: "nowhere at all".to_string(),
            ..ServerConfig::default()
        };
        assert!(Adapter::start(config).is_err());
    }

    #[test]
    fn started_adapter_has_empty_queue() {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        let mut adapter = Adapter::start(config).unwrap();
        assert!(adapter.try_recv().is_none());
        adapter.send(OutboundMessage::ToClientAck {
            client_id: 1,
            ack: crate::protocol::create_ack(1, false),
        });
    }
}
