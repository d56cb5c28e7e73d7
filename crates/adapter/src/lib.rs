//! Adapter module - remote play via TCP socket with JSON protocol
//!
//! This module lets an external agent (a bot, a test harness, a second
//! screen) watch the round and drive the pointer through a TCP socket.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller;
//!    when it leaves, the oldest remaining client takes over
//! 4. **Observation Streaming**: Every handshaken client receives an
//!    observation whenever the round changes
//! 5. **Commanding**: The controller sends pointer or round commands
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: `seq`, `client {name, version}`, `protocol_version` (major 1)
//! - **command**: `pointer` = `down` | `enter` | `up` with `row`/`col` for
//!   down and enter, or `action` = `start` | `restart` | `abandon`
//!
//! ## Server → Client
//!
//! - **welcome**: role (`controller` or `observer`) and board size
//! - **observation**: board color codes and bomb flags, active chain,
//!   clearing cells, score, time, phase and game over reason
//! - **ack**: command applied (`applied` tells whether it changed anything)
//! - **error**: `code` and `message`
//!
//! # Environment Variables
//!
//! - `COLOR_CONNECT_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `COLOR_CONNECT_AI_PORT`: Port number (default: 7878)
//! - `COLOR_CONNECT_AI_MAX_PENDING`: Command queue depth (default: 16)
//! - `COLOR_CONNECT_AI_DISABLED`: Set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000000,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"phase":"active","board":{...},"chain":[],...}
//! Client -> Server: {"type":"command","seq":2,"pointer":"down","row":7,"col":0}
//! Server -> Client: {"type":"ack","seq":2,"ts":1700000000010,"status":"ok","applied":true}
//! ```
//!
//! # Implementation
//!
//! - Uses **tokio** for async networking on a background runtime
//! - The game loop drains [`InboundCommand`]s and pushes [`OutboundMessage`]s
//!   through channels, so the session never leaves its thread

pub mod protocol;
pub mod runtime;
pub mod server;

pub use protocol::{build_observation, ClientCommand, ServerMessage};
pub use runtime::{Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{run_server, ServerConfig};
