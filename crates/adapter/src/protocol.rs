//! Protocol module - JSON message types for the remote adapter
//!
//! Every message is one JSON object per line and carries `type` and `seq`.
//! `ts` (milliseconds since the epoch) is stamped on server messages and
//! optional on client messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use color_connect_core::SessionSnapshot;
use color_connect_types::{PointerEvent, Position};

/// Game id announced in `welcome`.
pub const GAME_ID: &str = "color-connect";

/// Lower-case wire keyword enum, matched case-insensitively on input.
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident ($what:literal) { $($variant:ident => $word:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $word),+
                }
            }

            pub fn from_word(word: &str) -> Option<Self> {
                [$(Self::$variant),+]
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(word))
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let word = String::deserialize(deserializer)?;
                Self::from_word(&word).ok_or_else(|| {
                    serde::de::Error::custom(format!(concat!("unknown ", $what, " {:?}"), word))
                })
            }
        }
    };
}

keyword_enum! {
    /// Pointer phase carried by a command.
    PointerKind("pointer kind") {
        Down => "down",
        Enter => "enter",
        Up => "up",
    }
}

keyword_enum! {
    /// Round-level action carried by a command.
    ActionName("action") {
        Start => "start",
        Restart => "restart",
        Abandon => "abandon",
    }
}

// Client -> game

/// Messages a client may send, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
}

/// First message on a connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// Command message. Exactly one of `pointer` or `action` must be set; `row`
/// and `col` go with `down` and `enter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<PointerKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionName>,
}

// Game -> client

/// Messages the server writes, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    InvalidCommand,
    Backpressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignedRole {
    Controller,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    Ok,
}

/// Reply to `hello`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    pub game_id: String,
    pub rows: u8,
    pub cols: u8,
}

/// Sent by the game loop once a command has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    /// Whether the command changed the round.
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Round state, sent to every handshaken client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationMessage {
    pub seq: u64,
    pub ts: u64,
    pub session_id: u32,
    /// `notStarted`, `active` or `gameOver`.
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub score: u32,
    pub time_remaining: i32,
    pub suspended: bool,
    pub board: BoardSnapshot,
    /// Active drag as `[row, col]` pairs, in drag order.
    pub chain: Vec<[u8; 2]>,
    /// Cells dissolving before the next cascade.
    pub clearing: Vec<[u8; 2]>,
}

/// Board as color codes: 0 empty, 1 yellow, 2 red, 3 blue, 4 white, 5 black, 6 green.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: u8,
    pub cols: u8,
    pub cells: Vec<Vec<u8>>,
    pub bombs: Vec<Vec<bool>>,
}

/// One decoded input line.
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Client(ClientMessage),
    /// Well-formed JSON with a `type` the server does not handle.
    Unknown { seq: u64 },
}

/// Decode one line.
///
/// Invalid JSON, or a known `type` with bad fields, is an error; an unknown
/// `type` is not.
pub fn parse_message(line: &str) -> Result<ParsedMessage, serde_json::Error> {
    let value: Value = serde_json::from_str(line)?;
    let known = matches!(
        value.get("type").and_then(Value::as_str),
        Some("hello" | "command")
    );
    if !known {
        return Ok(ParsedMessage::Unknown { seq: seq_of(&value) });
    }
    serde_json::from_value(value).map(ParsedMessage::Client)
}

/// Best-effort `seq` of a line that failed to parse, for the error reply.
pub fn salvage_seq(line: &str) -> u64 {
    serde_json::from_str::<Value>(line)
        .map(|v| seq_of(&v))
        .unwrap_or(0)
}

fn seq_of(value: &Value) -> u64 {
    value.get("seq").and_then(Value::as_u64).unwrap_or(0)
}

/// What a validated command asks the game loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Pointer(PointerEvent),
    Action(ActionName),
}

/// Validate a command's fields into a [`ClientCommand`].
pub fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, String> {
    let kind = match (cmd.pointer, cmd.action) {
        (None, Some(action)) => return Ok(ClientCommand::Action(action)),
        (Some(_), Some(_)) => return Err("command has both pointer and action".to_string()),
        (None, None) => return Err("command needs a pointer or an action".to_string()),
        (Some(kind), None) => kind,
    };
    let pos = match (cmd.row, cmd.col) {
        (Some(row), Some(col)) => Some(Position::new(row, col)),
        (None, None) => None,
        _ => return Err("row and col must be given together".to_string()),
    };
    PointerEvent::from_parts(kind.as_str(), pos)
        .map(ClientCommand::Pointer)
        .ok_or_else(|| format!("pointer {} needs row and col", kind.as_str()))
}

pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> ClientMessage {
    ClientMessage::Hello(HelloMessage {
        seq,
        ts: now_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
    })
}

pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    rows: u8,
    cols: u8,
) -> WelcomeMessage {
    WelcomeMessage {
        seq,
        ts: now_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        game_id: GAME_ID.to_string(),
        rows,
        cols,
    }
}

pub fn create_ack(seq: u64, applied: bool) -> AckMessage {
    AckMessage {
        seq,
        ts: now_ms(),
        status: AckStatus::Ok,
        applied,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: impl Into<String>) -> ErrorMessage {
    ErrorMessage {
        seq,
        ts: now_ms(),
        code,
        message: message.into(),
    }
}

fn pairs(positions: &[Position]) -> Vec<[u8; 2]> {
    positions.iter().map(|p| [p.row, p.col]).collect()
}

/// Observation of `snap`, stamped with the game loop's observation counter.
pub fn build_observation(snap: &SessionSnapshot, seq: u64) -> ObservationMessage {
    ObservationMessage {
        seq,
        ts: now_ms(),
        session_id: snap.session_id,
        phase: snap.phase.as_str().to_string(),
        reason: snap.game_over_reason.map(|r| r.as_str().to_string()),
        score: snap.score,
        time_remaining: snap.time_remaining,
        suspended: snap.suspended,
        board: BoardSnapshot {
            rows: snap.grid.rows(),
            cols: snap.grid.cols(),
            cells: snap.color_codes(),
            bombs: snap.bomb_flags(),
        },
        chain: pairs(&snap.active_chain),
        clearing: pairs(&snap.clearing),
    }
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_connect_core::{EngineConfig, Grid, Session};

    fn command(json: &str) -> CommandMessage {
        match parse_message(json).unwrap() {
            ParsedMessage::Client(ClientMessage::Command(cmd)) => cmd,
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[test]
    fn hello_is_parsed_and_round_trips_its_tag() {
        let json = r#"{"type":"hello","seq":1,"client":{"name":"bot","version":"0.3"},"protocol_version":"1.0.0"}"#;
        let ParsedMessage::Client(ClientMessage::Hello(hello)) = parse_message(json).unwrap() else {
            panic!("expected hello");
        };
        assert_eq!(hello.seq, 1);
        assert_eq!(hello.ts, 0);
        assert_eq!(hello.client.name, "bot");

        let out = serde_json::to_value(create_hello(4, "bot", "1.2.0")).unwrap();
        assert_eq!(out["type"], "hello");
        assert_eq!(out["protocol_version"], "1.2.0");
    }

    #[test]
    fn pointer_words_ignore_case() {
        let cmd = command(r#"{"type":"command","seq":2,"pointer":"Down","row":3,"col":4}"#);
        assert_eq!(cmd.pointer, Some(PointerKind::Down));
        assert_eq!(
            map_command(&cmd),
            Ok(ClientCommand::Pointer(PointerEvent::Down(Position::new(3, 4))))
        );

        let cmd = command(r#"{"type":"command","seq":3,"action":"ABANDON"}"#);
        assert_eq!(map_command(&cmd), Ok(ClientCommand::Action(ActionName::Abandon)));
    }

    #[test]
    fn bad_fields_are_errors_unknown_types_are_not() {
        assert!(parse_message(r#"{"type":"command","seq":3,"action":"explode"}"#).is_err());
        assert!(parse_message("not json").is_err());
        assert!(matches!(
            parse_message(r#"{"type":"control","seq":9}"#).unwrap(),
            ParsedMessage::Unknown { seq: 9 }
        ));
        assert!(matches!(
            parse_message(r#"{"seq":2}"#).unwrap(),
            ParsedMessage::Unknown { seq: 2 }
        ));
        assert_eq!(salvage_seq(r#"{"type":"command","seq":12,"pointer":7}"#), 12);
        assert_eq!(salvage_seq("{"), 0);
    }

    #[test]
    fn map_command_rejects_bad_shapes() {
        let base = CommandMessage {
            seq: 1,
            ..CommandMessage::default()
        };
        assert!(map_command(&base).is_err());

        let both = CommandMessage {
            pointer: Some(PointerKind::Up),
            action: Some(ActionName::Abandon),
            ..base.clone()
        };
        assert!(map_command(&both).is_err());

        let missing_pos = CommandMessage {
            pointer: Some(PointerKind::Enter),
            ..base.clone()
        };
        assert!(map_command(&missing_pos).is_err());

        let half_pos = CommandMessage {
            pointer: Some(PointerKind::Down),
            row: Some(1),
            ..base.clone()
        };
        assert!(map_command(&half_pos).is_err());

        let up = CommandMessage {
            pointer: Some(PointerKind::Up),
            ..base
        };
        assert_eq!(map_command(&up), Ok(ClientCommand::Pointer(PointerEvent::Up)));
    }

    #[test]
    fn server_messages_carry_their_type() {
        let err = ServerMessage::Error(create_error(5, ErrorCode::NotController, "nope"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "not_controller");

        let welcome = ServerMessage::Welcome(create_welcome(1, "1.0.0", 3, AssignedRole::Observer, 8, 6));
        let json = serde_json::to_value(&welcome).unwrap();
        assert_eq!(json["type"], "welcome");
        assert_eq!(json["role"], "observer");
        assert_eq!(json["game_id"], GAME_ID);

        let ack = ServerMessage::Ack(create_ack(2, false));
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["applied"], false);
    }

    #[test]
    fn observation_from_snapshot() {
        let grid = Grid::parse(&["Rr", "BY"]).unwrap();
        let mut session = Session::with_grid(EngineConfig::default(), grid);
        session.start();
        session.pointer_down(Position::new(0, 0));
        session.pointer_enter(Position::new(0, 1));

        let obs = build_observation(&session.snapshot(), 7);
        assert_eq!(obs.seq, 7);
        assert_eq!(obs.phase, "active");
        assert_eq!(obs.reason, None);
        assert_eq!(obs.board.cells, vec![vec![2, 2], vec![3, 1]]);
        assert_eq!(obs.board.bombs[0], vec![false, true]);
        assert_eq!(obs.chain, vec![[0, 0], [0, 1]]);
        assert!(obs.clearing.is_empty());

        let json = serde_json::to_string(&ServerMessage::Observation(obs)).unwrap();
        assert!(json.contains(r#""type":"observation""#));
        assert!(!json.contains("reason"));
    }
}
