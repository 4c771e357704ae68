//! JSON wire format between the bridge and the board controller.
//!
//! Inbound frames carry a sensor snapshot, either bare
//! (`{"MCP1": {"PA": {"PA0": 1, ..}, ..}, ..}`) or wrapped in a
//! `{"type": "reed_state", "event": .., "data": ..}` envelope. Outbound frames
//! carry the LED list and a status line, one JSON object per line.

pub mod framing;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{CellAddress, LedColor, SensorSnapshot};

/// Envelope `type` for sensor frames.
pub const REED_STATE_TYPE: &str = "reed_state";

/// Why the controller sent a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Periodic keep-alive carrying the current state.
    Heartbeat,
    /// Controller switched its own operating phase.
    PhaseChange,
    /// At least one reed switch changed.
    ReedChange,
    /// Bare snapshot, or a tag this bridge does not know.
    Unspecified,
}

impl FrameEvent {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("heartbeat") => FrameEvent::Heartbeat,
            Some("phase_change") => FrameEvent::PhaseChange,
            Some("reed_change") => FrameEvent::ReedChange,
            _ => FrameEvent::Unspecified,
        }
    }

    pub fn tag(self) -> Option<&'static str> {
        match self {
            FrameEvent::Heartbeat => Some("heartbeat"),
            FrameEvent::PhaseChange => Some("phase_change"),
            FrameEvent::ReedChange => Some("reed_change"),
            FrameEvent::Unspecified => None,
        }
    }
}

/// A decoded sensor frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundFrame {
    pub event: FrameEvent,
    pub snapshot: SensorSnapshot,
}

impl InboundFrame {
    pub fn new(event: FrameEvent, snapshot: SensorSnapshot) -> Self {
        Self { event, snapshot }
    }

    pub fn bare(snapshot: SensorSnapshot) -> Self {
        Self::new(FrameEvent::Unspecified, snapshot)
    }

    /// Encode the way the board controller does: bare for untagged frames,
    /// enveloped otherwise.
    pub fn to_json(&self) -> Value {
        let data = snapshot_to_json(&self.snapshot);
        match self.event.tag() {
            None => data,
            Some(tag) => serde_json::json!({
                "type": REED_STATE_TYPE,
                "event": tag,
                "data": data,
            }),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_json().to_string().into_bytes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedWire {
    pub led: u8,
    pub color: LedColor,
    pub blink: bool,
}

/// Response sent back to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundFrame {
    pub leds: Vec<LedWire>,
    pub status: String,
}

impl OutboundFrame {
    /// JSON followed by a newline.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut bytes =
            serde_json::to_vec(self).map_err(|e| ProtocolError::Json(e.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::Json(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Not valid JSON, or JSON of the wrong shape.
    Json(String),
    /// Top-level value, chip or port entry is not an object.
    NotAnObject(String),
    /// Envelope `type` other than `reed_state`.
    UnsupportedType(String),
    /// Pin value other than 0, 1, true or false.
    InvalidPinValue { pin: String, value: String },
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::Json(e) => write!(f, "JSON error: {}", e),
            ProtocolError::NotAnObject(what) => write!(f, "Expected an object for {}", what),
            ProtocolError::UnsupportedType(kind) => write!(f, "Unsupported frame type {:?}", kind),
            ProtocolError::InvalidPinValue { pin, value } => {
                write!(f, "Invalid value {} for pin {}", value, pin)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    event: Option<String>,
    data: Map<String, Value>,
}

/// Decode one complete frame as cut by [`framing::FrameBuffer`].
pub fn decode_frame(bytes: &[u8]) -> Result<InboundFrame, ProtocolError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::Json(e.to_string()))?;
    if !value.is_object() {
        return Err(ProtocolError::NotAnObject("frame".to_string()));
    }
    if value.get("type").is_some() {
        let envelope: Envelope =
            serde_json::from_value(value).map_err(|e| ProtocolError::Json(e.to_string()))?;
        if envelope.kind != REED_STATE_TYPE {
            return Err(ProtocolError::UnsupportedType(envelope.kind));
        }
        let snapshot = parse_snapshot(&envelope.data)?;
        Ok(InboundFrame::new(
            FrameEvent::from_tag(envelope.event.as_deref()),
            snapshot,
        ))
    } else {
        let data = value
            .as_object()
            .ok_or_else(|| ProtocolError::NotAnObject("frame".to_string()))?;
        Ok(InboundFrame::bare(parse_snapshot(data)?))
    }
}

fn parse_snapshot(data: &Map<String, Value>) -> Result<SensorSnapshot, ProtocolError> {
    let mut snapshot = SensorSnapshot::empty();
    for (chip, ports) in data {
        let ports = ports
            .as_object()
            .ok_or_else(|| ProtocolError::NotAnObject(format!("chip {}", chip)))?;
        for (port, pins) in ports {
            let pins = pins
                .as_object()
                .ok_or_else(|| ProtocolError::NotAnObject(format!("port {}/{}", chip, port)))?;
            for (pin, value) in pins {
                let occupied = match value {
                    Value::Bool(flag) => *flag,
                    Value::Number(n) if n.as_u64() == Some(0) => false,
                    Value::Number(n) if n.as_u64() == Some(1) => true,
                    other => {
                        return Err(ProtocolError::InvalidPinValue {
                            pin: format!("{}/{}/{}", chip, port, pin),
                            value: other.to_string(),
                        })
                    }
                };
                match CellAddress::parse(chip, port, pin) {
                    Ok(cell) => snapshot.set(cell, occupied),
                    Err(e) => debug!("Ignoring unwired cell {}/{}/{}: {}", chip, port, pin, e),
                }
            }
        }
    }
    Ok(snapshot)
}

fn snapshot_to_json(snapshot: &SensorSnapshot) -> Value {
    let mut chips = Map::new();
    for (cell, occupied) in snapshot.cells() {
        let ports = chips
            .entry(cell.chip_name())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(ports) = ports {
            let pins = ports
                .entry(cell.port().name().to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(pins) = pins {
                pins.insert(cell.pin_name(), Value::from(u8::from(occupied)));
            }
        }
    }
    Value::Object(chips)
}
