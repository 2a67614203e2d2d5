use serde::{Deserialize, Serialize};

use crate::Result;
use crate::units::DisplayUnit;

/// Closed tag set for overlay-directed messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    RadarDisplay,
    ControllerDisplay,
    Units,
    SpeedReading,
}

/// Generic `{type, data}` envelope. Exactly two top-level fields, no
/// versioning, no length prefix.
#[derive(Debug, Serialize)]
pub struct OverlayEnvelope<'a, T: Serialize> {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub data: &'a T,
}

pub fn encode_envelope<T: Serialize>(kind: MessageType, data: &T) -> Result<String> {
    Ok(serde_json::to_string(&OverlayEnvelope { kind, data })?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityPayload {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitsPayload {
    pub label: String,
}

impl From<DisplayUnit> for UnitsPayload {
    fn from(unit: DisplayUnit) -> Self {
        Self {
            label: unit.label().to_string(),
        }
    }
}

/// Speeds already expressed in the display unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedReadingPayload {
    pub patrol: f32,
    pub target: Option<f32>,
    pub fast: Option<f32>,
}

/// Typed overlay messages, one variant per [`MessageType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum OverlayMessage {
    RadarDisplay(VisibilityPayload),
    ControllerDisplay(VisibilityPayload),
    Units(UnitsPayload),
    SpeedReading(SpeedReadingPayload),
}

impl OverlayMessage {
    pub fn kind(&self) -> MessageType {
        match self {
            OverlayMessage::RadarDisplay(_) => MessageType::RadarDisplay,
            OverlayMessage::ControllerDisplay(_) => MessageType::ControllerDisplay,
            OverlayMessage::Units(_) => MessageType::Units,
            OverlayMessage::SpeedReading(_) => MessageType::SpeedReading,
        }
    }

    pub fn radar_display(visible: bool) -> Self {
        OverlayMessage::RadarDisplay(VisibilityPayload { visible })
    }

    pub fn controller_display(visible: bool) -> Self {
        OverlayMessage::ControllerDisplay(VisibilityPayload { visible })
    }
}
