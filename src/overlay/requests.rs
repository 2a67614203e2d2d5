use serde::Deserialize;

use crate::{CoreError, Result};

/// Requests posted back by the overlay panel, decoded from the same
/// `{type, data}` envelope used outbound.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum OverlayRequest {
    ShowKeyboard {
        limit: u32,
        #[serde(default)]
        text: String,
    },
    SetRadarEnabled {
        enabled: bool,
    },
}

pub fn decode_request(body: &str) -> Result<OverlayRequest> {
    serde_json::from_str(body).map_err(|err| CoreError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_keyboard_request_with_default_text() {
        let request = decode_request(r#"{"type":"showKeyboard","data":{"limit":8}}"#).unwrap();
        assert_eq!(
            request,
            OverlayRequest::ShowKeyboard {
                limit: 8,
                text: String::new()
            }
        );
    }

    #[test]
    fn decodes_radar_power() {
        let request =
            decode_request(r#"{"type":"setRadarEnabled","data":{"enabled":true}}"#).unwrap();
        assert_eq!(request, OverlayRequest::SetRadarEnabled { enabled: true });
    }

    #[test]
    fn unknown_type_is_decode_error() {
        let err = decode_request(r#"{"type":"selfDestruct","data":{}}"#).unwrap_err();
        assert!(matches!(err, CoreError::Decode(_)));
    }
}
