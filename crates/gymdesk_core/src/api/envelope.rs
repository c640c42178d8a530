//! REST response envelope decoding.
//!
//! Every endpoint answers `{success, data?, message?, count?}`. A non-2xx
//! status or `success: false` is a failure carrying `message` when present.

use crate::repo::attendance_store::{StoreError, StoreResult, GENERIC_FAILURE_MESSAGE};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Response envelope shared by all endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Decodes a response body into the envelope's `data`.
///
/// # Errors
/// - `Status` for non-2xx responses, with the body's message if any.
/// - `Rejected` for `success: false`.
/// - `Decode` when a 2xx body does not match the envelope.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &[u8]) -> StoreResult<Option<T>> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        return Err(StoreError::Status {
            code: status,
            message,
        });
    }

    let envelope: ApiEnvelope<T> =
        serde_json::from_slice(body).map_err(|err| StoreError::Decode(err.to_string()))?;
    if !envelope.success {
        return Err(StoreError::Rejected(
            envelope
                .message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        ));
    }
    Ok(envelope.data)
}

/// Like `decode_envelope`, but a missing `data` is a decode failure.
pub fn decode_required<T: DeserializeOwned>(status: u16, body: &[u8]) -> StoreResult<T> {
    decode_envelope(status, body)?
        .ok_or_else(|| StoreError::Decode("response envelope has no data".to_string()))
}

#[cfg(test)]
mod tests {
    use super::{decode_envelope, decode_required};
    use crate::repo::attendance_store::StoreError;

    #[test]
    fn success_envelope_yields_data() {
        let body = br#"{"success":true,"data":[1,2,3],"count":3}"#;
        let data: Vec<u32> = decode_required(200, body).unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn success_false_is_rejected_with_message() {
        let body = br#"{"success":false,"message":"Date is required"}"#;
        let err = decode_envelope::<Vec<u32>>(200, body).unwrap_err();
        assert!(matches!(err, StoreError::Rejected(ref m) if m == "Date is required"));
        assert_eq!(err.user_message(), "Date is required");
    }

    #[test]
    fn non_2xx_uses_body_message_or_generic_text() {
        let err = decode_envelope::<()>(403, br#"{"message":"Not authorized"}"#).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Status { code: 403, ref message } if message == "Not authorized"
        ));

        let err = decode_envelope::<()>(502, b"<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.user_message(), "An error occurred");
    }

    #[test]
    fn missing_data_is_a_decode_error_only_when_required() {
        let body = br#"{"success":true}"#;
        assert_eq!(decode_envelope::<Vec<u32>>(200, body).unwrap(), None);
        assert!(matches!(
            decode_required::<Vec<u32>>(200, body).unwrap_err(),
            StoreError::Decode(_)
        ));
    }
}
