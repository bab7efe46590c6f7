//! Shape-tolerant decoding of response bodies.
//!
//! The backend is not consistent about how it returns collections: some
//! deployments send a bare array, some wrap it as `{"data": [...]}`, and some
//! send a single object when there is only one record. List decoding tries
//! each shape in that order and only fails when none of them fits.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

const ENVELOPE_KEY: &str = "data";

/// Decode a collection response into a list of records.
///
/// An empty (or whitespace-only) body is an empty list. On total failure the
/// error carries the detail of the bare-array attempt.
pub fn decode_list<R: DeserializeOwned>(body: &[u8]) -> Result<Vec<R>, ApiError> {
    if is_blank(body) {
        return Ok(Vec::new());
    }

    let array_err = match serde_json::from_slice::<Vec<R>>(body) {
        Ok(records) => return Ok(records),
        Err(e) => e,
    };

    if let Some(records) = decode_envelope(body) {
        debug!(count = records.len(), "decoded enveloped list");
        return Ok(records);
    }

    if let Ok(record) = serde_json::from_slice::<R>(body) {
        debug!("decoded single object as one-element list");
        return Ok(vec![record]);
    }

    Err(ApiError::DecodingError(array_err.to_string()))
}

/// Decode a body that must hold exactly one record.
pub fn decode_one<R: DeserializeOwned>(body: &[u8]) -> Result<R, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::DecodingError(e.to_string()))
}

/// Decode the reply to a create request. A server that accepts the record
/// without echoing it back sends an empty body; the submitted record is
/// returned unchanged in that case.
pub fn decode_created<R: DeserializeOwned>(body: &[u8], submitted: R) -> Result<R, ApiError> {
    if is_blank(body) {
        debug!("empty create response, keeping submitted record");
        return Ok(submitted);
    }
    decode_one(body)
}

fn decode_envelope<R: DeserializeOwned>(body: &[u8]) -> Option<Vec<R>> {
    let Value::Object(mut object) = serde_json::from_slice::<Value>(body).ok()? else {
        return None;
    };
    let data = object.remove(ENVELOPE_KEY)?;
    if !data.is_array() {
        return None;
    }
    serde_json::from_value(data).ok()
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn empty_body_is_empty_list() {
        assert!(decode_list::<Item>(b"").unwrap().is_empty());
        assert!(decode_list::<Item>(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn bare_array_keeps_order() {
        let items: Vec<Item> = decode_list(br#"[{"id":"b"},{"id":"a"},{"id":"c"}]"#).unwrap();
        assert_eq!(ids(&items), ["b", "a", "c"]);
    }

    #[test]
    fn envelope_matches_bare_array() {
        let bare: Vec<Item> = decode_list(br#"[{"id":"1"},{"id":"2"}]"#).unwrap();
        let wrapped: Vec<Item> =
            decode_list(br#"{"data":[{"id":"1"},{"id":"2"}],"total":2}"#).unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn single_object_becomes_one_element_list() {
        let items: Vec<Item> = decode_list(br#"{"id":"only"}"#).unwrap();
        assert_eq!(ids(&items), ["only"]);
    }

    #[test]
    fn envelope_with_non_array_data_falls_through_to_single_object() {
        let items: Vec<Item> = decode_list(br#"{"id":"x","data":{"id":"y"}}"#).unwrap();
        assert_eq!(ids(&items), ["x"]);
    }

    #[test]
    fn unrecognised_shapes_are_decoding_errors() {
        let bodies: [&[u8]; 4] = [
            b"not json",
            br#"{"message":"ok"}"#,
            br#"[{"name":"no id"}]"#,
            b"42",
        ];
        for body in bodies {
            let err = decode_list::<Item>(body).unwrap_err();
            assert!(matches!(err, ApiError::DecodingError(_)), "{err:?}");
        }
    }

    #[test]
    fn decoding_error_reports_array_attempt() {
        let err = decode_list::<Item>(br#"{"message":"ok"}"#).unwrap_err();
        let ApiError::DecodingError(detail) = err else {
            panic!("expected DecodingError");
        };
        assert!(detail.contains("sequence"), "{detail}");
    }

    #[test]
    fn created_with_empty_body_returns_submitted() {
        let submitted = Item { id: "local".into() };
        let created = decode_created(b"", submitted).unwrap();
        assert_eq!(created.id, "local");
    }

    #[test]
    fn created_with_body_returns_server_record() {
        let created = decode_created(br#"{"id":"srv"}"#, Item { id: "local".into() }).unwrap();
        assert_eq!(created.id, "srv");
    }

    #[test]
    fn decode_one_rejects_arrays() {
        assert!(matches!(
            decode_one::<Item>(br#"[{"id":"1"}]"#).unwrap_err(),
            ApiError::DecodingError(_)
        ));
    }
}
