//! Opaque structured documents (`meta` and `data` fields).
//!
//! The store never looks inside these values. They are serialized with
//! MessagePack into binary columns and handed back verbatim.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// The default document: an empty object.
pub fn empty() -> Value {
    Value::Object(Map::new())
}

pub(crate) fn encode(document: &Value) -> Result<Vec<u8>> {
    rmp_serde::to_vec(document).map_err(|e| Error::Encode(e.to_string()))
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Value> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_documents_survive_storage_encoding() {
        let doc = json!({
            "roles": ["admin", "billing"],
            "limits": { "rps": 50, "burst": -3, "ratio": 0.25 },
            "note": null,
        });
        assert_eq!(decode(&encode(&doc).unwrap()).unwrap(), doc);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(decode(&[0xc1]), Err(Error::Decode(_))));
    }
}
