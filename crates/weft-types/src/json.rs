//! JSON debug mirror of the domain types.
//!
//! Not part of the wire protocol: this surface exists for logs, debugging
//! tools, and golden tests. Keys render as hex strings, blob bytes as hex
//! strings (JSON strings must be valid UTF-8, blobs need not be), values as
//! `{payload, pred}` objects, graphs as `{vertices, edges}`.
//!
//! Round-trip law: `from_json(to_json(x)) == x` for every domain type.

use serde_json::{json, Value as Json};

use crate::error::TypeError;
use crate::graph::Graph;
use crate::key::Key;
use crate::tag::Tag;
use crate::value::{Node, Payload, Value};

fn bad(detail: impl Into<String>) -> TypeError {
    TypeError::InvalidJson(detail.into())
}

fn as_str<'a>(json: &'a Json, what: &str) -> Result<&'a str, TypeError> {
    json.as_str().ok_or_else(|| bad(format!("{what}: expected a string")))
}

fn as_array<'a>(json: &'a Json, what: &str) -> Result<&'a [Json], TypeError> {
    json.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| bad(format!("{what}: expected an array")))
}

fn hex_bytes(json: &Json, what: &str) -> Result<Vec<u8>, TypeError> {
    hex::decode(as_str(json, what)?).map_err(|e| bad(format!("{what}: {e}")))
}

impl Key {
    /// Debug JSON form: a hex string.
    pub fn to_json(&self) -> Json {
        Json::String(self.to_hex())
    }

    /// Parse the debug JSON form.
    pub fn from_json(json: &Json) -> Result<Self, TypeError> {
        Key::from_hex(as_str(json, "key")?)
    }
}

impl Tag {
    /// Debug JSON form: the tag name.
    pub fn to_json(&self) -> Json {
        Json::String(self.as_str().to_string())
    }

    /// Parse the debug JSON form.
    pub fn from_json(json: &Json) -> Result<Self, TypeError> {
        Ok(Tag::new(as_str(json, "tag")?))
    }
}

impl Value {
    /// Debug JSON form: `{"payload": ..., "pred": [...]}`.
    pub fn to_json(&self) -> Json {
        let payload = match self.payload() {
            Payload::Blob(data) => json!({ "blob": hex::encode(data) }),
            Payload::Node(node) => json!({
                "node": {
                    "entries": node
                        .entries
                        .iter()
                        .map(|(label, key)| json!([label, key.to_hex()]))
                        .collect::<Vec<_>>(),
                    "content": node.content.as_ref().map(hex::encode),
                }
            }),
        };
        let pred: Vec<Json> = self.predecessors().iter().map(Key::to_json).collect();
        json!({ "payload": payload, "pred": pred })
    }

    /// Parse the debug JSON form.
    pub fn from_json(json: &Json) -> Result<Self, TypeError> {
        let payload_json = json
            .get("payload")
            .ok_or_else(|| bad("value: missing payload"))?;
        let payload = if let Some(blob) = payload_json.get("blob") {
            Payload::Blob(hex_bytes(blob, "blob")?)
        } else if let Some(node_json) = payload_json.get("node") {
            let entries_json = node_json
                .get("entries")
                .ok_or_else(|| bad("node: missing entries"))?;
            let mut entries = Vec::new();
            for entry in as_array(entries_json, "node entries")? {
                let pair = as_array(entry, "node entry")?;
                if pair.len() != 2 {
                    return Err(bad("node entry: expected [label, key]"));
                }
                let label = as_str(&pair[0], "node label")?.to_string();
                let key = Key::from_json(&pair[1])?;
                entries.push((label, key));
            }
            let content = match node_json.get("content") {
                None | Some(Json::Null) => None,
                Some(content) => Some(hex_bytes(content, "node content")?),
            };
            Payload::Node(Node { entries, content })
        } else {
            return Err(bad("value payload: expected blob or node"));
        };

        let pred_json = json.get("pred").ok_or_else(|| bad("value: missing pred"))?;
        let mut predecessors = Vec::new();
        for key in as_array(pred_json, "pred")? {
            predecessors.push(Key::from_json(key)?);
        }
        Ok(Value::from_parts(payload, predecessors))
    }
}

impl Graph {
    /// Debug JSON form: `{"vertices": [...], "edges": [[a, b], ...]}`.
    pub fn to_json(&self) -> Json {
        json!({
            "vertices": self.vertices.iter().map(Key::to_json).collect::<Vec<_>>(),
            "edges": self
                .edges
                .iter()
                .map(|(p, s)| json!([p.to_hex(), s.to_hex()]))
                .collect::<Vec<_>>(),
        })
    }

    /// Parse the debug JSON form.
    pub fn from_json(json: &Json) -> Result<Self, TypeError> {
        let mut vertices = Vec::new();
        for v in as_array(
            json.get("vertices")
                .ok_or_else(|| bad("graph: missing vertices"))?,
            "vertices",
        )? {
            vertices.push(Key::from_json(v)?);
        }
        let mut edges = Vec::new();
        for edge in as_array(
            json.get("edges").ok_or_else(|| bad("graph: missing edges"))?,
            "edges",
        )? {
            let pair = as_array(edge, "edge")?;
            if pair.len() != 2 {
                return Err(bad("edge: expected [pred, succ]"));
            }
            edges.push((Key::from_json(&pair[0])?, Key::from_json(&pair[1])?));
        }
        Ok(Graph { vertices, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_json_roundtrip() {
        let key = Key::of_bytes(b"json");
        let parsed = Key::from_json(&key.to_json()).unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn key_json_is_hex_string() {
        let key = Key::of_bytes(b"hex");
        assert_eq!(key.to_json(), Json::String(key.to_hex()));
    }

    #[test]
    fn tag_json_roundtrip() {
        let tag = Tag::new("main");
        assert_eq!(Tag::from_json(&tag.to_json()).unwrap(), tag);
    }

    #[test]
    fn blob_value_json_roundtrip() {
        let v = Value::blob(b"hello".to_vec());
        let parsed = Value::from_json(&v.to_json()).unwrap();
        assert_eq!(v, parsed);
    }

    #[test]
    fn node_value_json_roundtrip() {
        let a = Key::of_bytes(b"a");
        let b = Key::of_bytes(b"b");
        let v = Value::node(vec![("l1".to_string(), a), ("l2".to_string(), b)]);
        let parsed = Value::from_json(&v.to_json()).unwrap();
        assert_eq!(v, parsed);
        assert_eq!(parsed.key(), v.key());
    }

    #[test]
    fn node_with_content_json_roundtrip() {
        let v = Value::node_with_content(
            vec![("c".to_string(), Key::of_bytes(b"c"))],
            vec![0x00, 0xff, 0x7f],
        );
        assert_eq!(Value::from_json(&v.to_json()).unwrap(), v);
    }

    #[test]
    fn non_utf8_blob_survives_json() {
        let v = Value::blob(vec![0xff, 0xfe, 0x00]);
        assert_eq!(Value::from_json(&v.to_json()).unwrap(), v);
    }

    #[test]
    fn value_json_shape() {
        let v = Value::blob(b"hi".to_vec());
        let json = v.to_json();
        assert_eq!(json["payload"]["blob"], Json::String(hex::encode(b"hi")));
        assert!(json["pred"].as_array().unwrap().is_empty());
    }

    #[test]
    fn graph_json_roundtrip() {
        let a = Key::of_bytes(b"a");
        let b = Key::of_bytes(b"b");
        let g = Graph {
            vertices: vec![a, b],
            edges: vec![(a, b)],
        };
        assert_eq!(Graph::from_json(&g.to_json()).unwrap(), g);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(Key::from_json(&json!(42)).is_err());
        assert!(Value::from_json(&json!({ "pred": [] })).is_err());
        assert!(Value::from_json(&json!({ "payload": {"mystery": 1}, "pred": [] })).is_err());
        assert!(Graph::from_json(&json!({ "vertices": [] })).is_err());
    }
}
