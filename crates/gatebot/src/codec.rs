// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CQ-code escaping and message segment normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Escape text for embedding in a CQ-code string (`&`, `[`, `]`, `,`).
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('[', "&#91;")
        .replace(']', "&#93;")
        .replace(',', "&#44;")
}

/// Inverse of [`escape`].
pub fn anti_escape(s: &str) -> String {
    s.replace("&#44;", ",")
        .replace("&#93;", "]")
        .replace("&#91;", "[")
        .replace("&amp;", "&")
}

/// One element of a message's segment sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Segment {
    Text { text: String },
    Face { id: String },
    At { qq: String },
    Image { file: String },
    Reply { id: String },
    #[serde(other)]
    Other,
}

/// Normalize a gateway `message` field, which may be a CQ-string or an
/// already-segmented JSON array, into a segment sequence.
pub fn normalize_message(value: &Value) -> Vec<Segment> {
    match value {
        Value::String(cq) => parse_cq_string(cq),
        Value::Array(_) => {
            serde_json::from_value::<Vec<Segment>>(value.clone()).unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

/// Derive the flattened text view: Text and Face segments only, in order.
pub fn flatten_text(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        match seg {
            Segment::Text { text } => out.push_str(text),
            Segment::Face { id } => out.push_str(&format!("[face:{id}]")),
            _ => {}
        }
    }
    out
}

/// Parse a CQ-code-bearing string (`plain[CQ:face,id=1]more text`) into segments.
fn parse_cq_string(raw: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = raw;
    while let Some(start) = rest.find("[CQ:") {
        if start > 0 {
            segments.push(Segment::Text { text: anti_escape(&rest[..start]) });
        }
        let after = &rest[start + 4..];
        let Some(end) = after.find(']') else {
            // Unterminated CQ code: treat the remainder as plain text and stop.
            segments.push(Segment::Text { text: anti_escape(&rest[start..]) });
            return segments;
        };
        let body = &after[..end];
        segments.push(parse_cq_body(body));
        rest = &after[end + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Text { text: anti_escape(rest) });
    }
    segments
}

fn parse_cq_body(body: &str) -> Segment {
    let mut parts = body.splitn(2, ',');
    let kind = parts.next().unwrap_or_default();
    let params = parts.next().unwrap_or_default();
    let mut kv: BTreeMap<&str, String> = BTreeMap::new();
    for pair in params.split(',').filter(|p| !p.is_empty()) {
        if let Some((k, v)) = pair.split_once('=') {
            kv.insert(k, anti_escape(v));
        }
    }
    match kind {
        "face" => Segment::Face { id: kv.remove("id").unwrap_or_default() },
        "at" => Segment::At { qq: kv.remove("qq").unwrap_or_default() },
        "image" => Segment::Image { file: kv.remove("file").unwrap_or_default() },
        "reply" => Segment::Reply { id: kv.remove("id").unwrap_or_default() },
        _ => Segment::Other,
    }
}

/// Render segments back into the CQ-string wire form used for outbound text messages.
pub fn render_cq_string(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        match seg {
            Segment::Text { text } => out.push_str(&escape(text)),
            Segment::Face { id } => out.push_str(&format!("[CQ:face,id={}]", escape(id))),
            Segment::At { qq } => out.push_str(&format!("[CQ:at,qq={}]", escape(qq))),
            Segment::Image { file } => out.push_str(&format!("[CQ:image,file={}]", escape(file))),
            Segment::Reply { id } => out.push_str(&format!("[CQ:reply,id={}]", escape(id))),
            Segment::Other => {}
        }
    }
    out
}

/// Build a plain-text segment sequence, the common case for command replies.
pub fn text_segments(text: impl Into<String>) -> Vec<Segment> {
    vec![Segment::Text { text: text.into() }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn escape_round_trips_on_fixed_strings() {
        for s in ["a&b", "[x]", "a,b,c", "&[],", "plain"] {
            assert_eq!(anti_escape(&escape(s)), s);
        }
    }

    proptest! {
        #[test]
        fn escape_round_trips_on_arbitrary_strings(s in ".*") {
            prop_assert_eq!(anti_escape(&escape(&s)), s);
        }
    }

    #[test]
    fn normalize_cq_string_extracts_face_and_text() {
        let raw = serde_json::json!("hi[CQ:face,id=14]there");
        let segments = normalize_message(&raw);
        assert_eq!(
            segments,
            vec![
                Segment::Text { text: "hi".into() },
                Segment::Face { id: "14".into() },
                Segment::Text { text: "there".into() },
            ]
        );
        assert_eq!(flatten_text(&segments), "hi[face:14]there");
    }

    #[test]
    fn normalize_array_form_passes_through() {
        let raw = serde_json::json!([{"type": "text", "data": {"text": "hello"}}]);
        let segments = normalize_message(&raw);
        assert_eq!(segments, vec![Segment::Text { text: "hello".into() }]);
    }

    #[test]
    fn escaped_commas_inside_cq_params_survive() {
        let raw = serde_json::json!("[CQ:image,file=a&#44;b.png]");
        let segments = normalize_message(&raw);
        assert_eq!(segments, vec![Segment::Image { file: "a,b.png".into() }]);
    }
}
