// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound event model, decoded from one gateway frame.

use crate::codec::{self, Segment};
use crate::error::ErrorKind;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSubtype {
    Private,
    GroupNormal,
    GroupAnonym,
    GroupSelf,
    GroupNotice,
    GroupTemp,
    Other(String),
}

impl MessageSubtype {
    fn from_fields(message_type: &str, sub_type: &str) -> Self {
        match (message_type, sub_type) {
            ("private", _) => Self::Private,
            ("group", "normal") => Self::GroupNormal,
            ("group", "anonymous") => Self::GroupAnonym,
            ("group", "notice") => Self::GroupNotice,
            (_, "group_self") => Self::GroupSelf,
            ("group", "temp") | ("temp", _) => Self::GroupTemp,
            _ => Self::Other(sub_type.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sender {
    pub user_id: String,
    pub nickname: Option<String>,
    pub role: Option<String>,
    pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessagePayload {
    pub message_id: Option<String>,
    pub segments: Vec<Segment>,
    pub text: String,
    pub sender: Sender,
    pub group_id: Option<String>,
    pub subtype: MessageSubtype,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoticePayload {
    pub subtype: String,
    pub user_id: Option<String>,
    pub operator_id: Option<String>,
    pub target_id: Option<String>,
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestPayload {
    pub subtype: String,
    pub flag: String,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaPayload {
    pub subtype: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KernelPayload {
    pub subtype: String,
    pub origin: Option<Box<Event>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseStatus {
    Ok,
    Accepted,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePayload {
    pub retcode: i64,
    pub echo: Option<String>,
    pub status: ResponseStatus,
    pub error: Option<String>,
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Message(MessagePayload),
    Notice(NoticePayload),
    Request(RequestPayload),
    Meta(MetaPayload),
    Kernel(KernelPayload),
    Response(ResponsePayload),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub time: i64,
    pub self_id: String,
    pub kind: EventKind,
}

impl Event {
    /// Build a `Kernel{queue_full}` event wrapping the event that caused the overflow.
    pub fn queue_full(origin: Event) -> Self {
        Event {
            time: now_secs(),
            self_id: origin.self_id.clone(),
            kind: EventKind::Kernel(KernelPayload {
                subtype: "queue_full".to_owned(),
                origin: Some(Box::new(origin)),
            }),
        }
    }

    pub fn is_msg(&self) -> bool {
        matches!(self.kind, EventKind::Message(_))
    }

    pub fn message(&self) -> Option<&MessagePayload> {
        match &self.kind {
            EventKind::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_private_friend(&self) -> bool {
        matches!(self.message(), Some(m) if m.subtype == MessageSubtype::Private)
    }

    pub fn is_group_normal(&self) -> bool {
        matches!(self.message(), Some(m) if m.subtype == MessageSubtype::GroupNormal)
    }

    pub fn is_group_anonymous(&self) -> bool {
        matches!(self.message(), Some(m) if m.subtype == MessageSubtype::GroupAnonym)
    }

    pub fn sender_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Message(m) => Some(m.sender.user_id.as_str()),
            EventKind::Notice(n) => n.user_id.as_deref(),
            EventKind::Request(r) => r.user_id.as_deref(),
            _ => None,
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Message(m) => m.group_id.as_deref(),
            EventKind::Notice(n) => n.group_id.as_deref(),
            EventKind::Request(r) => r.group_id.as_deref(),
            _ => None,
        }
    }

    /// True iff this is a notice of the bot itself being poked.
    pub fn is_self_poke(&self) -> bool {
        match &self.kind {
            EventKind::Notice(n) => {
                n.subtype == "poke" && n.target_id.as_deref() == Some(self.self_id.as_str())
            }
            _ => false,
        }
    }

    /// Decode one gateway frame into an `Event`. Returns `None` for frame
    /// shapes the core does not need to act on but that aren't malformed
    /// (per spec: unrecognized post_type is a log-and-continue, not fatal).
    pub fn from_frame(value: &Value) -> Result<Option<Event>, ErrorKind> {
        let time = value.get("time").and_then(Value::as_i64).unwrap_or_else(now_secs);
        let self_id = field_as_string(value, "self_id").unwrap_or_default();

        // Response frames carry `retcode` and no `post_type`.
        if value.get("retcode").is_some() && value.get("post_type").is_none() {
            return Ok(Some(Event { time, self_id, kind: EventKind::Response(parse_response(value)) }));
        }

        let post_type = value.get("post_type").and_then(Value::as_str).unwrap_or("");
        let kind = match post_type {
            "message" | "message_sent" => EventKind::Message(parse_message(value)?),
            "notice" => EventKind::Notice(parse_notice(value)),
            "request" => EventKind::Request(parse_request(value)),
            "meta_event" => EventKind::Meta(parse_meta(value)),
            _ => return Err(ErrorKind::UnexpectedEvent),
        };
        Ok(Some(Event { time, self_id, kind }))
    }
}

fn now_secs() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

fn field_as_string(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_message(value: &Value) -> Result<MessagePayload, ErrorKind> {
    let message_type = value.get("message_type").and_then(Value::as_str).unwrap_or("");
    let sub_type = value.get("sub_type").and_then(Value::as_str).unwrap_or("");
    let subtype = MessageSubtype::from_fields(message_type, sub_type);

    let message_value = value.get("message").cloned().unwrap_or(Value::Null);
    let segments = codec::normalize_message(&message_value);
    let text = codec::flatten_text(&segments);

    let sender_obj = value.get("sender").cloned().unwrap_or(Value::Null);
    let sender = Sender {
        user_id: field_as_string(&sender_obj, "user_id")
            .or_else(|| field_as_string(value, "user_id"))
            .unwrap_or_default(),
        nickname: sender_obj.get("nickname").and_then(Value::as_str).map(str::to_owned),
        role: sender_obj.get("role").and_then(Value::as_str).map(str::to_owned),
        anonymous: value.get("anonymous").map(|v| !v.is_null()).unwrap_or(false),
    };

    Ok(MessagePayload {
        message_id: field_as_string(value, "message_id"),
        segments,
        text,
        sender,
        group_id: field_as_string(value, "group_id"),
        subtype,
    })
}

fn parse_notice(value: &Value) -> NoticePayload {
    NoticePayload {
        subtype: value.get("notice_type").and_then(Value::as_str).unwrap_or("").to_owned(),
        user_id: field_as_string(value, "user_id"),
        operator_id: field_as_string(value, "operator_id"),
        target_id: field_as_string(value, "target_id"),
        group_id: field_as_string(value, "group_id"),
    }
}

fn parse_request(value: &Value) -> RequestPayload {
    RequestPayload {
        subtype: value.get("request_type").and_then(Value::as_str).unwrap_or("").to_owned(),
        flag: value.get("flag").and_then(Value::as_str).unwrap_or("").to_owned(),
        user_id: field_as_string(value, "user_id"),
        group_id: field_as_string(value, "group_id"),
        comment: value.get("comment").and_then(Value::as_str).map(str::to_owned),
    }
}

fn parse_meta(value: &Value) -> MetaPayload {
    MetaPayload {
        subtype: value.get("meta_event_type").and_then(Value::as_str).unwrap_or("").to_owned(),
    }
}

fn parse_response(value: &Value) -> ResponsePayload {
    let status = match value.get("status").and_then(Value::as_str) {
        Some("ok") => ResponseStatus::Ok,
        Some("async") | Some("accepted") => ResponseStatus::Accepted,
        _ => ResponseStatus::Failed,
    };
    ResponsePayload {
        retcode: value.get("retcode").and_then(Value::as_i64).unwrap_or(0),
        echo: field_as_string(value, "echo"),
        status,
        error: value.get("wording").and_then(Value::as_str).map(str::to_owned),
        data: value.get("data").cloned(),
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
