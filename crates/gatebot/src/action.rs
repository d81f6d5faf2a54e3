// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound action model and the fixed action-type constructor catalog.

use crate::codec::{self, Segment};
use crate::event::Event;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// An outbound command to the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    #[serde(rename = "action")]
    pub action_type: &'static str,
    pub params: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo: Option<String>,
    #[serde(skip)]
    pub trigger: Option<Event>,
}

impl Action {
    pub fn new(action_type: &'static str, params: Map<String, Value>) -> Self {
        Action { action_type, params, echo: None, trigger: None }
    }

    pub fn with_echo(mut self, echo_id: impl Into<String>) -> Self {
        self.echo = Some(echo_id.into());
        self
    }

    pub fn with_trigger(mut self, trigger: Event) -> Self {
        self.trigger = Some(trigger);
        self
    }
}

fn params(pairs: impl IntoIterator<Item = (&'static str, Value)>) -> Map<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}

/// Generates one dedicated constructor function per catalog entry.
///
/// `simple!(fn_name, "action_type", [param: type, ...])` builds a function
/// taking one argument per listed param and assembling the params map;
/// `bare!(fn_name, "action_type")` builds a no-argument constructor.
macro_rules! bare {
    ($name:ident, $action_type:literal) => {
        pub fn $name() -> Action {
            Action::new($action_type, Map::new())
        }
    };
}

macro_rules! simple {
    ($name:ident, $action_type:literal, [$($p:ident : $t:ty),+ $(,)?]) => {
        pub fn $name($($p: $t),+) -> Action {
            Action::new($action_type, params([$((stringify!($p), json!($p))),+]))
        }
    };
}

/// `send_msg` with a plain text body, targeting either a user or a group.
pub fn send_msg(user_id: Option<&str>, group_id: Option<&str>, text: &str) -> Action {
    let mut map = Map::new();
    if let Some(uid) = user_id {
        map.insert("user_id".to_owned(), json!(uid));
    }
    if let Some(gid) = group_id {
        map.insert("group_id".to_owned(), json!(gid));
    }
    map.insert("message".to_owned(), json!(codec::render_cq_string(&codec::text_segments(text))));
    Action::new("send_msg", map)
}

/// Poke a user, optionally within a group.
pub fn poke(user_id: &str, group_id: Option<&str>) -> Action {
    let mut map = Map::new();
    map.insert("user_id".to_owned(), json!(user_id));
    if let Some(gid) = group_id {
        map.insert("group_id".to_owned(), json!(gid));
    }
    Action::new("send_poke", map)
}

/// `send_msg` with a pre-built segment sequence.
pub fn send_segments(user_id: Option<&str>, group_id: Option<&str>, segments: &[Segment]) -> Action {
    let mut map = Map::new();
    if let Some(uid) = user_id {
        map.insert("user_id".to_owned(), json!(uid));
    }
    if let Some(gid) = group_id {
        map.insert("group_id".to_owned(), json!(gid));
    }
    map.insert("message".to_owned(), json!(codec::render_cq_string(segments)));
    Action::new("send_msg", map)
}

simple!(delete_msg, "delete_msg", [message_id: &str]);
simple!(get_msg, "get_msg", [message_id: &str]);
simple!(get_forward_msg, "get_forward_msg", [id: &str]);
simple!(send_group_forward_msg, "send_group_forward_msg", [group_id: &str, messages: Value]);
simple!(send_private_forward_msg, "send_private_forward_msg", [user_id: &str, messages: Value]);
simple!(get_image, "get_image", [file: &str]);
simple!(mark_msg_as_read, "mark_msg_as_read", [message_id: &str]);
simple!(set_group_kick, "set_group_kick", [group_id: &str, user_id: &str, reject_add_request: bool]);
simple!(set_group_ban, "set_group_ban", [group_id: &str, user_id: &str, duration: i64]);
simple!(set_group_anonymous_ban, "set_group_anonymous_ban", [group_id: &str, anonymous_flag: &str, duration: i64]);
simple!(set_group_whole_ban, "set_group_whole_ban", [group_id: &str, enable: bool]);
simple!(set_group_leave, "set_group_leave", [group_id: &str, is_dismiss: bool]);
simple!(set_group_admin, "set_group_admin", [group_id: &str, user_id: &str, enable: bool]);
simple!(set_group_card, "set_group_card", [group_id: &str, user_id: &str, card: &str]);
simple!(set_group_name, "set_group_name", [group_id: &str, group_name: &str]);
simple!(set_group_special_title, "set_group_special_title", [group_id: &str, user_id: &str, special_title: &str]);
simple!(send_group_sign, "send_group_sign", [group_id: &str]);
simple!(set_friend_add_request, "set_friend_add_request", [flag: &str, approve: bool]);
simple!(set_group_add_request, "set_group_add_request", [flag: &str, sub_type: &str, approve: bool]);
bare!(get_login_info, "get_login_info");
simple!(set_qq_profile, "set_qq_profile", [nickname: &str]);
simple!(get_stranger_info, "get_stranger_info", [user_id: &str]);
bare!(get_friend_list, "get_friend_list");
bare!(get_unidirectional_friend_list, "get_unidirectional_friend_list");
simple!(delete_friend, "delete_friend", [user_id: &str]);
simple!(delete_unidirectional_friend, "delete_unidirectional_friend", [user_id: &str]);
simple!(get_group_info, "get_group_info", [group_id: &str]);
bare!(get_group_list, "get_group_list");
simple!(get_group_member_info, "get_group_member_info", [group_id: &str, user_id: &str]);
simple!(get_group_member_list, "get_group_member_list", [group_id: &str]);
simple!(get_group_honor_info, "get_group_honor_info", [group_id: &str, honor_type: &str]);
bare!(can_send_image, "can_send_image");
bare!(can_send_record, "can_send_record");
bare!(get_version_info, "get_version_info");
simple!(set_group_portrait, "set_group_portrait", [group_id: &str, file: &str]);
simple!(ocr_image, "ocr_image", [image: &str]);
simple!(get_group_system_msg, "get_group_system_msg", [group_id: &str]);
simple!(upload_private_file, "upload_private_file", [user_id: &str, file: &str, name: &str]);
simple!(upload_group_file, "upload_group_file", [group_id: &str, file: &str, name: &str]);
simple!(get_group_file_system_info, "get_group_file_system_info", [group_id: &str]);
simple!(get_group_root_files, "get_group_root_files", [group_id: &str]);
simple!(get_group_files_by_folder, "get_group_files_by_folder", [group_id: &str, folder_id: &str]);
simple!(create_group_file_folder, "create_group_file_folder", [group_id: &str, name: &str]);
simple!(delete_group_folder, "delete_group_folder", [group_id: &str, folder_id: &str]);
simple!(delete_group_file, "delete_group_file", [group_id: &str, file_id: &str, busid: i64]);
simple!(get_group_file_url, "get_group_file_url", [group_id: &str, file_id: &str, busid: i64]);
bare!(get_status, "get_status");
simple!(get_group_at_all_remain, "get_group_at_all_remain", [group_id: &str]);
simple!(handle_quick_operation, "_handle_quick_operation", [context: Value, operation: Value]);
simple!(send_group_notice, "_send_group_notice", [group_id: &str, content: &str]);
simple!(get_group_notice, "_get_group_notice", [group_id: &str]);
simple!(download_file, "download_file", [url: &str]);
bare!(get_online_clients, "get_online_clients");
simple!(get_group_msg_history, "get_group_msg_history", [group_id: &str, message_seq: i64]);
simple!(set_essence_msg, "set_essence_msg", [message_id: &str]);
simple!(delete_essence_msg, "delete_essence_msg", [message_id: &str]);
simple!(get_essence_msg_list, "get_essence_msg_list", [group_id: &str]);
bare!(get_model_show, "_get_model_show");
simple!(set_model_show, "_set_model_show", [model: &str]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_msg_to_group_embeds_text() {
        let action = send_msg(None, Some("99"), "Hello MeloBot");
        assert_eq!(action.action_type, "send_msg");
        assert_eq!(action.params["group_id"], json!("99"));
        assert_eq!(action.params["message"], json!("Hello MeloBot"));
    }

    #[test]
    fn echo_is_none_until_set() {
        let action = get_login_info();
        assert!(action.echo.is_none());
        let action = action.with_echo("42");
        assert_eq!(action.echo.as_deref(), Some("42"));
    }

    #[test]
    fn poke_targets_user_and_optional_group() {
        let action = poke("1", Some("99"));
        assert_eq!(action.action_type, "send_poke");
        assert_eq!(action.params["user_id"], json!("1"));
        assert_eq!(action.params["group_id"], json!("99"));

        let private = poke("1", None);
        assert!(!private.params.contains_key("group_id"));
    }

    #[test]
    fn set_group_kick_carries_typed_params() {
        let action = set_group_kick("1", "2", true);
        assert_eq!(action.params["group_id"], json!("1"));
        assert_eq!(action.params["user_id"], json!("2"));
        assert_eq!(action.params["reject_add_request"], json!(true));
    }

    #[test]
    fn serializes_to_gateway_frame_shape() {
        let action = send_msg(Some("7"), None, "hi").with_echo("abc");
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["action"], json!("send_msg"));
        assert_eq!(value["echo"], json!("abc"));
        assert_eq!(value["params"]["user_id"], json!("7"));
    }
}
