//! Tool message validation
//!
//! A tool message is the payload at `mapping[<id>].message` where
//! `author.role` is `tool` — output from the browsing tool, the code
//! interpreter, or an installed plugin. Unlike user messages the role lives
//! in a nested `author` block, `update_time` is nullable rather than pinned,
//! and `status` may also be `in_progress`. The metadata carries the legacy
//! `_cite_metadata` spelling, remapped onto `cite_metadata` before reading.

use serde_json::Value;

use super::{as_str, RawObject};
use crate::error::{FieldPath, Result, ValidationError};
use crate::literal::{self, Literal, LiteralSet};
use crate::normalize;
use crate::types::{
    BrowserCommand, CommandArgs, CommandStatus, FinishDetails, InvokedPlugin, MessageStatus,
    PluginKind, Recipient, Role, TimestampMode, ToolAuthor, ToolMessage, ToolMetadata,
};

const ROLE_TOOL: LiteralSet = LiteralSet::new(&[Literal::Str("tool")]);
const TOOL_STATUS: LiteralSet = LiteralSet::new(&[
    Literal::Str("finished_successfully"),
    Literal::Str("in_progress"),
]);
const RECIPIENT_ALL: LiteralSet = LiteralSet::new(&[Literal::Str("all")]);
const TIMESTAMP_ABSOLUTE: LiteralSet = LiteralSet::new(&[Literal::Str("absolute")]);
const COMMANDS: LiteralSet = LiteralSet::new(&[
    Literal::Str("search"),
    Literal::Str("mclick"),
    Literal::Str("click"),
    Literal::Str("quote_lines"),
    Literal::Str("back"),
    Literal::Str("quote"),
    Literal::Str("open_url"),
    Literal::Str("scroll"),
]);
const COMMAND_STATUS: LiteralSet =
    LiteralSet::new(&[Literal::Str("finished"), Literal::Str("failed")]);
const PLUGIN_REMOTE: LiteralSet = LiteralSet::new(&[Literal::Str("remote")]);
const FINISH_INTERRUPTED: LiteralSet = LiteralSet::new(&[Literal::Str("interrupted")]);

/// Validate a raw record as a tool message.
pub fn validate_tool_message(record: &Value) -> Result<ToolMessage> {
    let raw = RawObject::of(FieldPath::root(), record)?;

    let id = raw.require_str("id")?;
    let author = validate_author(&raw.field_path("author"), raw.require("author")?)?;
    let create_time = raw.require_f64("create_time")?;
    let update_time = raw.nullable_f64("update_time")?;
    let content =
        super::validate_tool_content(&raw.field_path("content"), raw.require("content")?)?;

    let status_value = raw.require("status")?;
    TOOL_STATUS.check(&raw.field_path("status"), status_value)?;
    let status = if status_value.as_str() == Some("in_progress") {
        MessageStatus::InProgress
    } else {
        MessageStatus::FinishedSuccessfully
    };

    raw.require_literal("end_turn", literal::NULL)?;
    let weight = raw.require_f64("weight")?;
    let metadata = validate_metadata(&raw.field_path("metadata"), raw.require("metadata")?)?;
    raw.require_literal("recipient", RECIPIENT_ALL)?;

    Ok(ToolMessage {
        id,
        author,
        create_time,
        update_time,
        content,
        status,
        end_turn: (),
        weight,
        metadata,
        recipient: Recipient::All,
    })
}

fn validate_author(path: &FieldPath, value: &Value) -> Result<ToolAuthor> {
    let raw = RawObject::of(path.clone(), value)?;
    raw.require_literal("role", ROLE_TOOL)?;
    raw.require_literal("metadata", literal::EMPTY_MAP)?;
    Ok(ToolAuthor {
        role: Role::Tool,
        name: raw.require_str("name")?,
        metadata: Value::Object(serde_json::Map::new()),
    })
}

fn validate_metadata(path: &FieldPath, value: &Value) -> Result<ToolMetadata> {
    let raw_map = match value {
        Value::Object(map) => map,
        other => {
            return Err(ValidationError::TypeCoercionFailure {
                path: path.to_string(),
                expected: "object",
                actual: super::type_name(other).to_string(),
            })
        }
    };

    // Legacy exports spell the citation bag `_cite_metadata`.
    let mut map = raw_map.clone();
    normalize::remap_alias(&mut map, "_cite_metadata", "cite_metadata");
    let raw = RawObject::from_map(path.clone(), &map);

    raw.require_literal("message_type", literal::NULL)?;
    raw.require_literal("timestamp_", TIMESTAMP_ABSOLUTE)?;

    let command = match raw.optional("command") {
        Some(value) => {
            let name = as_str(&raw.field_path("command"), value)?;
            let command =
                name.parse::<BrowserCommand>()
                    .map_err(|_| ValidationError::LiteralViolation {
                        path: raw.field_path("command").to_string(),
                        permitted: COMMANDS.describe(),
                        actual: value.to_string(),
                    })?;
            Some(command)
        }
        None => None,
    };

    let args = match raw.optional_array("args")? {
        Some(elems) => Some(validate_args(&raw.field_path("args"), elems)?),
        None => None,
    };

    let status = match raw.optional("status") {
        Some(value) => {
            COMMAND_STATUS.check(&raw.field_path("status"), value)?;
            if value.as_str() == Some("failed") {
                Some(CommandStatus::Failed)
            } else {
                Some(CommandStatus::Finished)
            }
        }
        None => None,
    };

    let invoked_plugin = match raw.optional("invoked_plugin") {
        Some(value) => Some(validate_invoked_plugin(
            &raw.field_path("invoked_plugin"),
            value,
        )?),
        None => None,
    };

    let finish_details = match raw.optional("finish_details") {
        Some(value) => {
            let nested = RawObject::of(raw.field_path("finish_details"), value)?;
            nested.require_literal("type", FINISH_INTERRUPTED)?;
            Some(FinishDetails::Interrupted)
        }
        None => None,
    };

    Ok(ToolMetadata {
        message_type: (),
        model_slug: raw.require_str("model_slug")?,
        timestamp: TimestampMode::Absolute,
        default_model_slug: raw.optional_str("default_model_slug")?,
        parent_id: raw.optional_str("parent_id")?,
        request_id: raw.optional_str("request_id")?,
        is_complete: raw.optional_bool("is_complete")?,
        aggregate_result: raw
            .optional_object("aggregate_result")?
            .map(|map| Value::Object(map.clone())),
        cite_metadata: raw
            .optional_object("cite_metadata")?
            .map(|map| Value::Object(map.clone())),
        command,
        args,
        status,
        invoked_plugin,
        finish_details,
    })
}

/// Command args are homogeneous: strings, integers, or integer sequences.
/// The first element picks the interpretation for the whole sequence.
fn validate_args(path: &FieldPath, elems: &[Value]) -> Result<CommandArgs> {
    match elems.first() {
        None => Ok(CommandArgs::Strings(Vec::new())),
        Some(Value::String(_)) => {
            let mut out = Vec::with_capacity(elems.len());
            for (idx, elem) in elems.iter().enumerate() {
                out.push(as_str(&path.index(idx), elem)?);
            }
            Ok(CommandArgs::Strings(out))
        }
        Some(Value::Number(_)) => {
            let mut out = Vec::with_capacity(elems.len());
            for (idx, elem) in elems.iter().enumerate() {
                out.push(super::as_i64(&path.index(idx), elem)?);
            }
            Ok(CommandArgs::Numbers(out))
        }
        Some(Value::Array(_)) => {
            let mut out = Vec::with_capacity(elems.len());
            for (idx, elem) in elems.iter().enumerate() {
                let inner_path = path.index(idx);
                let inner = super::as_array(&inner_path, elem)?;
                let mut seq = Vec::with_capacity(inner.len());
                for (inner_idx, inner_elem) in inner.iter().enumerate() {
                    seq.push(super::as_i64(&inner_path.index(inner_idx), inner_elem)?);
                }
                out.push(seq);
            }
            Ok(CommandArgs::NumberSeqs(out))
        }
        Some(other) => Err(ValidationError::TypeCoercionFailure {
            path: path.index(0).to_string(),
            expected: "string, integer, or sequence of integers",
            actual: super::type_name(other).to_string(),
        }),
    }
}

fn validate_invoked_plugin(path: &FieldPath, value: &Value) -> Result<InvokedPlugin> {
    let raw = RawObject::of(path.clone(), value)?;
    raw.require_literal("type", PLUGIN_REMOTE)?;
    Ok(InvokedPlugin {
        kind: PluginKind::Remote,
        namespace: raw.require_str("namespace")?,
        plugin_id: raw.require_str("plugin_id")?,
        http_response_status: raw.require_i64("http_response_status")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::ToolContent;
    use serde_json::json;

    /// A minimal fully-valid tool record; tests mutate fields from here.
    fn base_record() -> Value {
        json!({
            "id": "t1",
            "author": {"role": "tool", "name": "browser", "metadata": {}},
            "create_time": 1714500010.0,
            "update_time": null,
            "content": {"content_type": "text", "parts": ["L1: result"]},
            "status": "finished_successfully",
            "end_turn": null,
            "weight": 0.0,
            "metadata": {
                "message_type": null,
                "model_slug": "gpt-4o",
                "timestamp_": "absolute",
            },
            "recipient": "all",
        })
    }

    #[test]
    fn test_valid_record() {
        let message = validate_tool_message(&base_record()).unwrap();
        assert_eq!(message.id, "t1");
        assert_eq!(message.author.name, "browser");
        assert_eq!(message.status, MessageStatus::FinishedSuccessfully);
        assert_eq!(message.update_time, None);
        assert_eq!(message.metadata.model_slug, "gpt-4o");
        assert_eq!(
            message.content,
            ToolContent::Text {
                parts: vec!["L1: result".to_string()]
            }
        );
    }

    #[test]
    fn test_in_progress_status_accepted() {
        let mut record = base_record();
        record["status"] = json!("in_progress");
        let message = validate_tool_message(&record).unwrap();
        assert_eq!(message.status, MessageStatus::InProgress);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let mut record = base_record();
        record["status"] = json!("queued");
        let err = validate_tool_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralViolation);
        assert_eq!(err.path(), Some("status"));
    }

    #[test]
    fn test_author_metadata_pinned_empty() {
        let mut record = base_record();
        record["author"]["metadata"] = json!({"verified": true});
        let err = validate_tool_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralViolation);
        assert_eq!(err.path(), Some("author.metadata"));
    }

    #[test]
    fn test_update_time_nullable_but_required() {
        let mut record = base_record();
        record["update_time"] = json!(1714500020.5);
        let message = validate_tool_message(&record).unwrap();
        assert_eq!(message.update_time, Some(1714500020.5));
        assert!(message.updated_at().is_some());

        let mut record = base_record();
        record.as_object_mut().unwrap().remove("update_time");
        let err = validate_tool_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert_eq!(err.path(), Some("update_time"));
    }

    #[test]
    fn test_model_slug_required() {
        let mut record = base_record();
        record["metadata"].as_object_mut().unwrap().remove("model_slug");
        let err = validate_tool_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert_eq!(err.path(), Some("metadata.model_slug"));
    }

    #[test]
    fn test_cite_metadata_alias_remapped() {
        let mut record = base_record();
        record["metadata"]["_cite_metadata"] = json!({"citation_format": {"name": "tether_og"}});
        let message = validate_tool_message(&record).unwrap();
        assert_eq!(
            message.metadata.cite_metadata,
            Some(json!({"citation_format": {"name": "tether_og"}}))
        );
    }

    #[test]
    fn test_cite_metadata_alias_wins_over_canonical() {
        let mut record = base_record();
        record["metadata"]["_cite_metadata"] = json!({"from": "alias"});
        record["metadata"]["cite_metadata"] = json!({"from": "canonical"});
        let message = validate_tool_message(&record).unwrap();
        assert_eq!(message.metadata.cite_metadata, Some(json!({"from": "alias"})));
    }

    #[test]
    fn test_browser_command_and_args() {
        let mut record = base_record();
        record["metadata"]["command"] = json!("mclick");
        record["metadata"]["args"] = json!([[0, 4], [7, 9]]);
        record["metadata"]["status"] = json!("finished");
        let message = validate_tool_message(&record).unwrap();
        assert_eq!(message.metadata.command, Some(BrowserCommand::Mclick));
        assert_eq!(
            message.metadata.args,
            Some(CommandArgs::NumberSeqs(vec![vec![0, 4], vec![7, 9]]))
        );
        assert_eq!(message.metadata.status, Some(CommandStatus::Finished));
    }

    #[test]
    fn test_unknown_command_rejected() {
        let mut record = base_record();
        record["metadata"]["command"] = json!("navigate");
        let err = validate_tool_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralViolation);
        assert_eq!(err.path(), Some("metadata.command"));
    }

    #[test]
    fn test_string_args() {
        let mut record = base_record();
        record["metadata"]["command"] = json!("search");
        record["metadata"]["args"] = json!(["rust serde tagged enums"]);
        let message = validate_tool_message(&record).unwrap();
        assert_eq!(
            message.metadata.args,
            Some(CommandArgs::Strings(vec![
                "rust serde tagged enums".to_string()
            ]))
        );
    }

    #[test]
    fn test_mixed_args_rejected() {
        let mut record = base_record();
        record["metadata"]["args"] = json!(["quote", 3]);
        let err = validate_tool_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercionFailure);
        assert_eq!(err.path(), Some("metadata.args[1]"));
    }

    #[test]
    fn test_invoked_plugin() {
        let mut record = base_record();
        record["author"]["name"] = json!("web_pilot.visitWebPage");
        record["metadata"]["invoked_plugin"] = json!({
            "type": "remote",
            "namespace": "web_pilot",
            "plugin_id": "plugin-4bb8",
            "http_response_status": 200,
        });
        let message = validate_tool_message(&record).unwrap();
        let plugin = message.metadata.invoked_plugin.unwrap();
        assert_eq!(plugin.namespace, "web_pilot");
        assert_eq!(plugin.http_response_status, 200);
    }

    #[test]
    fn test_invoked_plugin_kind_pinned() {
        let mut record = base_record();
        record["metadata"]["invoked_plugin"] = json!({
            "type": "local",
            "namespace": "web_pilot",
            "plugin_id": "plugin-4bb8",
            "http_response_status": 200,
        });
        let err = validate_tool_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralViolation);
        assert_eq!(err.path(), Some("metadata.invoked_plugin.type"));
    }

    #[test]
    fn test_finish_details() {
        let mut record = base_record();
        record["metadata"]["finish_details"] = json!({"type": "interrupted"});
        let message = validate_tool_message(&record).unwrap();
        assert_eq!(
            message.metadata.finish_details,
            Some(FinishDetails::Interrupted)
        );

        record["metadata"]["finish_details"] = json!({"type": "stop"});
        let err = validate_tool_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralViolation);
    }
}
