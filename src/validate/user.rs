//! User message validation
//!
//! A user message is the payload at `mapping[<id>].message` where the author
//! role is `user`. Beyond the shared shape, the export format pins most of
//! its framing fields: `status` is always `finished_successfully`, `name`,
//! `author_metadata`, `update_time`, `end_turn`, and `channel` are always
//! null, and `recipient` is always `"all"`.

use serde_json::Value;

use super::RawObject;
use crate::error::{FieldPath, Result};
use crate::literal::{self, Literal, LiteralSet};
use crate::types::{
    Attachment, DisplayTreatment, MessageStatus, ParagenVariantsInfo, Recipient, Role,
    SelectedSource, SerializationMetadata, SystemHint, TimestampMode, UserMessage, UserMetadata,
    VariantsInfoKind,
};

const ROLE_USER: LiteralSet = LiteralSet::new(&[Literal::Str("user")]);
const STATUS_FINISHED: LiteralSet = LiteralSet::new(&[Literal::Str("finished_successfully")]);
const RECIPIENT_ALL: LiteralSet = LiteralSet::new(&[Literal::Str("all")]);
const TIMESTAMP_ABSOLUTE: LiteralSet = LiteralSet::new(&[Literal::Str("absolute")]);
const SOURCE_WEB: LiteralSet = LiteralSet::new(&[Literal::Str("web")]);
const HINT_SEARCH: LiteralSet = LiteralSet::new(&[Literal::Str("search")]);
const TREATMENT_SKIPPABLE: LiteralSet = LiteralSet::new(&[Literal::Str("skippable")]);
const VARIANTS_KIND: LiteralSet = LiteralSet::new(&[Literal::Str("num_variants_in_stream")]);

/// Validate a raw record as a user message.
pub fn validate_user_message(record: &Value) -> Result<UserMessage> {
    let raw = RawObject::of(FieldPath::root(), record)?;

    let id = raw.require_str("id")?;
    let parent = raw.require_str("parent")?;
    raw.require_literal("role", ROLE_USER)?;
    raw.require_literal("name", literal::NULL)?;
    raw.require_literal("author_metadata", literal::NULL)?;
    let create_time = raw.require_f64("create_time")?;
    raw.require_literal("update_time", literal::NULL)?;
    raw.require_literal("status", STATUS_FINISHED)?;
    raw.require_literal("end_turn", literal::NULL)?;
    let weight = raw.require_f64("weight")?;
    raw.require_literal("recipient", RECIPIENT_ALL)?;
    raw.require_literal("channel", literal::NULL)?;
    let content =
        super::validate_user_content(&raw.field_path("content"), raw.require("content")?)?;
    let metadata = validate_metadata(&raw.field_path("metadata"), raw.require("metadata")?)?;
    let children = raw.require_str_array("children")?;

    Ok(UserMessage {
        id,
        parent,
        role: Role::User,
        name: (),
        author_metadata: (),
        create_time,
        update_time: (),
        status: MessageStatus::FinishedSuccessfully,
        end_turn: (),
        weight,
        recipient: Recipient::All,
        channel: (),
        content,
        metadata,
        children,
    })
}

fn validate_metadata(path: &FieldPath, value: &Value) -> Result<UserMetadata> {
    let raw = RawObject::of(path.clone(), value)?;

    raw.require_literal("timestamp_", TIMESTAMP_ABSOLUTE)?;
    raw.require_literal("message_type", literal::NULL)?;
    raw.pinned_optional("message_source", literal::NULL)?;

    let attachments = match raw.optional_array("attachments")? {
        Some(elems) => {
            let attachments_path = raw.field_path("attachments");
            let mut out = Vec::with_capacity(elems.len());
            for (idx, elem) in elems.iter().enumerate() {
                out.push(validate_attachment(&attachments_path.index(idx), elem)?);
            }
            Some(out)
        }
        None => None,
    };

    let voice_mode_message = match raw.optional("voice_mode_message") {
        Some(value) => {
            literal::TRUE.check(&raw.field_path("voice_mode_message"), value)?;
            Some(true)
        }
        None => None,
    };

    let serialization_metadata = match raw.optional("serialization_metadata") {
        Some(value) => {
            let nested = RawObject::of(raw.field_path("serialization_metadata"), value)?;
            let offsets = nested.require_array("custom_symbol_offsets")?;
            let offsets_path = nested.field_path("custom_symbol_offsets");
            for (idx, offset) in offsets.iter().enumerate() {
                literal::NULL.check(&offsets_path.index(idx), offset)?;
            }
            Some(SerializationMetadata {
                custom_symbol_offsets: vec![(); offsets.len()],
            })
        }
        None => None,
    };

    let paragen_variants_info = match raw.optional("paragen_variants_info") {
        Some(value) => Some(validate_variants_info(
            &raw.field_path("paragen_variants_info"),
            value,
        )?),
        None => None,
    };

    let selected_github_repos = match raw.optional_array("selected_github_repos")? {
        Some(elems) => {
            let repos_path = raw.field_path("selected_github_repos");
            for (idx, elem) in elems.iter().enumerate() {
                literal::NULL.check(&repos_path.index(idx), elem)?;
            }
            Some(vec![(); elems.len()])
        }
        None => None,
    };

    Ok(UserMetadata {
        request_id: raw.optional_str("request_id")?,
        timestamp: TimestampMode::Absolute,
        message_type: (),
        attachments,
        targeted_reply: raw.optional_str("targeted_reply")?,
        voice_mode_message,
        gizmo_id: raw.optional_str("gizmo_id")?,
        message_source: (),
        selected_sources: validate_source_list(&raw, "selected_sources")?,
        selected_github_repos,
        serialization_metadata,
        paragen_variants_info,
        paragen_variant_choice: raw.optional_str("paragen_variant_choice")?,
        caterpillar_selected_sources: validate_source_list(&raw, "caterpillar_selected_sources")?,
        system_hints: validate_hint_list(&raw, "system_hints")?,
    })
}

/// A sequence whose every element is pinned to `"web"`.
fn validate_source_list(raw: &RawObject, name: &str) -> Result<Option<Vec<SelectedSource>>> {
    match raw.optional_array(name)? {
        Some(elems) => {
            let path = raw.field_path(name);
            for (idx, elem) in elems.iter().enumerate() {
                SOURCE_WEB.check(&path.index(idx), elem)?;
            }
            Ok(Some(vec![SelectedSource::Web; elems.len()]))
        }
        None => Ok(None),
    }
}

/// A sequence whose every element is pinned to `"search"`.
fn validate_hint_list(raw: &RawObject, name: &str) -> Result<Option<Vec<SystemHint>>> {
    match raw.optional_array(name)? {
        Some(elems) => {
            let path = raw.field_path(name);
            for (idx, elem) in elems.iter().enumerate() {
                HINT_SEARCH.check(&path.index(idx), elem)?;
            }
            Ok(Some(vec![SystemHint::Search; elems.len()]))
        }
        None => Ok(None),
    }
}

fn validate_attachment(path: &FieldPath, value: &Value) -> Result<Attachment> {
    let raw = RawObject::of(path.clone(), value)?;
    Ok(Attachment {
        id: raw.require_str("id")?,
        name: raw.require_str("name")?,
        size: raw.require_i64("size")?,
        url: raw.optional_str("url")?,
        mime_type: raw.optional_str("mime_type")?,
        width: raw.optional_i64("width")?,
        height: raw.optional_i64("height")?,
        file_token_size: raw.optional_i64("file_token_size")?,
    })
}

fn validate_variants_info(path: &FieldPath, value: &Value) -> Result<ParagenVariantsInfo> {
    let raw = RawObject::of(path.clone(), value)?;
    raw.require_literal("type", VARIANTS_KIND)?;
    raw.require_literal("display_treatment", TREATMENT_SKIPPABLE)?;
    Ok(ParagenVariantsInfo {
        kind: VariantsInfoKind::NumVariantsInStream,
        num_variants_in_stream: raw.require_i64("num_variants_in_stream")?,
        display_treatment: DisplayTreatment::Skippable,
        conversation_id: raw.require_str("conversation_id")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::UserContent;
    use serde_json::json;

    /// A minimal fully-valid user record; tests mutate fields from here.
    fn base_record() -> Value {
        json!({
            "id": "u1",
            "parent": "root",
            "role": "user",
            "name": null,
            "author_metadata": null,
            "create_time": 1714500000.25,
            "update_time": null,
            "status": "finished_successfully",
            "end_turn": null,
            "weight": 1.0,
            "recipient": "all",
            "channel": null,
            "content": {"content_type": "text", "parts": ["hello"]},
            "metadata": {"timestamp_": "absolute", "message_type": null},
            "children": ["a1"],
        })
    }

    #[test]
    fn test_valid_record() {
        let message = validate_user_message(&base_record()).unwrap();
        assert_eq!(message.id, "u1");
        assert_eq!(message.parent, "root");
        assert_eq!(message.status, MessageStatus::FinishedSuccessfully);
        assert_eq!(
            message.content,
            UserContent::Text {
                text: "hello".to_string()
            }
        );
        assert_eq!(message.children, vec!["a1".to_string()]);
        assert!(message.created_at().is_some());
    }

    #[test]
    fn test_recipient_literal_violation() {
        let mut record = base_record();
        record["recipient"] = json!("someone");
        let err = validate_user_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralViolation);
        assert_eq!(err.path(), Some("recipient"));
    }

    #[test]
    fn test_missing_parent() {
        let mut record = base_record();
        record.as_object_mut().unwrap().remove("parent");
        let err = validate_user_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert_eq!(err.path(), Some("parent"));
    }

    #[test]
    fn test_non_null_channel_rejected() {
        let mut record = base_record();
        record["channel"] = json!("default");
        let err = validate_user_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralViolation);
        assert_eq!(err.path(), Some("channel"));
    }

    #[test]
    fn test_in_progress_status_rejected_for_user() {
        // Tool messages may be in_progress; user messages are pinned.
        let mut record = base_record();
        record["status"] = json!("in_progress");
        let err = validate_user_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralViolation);
        assert_eq!(err.path(), Some("status"));
    }

    #[test]
    fn test_create_time_must_be_numeric() {
        let mut record = base_record();
        record["create_time"] = json!("2024-04-30T18:00:00Z");
        let err = validate_user_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercionFailure);
        assert_eq!(err.path(), Some("create_time"));
    }

    #[test]
    fn test_metadata_timestamp_mode_required() {
        let mut record = base_record();
        record["metadata"] = json!({"message_type": null});
        let err = validate_user_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert_eq!(err.path(), Some("metadata.timestamp_"));
    }

    #[test]
    fn test_metadata_optional_fields() {
        let mut record = base_record();
        record["metadata"] = json!({
            "timestamp_": "absolute",
            "message_type": null,
            "request_id": "req-123",
            "gizmo_id": null,
            "voice_mode_message": true,
            "selected_sources": ["web"],
            "system_hints": ["search"],
            "paragen_variants_info": {
                "type": "num_variants_in_stream",
                "num_variants_in_stream": 2,
                "display_treatment": "skippable",
                "conversation_id": "conv-9",
            },
        });
        let message = validate_user_message(&record).unwrap();
        assert_eq!(message.metadata.request_id.as_deref(), Some("req-123"));
        assert_eq!(message.metadata.gizmo_id, None);
        assert_eq!(message.metadata.voice_mode_message, Some(true));
        assert_eq!(
            message.metadata.selected_sources,
            Some(vec![SelectedSource::Web])
        );
        assert_eq!(message.metadata.system_hints, Some(vec![SystemHint::Search]));
        let info = message.metadata.paragen_variants_info.unwrap();
        assert_eq!(info.num_variants_in_stream, 2);
        assert_eq!(info.conversation_id, "conv-9");
    }

    #[test]
    fn test_voice_mode_message_pinned_true() {
        let mut record = base_record();
        record["metadata"]["voice_mode_message"] = json!(false);
        let err = validate_user_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralViolation);
        assert_eq!(err.path(), Some("metadata.voice_mode_message"));
    }

    #[test]
    fn test_selected_source_members_pinned() {
        let mut record = base_record();
        record["metadata"]["selected_sources"] = json!(["web", "news"]);
        let err = validate_user_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LiteralViolation);
        assert_eq!(err.path(), Some("metadata.selected_sources[1]"));
    }

    #[test]
    fn test_attachments() {
        let mut record = base_record();
        record["metadata"]["attachments"] = json!([{
            "id": "file-1",
            "name": "notes.txt",
            "size": 512,
            "mime_type": "text/plain",
        }]);
        let message = validate_user_message(&record).unwrap();
        let attachments = message.metadata.attachments.unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].name, "notes.txt");
        assert_eq!(attachments[0].size, 512);
        assert_eq!(attachments[0].url, None);
    }

    #[test]
    fn test_attachment_missing_id() {
        let mut record = base_record();
        record["metadata"]["attachments"] = json!([{"name": "notes.txt", "size": 512}]);
        let err = validate_user_message(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert_eq!(err.path(), Some("metadata.attachments[0].id"));
    }
}
