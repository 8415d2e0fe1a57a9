//! Content variant dispatch
//!
//! Message content is discriminated by `content_type`, but the set of valid
//! shapes depends on the enclosing message's role — dispatch keys on the
//! (role, discriminator) pair, never the discriminator alone.
//!
//! | content_type | user | tool |
//! |--------------|------|------|
//! | `text` | single string (collapsed from `parts`) | uncollapsed `parts` |
//! | `multimodal_text` | text and image parts | image parts only |
//! | `image_asset_pointer` | ✅ | — |
//! | `system_error` | — | ✅ |
//! | `execution_output` | — | ✅ |
//! | `tether_browsing_display` | — | ✅ |
//! | `tether_quote` | — | ✅ |
//!
//! A discriminator outside the registered set for a role fails with
//! `SchemaMismatch`; an explicit default arm in each dispatch makes the
//! fallthrough visible.

use serde_json::Value;

use super::{as_object, as_str, RawObject};
use crate::error::{FieldPath, Result, ValidationError};
use crate::literal;
use crate::normalize;
use crate::types::{
    ImageMetadata, ImagePointer, Role, ToolContent, ToolImagePart, ToolPart, UserContent, UserPart,
};

/// Content shapes registered for user messages, in dispatch order.
pub const USER_CONTENT_TYPES: &[&str] = &["text", "multimodal_text", "image_asset_pointer"];

/// Content shapes registered for tool messages, in dispatch order.
pub const TOOL_CONTENT_TYPES: &[&str] = &[
    "text",
    "system_error",
    "execution_output",
    "tether_browsing_display",
    "tether_quote",
    "multimodal_text",
];

/// Registered discriminator values for a role.
///
/// The tables are static and shared read-only; the variant set is fixed at
/// schema-design time, so there is no runtime registration.
pub fn registered_content_types(role: Role) -> &'static [&'static str] {
    match role {
        Role::User => USER_CONTENT_TYPES,
        Role::Tool => TOOL_CONTENT_TYPES,
    }
}

fn schema_mismatch(path: &FieldPath, role: Role, content_type: &str) -> ValidationError {
    ValidationError::SchemaMismatch {
        path: path.to_string(),
        role,
        content_type: content_type.to_string(),
    }
}

// ============================================
// User content
// ============================================

/// Validate a content object under the `user` role.
pub fn validate_user_content(path: &FieldPath, value: &Value) -> Result<UserContent> {
    let raw = RawObject::of(path.clone(), value)?;
    let tag = raw.require_str("content_type")?;

    match tag.as_str() {
        "text" => {
            // `parts` is the wire spelling, a one-element sequence wrapping
            // the string; already-canonical input stores `text` directly.
            // The wire key wins when both are present.
            let text = if let Some(parts) = raw.optional("parts") {
                let collapsed =
                    normalize::collapse_singleton(&raw.field_path("parts"), parts.clone())?;
                as_str(&raw.field_path("parts"), &collapsed)?
            } else if raw.optional("text").is_some() {
                raw.require_str("text")?
            } else {
                return Err(ValidationError::MissingRequiredField {
                    path: raw.field_path("parts").to_string(),
                });
            };
            Ok(UserContent::Text { text })
        }
        "multimodal_text" => {
            let parts_path = raw.field_path("parts");
            let promoted = normalize::promote_text_parts(raw.require_array("parts")?.clone());
            let mut parts = Vec::with_capacity(promoted.len());
            for (idx, part) in promoted.iter().enumerate() {
                parts.push(validate_user_part(&parts_path.index(idx), part)?);
            }
            Ok(UserContent::MultimodalText { parts })
        }
        "image_asset_pointer" => Ok(UserContent::ImageAssetPointer(validate_image_pointer(&raw)?)),
        other => Err(schema_mismatch(path, Role::User, other)),
    }
}

fn validate_user_part(path: &FieldPath, value: &Value) -> Result<UserPart> {
    let raw = RawObject::of(path.clone(), value)?;
    let tag = raw.require_str("content_type")?;
    match tag.as_str() {
        "text" => Ok(UserPart::Text {
            text: raw.require_str("text")?,
        }),
        "image_asset_pointer" => Ok(UserPart::ImageAssetPointer(validate_image_pointer(&raw)?)),
        other => Err(schema_mismatch(path, Role::User, other)),
    }
}

fn validate_image_pointer(raw: &RawObject) -> Result<ImagePointer> {
    let asset_pointer = raw.require_str("asset_pointer")?;
    let size_bytes = raw.require_u64("size_bytes")?;
    let width = raw.require_u64("width")?;
    let height = raw.require_u64("height")?;
    raw.require_literal("fovea", literal::NULL)?;
    let metadata = match raw.require("metadata")? {
        Value::Null => None,
        value => {
            let nested = RawObject::of(raw.field_path("metadata"), value)?;
            Some(validate_image_metadata(&nested)?)
        }
    };
    Ok(ImagePointer {
        asset_pointer,
        size_bytes,
        width,
        height,
        fovea: (),
        metadata,
    })
}

/// Every image-metadata field is pinned: null across the board except
/// `sanitized`, which must be `true`.
fn validate_image_metadata(raw: &RawObject) -> Result<ImageMetadata> {
    const PINNED_NULL: &[&str] = &[
        "dalle",
        "gizmo",
        "generation",
        "container_pixel_height",
        "container_pixel_width",
        "emu_omit_glimpse_image",
        "emu_patches_override",
        "asset_pointer_link",
        "watermarked_asset_pointer",
    ];
    for field in PINNED_NULL {
        raw.require_literal(field, literal::NULL)?;
    }
    raw.require_literal("sanitized", literal::TRUE)?;
    Ok(ImageMetadata::sanitized())
}

// ============================================
// Tool content
// ============================================

/// Validate a content object under the `tool` role.
pub fn validate_tool_content(path: &FieldPath, value: &Value) -> Result<ToolContent> {
    let raw = RawObject::of(path.clone(), value)?;
    let tag = raw.require_str("content_type")?;

    match tag.as_str() {
        "text" => Ok(ToolContent::Text {
            parts: raw.require_str_array("parts")?,
        }),
        "system_error" => Ok(ToolContent::SystemError {
            name: raw.require_str("name")?,
            text: raw.require_str("text")?,
        }),
        "execution_output" => Ok(ToolContent::ExecutionOutput {
            text: raw.require_str("text")?,
        }),
        "tether_browsing_display" => {
            let assets = raw.require("assets")?;
            literal::EMPTY_SEQ_OR_NULL.check(&raw.field_path("assets"), assets)?;
            Ok(ToolContent::TetherBrowsingDisplay {
                result: raw.require_str("result")?,
                summary: raw.nullable_str("summary")?,
                assets: assets.clone(),
            })
        }
        "tether_quote" => Ok(ToolContent::TetherQuote {
            url: raw.require_str("url")?,
            domain: raw.require_str("domain")?,
            text: raw.require_str("text")?,
            title: raw.require_str("title")?,
        }),
        "multimodal_text" => {
            let parts_path = raw.field_path("parts");
            let elems = raw.require_array("parts")?;
            let mut parts = Vec::with_capacity(elems.len());
            for (idx, part) in elems.iter().enumerate() {
                parts.push(validate_tool_part(&parts_path.index(idx), part)?);
            }
            Ok(ToolContent::MultimodalText { parts })
        }
        other => Err(schema_mismatch(path, Role::Tool, other)),
    }
}

fn validate_tool_part(path: &FieldPath, value: &Value) -> Result<ToolPart> {
    let raw = RawObject::of(path.clone(), value)?;
    let tag = raw.require_str("content_type")?;
    if tag != "image_asset_pointer" {
        return Err(schema_mismatch(path, Role::Tool, &tag));
    }
    let metadata = raw.require("metadata")?;
    as_object(&raw.field_path("metadata"), metadata)?;
    Ok(ToolPart::ImageAssetPointer(ToolImagePart {
        asset_pointer: raw.require_str("asset_pointer")?,
        size_bytes: raw.require_u64("size_bytes")?,
        width: raw.require_u64("width")?,
        height: raw.require_u64("height")?,
        fovea: raw.require_i64("fovea")?,
        metadata: metadata.clone(),
    }))
}
