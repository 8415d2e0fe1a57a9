//! Canonical domain types for chatvet
//!
//! These types are the strict representation that validation produces from
//! the loosely-typed export format. Field names, literal values, and
//! discriminator tags mirror the wire contract exactly; a validated record
//! re-serializes to the canonical normalized shape (absent optional fields
//! serialize as `null`, never omitted).
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Conversation** | One exported conversation: a keyed mapping of message records forming a tree |
//! | **Message** | A node's payload in the conversation tree, authored by one role |
//! | **Role** | The author-role discriminator selecting which record shape applies |
//! | **Content** | The message body, discriminated by `content_type` |
//! | **Pinned field** | A field the export format constrains to a single literal value |
//!
//! Pinned-to-null fields are carried as `()` so the canonical serialization
//! still emits them as `null`.
//!
//! All types here are immutable value objects: the validators construct them
//! once and nothing mutates them afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Convert an epoch-seconds float from the wire format to a UTC timestamp.
fn epoch_seconds_to_utc(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0) as i64)
}

// ============================================
// Role and shared closed enums
// ============================================

/// Role of the message author; the record-shape discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "tool" => Ok(Role::Tool),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// Lifecycle state of a message.
///
/// User messages only ever appear as `finished_successfully`; tool messages
/// may additionally be `in_progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    FinishedSuccessfully,
    InProgress,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::FinishedSuccessfully => "finished_successfully",
            MessageStatus::InProgress => "in_progress",
        }
    }
}

impl std::str::FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "finished_successfully" => Ok(MessageStatus::FinishedSuccessfully),
            "in_progress" => Ok(MessageStatus::InProgress),
            _ => Err(format!("unknown message status: {}", s)),
        }
    }
}

/// Message recipient; the export format pins this to `"all"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    All,
}

/// Timestamp interpretation marker carried in metadata, pinned to
/// `"absolute"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampMode {
    Absolute,
}

// ============================================
// User message content
// ============================================

/// Content shapes valid under the `user` role, keyed by `content_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "content_type", rename_all = "snake_case")]
pub enum UserContent {
    /// Plain text. The wire form wraps the string in a one-element `parts`
    /// sequence; the canonical form stores it directly.
    Text { text: String },
    /// Ordered mix of text and image parts.
    MultimodalText { parts: Vec<UserPart> },
    /// A bare image reference.
    ImageAssetPointer(ImagePointer),
}

/// One element of a user `multimodal_text` parts sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "content_type", rename_all = "snake_case")]
pub enum UserPart {
    Text { text: String },
    ImageAssetPointer(ImagePointer),
}

/// Reference to an uploaded or generated image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePointer {
    pub asset_pointer: String,
    pub size_bytes: u64,
    pub width: u64,
    pub height: u64,
    /// Pinned null for user-role images
    pub fovea: (),
    pub metadata: Option<ImageMetadata>,
}

impl ImagePointer {
    /// Pixel dimensions as (width, height).
    pub fn dimensions(&self) -> (u64, u64) {
        (self.width, self.height)
    }
}

/// Image metadata is fully pinned by the export format: every field is null
/// except `sanitized`, which is always `true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageMetadata {
    pub dalle: (),
    pub gizmo: (),
    pub generation: (),
    pub container_pixel_height: (),
    pub container_pixel_width: (),
    pub emu_omit_glimpse_image: (),
    pub emu_patches_override: (),
    pub sanitized: bool,
    pub asset_pointer_link: (),
    pub watermarked_asset_pointer: (),
}

impl ImageMetadata {
    /// The only value the export format produces.
    pub fn sanitized() -> Self {
        Self {
            dalle: (),
            gizmo: (),
            generation: (),
            container_pixel_height: (),
            container_pixel_width: (),
            emu_omit_glimpse_image: (),
            emu_patches_override: (),
            sanitized: true,
            asset_pointer_link: (),
            watermarked_asset_pointer: (),
        }
    }
}

// ============================================
// Tool message content
// ============================================

/// Content shapes valid under the `tool` role, keyed by `content_type`.
///
/// `text` and `multimodal_text` also exist under the user role but with
/// different sub-shapes: tool `text` keeps its `parts` sequence uncollapsed,
/// and tool `multimodal_text` admits image parts only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "content_type", rename_all = "snake_case")]
pub enum ToolContent {
    Text {
        parts: Vec<String>,
    },
    SystemError {
        name: String,
        text: String,
    },
    ExecutionOutput {
        text: String,
    },
    TetherBrowsingDisplay {
        result: String,
        summary: Option<String>,
        /// Always the empty sequence or null
        assets: Value,
    },
    TetherQuote {
        url: String,
        domain: String,
        text: String,
        title: String,
    },
    MultimodalText {
        parts: Vec<ToolPart>,
    },
}

/// One element of a tool `multimodal_text` parts sequence; image parts are
/// the only registered shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "content_type", rename_all = "snake_case")]
pub enum ToolPart {
    ImageAssetPointer(ToolImagePart),
}

/// Image reference emitted by a tool, e.g. a browser screenshot.
///
/// Unlike the user-role [`ImagePointer`], `fovea` is a required integer and
/// `metadata` is an opaque object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolImagePart {
    pub asset_pointer: String,
    pub size_bytes: u64,
    pub width: u64,
    pub height: u64,
    pub fovea: i64,
    pub metadata: Value,
}

// ============================================
// User message metadata
// ============================================

/// A search source selector; `"web"` is the only value the format emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectedSource {
    Web,
}

/// Hint attached by the product UI; `"search"` is the only value observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemHint {
    Search,
}

/// File attached to a user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub size: i64,
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub file_token_size: Option<i64>,
}

/// Serialization bookkeeping; offsets are always null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerializationMetadata {
    pub custom_symbol_offsets: Vec<()>,
}

/// Display treatment of a parallel-generation variant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayTreatment {
    Skippable,
}

/// Parallel-generation variant info attached to regenerated turns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParagenVariantsInfo {
    /// Pinned to `"num_variants_in_stream"`
    #[serde(rename = "type")]
    pub kind: VariantsInfoKind,
    pub num_variants_in_stream: i64,
    pub display_treatment: DisplayTreatment,
    pub conversation_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantsInfoKind {
    NumVariantsInStream,
}

/// Metadata bag of a user message.
///
/// Every field is a typed optional or a pinned literal; absent optional
/// fields normalize to null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserMetadata {
    pub request_id: Option<String>,
    #[serde(rename = "timestamp_")]
    pub timestamp: TimestampMode,
    pub message_type: (),
    pub attachments: Option<Vec<Attachment>>,
    pub targeted_reply: Option<String>,
    /// Pinned `true` when present
    pub voice_mode_message: Option<bool>,
    pub gizmo_id: Option<String>,
    pub message_source: (),
    pub selected_sources: Option<Vec<SelectedSource>>,
    pub selected_github_repos: Option<Vec<()>>,
    pub serialization_metadata: Option<SerializationMetadata>,
    pub paragen_variants_info: Option<ParagenVariantsInfo>,
    pub paragen_variant_choice: Option<String>,
    pub caterpillar_selected_sources: Option<Vec<SelectedSource>>,
    pub system_hints: Option<Vec<SystemHint>>,
}

// ============================================
// Tool message author and metadata
// ============================================

/// Author block of a tool message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolAuthor {
    /// Always [`Role::Tool`]
    pub role: Role,
    /// Default tool name (`browser`, `python`, ...) or an installed plugin
    /// name; the member set is open, so this stays a plain string.
    pub name: String,
    /// Always the empty object
    pub metadata: Value,
}

/// Browsing-tool command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserCommand {
    Search,
    Mclick,
    Click,
    QuoteLines,
    Back,
    Quote,
    OpenUrl,
    Scroll,
}

impl BrowserCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserCommand::Search => "search",
            BrowserCommand::Mclick => "mclick",
            BrowserCommand::Click => "click",
            BrowserCommand::QuoteLines => "quote_lines",
            BrowserCommand::Back => "back",
            BrowserCommand::Quote => "quote",
            BrowserCommand::OpenUrl => "open_url",
            BrowserCommand::Scroll => "scroll",
        }
    }
}

impl std::str::FromStr for BrowserCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(BrowserCommand::Search),
            "mclick" => Ok(BrowserCommand::Mclick),
            "click" => Ok(BrowserCommand::Click),
            "quote_lines" => Ok(BrowserCommand::QuoteLines),
            "back" => Ok(BrowserCommand::Back),
            "quote" => Ok(BrowserCommand::Quote),
            "open_url" => Ok(BrowserCommand::OpenUrl),
            "scroll" => Ok(BrowserCommand::Scroll),
            _ => Err(format!("unknown browser command: {}", s)),
        }
    }
}

/// Outcome of a tool command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Finished,
    Failed,
}

impl CommandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Finished => "finished",
            CommandStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for CommandStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "finished" => Ok(CommandStatus::Finished),
            "failed" => Ok(CommandStatus::Failed),
            _ => Err(format!("unknown command status: {}", s)),
        }
    }
}

/// Arguments recorded for a tool command: strings, integers, or integer
/// sequences, never mixed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandArgs {
    Strings(Vec<String>),
    Numbers(Vec<i64>),
    NumberSeqs(Vec<Vec<i64>>),
}

/// Record of a plugin invocation behind a tool message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvokedPlugin {
    /// Pinned to `"remote"`
    #[serde(rename = "type")]
    pub kind: PluginKind,
    pub namespace: String,
    pub plugin_id: String,
    pub http_response_status: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginKind {
    Remote,
}

/// Why generation stopped; `interrupted` is the only recorded reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FinishDetails {
    Interrupted,
}

/// Metadata bag of a tool message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolMetadata {
    pub message_type: (),
    pub model_slug: String,
    #[serde(rename = "timestamp_")]
    pub timestamp: TimestampMode,
    pub default_model_slug: Option<String>,
    pub parent_id: Option<String>,
    pub request_id: Option<String>,
    pub is_complete: Option<bool>,
    /// Opaque per-tool result aggregate
    pub aggregate_result: Option<Value>,
    /// Accepted under the legacy wire key `_cite_metadata`
    pub cite_metadata: Option<Value>,
    pub command: Option<BrowserCommand>,
    pub args: Option<CommandArgs>,
    pub status: Option<CommandStatus>,
    pub invoked_plugin: Option<InvokedPlugin>,
    pub finish_details: Option<FinishDetails>,
}

// ============================================
// Message records
// ============================================

/// A validated user-authored message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserMessage {
    /// Unique within the conversation mapping
    pub id: String,
    /// Id of the preceding node in the conversation tree
    pub parent: String,
    /// Always [`Role::User`]
    pub role: Role,
    pub name: (),
    pub author_metadata: (),
    /// Epoch seconds
    pub create_time: f64,
    pub update_time: (),
    /// Always `finished_successfully` for user messages
    pub status: MessageStatus,
    pub end_turn: (),
    pub weight: f64,
    pub recipient: Recipient,
    pub channel: (),
    pub content: UserContent,
    pub metadata: UserMetadata,
    /// Ordered ids of the child nodes
    pub children: Vec<String>,
}

impl UserMessage {
    /// Creation time as a UTC timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        epoch_seconds_to_utc(self.create_time)
    }
}

/// A validated tool-authored message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolMessage {
    /// Unique within the conversation mapping
    pub id: String,
    pub author: ToolAuthor,
    /// Epoch seconds
    pub create_time: f64,
    /// Epoch seconds; null for still-running tools
    pub update_time: Option<f64>,
    pub content: ToolContent,
    pub status: MessageStatus,
    pub end_turn: (),
    pub weight: f64,
    pub metadata: ToolMetadata,
    pub recipient: Recipient,
}

impl ToolMessage {
    /// Creation time as a UTC timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        epoch_seconds_to_utc(self.create_time)
    }

    /// Last update as a UTC timestamp, when recorded.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.update_time.and_then(epoch_seconds_to_utc)
    }
}

/// A validated message of either role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
    User(UserMessage),
    Tool(ToolMessage),
}

impl Message {
    pub fn id(&self) -> &str {
        match self {
            Message::User(m) => &m.id,
            Message::Tool(m) => &m.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::User(_) => Role::User,
            Message::Tool(_) => Role::Tool,
        }
    }

    /// The parent pointer, for roles that carry one.
    pub fn parent(&self) -> Option<&str> {
        match self {
            Message::User(m) => Some(&m.parent),
            Message::Tool(_) => None,
        }
    }

    /// Child ids, empty for roles that carry none.
    pub fn children(&self) -> &[String] {
        match self {
            Message::User(m) => &m.children,
            Message::Tool(_) => &[],
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Message::User(m) => m.created_at(),
            Message::Tool(m) => m.created_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_round_trip() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("tool".parse::<Role>().unwrap(), Role::Tool);
        assert_eq!(Role::Tool.as_str(), "tool");
        assert!("assistant".parse::<Role>().is_err());
    }

    #[test]
    fn test_message_status_round_trip() {
        assert_eq!(
            "in_progress".parse::<MessageStatus>().unwrap(),
            MessageStatus::InProgress
        );
        assert_eq!(
            MessageStatus::FinishedSuccessfully.as_str(),
            "finished_successfully"
        );
        assert!("queued".parse::<MessageStatus>().is_err());
    }

    #[test]
    fn test_browser_command_round_trip() {
        for cmd in [
            BrowserCommand::Search,
            BrowserCommand::Mclick,
            BrowserCommand::QuoteLines,
            BrowserCommand::OpenUrl,
        ] {
            assert_eq!(cmd.as_str().parse::<BrowserCommand>().unwrap(), cmd);
        }
        assert!("navigate".parse::<BrowserCommand>().is_err());
    }

    #[test]
    fn test_text_content_serializes_canonically() {
        let content = UserContent::Text {
            text: "hello".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({"content_type": "text", "text": "hello"})
        );
    }

    #[test]
    fn test_image_pointer_serializes_with_tag_and_nulls() {
        let content = UserContent::ImageAssetPointer(ImagePointer {
            asset_pointer: "file-service://file-abc".to_string(),
            size_bytes: 2048,
            width: 640,
            height: 480,
            fovea: (),
            metadata: None,
        });
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({
                "content_type": "image_asset_pointer",
                "asset_pointer": "file-service://file-abc",
                "size_bytes": 2048,
                "width": 640,
                "height": 480,
                "fovea": null,
                "metadata": null,
            })
        );
    }

    #[test]
    fn test_finish_details_serializes_tagged() {
        assert_eq!(
            serde_json::to_value(FinishDetails::Interrupted).unwrap(),
            json!({"type": "interrupted"})
        );
    }

    #[test]
    fn test_command_args_serialize_untagged() {
        assert_eq!(
            serde_json::to_value(CommandArgs::Strings(vec!["q".to_string()])).unwrap(),
            json!(["q"])
        );
        assert_eq!(
            serde_json::to_value(CommandArgs::NumberSeqs(vec![vec![1, 4]])).unwrap(),
            json!([[1, 4]])
        );
    }

    #[test]
    fn test_epoch_conversion() {
        let dt = epoch_seconds_to_utc(1714500000.5).unwrap();
        assert_eq!(dt.timestamp(), 1714500000);
        assert!(epoch_seconds_to_utc(f64::NAN).is_none());
    }
}
