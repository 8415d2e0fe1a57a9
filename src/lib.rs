//! # chatvet
//!
//! Strict validation and normalization of exported assistant conversations.
//!
//! The export format is an undocumented, loosely-typed wire shape: optional
//! fields mix with singleton literal values, and message content changes
//! shape based on a `content_type` discriminator. This library reduces one
//! raw record at a time into a strongly-typed, immutable [`Message`] — or a
//! structured [`ValidationError`] naming the exact field path — and checks
//! the cross-record tree invariants of a whole conversation mapping.
//!
//! ## Architecture
//!
//! Data flows strictly upward through four layers:
//! - **Normalizer:** pure rewrites of tolerant/legacy input shapes
//!   ([`normalize`])
//! - **Content registry:** (role, `content_type`)-keyed dispatch to the
//!   closed content shapes ([`validate`])
//! - **Record validators:** assemble typed user/tool messages ([`validate`])
//! - **Tree linkage:** cross-record referential integrity ([`conversation`])
//!
//! Validation is synchronous, CPU-bound, and I/O-free. Records validate
//! independently, so callers may fan a conversation's records out across
//! threads; only the linkage pass needs the completed collection.
//!
//! ## Example
//!
//! ```rust
//! use chatvet::{validate_message, Message, UserContent};
//! use serde_json::json;
//!
//! let record = json!({
//!     "id": "u1",
//!     "parent": "root",
//!     "role": "user",
//!     "name": null,
//!     "author_metadata": null,
//!     "create_time": 1714500000.0,
//!     "update_time": null,
//!     "status": "finished_successfully",
//!     "end_turn": null,
//!     "weight": 1.0,
//!     "recipient": "all",
//!     "channel": null,
//!     "content": {"content_type": "text", "parts": ["hello"]},
//!     "metadata": {"timestamp_": "absolute", "message_type": null},
//!     "children": [],
//! });
//!
//! let message = validate_message(&record).expect("record conforms to the export schema");
//! match message {
//!     Message::User(user) => {
//!         assert_eq!(user.content, UserContent::Text { text: "hello".to_string() });
//!     }
//!     Message::Tool(_) => unreachable!(),
//! }
//! ```

// Re-export commonly used items at the crate root
pub use config::{Config, LinkageStrictness};
pub use conversation::{check_linkage, validate_conversation, ConversationOutcome};
pub use error::{ErrorKind, FieldPath, LinkKind, Result, ValidationError};
pub use types::*;
pub use validate::{
    detect_role, registered_content_types, validate_message, validate_tool_content,
    validate_tool_message, validate_user_content, validate_user_message,
};

// Public modules
pub mod config;
pub mod conversation;
pub mod error;
pub mod literal;
pub mod logging;
pub mod normalize;
pub mod types;
pub mod validate;
