//! Conversation tree linkage
//!
//! Individual records validate independently of one another; this module
//! checks the cross-record invariants of one conversation's keyed message
//! mapping and hosts the batch entry point for validating a whole mapping.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────┐     ┌────────────────┐
//! │  Keyed mapping   │ ──► │ validate_conversation│ ──► │ Conversation-  │
//! │ (id → raw record)│     │  per-record, then    │     │ Outcome        │
//! └──────────────────┘     │  check_linkage       │     └────────────────┘
//!                          └──────────────────────┘
//! ```
//!
//! Linkage only runs once every record has validated: it reads a completed,
//! immutable collection and acts as the sole synchronization barrier of the
//! pipeline. It never mutates or repairs the mapping. Skip-and-continue
//! versus abort-the-export is the caller's policy; the outcome reports every
//! per-record result alongside the tree-level errors.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::LinkageStrictness;
use crate::error::{LinkKind, Result, ValidationError};
use crate::types::Message;
use crate::validate::validate_message;

/// Per-record and tree-level results for one conversation mapping.
#[derive(Debug, Default)]
pub struct ConversationOutcome {
    /// Per-record outcome, keyed by mapping id (parallel to the input).
    pub records: BTreeMap<String, Result<Message>>,
    /// Tree-level dangling-reference errors. Empty when linkage passed, or
    /// when it was skipped because a record failed.
    pub linkage: Vec<ValidationError>,
}

impl ConversationOutcome {
    /// True when every record validated and no linkage errors were found.
    pub fn is_valid(&self) -> bool {
        self.linkage.is_empty() && self.records.values().all(|r| r.is_ok())
    }

    /// The validated messages keyed by id, when the outcome is fully valid.
    pub fn into_messages(self) -> Option<BTreeMap<String, Message>> {
        if !self.is_valid() {
            return None;
        }
        Some(
            self.records
                .into_iter()
                .filter_map(|(id, result)| result.ok().map(|message| (id, message)))
                .collect(),
        )
    }
}

/// Validate every record of a conversation mapping, then its tree linkage.
///
/// Record validation is all-or-nothing per record and independent across
/// records. Linkage errors are reported after all per-record results are
/// known, and only when every record validated — dangling-reference checks
/// over a partially-validated mapping would re-report the failing records.
pub fn validate_conversation(
    mapping: &Map<String, Value>,
    strictness: LinkageStrictness,
) -> ConversationOutcome {
    let mut valid: BTreeMap<String, Message> = BTreeMap::new();
    let mut failed: BTreeMap<String, ValidationError> = BTreeMap::new();

    for (id, record) in mapping {
        match validate_message(record) {
            Ok(message) => {
                valid.insert(id.clone(), message);
            }
            Err(err) => {
                failed.insert(id.clone(), err);
            }
        }
    }

    let linkage = if failed.is_empty() {
        check_linkage(&valid, strictness)
    } else {
        Vec::new()
    };

    debug!(
        records = mapping.len(),
        rejected = failed.len(),
        dangling = linkage.len(),
        strictness = strictness.as_str(),
        "validated conversation mapping"
    );

    let mut records: BTreeMap<String, Result<Message>> =
        valid.into_iter().map(|(id, m)| (id, Ok(m))).collect();
    records.extend(failed.into_iter().map(|(id, e)| (id, Err(e))));

    ConversationOutcome { records, linkage }
}

/// Check cross-record referential integrity over validated messages.
///
/// Verifies that each mapping key matches its record's id, that every
/// `parent` pointer and `children` entry resolves within the mapping, and —
/// at [`LinkageStrictness::Bidirectional`] — that each referenced child's
/// `parent` points back at the referencing record. Children that carry no
/// parent pointer at all (tool messages) are exempt from the back-link
/// check. Returns one error per broken link; the collection is borrowed,
/// never mutated.
pub fn check_linkage(
    messages: &BTreeMap<String, Message>,
    strictness: LinkageStrictness,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (key, message) in messages {
        if key != message.id() {
            errors.push(ValidationError::DanglingReference {
                id: key.clone(),
                link: LinkKind::MappingKey,
                target: message.id().to_string(),
            });
        }

        if let Some(parent) = message.parent() {
            if !messages.contains_key(parent) {
                errors.push(ValidationError::DanglingReference {
                    id: message.id().to_string(),
                    link: LinkKind::Parent,
                    target: parent.to_string(),
                });
            }
        }

        for child in message.children() {
            match messages.get(child) {
                None => errors.push(ValidationError::DanglingReference {
                    id: message.id().to_string(),
                    link: LinkKind::Child,
                    target: child.clone(),
                }),
                Some(child_message) => {
                    if strictness == LinkageStrictness::Bidirectional {
                        if let Some(back) = child_message.parent() {
                            if back != message.id() {
                                errors.push(ValidationError::DanglingReference {
                                    id: child.clone(),
                                    link: LinkKind::Parent,
                                    target: message.id().to_string(),
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    errors
}
