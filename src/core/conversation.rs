//! Conversation log - audit trail of auto-classified updates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::types::{DocType, UpdateMode};

/// One document update applied during an auto-classification pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedUpdate {
    pub doc_type: DocType,
    pub mode: UpdateMode,
    /// Short excerpt of the applied content
    pub snippet: String,
}

/// Record of one classified conversation summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationLog {
    pub id: Ulid,

    /// Nullable; the project may be deleted later (FK SET NULL)
    pub project_id: Option<Ulid>,

    pub summary: String,

    /// Updates applied by the classifier, in application order
    pub updates_applied: Vec<AppliedUpdate>,

    pub conversation_start: DateTime<Utc>,
    pub conversation_end: DateTime<Utc>,
}
