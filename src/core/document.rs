//! Document - one of the eight typed markdown slots per project
//!
//! Carries the merge engine: `append` grows the document, `upsert` replaces
//! a section identified by its first `##` header. Every merge bumps the
//! version counter and snapshots the result (see `Store::update_document`).

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::types::{DocType, UpdateMode, UpdateTrigger};

/// A document slot with its current content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier (ULID)
    pub id: Ulid,

    /// Owning project
    pub project_id: Ulid,

    /// Which of the eight slots this is
    pub doc_type: DocType,

    /// Mirror location relative to the docs root (`<name>/<type>.md`)
    pub file_path: String,

    /// Merge mode used when the caller does not pick one
    pub update_mode: UpdateMode,

    /// Current markdown content
    pub content: String,

    /// Monotonically increasing, starts at 1
    pub version: i64,

    pub last_modified: DateTime<Utc>,
}

/// Immutable snapshot of a document at one version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub id: Ulid,
    pub document_id: Ulid,
    /// Full content at snapshot time
    pub content: String,
    pub change_summary: String,
    pub trigger: UpdateTrigger,
    /// Matches the document's version when the snapshot was taken
    pub version_number: i64,
    pub created_at: DateTime<Utc>,
}

/// Version listing row (content omitted)
#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub id: Ulid,
    pub version_number: i64,
    pub change_summary: String,
    pub trigger: UpdateTrigger,
    pub created_at: DateTime<Utc>,
}

/// Apply incoming content to the current content under the given mode
pub fn merge(current: &str, incoming: &str, mode: UpdateMode) -> String {
    match mode {
        UpdateMode::Append => apply_append(current, incoming),
        UpdateMode::Upsert => apply_upsert(current, incoming),
    }
}

/// Append: trim trailing whitespace, blank line, trimmed incoming, newline
pub fn apply_append(current: &str, incoming: &str) -> String {
    format!("{}\n\n{}\n", current.trim_end(), incoming.trim())
}

/// Upsert: replace the section whose header matches the incoming key
///
/// The key is the text of the first `## ` header in the incoming content.
/// Matching is literal equality on the header line text (case-sensitive,
/// whitespace-trimmed). Without a key, or when no section matches, this
/// falls back to append, which adds the incoming content as a new section.
pub fn apply_upsert(current: &str, incoming: &str) -> String {
    let Some(key) = extract_upsert_key(incoming) else {
        return apply_append(current, incoming);
    };

    match find_section(current, &key) {
        Some((start, end)) => {
            let mut out = String::with_capacity(current.len() + incoming.len());
            out.push_str(&current[..start]);
            out.push_str(incoming.trim());
            out.push_str(&current[end..]);
            out
        }
        None => apply_append(current, incoming),
    }
}

/// Text of the first second-level markdown header, trimmed
pub fn extract_upsert_key(content: &str) -> Option<String> {
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("##") {
            // `###` is a deeper heading, `##x` is not a header at all
            if !rest.starts_with(' ') && !rest.starts_with('\t') {
                continue;
            }
            let text = rest.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

/// Byte range of the section headed by `key`: from its `##` line through the
/// character before the next `##` header, or end of content
fn find_section(content: &str, key: &str) -> Option<(usize, usize)> {
    let header = Regex::new(&format!(r"(?m)^##[ \t]+{}[ \t]*$", regex::escape(key))).ok()?;
    let m = header.find(content)?;

    // Next second-level header bounds the section
    let boundary = Regex::new(r"\n##\s").ok()?;
    let end = boundary
        .find(&content[m.end()..])
        .map(|b| m.end() + b.start())
        .unwrap_or(content.len());

    Some((m.start(), end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_format() {
        let merged = apply_append("# Notes\n\nexisting\n\n", "new line");
        assert_eq!(merged, "# Notes\n\nexisting\n\nnew line\n");
    }

    #[test]
    fn test_append_never_removes() {
        let current = "# To-Do List\n\n## 2025-02-10\n- [ ] A";
        let merged = apply_append(current, "- [ ] B");
        assert!(merged.starts_with(current.trim_end()));
        assert!(merged.len() >= current.trim_end().len() + "- [ ] B".len());
        // Order preserved
        let a = merged.find("- [ ] A").unwrap();
        let b = merged.find("- [ ] B").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_extract_key_first_header_wins() {
        let key = extract_upsert_key("intro\n## First\nbody\n## Second\n").unwrap();
        assert_eq!(key, "First");
    }

    #[test]
    fn test_extract_key_skips_deeper_headers() {
        assert_eq!(extract_upsert_key("### Sub\ntext"), None);
        assert_eq!(
            extract_upsert_key("### Sub\n## Real\n").as_deref(),
            Some("Real")
        );
    }

    #[test]
    fn test_upsert_replaces_section_in_place() {
        let current =
            "# Current Progress\n\n## Current Sprint\n**Status:** Not started\n\n## Backlog\n- item\n";
        let incoming = "## Current Sprint\n**Status:** In progress";
        let merged = apply_upsert(current, incoming);

        assert!(merged.contains("**Status:** In progress"));
        assert!(!merged.contains("Not started"));
        // Untouched section survives
        assert!(merged.contains("## Backlog\n- item"));
        // Exactly one occurrence of the header
        assert_eq!(merged.matches("## Current Sprint").count(), 1);
    }

    #[test]
    fn test_upsert_replaces_trailing_section() {
        let current = "# Confirm\n\n## Q1: Redis or Memcached?\n**Status:** Pending\n";
        let incoming = "## Q1: Redis or Memcached?\n**Status:** Confirmed\n**Decision:** Redis";
        let merged = apply_upsert(current, incoming);

        assert!(merged.contains("Confirmed"));
        assert!(!merged.contains("Pending"));
        assert_eq!(merged.matches("## Q1: Redis or Memcached?").count(), 1);
    }

    #[test]
    fn test_upsert_missing_key_appends() {
        let current = "# Confirm\n\n## Q1\n**Status:** Pending\n";
        let incoming = "## Q2\n**Status:** Open";
        let merged = apply_upsert(current, incoming);

        // Old content is a preserved prefix, new section appended
        assert!(merged.starts_with(current.trim_end()));
        assert!(merged.contains("## Q1"));
        assert!(merged.ends_with("## Q2\n**Status:** Open\n"));
    }

    #[test]
    fn test_upsert_without_header_appends() {
        let current = "# Notes\n\nplain text\n";
        let merged = apply_upsert(current, "more plain text");
        assert_eq!(merged, "# Notes\n\nplain text\n\nmore plain text\n");
    }

    #[test]
    fn test_upsert_keys_are_case_sensitive() {
        // "## q1" and "## Q1" are distinct keys and must not collide
        let current = "# Confirm\n\n## Q1\n**Status:** Pending\n";
        let incoming = "## q1\n**Status:** Confirmed";
        let merged = apply_upsert(current, incoming);

        assert!(merged.contains("## Q1\n**Status:** Pending"));
        assert!(merged.contains("## q1\n**Status:** Confirmed"));
    }

    #[test]
    fn test_upsert_trailing_punctuation_distinct() {
        let current = "# Confirm\n\n## Ship it?\nPending\n";
        let incoming = "## Ship it\nDone";
        let merged = apply_upsert(current, incoming);

        // Punctuation difference means no match: appended, both present
        assert!(merged.contains("## Ship it?\nPending"));
        assert!(merged.ends_with("## Ship it\nDone\n"));
    }

    #[test]
    fn test_upsert_key_with_regex_metacharacters() {
        let current = "# Qa\n\n## What does (a|b)* match?\nEverything\n\n## Other\nx\n";
        let incoming = "## What does (a|b)* match?\nOnly a's and b's";
        let merged = apply_upsert(current, incoming);

        assert!(merged.contains("Only a's and b's"));
        assert!(!merged.contains("Everything"));
        assert!(merged.contains("## Other\nx"));
    }

    #[test]
    fn test_merge_dispatch() {
        let current = "# Doc\n\ntext\n";
        assert_eq!(
            merge(current, "more", UpdateMode::Append),
            apply_append(current, "more")
        );
        assert_eq!(
            merge(current, "## S\nbody", UpdateMode::Upsert),
            apply_upsert(current, "## S\nbody")
        );
    }
}
