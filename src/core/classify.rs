//! Rule-based conversation classifier
//!
//! Routes a free-text conversation summary to one or more document merges
//! by keyword presence. Deliberately simple; a summary may trigger several
//! rules at once, and one that triggers none lands in `notes`.

use chrono::NaiveDate;

use super::text::prefix_chars;
use super::types::{DocType, UpdateMode};

/// A merge synthesized from a conversation summary
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedUpdate {
    pub doc_type: DocType,
    pub mode: UpdateMode,
    pub content: String,
}

/// Classify a summary into document updates, in rule order
pub fn classify(summary: &str, today: NaiveDate) -> Vec<ClassifiedUpdate> {
    let lower = summary.to_lowercase();
    let date = today.format("%Y-%m-%d");
    let mut updates = Vec::new();

    let any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if any(&["todo", "task", "need to", "should"]) {
        updates.push(ClassifiedUpdate {
            doc_type: DocType::Todo,
            mode: UpdateMode::Append,
            content: format!("## {}\n- [ ] {}", date, prefix_chars(summary, 200)),
        });
    }

    if any(&["implemented", "completed", "fixed", "added"]) {
        updates.push(ClassifiedUpdate {
            doc_type: DocType::Progress,
            mode: UpdateMode::Upsert,
            content: format!(
                "## Current Sprint\n**Status:** In progress\n**Last update:** {}\n\n{}",
                date,
                prefix_chars(summary, 300)
            ),
        });
    }

    if any(&["decided", "learned", "discovered", "architecture"]) {
        updates.push(ClassifiedUpdate {
            doc_type: DocType::Memory,
            mode: UpdateMode::Append,
            content: format!(
                "## {} - Session Notes\n{}",
                date,
                prefix_chars(summary, 300)
            ),
        });
    }

    if any(&["delay", "blocked", "issue", "problem"]) {
        updates.push(ClassifiedUpdate {
            doc_type: DocType::Delays,
            mode: UpdateMode::Append,
            content: format!(
                "## {}\n**Reason:** {}\n**Impact:** TBD\n**Mitigation:** TBD",
                date,
                prefix_chars(summary, 200)
            ),
        });
    }

    if any(&["question", "how to", "?"]) {
        updates.push(ClassifiedUpdate {
            doc_type: DocType::Notes,
            mode: UpdateMode::Append,
            content: format!("## {}\n{}", date, prefix_chars(summary, 300)),
        });
    }

    // Nothing matched: keep the summary as a general note
    if updates.is_empty() {
        updates.push(ClassifiedUpdate {
            doc_type: DocType::Notes,
            mode: UpdateMode::Append,
            content: format!("## {}\n{}", date, prefix_chars(summary, 300)),
        });
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()
    }

    fn types(updates: &[ClassifiedUpdate]) -> Vec<DocType> {
        updates.iter().map(|u| u.doc_type).collect()
    }

    #[test]
    fn test_todo_rule() {
        let updates = classify("We still need to wire up the retry logic", today());
        assert_eq!(types(&updates), vec![DocType::Todo]);
        assert_eq!(updates[0].mode, UpdateMode::Append);
        assert!(updates[0].content.starts_with("## 2025-02-10\n- [ ]"));
    }

    #[test]
    fn test_progress_rule() {
        let updates = classify("Implemented the connection pool", today());
        assert_eq!(types(&updates), vec![DocType::Progress]);
        assert_eq!(updates[0].mode, UpdateMode::Upsert);
        assert!(updates[0].content.contains("## Current Sprint"));
    }

    #[test]
    fn test_memory_rule() {
        let updates = classify("Decided on a layered architecture", today());
        assert!(types(&updates).contains(&DocType::Memory));
    }

    #[test]
    fn test_delays_rule() {
        let updates = classify("Deployment is blocked on the cert rotation", today());
        assert_eq!(types(&updates), vec![DocType::Delays]);
        assert!(updates[0].content.contains("**Reason:**"));
    }

    #[test]
    fn test_question_goes_to_notes() {
        let updates = classify("How does the scheduler pick a worker?", today());
        assert_eq!(types(&updates), vec![DocType::Notes]);
    }

    #[test]
    fn test_multiple_rules_fire_in_order() {
        let updates = classify(
            "Fixed the cache bug, but the rollout is blocked; need to update the runbook",
            today(),
        );
        assert_eq!(
            types(&updates),
            vec![DocType::Todo, DocType::Progress, DocType::Delays]
        );
    }

    #[test]
    fn test_fallback_to_notes() {
        let updates = classify("General discussion about the roadmap", today());
        assert_eq!(types(&updates), vec![DocType::Notes]);
        assert_eq!(updates[0].mode, UpdateMode::Append);
        assert!(updates[0].content.contains("General discussion"));
    }

    #[test]
    fn test_excerpt_truncated() {
        let long = "need to ".repeat(100);
        let updates = classify(&long, today());
        let body = updates[0].content.lines().nth(1).unwrap();
        // "- [ ] " + 200 chars
        assert!(body.chars().count() <= 206);
    }
}
