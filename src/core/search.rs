//! Keyword search engine
//!
//! Scores documents by literal substring frequency of the query tokens and
//! extracts the densest snippet window per hit. Intentionally
//! O(content length x token count) per document; fine at knowledge-base
//! scale.

use serde::Serialize;
use ulid::Ulid;

use super::error::Result;
use super::store::Store;
use super::types::DocType;

/// Snippet window size in characters
const SNIPPET_WINDOW: usize = 300;
/// Window slide step
const SNIPPET_STEP: usize = 50;
/// Lead-in kept before the best window
const SNIPPET_LEAD: usize = 20;

/// Default maximum number of hits
pub const DEFAULT_LIMIT: usize = 10;

/// Search parameters
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Free-text query, tokenized on whitespace
    pub query: String,
    /// Restrict to one project
    pub project_id: Option<Ulid>,
    /// Restrict to these doc types (empty = all)
    pub doc_types: Vec<DocType>,
    /// Maximum hits returned
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            project_id: None,
            doc_types: Vec::new(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn in_project(mut self, project_id: Ulid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_doc_types(mut self, doc_types: Vec<DocType>) -> Self {
        self.doc_types = doc_types;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A scored search hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub project_id: Ulid,
    pub project_name: String,
    pub doc_type: DocType,
    /// Densest excerpt of the matched document
    pub snippet: String,
    /// Total keyword occurrences; always > 0
    pub score: usize,
}

/// Read-side engine over the store
pub struct SearchEngine<'a> {
    store: &'a Store,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Run a query: fetch candidates, score, rank, snip
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let tokens = tokenize(&query.query);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self
            .store
            .search_candidates(query.project_id, &query.doc_types)?;

        let mut hits: Vec<SearchHit> = Vec::new();
        for candidate in candidates {
            let lower = candidate.content.to_lowercase();
            let score = count_occurrences(&lower, &tokens);
            if score == 0 {
                continue;
            }
            hits.push(SearchHit {
                project_id: candidate.project_id,
                project_name: candidate.project_name,
                doc_type: candidate.doc_type,
                snippet: extract_snippet(&candidate.content, &lower, &tokens),
                score,
            });
        }

        // Stable: ties keep the fetch order (last modified first)
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(query.limit);

        Ok(hits)
    }
}

/// Lowercase whitespace tokens, single characters discarded
fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Sum of non-overlapping literal occurrences of every token
fn count_occurrences(lower: &str, tokens: &[String]) -> usize {
    tokens.iter().map(|t| lower.matches(t.as_str()).count()).sum()
}

/// Pick the densest fixed-size window and cut the original-case excerpt
///
/// Windows slide over the lowercased content in fixed steps; the
/// first-seen best offset wins ties. The excerpt starts a little before
/// the window and carries ellipses when clipped.
fn extract_snippet(content: &str, lower: &str, tokens: &[String]) -> String {
    let mut best_index = 0;
    let mut best_score = 0;

    let mut i = 0;
    while i < lower.len() {
        let start = floor_char_boundary(lower, i);
        let end = floor_char_boundary(lower, (i + SNIPPET_WINDOW).min(lower.len()));
        let score = count_occurrences(&lower[start..end], tokens);
        if score > best_score {
            best_score = score;
            best_index = start;
        }
        i += SNIPPET_STEP;
    }

    let start = floor_char_boundary(content, best_index.saturating_sub(SNIPPET_LEAD));
    let end = floor_char_boundary(content, (start + SNIPPET_WINDOW).min(content.len()));
    let mut snippet = content[start..end].trim().to_string();

    if start > 0 {
        snippet = format!("...{}", snippet);
    }
    if end < content.len() {
        snippet.push_str("...");
    }

    snippet
}

/// Largest char boundary not beyond `index`
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::NewProject;
    use crate::core::types::UpdateTrigger;

    #[test]
    fn test_tokenize_drops_short_tokens() {
        assert_eq!(tokenize("Caching A Redis"), vec!["caching", "redis"]);
        assert!(tokenize("a b c").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_count_is_substring_based() {
        // Not word-boundary aware, by design
        let tokens = tokenize("cache");
        assert_eq!(count_occurrences("cache caches cached", &tokens), 3);

        // Non-overlapping occurrences
        let tokens = tokenize("aa");
        assert_eq!(count_occurrences("aaaa", &tokens), 2);
    }

    #[test]
    fn test_snippet_short_content_untouched() {
        let content = "Implemented the caching layer";
        let lower = content.to_lowercase();
        let snippet = extract_snippet(content, &lower, &tokenize("caching"));
        assert_eq!(snippet, content);
    }

    #[test]
    fn test_snippet_finds_dense_region() {
        let filler = "x".repeat(600);
        let content = format!("{} caching redis caching redis caching tail", filler);
        let lower = content.to_lowercase();
        let snippet = extract_snippet(&content, &lower, &tokenize("caching redis"));

        assert!(snippet.starts_with("..."));
        assert!(snippet.contains("caching redis"));
    }

    #[test]
    fn test_snippet_suffix_ellipsis_when_clipped() {
        let content = format!("caching first, then {}", "y".repeat(600));
        let lower = content.to_lowercase();
        let snippet = extract_snippet(&content, &lower, &tokenize("caching"));

        assert!(snippet.starts_with("caching"));
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_floor_char_boundary() {
        let s = "héllo";
        // 'é' spans bytes 1..3
        assert_eq!(floor_char_boundary(s, 2), 1);
        assert_eq!(floor_char_boundary(s, 3), 3);
        assert_eq!(floor_char_boundary(s, 99), s.len());
    }

    // ----- end to end against a store -----

    fn project(store: &mut Store, name: &str) -> Ulid {
        store
            .create_project(&NewProject::new(name, format!("/tmp/{}", name)))
            .unwrap()
            .id
    }

    fn note(store: &mut Store, project_id: Ulid, doc_type: DocType, content: &str) {
        store
            .update_document(
                project_id,
                doc_type,
                content,
                None,
                UpdateTrigger::Manual,
                None,
            )
            .unwrap();
    }

    #[test]
    fn test_search_finds_by_keyword() {
        let mut store = Store::open_memory().unwrap();
        let p = project(&mut store, "search-test");
        note(
            &mut store,
            p,
            DocType::Notes,
            "## 2025-02-10\nImplemented caching layer for Redis",
        );

        let engine = SearchEngine::new(&store);
        let hits = engine.search(&SearchQuery::new("caching Redis")).unwrap();

        assert!(!hits.is_empty());
        assert!(hits[0].snippet.contains("caching"));
        assert!(hits.iter().all(|h| h.score > 0));
    }

    #[test]
    fn test_search_scoped_to_project() {
        let mut store = Store::open_memory().unwrap();
        let p1 = project(&mut store, "proj-1");
        let p2 = project(&mut store, "proj-2");
        note(&mut store, p1, DocType::Notes, "special keyword zebra");
        note(&mut store, p2, DocType::Notes, "special keyword zebra");

        let engine = SearchEngine::new(&store);
        let hits = engine
            .search(&SearchQuery::new("zebra").in_project(p1))
            .unwrap();

        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.project_id == p1));
    }

    #[test]
    fn test_search_filters_doc_types() {
        let mut store = Store::open_memory().unwrap();
        let p = project(&mut store, "filter-test");
        note(&mut store, p, DocType::Todo, "- [ ] unique keyword bravo");
        note(&mut store, p, DocType::Notes, "unique keyword bravo in notes");

        let engine = SearchEngine::new(&store);
        let hits = engine
            .search(&SearchQuery::new("bravo").with_doc_types(vec![DocType::Todo]))
            .unwrap();

        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.doc_type == DocType::Todo));
    }

    #[test]
    fn test_search_no_match_is_empty() {
        let mut store = Store::open_memory().unwrap();
        project(&mut store, "empty-test");

        let engine = SearchEngine::new(&store);
        let hits = engine
            .search(&SearchQuery::new("xyznonexistent123"))
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_search_ranks_by_score() {
        let mut store = Store::open_memory().unwrap();
        let p = project(&mut store, "rank-test");
        note(
            &mut store,
            p,
            DocType::Notes,
            "performance performance performance",
        );
        note(&mut store, p, DocType::Todo, "- [ ] check performance");

        let engine = SearchEngine::new(&store);
        let hits = engine.search(&SearchQuery::new("performance")).unwrap();

        assert!(hits.len() >= 2);
        assert_eq!(hits[0].doc_type, DocType::Notes);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_search_respects_limit() {
        let mut store = Store::open_memory().unwrap();
        let p = project(&mut store, "limit-test");
        for doc_type in [DocType::Todo, DocType::Notes, DocType::Memory] {
            note(&mut store, p, doc_type, "shared keyword quokka");
        }

        let engine = SearchEngine::new(&store);
        let hits = engine
            .search(&SearchQuery::new("quokka").with_limit(2))
            .unwrap();
        assert_eq!(hits.len(), 2);
    }
}
