//! Filesystem mirror
//!
//! Mirrors document contents to plain `.md` files under the docs root so
//! they can be read and grepped outside the database. The database row is
//! the source of truth; mirroring is best effort.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::document::Document;
use crate::core::types::DocType;

/// Writes documents to `<docs_root>/<project>/<doc_type>.md`
pub struct Mirror {
    docs_root: PathBuf,
}

impl Mirror {
    pub fn new(docs_root: impl Into<PathBuf>) -> Self {
        Self {
            docs_root: docs_root.into(),
        }
    }

    /// Write all documents of a project; returns the project directory
    pub fn sync_project(&self, project_name: &str, docs: &[Document]) -> io::Result<PathBuf> {
        let project_dir = self.project_dir(project_name);
        fs::create_dir_all(&project_dir)?;

        for doc in docs {
            fs::write(project_dir.join(format!("{}.md", doc.doc_type)), &doc.content)?;
        }

        Ok(project_dir)
    }

    /// Write a single document file; returns its path
    pub fn sync_document(
        &self,
        project_name: &str,
        doc_type: DocType,
        content: &str,
    ) -> io::Result<PathBuf> {
        let project_dir = self.project_dir(project_name);
        fs::create_dir_all(&project_dir)?;

        let file_path = self.doc_path(project_name, doc_type);
        fs::write(&file_path, content)?;

        Ok(file_path)
    }

    /// Directory holding a project's mirrored files
    pub fn project_dir(&self, project_name: &str) -> PathBuf {
        self.docs_root.join(project_name)
    }

    /// Mirror location of a specific document
    pub fn doc_path(&self, project_name: &str, doc_type: DocType) -> PathBuf {
        self.project_dir(project_name)
            .join(format!("{}.md", doc_type))
    }

    pub fn docs_root(&self) -> &Path {
        &self.docs_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_document_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = Mirror::new(dir.path());

        let path = mirror
            .sync_document("api", DocType::Todo, "# To-Do List\n")
            .unwrap();

        assert_eq!(path, dir.path().join("api").join("todo.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# To-Do List\n");
    }

    #[test]
    fn test_sync_document_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = Mirror::new(dir.path());

        mirror.sync_document("api", DocType::Notes, "v1").unwrap();
        let path = mirror.sync_document("api", DocType::Notes, "v2").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
    }
}
