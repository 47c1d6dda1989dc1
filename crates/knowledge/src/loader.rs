//! Reads the policy documents folder at startup.

use policydesk_core::document::Document;
use policydesk_core::error::KnowledgeError;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load every file directly inside `folder` whose name ends with `extension`.
///
/// Files are read in file-name order, so `doc_{n}` ids are stable across runs.
/// Subdirectories are not traversed. An empty result is an error: the
/// assistant has nothing to retrieve from.
pub fn load_documents(folder: &Path, extension: &str) -> Result<Vec<Document>, KnowledgeError> {
    if !folder.is_dir() {
        return Err(KnowledgeError::FolderNotFound(folder.to_path_buf()));
    }

    let entries = std::fs::read_dir(folder).map_err(|e| KnowledgeError::ReadFailed {
        path: folder.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut files: Vec<(String, std::path::PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| KnowledgeError::ReadFailed {
            path: folder.to_path_buf(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            warn!(path = %path.display(), "Skipping file with a non-UTF-8 name");
            continue;
        };
        if file_name.ends_with(extension) {
            files.push((file_name.to_string(), path));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut documents = Vec::with_capacity(files.len());
    for (index, (file_name, path)) in files.into_iter().enumerate() {
        let text = std::fs::read_to_string(&path).map_err(|e| KnowledgeError::ReadFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        debug!(source = %file_name, bytes = text.len(), "Loaded document");
        documents.push(Document::new(index, file_name, text));
    }

    if documents.is_empty() {
        return Err(KnowledgeError::NoDocuments(folder.to_path_buf()));
    }

    info!(count = documents.len(), folder = %folder.display(), "Documents loaded");
    Ok(documents)
}
