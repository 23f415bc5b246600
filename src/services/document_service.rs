// src/services/document_service.rs

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{common::error::AppError, db::DocumentRepository, models::documents::Document};

#[derive(Clone)]
pub struct DocumentService {
    repo: DocumentRepository,
    upload_dir: PathBuf,
}

impl DocumentService {
    pub fn new(repo: DocumentRepository, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            upload_dir: upload_dir.into(),
        }
    }

    pub async fn list(&self, client_user_id: i64) -> Result<Vec<Document>, AppError> {
        self.repo.list_for_client(self.repo.pool(), client_user_id).await
    }

    /// Writes the file to the upload directory, then records it.
    ///
    /// If the insert fails the file is removed again.
    pub async fn store(
        &self,
        client_user_id: i64,
        original_name: &str,
        document_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<Document, AppError> {
        if bytes.is_empty() {
            return Err(AppError::InvalidPayload("The uploaded file is empty.".to_string()));
        }

        let file_name = stored_file_name(original_name);
        let path = self.upload_dir.join(&file_name);

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| anyhow::anyhow!("Could not create upload directory: {}", e))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Could not write uploaded file: {}", e))?;

        let display_name = document_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(original_name);

        match self.repo.create(client_user_id, display_name, &file_name).await {
            Ok(document) => {
                tracing::info!(document_id = document.id, client_user_id, "Document uploaded");
                Ok(document)
            }
            Err(e) => {
                if let Err(io) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), error = %io, "Orphaned upload could not be removed");
                }
                Err(e)
            }
        }
    }

    pub async fn read(&self, document: &Document) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(&document.file_path);

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound("The stored file is missing.".to_string()),
            _ => anyhow::anyhow!("Could not read stored file: {}", e).into(),
        })
    }

    fn resolve(&self, file_path: &str) -> PathBuf {
        // Only the final component is trusted
        let name = Path::new(file_path).file_name().unwrap_or_default();
        self.upload_dir.join(name)
    }
}

/// Unique on-disk name keeping a readable, path-safe tail of the original.
fn stored_file_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");

    let safe: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();

    format!("{}-{}", Uuid::new_v4().simple(), safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_names_drop_directories_and_odd_characters() {
        let name = stored_file_name("../../etc/tax return 2024.pdf");

        assert!(name.ends_with("-tax_return_2024.pdf"), "{name}");
        assert!(!name.contains('/'));
    }

    #[test]
    fn stored_names_are_unique() {
        assert_ne!(stored_file_name("a.pdf"), stored_file_name("a.pdf"));
    }
}
