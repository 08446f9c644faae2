//! Local-disk document store
//!
//! Consent documents are written below a configured root directory. The
//! returned reference is the path relative to that root.

use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_consent::{DocumentStore, DocumentUpload};

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a relative reference below the root
    ///
    /// Absolute paths and `..` segments are refused.
    fn resolve(&self, reference: &str) -> Result<PathBuf, PortError> {
        let relative = Path::new(reference);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if reference.is_empty() || escapes {
            return Err(PortError::validation_field(
                format!("document path '{reference}' is not inside the store"),
                "document_reference",
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl DomainPort for LocalDocumentStore {}

#[async_trait]
impl HealthCheckable for LocalDocumentStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = fs::create_dir_all(&self.root).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(()) => HealthCheckResult::healthy("local-document-store", latency_ms),
            Err(e) => HealthCheckResult::unhealthy(
                "local-document-store",
                latency_ms,
                format!("document root unavailable: {e}"),
            ),
        }
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    #[instrument(skip(self, document), fields(size = document.size()))]
    async fn upload(&self, path: &str, document: &DocumentUpload) -> Result<String, PortError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(DatabaseError::from)?;
        }

        // create_new so an existing document is never overwritten
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(DatabaseError::from)?;
        if let Err(e) = write_all(&mut file, &document.bytes).await {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&target).await {
                warn!(path = %target.display(), error = %cleanup, "Failed to remove partial document");
            }
            return Err(DatabaseError::from(e).into());
        }

        debug!(path = %target.display(), "Document stored");
        Ok(path.to_string())
    }

    #[instrument(skip(self))]
    async fn remove(&self, reference: &str) -> Result<(), PortError> {
        let target = self.resolve(reference)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DatabaseError::not_found("Document", reference).into())
            }
            Err(e) => Err(DatabaseError::from(e).into()),
        }
    }
}

async fn write_all(file: &mut fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.sync_all().await
}
