//! Consent Domain Ports
//!
//! Two collaborators sit behind the registry:
//!
//! - [`ConsentPort`]: single-record persistence of consent agreements
//! - [`DocumentStore`]: storage for the signed consent document
//!
//! Both are implemented by infra_db for production and by the in-memory
//! adapters in [`mock`] for tests.

use async_trait::async_trait;

use core_kernel::{
    BrokerId, ConsentId, DomainPort, HealthCheckable, OperationMetadata, PortError,
};

use crate::consent::{ClientConsent, ConsentStatus};

/// Query parameters for finding consents
#[derive(Debug, Clone, Default)]
pub struct ConsentQuery {
    /// Filter by owning broker
    pub broker_id: Option<BrokerId>,
    /// Filter by stored status
    pub status: Option<ConsentStatus>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl ConsentQuery {
    /// Creates a query for one broker's consents
    pub fn by_broker(broker_id: BrokerId) -> Self {
        Self {
            broker_id: Some(broker_id),
            ..Default::default()
        }
    }

    /// Creates a query by stored status
    pub fn by_status(status: ConsentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Narrows the query to a stored status
    pub fn with_status(mut self, status: ConsentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Persistence port for consent agreements
#[async_trait]
pub trait ConsentPort: DomainPort + HealthCheckable {
    /// Inserts a new consent record
    async fn insert_consent(
        &self,
        consent: &ClientConsent,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Overwrites an existing consent record
    async fn update_consent(
        &self,
        consent: &ClientConsent,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Loads a consent by id
    async fn get_consent(
        &self,
        id: ConsentId,
        metadata: Option<OperationMetadata>,
    ) -> Result<ClientConsent, PortError>;

    /// Finds consents matching the query, soonest expiry first
    async fn find_consents(
        &self,
        query: ConsentQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<ClientConsent>, PortError>;

    /// Removes a consent record that no listing references yet
    async fn delete_consent(
        &self,
        id: ConsentId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// A document received from the broker, not yet stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// File name reduced to a safe single path segment
    ///
    /// At most [`MAX_FILE_NAME_LEN`] bytes; a short extension survives
    /// truncation.
    pub fn safe_file_name(&self) -> String {
        let base = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();
        let cleaned: String = base
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        let cleaned = cleaned.trim_start_matches('.');
        if cleaned.is_empty() {
            return "document".to_string();
        }
        if cleaned.len() <= MAX_FILE_NAME_LEN {
            return cleaned.to_string();
        }
        // ASCII only at this point, so byte offsets are char boundaries
        match cleaned.rfind('.') {
            Some(dot) if cleaned.len() - dot <= MAX_EXTENSION_LEN => {
                let extension = &cleaned[dot..];
                format!("{}{}", &cleaned[..MAX_FILE_NAME_LEN - extension.len()], extension)
            }
            _ => cleaned[..MAX_FILE_NAME_LEN].to_string(),
        }
    }
}

/// Longest stored file name; storage paths prefix it with a 37-byte id
pub const MAX_FILE_NAME_LEN: usize = 120;

const MAX_EXTENSION_LEN: usize = 16;

/// Storage port for consent documents
///
/// An upload either returns a reference or fails; a dropped upload future
/// leaves nothing for callers to clean up because records are only written
/// after the reference is returned.
#[async_trait]
pub trait DocumentStore: DomainPort + HealthCheckable {
    /// Stores the document under `path` and returns its reference
    async fn upload(&self, path: &str, document: &DocumentUpload) -> Result<String, PortError>;

    /// Deletes a previously stored document
    async fn remove(&self, reference: &str) -> Result<(), PortError>;
}

/// Mock implementations of the consent ports for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    /// In-memory mock implementation of ConsentPort
    #[derive(Debug, Default)]
    pub struct MockConsentPort {
        consents: Arc<RwLock<HashMap<ConsentId, ClientConsent>>>,
        fail_writes: AtomicBool,
    }

    impl MockConsentPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with consents for testing
        pub async fn with_consents(consents: Vec<ClientConsent>) -> Self {
            let port = Self::new();
            for consent in consents {
                port.consents.write().await.insert(consent.id, consent);
            }
            port
        }

        /// Makes every subsequent insert, update or delete fail
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Number of stored consents
        pub async fn count(&self) -> usize {
            self.consents.read().await.len()
        }

        /// Writes a consent directly, bypassing the registry
        pub async fn put(&self, consent: ClientConsent) {
            self.consents.write().await.insert(consent.id, consent);
        }

        fn check_writable(&self) -> Result<(), PortError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(PortError::connection("mock consent store unavailable"));
            }
            Ok(())
        }
    }

    impl DomainPort for MockConsentPort {}

    #[async_trait]
    impl HealthCheckable for MockConsentPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-consent-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ConsentPort for MockConsentPort {
        async fn insert_consent(
            &self,
            consent: &ClientConsent,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.check_writable()?;
            let mut consents = self.consents.write().await;
            if consents.contains_key(&consent.id) {
                return Err(PortError::conflict(format!("consent {} already exists", consent.id)));
            }
            consents.insert(consent.id, consent.clone());
            Ok(())
        }

        async fn update_consent(
            &self,
            consent: &ClientConsent,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.check_writable()?;
            let mut consents = self.consents.write().await;
            let stored = consents
                .get_mut(&consent.id)
                .ok_or_else(|| PortError::not_found("ClientConsent", consent.id))?;
            *stored = consent.clone();
            Ok(())
        }

        async fn delete_consent(
            &self,
            id: ConsentId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.check_writable()?;
            self.consents
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("ClientConsent", id))
        }

        async fn get_consent(
            &self,
            id: ConsentId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<ClientConsent, PortError> {
            self.consents
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("ClientConsent", id))
        }

        async fn find_consents(
            &self,
            query: ConsentQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<ClientConsent>, PortError> {
            let consents = self.consents.read().await;
            let mut results: Vec<_> = consents
                .values()
                .filter(|c| {
                    if let Some(broker_id) = query.broker_id {
                        if c.broker_id != broker_id {
                            return false;
                        }
                    }
                    if let Some(status) = query.status {
                        if c.stored_status() != status {
                            return false;
                        }
                    }
                    true
                })
                .cloned()
                .collect();

            results.sort_by_key(|c| (c.expires_at, c.id));

            // Apply pagination
            if let Some(offset) = query.offset {
                results = results.into_iter().skip(offset as usize).collect();
            }
            if let Some(limit) = query.limit {
                results = results.into_iter().take(limit as usize).collect();
            }

            Ok(results)
        }
    }

    /// In-memory mock implementation of DocumentStore
    #[derive(Debug, Default)]
    pub struct MockDocumentStore {
        documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
        failing: AtomicBool,
    }

    impl MockDocumentStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// A store whose uploads always fail
        pub fn failing() -> Self {
            let store = Self::default();
            store.set_failing(true);
            store
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Number of stored documents
        pub async fn count(&self) -> usize {
            self.documents.read().await.len()
        }

        pub async fn contains(&self, reference: &str) -> bool {
            self.documents.read().await.contains_key(reference)
        }
    }

    impl DomainPort for MockDocumentStore {}

    #[async_trait]
    impl HealthCheckable for MockDocumentStore {
        async fn health_check(&self) -> HealthCheckResult {
            if self.failing.load(Ordering::SeqCst) {
                return HealthCheckResult::unhealthy("mock-document-store", 0, "uploads failing");
            }
            HealthCheckResult::healthy("mock-document-store", 0)
        }
    }

    #[async_trait]
    impl DocumentStore for MockDocumentStore {
        async fn upload(&self, path: &str, document: &DocumentUpload) -> Result<String, PortError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PortError::storage(format!("upload to {path} failed")));
            }
            let reference = format!("mock://{path}");
            self.documents
                .write()
                .await
                .insert(reference.clone(), document.bytes.clone());
            Ok(reference)
        }

        async fn remove(&self, reference: &str) -> Result<(), PortError> {
            self.documents
                .write()
                .await
                .remove(reference)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Document", reference))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_name_strips_directories() {
        let upload = DocumentUpload::new("../../etc/passwd", None, vec![1]);
        assert_eq!(upload.safe_file_name(), "passwd");
    }

    #[test]
    fn test_safe_file_name_replaces_spaces() {
        let upload = DocumentUpload::new("Signed Consent (final).pdf", None, vec![1]);
        assert_eq!(upload.safe_file_name(), "Signed_Consent__final_.pdf");
    }

    #[test]
    fn test_safe_file_name_fallback() {
        let upload = DocumentUpload::new("..", None, vec![1]);
        assert_eq!(upload.safe_file_name(), "document");
    }

    #[test]
    fn test_safe_file_name_truncates_long_names() {
        let upload = DocumentUpload::new(format!("{}.pdf", "a".repeat(251)), None, vec![1]);
        let name = upload.safe_file_name();
        assert_eq!(name.len(), MAX_FILE_NAME_LEN);
        assert!(name.ends_with("aaa.pdf"));

        let upload = DocumentUpload::new("b".repeat(255), None, vec![1]);
        assert_eq!(upload.safe_file_name(), "b".repeat(MAX_FILE_NAME_LEN));
    }

    #[test]
    fn test_safe_file_name_counts_replaced_characters() {
        let upload = DocumentUpload::new("é".repeat(200), None, vec![1]);
        assert_eq!(upload.safe_file_name().len(), MAX_FILE_NAME_LEN);
    }
}
