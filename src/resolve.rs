//! Content resolution: mapping opaque document references to byte buffers.
//!
//! A reference is either a logical document id known to the metadata store or
//! a raw binary id. Metadata lookup is attempted first; when it misses (or
//! carries no binary id) the reference itself is used as the binary id, so
//! callers may pass either form.

use crate::error::{Error, Result, Side};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Metadata record for one stored document version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Binary object id holding this version's content, if recorded.
    pub binary_id: Option<String>,

    /// Monotonic version number within the document's history.
    pub version_number: u32,

    /// When this version was uploaded.
    pub uploaded_at: DateTime<Utc>,
}

impl VersionInfo {
    /// Create a metadata record without a binary id.
    pub fn new(version_number: u32, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            binary_id: None,
            version_number,
            uploaded_at,
        }
    }

    /// Set the binary object id.
    pub fn with_binary_id(mut self, binary_id: impl Into<String>) -> Self {
        self.binary_id = Some(binary_id.into());
        self
    }
}

/// A document reference resolved to a concrete binary id.
///
/// Produced by [`ContentResolver`]; read-only to the downstream stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRef {
    /// The reference the caller passed in.
    pub id: String,

    /// The binary id the content was (or will be) fetched under.
    pub binary_id: String,

    /// Metadata for the version, when the reference resolved to a record.
    pub info: Option<VersionInfo>,
}

impl VersionRef {
    /// Short human-readable label: the version number when metadata resolved,
    /// otherwise the raw reference.
    pub fn version_label(&self) -> String {
        match &self.info {
            Some(info) => format!("v{}", info.version_number),
            None => self.id.clone(),
        }
    }

    /// Upload timestamp, when metadata resolved.
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        self.info.as_ref().map(|i| i.uploaded_at)
    }
}

/// A resolved reference together with its fetched content.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    /// The resolved reference.
    pub version: VersionRef,

    /// Raw document bytes.
    pub bytes: Vec<u8>,
}

/// Lookup of version metadata by document reference.
///
/// Returning `Ok(None)` means the reference is unknown to the store; the
/// resolver then falls back to treating the reference as a binary id.
pub trait MetadataStore: Send + Sync {
    /// Resolve a document reference to its version metadata.
    fn resolve(&self, reference: &str) -> Result<Option<VersionInfo>>;
}

/// Fetch of binary content by object id.
pub trait BinaryStore: Send + Sync {
    /// Fetch the bytes stored under `binary_id`.
    ///
    /// Fails with [`Error::NotFound`] when no object exists under that id.
    fn fetch(&self, binary_id: &str) -> Result<Vec<u8>>;
}

/// Binary object ids are 24 lowercase hex digits.
const BINARY_ID_PATTERN: &str = r"^[0-9a-f]{24}$";

/// Resolves two document references to their byte buffers.
pub struct ContentResolver {
    metadata: Arc<dyn MetadataStore>,
    binaries: Arc<dyn BinaryStore>,
    id_pattern: Regex,
}

impl ContentResolver {
    /// Create a resolver over the given stores.
    pub fn new(metadata: Arc<dyn MetadataStore>, binaries: Arc<dyn BinaryStore>) -> Self {
        Self {
            metadata,
            binaries,
            id_pattern: Regex::new(BINARY_ID_PATTERN).unwrap(),
        }
    }

    /// Resolve one reference to a validated [`VersionRef`].
    ///
    /// The binary id is validated before any fetch; a malformed id fails with
    /// [`Error::InvalidReference`].
    pub fn resolve_ref(&self, reference: &str) -> Result<VersionRef> {
        let info = self.metadata.resolve(reference)?;
        let binary_id = info
            .as_ref()
            .and_then(|i| i.binary_id.clone())
            .unwrap_or_else(|| reference.to_string());

        if !self.id_pattern.is_match(&binary_id) {
            return Err(Error::InvalidReference(binary_id));
        }

        Ok(VersionRef {
            id: reference.to_string(),
            binary_id,
            info,
        })
    }

    /// Resolve and fetch both sides of a comparison.
    ///
    /// Both ids are validated before either fetch starts. The two fetches run
    /// concurrently; there is no ordering dependency between them and no
    /// retry. Either fetch failing fails the pair with
    /// [`Error::ContentUnavailable`] naming the missing side.
    pub fn fetch_pair(
        &self,
        left_ref: &str,
        right_ref: &str,
    ) -> Result<(ResolvedDocument, ResolvedDocument)> {
        let left = self.resolve_ref(left_ref)?;
        let right = self.resolve_ref(right_ref)?;

        let (left_bytes, right_bytes) = rayon::join(
            || self.fetch_side(&left, Side::Left),
            || self.fetch_side(&right, Side::Right),
        );

        Ok((
            ResolvedDocument {
                version: left,
                bytes: left_bytes?,
            },
            ResolvedDocument {
                version: right,
                bytes: right_bytes?,
            },
        ))
    }

    fn fetch_side(&self, version: &VersionRef, side: Side) -> Result<Vec<u8>> {
        self.binaries.fetch(&version.binary_id).map_err(|err| match err {
            Error::ContentUnavailable { .. } => err,
            other => Error::ContentUnavailable {
                side,
                reason: other.to_string(),
            },
        })
    }
}

/// In-memory store implementing both [`MetadataStore`] and [`BinaryStore`].
///
/// Intended for tests and embedding; production callers plug in their own
/// store implementations.
///
/// # Example
///
/// ```
/// use pdfdiff::resolve::{BinaryStore, MemoryDocumentStore};
///
/// let mut store = MemoryDocumentStore::new();
/// let id = store.add_document(b"%PDF-1.4 ...".to_vec());
/// assert!(store.fetch(&id).is_ok());
/// ```
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    versions: HashMap<String, VersionInfo>,
    binaries: HashMap<String, Vec<u8>>,
    next_id: u64,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record version metadata under a document reference.
    pub fn insert_version(&mut self, reference: impl Into<String>, info: VersionInfo) {
        self.versions.insert(reference.into(), info);
    }

    /// Store bytes under an explicit binary id.
    pub fn insert_binary(&mut self, binary_id: impl Into<String>, bytes: Vec<u8>) {
        self.binaries.insert(binary_id.into(), bytes);
    }

    /// Store bytes under a fresh synthetic binary id and return the id.
    pub fn add_document(&mut self, bytes: Vec<u8>) -> String {
        self.next_id += 1;
        let id = format!("{:024x}", self.next_id);
        self.binaries.insert(id.clone(), bytes);
        id
    }
}

impl MetadataStore for MemoryDocumentStore {
    fn resolve(&self, reference: &str) -> Result<Option<VersionInfo>> {
        Ok(self.versions.get(reference).cloned())
    }
}

impl BinaryStore for MemoryDocumentStore {
    fn fetch(&self, binary_id: &str) -> Result<Vec<u8>> {
        self.binaries
            .get(binary_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(binary_id.to_string()))
    }
}
