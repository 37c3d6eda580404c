//! Candidate files: what the user picked, before anything trusts it.
//!
//! A [`CandidateFile`] carries the three facts the validator looks at (name,
//! declared MIME type, size) plus a reference to where the bytes live. The
//! bytes are never copied into the candidate: a path stays a path and an
//! in-memory buffer is shared behind an `Arc`.
//!
//! The MIME type is *declared*, not sniffed. A browser file picker reports a
//! type derived from the extension, and [`CandidateFile::from_path`] does the
//! same through `mime_guess`. Content checks belong to the document engine.

use crate::error::IntakeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Declared type for extensions `mime_guess` does not know.
pub const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// Where the content of a candidate file can be read from.
#[derive(Clone, Default)]
pub enum FileSource {
    /// Only metadata is known (e.g. a browser `File` whose bytes were not read).
    #[default]
    MetadataOnly,
    /// A file on the local file system.
    Path(PathBuf),
    /// An in-memory buffer, shared rather than copied.
    Memory(Arc<[u8]>),
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::MetadataOnly => f.write_str("MetadataOnly"),
            FileSource::Path(p) => f.debug_tuple("Path").field(p).finish(),
            FileSource::Memory(b) => write!(f, "Memory(<{} bytes>)", b.len()),
        }
    }
}

/// A user-selected file awaiting validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateFile {
    /// Display name; user-facing only.
    pub name: String,
    /// Declared content type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
    #[serde(skip)]
    source: FileSource,
}

impl PartialEq for CandidateFile {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.mime_type == other.mime_type
            && self.size_bytes == other.size_bytes
    }
}

impl CandidateFile {
    /// A metadata-only candidate, as reported by a file picker.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            source: FileSource::MetadataOnly,
        }
    }

    /// A candidate backed by an in-memory buffer.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    /// Inspect a local file the way a file picker would.
    ///
    /// Reads only file-system metadata. The MIME type is declared from the
    /// extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IntakeError> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|e| IntakeError::Unreadable {
            path: path.to_path_buf(),
            detail: match e.kind() {
                std::io::ErrorKind::NotFound => "file not found".to_string(),
                std::io::ErrorKind::PermissionDenied => "permission denied".to_string(),
                _ => e.to_string(),
            },
        })?;

        if !meta.is_file() {
            return Err(IntakeError::Unreadable {
                path: path.to_path_buf(),
                detail: "not a regular file".to_string(),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mime_type = declared_mime_type(path);
        debug!(
            "Candidate {}: {} bytes, declared {}",
            name,
            meta.len(),
            mime_type
        );

        Ok(Self {
            name,
            mime_type,
            size_bytes: meta.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Replace the declared MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Where the content lives.
    pub fn source(&self) -> &FileSource {
        &self.source
    }
}

/// The MIME type a file picker would declare for `path`.
pub fn declared_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| UNKNOWN_MIME_TYPE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_follows_extension() {
        assert_eq!(declared_mime_type(Path::new("a.pdf")), "application/pdf");
        assert_eq!(declared_mime_type(Path::new("a.PDF")), "application/pdf");
        assert_eq!(declared_mime_type(Path::new("a.png")), "image/png");
        assert_eq!(declared_mime_type(Path::new("noext")), UNKNOWN_MIME_TYPE);
    }

    #[test]
    fn from_bytes_takes_size_from_buffer() {
        let f = CandidateFile::from_bytes("x.pdf", "application/pdf", b"%PDF-1.4".to_vec());
        assert_eq!(f.size_bytes, 8);
        assert!(matches!(f.source(), FileSource::Memory(_)));
    }

    #[test]
    fn from_path_missing_file() {
        let err = CandidateFile::from_path("/definitely/not/here.pdf").unwrap_err();
        match err {
            IntakeError::Unreadable { detail, .. } => assert_eq!(detail, "file not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn from_path_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CandidateFile::from_path(dir.path()).unwrap_err();
        assert!(matches!(err, IntakeError::Unreadable { .. }));
    }

    #[test]
    fn from_path_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.7\n").unwrap();

        let f = CandidateFile::from_path(&path).unwrap();
        assert_eq!(f.name, "doc.pdf");
        assert_eq!(f.mime_type, "application/pdf");
        assert_eq!(f.size_bytes, 9);
    }

    #[test]
    fn mime_override() {
        let f = CandidateFile::new("scan.bin", UNKNOWN_MIME_TYPE, 10)
            .with_mime_type("application/pdf");
        assert_eq!(f.mime_type, "application/pdf");
    }
}
