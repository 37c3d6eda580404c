//! The document engine boundary.
//!
//! The intake machine never looks inside a document. Once a file is
//! accepted it is handed to a [`DocumentEngine`], and only the engine's
//! success/failure signal flows back. The full editing engine (content
//! model, rendering) plugs in here later; until then two engines exist:
//!
//! * [`PlaceholderEngine`] — resolves immediately, reproducing the editor's
//!   current behaviour where acceptance is instant success.
//! * [`HeaderCheckEngine`] — reads the first bytes and checks the `%PDF`
//!   magic, so a renamed PNG fails with a useful message instead of
//!   reaching the editor.
//!
//! `load` returns a `'static` boxed future so the controller can race it
//! against a timeout on the runtime without borrowing the engine.

use crate::error::EngineError;
use crate::file::{CandidateFile, FileSource};
use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Magic bytes every PDF starts with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Bytes read to find the `%PDF-x.y` header.
const HEADER_LEN: usize = 16;

/// Opaque handle to a loaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub name: String,
    pub size_bytes: u64,
    /// Version from the `%PDF-x.y` header, when the engine read it.
    pub pdf_version: Option<String>,
}

/// What [`DocumentEngine::load`] hands back.
pub type LoadFuture = BoxFuture<'static, Result<DocumentHandle, EngineError>>;

/// Loads accepted files into documents.
pub trait DocumentEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Load `file`. May suspend; the intake machine stays in `Loading` until
    /// the future resolves.
    fn load(&self, file: CandidateFile) -> LoadFuture;
}

/// Accepts every file without reading it.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderEngine;

impl DocumentEngine for PlaceholderEngine {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn load(&self, file: CandidateFile) -> LoadFuture {
        debug!("Placeholder load: {}", file.name);
        future::ready(Ok(DocumentHandle {
            name: file.name,
            size_bytes: file.size_bytes,
            pdf_version: None,
        }))
        .boxed()
    }
}

/// Verifies the `%PDF` header before accepting a document.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderCheckEngine;

impl DocumentEngine for HeaderCheckEngine {
    fn name(&self) -> &str {
        "header-check"
    }

    fn load(&self, file: CandidateFile) -> LoadFuture {
        load_checked(file).boxed()
    }
}

async fn load_checked(file: CandidateFile) -> Result<DocumentHandle, EngineError> {
    let header = match file.source().clone() {
        FileSource::MetadataOnly => return Err(EngineError::NoContent),
        FileSource::Memory(bytes) => bytes[..bytes.len().min(HEADER_LEN)].to_vec(),
        FileSource::Path(path) => tokio::task::spawn_blocking(move || read_header(&path))
            .await
            .map_err(join_failed)??,
    };

    let pdf_version = check_header(&header)?;
    debug!("Header OK for {}: PDF {:?}", file.name, pdf_version);

    Ok(DocumentHandle {
        name: file.name,
        size_bytes: file.size_bytes,
        pdf_version,
    })
}

fn join_failed(e: tokio::task::JoinError) -> EngineError {
    EngineError::Internal(format!("Header read task panicked: {e}"))
}

/// Read up to [`HEADER_LEN`] bytes from the start of `path`.
fn read_header(path: &Path) -> Result<Vec<u8>, EngineError> {
    let f = std::fs::File::open(path).map_err(|e| EngineError::Unreadable {
        detail: e.to_string(),
    })?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    f.take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .map_err(|e| EngineError::Unreadable {
            detail: e.to_string(),
        })?;
    Ok(header)
}

/// Check the magic bytes and pull the version out of `%PDF-x.y`.
pub fn check_header(header: &[u8]) -> Result<Option<String>, EngineError> {
    if header.is_empty() {
        return Err(EngineError::Empty);
    }
    if !header.starts_with(PDF_MAGIC) {
        let magic = header[..header.len().min(PDF_MAGIC.len())].to_vec();
        return Err(EngineError::NotAPdf { magic });
    }

    let version = header[PDF_MAGIC.len()..]
        .strip_prefix(b"-")
        .map(|rest| {
            rest.iter()
                .take_while(|b| b.is_ascii_digit() || **b == b'.')
                .map(|&b| b as char)
                .collect::<String>()
        })
        .filter(|v| !v.is_empty());

    Ok(version)
}
