// ABOUTME: Secure resolution of externally supplied file identifiers under a permitted root
// ABOUTME: Canonicalizes both paths, audits every rejection and hands out chunked streams
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Secure File Resolver
//!
//! A request is accepted only when the canonical form of the requested path is
//! a strict descendant of the canonical permitted root. Anything that cannot be
//! canonicalized is rejected. Rejections are distinguished internally so the
//! audit log records what happened, but callers outside this module only ever
//! see one uniform rejection from [`FileService::open`].

/// Chunked file reader
pub mod stream;

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::security::actions::ACTION_MOVIES;
use crate::security::{ActionPolicy, AuditEvent, AuditEventType, AuditSeverity};
pub use stream::FileStream;

/// A file request as received from a client
#[derive(Debug, Clone, Copy)]
pub struct FileRequest<'a> {
    /// Logical identifier; relative to `root` or absolute
    pub identifier: &'a str,
    /// Directory the file must resolve under
    pub root: &'a Path,
    /// Requester address for the audit log
    pub requester: Option<&'a str>,
}

/// Why a request was rejected; never shown to the requester
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Nothing exists at the requested path
    #[error("requested file does not exist")]
    NotFound,
    /// The canonical path is outside the root
    #[error("path resolves outside the permitted root: {resolved}")]
    Traversal {
        /// Where the request actually pointed
        resolved: PathBuf,
    },
    /// The path is inside the root but not a regular file
    #[error("requested path is not a regular file")]
    NotAFile,
    /// The root itself cannot be canonicalized
    #[error("permitted root is unavailable")]
    RootUnavailable,
}

impl ResolveError {
    /// Error code family of this rejection
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound | Self::NotAFile => ErrorCode::ResourceNotFound,
            Self::Traversal { .. } => ErrorCode::SecurityViolation,
            Self::RootUnavailable => ErrorCode::ResourceUnavailable,
        }
    }
}

/// A request that passed resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Canonical path
    pub path: PathBuf,
    /// Size in bytes at resolution time
    pub size: u64,
}

/// Stateless resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureFileResolver;

impl SecureFileResolver {
    /// Resolve `request` to a regular file strictly below its root
    ///
    /// # Errors
    ///
    /// Returns the specific [`ResolveError`]; every rejection is audit-logged
    pub async fn resolve(request: &FileRequest<'_>) -> Result<ResolvedFile, ResolveError> {
        let result = Self::resolve_unaudited(request).await;
        if let Err(error) = &result {
            audit_rejection(request, error);
        }
        result
    }

    async fn resolve_unaudited(request: &FileRequest<'_>) -> Result<ResolvedFile, ResolveError> {
        let root = fs::canonicalize(request.root)
            .await
            .map_err(|_| ResolveError::RootUnavailable)?;
        let requested = request.root.join(request.identifier);
        let resolved = fs::canonicalize(&requested)
            .await
            .map_err(|error| classify_io(&error))?;

        // Path::starts_with compares whole components, so `/data/videos2`
        // never matches a root of `/data/videos`.
        if resolved == root || !resolved.starts_with(&root) {
            return Err(ResolveError::Traversal { resolved });
        }

        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|error| classify_io(&error))?;
        if !metadata.is_file() {
            return Err(ResolveError::NotAFile);
        }
        debug!(
            identifier = request.identifier,
            resolved = %resolved.display(),
            size = metadata.len(),
            "File request resolved"
        );
        Ok(ResolvedFile {
            path: resolved,
            size: metadata.len(),
        })
    }
}

fn classify_io(error: &io::Error) -> ResolveError {
    match error.kind() {
        io::ErrorKind::NotFound => ResolveError::NotFound,
        _ => ResolveError::NotAFile,
    }
}

fn audit_rejection(request: &FileRequest<'_>, error: &ResolveError) {
    let (event_type, severity, description) = match error {
        ResolveError::Traversal { .. } => (
            AuditEventType::PathTraversalBlocked,
            AuditSeverity::Critical,
            "Path traversal attempt blocked",
        ),
        ResolveError::NotFound => (
            AuditEventType::FileRequestRejected,
            AuditSeverity::Info,
            "Requested file not found",
        ),
        ResolveError::NotAFile | ResolveError::RootUnavailable => (
            AuditEventType::FileRequestRejected,
            AuditSeverity::Warning,
            "Requested file unusable",
        ),
    };
    let resolved = match error {
        ResolveError::Traversal { resolved } => Some(resolved.display().to_string()),
        _ => None,
    };
    AuditEvent::new(event_type, severity, description, "read", "denied")
        .with_source_ip(request.requester)
        .with_resource(format!("file:{}", request.identifier))
        .with_metadata(serde_json::json!({
            "reason": error.to_string(),
            "resolved": resolved,
            "root": request.root.display().to_string(),
        }))
        .emit();
}

/// Opens resolved files for streaming behind the action policy
#[derive(Debug, Clone, Copy, Default)]
pub struct FileService;

impl FileService {
    /// Resolve and open `request`
    ///
    /// # Errors
    ///
    /// Every rejection, including a disabled `movies` action, is the same
    /// `NotFound` error so the requester learns nothing about the filesystem
    pub async fn open(request: &FileRequest<'_>, policy: &ActionPolicy) -> AppResult<FileStream> {
        if !policy.is_enabled(ACTION_MOVIES) {
            debug!(identifier = request.identifier, "File serving disabled by action policy");
            return Err(uniform_rejection());
        }
        let resolved = SecureFileResolver::resolve(request)
            .await
            .map_err(|_| uniform_rejection())?;

        // Re-check immediately before opening to narrow the window between
        // resolution and use.
        let metadata = fs::symlink_metadata(&resolved.path)
            .await
            .map_err(|_| uniform_rejection())?;
        if !metadata.is_file() {
            return Err(uniform_rejection());
        }
        let file = fs::File::open(&resolved.path)
            .await
            .map_err(|_| uniform_rejection())?;
        Ok(FileStream::new(file, resolved.path, metadata.len()))
    }
}

fn uniform_rejection() -> AppError {
    AppError::not_found("File")
}
