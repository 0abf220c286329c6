//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`XenonError`] covers every failure mode of the core:
//! - Model document parsing and validation failures
//! - Buffer resolution failures (missing binary chunk, bad data URIs)
//! - Data contract breaches in otherwise well-formed documents
//! - Dangling node references inside a document's hierarchy
//!
//! Recoverable degradations (unsupported vertex attributes, undecodable
//! images, unapplied morph weight channels) are *not* errors: the loader logs
//! them and continues.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, XenonError>`.
//!
//! ```rust,ignore
//! use xenon_core::errors::{XenonError, Result};
//!
//! fn load_asset() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Xenon engine.
#[derive(Error, Debug)]
pub enum XenonError {
    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// The model document is malformed or failed structural validation.
    #[error("glTF error: {0}")]
    GltfError(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUriError(String),

    /// A buffer declared by the document has no backing data.
    #[error("Buffer {index} has no data")]
    MissingBuffer {
        /// Document buffer index
        index: usize,
    },

    // ========================================================================
    // Document Contract Errors
    // ========================================================================
    /// A primitive declares neither an index accessor nor a `POSITION`
    /// attribute, so it cannot be drawn.
    #[error("Primitive {primitive} of mesh {mesh} has neither indices nor POSITION")]
    ContractViolation {
        /// Document mesh index
        mesh: usize,
        /// Primitive index within the mesh
        primitive: usize,
    },

    /// A node reference points outside the traversed hierarchy, or a node is
    /// reachable through more than one parent.
    #[error("Dangling node reference: {context} (node: {index})")]
    DanglingReference {
        /// Description of what held the reference
        context: String,
        /// The offending document node index
        index: usize,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Loader or engine settings could not be read.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ========================================================================
    // GPU Backend Errors
    // ========================================================================
    /// Adapter or device acquisition failed.
    #[error("GPU backend error: {0}")]
    BackendError(String),

    // ========================================================================
    // Asset & Index Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Index out of bounds.
    #[error("Index out of bounds: {context} (index: {index})")]
    IndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },
}

/// Alias for `Result<T, XenonError>`.
pub type Result<T> = std::result::Result<T, XenonError>;
