//! Error Types
//!
//! This module defines the error types used throughout the pipeline.
//!
//! # Overview
//!
//! The main error type [`ExportError`] covers the fatal failure modes:
//! - a Scene Provider handle that is already in a failed state
//! - invalid caller arguments (e.g. a non-positive sample rate)
//! - per-mesh conditions such as unsupported mapping/reference modes
//!
//! Fatal-on-call conditions invalidate a whole extract call. Fatal-on-unit
//! conditions (mapping modes, out-of-range channel indices) are caught at
//! the mesh boundary by [`crate::export::extract_meshes`] and converted into
//! "this mesh contributes nothing" plus a warning. Warnings never travel as
//! errors; they accumulate on [`crate::export::Extraction::warnings`] and
//! are mirrored through [`log::warn!`].

use thiserror::Error;

use crate::layout::Semantic;
use crate::provider::{MappingMode, ReferenceMode};

/// The main error type for the flattening pipeline.
#[derive(Error, Debug)]
pub enum ExportError {
    // ========================================================================
    // Fatal-on-call
    // ========================================================================
    /// The Scene Provider reported a failed state before extraction began.
    ///
    /// Every extractor short-circuits on this; no partial output is produced.
    #[error("Scene provider is in a failed state: {0}")]
    ProviderFailed(String),

    /// The caller passed an argument outside its valid range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ========================================================================
    // Fatal-on-unit (scoped to one mesh)
    // ========================================================================
    /// An attribute channel uses a mapping mode the pipeline does not
    /// support (only by-control-point, by-polygon-vertex and by-polygon
    /// are resolvable).
    #[error("Channel '{channel}' uses unsupported mapping mode {mode:?}")]
    UnsupportedMappingMode {
        /// Name of the offending channel
        channel: String,
        /// The unresolvable mapping mode
        mode: MappingMode,
    },

    /// An attribute channel stores its data behind a reference mode other
    /// than direct or index-to-direct.
    #[error("Channel '{channel}' uses unsupported reference mode {mode:?}")]
    UnsupportedReferenceMode {
        /// Name of the offending channel
        channel: String,
        /// The unresolvable reference mode
        mode: ReferenceMode,
    },

    /// A vertex attribute requested a storage type the interleaved layout
    /// cannot pack (only 32-bit floats and 32-bit unsigned integers).
    #[error("Attribute {semantic:?} requests an unsupported element storage type")]
    UnsupportedElementType {
        /// The attribute whose storage type is not packable
        semantic: Semantic,
    },

    /// A mapping-mode-derived index pointed outside a channel's value or
    /// index array.
    #[error("Channel '{channel}' index {index} is out of bounds")]
    ChannelIndexOutOfBounds {
        /// Name of the offending channel
        channel: String,
        /// The resolved, out-of-range index
        index: usize,
    },
}

/// Alias for `Result<T, ExportError>`.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Records a non-fatal condition: mirrored to the log and appended to the
/// caller-visible warning list. Warnings never change control flow.
pub(crate) fn warn(warnings: &mut Vec<String>, message: String) {
    log::warn!("{message}");
    warnings.push(message);
}
