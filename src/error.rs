//! Error types for fastpaint
//!
//! This module provides error types for the two fallible capability seams:
//! - Geometry errors (layout/bounding-box access while walking a tree)
//! - Timing errors (resource-timing lookups for image URLs)
//!
//! All errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations. Faults at either seam are recovered locally
//! (the faulting node or URL contributes zero); nothing is propagated past
//! the crate's public boundary.

use thiserror::Error;

/// Result type alias for fastpaint operations
///
/// This is a convenience type that uses our Error type as the error variant.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for fastpaint
///
/// Each variant wraps a more specific error type for that seam. These are
/// surfaced by capability implementations and absorbed inside the engine;
/// they exist so implementations can report faults precisely instead of
/// throwing through the walk.
#[derive(Error, Debug)]
pub enum Error {
  /// Layout/geometry access error while walking a tree
  #[error("Geometry error: {0}")]
  Geometry(#[from] GeometryError),

  /// Resource-timing lookup error
  #[error("Timing error: {0}")]
  Timing(#[from] TimingError),

  /// Generic error for miscellaneous issues
  #[error("{0}")]
  Other(String),
}

/// Errors raised by the tree-walk capability when answering geometry
/// questions about a node.
///
/// A node that reports a geometry error is treated as contributing zero to
/// the render score (and as off-screen by the image walk); the walk itself
/// continues.
#[derive(Error, Debug, Clone)]
pub enum GeometryError {
  /// The node has no layout box to measure (e.g. display:none or detached)
  #[error("node has no layout box")]
  NoLayoutBox,

  /// The underlying platform query failed
  #[error("geometry access failed: {message}")]
  AccessFailed { message: String },
}

/// Errors raised by the resource-timing capability when resolving a URL to
/// a network completion time.
///
/// A URL that reports a timing error contributes zero to the image-time
/// maximum; remaining URLs are still resolved.
#[derive(Error, Debug, Clone)]
pub enum TimingError {
  /// No timing entry has been recorded for this URL
  #[error("no resource timing entry for '{url}'")]
  EntryMissing { url: String },

  /// The underlying lookup failed
  #[error("resource timing lookup failed: {message}")]
  LookupFailed { message: String },
}
