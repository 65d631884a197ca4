//! Staging builders for Bale.
//!
//! Turns local files, URLs, and directory trees into [`bale_types::StagedArtifact`]
//! values ready for the staging store. Directory builds produce an
//! [`EnvelopeBundle`]: the container record plus its members in walk
//! order, checksummed hierarchically.

pub mod artifact;
pub mod envelope;
pub mod error;

pub use artifact::{stage_file, stage_url};
pub use envelope::{build_envelope, named_envelope, EnvelopeBundle, FILE_WARNING_THRESHOLD};
pub use error::{StageError, StageResult};
