//! Foundation types for Bale, the supply-chain provenance client.
//!
//! This crate provides the identity, checksum, and record types shared
//! by every other Bale crate.
//!
//! # Key Types
//!
//! - [`ArtifactId`] — Client-assigned version-4 UUID identity
//! - [`Checksum`] — Hex-encoded SHA-1 content digest, with the
//!   hierarchical aggregate used for envelopes
//! - [`ArtifactRecord`] — A staged artifact or envelope
//! - [`ContentType`] — Extension/prefix-derived classification
//! - [`LifecycleState`] — Staged / assigned / confirmed derivation

pub mod boolstr;
pub mod checksum;
pub mod content_type;
pub mod error;
pub mod id;
pub mod record;

pub use checksum::Checksum;
pub use content_type::ContentType;
pub use error::TypeError;
pub use id::{valid_uuid, ArtifactId};
pub use record::{ArtifactRecord, ArtifactRef, LifecycleState, StagedArtifact, UriRecord};
