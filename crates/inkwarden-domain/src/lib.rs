//! Inkwarden Domain Layer
//!
//! Core data model shared by every stage of the trust-and-quality pipeline.
//! It defines the document shape handed over by the generation orchestrator,
//! the candidate references returned by search, the content-domain taxonomy,
//! and the trait interfaces for the external collaborators (model and search).
//!
//! ## Key Concepts
//!
//! - **Document**: a generated article (title, meta description, introduction,
//!   sections, conclusion)
//! - **ContentField**: one named, typed text slice of a document, built once so
//!   rule evaluation never sniffs the document shape at runtime
//! - **SourceCandidate**: an unverified `{title, url, snippet}` tuple from search
//! - **ContentDomain**: the topical domain that drives rule filtering,
//!   credibility weights and minimum source requirements
//!
//! ## Architecture
//!
//! Pure data and pure functions only. Network access, model calls and shared
//! state live in the component crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod content_domain;
pub mod document;
pub mod html;
pub mod source;
pub mod traits;

// Re-exports for convenience
pub use content_domain::ContentDomain;
pub use document::{Block, ContentField, Document, FieldKind, Section};
pub use source::{InstitutionType, SourceCandidate, SourceId};
pub use traits::{Generation, TokenUsage};
