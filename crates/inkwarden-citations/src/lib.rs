//! Inkwarden Citation Injector / Scrubber
//!
//! Generated text may only lean on sources the verifier accepted. This crate
//! enforces that on the model's output:
//!
//! - [`inject`] strips `[n]` citation markers (citations are never rendered
//!   inline; presence is enforced through the whitelist)
//! - [`clean_markdown_artifacts`] removes code fences a model wraps around HTML
//! - [`detect_smells`] and [`refine_if_smelly`] catch unsourced statistics and
//!   listicle cues and send the draft back for a bounded strict rewrite
//! - [`scrub_and_repair`] and [`scrub_document`] take apart every link and
//!   bare URL, so no link markup reaches delivery
//!
//! # Examples
//!
//! ```
//! use inkwarden_citations::{inject, scrub_and_repair};
//! use inkwarden_sources::Whitelist;
//!
//! let whitelist = Whitelist::new();
//! let html = inject(r#"<p>見<a href="https://made-up.example/42">研究</a>[1]</p>"#, &whitelist);
//! let out = scrub_and_repair(&html, &whitelist);
//!
//! assert_eq!(out.text, "<p>見研究</p>");
//! assert_eq!(out.stats.invalid, 1);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod inject;
mod scrub;
mod smells;

pub use config::{CitationConfig, Substitution};
pub use error::CitationError;
pub use inject::{clean_markdown_artifacts, inject, strip_leading_heading};
pub use scrub::{scrub_and_repair, scrub_document, ScrubOutcome, ScrubStats, Scrubber};
pub use smells::{
    build_strict_rewrite_prompt, detect_smells, refine_if_smelly, strict_rewrite, Refinement, Rewrite,
    SmellReport,
};
