//! Inkwarden Promise Engine
//!
//! Headings like 「3大陷阱」 commit a section to delivering a fixed number of
//! items. This crate parses that commitment, finds which numbered items the
//! section actually delivered, and repairs gaps with one bounded follow-up
//! generation.
//!
//! # Examples
//!
//! ```
//! use inkwarden_promise::{count_delivered, extract_promise, reconcile};
//! use inkwarden_llm::MockProvider;
//!
//! let promise = extract_promise("3大陷阱").unwrap();
//! let content = "<h3>陷阱1：A</h3><p>..</p><h3>陷阱2：B</h3><p>..</p>";
//!
//! let provider = MockProvider::new("<h3>陷阱3：C</h3><p>..</p>");
//! let result = reconcile(&provider, "3大陷阱", content, &promise);
//!
//! assert_eq!(count_delivered(&result.content, "陷阱").len(), 3);
//! assert_eq!(provider.call_count(), 1);
//! ```

#![warn(missing_docs)]

mod error;
pub mod numerals;
pub mod promise;
pub mod reconcile;

pub use error::PromiseError;
pub use numerals::{parse_numeral, to_numeral};
pub use promise::{
    build_promise_guard, count_delivered, count_labeled_subheadings, extract_promise, Promise, PromiseKind,
};
pub use reconcile::{reconcile, Reconciliation, ReconcileOutcome};
