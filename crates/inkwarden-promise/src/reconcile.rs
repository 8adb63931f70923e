//! Bounded promise reconciliation
//!
//! When a section under-delivers on its heading promise, ask the model once
//! for the missing items only, append them, and re-check. There is never a
//! second follow-up: a still-short section is accepted with a warning.

use crate::promise::{count_delivered, Promise};
use inkwarden_domain::traits::LlmProvider;
use inkwarden_domain::TokenUsage;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

/// How reconciliation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// Every promised ordinal was already present
    Complete,
    /// Generic promise; not enforced
    NotEnforced,
    /// The follow-up filled every gap
    Repaired,
    /// The follow-up filled some gaps; content keeps the partial result
    PartiallyRepaired,
    /// The follow-up failed or added nothing; content unchanged
    UnderDelivered,
}

impl ReconcileOutcome {
    /// Whether the promise is still unmet
    pub fn is_under_delivered(&self) -> bool {
        matches!(self, ReconcileOutcome::PartiallyRepaired | ReconcileOutcome::UnderDelivered)
    }
}

/// Result of reconciling one section against its promise
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Final section content
    pub content: String,

    /// Ordinals present in `content`
    pub delivered: BTreeSet<u32>,

    /// Ordinals still missing from `content`
    pub missing: Vec<u32>,

    /// Model calls made (0 or 1)
    pub follow_up_calls: u32,

    /// Token usage of the follow-up
    pub usage: TokenUsage,

    /// How it ended
    pub outcome: ReconcileOutcome,

    /// Why the follow-up did not help, when it did not
    pub warning: Option<String>,
}

/// Prompt asking the model for the missing items only
pub fn build_follow_up_prompt(heading: &str, promise: &Promise, delivered: &BTreeSet<u32>, missing: &[u32]) -> String {
    let label = &promise.label;
    let items = missing
        .iter()
        .map(|n| format!("<h3>{}{}：…</h3>", label, n))
        .collect::<Vec<_>>()
        .join("、");

    format!(
        "段落標題「{heading}」承諾 {count} 個{label}，目前只交付了 {have} 個。\n\
         請只補寫缺少的項目：{items}。\n\
         - 只輸出缺少項目的 HTML，不要重複已經寫過的{label}。\n\
         - 每個項目以 <h3>{label}編號：小標</h3> 開頭，後面接 <p> 段落。\n\
         - 不要輸出任何連結或網址。\n",
        heading = heading.trim(),
        count = promise.count,
        label = label,
        have = delivered.len(),
        items = items,
    )
}

/// Reconcile `content` against `promise` with at most one follow-up call
///
/// Model failures are not errors here: they end in
/// [`ReconcileOutcome::UnderDelivered`] with the original content.
pub fn reconcile<P>(provider: &P, heading: &str, content: &str, promise: &Promise) -> Reconciliation
where
    P: LlmProvider + ?Sized,
    P::Error: fmt::Display,
{
    let delivered = count_delivered(content, &promise.label);
    let missing = promise.missing(&delivered);

    let unchanged = |outcome, follow_up_calls, usage, warning| Reconciliation {
        content: content.to_string(),
        delivered: delivered.clone(),
        missing: missing.clone(),
        follow_up_calls,
        usage,
        outcome,
        warning,
    };

    if !promise.kind.is_enforced() {
        return unchanged(ReconcileOutcome::NotEnforced, 0, TokenUsage::default(), None);
    }
    if missing.is_empty() {
        debug!(label = %promise.label, count = promise.count, "Promise already delivered");
        return unchanged(ReconcileOutcome::Complete, 0, TokenUsage::default(), None);
    }

    info!(
        label = %promise.label,
        count = promise.count,
        missing = ?missing,
        "Promise under-delivered, requesting missing items"
    );
    let prompt = build_follow_up_prompt(heading, promise, &delivered, &missing);

    let generation = match provider.generate(&prompt) {
        Ok(generation) => generation,
        Err(e) => {
            let reason = format!("follow-up generation failed: {}", e);
            warn!(code = "PROMISE_UNDER_DELIVERED", label = %promise.label, %reason, "Accepting partial section");
            return unchanged(ReconcileOutcome::UnderDelivered, 1, TokenUsage::default(), Some(reason));
        }
    };

    let addition = generation.text.trim();
    let added: BTreeSet<u32> = count_delivered(addition, &promise.label)
        .into_iter()
        .filter(|n| missing.contains(n))
        .collect();

    if added.is_empty() {
        let reason = "follow-up produced none of the missing items".to_string();
        warn!(code = "PROMISE_UNDER_DELIVERED", label = %promise.label, missing = ?missing, "Accepting partial section");
        return unchanged(ReconcileOutcome::UnderDelivered, 1, generation.usage, Some(reason));
    }

    let merged = format!("{}\n{}", content.trim_end(), addition);
    let now_delivered = count_delivered(&merged, &promise.label);
    let still_missing = promise.missing(&now_delivered);

    let (outcome, warning) = if still_missing.is_empty() {
        info!(label = %promise.label, count = promise.count, "Promise repaired");
        (ReconcileOutcome::Repaired, None)
    } else {
        warn!(code = "PROMISE_UNDER_DELIVERED", label = %promise.label, missing = ?still_missing, "Accepting partial section");
        (
            ReconcileOutcome::PartiallyRepaired,
            Some(format!("still missing {:?} after one follow-up", still_missing)),
        )
    };

    Reconciliation {
        content: merged,
        delivered: now_delivered,
        missing: still_missing,
        follow_up_calls: 1,
        usage: generation.usage,
        outcome,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promise::PromiseKind;

    #[test]
    fn test_follow_up_prompt_lists_only_missing() {
        let promise = Promise::new(PromiseKind::Trap, "陷阱", 4).unwrap();
        let delivered: BTreeSet<u32> = [1, 2].into_iter().collect();
        let prompt = build_follow_up_prompt("4大陷阱", &promise, &delivered, &[3, 4]);

        assert!(prompt.contains("<h3>陷阱3：…</h3>"));
        assert!(prompt.contains("<h3>陷阱4：…</h3>"));
        assert!(!prompt.contains("<h3>陷阱1：…</h3>"));
        assert!(prompt.contains("目前只交付了 2 個"));
    }

    #[test]
    fn test_outcome_flags() {
        assert!(ReconcileOutcome::UnderDelivered.is_under_delivered());
        assert!(ReconcileOutcome::PartiallyRepaired.is_under_delivered());
        assert!(!ReconcileOutcome::Repaired.is_under_delivered());
    }
}
