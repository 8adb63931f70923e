//! Reconciliation scenarios driven through the mock model

use inkwarden_domain::TokenUsage;
use inkwarden_llm::{LlmError, MockProvider};
use inkwarden_promise::{count_delivered, extract_promise, reconcile, ReconcileOutcome};

const TWO_TRAPS: &str = "<h3>陷阱1：只看價格</h3><p>便宜的行程常常...</p><h3>陷阱2：忽略交通</h3><p>轉乘時間...</p>";

#[test]
fn test_reconcile_fills_missing_ordinal_with_one_call() {
    let promise = extract_promise("3大陷阱").unwrap();
    let provider = MockProvider::new("<h3>陷阱3：沒買保險</h3><p>旅平險...</p>").with_usage(TokenUsage::new(40, 60));

    let result = reconcile(&provider, "3大陷阱", TWO_TRAPS, &promise);

    assert_eq!(result.outcome, ReconcileOutcome::Repaired);
    assert_eq!(result.delivered.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(result.missing.is_empty());
    assert_eq!(result.follow_up_calls, 1);
    assert_eq!(result.usage.total(), 100);
    assert_eq!(provider.call_count(), 1);
    assert!(result.content.starts_with(TWO_TRAPS));
}

#[test]
fn test_reconcile_leaves_content_unchanged_when_follow_up_misses() {
    let promise = extract_promise("3大陷阱").unwrap();
    let provider = MockProvider::new("<p>抱歉，我無法再補充。</p>");

    let result = reconcile(&provider, "3大陷阱", TWO_TRAPS, &promise);

    assert_eq!(result.outcome, ReconcileOutcome::UnderDelivered);
    assert_eq!(result.content, TWO_TRAPS);
    assert_eq!(result.missing, vec![3]);
    assert!(result.warning.is_some());
    assert_eq!(provider.call_count(), 1);
}

#[test]
fn test_reconcile_ignores_repeated_ordinals_from_follow_up() {
    let promise = extract_promise("3大陷阱").unwrap();
    let provider = MockProvider::new("<h3>陷阱2：忽略交通</h3><p>重複</p>");

    let result = reconcile(&provider, "3大陷阱", TWO_TRAPS, &promise);

    assert_eq!(result.outcome, ReconcileOutcome::UnderDelivered);
    assert_eq!(result.content, TWO_TRAPS);
}

#[test]
fn test_reconcile_model_error_is_not_fatal() {
    let promise = extract_promise("3大陷阱").unwrap();
    let provider = MockProvider::default();
    provider.push_error(LlmError::Communication("connection reset".to_string()));

    let result = reconcile(&provider, "3大陷阱", TWO_TRAPS, &promise);

    assert_eq!(result.outcome, ReconcileOutcome::UnderDelivered);
    assert_eq!(result.content, TWO_TRAPS);
    assert!(result.warning.unwrap().contains("connection reset"));
}

#[test]
fn test_reconcile_keeps_partial_progress() {
    let promise = extract_promise("4個錯誤").unwrap();
    let content = "<h3>錯誤1：A</h3><p>..</p><h3>錯誤2：B</h3><p>..</p>";
    let provider = MockProvider::new("<h3>錯誤3：C</h3><p>..</p>");

    let result = reconcile(&provider, "4個錯誤", content, &promise);

    assert_eq!(result.outcome, ReconcileOutcome::PartiallyRepaired);
    assert_eq!(result.missing, vec![4]);
    assert_eq!(count_delivered(&result.content, "錯誤").len(), 3);
    assert_eq!(provider.call_count(), 1);
}

#[test]
fn test_reconcile_skips_complete_and_generic() {
    let provider = MockProvider::default();

    let trap = extract_promise("2大陷阱").unwrap();
    let complete = reconcile(&provider, "2大陷阱", TWO_TRAPS, &trap);
    assert_eq!(complete.outcome, ReconcileOutcome::Complete);

    let generic = extract_promise("5個重點").unwrap();
    let skipped = reconcile(&provider, "5個重點", "<p>只有一段</p>", &generic);
    assert_eq!(skipped.outcome, ReconcileOutcome::NotEnforced);

    assert_eq!(provider.call_count(), 0);
}

#[test]
fn test_reconcile_prompt_names_heading() {
    let promise = extract_promise("3大陷阱").unwrap();
    let provider = MockProvider::new("<h3>陷阱3：C</h3>");

    reconcile(&provider, "東京自由行3大陷阱", TWO_TRAPS, &promise);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("東京自由行3大陷阱"));
    assert!(prompts[0].contains("<h3>陷阱3：…</h3>"));
}
