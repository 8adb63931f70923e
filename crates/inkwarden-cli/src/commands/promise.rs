//! Promise command implementation.

use super::{read_input, Outcome};
use crate::cli::PromiseArgs;
use crate::error::Result;
use crate::output::Formatter;
use inkwarden_promise::{build_promise_guard, count_delivered, extract_promise, Promise};
use std::collections::BTreeSet;
use tracing::info;

/// Execute the promise command.
pub async fn execute_promise(args: PromiseArgs, formatter: &Formatter) -> Result<Outcome> {
    let promise = extract_promise(&args.heading);
    let delivered = match &args.content {
        Some(path) => {
            let content = read_input(path)?;
            promise.as_ref().map(|p| count_delivered(&content, &p.label))
        }
        None => None,
    };
    let guard = build_promise_guard(promise.as_ref());

    println!(
        "{}",
        formatter.format_promise(&args.heading, promise.as_ref(), delivered.as_ref(), &guard)?
    );

    let outcome = check(promise.as_ref(), delivered.as_ref());
    if let Some(promise) = &promise {
        info!(
            kind = promise.kind.as_str(),
            count = promise.count,
            delivered = delivered.as_ref().map(BTreeSet::len),
            accepted = outcome == Outcome::Accepted,
            "promise checked"
        );
    }
    Ok(outcome)
}

/// Only an enforced promise with checked, incomplete delivery fails.
fn check(promise: Option<&Promise>, delivered: Option<&BTreeSet<u32>>) -> Outcome {
    match (promise, delivered) {
        (Some(p), Some(d)) if p.kind.is_enforced() && !p.missing(d).is_empty() => Outcome::GateFailed,
        _ => Outcome::Accepted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_delivered_trap_fails() {
        let promise = extract_promise("3大陷阱").unwrap();
        let delivered = count_delivered("<h3>陷阱一：熬夜</h3><h3>陷阱二：咖啡</h3>", &promise.label);
        assert_eq!(check(Some(&promise), Some(&delivered)), Outcome::GateFailed);
    }

    #[test]
    fn test_full_delivery_passes() {
        let promise = extract_promise("3大陷阱").unwrap();
        let delivered: BTreeSet<u32> = [1, 2, 3].into_iter().collect();
        assert_eq!(check(Some(&promise), Some(&delivered)), Outcome::Accepted);
    }

    #[test]
    fn test_heading_only_never_fails() {
        let promise = extract_promise("3大陷阱").unwrap();
        assert_eq!(check(Some(&promise), None), Outcome::Accepted);
        assert_eq!(check(None, None), Outcome::Accepted);
    }
}
