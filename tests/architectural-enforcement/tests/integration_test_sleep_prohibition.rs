//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the TUI and the core MUST NOT call sleep
//! methods. The TUI waits on terminal events and a `tokio::time::interval`;
//! the core never waits at all.

use architectural_enforcement::{find_violations, source_dir_exists};

const SLEEP_PATTERNS: &[&str] = &["::sleep(", ".sleep(", "sleep_until("];

fn report(violations: &[architectural_enforcement::Violation], rule: &str) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n❌ {rule}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!("\nFound {} violation(s). Fix these before merging!", violations.len());
}

#[test]
fn test_no_sleep_in_core() {
    assert!(source_dir_exists("conductor/core/src"));
    let violations = find_violations("conductor/core/src", SLEEP_PATTERNS, &[]);
    report(&violations, "Sleep calls found in the core");
}

#[test]
fn test_no_sleep_in_tui() {
    assert!(source_dir_exists("tui/src"));
    let violations = find_violations("tui/src", SLEEP_PATTERNS, &[]);
    report(
        &violations,
        "Sleep calls found in the TUI (use tokio::time::interval for frame pacing)",
    );
}
