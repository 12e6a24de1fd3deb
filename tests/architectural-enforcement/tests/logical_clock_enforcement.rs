//! Integration Test: Logical Clock Only
//!
//! **Policy**: The core schedules everything on its logical timeline. Reading
//! the wall clock or a monotonic clock would make reveal timing untestable.
//! **Exception**: `session.rs` stamps messages with a Unix timestamp.

use architectural_enforcement::find_violations;

#[test]
fn test_core_never_reads_a_clock() {
    let violations = find_violations(
        "conductor/core/src",
        &["Instant::now", "SystemTime::now", "tokio::time"],
        &["session.rs"],
    );

    if !violations.is_empty() {
        eprintln!("\n❌ Clock reads found in the core!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Advance the timeline with Conductor::advance_to instead.");
        panic!("\nFound {} clock read(s) in the core.", violations.len());
    }
}

#[test]
fn test_timestamps_only_in_session() {
    let violations = find_violations("conductor/core/src", &["SystemTime::now"], &[]);
    assert!(violations
        .iter()
        .all(|v| v.path.ends_with("session.rs")));
}
