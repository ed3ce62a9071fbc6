//! Integration Test: Sleep Prohibition
//!
//! Production code in the TUI and Conductor must not block a thread with
//! `std::thread::sleep`. The UI waits on its event sources; the core waits on
//! the gateway and the input channel.

use architectural_enforcement::{find_violations, production_sources};

fn is_thread_sleep(line: &str) -> bool {
    line.contains("thread::sleep(") || line.contains("std::thread::sleep")
}

#[test]
fn test_no_thread_sleep_in_production_code() {
    let mut files = production_sources("conductor/core/src");
    files.extend(production_sources("tui/src"));
    assert!(!files.is_empty(), "no sources found to check");

    let violations = find_violations(&files, is_thread_sleep);
    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        panic!("Found {} thread sleep call(s) in production code", violations.len());
    }
}

#[test]
fn test_no_polling_sleep_in_tui_loop() {
    let files = production_sources("tui/src");
    let violations = find_violations(&files, |line| {
        line.contains("time::sleep(") || line.contains(".sleep(")
    });
    assert!(
        violations.is_empty(),
        "UI loop must wait on events, not sleep:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_detector_flags_thread_sleep() {
    assert!(is_thread_sleep("    std::thread::sleep(Duration::from_millis(5));"));
    assert!(is_thread_sleep("thread::sleep(d);"));
    assert!(!is_thread_sleep("sleep_until(deadline).await"));
}
