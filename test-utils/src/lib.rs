//! Shared helpers for tests across the workspace: an in-memory chain to run
//! compiled contracts on, and a line diff for textual outputs.

pub mod evm;

pub use evm::{
    CallOutcome, Deployment, TEST_CALLER, TEST_ETH_BALANCE, TEST_GAS_LIMIT, TestChain, address_word,
    calldata,
};

/// Line-by-line diff of two texts. `-` lines are expected, `+` actual; a
/// side that runs out of lines shows as `<missing>`.
pub fn line_diff(actual: &str, expected: &str) -> String {
    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    let mut out = String::new();
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (None, None) => break,
            (Some(e), Some(a)) if e == a => {}
            (e, a) => {
                out.push_str(&format!("{line:>4} - {}\n", e.unwrap_or("<missing>")));
                out.push_str(&format!("{line:>4} + {}\n", a.unwrap_or("<missing>")));
            }
        }
        line += 1;
    }
    out
}

/// Panics with a line diff when the trimmed texts differ. `input` labels and
/// shows whatever produced `actual`, e.g. the compiled source.
pub fn assert_strings_with_diff(
    actual: &str,
    expected: &str,
    what: &str,
    input: Option<(&str, &str)>,
) {
    let (actual, expected) = (actual.trim(), expected.trim());
    if actual == expected {
        return;
    }
    let mut report = String::new();
    if let Some((label, text)) = input {
        report.push_str(&format!("--- {label} ---\n{}\n", text.trim()));
    }
    report.push_str(&format!("--- actual ---\n{actual}\n--- diff ---\n{}", line_diff(actual, expected)));
    panic!("{what} differs from the expected text\n{report}");
}
