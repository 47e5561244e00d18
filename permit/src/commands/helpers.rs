//! Shared helper functions for permit commands.

use permit_common::{IdempotentResult, PermitError};

/// Indent each line of text with a given prefix.
pub fn indent_lines(text: &str, prefix: &str) -> String {
    let mut out = String::new();
    for (idx, line) in text.lines().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(prefix);
        out.push_str(line);
    }
    out
}

/// One-line description of a settings update.
pub fn describe_settings(result: &IdempotentResult) -> String {
    match result {
        IdempotentResult::Changed => "updated".to_string(),
        IdempotentResult::Unchanged => "already up to date".to_string(),
        IdempotentResult::WouldChange(detail) => detail.clone(),
        IdempotentResult::NotApplicable(detail) => format!("nothing to do ({detail})"),
    }
}

/// Render an error for stderr: `error[PERMIT-Exxx]: message`, the catalog
/// category line, compiler diagnostics when a build failed, then numbered
/// remediation steps.
pub fn format_error(err: &PermitError) -> String {
    let entry = err.entry();
    let mut out = format!("error[{}]: {}\n", entry.code, err);
    out.push_str(&format!("  = {} error: {}\n", entry.category, entry.message));

    if let PermitError::BuildFailed { failures, .. } = err {
        for failure in failures {
            if failure.diagnostics.is_empty() {
                continue;
            }
            out.push_str(&format!("\n  {}:\n", failure.artifact));
            out.push_str(&indent_lines(&failure.diagnostics, "    "));
            out.push('\n');
        }
    }

    if err.keeps_placed_files() {
        out.push_str(
            "\nnote: hook files placed before the failure were kept; settings.json was not changed\n",
        );
    }

    let steps = entry.format_remediation();
    if !steps.is_empty() {
        out.push('\n');
        out.push_str(&steps);
    }
    out
}
