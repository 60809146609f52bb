//! Uniform rendering of component-tagged error messages
//!
//! Every error surfaced to callers renders the same block so logs and alerts
//! can attribute a failure to its component at a glance:
//!
//! ```text
//!
//! Component: Authentication Proxy
//! Message: Failed to authenticate user jira
//! Solutions:
//! Verify the user certificate
//! ```

const COMPONENT: &str = "Component: ";
const MESSAGE: &str = "Message: ";
const SOLUTIONS: &str = "Solutions: ";
const UNKNOWN: &str = "Unknown";
const NONE: &str = "None";
const NO_SOLUTION_MESSAGE: &str = "No solution has been cataloged for troubleshooting this problem.";

/// Format a component/message pair without remediation hints.
pub fn format_error_message(component: &str, message: &str) -> String {
    format_error_message_with_solutions::<&str>(component, message, &[])
}

/// Format a component/message pair followed by remediation hints.
///
/// Empty component renders as `Unknown`, empty message as `None`, and an
/// empty solution list renders the "no solution cataloged" line.
pub fn format_error_message_with_solutions<S: AsRef<str>>(
    component: &str,
    message: &str,
    solutions: &[S],
) -> String {
    let component = if component.is_empty() { UNKNOWN } else { component };
    let message = if message.is_empty() { NONE } else { message };

    let mut out = String::from("\n");
    out.push_str(COMPONENT);
    out.push_str(component);
    out.push('\n');
    out.push_str(MESSAGE);
    out.push_str(message);
    out.push('\n');
    out.push_str(SOLUTIONS);
    out.push('\n');

    if solutions.is_empty() {
        out.push_str(NO_SOLUTION_MESSAGE);
    } else {
        let joined = solutions.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n");
        out.push_str(&joined);
    }
    out.push('\n');

    out
}
