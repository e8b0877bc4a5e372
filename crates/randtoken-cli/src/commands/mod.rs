//! Command implementations for the randtoken CLI.
//!
//! Each command calls into the lifecycle manager and renders the outcome as
//! text. Errors are turned into user-facing messages here, not in the core.

pub mod list;
pub mod tokens;
pub mod tutorial;

use randtoken_vault::LifecycleError;

/// Horizontal rule framing token lists.
pub(crate) const RULE: &str = "========================================";

/// Horizontal rule between listing entries.
pub(crate) const THIN_RULE: &str = "----------------------------------------";

/// User-facing message for a lifecycle error.
pub fn describe_error(err: &LifecycleError) -> String {
    match err {
        LifecycleError::Validation { field, reason } => {
            format!("Invalid arguments: {field} {reason}. Run `randtoken tutorial` for usage.")
        }
        LifecycleError::DuplicateId(id) => {
            format!("Sequence id {id} already exists, please choose another one")
        }
        LifecycleError::NotFound(id) => format!("No token record found for sequence id {id}"),
        LifecycleError::AuthFailed => {
            "The password is incorrect, the tokens were not exported".to_string()
        }
        LifecycleError::Storage(_) => {
            "Could not save token data, nothing was changed. Please try again later".to_string()
        }
        LifecycleError::Internal(_) => {
            "An unexpected error occurred, please contact an administrator".to_string()
        }
    }
}

/// Convert a lifecycle error into the CLI's error type, logging the detail.
pub(crate) fn user_error(err: LifecycleError) -> anyhow::Error {
    tracing::debug!("Command failed: {}", err);
    anyhow::anyhow!(describe_error(&err))
}

/// Numbered token list, one per line.
pub(crate) fn numbered(tokens: &[String]) -> String {
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| format!("{}. {}", i + 1, token))
        .collect::<Vec<_>>()
        .join("\n")
}
