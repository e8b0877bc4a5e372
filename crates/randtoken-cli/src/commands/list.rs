//! `randtoken list` - Show token records without their tokens.

use super::{RULE, THIN_RULE, user_error};
use randtoken_core::DisplayConfig;
use randtoken_vault::{CREATED_AT_FORMAT, LifecycleManager, ListingSummary, RecordView};

/// List records in full, falling back to a summary when the listing is too long.
pub fn list(manager: &LifecycleManager, display: &DisplayConfig) -> anyhow::Result<String> {
    let records = manager.list().map_err(user_error)?;
    if records.is_empty() {
        return Ok("No token records".to_string());
    }

    let detailed = render_listing(&records);
    if detailed.chars().count() <= display.detail_budget {
        return Ok(detailed);
    }

    let summary = manager
        .list_summary(display.summary_limit)
        .map_err(user_error)?;
    Ok(render_summary(&summary))
}

fn render_listing(records: &[RecordView]) -> String {
    let mut out = format!("Token records\n{RULE}\n");
    for record in records {
        out.push_str(&format!(
            "Sequence id: {}\nRemark: {}\nCreated at: {}\nTokens: {}\n{THIN_RULE}\n",
            record.sequence_id,
            record.remark,
            record.created_at.format(CREATED_AT_FORMAT),
            record.token_count,
        ));
    }
    out
}

fn render_summary(summary: &ListingSummary) -> String {
    let lines: Vec<_> = summary
        .entries
        .iter()
        .map(|e| format!("Sequence id: {} | Remark: {}", e.sequence_id, e.remark))
        .collect();

    let mut out = format!(
        "Token records ({} total)\n{RULE}\n{}\n",
        summary.total,
        lines.join("\n")
    );
    if summary.hidden > 0 {
        out.push_str(&format!("\n... {} more records not shown\n", summary.hidden));
    }
    out.push_str("\nUse `randtoken export <seq_id> <password>` to see a record in full.");
    out
}
