//! Token lifecycle commands.
//!
//! `randtoken generate` - Issue a new token batch.
//! `randtoken export` - Export a batch and delete its record.
//! `randtoken delete` - Delete a record without exporting it.

use super::{RULE, numbered, user_error};
use randtoken_vault::{
    CREATED_AT_FORMAT, ExportOutcome, ExportReceipt, GeneratedBatch, LifecycleManager,
};

/// Generate a batch of tokens and show them once.
pub fn generate(
    manager: &LifecycleManager,
    seq_id: &str,
    password: &str,
    remark: &str,
) -> anyhow::Result<String> {
    let batch = manager
        .generate(seq_id, password, remark)
        .map_err(user_error)?;
    Ok(render_generated(&batch))
}

/// Export a batch of tokens, or explain how to confirm the export.
pub fn export(
    manager: &LifecycleManager,
    seq_id: &str,
    password: &str,
    confirm: Option<&str>,
) -> anyhow::Result<String> {
    match manager.export(seq_id, password, confirm).map_err(user_error)? {
        ExportOutcome::ConfirmationRequired { sequence_id } => {
            Ok(render_confirmation_prompt(&sequence_id))
        }
        ExportOutcome::Exported(receipt) => Ok(render_exported(&receipt)),
    }
}

/// Delete a record.
pub fn delete(manager: &LifecycleManager, seq_id: &str) -> anyhow::Result<String> {
    manager.delete(seq_id).map_err(user_error)?;
    Ok(format!("Deleted the token record for sequence id {seq_id}"))
}

fn render_generated(batch: &GeneratedBatch) -> String {
    format!(
        "Generated {count} tokens.\n\n\
         Sequence id: {id}\n\
         Remark: {remark}\n\n\
         {RULE}\n\
         Token list:\n\
         {tokens}\n\n\
         {RULE}\n\
         ⚠️ This is the only time these tokens are shown before export.\n\
         ⚠️ Save them somewhere safe now.",
        count = batch.tokens.len(),
        id = batch.sequence_id,
        remark = batch.remark,
        tokens = numbered(&batch.tokens),
    )
}

fn render_confirmation_prompt(sequence_id: &str) -> String {
    format!(
        "⚠️ Exporting deletes the token record for sequence id {sequence_id}.\n\
         Run the command again to confirm: randtoken export {sequence_id} <password> confirm"
    )
}

fn render_exported(receipt: &ExportReceipt) -> String {
    let location = match &receipt.artifact_path {
        Some(path) => format!("Tokens exported. File saved to:\n{}", path.display()),
        None => "Tokens exported, but the export file could not be written.".to_string(),
    };

    format!(
        "{location}\n\n\
         Sequence id: {id}\n\
         Remark: {remark}\n\
         Created at: {created_at}\n\n\
         {RULE}\n\
         Token list:\n\
         {tokens}\n\n\
         {RULE}\n\
         ⚠️ Save these tokens now.\n\n\
         ⚠️ The record has been deleted and cannot be exported again.",
        id = receipt.sequence_id,
        remark = receipt.remark,
        created_at = receipt.created_at.format(CREATED_AT_FORMAT),
        tokens = numbered(&receipt.tokens),
    )
}
