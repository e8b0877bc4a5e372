//! `randtoken tutorial` - Usage instructions. Does not touch the store.

use randtoken_core::RandtokenConfig;
use randtoken_vault::CONFIRMATION_LITERAL;

/// Render the tutorial, including the active token policy.
pub fn render(config: &RandtokenConfig) -> String {
    let policy = &config.tokens;
    format!(
        "randtoken usage:\n\
         1. Generate tokens: randtoken generate <seq_id> <password> <remark>\n\
         \x20  Example: randtoken generate 001 mypassword my API keys\n\
         2. Export tokens: randtoken export <seq_id> <password> {confirm}\n\
         \x20  Example: randtoken export 001 mypassword {confirm}\n\
         \x20  Note: exporting deletes the record; pass `{confirm}` to proceed\n\
         3. Delete tokens: randtoken delete <seq_id>\n\
         \x20  Example: randtoken delete 001\n\
         4. List records: randtoken list\n\
         5. Show this tutorial: randtoken tutorial\n\
         \n\
         Token policy:\n\
         - Token length: {length}\n\
         - Tokens per batch: {count}\n\
         - Special characters: {symbols}\n\
         - Mixed case: {case}\n\
         - Data directory: {data_dir}",
        confirm = CONFIRMATION_LITERAL,
        length = policy.token_length,
        count = policy.token_count,
        symbols = on_off(policy.enable_special_chars),
        case = on_off(policy.enable_random_case),
        data_dir = config.storage.data_dir.display(),
    )
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use randtoken_core::TokenPolicy;

    #[test]
    fn test_tutorial_lists_every_command() {
        let text = render(&RandtokenConfig::default());
        for command in ["generate", "export", "delete", "list", "tutorial"] {
            assert!(text.contains(&format!("randtoken {command}")));
        }
    }

    #[test]
    fn test_tutorial_reflects_policy() {
        let config = RandtokenConfig {
            tokens: TokenPolicy {
                token_length: 12,
                token_count: 4,
                enable_special_chars: false,
                enable_random_case: true,
            },
            ..Default::default()
        };
        let text = render(&config);
        assert!(text.contains("Token length: 12"));
        assert!(text.contains("Tokens per batch: 4"));
        assert!(text.contains("Special characters: off"));
        assert!(text.contains("Mixed case: on"));
    }
}
