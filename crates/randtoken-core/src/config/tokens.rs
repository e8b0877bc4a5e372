//! Token generation policy.

use serde::{Deserialize, Serialize};

/// Policy applied to every token batch produced by `generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPolicy {
    /// Number of characters in each token.
    #[serde(default = "default_token_length")]
    pub token_length: usize,

    /// Number of tokens issued per sequence id.
    #[serde(default = "default_token_count")]
    pub token_count: usize,

    /// Whether the punctuation set is added to the character pool.
    #[serde(default = "default_true")]
    pub enable_special_chars: bool,

    /// Whether tokens keep mixed case. When false, tokens are lowercased.
    #[serde(default = "default_true")]
    pub enable_random_case: bool,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            token_length: default_token_length(),
            token_count: default_token_count(),
            enable_special_chars: true,
            enable_random_case: true,
        }
    }
}

fn default_token_length() -> usize {
    30
}

fn default_token_count() -> usize {
    10
}

fn default_true() -> bool {
    true
}
