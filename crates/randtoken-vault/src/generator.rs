//! Random token generation.
//!
//! Every position of a token is drawn independently and uniformly from the
//! character pool using a cryptographically secure generator
//! (`rand::rng()`, a ChaCha-based generator seeded from the OS).

use rand::{CryptoRng, Rng};
use randtoken_core::TokenPolicy;

/// ASCII letters (both cases) and digits.
pub const ALPHANUMERIC: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Punctuation added to the pool when special characters are enabled.
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?~";

/// Build the character pool for a token.
pub fn character_pool(include_symbols: bool) -> Vec<char> {
    let mut pool: Vec<char> = ALPHANUMERIC.chars().collect();
    if include_symbols {
        pool.extend(SPECIAL_CHARS.chars());
    }
    pool
}

/// Produces random tokens for a fixed length and character-set policy.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    length: usize,
    mixed_case: bool,
    pool: Vec<char>,
}

impl TokenGenerator {
    /// Create a generator.
    ///
    /// When `mixed_case` is false every token is lowercased after drawing.
    /// This collapses case information and is intentional.
    pub fn new(length: usize, include_symbols: bool, mixed_case: bool) -> Self {
        Self {
            length,
            mixed_case,
            pool: character_pool(include_symbols),
        }
    }

    /// Create a generator from the configured token policy.
    pub fn from_policy(policy: &TokenPolicy) -> Self {
        Self::new(
            policy.token_length,
            policy.enable_special_chars,
            policy.enable_random_case,
        )
    }

    /// Token length in characters.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate one token from the thread-local CSPRNG.
    pub fn generate(&self) -> String {
        self.generate_with(&mut rand::rng())
    }

    /// Generate one token from the given generator.
    pub fn generate_with<R>(&self, rng: &mut R) -> String
    where
        R: Rng + CryptoRng,
    {
        let token: String = (0..self.length)
            .map(|_| self.pool[rng.random_range(0..self.pool.len())])
            .collect();

        if self.mixed_case {
            token
        } else {
            token.to_ascii_lowercase()
        }
    }

    /// Generate `count` tokens.
    pub fn generate_batch(&self, count: usize) -> Vec<String> {
        let mut rng = rand::rng();
        (0..count).map(|_| self.generate_with(&mut rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_token_has_requested_length() {
        let generator = TokenGenerator::new(30, true, true);
        assert_eq!(generator.generate().chars().count(), 30);
    }

    #[test]
    fn test_zero_length_is_empty() {
        let generator = TokenGenerator::new(0, true, true);
        assert_eq!(generator.generate(), "");
    }

    #[test]
    fn test_without_symbols_is_alphanumeric() {
        let generator = TokenGenerator::new(200, false, true);
        let token = generator.generate();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_lowercase_when_case_disabled() {
        let generator = TokenGenerator::new(200, true, false);
        let token = generator.generate();
        assert!(!token.chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_symbols_drawn_from_pool() {
        let pool = character_pool(true);
        let generator = TokenGenerator::new(500, true, true);
        let token = generator.generate();
        assert!(token.chars().all(|c| pool.contains(&c)));
    }

    #[test]
    fn test_pool_sizes() {
        assert_eq!(character_pool(false).len(), 62);
        assert_eq!(character_pool(true).len(), 62 + SPECIAL_CHARS.len());
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let generator = TokenGenerator::new(16, true, true);
        let a = generator.generate_with(&mut StdRng::seed_from_u64(7));
        let b = generator.generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_batch_count_and_policy() {
        let policy = TokenPolicy {
            token_length: 8,
            token_count: 3,
            enable_special_chars: false,
            enable_random_case: false,
        };
        let generator = TokenGenerator::from_policy(&policy);
        let tokens = generator.generate_batch(policy.token_count);
        assert_eq!(tokens.len(), 3);
        for token in &tokens {
            assert_eq!(token.len(), 8);
            assert!(token
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }
}
