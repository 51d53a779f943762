use rand::distr::Alphanumeric;
use rand::Rng;

/// Produces verification tokens.
pub trait TokenGenerator {
    /// Generate a token of `length` ASCII letters and digits.
    fn generate(&self, length: usize) -> String;
}

/// Draws tokens from the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlphanumericTokenGenerator;

impl TokenGenerator for AlphanumericTokenGenerator {
    fn generate(&self, length: usize) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect()
    }
}

/// True if `token` is non-empty and only letters and digits.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_alphanumeric() {
        let token = AlphanumericTokenGenerator.generate(32);
        assert_eq!(token.len(), 32);
        assert!(is_valid_token(&token));
    }

    #[test]
    fn rejects_punctuation_and_spaces() {
        assert!(is_valid_token("Abc123"));
        assert!(!is_valid_token("abc-123"));
        assert!(!is_valid_token("abc 123"));
        assert!(!is_valid_token(""));
    }
}
