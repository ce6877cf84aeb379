//! Random key generation for project keys.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Number of characters in a project key.
pub const PROJECT_KEY_LEN: usize = 32;

/// Generates a random alphanumeric project key of [`PROJECT_KEY_LEN`] characters.
pub fn generate_project_key() -> String {
    generate_key(PROJECT_KEY_LEN)
}

/// Generates a random alphanumeric string of the given length.
pub fn generate_key(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Returns true if the input has the shape of a project key.
///
/// This is a cheap syntactic check used before hitting the store; it says
/// nothing about whether the key belongs to a project.
pub fn is_well_formed_project_key(key: &str) -> bool {
    key.len() == PROJECT_KEY_LEN && key.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_project_key_length() {
        let key = generate_project_key();
        assert_eq!(key.len(), PROJECT_KEY_LEN);
    }

    #[test]
    fn test_generate_project_key_alphanumeric() {
        let key = generate_project_key();
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_project_key_unique() {
        let first = generate_project_key();
        let second = generate_project_key();
        assert_ne!(first, second);
    }

    #[test]
    fn test_generate_key_custom_length() {
        assert_eq!(generate_key(0), "");
        assert_eq!(generate_key(8).len(), 8);
    }

    #[test]
    fn test_is_well_formed_project_key() {
        assert!(is_well_formed_project_key(&generate_project_key()));
        assert!(is_well_formed_project_key(&"a".repeat(32)));
    }

    #[test]
    fn test_is_well_formed_project_key_rejects_bad_input() {
        assert!(!is_well_formed_project_key(""));
        assert!(!is_well_formed_project_key(&"a".repeat(31)));
        assert!(!is_well_formed_project_key(&"a".repeat(33)));
        assert!(!is_well_formed_project_key(&format!("{}-", "a".repeat(31))));
    }
}
