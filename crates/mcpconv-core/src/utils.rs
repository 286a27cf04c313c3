//! Path resolution and string helpers.

use std::path::PathBuf;

/// The mcpconv data directory (`~/.mcpconv/`).
pub fn get_data_path() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mcpconv")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// First non-blank value among the given environment variables.
pub fn first_env(keys: &[&str]) -> Option<(String, String)> {
    keys.iter().find_map(|key| {
        std::env::var(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| (key.to_string(), v))
    })
}

/// Mask a secret for display, keeping the first four characters.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate_string("hello world, this is a long string", 15);
        assert_eq!(result, "hello world,...");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate_string("こんにちは世界です", 5), "こん...");
    }

    #[test]
    fn test_first_env_skips_blank() {
        std::env::set_var("MCPCONV_TEST_FIRST_ENV_A", "  ");
        std::env::set_var("MCPCONV_TEST_FIRST_ENV_B", "value");
        let found = first_env(&["MCPCONV_TEST_FIRST_ENV_A", "MCPCONV_TEST_FIRST_ENV_B"]);
        assert_eq!(
            found,
            Some(("MCPCONV_TEST_FIRST_ENV_B".to_string(), "value".to_string()))
        );
        assert_eq!(first_env(&["MCPCONV_TEST_FIRST_ENV_MISSING"]), None);
        std::env::remove_var("MCPCONV_TEST_FIRST_ENV_A");
        std::env::remove_var("MCPCONV_TEST_FIRST_ENV_B");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk-abcdefghijk"), "sk-a****");
        assert_eq!(mask_secret("short"), "****");
    }
}
