//! Shared CLI helpers.

use colored::{ColoredString, Colorize};

use mcpconv_core::types::{AuthStatus, Availability};
use mcpconv_core::utils::truncate_string;

/// Single-line preview of model output for error reports.
pub fn preview(text: &str, max_len: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_string(&flat, max_len)
}

pub fn availability_badge(availability: &Availability) -> ColoredString {
    match availability {
        Availability::Ok => "✓ available".green(),
        Availability::Failed(reason) => format!("✗ {reason}").red(),
    }
}

pub fn auth_badge(auth: &AuthStatus) -> ColoredString {
    match auth {
        AuthStatus::Ok => "✓ key set".green(),
        AuthStatus::NotApplicable => "· no key needed".dimmed(),
        AuthStatus::Failed(reason) => format!("✗ {reason}").red(),
    }
}

/// Print the section title used by every command.
pub fn print_title(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_flattens_and_truncates() {
        let raw = "```json\n{\n  \"mcpServers\": {}\n}\n```";
        assert_eq!(preview(raw, 200), "```json { \"mcpServers\": {} } ```");
        assert_eq!(preview("a b c d e f g h", 8), "a b c...");
    }
}
