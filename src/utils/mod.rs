use colored::{ColoredString, Colorize};

/// Helper function to format a boolean value as "Enabled" or "Disabled"
pub fn enabled(flag: bool) -> ColoredString {
    if flag {
        "Enabled".green()
    } else {
        "Disabled".red()
    }
}

/// Shortens a secret for display, keeping only its first and last characters
pub trait Ellipse {
    fn ellipse(&self) -> String;
}

impl Ellipse for str {
    fn ellipse(&self) -> String {
        let chars: Vec<char> = self.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 3..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl Ellipse for String {
    fn ellipse(&self) -> String {
        self.as_str().ellipse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipse_short_secret_fully_masked() {
        assert_eq!("apikey".ellipse(), "******");
        assert_eq!("".ellipse(), "");
    }

    #[test]
    fn test_ellipse_long_secret() {
        assert_eq!("sk-ant-api03-abcdef".ellipse(), "sk-...def");
    }

    #[test]
    fn test_ellipse_multibyte() {
        assert_eq!("ключ-очень-длинный".ellipse(), "клю...ный");
    }
}
