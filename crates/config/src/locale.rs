use chrono::Locale;

/// Parse a POSIX-style locale name such as `de_DE`, `de-DE` or
/// `de_DE.UTF-8`.
pub fn parse_locale(name: &str) -> Option<Locale> {
    let base = name.split(['.', '@']).next().unwrap_or(name).trim();
    if base.is_empty() {
        return None;
    }
    let normalized = base.replace('-', "_");
    Locale::try_from(normalized.as_str()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_spellings() {
        assert!(matches!(parse_locale("de_DE"), Some(Locale::de_DE)));
        assert!(matches!(parse_locale("de-DE"), Some(Locale::de_DE)));
        assert!(matches!(parse_locale("en_US.UTF-8"), Some(Locale::en_US)));
    }

    #[test]
    fn rejects_unknown() {
        assert!(parse_locale("xx_YY").is_none());
        assert!(parse_locale("").is_none());
    }
}
