pub mod certificate;
pub mod event;
pub mod ngo;
pub mod platform_settings;
pub mod registration;
pub mod user;
pub mod volunteer_profile;

/// Raised when a status column holds a value outside the known set.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Splits a comma-joined free-text field into its trimmed, non-empty parts.
///
/// Skills, interests and focus areas are stored exactly as typed; this is only
/// applied when a record is rendered.
pub fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_comma_list_trims_and_drops_empties() {
        let parts = split_comma_list(" Teaching, First Aid ,, Communication,");
        assert_eq!(parts, vec!["Teaching", "First Aid", "Communication"]);
    }

    #[test]
    fn split_comma_list_keeps_duplicates() {
        assert_eq!(split_comma_list("a,a"), vec!["a", "a"]);
        assert!(split_comma_list("   ").is_empty());
    }
}
