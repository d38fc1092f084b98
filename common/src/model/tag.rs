//! Fixed tag vocabulary a submission can be labelled with.

/// Tags accepted by the upstream catalogue, in suggestion order.
pub const AVAILABLE_TAGS: &[&str] = &[
    "display",
    "wifi",
    "ethernet",
    "battery",
    "sensor",
    "light",
    "switch",
    "relay",
    "climate",
    "cover",
    "fan",
    "camera",
    "audio",
    "security",
    "automation",
    "development",
];

pub fn is_known_tag(tag: &str) -> bool {
    AVAILABLE_TAGS.contains(&tag)
}

/// Returns vocabulary entries starting with `input` (case-insensitive) that
/// are not already selected. An empty input yields no suggestions.
pub fn tag_suggestions<'a, F>(input: &str, is_selected: F) -> Vec<&'static str>
where
    F: Fn(&str) -> bool + 'a,
{
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    AVAILABLE_TAGS
        .iter()
        .copied()
        .filter(|tag| tag.starts_with(&needle) && !is_selected(tag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_match_prefix_and_skip_selected() {
        assert_eq!(tag_suggestions("S", |_| false), vec!["sensor", "switch", "security"]);
        assert_eq!(tag_suggestions("s", |t| t == "switch"), vec!["sensor", "security"]);
        assert!(tag_suggestions("", |_| false).is_empty());
        assert!(tag_suggestions("zigbee", |_| false).is_empty());
    }
}
