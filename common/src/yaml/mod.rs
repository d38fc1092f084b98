//! Security policy for submitted ESPHome configuration snippets.
//!
//! A snippet is published in a public catalogue, so it must be
//! self-contained and must not leak credentials:
//! - `!include` is forbidden anywhere in the text. This is a plain substring
//!   check on purpose and runs even when parsing fails.
//! - a top-level `external_components` key is forbidden.
//! - a top-level `wifi` block may only hold `ssid` and `password`, and both
//!   must be `!secret` references.
//!
//! `!include` and `!secret` are accepted by the parser as opaque scalars
//! carrying their literal payload. Any other local tag is a parse error.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

const INCLUDE_TAG: &str = "!include";
const SECRET_TAG: &str = "!secret";

/// Outcome of [`validate`]. Flags keep their last computed value when
/// parsing fails part way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YamlVerdict {
    pub has_include: bool,
    pub has_external_components: bool,
    pub has_wifi: bool,
    pub wifi_valid: bool,
    pub parse_error: Option<String>,
}

impl Default for YamlVerdict {
    fn default() -> Self {
        Self {
            has_include: false,
            has_external_components: false,
            has_wifi: false,
            wifi_valid: true,
            parse_error: None,
        }
    }
}

impl YamlVerdict {
    pub fn is_accepted(&self) -> bool {
        self.rejection().is_none()
    }

    /// User-facing reason the snippet is refused, parse errors first.
    pub fn rejection(&self) -> Option<String> {
        if let Some(err) = &self.parse_error {
            return Some(format!("Invalid YAML: {err}"));
        }
        if self.has_include {
            return Some("!include directives are not allowed, inline the configuration".into());
        }
        if self.has_external_components {
            return Some("external_components are not allowed".into());
        }
        if self.has_wifi && !self.wifi_valid {
            return Some(
                "The wifi block may only contain ssid and password, and both must use !secret"
                    .into(),
            );
        }
        None
    }
}

/// Runs the policy over `text`. Pure and deterministic.
pub fn validate(text: &str) -> YamlVerdict {
    let mut verdict = YamlVerdict {
        has_include: text.contains(INCLUDE_TAG),
        ..YamlVerdict::default()
    };

    let doc = match parse(text) {
        Ok(doc) => doc,
        Err(err) => {
            verdict.parse_error = Some(err);
            return verdict;
        }
    };

    // Scalar and sequence roots carry no top-level keys to police.
    let Value::Mapping(root) = doc else {
        return verdict;
    };

    verdict.has_external_components = root.contains_key("external_components");

    if let Some(wifi) = root.get("wifi") {
        verdict.has_wifi = true;
        verdict.wifi_valid =
            has_only_credentials(wifi) && secret_tags_in_wifi_lines(text) == 2;
    }

    verdict
}

/// True for `.yaml` and `.yml` file names, case-insensitively.
pub fn is_yaml_file_name(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.ends_with(".yaml") || name.ends_with(".yml")
}

/// Parses one YAML document, unwraps the two declared tags into their
/// scalar payloads and folds `<<` merge keys into their mappings.
fn parse(text: &str) -> Result<Value, String> {
    if is_effectively_empty(text) {
        return Ok(Value::Null);
    }
    let doc: Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
    let mut doc = resolve_tags(doc)?;
    doc.apply_merge().map_err(|e| e.to_string())?;
    Ok(doc)
}

fn is_effectively_empty(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

fn resolve_tags(value: Value) -> Result<Value, String> {
    match value {
        Value::Tagged(tagged) => {
            let tagged = *tagged;
            if tagged.tag == INCLUDE_TAG || tagged.tag == SECRET_TAG {
                scalar_payload(&tagged.value)
                    .map(Value::String)
                    .ok_or_else(|| format!("{} must be applied to a scalar", tagged.tag))
            } else {
                Err(format!("unknown tag {}", tagged.tag))
            }
        }
        Value::Sequence(items) => items
            .into_iter()
            .map(resolve_tags)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        Value::Mapping(map) => {
            let mut resolved = Mapping::with_capacity(map.len());
            for (key, value) in map {
                resolved.insert(resolve_tags(key)?, resolve_tags(value)?);
            }
            Ok(Value::Mapping(resolved))
        }
        other => Ok(other),
    }
}

fn scalar_payload(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

fn has_only_credentials(wifi: &Value) -> bool {
    match wifi {
        Value::Mapping(map) => {
            map.len() == 2 && map.contains_key("ssid") && map.contains_key("password")
        }
        _ => false,
    }
}

/// Counts `!secret` on the lines mentioning `wifi:`, `ssid:` or `password:`,
/// starting at the first `wifi:` in the raw text.
fn secret_tags_in_wifi_lines(text: &str) -> usize {
    let start = text.find("wifi:").unwrap_or(0);
    text[start..]
        .split('\n')
        .filter(|line| {
            line.contains("wifi:") || line.contains("ssid:") || line.contains("password:")
        })
        .map(|line| line.matches(SECRET_TAG).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_config_passes() {
        let verdict = validate("esphome:\n  name: test\n");
        assert_eq!(verdict, YamlVerdict::default());
        assert!(verdict.is_accepted());
    }

    #[test]
    fn empty_text_is_not_a_parse_error() {
        assert!(validate("").parse_error.is_none());
        assert!(validate("# nothing yet\n").parse_error.is_none());
    }

    #[test]
    fn include_is_detected_textually_even_inside_strings() {
        let verdict = validate("esphome:\n  comment: \"see !include docs\"\n");
        assert!(verdict.parse_error.is_none());
        assert!(verdict.has_include);
        assert!(!verdict.is_accepted());
    }

    #[test]
    fn include_flag_survives_a_parse_error() {
        let verdict = validate("packages: !include [unbalanced\n");
        assert!(verdict.has_include);
        assert!(verdict.parse_error.is_some());
    }

    #[test]
    fn include_tag_parses_as_scalar() {
        let verdict = validate("packages:\n  base: !include common.yaml\n");
        assert!(verdict.parse_error.is_none());
        assert!(verdict.has_include);
    }

    #[test]
    fn unknown_tags_are_parse_errors() {
        let verdict = validate("sensor:\n  lambda: !lambda return 1;\n");
        assert!(verdict.parse_error.unwrap().contains("unknown tag"));
    }

    #[test]
    fn secret_on_a_mapping_is_a_parse_error() {
        let verdict = validate("api: !secret\n  key: x\n");
        assert!(verdict.parse_error.is_some());
    }

    #[test]
    fn external_components_is_a_top_level_check() {
        assert!(validate("external_components:\n  - source: github://x/y\n").has_external_components);
        assert!(!validate("esphome:\n  external_components: []\n").has_external_components);
    }

    #[test]
    fn wifi_with_two_secrets_is_valid() {
        let verdict = validate("wifi:\n  ssid: !secret wifi_ssid\n  password: !secret wifi_password\n");
        assert!(verdict.has_wifi);
        assert!(verdict.wifi_valid);
        assert!(verdict.is_accepted());
    }

    #[test]
    fn wifi_with_plain_credentials_is_rejected() {
        let verdict = validate("wifi:\n  ssid: myssid\n  password: mypass\n");
        assert!(verdict.has_wifi);
        assert!(!verdict.wifi_valid);
        assert!(verdict.rejection().unwrap().contains("!secret"));
    }

    #[test]
    fn wifi_with_one_secret_is_rejected() {
        assert!(!validate("wifi:\n  ssid: !secret s\n  password: plain\n").wifi_valid);
    }

    #[test]
    fn wifi_with_extra_key_is_rejected() {
        let text = "wifi:\n  ssid: !secret s\n  password: !secret p\n  fast_connect: true\n";
        assert!(!validate(text).wifi_valid);
    }

    #[test]
    fn non_mapping_documents_have_no_keys() {
        let verdict = validate("- wifi\n- external_components\n");
        assert_eq!(verdict, YamlVerdict::default());
    }

    #[test]
    fn validation_is_idempotent() {
        let text = "wifi:\n  ssid: !secret s\n  password: p\n";
        assert_eq!(validate(text), validate(text));
    }

    #[test]
    fn only_yaml_extensions_are_accepted_for_drop() {
        assert!(is_yaml_file_name("device.yaml"));
        assert!(is_yaml_file_name("DEVICE.YML"));
        assert!(!is_yaml_file_name("device.yaml.txt"));
        assert!(!is_yaml_file_name("yaml"));
    }
}
