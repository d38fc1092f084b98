//! Files and names produced for one device submission.

use chrono::NaiveDate;
use common::model::chip::ChipType;
use common::model::standard::is_known_standard_code;
use common::model::tag::is_known_tag;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9.-]").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A submission as received, before anything is written upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSubmission {
    pub slug: String,
    pub board_name: String,
    pub description: String,
    pub chip_type: String,
    pub product_link: Option<String>,
    pub difficulty_rating: Option<String>,
    pub made_for_esphome: Option<String>,
    pub electrical_standards: Vec<String>,
    pub gpio_pins: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub yaml_config: String,
    pub images: Vec<UploadedImage>,
}

impl DeviceSubmission {
    pub fn has_required_fields(&self) -> bool {
        ![
            &self.slug,
            &self.board_name,
            &self.description,
            &self.chip_type,
            &self.yaml_config,
        ]
        .iter()
        .any(|v| v.trim().is_empty())
            && !self.tags.is_empty()
    }

    /// Describes the first chip, pin, tag or standard outside the fixed
    /// vocabularies.
    pub fn vocabulary_error(&self) -> Option<String> {
        let Ok(chip) = self.chip_type.parse::<ChipType>() else {
            return Some(format!("Unknown chip type {:?}", self.chip_type));
        };
        if let Some(pin) = self.gpio_pins.keys().find(|pin| !chip.has_pin(pin)) {
            return Some(format!("{chip} has no pin {pin:?}"));
        }
        if let Some(tag) = self.tags.iter().find(|tag| !is_known_tag(tag)) {
            return Some(format!("Unknown tag {tag:?}"));
        }
        self.electrical_standards
            .iter()
            .find(|code| !is_known_standard_code(code))
            .map(|code| format!("Unknown electrical standard {code:?}"))
    }
}

/// Comma separated list with blanks dropped.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// `<slug>-<short id>-<YYYYMMDD>`
pub fn branch_name(slug: &str, short_id: &str, date: NaiveDate) -> String {
    format!("{}-{}-{}", slug, short_id, date.format("%Y%m%d"))
}

pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_FILE_CHARS.replace_all(name, "_").into_owned()
}

/// Quotes a value so it stays one scalar inside the front matter.
fn scalar(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

fn scalar_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| scalar(v)).collect();
    format!("[{}]", quoted.join(", "))
}

/// `device.md`: YAML front matter followed by the description.
pub fn device_markdown(device: &DeviceSubmission) -> String {
    let mut lines = vec![
        "---".to_string(),
        format!("chip: {}", scalar(&device.chip_type)),
        format!("board: {}", scalar(&device.slug)),
        format!("name: {}", scalar(&device.board_name)),
    ];
    if let Some(link) = &device.product_link {
        lines.push(format!("product_link: {}", scalar(link)));
    }
    if let Some(rating) = &device.difficulty_rating {
        lines.push(format!("difficulty: {}", scalar(rating)));
    }
    if let Some(made_for) = &device.made_for_esphome {
        lines.push(format!("made_for_esphome: {}", scalar(made_for)));
    }
    if !device.electrical_standards.is_empty() {
        lines.push(format!(
            "standards: {}",
            scalar_list(&device.electrical_standards)
        ));
    }
    lines.push(format!("tags: {}", scalar_list(&device.tags)));
    lines.push("gpio_pins:".to_string());
    for (pin, function) in &device.gpio_pins {
        lines.push(format!("  {}: {}", scalar(pin), scalar(function)));
    }
    lines.push("---".to_string());
    lines.push(String::new());
    lines.push(device.description.clone());
    lines.join("\n")
}

pub fn pull_request_title(device: &DeviceSubmission) -> String {
    format!("Add device: {}", device.board_name)
}

pub fn pull_request_body(device: &DeviceSubmission) -> String {
    format!(
        "Add support for {}\n\n{}",
        device.board_name, device.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeviceSubmission {
        DeviceSubmission {
            slug: "test-board".into(),
            board_name: "Test Board".into(),
            description: "A board".into(),
            chip_type: "ESP32".into(),
            gpio_pins: BTreeMap::from([("GPIO04".to_string(), "relay".to_string())]),
            tags: vec!["relay".into(), "switch".into()],
            yaml_config: "esphome:\n  name: test\n".into(),
            ..DeviceSubmission::default()
        }
    }

    #[test]
    fn markdown_has_front_matter_then_description() {
        let md = device_markdown(&sample());
        assert_eq!(
            md,
            "---\nchip: \"ESP32\"\nboard: \"test-board\"\nname: \"Test Board\"\ntags: [\"relay\", \"switch\"]\ngpio_pins:\n  \"GPIO04\": \"relay\"\n---\n\nA board"
        );
    }

    #[test]
    fn optional_fields_appear_when_present() {
        let device = DeviceSubmission {
            product_link: Some("https://example.com".into()),
            difficulty_rating: Some("3".into()),
            made_for_esphome: Some("yes".into()),
            electrical_standards: vec!["EU".into(), "US".into()],
            ..sample()
        };
        let md = device_markdown(&device);
        assert!(md.contains("product_link: \"https://example.com\"\n"));
        assert!(md.contains("difficulty: \"3\"\n"));
        assert!(md.contains("made_for_esphome: \"yes\"\n"));
        assert!(md.contains("standards: [\"EU\", \"US\"]\n"));
    }

    #[test]
    fn free_text_cannot_break_out_of_front_matter() {
        let device = DeviceSubmission {
            board_name: "Plug: v2\n---".into(),
            ..sample()
        };
        assert!(device_markdown(&device).contains("name: \"Plug: v2\\n---\"\n"));
    }

    #[test]
    fn every_value_stays_inside_its_line() {
        let device = DeviceSubmission {
            chip_type: "ESP32\nevil: true".into(),
            difficulty_rating: Some("3\n---".into()),
            made_for_esphome: Some("yes\nx: y".into()),
            electrical_standards: vec!["EU]\nowned: [1".into()],
            tags: vec!["relay]\n---".into()],
            gpio_pins: BTreeMap::from([("GPIO04: x\n---".to_string(), "relay".to_string())]),
            ..sample()
        };
        let md = device_markdown(&device);
        let front_matter: Vec<&str> = md.lines().take_while(|l| *l != "A board").collect();
        assert_eq!(front_matter.iter().filter(|l| **l == "---").count(), 2);
        assert!(front_matter
            .iter()
            .all(|l| !l.starts_with("evil") && !l.starts_with("owned") && !l.starts_with("x:")));
        assert!(md.contains("chip: \"ESP32\\nevil: true\"\n"));
    }

    #[test]
    fn vocabulary_is_enforced() {
        assert_eq!(sample().vocabulary_error(), None);
        let unknown_chip = DeviceSubmission {
            chip_type: "ESP8266".into(),
            ..sample()
        };
        assert_eq!(
            unknown_chip.vocabulary_error().as_deref(),
            Some("Unknown chip type \"ESP8266\"")
        );
        let foreign_pin = DeviceSubmission {
            gpio_pins: BTreeMap::from([("GPIO99".to_string(), "relay".to_string())]),
            ..sample()
        };
        assert!(foreign_pin.vocabulary_error().unwrap().contains("GPIO99"));
        let unknown_tag = DeviceSubmission {
            tags: vec!["relay".into(), "toaster".into()],
            ..sample()
        };
        assert!(unknown_tag.vocabulary_error().unwrap().contains("toaster"));
        let unknown_standard = DeviceSubmission {
            electrical_standards: vec!["EU".into(), "XX".into()],
            ..sample()
        };
        assert!(unknown_standard.vocabulary_error().unwrap().contains("XX"));
    }

    #[test]
    fn branch_name_uses_compact_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            branch_name("test-board", "a1b2c3d4", date),
            "test-board-a1b2c3d4-20240309"
        );
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("my photo (1).JPG"), "my_photo__1_.JPG");
        assert_eq!(sanitize_file_name("../../etc"), ".._.._etc");
    }

    #[test]
    fn required_fields() {
        assert!(sample().has_required_fields());
        assert!(!DeviceSubmission {
            tags: Vec::new(),
            ..sample()
        }
        .has_required_fields());
        assert!(!DeviceSubmission {
            yaml_config: "  ".into(),
            ..sample()
        }
        .has_required_fields());
        assert_eq!(split_list("relay, ,sensor,"), vec!["relay", "sensor"]);
    }
}
