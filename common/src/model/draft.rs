//! The in-progress device submission.
//!
//! `Draft` is owned by the form controller and is written to storage as a
//! whole after every mutation. The serialized field names are camelCase so
//! the stored document stays readable next to the multipart field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::chip::ChipType;
use super::image::DraftImage;
use super::standard::ElectricalStandard;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    pub board_name: String,
    pub description: String,
    pub product_link: String,
    pub chip_type: Option<ChipType>,
    pub slug: String,
    pub difficulty_rating: String,
    #[serde(rename = "madeForESPHome")]
    pub made_for_esphome: String,
    pub tags: BTreeSet<String>,
    pub electrical_standards: BTreeSet<ElectricalStandard>,
    /// Pin identifier to function label, stored as typed. Keys always belong
    /// to `chip_type`'s pin table.
    pub gpio_pins: BTreeMap<String, String>,
    pub images: Vec<DraftImage>,
    #[serde(rename = "yamlContent")]
    pub yaml_text: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Draft {
    /// Pins with a non-blank function, labels trimmed.
    pub fn populated_pins(&self) -> BTreeMap<String, String> {
        self.gpio_pins
            .iter()
            .filter_map(|(pin, label)| {
                let label = label.trim();
                (!label.is_empty()).then(|| (pin.clone(), label.to_string()))
            })
            .collect()
    }

    pub fn has_populated_pin(&self) -> bool {
        self.gpio_pins.values().any(|label| !label.trim().is_empty())
    }

    /// True when nothing the user could lose has been entered.
    pub fn is_blank(&self) -> bool {
        Draft {
            timestamp: None,
            ..self.clone()
        } == Draft::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_with_storage_field_names() {
        let draft = Draft {
            board_name: "Test Board".into(),
            made_for_esphome: "yes".into(),
            yaml_text: "esphome:\n".into(),
            ..Draft::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["boardName"], "Test Board");
        assert_eq!(json["madeForESPHome"], "yes");
        assert_eq!(json["yamlContent"], "esphome:\n");
        assert!(json["chipType"].is_null());
    }

    #[test]
    fn missing_fields_default_on_restore() {
        let draft: Draft = serde_json::from_str(r#"{"boardName":"Only a name"}"#).unwrap();
        assert_eq!(draft.board_name, "Only a name");
        assert!(draft.tags.is_empty());
        assert!(draft.images.is_empty());
    }

    #[test]
    fn populated_pins_trim_and_skip_blank_labels() {
        let mut draft = Draft::default();
        draft.gpio_pins.insert("GPIO04".into(), "  relay ".into());
        draft.gpio_pins.insert("GPIO05".into(), "   ".into());
        let pins = draft.populated_pins();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins["GPIO04"], "relay");
        assert!(draft.has_populated_pin());
    }
}
