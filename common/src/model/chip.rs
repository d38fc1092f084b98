//! Supported chip families and the GPIO pins each one exposes.
//!
//! The pin table decides which rows the GPIO editor shows. A pin function
//! entered for one chip has no meaning on another, so the controller drops
//! every entry whose key is not in the newly selected chip's table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChipType {
    #[serde(rename = "ESP32")]
    Esp32,
    #[serde(rename = "ESP32-S2")]
    Esp32S2,
    #[serde(rename = "ESP32-S3")]
    Esp32S3,
    #[serde(rename = "ESP32-C3")]
    Esp32C3,
    #[serde(rename = "RP2040")]
    Rp2040,
    #[serde(rename = "RTL8710")]
    Rtl8710,
    #[serde(rename = "RTL8720")]
    Rtl8720,
    #[serde(rename = "BK7231")]
    Bk7231,
    #[serde(rename = "BK7231T")]
    Bk7231t,
}

const ESP32_PINS: &[&str] = &[
    "GPIO00", "GPIO01", "GPIO02", "GPIO03", "GPIO04", "GPIO05", "GPIO06", "GPIO07", "GPIO08",
    "GPIO09", "GPIO10", "GPIO11", "GPIO12", "GPIO13", "GPIO14", "GPIO15", "GPIO16", "GPIO17",
    "GPIO18", "GPIO19", "GPIO21", "GPIO22", "GPIO23", "GPIO25", "GPIO26", "GPIO27", "GPIO32",
    "GPIO33", "GPIO34", "GPIO35", "GPIO36", "GPIO39",
];

const ESP32_S2_PINS: &[&str] = &[
    "GPIO00", "GPIO01", "GPIO02", "GPIO03", "GPIO04", "GPIO05", "GPIO06", "GPIO07", "GPIO08",
    "GPIO09", "GPIO10", "GPIO11", "GPIO12", "GPIO13", "GPIO14", "GPIO15", "GPIO16", "GPIO17",
    "GPIO18", "GPIO19", "GPIO20", "GPIO21", "GPIO26", "GPIO33", "GPIO34", "GPIO35", "GPIO36",
    "GPIO37", "GPIO38", "GPIO39", "GPIO40", "GPIO41", "GPIO42", "GPIO43", "GPIO44", "GPIO45",
];

const ESP32_S3_PINS: &[&str] = &[
    "GPIO00", "GPIO01", "GPIO02", "GPIO03", "GPIO04", "GPIO05", "GPIO06", "GPIO07", "GPIO08",
    "GPIO09", "GPIO10", "GPIO11", "GPIO12", "GPIO13", "GPIO14", "GPIO15", "GPIO16", "GPIO17",
    "GPIO18", "GPIO19", "GPIO20", "GPIO21", "GPIO35", "GPIO36", "GPIO37", "GPIO38", "GPIO39",
    "GPIO40", "GPIO41", "GPIO42", "GPIO43", "GPIO44", "GPIO45", "GPIO46", "GPIO47", "GPIO48",
];

const ESP32_C3_PINS: &[&str] = &[
    "GPIO00", "GPIO01", "GPIO02", "GPIO03", "GPIO04", "GPIO05", "GPIO06", "GPIO07", "GPIO08",
    "GPIO09", "GPIO10", "GPIO11", "GPIO12", "GPIO13", "GPIO14", "GPIO15", "GPIO16", "GPIO17",
    "GPIO18", "GPIO19", "GPIO20", "GPIO21",
];

const RP2040_PINS: &[&str] = &[
    "GPIO00", "GPIO01", "GPIO02", "GPIO03", "GPIO04", "GPIO05", "GPIO06", "GPIO07", "GPIO08",
    "GPIO09", "GPIO10", "GPIO11", "GPIO12", "GPIO13", "GPIO14", "GPIO15", "GPIO16", "GPIO17",
    "GPIO18", "GPIO19", "GPIO20", "GPIO21", "GPIO22", "GPIO23", "GPIO24", "GPIO25", "GPIO26",
    "GPIO27", "GPIO28", "GPIO29",
];

const RTL87XX_PINS: &[&str] = &[
    "GPIO00", "GPIO01", "GPIO02", "GPIO03", "GPIO04", "GPIO05", "GPIO06", "GPIO07", "GPIO08",
    "GPIO09", "GPIO10", "GPIO11", "GPIO12", "GPIO13", "GPIO14", "GPIO15",
];

const BK7231_PINS: &[&str] = &[
    "GPIO06", "GPIO07", "GPIO08", "GPIO09", "GPIO10", "GPIO11", "GPIO14", "GPIO15", "GPIO16",
    "GPIO17", "GPIO18", "GPIO19", "GPIO20", "GPIO21", "GPIO22", "GPIO23", "GPIO24", "GPIO26",
];

impl ChipType {
    /// Every supported chip, in the order the selector lists them.
    pub const ALL: [ChipType; 9] = [
        ChipType::Esp32,
        ChipType::Esp32S2,
        ChipType::Esp32S3,
        ChipType::Esp32C3,
        ChipType::Rp2040,
        ChipType::Rtl8710,
        ChipType::Rtl8720,
        ChipType::Bk7231,
        ChipType::Bk7231t,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChipType::Esp32 => "ESP32",
            ChipType::Esp32S2 => "ESP32-S2",
            ChipType::Esp32S3 => "ESP32-S3",
            ChipType::Esp32C3 => "ESP32-C3",
            ChipType::Rp2040 => "RP2040",
            ChipType::Rtl8710 => "RTL8710",
            ChipType::Rtl8720 => "RTL8720",
            ChipType::Bk7231 => "BK7231",
            ChipType::Bk7231t => "BK7231T",
        }
    }

    pub fn pins(self) -> &'static [&'static str] {
        match self {
            ChipType::Esp32 => ESP32_PINS,
            ChipType::Esp32S2 => ESP32_S2_PINS,
            ChipType::Esp32S3 => ESP32_S3_PINS,
            ChipType::Esp32C3 => ESP32_C3_PINS,
            ChipType::Rp2040 => RP2040_PINS,
            ChipType::Rtl8710 | ChipType::Rtl8720 => RTL87XX_PINS,
            ChipType::Bk7231 | ChipType::Bk7231t => BK7231_PINS,
        }
    }

    pub fn has_pin(self, pin: &str) -> bool {
        self.pins().contains(&pin)
    }
}

impl fmt::Display for ChipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChipType::ALL
            .into_iter()
            .find(|chip| chip.name() == s)
            .ok_or_else(|| format!("unknown chip type: {s}"))
    }
}
