//! Electrical standards (mains plug / region) a board can be certified for.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElectricalStandard {
    pub code: String,
    pub name: String,
}

impl ElectricalStandard {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// `(code, name)` pairs offered by the standards selector.
pub const AVAILABLE_STANDARDS: &[(&str, &str)] = &[
    ("EU", "Europe"),
    ("US", "United States"),
    ("UK", "United Kingdom"),
    ("AU", "Australia"),
    ("CN", "China"),
    ("IN", "India"),
    ("BR", "Brazil"),
    ("JP", "Japan"),
];

pub fn is_known_standard(code: &str, name: &str) -> bool {
    AVAILABLE_STANDARDS
        .iter()
        .any(|(c, n)| *c == code && *n == name)
}

pub fn is_known_standard_code(code: &str) -> bool {
    AVAILABLE_STANDARDS.iter().any(|(c, _)| *c == code)
}

/// Comma-joined codes, the form the submission endpoint expects.
pub fn join_codes<'a>(standards: impl IntoIterator<Item = &'a ElectricalStandard>) -> String {
    standards
        .into_iter()
        .map(|s| s.code.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
