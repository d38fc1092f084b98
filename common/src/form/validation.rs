//! Field-level rules and the error map the view renders from.

use std::collections::BTreeMap;

use crate::model::draft::Draft;
use crate::yaml;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    BoardName,
    Description,
    ProductLink,
    Slug,
    GpioPins,
    Tags,
    Images,
    Yaml,
}

impl Field {
    /// Fields evaluated by a full form validation. The slug is checked
    /// remotely and never blocks submission.
    pub const VALIDATED: [Field; 7] = [
        Field::BoardName,
        Field::Description,
        Field::ProductLink,
        Field::GpioPins,
        Field::Tags,
        Field::Images,
        Field::Yaml,
    ];
}

/// Whether errors for every field are on display.
///
/// The form starts `Untouched`; the first forced validation moves it to
/// `Validated` and only a reset moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPhase {
    #[default]
    Untouched,
    Validated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: Field, error: Option<String>) {
        match error {
            Some(message) => {
                self.0.insert(field, message);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// First field in form order that carries an error.
    pub fn first(&self) -> Option<Field> {
        self.0.keys().next().copied()
    }
}

/// Evaluates one field's rule, returning the message to show on failure.
pub fn check_field(draft: &Draft, field: Field) -> Result<(), String> {
    match field {
        Field::BoardName => require(&draft.board_name, "Board name is required"),
        Field::Description => require(&draft.description, "Description is required"),
        Field::ProductLink => {
            let link = draft.product_link.trim();
            if link.is_empty() || is_absolute_url(link) {
                Ok(())
            } else {
                Err("Please enter a valid URL".into())
            }
        }
        Field::Slug => require(&draft.slug, "Slug is required"),
        Field::GpioPins => {
            if draft.has_populated_pin() {
                Ok(())
            } else {
                Err("At least one GPIO pin must have a function".into())
            }
        }
        Field::Tags => {
            if draft.tags.is_empty() {
                Err("At least one tag is required".into())
            } else {
                Ok(())
            }
        }
        Field::Images => {
            if draft.images.is_empty() {
                Err("At least one image is required".into())
            } else {
                Ok(())
            }
        }
        Field::Yaml => {
            if draft.yaml_text.trim().is_empty() {
                return Err("Sample YAML configuration is required".into());
            }
            match yaml::validate(&draft.yaml_text).rejection() {
                Some(reason) => Err(reason),
                None => Ok(()),
            }
        }
    }
}

fn require(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

pub fn is_absolute_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_link_is_optional_but_must_be_absolute() {
        let mut draft = Draft::default();
        assert!(check_field(&draft, Field::ProductLink).is_ok());
        draft.product_link = "example.com/board".into();
        assert!(check_field(&draft, Field::ProductLink).is_err());
        draft.product_link = "https://example.com/board".into();
        assert!(check_field(&draft, Field::ProductLink).is_ok());
    }

    #[test]
    fn whitespace_does_not_satisfy_required_text() {
        let draft = Draft {
            board_name: "   ".into(),
            ..Draft::default()
        };
        assert_eq!(
            check_field(&draft, Field::BoardName),
            Err("Board name is required".to_string())
        );
    }

    #[test]
    fn yaml_rule_reports_policy_violations() {
        let draft = Draft {
            yaml_text: "external_components:\n  - source: x\n".into(),
            ..Draft::default()
        };
        let err = check_field(&draft, Field::Yaml).unwrap_err();
        assert!(err.contains("external_components"));
    }

    #[test]
    fn errors_iterate_in_form_order() {
        let mut errors = FieldErrors::default();
        errors.set(Field::Yaml, Some("yaml".into()));
        errors.set(Field::BoardName, Some("name".into()));
        assert_eq!(errors.first(), Some(Field::BoardName));
        errors.set(Field::BoardName, None);
        assert_eq!(errors.first(), Some(Field::Yaml));
    }
}
