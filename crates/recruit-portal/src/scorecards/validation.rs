use std::collections::BTreeSet;

use super::domain::{ScorecardConfig, ScorecardData};

/// Reasons a scorecard configuration is rejected before it is bound.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigViolation {
    #[error("field at position {position} has an empty id")]
    EmptyFieldId { position: usize },
    #[error("field id '{0}' is used more than once")]
    DuplicateFieldId(String),
    #[error("field '{0}' has a blank label")]
    BlankLabel(String),
    #[error("field '{field_id}' has a non-finite {attribute}")]
    NonFinite {
        field_id: String,
        attribute: &'static str,
    },
    #[error("field '{field_id}' bounds are inverted (min {min}, max {max})")]
    InvertedBounds { field_id: String, min: f64, max: f64 },
    #[error("field '{field_id}' weight must be positive (found {weight})")]
    NonPositiveWeight { field_id: String, weight: f64 },
}

/// Check a configuration before it replaces the bound one.
pub fn validate_config(config: &ScorecardConfig) -> Result<(), ConfigViolation> {
    let mut seen = BTreeSet::new();

    for (position, field) in config.fields.iter().enumerate() {
        if field.id.trim().is_empty() {
            return Err(ConfigViolation::EmptyFieldId { position });
        }
        if !seen.insert(field.id.as_str()) {
            return Err(ConfigViolation::DuplicateFieldId(field.id.clone()));
        }
        if field.label.trim().is_empty() {
            return Err(ConfigViolation::BlankLabel(field.id.clone()));
        }

        for (attribute, value) in [("min", field.min), ("max", field.max), ("weight", field.weight)]
        {
            if value.is_some_and(|value| !value.is_finite()) {
                return Err(ConfigViolation::NonFinite {
                    field_id: field.id.clone(),
                    attribute,
                });
            }
        }

        let (min, max) = (field.min_or_default(), field.max_or_default());
        if min >= max {
            return Err(ConfigViolation::InvertedBounds {
                field_id: field.id.clone(),
                min,
                max,
            });
        }

        if let Some(weight) = field.weight {
            if weight <= 0.0 {
                return Err(ConfigViolation::NonPositiveWeight {
                    field_id: field.id.clone(),
                    weight,
                });
            }
        }
    }

    Ok(())
}

/// First answered field id that the configuration does not define.
pub(crate) fn unknown_field<'a>(
    config: &ScorecardConfig,
    data: &'a ScorecardData,
) -> Option<&'a str> {
    data.keys()
        .map(String::as_str)
        .find(|field_id| config.field(field_id).is_none())
}
