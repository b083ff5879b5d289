//! JSON-schema contracts for the extraction API.
//!
//! The output schema is a pure function of the source key: most sources use
//! [`SchemaKind::Standard`], while Lao Santipap draws also publish a row of
//! secondary numbers and use [`SchemaKind::SecondaryNumbers`].
//!
//! Both schemas are closed objects (`additionalProperties: false`) with every
//! property listed in `required`, as strict structured-output mode demands.

use crate::config::DEFAULT_SINGLE_KEY;
use serde_json::{Value, json};

/// Maximum number of draws requested from the model.
pub const MAX_DRAWS: usize = 3;

/// Number of entries in `secondary_numbers` for [`SchemaKind::SecondaryNumbers`].
pub const SECONDARY_NUMBERS_LEN: usize = 3;

/// String fields every draw must carry.
pub const DRAW_FIELDS: [&str; 5] = ["draw_date", "full_number", "top3", "top2", "bottom2"];

pub const SECONDARY_NUMBERS_FIELD: &str = "secondary_numbers";

const BASE_PROMPT: &str =
    "Extract lottery results. Return ONLY valid JSON. Latest 3 draws only.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Standard,
    SecondaryNumbers,
}

impl SchemaKind {
    pub fn for_key(key: &str) -> Self {
        match key {
            DEFAULT_SINGLE_KEY => SchemaKind::SecondaryNumbers,
            _ => SchemaKind::Standard,
        }
    }

    /// Name sent as `json_schema.name`.
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::Standard => "lotto_latest_3",
            SchemaKind::SecondaryNumbers => "lotto_latest_3_secondary",
        }
    }

    pub fn system_prompt(&self) -> String {
        match self {
            SchemaKind::Standard => format!(
                "{BASE_PROMPT} Order draws most recent first. Copy numbers exactly as printed, \
                 as strings, keeping leading zeros. Use an empty string for a value the page \
                 does not show."
            ),
            SchemaKind::SecondaryNumbers => format!(
                "{BASE_PROMPT} Order draws most recent first. Copy numbers exactly as printed, \
                 as strings, keeping leading zeros. Use an empty string for a value the page \
                 does not show. Each draw also lists {SECONDARY_NUMBERS_LEN} secondary prize \
                 numbers below the main result; put them in `{SECONDARY_NUMBERS_FIELD}` in the \
                 order shown."
            ),
        }
    }

    /// Field names every draw object must carry.
    pub fn draw_fields(&self) -> Vec<&'static str> {
        let mut fields = DRAW_FIELDS.to_vec();
        if *self == SchemaKind::SecondaryNumbers {
            fields.push(SECONDARY_NUMBERS_FIELD);
        }
        fields
    }

    /// The full `schema` object for the response format.
    pub fn json_schema(&self) -> Value {
        let mut draw_properties = serde_json::Map::new();
        for field in DRAW_FIELDS {
            draw_properties.insert(field.to_string(), json!({ "type": "string" }));
        }
        if *self == SchemaKind::SecondaryNumbers {
            draw_properties.insert(
                SECONDARY_NUMBERS_FIELD.to_string(),
                json!({
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": SECONDARY_NUMBERS_LEN,
                    "maxItems": SECONDARY_NUMBERS_LEN,
                }),
            );
        }

        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["lottery", "source_url", "fetched_at", "draws"],
            "properties": {
                "lottery": { "type": "string" },
                "source_url": { "type": "string" },
                "fetched_at": { "type": "string" },
                "draws": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": MAX_DRAWS,
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "required": self.draw_fields(),
                        "properties": draw_properties,
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_selection_by_key() {
        assert_eq!(SchemaKind::for_key("lao_santipap"), SchemaKind::SecondaryNumbers);
        assert_eq!(
            SchemaKind::for_key(DEFAULT_SINGLE_KEY),
            SchemaKind::SecondaryNumbers
        );
        for key in ["hanoi", "lao_vip", "lao_pattana", "anything"] {
            assert_eq!(SchemaKind::for_key(key), SchemaKind::Standard);
        }
    }

    #[test]
    fn test_standard_schema_is_closed() {
        let schema = SchemaKind::Standard.json_schema();
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(
            schema["required"],
            json!(["lottery", "source_url", "fetched_at", "draws"])
        );

        let draws = &schema["properties"]["draws"];
        assert_eq!(draws["minItems"], 1);
        assert_eq!(draws["maxItems"], 3);
        assert_eq!(draws["items"]["additionalProperties"], false);
        assert_eq!(draws["items"]["required"], json!(DRAW_FIELDS));
        assert!(draws["items"]["properties"].get(SECONDARY_NUMBERS_FIELD).is_none());
    }

    #[test]
    fn test_secondary_schema_adds_required_array() {
        let schema = SchemaKind::SecondaryNumbers.json_schema();
        let items = &schema["properties"]["draws"]["items"];
        let required: Vec<&str> = items["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert!(required.contains(&SECONDARY_NUMBERS_FIELD));
        assert_eq!(required.len(), DRAW_FIELDS.len() + 1);

        let field = &items["properties"][SECONDARY_NUMBERS_FIELD];
        assert_eq!(field["type"], "array");
        assert_eq!(field["minItems"], SECONDARY_NUMBERS_LEN);
        assert_eq!(field["maxItems"], SECONDARY_NUMBERS_LEN);
    }

    #[test]
    fn test_required_matches_properties() {
        for kind in [SchemaKind::Standard, SchemaKind::SecondaryNumbers] {
            let items = kind.json_schema()["properties"]["draws"]["items"].clone();
            let properties = items["properties"].as_object().unwrap();
            assert_eq!(properties.len(), kind.draw_fields().len());
            for field in kind.draw_fields() {
                assert!(properties.contains_key(field), "{field} missing for {kind:?}");
            }
        }
    }

    #[test]
    fn test_prompts_and_names_differ() {
        assert_ne!(SchemaKind::Standard.name(), SchemaKind::SecondaryNumbers.name());
        assert!(SchemaKind::Standard.system_prompt().starts_with(BASE_PROMPT));
        assert!(!SchemaKind::Standard.system_prompt().contains(SECONDARY_NUMBERS_FIELD));
        assert!(
            SchemaKind::SecondaryNumbers
                .system_prompt()
                .contains(SECONDARY_NUMBERS_FIELD)
        );
    }
}
