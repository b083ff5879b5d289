//! Data models for extracted draws and the published documents.
//!
//! This module defines the structures that flow between the pipeline stages:
//! - [`DrawRecord`]: One lottery result as returned by the extraction API
//! - [`ExtractedLottery`]: The raw extraction payload, before patch-up
//! - [`Draws`]: The `draws` value, typed where it is well formed
//! - [`LotteryDocument`]: Single-source output file
//! - [`AggregateDocument`] / [`AggregateItem`]: Multi-source output file
//!
//! Deserialization is lenient: the provider enforces the schema,
//! so a payload that parses as JSON is written through even when a field is
//! missing or typed as a number instead of a string.

use crate::schema::SchemaKind;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One lottery draw.
///
/// Field order matches the extraction schema so output files read the same
/// as the model's answer.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct DrawRecord {
    /// Draw date as printed on the page.
    #[serde(default, deserialize_with = "lenient_string")]
    pub draw_date: String,
    /// Full winning number.
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub top3: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub top2: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bottom2: String,
    /// Secondary prize numbers, only for [`SchemaKind::SecondaryNumbers`] sources.
    #[serde(
        default,
        deserialize_with = "lenient_strings",
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_numbers: Option<Vec<String>>,
    /// Anything else the model returned, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DrawRecord {
    /// Fill fields the schema requires but the payload omitted.
    ///
    /// Missing strings already default to `""` during deserialization; this
    /// only has to add an empty `secondary_numbers` list where required.
    pub fn fill_defaults(&mut self, kind: SchemaKind) {
        if kind == SchemaKind::SecondaryNumbers && self.secondary_numbers.is_none() {
            self.secondary_numbers = Some(Vec::new());
        }
    }
}

/// One element of a `draws` array.
///
/// Objects are read as [`DrawRecord`]s so they can be default-filled; any
/// other value is kept verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DrawEntry {
    Record(DrawRecord),
    Other(Value),
}

/// The `draws` value of an extraction payload.
///
/// The provider enforces an array of draw objects, but the payload is not
/// re-validated: a value of any other shape is written through as returned.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Draws {
    List(Vec<DrawEntry>),
    Other(Value),
}

impl Default for Draws {
    fn default() -> Self {
        Draws::List(Vec::new())
    }
}

impl From<Vec<DrawRecord>> for Draws {
    fn from(records: Vec<DrawRecord>) -> Self {
        Draws::List(records.into_iter().map(DrawEntry::Record).collect())
    }
}

impl Draws {
    /// Number of entries, or `None` when `draws` is not an array.
    pub fn entry_count(&self) -> Option<usize> {
        match self {
            Draws::List(entries) => Some(entries.len()),
            Draws::Other(_) => None,
        }
    }

    /// The entries that are draw objects.
    pub fn records(&self) -> impl Iterator<Item = &DrawRecord> {
        let entries = match self {
            Draws::List(entries) => entries.as_slice(),
            Draws::Other(_) => &[],
        };
        entries.iter().filter_map(|entry| match entry {
            DrawEntry::Record(record) => Some(record),
            DrawEntry::Other(_) => None,
        })
    }

    /// Default-fill every draw object; other values are left alone.
    pub fn fill_defaults(&mut self, kind: SchemaKind) {
        if let Draws::List(entries) = self {
            for entry in entries {
                if let DrawEntry::Record(record) = entry {
                    record.fill_defaults(kind);
                }
            }
        }
    }
}

/// The extraction payload as returned by the model.
///
/// `lottery` and `source_url` are kept only for logging: the assembler always
/// replaces them with the configured values, so they are read as untyped
/// JSON. A non-string `fetched_at` is treated as absent.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ExtractedLottery {
    #[serde(default)]
    pub lottery: Option<Value>,
    #[serde(default)]
    pub source_url: Option<Value>,
    #[serde(default)]
    pub fetched_at: Option<Value>,
    #[serde(default)]
    pub draws: Draws,
}

impl ExtractedLottery {
    /// Read an extraction payload without rejecting odd shapes.
    ///
    /// # Arguments
    ///
    /// * `payload` - The JSON value parsed from the model's answer
    ///
    /// # Returns
    ///
    /// The payload's fields when it is an object; an empty extraction (no
    /// draws, no `fetched_at`) for any other JSON value.
    ///
    /// # Errors
    ///
    /// [`serde_json::Error`] only if the object cannot be read at all, which
    /// the untyped fields make practically unreachable.
    pub fn from_payload(payload: Value) -> serde_json::Result<Self> {
        match payload {
            Value::Object(_) => serde_json::from_value(payload),
            _ => Ok(Self::default()),
        }
    }

    /// `fetched_at` when the model returned it as a string.
    pub fn fetched_at_str(&self) -> Option<&str> {
        self.fetched_at.as_ref().and_then(Value::as_str)
    }

    /// `lottery` when the model returned it as a string.
    pub fn lottery_str(&self) -> Option<&str> {
        self.lottery.as_ref().and_then(Value::as_str)
    }

    /// `source_url` when the model returned it as a string.
    pub fn source_url_str(&self) -> Option<&str> {
        self.source_url.as_ref().and_then(Value::as_str)
    }
}

/// Output of a single-source run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LotteryDocument {
    pub lottery: String,
    pub source_url: String,
    pub fetched_at: String,
    /// Most recent first, at most three.
    pub draws: Draws,
}

/// One source inside an [`AggregateDocument`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AggregateItem {
    pub key: String,
    pub name: String,
    pub source_url: String,
    pub fetched_at: String,
    pub draws: Draws,
}

/// Output of a multi-source run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AggregateDocument {
    /// When the run began.
    pub updated_at: String,
    /// Successful sources in configured order.
    pub items: Vec<AggregateItem>,
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Array(items) => Some(items.into_iter().map(scalar_to_string).collect()),
        other => Some(vec![scalar_to_string(other)]),
    })
}
