//! Record model shared by every content category.
//!
//! Common display fields are typed; category-specific fields are kept verbatim in
//! `extra` so a record survives a store round trip unchanged.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SearchField;

/// One loosely-typed row of a table section (vacancy, fees, cutoff...).
pub type TableRow = Map<String, Value>;

/// A single item in a category's collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "keywords_from_any",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub keywords: Vec<String>,

    // Section fields tolerate a wrong shape: it reads as absent instead of failing the record.
    #[serde(
        default,
        deserialize_with = "dates_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub important_dates: Option<ImportantDates>,
    #[serde(
        default,
        deserialize_with = "rows_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub vacancy: Option<Vec<TableRow>>,
    #[serde(
        rename = "Salary",
        default,
        deserialize_with = "rows_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub salary: Option<Vec<TableRow>>,
    #[serde(
        default,
        deserialize_with = "rows_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub salary_details: Option<Vec<TableRow>>,
    #[serde(
        default,
        deserialize_with = "rows_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub cutoff: Option<Vec<TableRow>>,
    #[serde(
        default,
        deserialize_with = "rows_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub application_fee: Option<Vec<TableRow>>,
    #[serde(
        default,
        deserialize_with = "rows_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub rrb_results_data: Option<Vec<TableRow>>,
    #[serde(
        default,
        deserialize_with = "links_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub important_links: Option<Vec<ImportantLink>>,

    /// Fields not modelled above, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Human-facing name: `title`, else `examName`, else the id.
    pub fn display_title(&self) -> &str {
        non_blank(self.title.as_deref())
            .or_else(|| non_blank(self.exam_name.as_deref()))
            .unwrap_or(&self.id)
    }

    /// Value of a searchable field, if present.
    pub fn field(&self, field: SearchField) -> Option<&str> {
        match field {
            SearchField::Title => self.title.as_deref(),
            SearchField::ExamName => self.exam_name.as_deref(),
            SearchField::Organization => self.organization.as_deref(),
        }
    }

    /// True if any of `fields` contains `needle`, which must already be lowercase.
    pub fn matches(&self, needle: &str, fields: &[SearchField]) -> bool {
        fields.iter().any(|f| {
            self.field(*f)
                .map(|v| v.to_lowercase().contains(needle))
                .unwrap_or(false)
        })
    }

    /// Shares a non-blank `category`, `organization` or `examType` with `other`.
    pub fn is_related_to(&self, other: &Record) -> bool {
        if self.id == other.id {
            return false;
        }
        let same = |a: &Option<String>, b: &Option<String>| match (a, b) {
            (Some(a), Some(b)) => !a.trim().is_empty() && a.eq_ignore_ascii_case(b),
            _ => false,
        };
        same(&self.category, &other.category)
            || same(&self.organization, &other.organization)
            || same(&self.exam_type, &other.exam_type)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Render a JSON scalar as display text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Label and URL of an external link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportantLink {
    #[serde(alias = "title", alias = "name")]
    pub label: String,
    #[serde(alias = "link", alias = "href")]
    pub url: String,
}

/// A label/value pair from `importantDates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateEntry {
    pub key: String,
    pub value: String,
}

/// Ordered label -> value pairs; insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportantDates(pub Vec<DateEntry>);

impl ImportantDates {
    pub fn iter(&self) -> impl Iterator<Item = &DateEntry> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ImportantDates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.key, &entry.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ImportantDates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct DateRow {
            #[serde(alias = "event", alias = "name")]
            label: String,
            #[serde(alias = "date")]
            value: Value,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Map(Map<String, Value>),
            Rows(Vec<DateRow>),
        }

        let entries = match Repr::deserialize(deserializer)? {
            Repr::Map(map) => map
                .into_iter()
                .map(|(key, value)| DateEntry {
                    key,
                    value: value_text(&value),
                })
                .collect(),
            Repr::Rows(rows) => rows
                .into_iter()
                .map(|row| DateEntry {
                    key: row.label,
                    value: value_text(&row.value),
                })
                .collect(),
        };

        Ok(ImportantDates(entries))
    }
}

/// Accept keywords as an array or as one comma-separated string.
fn keywords_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(value_text)
            .filter(|k| !k.trim().is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}

/// `importantDates` in either accepted form; anything else reads as absent.
fn dates_from_any<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ImportantDates>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| ImportantDates::deserialize(v).ok()))
}

/// Table rows; a non-array reads as absent and non-object rows are dropped.
fn rows_from_any<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<TableRow>>, D::Error> {
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect(),
    ))
}

/// Links; a non-array reads as absent and entries without a label or URL are dropped.
fn links_from_any<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<ImportantLink>>, D::Error> {
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
    ))
}
