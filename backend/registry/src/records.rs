use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(?:[-./]?(\d{2})|[-./](\d))?").expect("date pattern is valid")
});

#[derive(Deserialize, Debug, Default)]
pub struct SearchResponse {
    #[serde(rename = "I0320", default)]
    pub service: Option<ServiceBody>,
}

impl SearchResponse {
    pub fn into_rows(self) -> Vec<ProductRecord> {
        self.service.and_then(|body| body.row).unwrap_or_default()
    }
}

/// Only `row` is read. `total_count`, `RESULT` and anything else the registry
/// adds are skipped, whatever their shape.
#[derive(Deserialize, Debug, Default)]
pub struct ServiceBody {
    #[serde(default)]
    pub row: Option<Vec<ProductRecord>>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRecord {
    #[serde(rename = "PDT_NM", default)]
    pub product_name: Option<String>,

    #[serde(
        rename = "MNFT_DAY",
        default,
        deserialize_with = "string_or_number"
    )]
    pub manufacture_day: Option<String>,
}

impl ProductRecord {
    pub fn new(product_name: &str, manufacture_day: &str) -> Self {
        Self {
            product_name: Some(product_name.to_string()),
            manufacture_day: Some(manufacture_day.to_string()),
        }
    }

    /// Product name, if present and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.product_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn manufacture_date(&self) -> Option<ManufactureDate> {
        self.manufacture_day
            .as_deref()
            .and_then(ManufactureDate::parse)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManufactureDate {
    pub year: i32,
    pub month: Option<u32>,
}

impl ManufactureDate {
    /// Reads the year and month prefix of `YYYYMMDD`, `YYYY-MM-DD` and similar.
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = DATE_RE.captures(raw.trim())?;

        let year = captures.get(1)?.as_str().parse().ok()?;
        let month = captures
            .get(2)
            .or_else(|| captures.get(3))
            .and_then(|m| m.as_str().parse().ok());

        Some(Self { year, month })
    }
}
