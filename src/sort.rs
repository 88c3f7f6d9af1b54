// ↕️ Comparator / Sort Stage
//
// Equal keys fall back to `id` ascending and missing values sort last in
// either direction, so output is deterministic for a given input set.

use crate::manufacturer::ManufacturerRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    City,
    State,
    Employees,
    Revenue,
    Rating,
    Capacity,
    Sustainability,
    Moq,
    LeadTime,
    YearEstablished,
}

impl SortField {
    pub const ALL: &'static [SortField] = &[
        SortField::Name,
        SortField::City,
        SortField::State,
        SortField::Employees,
        SortField::Revenue,
        SortField::Rating,
        SortField::Capacity,
        SortField::Sustainability,
        SortField::Moq,
        SortField::LeadTime,
        SortField::YearEstablished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::City => "city",
            SortField::State => "state",
            SortField::Employees => "employees",
            SortField::Revenue => "revenue",
            SortField::Rating => "rating",
            SortField::Capacity => "capacity",
            SortField::Sustainability => "sustainability",
            SortField::Moq => "moq",
            SortField::LeadTime => "lead_time",
            SortField::YearEstablished => "year_established",
        }
    }

    /// Next field in display order, wrapping around (used by the browser)
    pub fn next(&self) -> SortField {
        let pos = SortField::ALL.iter().position(|f| f == self).unwrap_or(0);
        SortField::ALL[(pos + 1) % SortField::ALL.len()]
    }

    fn key<'a>(&self, record: &'a ManufacturerRecord) -> SortKey<'a> {
        match self {
            SortField::Name => SortKey::Text(&record.name),
            SortField::City => SortKey::Text(&record.location.city),
            SortField::State => SortKey::Text(&record.location.state),
            SortField::Employees => SortKey::Number(record.employee_count.map(f64::from)),
            SortField::Revenue => SortKey::Number(record.annual_revenue),
            SortField::Rating => SortKey::Number(record.rating),
            SortField::Capacity => SortKey::Number(record.current_capacity),
            SortField::Sustainability => SortKey::Number(record.sustainability_score.map(f64::from)),
            SortField::Moq => SortKey::Number(record.moq.map(f64::from)),
            SortField::LeadTime => SortKey::Number(record.lead_time_days.map(f64::from)),
            SortField::YearEstablished => SortKey::Number(record.year_established.map(f64::from)),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort field: {0}")]
pub struct UnknownSortField(pub String);

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        SortField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| UnknownSortField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(&self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfiguration {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortConfiguration {
    pub fn by(field: SortField, direction: SortDirection) -> Self {
        SortConfiguration {
            field: Some(field),
            direction,
        }
    }

    /// Column-header click: same field flips direction, a new field starts ascending
    pub fn select(&self, field: SortField) -> Self {
        match self.field {
            Some(current) if current == field => SortConfiguration::by(field, self.direction.toggle()),
            _ => SortConfiguration::by(field, SortDirection::Ascending),
        }
    }
}

enum SortKey<'a> {
    Text(&'a str),
    Number(Option<f64>),
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Compare two records under `config`; `Ordering::Equal` only for equal ids
pub fn compare(a: &ManufacturerRecord, b: &ManufacturerRecord, config: &SortConfiguration) -> Ordering {
    let Some(field) = config.field else {
        return Ordering::Equal;
    };

    let directed = |ord: Ordering| match config.direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    };

    let primary = match (field.key(a), field.key(b)) {
        (SortKey::Text(x), SortKey::Text(y)) => directed(compare_text(x, y)),
        (SortKey::Number(Some(x)), SortKey::Number(Some(y))) => directed(x.total_cmp(&y)),
        (SortKey::Number(Some(_)), SortKey::Number(None)) => Ordering::Less,
        (SortKey::Number(None), SortKey::Number(Some(_))) => Ordering::Greater,
        _ => Ordering::Equal,
    };

    primary.then_with(|| a.id.cmp(&b.id))
}

/// Order `records` by `config`; no field leaves input order untouched
pub fn sort_records<'a>(
    mut records: Vec<&'a ManufacturerRecord>,
    config: &SortConfiguration,
) -> Vec<&'a ManufacturerRecord> {
    if config.field.is_some() {
        records.sort_by(|a, b| compare(a, b, config));
    }
    records
}

// ============================================================================
// TESTS
// ============================================================================
