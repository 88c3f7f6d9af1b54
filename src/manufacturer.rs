// 🏭 Manufacturer Entity - Fixed schema + ingestion boundary
//
// Raw rows (CSV or JSON) are loose: every column may be missing or blank.
// They are checked once here and turned into `ManufacturerRecord`, which the
// rest of the pipeline treats as immutable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// RECORD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,

    /// Two-letter state code, upper case
    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// One manufacturer in the directory.
///
/// Identity: `id` (unique and stable across reloads of the same catalogue).
/// Numeric attributes are optional; a predicate that needs a missing value
/// rejects the record instead of guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerRecord {
    // ========================================================================
    // IDENTITY
    // ========================================================================
    pub id: String,
    pub name: String,
    pub location: Location,

    /// Classification codes and keywords (NAICS codes, industry terms)
    #[serde(default)]
    pub classification: Vec<String>,

    // ========================================================================
    // NUMERIC ATTRIBUTES
    // ========================================================================
    #[serde(default)]
    pub employee_count: Option<u32>,

    /// Annual revenue in USD
    #[serde(default)]
    pub annual_revenue: Option<f64>,

    /// Current capacity utilisation, percent 0-100
    #[serde(default)]
    pub current_capacity: Option<f64>,

    /// Maximum sustainable capacity, percent 0-100
    #[serde(default)]
    pub max_capacity: Option<f64>,

    /// Average rating, 0.0 - 5.0
    #[serde(default)]
    pub rating: Option<f64>,

    /// Sustainability score, 0 - 100
    #[serde(default)]
    pub sustainability_score: Option<u8>,

    /// Minimum order quantity
    #[serde(default)]
    pub moq: Option<u32>,

    #[serde(default)]
    pub lead_time_days: Option<u32>,

    #[serde(default)]
    pub year_established: Option<i32>,

    #[serde(default)]
    pub diversity_certified: Option<bool>,

    // ========================================================================
    // SET-VALUED ATTRIBUTES (membership tested by overlap)
    // ========================================================================
    #[serde(default)]
    pub capabilities: Vec<String>,

    #[serde(default)]
    pub materials: Vec<String>,

    #[serde(default)]
    pub certifications: Vec<String>,
}

impl ManufacturerRecord {
    pub fn city(&self) -> &str {
        &self.location.city
    }

    pub fn state(&self) -> &str {
        &self.location.state
    }

    /// Lower-cased haystack used by free-text search
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.name, &self.location.city, &self.location.state];
        parts.extend(self.classification.iter().map(String::as_str));
        parts.extend(self.capabilities.iter().map(String::as_str));
        parts.extend(self.materials.iter().map(String::as_str));
        parts.extend(self.certifications.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }

    /// Years since establishment relative to `reference_year`
    pub fn age_in(&self, reference_year: i32) -> Option<i32> {
        self.year_established.map(|year| reference_year - year)
    }

    /// Remaining headroom between current and maximum capacity
    pub fn available_capacity(&self) -> Option<f64> {
        match (self.current_capacity, self.max_capacity) {
            (Some(current), Some(max)) => Some((max - current).max(0.0)),
            _ => None,
        }
    }
}

// ============================================================================
// INGESTION ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("record {record}: required field `{field}` is empty")]
    MissingField { record: String, field: &'static str },

    #[error("record {record}: `{field}` out of range: {value}")]
    OutOfRange {
        record: String,
        field: &'static str,
        value: String,
    },

    #[error("duplicate manufacturer id `{0}`")]
    DuplicateId(String),
}

// ============================================================================
// RAW INPUT
// ============================================================================

/// Loose input shape, one row of a catalogue file.
///
/// Accepts both the flat CSV row (`city`, `state`, `lat`, `lng`, lists as
/// `;`-separated strings) and the nested shape `ManufacturerRecord`
/// serialises to (`location { .. }`, lists as arrays).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManufacturer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub classification: Option<ListField>,
    #[serde(default)]
    pub employee_count: Option<u32>,
    #[serde(default)]
    pub annual_revenue: Option<f64>,
    #[serde(default)]
    pub current_capacity: Option<f64>,
    #[serde(default)]
    pub max_capacity: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub sustainability_score: Option<u8>,
    #[serde(default)]
    pub moq: Option<u32>,
    #[serde(default)]
    pub lead_time_days: Option<u32>,
    #[serde(default)]
    pub year_established: Option<i32>,
    #[serde(default)]
    pub diversity_certified: Option<bool>,
    #[serde(default)]
    pub capabilities: Option<ListField>,
    #[serde(default)]
    pub materials: Option<ListField>,
    #[serde(default)]
    pub certifications: Option<ListField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// A set-valued field: one `;`-delimited string or a list of members.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ListField {
    Joined(String),
    Members(Vec<String>),
}

impl ListField {
    /// Trimmed, non-blank members
    pub fn into_members(self) -> Vec<String> {
        match self {
            ListField::Joined(joined) => split_list(Some(&joined)),
            ListField::Members(members) => members
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }
}

impl From<&str> for ListField {
    fn from(joined: &str) -> Self {
        ListField::Joined(joined.to_string())
    }
}

/// One CSV row. List columns are read as plain strings so codes such as
/// `0420` keep their leading zeros.
#[derive(Debug, Default, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    #[serde(default)]
    classification: Option<String>,
    #[serde(default)]
    employee_count: Option<u32>,
    #[serde(default)]
    annual_revenue: Option<f64>,
    #[serde(default)]
    current_capacity: Option<f64>,
    #[serde(default)]
    max_capacity: Option<f64>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    sustainability_score: Option<u8>,
    #[serde(default)]
    moq: Option<u32>,
    #[serde(default)]
    lead_time_days: Option<u32>,
    #[serde(default)]
    year_established: Option<i32>,
    #[serde(default)]
    diversity_certified: Option<bool>,
    #[serde(default)]
    capabilities: Option<String>,
    #[serde(default)]
    materials: Option<String>,
    #[serde(default)]
    certifications: Option<String>,
}

impl From<CsvRow> for RawManufacturer {
    fn from(row: CsvRow) -> Self {
        RawManufacturer {
            id: row.id,
            name: row.name,
            location: None,
            city: row.city,
            state: row.state,
            lat: row.lat,
            lng: row.lng,
            classification: row.classification.map(ListField::Joined),
            employee_count: row.employee_count,
            annual_revenue: row.annual_revenue,
            current_capacity: row.current_capacity,
            max_capacity: row.max_capacity,
            rating: row.rating,
            sustainability_score: row.sustainability_score,
            moq: row.moq,
            lead_time_days: row.lead_time_days,
            year_established: row.year_established,
            diversity_certified: row.diversity_certified,
            capabilities: row.capabilities.map(ListField::Joined),
            materials: row.materials.map(ListField::Joined),
            certifications: row.certifications.map(ListField::Joined),
        }
    }
}

fn required(value: Option<String>, record: &str, field: &'static str) -> Result<String, IngestError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(IngestError::MissingField {
            record: record.to_string(),
            field,
        }),
    }
}

// NaN and infinities fall outside every range
fn check_range(
    value: Option<f64>,
    min: f64,
    max: f64,
    record: &str,
    field: &'static str,
) -> Result<Option<f64>, IngestError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(IngestError::OutOfRange {
            record: record.to_string(),
            field,
            value: v.to_string(),
        }),
        other => Ok(other),
    }
}

/// Split a `;`-delimited list, trimming members and dropping blanks
pub fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn members(field: Option<ListField>) -> Vec<String> {
    field.map(ListField::into_members).unwrap_or_default()
}

impl TryFrom<RawManufacturer> for ManufacturerRecord {
    type Error = IngestError;

    fn try_from(raw: RawManufacturer) -> Result<Self, Self::Error> {
        let id = required(raw.id, "<unknown>", "id")?;
        let name = required(raw.name, &id, "name")?;
        let nested = raw.location.unwrap_or_default();
        let city = required(nested.city.or(raw.city), &id, "city")?;
        let state = required(nested.state.or(raw.state), &id, "state")?.to_uppercase();

        let rating = check_range(raw.rating, 0.0, 5.0, &id, "rating")?;
        let current_capacity = check_range(raw.current_capacity, 0.0, 100.0, &id, "current_capacity")?;
        let max_capacity = check_range(raw.max_capacity, 0.0, 100.0, &id, "max_capacity")?;
        let annual_revenue = check_range(raw.annual_revenue, 0.0, f64::MAX, &id, "annual_revenue")?;
        check_range(
            raw.sustainability_score.map(f64::from),
            0.0,
            100.0,
            &id,
            "sustainability_score",
        )?;

        let (lat, lng) = match nested.coordinates {
            Some(c) => (Some(c.lat), Some(c.lng)),
            None => (raw.lat, raw.lng),
        };
        let lat = check_range(lat, -90.0, 90.0, &id, "lat")?;
        let lng = check_range(lng, -180.0, 180.0, &id, "lng")?;
        let coordinates = match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            (None, None) => None,
            (Some(_), None) => return Err(IngestError::MissingField { record: id, field: "lng" }),
            (None, Some(_)) => return Err(IngestError::MissingField { record: id, field: "lat" }),
        };

        Ok(ManufacturerRecord {
            name,
            location: Location {
                city,
                state,
                coordinates,
            },
            classification: members(raw.classification),
            employee_count: raw.employee_count,
            annual_revenue,
            current_capacity,
            max_capacity,
            rating,
            sustainability_score: raw.sustainability_score,
            moq: raw.moq,
            lead_time_days: raw.lead_time_days,
            year_established: raw.year_established,
            diversity_certified: raw.diversity_certified,
            capabilities: members(raw.capabilities),
            materials: members(raw.materials),
            certifications: members(raw.certifications),
            id,
        })
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// The full record collection in its original order.
#[derive(Debug, Clone, Default)]
pub struct ManufacturerCatalog {
    records: Vec<ManufacturerRecord>,
}

impl ManufacturerCatalog {
    /// Build a catalogue, rejecting duplicate ids
    pub fn new(records: Vec<ManufacturerRecord>) -> Result<Self, IngestError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(IngestError::DuplicateId(record.id.clone()));
            }
        }
        Ok(ManufacturerCatalog { records })
    }

    /// Catalogue pre-loaded with the mock seed data
    pub fn with_defaults() -> Self {
        ManufacturerCatalog {
            records: crate::seed::seed_manufacturers(),
        }
    }

    pub fn records(&self) -> &[ManufacturerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ManufacturerRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn states(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.location.state.clone()).collect()
    }

    pub fn capabilities(&self) -> BTreeSet<String> {
        self.records.iter().flat_map(|r| r.capabilities.iter().cloned()).collect()
    }

    pub fn materials(&self) -> BTreeSet<String> {
        self.records.iter().flat_map(|r| r.materials.iter().cloned()).collect()
    }

    pub fn certifications(&self) -> BTreeSet<String> {
        self.records.iter().flat_map(|r| r.certifications.iter().cloned()).collect()
    }
}

// ============================================================================
// LOADERS
// ============================================================================

fn into_catalog(raws: Vec<RawManufacturer>) -> Result<ManufacturerCatalog> {
    let records = raws
        .into_iter()
        .map(|raw| {
            ManufacturerRecord::try_from(raw).inspect_err(|e| {
                tracing::warn!(error = %e, "rejected manufacturer row");
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let catalog = ManufacturerCatalog::new(records)?;
    tracing::debug!(count = catalog.len(), "manufacturer catalogue loaded");
    Ok(catalog)
}

pub fn load_manufacturers_csv(csv_path: &Path) -> Result<ManufacturerCatalog> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open manufacturer CSV: {:?}", csv_path))?;

    let mut raws = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let row: CsvRow =
            result.with_context(|| format!("Failed to deserialize manufacturer row {}", line + 1))?;
        raws.push(RawManufacturer::from(row));
    }

    into_catalog(raws)
}

pub fn parse_manufacturers_json(content: &str) -> Result<ManufacturerCatalog> {
    let raws: Vec<RawManufacturer> =
        serde_json::from_str(content).context("Failed to parse manufacturer JSON")?;
    into_catalog(raws)
}

pub fn load_manufacturers_json(json_path: &Path) -> Result<ManufacturerCatalog> {
    let content = fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read manufacturer file: {:?}", json_path))?;
    parse_manufacturers_json(&content)
}

/// Pick a loader by file extension (`.json`, anything else is CSV)
pub fn load_catalog(path: &Path) -> Result<ManufacturerCatalog> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_manufacturers_json(path),
        _ => load_manufacturers_csv(path),
    }
}

// ============================================================================
// TESTS
// ============================================================================
