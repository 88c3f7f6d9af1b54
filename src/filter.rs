// 🔎 Filter-Predicate Evaluator
//
// Every predicate is skipped at its default value, so the default
// configuration passes every record. Active predicates are ANDed.

use crate::manufacturer::ManufacturerRecord;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// BUCKETS
// ============================================================================

/// Half-open interval `[lo, hi)`; `hi = None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: Option<f64>,
}

impl Interval {
    const fn new(lo: f64, hi: Option<f64>) -> Self {
        Interval { lo, hi }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && self.hi.map_or(true, |hi| value < hi)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} option: {value}")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

// Each bucket enum carries `All` plus labelled ranges. The macro keeps the
// label table, parsing and interval lookup in one place per bucket.
macro_rules! bucket {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $variant:ident => ($label:literal, $lo:expr, $hi:expr) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            #[default]
            All,
            $( $variant ),+
        }

        impl $name {
            pub const OPTIONS: &'static [$name] = &[$name::All, $( $name::$variant ),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $name::All => "all",
                    $( $name::$variant => $label ),+
                }
            }

            pub fn interval(&self) -> Option<Interval> {
                match self {
                    $name::All => None,
                    $( $name::$variant => Some(Interval::new($lo, $hi)) ),+
                }
            }

            /// `true` when the bucket constrains nothing
            pub fn is_all(&self) -> bool {
                *self == $name::All
            }

            /// Test a value against the bucket; missing values fail an active bucket
            pub fn admits(&self, value: Option<f64>) -> bool {
                match self.interval() {
                    None => true,
                    Some(interval) => value.map_or(false, |v| interval.contains(v)),
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                $name::OPTIONS
                    .iter()
                    .copied()
                    .find(|option| option.label() == wanted)
                    .ok_or_else(|| UnknownOption {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

bucket! {
    /// Employee headcount bands
    EmployeeBucket, "employee" {
        Small => ("1-49", 1.0, Some(50.0)),
        Medium => ("50-199", 50.0, Some(200.0)),
        Large => ("200-499", 200.0, Some(500.0)),
        Enterprise => ("500-999", 500.0, Some(1000.0)),
        Major => ("1000+", 1000.0, None),
    }
}

bucket! {
    /// Annual revenue bands (USD)
    RevenueBucket, "revenue" {
        UnderOneMillion => ("<1m", 0.0, Some(1_000_000.0)),
        OneToTen => ("1m-10m", 1_000_000.0, Some(10_000_000.0)),
        TenToFifty => ("10m-50m", 10_000_000.0, Some(50_000_000.0)),
        FiftyToHundred => ("50m-100m", 50_000_000.0, Some(100_000_000.0)),
        OverHundred => ("100m+", 100_000_000.0, None),
    }
}

bucket! {
    /// Current capacity utilisation bands (percent)
    CapacityBucket, "capacity" {
        Low => ("<50", 0.0, Some(50.0)),
        Moderate => ("50-75", 50.0, Some(75.0)),
        High => ("75-90", 75.0, Some(90.0)),
        NearFull => ("90+", 90.0, None),
    }
}

bucket! {
    /// Minimum rating
    RatingFloor, "rating" {
        ThreePlus => ("3.0+", 3.0, None),
        ThreeHalfPlus => ("3.5+", 3.5, None),
        FourPlus => ("4.0+", 4.0, None),
        FourHalfPlus => ("4.5+", 4.5, None),
    }
}

bucket! {
    /// Years since establishment
    AgeBucket, "established" {
        UnderFive => ("<5", 0.0, Some(5.0)),
        FiveToTen => ("5-10", 5.0, Some(10.0)),
        TenToTwentyFive => ("10-25", 10.0, Some(25.0)),
        TwentyFiveToFifty => ("25-50", 25.0, Some(50.0)),
        OverFifty => ("50+", 50.0, None),
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfiguration {
    pub search: String,
    pub capabilities: BTreeSet<String>,
    pub materials: BTreeSet<String>,
    pub certifications: BTreeSet<String>,
    pub states: BTreeSet<String>,
    pub employees: EmployeeBucket,
    pub revenue: RevenueBucket,
    pub capacity: CapacityBucket,
    pub rating: RatingFloor,
    pub established: AgeBucket,

    /// Tri-state: `None` = don't care
    pub diversity: Option<bool>,

    /// 0 = no constraint
    pub min_sustainability: u8,

    /// Year against which establishment age is measured
    pub reference_year: i32,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        FilterConfiguration::as_of(Utc::now().year())
    }
}

impl FilterConfiguration {
    /// Default configuration with an explicit reference year
    pub fn as_of(reference_year: i32) -> Self {
        FilterConfiguration {
            search: String::new(),
            capabilities: BTreeSet::new(),
            materials: BTreeSet::new(),
            certifications: BTreeSet::new(),
            states: BTreeSet::new(),
            employees: EmployeeBucket::All,
            revenue: RevenueBucket::All,
            capacity: CapacityBucket::All,
            rating: RatingFloor::All,
            established: AgeBucket::All,
            diversity: None,
            min_sustainability: 0,
            reference_year,
        }
    }

    /// Number of predicates currently in force
    pub fn active_count(&self) -> usize {
        [
            !self.search.trim().is_empty(),
            !self.capabilities.is_empty(),
            !self.materials.is_empty(),
            !self.certifications.is_empty(),
            !self.states.is_empty(),
            !self.employees.is_all(),
            !self.revenue.is_all(),
            !self.capacity.is_all(),
            !self.rating.is_all(),
            !self.established.is_all(),
            self.diversity.is_some(),
            self.min_sustainability > 0,
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    pub fn is_default(&self) -> bool {
        self.active_count() == 0
    }

    /// Evaluate every active predicate against one record
    pub fn matches(&self, record: &ManufacturerRecord) -> bool {
        let search = self.search.trim();
        if !search.is_empty() && !record.search_text().contains(&search.to_lowercase()) {
            return false;
        }

        if !overlaps(&record.capabilities, &self.capabilities)
            || !overlaps(&record.materials, &self.materials)
            || !overlaps(&record.certifications, &self.certifications)
            || !overlaps(std::slice::from_ref(&record.location.state), &self.states)
        {
            return false;
        }

        if !self.employees.admits(record.employee_count.map(f64::from))
            || !self.revenue.admits(record.annual_revenue)
            || !self.capacity.admits(record.current_capacity)
            || !self.rating.admits(record.rating)
            || !self
                .established
                .admits(record.age_in(self.reference_year).map(f64::from))
        {
            return false;
        }

        if let Some(wanted) = self.diversity {
            if record.diversity_certified != Some(wanted) {
                return false;
            }
        }

        if self.min_sustainability > 0 {
            match record.sustainability_score {
                Some(score) if score >= self.min_sustainability => {}
                _ => return false,
            }
        }

        true
    }

    /// Short human-readable list of active predicates
    pub fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if !self.search.trim().is_empty() {
            parts.push(format!("search \"{}\"", self.search.trim()));
        }
        for (name, set) in [
            ("capabilities", &self.capabilities),
            ("materials", &self.materials),
            ("certifications", &self.certifications),
            ("states", &self.states),
        ] {
            if !set.is_empty() {
                let values: Vec<&str> = set.iter().map(String::as_str).collect();
                parts.push(format!("{}: {}", name, values.join(", ")));
            }
        }
        if !self.employees.is_all() {
            parts.push(format!("employees {}", self.employees));
        }
        if !self.revenue.is_all() {
            parts.push(format!("revenue {}", self.revenue));
        }
        if !self.capacity.is_all() {
            parts.push(format!("capacity {}", self.capacity));
        }
        if !self.rating.is_all() {
            parts.push(format!("rating {}", self.rating));
        }
        if !self.established.is_all() {
            parts.push(format!("established {} yrs", self.established));
        }
        if let Some(diverse) = self.diversity {
            parts.push(if diverse { "diverse".to_string() } else { "not diverse".to_string() });
        }
        if self.min_sustainability > 0 {
            parts.push(format!("sustainability >= {}", self.min_sustainability));
        }
        parts
    }
}

/// Any-overlap test, case-insensitive; an empty selection admits everything
fn overlaps(values: &[String], selected: &BTreeSet<String>) -> bool {
    selected.is_empty()
        || values
            .iter()
            .any(|value| selected.iter().any(|s| s.eq_ignore_ascii_case(value)))
}

/// Apply `config` to `records`, preserving input order
pub fn apply_filters<'a>(
    records: &'a [ManufacturerRecord],
    config: &FilterConfiguration,
) -> Vec<&'a ManufacturerRecord> {
    filter_refs(records.iter(), config)
}

/// Same as [`apply_filters`] over already-borrowed records
pub fn filter_refs<'a, I>(records: I, config: &FilterConfiguration) -> Vec<&'a ManufacturerRecord>
where
    I: IntoIterator<Item = &'a ManufacturerRecord>,
{
    records.into_iter().filter(|r| config.matches(r)).collect()
}

// ============================================================================
// TESTS
// ============================================================================
