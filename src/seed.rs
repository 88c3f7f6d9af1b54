// 🌱 Seed Data - Mock catalogue, deleted-account list and inbox history
// Used when no data file is configured, and by the tests.

use crate::auth::DeletedAccount;
use crate::inbox::{Inbox, Message, QuoteRequest, QuoteStatus};
use crate::manufacturer::{Coordinates, Location, ManufacturerRecord};
use chrono::{DateTime, Utc};

struct Seed {
    id: &'static str,
    name: &'static str,
    city: &'static str,
    state: &'static str,
    coords: (f64, f64),
    classification: &'static [&'static str],
    employees: u32,
    revenue: f64,
    capacity: (f64, f64),
    rating: f64,
    sustainability: u8,
    moq: u32,
    lead_time: u32,
    established: i32,
    diverse: bool,
    capabilities: &'static [&'static str],
    materials: &'static [&'static str],
    certifications: &'static [&'static str],
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl From<&Seed> for ManufacturerRecord {
    fn from(seed: &Seed) -> Self {
        ManufacturerRecord {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            location: Location {
                city: seed.city.to_string(),
                state: seed.state.to_string(),
                coordinates: Some(Coordinates {
                    lat: seed.coords.0,
                    lng: seed.coords.1,
                }),
            },
            classification: strings(seed.classification),
            employee_count: Some(seed.employees),
            annual_revenue: Some(seed.revenue),
            current_capacity: Some(seed.capacity.0),
            max_capacity: Some(seed.capacity.1),
            rating: Some(seed.rating),
            sustainability_score: Some(seed.sustainability),
            moq: Some(seed.moq),
            lead_time_days: Some(seed.lead_time),
            year_established: Some(seed.established),
            diversity_certified: Some(seed.diverse),
            capabilities: strings(seed.capabilities),
            materials: strings(seed.materials),
            certifications: strings(seed.certifications),
        }
    }
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "mfg-001",
        name: "Precision Parts Co.",
        city: "San Jose",
        state: "CA",
        coords: (37.3382, -121.8863),
        classification: &["332710", "Machine Shops"],
        employees: 85,
        revenue: 12_500_000.0,
        capacity: (72.0, 95.0),
        rating: 4.7,
        sustainability: 82,
        moq: 100,
        lead_time: 14,
        established: 1998,
        diverse: true,
        capabilities: &["CNC Machining", "Prototyping", "Assembly"],
        materials: &["Aluminum", "Stainless Steel", "Titanium"],
        certifications: &["ISO 9001", "AS9100"],
    },
    Seed {
        id: "mfg-002",
        name: "Lone Star Fabrication",
        city: "Houston",
        state: "TX",
        coords: (29.7604, -95.3698),
        classification: &["332312", "Structural Steel"],
        employees: 320,
        revenue: 48_000_000.0,
        capacity: (88.0, 95.0),
        rating: 4.3,
        sustainability: 61,
        moq: 50,
        lead_time: 21,
        established: 1976,
        diverse: false,
        capabilities: &["Welding", "Sheet Metal", "Powder Coating"],
        materials: &["Carbon Steel", "Stainless Steel"],
        certifications: &["ISO 9001", "AWS D1.1"],
    },
    Seed {
        id: "mfg-003",
        name: "Great Lakes Molding",
        city: "Grand Rapids",
        state: "MI",
        coords: (42.9634, -85.6681),
        classification: &["326199", "Plastics Products"],
        employees: 140,
        revenue: 22_000_000.0,
        capacity: (55.0, 90.0),
        rating: 4.1,
        sustainability: 74,
        moq: 1000,
        lead_time: 28,
        established: 2005,
        diverse: false,
        capabilities: &["Injection Molding", "Assembly", "Tooling"],
        materials: &["ABS", "Polycarbonate", "Nylon"],
        certifications: &["ISO 9001", "IATF 16949"],
    },
    Seed {
        id: "mfg-004",
        name: "Pacific Circuit Works",
        city: "Irvine",
        state: "CA",
        coords: (33.6846, -117.8265),
        classification: &["334412", "Printed Circuit Boards"],
        employees: 45,
        revenue: 6_800_000.0,
        capacity: (40.0, 90.0),
        rating: 3.9,
        sustainability: 68,
        moq: 25,
        lead_time: 10,
        established: 2016,
        diverse: true,
        capabilities: &["PCB Assembly", "Prototyping", "Testing"],
        materials: &["FR-4", "Copper"],
        certifications: &["ISO 9001", "IPC-A-610"],
    },
    Seed {
        id: "mfg-005",
        name: "Buckeye Castings",
        city: "Dayton",
        state: "OH",
        coords: (39.7589, -84.1916),
        classification: &["331511", "Iron Foundries"],
        employees: 610,
        revenue: 95_000_000.0,
        capacity: (91.0, 98.0),
        rating: 3.6,
        sustainability: 45,
        moq: 500,
        lead_time: 45,
        established: 1952,
        diverse: false,
        capabilities: &["Sand Casting", "Machining", "Heat Treating"],
        materials: &["Gray Iron", "Ductile Iron"],
        certifications: &["ISO 9001"],
    },
    Seed {
        id: "mfg-006",
        name: "Golden State Textiles",
        city: "Los Angeles",
        state: "CA",
        coords: (34.0522, -118.2437),
        classification: &["313210", "Fabric Mills"],
        employees: 210,
        revenue: 31_000_000.0,
        capacity: (63.0, 85.0),
        rating: 4.4,
        sustainability: 90,
        moq: 300,
        lead_time: 30,
        established: 2009,
        diverse: true,
        capabilities: &["Cut and Sew", "Dyeing", "Printing"],
        materials: &["Cotton", "Recycled Polyester"],
        certifications: &["OEKO-TEX", "GOTS"],
    },
    Seed {
        id: "mfg-007",
        name: "Motor City Stamping",
        city: "Detroit",
        state: "MI",
        coords: (42.3314, -83.0458),
        classification: &["336370", "Motor Vehicle Metal Stamping"],
        employees: 1450,
        revenue: 210_000_000.0,
        capacity: (82.0, 95.0),
        rating: 4.0,
        sustainability: 58,
        moq: 5000,
        lead_time: 35,
        established: 1948,
        diverse: false,
        capabilities: &["Stamping", "Welding", "Assembly"],
        materials: &["Carbon Steel", "Aluminum"],
        certifications: &["IATF 16949", "ISO 14001"],
    },
    Seed {
        id: "mfg-008",
        name: "Alamo Electronics Assembly",
        city: "San Antonio",
        state: "TX",
        coords: (29.4241, -98.4936),
        classification: &["334418", "Electronic Assembly"],
        employees: 95,
        revenue: 9_400_000.0,
        capacity: (48.0, 92.0),
        rating: 4.6,
        sustainability: 77,
        moq: 50,
        lead_time: 12,
        established: 2012,
        diverse: true,
        capabilities: &["PCB Assembly", "Box Build", "Testing"],
        materials: &["FR-4", "Copper", "ABS"],
        certifications: &["ISO 9001", "ISO 13485"],
    },
    Seed {
        id: "mfg-009",
        name: "Cascade Wood Products",
        city: "Portland",
        state: "OR",
        coords: (45.5152, -122.6784),
        classification: &["321918", "Millwork"],
        employees: 30,
        revenue: 2_100_000.0,
        capacity: (35.0, 80.0),
        rating: 4.8,
        sustainability: 95,
        moq: 10,
        lead_time: 21,
        established: 2019,
        diverse: false,
        capabilities: &["CNC Routing", "Finishing", "Assembly"],
        materials: &["Hardwood", "Plywood"],
        certifications: &["FSC"],
    },
    Seed {
        id: "mfg-010",
        name: "Keystone Precision Machining",
        city: "Pittsburgh",
        state: "PA",
        coords: (40.4406, -79.9959),
        classification: &["332710", "Machine Shops"],
        employees: 175,
        revenue: 27_500_000.0,
        capacity: (78.0, 92.0),
        rating: 3.4,
        sustainability: 52,
        moq: 200,
        lead_time: 25,
        established: 1989,
        diverse: false,
        capabilities: &["CNC Machining", "Grinding", "Welding"],
        materials: &["Tool Steel", "Stainless Steel", "Titanium"],
        certifications: &["ISO 9001", "AS9100", "ITAR"],
    },
    Seed {
        id: "mfg-011",
        name: "Buckeye Packaging Solutions",
        city: "Columbus",
        state: "OH",
        coords: (39.9612, -82.9988),
        classification: &["322211", "Corrugated Packaging"],
        employees: 12,
        revenue: 850_000.0,
        capacity: (22.0, 75.0),
        rating: 3.1,
        sustainability: 88,
        moq: 2500,
        lead_time: 7,
        established: 2022,
        diverse: true,
        capabilities: &["Die Cutting", "Printing"],
        materials: &["Corrugated Board", "Kraft Paper"],
        certifications: &["FSC", "SFI"],
    },
    Seed {
        id: "mfg-012",
        name: "Rocky Mountain Composites",
        city: "Denver",
        state: "CO",
        coords: (39.7392, -104.9903),
        classification: &["326199", "Composite Parts"],
        employees: 260,
        revenue: 64_000_000.0,
        capacity: (69.0, 90.0),
        rating: 4.5,
        sustainability: 71,
        moq: 20,
        lead_time: 40,
        established: 2001,
        diverse: false,
        capabilities: &["Layup", "Autoclave Curing", "CNC Machining"],
        materials: &["Carbon Fiber", "Fiberglass", "Epoxy"],
        certifications: &["AS9100", "NADCAP"],
    },
];

/// The mock manufacturer catalogue, in display order
pub fn seed_manufacturers() -> Vec<ManufacturerRecord> {
    SEEDS.iter().map(ManufacturerRecord::from).collect()
}

fn at(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
}

/// Accounts that were closed before this session started
pub fn seed_deleted_accounts() -> Vec<DeletedAccount> {
    vec![
        DeletedAccount {
            email: "former.buyer@example.com".to_string(),
            deleted_at: at(1_704_067_200),
            reason: Some("No longer sourcing".to_string()),
        },
        DeletedAccount {
            email: "closed@sample-industries.com".to_string(),
            deleted_at: at(1_711_929_600),
            reason: None,
        },
    ]
}

fn quote(
    id: &str,
    manufacturer_id: &str,
    product: &str,
    quantity: u32,
    quoted_price: Option<f64>,
    status: QuoteStatus,
    created: i64,
) -> QuoteRequest {
    QuoteRequest {
        id: id.to_string(),
        manufacturer_id: manufacturer_id.to_string(),
        product: product.to_string(),
        quantity,
        target_price: None,
        needed_by: None,
        quoted_price,
        status,
        created_at: at(created),
        updated_at: at(created + 86_400),
    }
}

fn message(id: &str, manufacturer_id: &str, body: &str, from_user: bool, read: bool, sent: i64) -> Message {
    Message {
        id: id.to_string(),
        manufacturer_id: manufacturer_id.to_string(),
        body: body.to_string(),
        from_user,
        at: at(sent),
        read,
    }
}

/// Mock quote and message history: one quote awaiting the buyer, one
/// pending, one accepted, and two unread manufacturer replies.
pub fn seed_inbox() -> Inbox {
    Inbox::with_history(
        vec![
            quote("quote-001", "mfg-001", "Titanium mounting brackets", 500, Some(18.5), QuoteStatus::Responded, 1_733_011_200),
            quote("quote-002", "mfg-007", "Welded steel frames", 120, None, QuoteStatus::Pending, 1_733_616_000),
            quote("quote-003", "mfg-009", "Oak cabinet panels", 40, Some(85.0), QuoteStatus::Accepted, 1_730_419_200),
        ],
        vec![
            message("msg-001", "mfg-001", "Can you quote 500 brackets in Ti-6Al-4V?", true, true, 1_733_011_200),
            message("msg-002", "mfg-001", "Quote sent. Lead time is 21 days from PO.", false, false, 1_733_097_600),
            message("msg-003", "mfg-007", "We can start your frames early next month.", false, false, 1_733_702_400),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manufacturer::ManufacturerCatalog;

    #[test]
    fn test_seed_ids_are_unique() {
        let catalog = ManufacturerCatalog::new(seed_manufacturers());
        assert!(catalog.is_ok());
        assert_eq!(catalog.unwrap().len(), 12);
    }

    #[test]
    fn test_seed_has_three_california_records() {
        let ca = seed_manufacturers()
            .into_iter()
            .filter(|m| m.location.state == "CA")
            .count();
        assert_eq!(ca, 3);
    }

    #[test]
    fn test_seed_inbox_counters() {
        let inbox = seed_inbox();
        let counters = inbox.counters();

        assert_eq!(counters.unread_messages, 2);
        assert_eq!(counters.pending_quotes, 1);
        assert_eq!(counters.responded_quotes, 1);
        assert_eq!(counters.total(), 3);
        assert_eq!(inbox.thread("mfg-001").len(), 2);
    }
}
