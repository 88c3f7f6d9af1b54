// End-to-end checks of the directory pipeline and the auth store:
// concrete scenarios plus property tests over generated catalogues.

use chrono::{DateTime, Duration, Utc};
use factory_link::{
    apply_filters, paginate, sort_records, to_csv_string, AgeBucket, AuthError, AuthStore, CapacityBucket,
    EmployeeBucket, ExportError, ExportOptions, FilterConfiguration, Location, ManufacturerRecord,
    RatingFloor, RegistrationRequest, RevenueBucket, SelectionSet, SortConfiguration, SortDirection, SortField,
    CSV_HEADER,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ============================================================================
// FIXTURES
// ============================================================================

const STATES: &[&str] = &["CA", "TX", "MI", "OH", "NY"];
const CAPABILITIES: &[&str] = &["Welding", "CNC Machining", "Assembly", "Stamping", "Molding"];
const MATERIALS: &[&str] = &["Aluminum", "Steel", "ABS", "Titanium"];
const CERTIFICATIONS: &[&str] = &["ISO 9001", "AS9100", "FSC", "IATF 16949"];
const SEARCHES: &[&str] = &["", "steel", "Manufacturer 1", "WELD", "springfield"];

fn record(id: usize, state: &str) -> ManufacturerRecord {
    ManufacturerRecord {
        id: format!("m-{:03}", id),
        name: format!("Manufacturer {}", id),
        location: Location {
            city: "Springfield".to_string(),
            state: state.to_string(),
            coordinates: None,
        },
        classification: vec!["332710".to_string()],
        employee_count: Some(10 * id as u32 + 5),
        annual_revenue: Some(250_000.0 * id as f64),
        current_capacity: Some((id * 7 % 100) as f64),
        max_capacity: Some(95.0),
        rating: Some((id % 6) as f64 * 0.9),
        sustainability_score: Some((id * 13 % 101) as u8),
        moq: Some(id as u32 * 10),
        lead_time_days: Some(id as u32 % 30 + 1),
        year_established: Some(1950 + id as i32),
        diversity_certified: Some(id % 3 == 0),
        capabilities: vec![CAPABILITIES[id % CAPABILITIES.len()].to_string()],
        materials: vec![MATERIALS[id % MATERIALS.len()].to_string()],
        certifications: vec!["ISO 9001".to_string()],
    }
}

fn ten_with_three_in_california() -> Vec<ManufacturerRecord> {
    let states = ["CA", "TX", "CA", "MI", "OH", "NY", "CA", "TX", "MI", "OH"];
    states.iter().enumerate().map(|(i, s)| record(i + 1, s)).collect()
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_735_689_600, 0).unwrap()
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn scenario_state_filter_finds_three_californians() {
    let records = ten_with_three_in_california();
    let mut config = FilterConfiguration::as_of(2025);
    config.states.insert("CA".to_string());

    let filtered = apply_filters(&records, &config);
    assert_eq!(filtered.len(), 3);
    assert!(filtered.iter().all(|r| r.location.state == "CA"));
}

#[test]
fn scenario_capability_filter_ignores_empty_materials() {
    let records = ten_with_three_in_california();
    let mut config = FilterConfiguration::as_of(2025);
    config.capabilities.insert("Welding".to_string());

    let filtered = apply_filters(&records, &config);
    let expected: Vec<&ManufacturerRecord> = records
        .iter()
        .filter(|r| r.capabilities.iter().any(|c| c == "Welding"))
        .collect();
    assert_eq!(filtered, expected);
    assert!(!filtered.is_empty());
}

#[test]
fn scenario_forty_items_paged_by_twenty_five() {
    let records: Vec<ManufacturerRecord> = (1..=40).map(|i| record(i, "CA")).collect();
    let refs: Vec<&ManufacturerRecord> = records.iter().collect();

    let first = paginate(&refs, 1, 25);
    let second = paginate(&refs, 2, 25);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items.len(), 25);
    assert_eq!(second.items.len(), 15);
}

#[test]
fn scenario_export_two_selected_records() {
    let mut records = ten_with_three_in_california();
    records[0].name = "Acme, Inc.".to_string();

    let mut selection = SelectionSet::new();
    selection.select(&records[0].id);
    selection.select(&records[4].id);

    let selected = selection.selected_records(&records);
    let csv = to_csv_string(&selected, &ExportOptions::default()).unwrap();

    assert_eq!(csv.lines().count(), 3);
    assert!(csv.lines().nth(1).unwrap().starts_with("\"Acme, Inc.\","));
}

#[test]
fn scenario_export_with_nothing_selected_fails() {
    let records = ten_with_three_in_california();
    let selection = SelectionSet::new();

    let err = to_csv_string(&selection.selected_records(&records), &ExportOptions::default()).unwrap_err();
    assert!(matches!(err, ExportError::EmptySelection));
}

fn registration(email: &str) -> RegistrationRequest {
    RegistrationRequest {
        name: "Sam Procurement".to_string(),
        company: "Widget Works".to_string(),
        email: email.to_string(),
        password: "Str0ng!Pass".to_string(),
        confirm_password: "Str0ng!Pass".to_string(),
    }
}

#[test]
fn scenario_registration_with_deleted_email_is_blocked() {
    let mut store = AuthStore::with_defaults();
    let deleted = store.deleted_accounts()[0].email.clone();

    let err = store.register(registration(&deleted), now()).unwrap_err();

    assert!(matches!(err, AuthError::AccountDeleted { .. }));
    assert_eq!(store.registration_attempts().len(), 1);
    assert!(store.registration_attempts()[0].blocked);
    assert!(store.registered_emails().is_empty());
}

#[test]
fn scenario_sixth_login_is_locked_even_with_right_password() {
    let mut store = AuthStore::with_defaults();
    store.register(registration("sam@widgets.io"), now()).unwrap();
    store.logout(now()).unwrap();

    for minute in 0..5 {
        let err = store
            .login("sam@widgets.io", "Wrong!Pass1", now() + Duration::minutes(minute * 2))
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials { .. }));
    }

    let err = store
        .login("sam@widgets.io", "Str0ng!Pass", now() + Duration::minutes(9))
        .unwrap_err();
    // Locked at minute 8 for 15 minutes
    assert_eq!(err, AuthError::Locked { remaining_minutes: 14 });
    assert!(store.current_user().is_none());
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn arb_record(id: usize) -> impl Strategy<Value = ManufacturerRecord> {
    (
        0..STATES.len(),
        proptest::sample::subsequence(CAPABILITIES.to_vec(), 0..=3),
        proptest::sample::subsequence(MATERIALS.to_vec(), 0..=2),
        proptest::sample::subsequence(CERTIFICATIONS.to_vec(), 0..=2),
        proptest::option::of(1u32..3000),
        proptest::option::of(0.0f64..=5.0),
        proptest::option::of(0.0f64..=100.0),
        proptest::option::of(any::<bool>()),
        "[A-Za-z ,\"]{1,20}",
    )
        .prop_map(move |(state, caps, mats, certs, employees, rating, capacity, diverse, name)| {
            let mut r = record(id, STATES[state]);
            r.name = name;
            r.capabilities = caps.into_iter().map(String::from).collect();
            r.materials = mats.into_iter().map(String::from).collect();
            r.certifications = certs.into_iter().map(String::from).collect();
            r.employee_count = employees;
            r.rating = rating;
            r.current_capacity = capacity;
            r.diversity_certified = diverse;
            r
        })
}

fn arb_records() -> impl Strategy<Value = Vec<ManufacturerRecord>> {
    (0usize..40).prop_flat_map(|n| (0..n).map(arb_record).collect::<Vec<_>>())
}

fn arb_filters() -> impl Strategy<Value = FilterConfiguration> {
    let sets = (
        proptest::sample::select(SEARCHES.to_vec()),
        proptest::sample::subsequence(STATES.to_vec(), 0..=2),
        proptest::sample::subsequence(CAPABILITIES.to_vec(), 0..=2),
        proptest::sample::subsequence(MATERIALS.to_vec(), 0..=2),
        proptest::sample::subsequence(CERTIFICATIONS.to_vec(), 0..=2),
    );
    let ranges = (
        proptest::sample::select(EmployeeBucket::OPTIONS.to_vec()),
        proptest::sample::select(RevenueBucket::OPTIONS.to_vec()),
        proptest::sample::select(CapacityBucket::OPTIONS.to_vec()),
        proptest::sample::select(RatingFloor::OPTIONS.to_vec()),
        proptest::sample::select(AgeBucket::OPTIONS.to_vec()),
        proptest::option::of(any::<bool>()),
        prop_oneof![Just(0u8), 1u8..=100],
    );

    (sets, ranges).prop_map(
        |(
            (search, states, caps, mats, certs),
            (employees, revenue, capacity, rating, established, diversity, min_sustainability),
        )| {
            let to_set = |values: Vec<&str>| -> BTreeSet<String> { values.into_iter().map(String::from).collect() };
            let mut config = FilterConfiguration::as_of(2025);
            config.search = search.to_string();
            config.states = to_set(states);
            config.capabilities = to_set(caps);
            config.materials = to_set(mats);
            config.certifications = to_set(certs);
            config.employees = employees;
            config.revenue = revenue;
            config.capacity = capacity;
            config.rating = rating;
            config.established = established;
            config.diversity = diversity;
            config.min_sustainability = min_sustainability;
            config
        },
    )
}

fn overlaps(values: &[String], wanted: &BTreeSet<String>) -> bool {
    wanted.is_empty() || values.iter().any(|v| wanted.iter().any(|w| w.eq_ignore_ascii_case(v)))
}

proptest! {
    #[test]
    fn prop_default_filter_is_identity(records in arb_records()) {
        let filtered = apply_filters(&records, &FilterConfiguration::as_of(2025));
        let all: Vec<&ManufacturerRecord> = records.iter().collect();
        prop_assert_eq!(filtered, all);
    }

    #[test]
    fn prop_filter_is_idempotent(records in arb_records(), config in arb_filters()) {
        let once: Vec<ManufacturerRecord> = apply_filters(&records, &config).into_iter().cloned().collect();
        let twice: Vec<ManufacturerRecord> = apply_filters(&once, &config).into_iter().cloned().collect();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_multi_select_results_overlap(records in arb_records(), config in arb_filters()) {
        for r in apply_filters(&records, &config) {
            prop_assert!(overlaps(&r.capabilities, &config.capabilities));
            prop_assert!(overlaps(&r.materials, &config.materials));
            prop_assert!(overlaps(&r.certifications, &config.certifications));
            prop_assert!(overlaps(std::slice::from_ref(&r.location.state), &config.states));
            prop_assert!(config.search.is_empty() || r.search_text().contains(&config.search.to_lowercase()));
            prop_assert!(config.min_sustainability == 0
                || r.sustainability_score.is_some_and(|s| s >= config.min_sustainability));
        }
    }

    #[test]
    fn prop_descending_is_reverse_of_ascending(records in arb_records()) {
        // Revenue is unique per id in the fixture
        let asc = sort_records(records.iter().collect(), &SortConfiguration::by(SortField::Revenue, SortDirection::Ascending));
        let mut desc = sort_records(records.iter().collect(), &SortConfiguration::by(SortField::Revenue, SortDirection::Descending));
        desc.reverse();
        prop_assert_eq!(asc, desc);
    }

    #[test]
    fn prop_pages_cover_every_record_once(records in arb_records(), per_page in 1usize..12) {
        let refs: Vec<&ManufacturerRecord> = records.iter().collect();
        let pages = paginate(&refs, 1, per_page).total_pages;

        let mut joined = Vec::new();
        for page in 1..=pages {
            joined.extend(paginate(&refs, page, per_page).items);
        }
        prop_assert_eq!(joined, refs);
    }

    #[test]
    fn prop_toggle_twice_restores_selection(
        initial in proptest::collection::btree_set("[a-z]{1,4}", 0..6),
        id in "[a-z]{1,4}",
    ) {
        let mut selection = SelectionSet::new();
        for existing in &initial {
            selection.select(existing);
        }
        let before = selection.clone();

        selection.toggle(&id);
        selection.toggle(&id);
        prop_assert_eq!(selection, before);
    }

    #[test]
    fn prop_csv_round_trips(records in arb_records()) {
        prop_assume!(!records.is_empty());
        let refs: Vec<&ManufacturerRecord> = records.iter().collect();
        let csv = to_csv_string(&refs, &ExportOptions::default()).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        prop_assert_eq!(header, CSV_HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>());

        let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(rows.len(), records.len());
        for (row, record) in rows.iter().zip(&records) {
            prop_assert_eq!(&row[0], record.name.as_str());
            prop_assert_eq!(&row[2], record.location.state.as_str());
            let capabilities = record.capabilities.join("; ");
            prop_assert_eq!(&row[12], capabilities.as_str());
            let employees = record.employee_count.map(|n| n.to_string()).unwrap_or_default();
            prop_assert_eq!(&row[4], employees.as_str());
        }
    }
}

#[test]
fn selection_survives_refiltering() {
    let records = ten_with_three_in_california();
    let mut selection = SelectionSet::new();
    selection.select(&records[1].id);

    let mut config = FilterConfiguration::as_of(2025);
    config.states = BTreeSet::from(["CA".to_string()]);
    let visible = apply_filters(&records, &config);
    assert!(visible.iter().all(|r| r.id != records[1].id));

    assert!(selection.contains(&records[1].id));
    assert_eq!(selection.selected_records(&records).len(), 1);
}
