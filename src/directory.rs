// 🗂️ Directory Store - filter/sort/page/selection state as a reducer
//
// Data flows one way: catalogue → filtered → sorted → paged for display,
// and catalogue ∩ selection → CSV for export. The state here only holds
// configuration; rows are recomputed from the catalogue on every view.

use crate::export::{self, ExportError, ExportOptions};
use crate::filter::{
    AgeBucket, CapacityBucket, EmployeeBucket, FilterConfiguration, RatingFloor, RevenueBucket,
};
use crate::manufacturer::{ManufacturerCatalog, ManufacturerRecord};
use crate::pagination::{PageSlice, PaginationState};
use crate::selection::{SelectionCoverage, SelectionSet};
use crate::sort::{self, SortConfiguration, SortField};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryAction {
    SetSearch(String),
    ToggleCapability(String),
    ToggleMaterial(String),
    ToggleCertification(String),
    ToggleState(String),
    SetEmployees(EmployeeBucket),
    SetRevenue(RevenueBucket),
    SetCapacity(CapacityBucket),
    SetRating(RatingFloor),
    SetEstablished(AgeBucket),
    SetDiversity(Option<bool>),
    SetMinSustainability(u8),
    ReplaceFilters(FilterConfiguration),
    ClearFilters,
    SortBy(SortField),
    ReplaceSort(SortConfiguration),
    ClearSort,
    GoToPage(usize),
    NextPage { total_items: usize },
    PreviousPage,
    SetItemsPerPage(usize),
    ToggleSelect(String),
    ToggleSelectVisible(Vec<String>),
    ClearSelection,
    Reset,
}

impl DirectoryAction {
    /// Actions that change which records pass the filter
    pub fn changes_filters(&self) -> bool {
        matches!(
            self,
            DirectoryAction::SetSearch(_)
                | DirectoryAction::ToggleCapability(_)
                | DirectoryAction::ToggleMaterial(_)
                | DirectoryAction::ToggleCertification(_)
                | DirectoryAction::ToggleState(_)
                | DirectoryAction::SetEmployees(_)
                | DirectoryAction::SetRevenue(_)
                | DirectoryAction::SetCapacity(_)
                | DirectoryAction::SetRating(_)
                | DirectoryAction::SetEstablished(_)
                | DirectoryAction::SetDiversity(_)
                | DirectoryAction::SetMinSustainability(_)
                | DirectoryAction::ReplaceFilters(_)
                | DirectoryAction::ClearFilters
        )
    }
}

fn toggle_member(set: &mut BTreeSet<String>, value: String) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryState {
    pub filters: FilterConfiguration,
    pub sort: SortConfiguration,
    pub pagination: PaginationState,
    pub selection: SelectionSet,
}

impl Default for DirectoryState {
    fn default() -> Self {
        DirectoryState::new(PaginationState::default().items_per_page)
    }
}

/// Everything the table needs to render one screen
#[derive(Debug, Clone)]
pub struct DirectoryView<'a> {
    pub page: PageSlice<&'a ManufacturerRecord>,
    pub filtered_count: usize,
    pub total_count: usize,
    pub page_coverage: SelectionCoverage,
    pub selected_count: usize,
}

impl<'a> DirectoryView<'a> {
    pub fn rows(&self) -> &[&'a ManufacturerRecord] {
        &self.page.items
    }

    pub fn visible_ids(&self) -> Vec<String> {
        self.page.items.iter().map(|r| r.id.clone()).collect()
    }
}

impl DirectoryState {
    pub fn new(items_per_page: usize) -> Self {
        DirectoryState {
            filters: FilterConfiguration::default(),
            sort: SortConfiguration::default(),
            pagination: PaginationState::new(items_per_page),
            selection: SelectionSet::new(),
        }
    }

    /// Pure transition: `(state, action) -> state`
    pub fn reduce(mut self, action: DirectoryAction) -> Self {
        let resets_page = action.changes_filters();

        match action {
            DirectoryAction::SetSearch(search) => self.filters.search = search,
            DirectoryAction::ToggleCapability(v) => toggle_member(&mut self.filters.capabilities, v),
            DirectoryAction::ToggleMaterial(v) => toggle_member(&mut self.filters.materials, v),
            DirectoryAction::ToggleCertification(v) => toggle_member(&mut self.filters.certifications, v),
            DirectoryAction::ToggleState(v) => toggle_member(&mut self.filters.states, v.to_uppercase()),
            DirectoryAction::SetEmployees(b) => self.filters.employees = b,
            DirectoryAction::SetRevenue(b) => self.filters.revenue = b,
            DirectoryAction::SetCapacity(b) => self.filters.capacity = b,
            DirectoryAction::SetRating(b) => self.filters.rating = b,
            DirectoryAction::SetEstablished(b) => self.filters.established = b,
            DirectoryAction::SetDiversity(d) => self.filters.diversity = d,
            DirectoryAction::SetMinSustainability(min) => self.filters.min_sustainability = min.min(100),
            DirectoryAction::ReplaceFilters(filters) => self.filters = filters,
            DirectoryAction::ClearFilters => {
                self.filters = FilterConfiguration::as_of(self.filters.reference_year);
            }
            DirectoryAction::SortBy(field) => self.sort = self.sort.select(field),
            DirectoryAction::ReplaceSort(sort) => self.sort = sort,
            DirectoryAction::ClearSort => self.sort = SortConfiguration::default(),
            DirectoryAction::GoToPage(page) => self.pagination.go_to(page),
            DirectoryAction::NextPage { total_items } => self.pagination.next(total_items),
            DirectoryAction::PreviousPage => self.pagination.previous(),
            DirectoryAction::SetItemsPerPage(n) => self.pagination.set_items_per_page(n),
            DirectoryAction::ToggleSelect(id) => {
                self.selection.toggle(&id);
            }
            DirectoryAction::ToggleSelectVisible(ids) => {
                let visible: Vec<&str> = ids.iter().map(String::as_str).collect();
                self.selection.toggle_all_visible(&visible);
            }
            DirectoryAction::ClearSelection => self.selection.clear(),
            DirectoryAction::Reset => {
                let per_page = self.pagination.items_per_page;
                let year = self.filters.reference_year;
                self = DirectoryState::new(per_page);
                self.filters.reference_year = year;
            }
        }

        if resets_page {
            self.pagination.reset();
        }
        self
    }

    /// In-place form of [`DirectoryState::reduce`]
    pub fn dispatch(&mut self, action: DirectoryAction) {
        let state = std::mem::take(self);
        *self = state.reduce(action);
    }

    /// Filtered and sorted records (all pages)
    pub fn ordered<'a>(&self, catalog: &'a ManufacturerCatalog) -> Vec<&'a ManufacturerRecord> {
        let filtered = crate::filter::apply_filters(catalog.records(), &self.filters);
        sort::sort_records(filtered, &self.sort)
    }

    /// Run the pipeline and cut the current page.
    ///
    /// An out-of-range page is clamped to the last page here, so shrinking
    /// the result set never shows an empty table while results exist.
    pub fn view<'a>(&mut self, catalog: &'a ManufacturerCatalog) -> DirectoryView<'a> {
        let ordered = self.ordered(catalog);
        self.pagination.clamp_to(ordered.len());

        let page = self.pagination.slice(&ordered);
        let page_coverage = self.selection.coverage(page.items.iter().map(|r| r.id.as_str()));

        tracing::debug!(
            total = catalog.len(),
            filtered = ordered.len(),
            page = page.current_page,
            filters = self.filters.active_count(),
            "directory view recomputed"
        );

        DirectoryView {
            filtered_count: ordered.len(),
            total_count: catalog.len(),
            page_coverage,
            selected_count: self.selection.len(),
            page,
        }
    }

    /// CSV of every selected record, visible or not
    pub fn export_csv(&self, catalog: &ManufacturerCatalog, options: &ExportOptions) -> Result<String, ExportError> {
        let selected = self.selection.selected_records(catalog.records());
        export::to_csv_string(&selected, options)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortDirection;

    fn state() -> DirectoryState {
        let mut state = DirectoryState::new(5);
        state.filters.reference_year = 2025;
        state
    }

    #[test]
    fn test_default_view_first_page() {
        let catalog = ManufacturerCatalog::with_defaults();
        let mut state = state();
        let view = state.view(&catalog);

        assert_eq!(view.filtered_count, 12);
        assert_eq!(view.page.total_pages, 3);
        assert_eq!(view.rows().len(), 5);
        assert_eq!(view.rows()[0].id, "mfg-001");
    }

    #[test]
    fn test_filter_change_resets_page() {
        let state = state().reduce(DirectoryAction::GoToPage(3));
        assert_eq!(state.pagination.current_page, 3);

        let state = state.reduce(DirectoryAction::ToggleState("ca".to_string()));
        assert_eq!(state.pagination.current_page, 1);
        assert!(state.filters.states.contains("CA"));
    }

    #[test]
    fn test_every_filter_action_resets_page() {
        let actions = vec![
            DirectoryAction::SetSearch("steel".to_string()),
            DirectoryAction::ToggleCapability("Welding".to_string()),
            DirectoryAction::ToggleMaterial("Aluminum".to_string()),
            DirectoryAction::ToggleCertification("ISO 9001".to_string()),
            DirectoryAction::SetEmployees(EmployeeBucket::Medium),
            DirectoryAction::SetRevenue(RevenueBucket::TenToFifty),
            DirectoryAction::SetCapacity(CapacityBucket::High),
            DirectoryAction::SetRating(RatingFloor::FourPlus),
            DirectoryAction::SetEstablished(AgeBucket::OverFifty),
            DirectoryAction::SetDiversity(Some(true)),
            DirectoryAction::SetMinSustainability(40),
            DirectoryAction::ClearFilters,
        ];

        for action in actions {
            assert!(action.changes_filters(), "{:?}", action);
            let state = state().reduce(DirectoryAction::GoToPage(3)).reduce(action.clone());
            assert_eq!(state.pagination.current_page, 1, "{:?}", action);
        }
    }

    #[test]
    fn test_material_and_certification_toggles_update_filters() {
        let state = state()
            .reduce(DirectoryAction::ToggleMaterial("Titanium".to_string()))
            .reduce(DirectoryAction::ToggleCertification("AS9100".to_string()))
            .reduce(DirectoryAction::SetRevenue(RevenueBucket::TenToFifty));

        assert!(state.filters.materials.contains("Titanium"));
        assert!(state.filters.certifications.contains("AS9100"));
        assert_eq!(state.filters.revenue, RevenueBucket::TenToFifty);

        let state = state.reduce(DirectoryAction::ToggleMaterial("Titanium".to_string()));
        assert!(state.filters.materials.is_empty());
    }

    #[test]
    fn test_sort_does_not_reset_page() {
        let state = state()
            .reduce(DirectoryAction::GoToPage(2))
            .reduce(DirectoryAction::SortBy(SortField::Rating));
        assert_eq!(state.pagination.current_page, 2);
    }

    #[test]
    fn test_view_clamps_out_of_range_page() {
        let catalog = ManufacturerCatalog::with_defaults();
        let mut state = state().reduce(DirectoryAction::GoToPage(9));
        let view = state.view(&catalog);

        assert_eq!(view.page.current_page, 3);
        assert_eq!(view.rows().len(), 2);
        assert_eq!(state.pagination.current_page, 3);
    }

    #[test]
    fn test_selection_survives_filtering() {
        let catalog = ManufacturerCatalog::with_defaults();
        let mut state = state()
            .reduce(DirectoryAction::ToggleSelect("mfg-005".to_string()))
            .reduce(DirectoryAction::ToggleState("CA".to_string()));

        let view = state.view(&catalog);
        assert!(view.rows().iter().all(|r| r.id != "mfg-005"));
        assert_eq!(view.selected_count, 1);
        assert_eq!(view.page_coverage, SelectionCoverage::None);

        let csv = state.export_csv(&catalog, &ExportOptions::default()).unwrap();
        assert!(csv.contains("Buckeye Castings"));
    }

    #[test]
    fn test_toggle_visible_then_page_coverage() {
        let catalog = ManufacturerCatalog::with_defaults();
        let mut state = state();
        let ids = state.view(&catalog).visible_ids();

        state.dispatch(DirectoryAction::ToggleSelectVisible(ids.clone()));
        assert_eq!(state.view(&catalog).page_coverage, SelectionCoverage::All);

        state.dispatch(DirectoryAction::ToggleSelectVisible(ids));
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_sort_by_twice_flips_direction() {
        let catalog = ManufacturerCatalog::with_defaults();
        let mut state = state()
            .reduce(DirectoryAction::SortBy(SortField::Sustainability))
            .reduce(DirectoryAction::SortBy(SortField::Sustainability));

        assert_eq!(state.sort.direction, SortDirection::Descending);
        assert_eq!(state.view(&catalog).rows()[0].id, "mfg-009");
    }

    #[test]
    fn test_clear_filters_keeps_selection_and_sort() {
        let state = state()
            .reduce(DirectoryAction::SetSearch("steel".to_string()))
            .reduce(DirectoryAction::SortBy(SortField::Name))
            .reduce(DirectoryAction::ToggleSelect("mfg-001".to_string()))
            .reduce(DirectoryAction::ClearFilters);

        assert!(state.filters.is_default());
        assert_eq!(state.filters.reference_year, 2025);
        assert_eq!(state.sort.field, Some(SortField::Name));
        assert!(state.selection.contains("mfg-001"));
    }

    #[test]
    fn test_reset_clears_everything_but_page_size() {
        let state = state()
            .reduce(DirectoryAction::SetRating(RatingFloor::FourPlus))
            .reduce(DirectoryAction::ToggleSelect("mfg-001".to_string()))
            .reduce(DirectoryAction::Reset);

        assert!(state.filters.is_default());
        assert!(state.selection.is_empty());
        assert_eq!(state.pagination.items_per_page, 5);
    }

    #[test]
    fn test_export_requires_selection() {
        let catalog = ManufacturerCatalog::with_defaults();
        let err = state().export_csv(&catalog, &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::EmptySelection));
    }
}
