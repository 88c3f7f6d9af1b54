// ☑️ Selection Set - record ids marked for export
//
// Selection is independent of what is currently visible: filtering a
// selected record out of view does not deselect it.

use crate::manufacturer::ManufacturerRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How much of the visible page is selected (drives the header checkbox)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCoverage {
    None,
    Partial,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        SelectionSet::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn select(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    pub fn deselect(&mut self, id: &str) {
        self.ids.remove(id);
    }

    /// Flip membership of `id`; returns whether it is now selected
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn select_all_visible<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in visible {
            self.select(id);
        }
    }

    pub fn deselect_all_visible<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in visible {
            self.deselect(id);
        }
    }

    pub fn coverage<'a, I>(&self, visible: I) -> SelectionCoverage
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = 0;
        let mut selected = 0;
        for id in visible {
            seen += 1;
            if self.contains(id) {
                selected += 1;
            }
        }

        if seen == 0 || selected == 0 {
            SelectionCoverage::None
        } else if selected == seen {
            SelectionCoverage::All
        } else {
            SelectionCoverage::Partial
        }
    }

    /// Header checkbox: deselect the page if it is fully selected, else select it
    pub fn toggle_all_visible(&mut self, visible: &[&str]) {
        if self.coverage(visible.iter().copied()) == SelectionCoverage::All {
            self.deselect_all_visible(visible.iter().copied());
        } else {
            self.select_all_visible(visible.iter().copied());
        }
    }

    /// Selected records in catalogue order
    pub fn selected_records<'a>(&self, records: &'a [ManufacturerRecord]) -> Vec<&'a ManufacturerRecord> {
        records.iter().filter(|r| self.contains(&r.id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_manufacturers;

    #[test]
    fn test_toggle_round_trip() {
        let mut selection = SelectionSet::new();
        selection.select("a");
        let before = selection.clone();

        assert!(selection.toggle("b"));
        assert!(!selection.toggle("b"));
        assert_eq!(selection, before);
    }

    #[test]
    fn test_toggle_all_visible_is_tri_state() {
        let mut selection = SelectionSet::new();
        let page = ["a", "b", "c"];

        selection.select("a");
        assert_eq!(selection.coverage(page), SelectionCoverage::Partial);

        selection.toggle_all_visible(&page);
        assert_eq!(selection.coverage(page), SelectionCoverage::All);
        assert_eq!(selection.len(), 3);

        selection.toggle_all_visible(&page);
        assert_eq!(selection.coverage(page), SelectionCoverage::None);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_visible_keeps_other_pages() {
        let mut selection = SelectionSet::new();
        selection.select("off-page");

        selection.toggle_all_visible(&["a", "b"]);
        selection.toggle_all_visible(&["a", "b"]);

        assert!(selection.contains("off-page"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_empty_page_coverage() {
        let selection = SelectionSet::new();
        assert_eq!(selection.coverage(Vec::<&str>::new()), SelectionCoverage::None);
    }

    #[test]
    fn test_selected_records_in_catalogue_order() {
        let records = seed_manufacturers();
        let mut selection = SelectionSet::new();
        selection.select("mfg-009");
        selection.select("mfg-002");
        selection.select("not-in-catalogue");

        let picked: Vec<&str> = selection
            .selected_records(&records)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(picked, vec!["mfg-002", "mfg-009"]);
    }
}
