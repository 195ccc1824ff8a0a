//! Query controller: owns filter and page state and keeps the filtered view in
//! sync with them.

use std::num::NonZeroUsize;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::favorites::FavoritesRegistry;
use crate::pager::{self, PageView};
use crate::predicate::{self, Category, FilterState, Formation};
use crate::store::{Dataset, Row};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Everything presentation needs to render one frame.
pub struct QueryView<'a> {
    pub columns: &'a [String],
    pub page: Vec<&'a Row>,
    pub page_index: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub favorites: &'a [Row],
    pub filter_state: &'a FilterState,
}

pub struct QueryController {
    dataset: Dataset,
    filters: FilterState,
    rows: Vec<usize>, // Dataset indices of the rows passing the current filters
    current_page: usize,
    page_size: NonZeroUsize,
    favorites: FavoritesRegistry,
}

impl QueryController {
    pub fn new(filters: FilterState, page_size: NonZeroUsize, favorites: FavoritesRegistry) -> Self {
        QueryController {
            dataset: Dataset::empty(),
            filters,
            rows: Vec::new(),
            current_page: 1,
            page_size,
            favorites,
        }
    }

    /// Replaces the dataset and recomputes the view from page 1.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.refilter();
    }

    /// False until a dataset with at least one row has been set.
    pub fn is_loaded(&self) -> bool {
        !self.dataset.is_empty()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn columns(&self) -> &[String] {
        self.dataset.columns()
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_text_filter(&mut self, column: &str, value: &str) {
        if self.filters.set_text(column, value) {
            self.refilter();
        } else {
            warn!("Ignoring text filter on non filterable column \"{column}\"");
        }
    }

    pub fn set_formation(&mut self, formation: Option<Formation>) {
        self.filters.formation = formation;
        self.refilter();
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.filters.category = category;
        self.refilter();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.refilter();
    }

    // Any filter input lands here: full rescan, back to the first page.
    fn refilter(&mut self) {
        let start_time = Instant::now();
        self.rows = predicate::filter(&self.dataset, &self.filters);
        self.current_page = 1;
        debug!(
            "Filter pass kept {}/{} rows in {}ms",
            self.rows.len(),
            self.dataset.len(),
            start_time.elapsed().as_millis()
        );
    }

    pub fn total_count(&self) -> usize {
        self.rows.len()
    }

    pub fn total_pages(&self) -> usize {
        pager::total_pages(self.rows.len(), self.page_size)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Moves to page `n`, clamped into `[1, total_pages]`.
    pub fn go_to_page(&mut self, n: usize) {
        self.current_page = n.clamp(1, self.total_pages());
        trace!("Page {}/{}", self.current_page, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.current_page.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.current_page.saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.go_to_page(1);
    }

    pub fn last_page(&mut self) {
        self.go_to_page(self.total_pages());
    }

    /// Dataset indices on the current page.
    pub fn page(&self) -> PageView<'_, usize> {
        pager::page(&self.rows, self.current_page, self.page_size)
    }

    pub fn page_rows(&self) -> Vec<&Row> {
        self.page()
            .rows
            .iter()
            .filter_map(|&idx| self.dataset.row(idx))
            .collect()
    }

    pub fn view(&self) -> QueryView<'_> {
        QueryView {
            columns: self.dataset.columns(),
            page: self.page_rows(),
            page_index: self.current_page,
            total_pages: self.total_pages(),
            total_count: self.total_count(),
            favorites: self.favorites.rows(),
            filter_state: &self.filters,
        }
    }

    pub fn toggle_favorite(&mut self, row: &Row) -> Result<&[Row]> {
        self.favorites.toggle(row)
    }

    pub fn is_favorite(&self, row: &Row) -> bool {
        self.favorites.is_favorite(row)
    }

    pub fn favorites(&self) -> &[Row] {
        self.favorites.rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn controller(n: usize) -> QueryController {
        let rows = (0..n)
            .map(|i| Row::from_pairs([("VILLE", format!("city{i}")), ("FI", "x".to_string())]))
            .collect();
        let mut qc = QueryController::new(
            FilterState::default(),
            NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap(),
            FavoritesRegistry::load(Box::new(MemoryStore::new())),
        );
        qc.set_dataset(Dataset::new(vec!["VILLE".into(), "FI".into()], rows));
        qc
    }

    #[test]
    fn not_loaded_until_dataset_arrives() {
        let qc = QueryController::new(
            FilterState::default(),
            NonZeroUsize::new(5).unwrap(),
            FavoritesRegistry::load(Box::new(MemoryStore::new())),
        );
        assert!(!qc.is_loaded());
        assert_eq!(qc.total_pages(), 1);
        assert!(qc.page_rows().is_empty());
    }

    #[test]
    fn navigation_clamps() {
        let mut qc = controller(23);
        assert_eq!(qc.total_pages(), 3);
        qc.go_to_page(0);
        assert_eq!(qc.current_page(), 1);
        qc.go_to_page(99);
        assert_eq!(qc.current_page(), 3);
        assert_eq!(qc.page_rows().len(), 3);
        qc.next_page();
        assert_eq!(qc.current_page(), 3);
        qc.first_page();
        qc.previous_page();
        assert_eq!(qc.current_page(), 1);
        assert_eq!(qc.page_rows().len(), 10);
    }

    #[test]
    fn filter_changes_reset_page() {
        let mut qc = controller(23);
        qc.last_page();
        qc.set_text_filter("VILLE", "city");
        assert_eq!(qc.current_page(), 1);

        qc.last_page();
        qc.set_formation(Some(Formation::Fi));
        assert_eq!(qc.current_page(), 1);
        assert_eq!(qc.total_count(), 23);

        qc.last_page();
        qc.set_category(Some(Category::C1));
        assert_eq!(qc.current_page(), 1);
        assert_eq!(qc.total_count(), 0);
        assert_eq!(qc.total_pages(), 1);
    }

    #[test]
    fn page_navigation_leaves_filters_alone() {
        let mut qc = controller(23);
        qc.set_text_filter("VILLE", "1");
        let before = qc.filter_state().clone();
        qc.next_page();
        qc.last_page();
        assert_eq!(qc.filter_state(), &before);
    }

    #[test]
    fn unknown_text_column_keeps_page() {
        let mut qc = controller(23);
        qc.last_page();
        qc.set_text_filter("NOPE", "x");
        assert_eq!(qc.current_page(), 3);
        assert_eq!(qc.total_count(), 23);
    }

    #[test]
    fn view_reports_totals_and_favorites() {
        let mut qc = controller(12);
        let first = qc.page_rows()[0].clone();
        qc.toggle_favorite(&first).unwrap();
        let view = qc.view();
        assert_eq!(view.columns.len(), 2);
        assert_eq!(view.page.len(), 10);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.total_count, 12);
        assert_eq!(view.favorites, &[first.clone()]);
        assert!(qc.is_favorite(&first));
    }
}
