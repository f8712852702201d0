//! Pagination, search and filtering over a list held in memory.
//!
//! `ListController` is what every list screen (check-ins, employees, users)
//! drives: the host feeds it records with `set_data`, forwards user input to
//! the search and navigation methods, and draws whatever `on_render` hands it.
//! Pages are 1-based.

use crate::predicate::{AnyFieldContains, FieldFilters, SearchPredicate};
use crate::record::Record;
use log::debug;
use std::fmt;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_MAX_VISIBLE_PAGES: usize = 5;

/// Settings fixed when a controller is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListConfig {
    /// Page length used initially and restored by `reset`.
    pub page_size: usize,
    /// Number of page-number controls the host shows at once.
    pub max_visible_pages: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
        }
    }
}

type PageCallback = Box<dyn FnMut(&[Record], usize)>;
type SearchCallback = Box<dyn FnMut(&[Record])>;
type RenderCallback = Box<dyn FnMut(&PageState<'_>)>;

#[derive(Default)]
struct Callbacks {
    on_page_change: Option<PageCallback>,
    on_page_size_change: Option<PageCallback>,
    on_search: Option<SearchCallback>,
    on_render: Option<RenderCallback>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_page_change", &self.on_page_change.is_some())
            .field("on_page_size_change", &self.on_page_size_change.is_some())
            .field("on_search", &self.on_search.is_some())
            .field("on_render", &self.on_render.is_some())
            .finish()
    }
}

/// Everything a host needs to draw the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState<'a> {
    pub items: &'a [Record],
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    /// Number of records after search and filters.
    pub total_items: usize,
    /// 1-based positions of the first and last record shown, `None` with no data.
    pub range: Option<(usize, usize)>,
    pub visible_pages: Vec<usize>,
    pub can_go_prev: bool,
    pub can_go_next: bool,
    /// Set when nothing matches; hosts show a "no data" row instead of "page 1 of 0".
    pub no_data: bool,
}

/// Page numbers to show as controls, keeping `current` centred where possible.
///
/// Returns an empty list when there are no pages.
pub fn visible_page_numbers(current: usize, total: usize, max_visible: usize) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }
    let max_visible = max_visible.max(1);
    let mut start = current.saturating_sub(max_visible / 2).max(1);
    let end = (start + max_visible - 1).min(total);
    if end - start + 1 < max_visible {
        start = (end + 1).saturating_sub(max_visible).max(1);
    }
    (start..=end).collect()
}

/// Number of pages needed for `total_items`; zero for an empty list.
pub fn page_count(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

pub struct ListController {
    config: ListConfig,
    collection: Vec<Record>,
    filtered: Vec<Record>,
    query: String,
    predicate: Box<dyn SearchPredicate>,
    field_filters: FieldFilters,
    current_page: usize,
    page_size: usize,
    callbacks: Callbacks,
}

impl fmt::Debug for ListController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListController")
            .field("config", &self.config)
            .field("collection_len", &self.collection.len())
            .field("filtered_len", &self.filtered.len())
            .field("query", &self.query)
            .field("field_filters", &self.field_filters)
            .field("current_page", &self.current_page)
            .field("page_size", &self.page_size)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl Default for ListController {
    fn default() -> Self {
        Self::new(ListConfig::default())
    }
}

impl ListController {
    pub fn new(config: ListConfig) -> Self {
        let config = ListConfig {
            page_size: config.page_size.max(1),
            max_visible_pages: config.max_visible_pages.max(1),
        };
        Self {
            config,
            collection: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            predicate: Box::new(AnyFieldContains),
            field_filters: FieldFilters::new(),
            current_page: 1,
            page_size: config.page_size,
            callbacks: Callbacks::default(),
        }
    }

    pub fn with_predicate(mut self, predicate: impl SearchPredicate + 'static) -> Self {
        self.predicate = Box::new(predicate);
        self
    }

    pub fn on_page_change(mut self, callback: impl FnMut(&[Record], usize) + 'static) -> Self {
        self.callbacks.on_page_change = Some(Box::new(callback));
        self
    }

    pub fn on_page_size_change(mut self, callback: impl FnMut(&[Record], usize) + 'static) -> Self {
        self.callbacks.on_page_size_change = Some(Box::new(callback));
        self
    }

    pub fn on_search(mut self, callback: impl FnMut(&[Record]) + 'static) -> Self {
        self.callbacks.on_search = Some(Box::new(callback));
        self
    }

    pub fn on_render(mut self, callback: impl FnMut(&PageState<'_>) + 'static) -> Self {
        self.callbacks.on_render = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> ListConfig {
        self.config
    }

    /// Replaces the whole collection and re-applies the current search.
    pub fn set_data(&mut self, items: Vec<Record>) {
        self.collection = items;
        self.refilter();
        debug!(
            "List data replaced: {} records, {} after search",
            self.collection.len(),
            self.filtered.len()
        );
        self.render();
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.refilter();
        debug!(
            "Search '{}' matched {}/{} records",
            self.query,
            self.filtered.len(),
            self.collection.len()
        );
        if let Some(callback) = self.callbacks.on_search.as_mut() {
            callback(&self.filtered);
        }
        self.render();
    }

    /// Swaps the search predicate and re-filters with the current query.
    pub fn set_predicate(&mut self, predicate: impl SearchPredicate + 'static) {
        self.predicate = Box::new(predicate);
        self.refilter();
        self.render();
    }

    /// Sets an exact-match filter on `field`; an empty value removes it.
    pub fn set_field_filter(&mut self, field: &str, value: &str) {
        if self.field_filters.set(field, value) {
            self.refilter();
            self.render();
        }
    }

    pub fn clear_field_filters(&mut self) {
        if self.field_filters.clear() {
            self.refilter();
            self.render();
        }
    }

    pub fn field_filters(&self) -> &FieldFilters {
        &self.field_filters
    }

    pub fn current_page_items(&self) -> &[Record] {
        let (start, end) = self.slice_bounds();
        &self.filtered[start..end]
    }

    /// Moves to `page`. Out-of-range pages and the current page are ignored.
    pub fn change_page(&mut self, page: usize) -> bool {
        let total_pages = self.total_pages();
        if page < 1 || page > total_pages || page == self.current_page {
            debug!(
                "Ignoring page change to {} (current {}, total {})",
                page, self.current_page, total_pages
            );
            return false;
        }
        self.current_page = page;
        self.render();
        let (start, end) = self.slice_bounds();
        if let Some(callback) = self.callbacks.on_page_change.as_mut() {
            callback(&self.filtered[start..end], page);
        }
        true
    }

    pub fn prev_page(&mut self) -> bool {
        self.change_page(self.current_page.saturating_sub(1))
    }

    pub fn next_page(&mut self) -> bool {
        self.change_page(self.current_page + 1)
    }

    pub fn first_page(&mut self) -> bool {
        self.change_page(1)
    }

    pub fn last_page(&mut self) -> bool {
        self.change_page(self.total_pages())
    }

    /// Changes the page length. Sizes below one are treated as one.
    pub fn change_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.clamp_page();
        self.render();
        let (start, end) = self.slice_bounds();
        let page_size = self.page_size;
        if let Some(callback) = self.callbacks.on_page_size_change.as_mut() {
            callback(&self.filtered[start..end], page_size);
        }
    }

    /// Back to the configured page size, first page, no search and no filters.
    pub fn reset(&mut self) {
        self.page_size = self.config.page_size;
        self.current_page = 1;
        self.query.clear();
        self.field_filters.clear();
        self.filtered = self.collection.clone();
        self.render();
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        page_count(self.filtered.len(), self.page_size)
    }

    pub fn total_items(&self) -> usize {
        self.filtered.len()
    }

    pub fn collection_len(&self) -> usize {
        self.collection.len()
    }

    pub fn search_query(&self) -> &str {
        &self.query
    }

    pub fn filtered_items(&self) -> &[Record] {
        &self.filtered
    }

    pub fn collection(&self) -> &[Record] {
        &self.collection
    }

    /// True when nothing matches, the "no data" state.
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// 1-based positions of the first and last record on the current page.
    pub fn page_range(&self) -> Option<(usize, usize)> {
        let (start, end) = self.slice_bounds();
        (end > start).then_some((start + 1, end))
    }

    pub fn visible_pages(&self) -> Vec<usize> {
        visible_page_numbers(
            self.current_page,
            self.total_pages(),
            self.config.max_visible_pages,
        )
    }

    pub fn snapshot(&self) -> PageState<'_> {
        PageState {
            items: self.current_page_items(),
            current_page: self.current_page,
            total_pages: self.total_pages(),
            page_size: self.page_size,
            total_items: self.filtered.len(),
            range: self.page_range(),
            visible_pages: self.visible_pages(),
            can_go_prev: self.can_go_prev(),
            can_go_next: self.can_go_next(),
            no_data: self.is_empty(),
        }
    }

    fn slice_bounds(&self) -> (usize, usize) {
        let start = ((self.current_page - 1) * self.page_size).min(self.filtered.len());
        let end = (start + self.page_size).min(self.filtered.len());
        (start, end)
    }

    fn refilter(&mut self) {
        let query = self.query.to_lowercase();
        let predicate = &self.predicate;
        let field_filters = &self.field_filters;
        self.filtered = self
            .collection
            .iter()
            .filter(|record| field_filters.matches(record))
            .filter(|record| query.is_empty() || predicate.matches(record, &query))
            .cloned()
            .collect();
        self.clamp_page();
    }

    fn clamp_page(&mut self) {
        self.current_page = self.current_page.clamp(1, self.total_pages().max(1));
    }

    fn render(&mut self) {
        if self.callbacks.on_render.is_none() {
            return;
        }
        let mut callbacks = std::mem::take(&mut self.callbacks);
        if let Some(callback) = callbacks.on_render.as_mut() {
            callback(&self.snapshot());
        }
        self.callbacks = callbacks;
    }
}
