use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
    executor::predicate::Predicate,
    storage::{persistence::PageStore, schema::TableSchema},
    types::{
        PageId, error::DatabaseError, page::Page, page_reference::PageReference, tuple::Tuple,
        value::Value,
    },
    utils::search::{insertion_index, search_page_references},
};

/// A table: an ordered run of pages, each summarized by a [`PageReference`].
///
/// Pages are addressed by a stable `page_id`; a page's *position* is its
/// index in `page_refs`. References are owned by value and replaced after
/// every page write, so the table never aliases page state.
///
/// Steady state after every insert: all pages non-empty and at most
/// `max_rows_per_page` tuples, every page but the last full, and
/// `page[i].max < page[i + 1].min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    table_name: String,
    cluster_key: String,
    max_rows_per_page: usize,
    page_refs: Vec<PageReference>,
    rows_count: usize,
    next_page_id: PageId,
}

impl Table {
    pub fn new(
        table_name: impl Into<String>,
        cluster_key: impl Into<String>,
        max_rows_per_page: usize,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            cluster_key: cluster_key.into(),
            max_rows_per_page,
            page_refs: Vec::new(),
            rows_count: 0,
            next_page_id: 0,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn cluster_key(&self) -> &str {
        &self.cluster_key
    }

    pub fn max_rows_per_page(&self) -> usize {
        self.max_rows_per_page
    }

    pub fn rows_count(&self) -> usize {
        self.rows_count
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    pub fn page_references(&self) -> &[PageReference] {
        &self.page_refs
    }

    pub fn page_reference(&self, position: usize) -> Option<&PageReference> {
        self.page_refs.get(position)
    }

    /// True when every page could be full: `rows >= capacity * pages`.
    pub fn is_full(&self) -> bool {
        self.rows_count >= self.max_rows_per_page * self.page_count()
    }

    pub fn load_page_at<S>(&self, position: usize, store: &S) -> Result<Page, DatabaseError>
    where
        S: PageStore + ?Sized,
    {
        let reference =
            self.page_refs
                .get(position)
                .ok_or_else(|| DatabaseError::PagePositionOutOfBounds {
                    table: self.table_name.clone(),
                    position,
                })?;
        store.load_page(&self.table_name, reference.page_id)
    }

    /// Position of the page whose range holds `key`, if any.
    pub fn find_page_position(&self, key: &Value) -> Option<usize> {
        let index = search_page_references(&self.page_refs, key);
        if index < 0 {
            return None;
        }
        let position = index as usize;
        self.page_refs[position].contains(key).then_some(position)
    }

    /// Target page for a new key: the page whose range holds it, otherwise
    /// the page it would become the new minimum of, clamped to the last page.
    fn position_for_insert(&self, key: &Value) -> usize {
        let position = insertion_index(search_page_references(&self.page_refs, key));
        position.min(self.page_refs.len().saturating_sub(1))
    }

    pub fn insert<S>(&mut self, tuple: Tuple, store: &mut S) -> Result<(), DatabaseError>
    where
        S: PageStore + ?Sized,
    {
        if self.page_refs.is_empty() {
            self.add_page(store)?;
        }

        let position = self.position_for_insert(tuple.cluster_key_value());
        let mut page = self.load_page_at(position, store)?;
        page.insert(tuple)?;

        if self.is_full() {
            self.add_page(store)?;
        }

        store.save_page(&page)?;
        self.page_refs[position] = page.reference();
        self.rows_count += 1;

        self.rearrange_pages(store)
    }

    pub fn lookup<S>(&self, key: &Value, store: &S) -> Result<Tuple, DatabaseError>
    where
        S: PageStore + ?Sized,
    {
        let position = self
            .find_page_position(key)
            .ok_or_else(|| DatabaseError::TupleNotFound {
                key: key.to_string(),
            })?;
        let page = self.load_page_at(position, store)?;
        page.lookup(key).cloned()
    }

    /// Replaces the stored tuple with the same clustering key, returning
    /// the previous version.
    pub fn replace<S>(&mut self, tuple: Tuple, store: &mut S) -> Result<Tuple, DatabaseError>
    where
        S: PageStore + ?Sized,
    {
        let position = self
            .find_page_position(tuple.cluster_key_value())
            .ok_or_else(|| DatabaseError::TupleNotFound {
                key: tuple.cluster_key_value().to_string(),
            })?;
        let mut page = self.load_page_at(position, store)?;
        let previous = page.replace(tuple)?;
        store.save_page(&page)?;
        self.page_refs[position] = page.reference();
        Ok(previous)
    }

    /// Removes every tuple matching `predicate`. When the predicate pins
    /// the clustering key only the page whose range holds it is visited.
    /// Pages left empty are reclaimed. Returns the removed tuples.
    pub fn delete_matching<S>(
        &mut self,
        predicate: &Predicate,
        store: &mut S,
    ) -> Result<Vec<Tuple>, DatabaseError>
    where
        S: PageStore + ?Sized,
    {
        let candidates: Vec<usize> = match predicate.cluster_key_value(&self.cluster_key) {
            Some(key) => self.find_page_position(key).into_iter().collect(),
            None => (0..self.page_refs.len()).collect(),
        };

        let mut deleted = Vec::new();
        for position in candidates {
            let mut page = self.load_page_at(position, store)?;
            let removed = page.remove_where(|tuple| predicate.evaluate(tuple));
            if removed.is_empty() {
                continue;
            }

            if !page.is_empty() {
                store.save_page(&page)?;
            }
            self.page_refs[position] = page.reference();
            self.rows_count -= removed.len();
            deleted.extend(removed);
        }

        let reclaimed = self.remove_empty_pages(store)?;
        log::debug!(
            "Deleted {} tuples from '{}', reclaimed {} pages",
            deleted.len(),
            self.table_name,
            reclaimed
        );
        Ok(deleted)
    }

    /// Recomputes the recorded min/max of every non-key column whose
    /// extreme was held by one of the `displaced` tuples. The rescan reads
    /// the first and last tuple of every page. Returns the refreshed
    /// column names.
    pub fn refresh_column_stats<S>(
        &self,
        schema: &mut TableSchema,
        displaced: &[Tuple],
        store: &S,
    ) -> Result<Vec<String>, DatabaseError>
    where
        S: PageStore + ?Sized,
    {
        let held_by_displaced = |bound: &Option<Value>, column: &str| {
            bound.as_ref().is_some_and(|bound| {
                displaced.iter().any(|tuple| {
                    tuple
                        .column_value(column)
                        .is_some_and(|v| v.compare(bound) == Ordering::Equal)
                })
            })
        };

        let stale: Vec<(String, bool, bool)> = schema
            .columns
            .iter()
            .filter(|column| !column.clustering_key)
            .map(|column| {
                (
                    column.name.clone(),
                    held_by_displaced(&column.stats.min, &column.name),
                    held_by_displaced(&column.stats.max, &column.name),
                )
            })
            .filter(|(_, min_stale, max_stale)| *min_stale || *max_stale)
            .collect();

        if stale.is_empty() {
            return Ok(Vec::new());
        }

        let mut boundary = Vec::with_capacity(self.page_refs.len() * 2);
        for position in 0..self.page_refs.len() {
            let page = self.load_page_at(position, store)?;
            boundary.extend(page.first().cloned());
            if page.size() > 1 {
                boundary.extend(page.last().cloned());
            }
        }

        let mut refreshed = Vec::with_capacity(stale.len());
        for (name, min_stale, max_stale) in stale {
            let values: Vec<&Value> = boundary
                .iter()
                .filter_map(|tuple| tuple.column_value(&name))
                .collect();
            let Some(column) = schema.get_column_mut(&name) else {
                continue;
            };

            if min_stale {
                column.stats.min = values
                    .iter()
                    .copied()
                    .min_by(|a, b| a.compare(b))
                    .cloned();
            }
            if max_stale {
                column.stats.max = values
                    .iter()
                    .copied()
                    .max_by(|a, b| a.compare(b))
                    .cloned();
            }
            log::info!(
                "Rescanned statistics of '{}.{}': min={:?} max={:?}",
                self.table_name,
                name,
                column.stats.min,
                column.stats.max
            );
            refreshed.push(name);
        }

        Ok(refreshed)
    }

    /// Single left-to-right pass over adjacent pages. An overflowing page
    /// pushes its greatest tuple right; an under-full page pulls the
    /// smallest tuples from its right neighbour until it is full or the
    /// neighbour is drained.
    pub fn redistribute<S>(&mut self, store: &mut S) -> Result<(), DatabaseError>
    where
        S: PageStore + ?Sized,
    {
        let count = self.page_refs.len();
        if count < 2 {
            return Ok(());
        }

        let mut current = self.load_page_at(0, store)?;
        for position in 0..count - 1 {
            let mut next = self.load_page_at(position + 1, store)?;

            if current.is_overflow() {
                Self::shift_tuples_next(&mut current, &mut next)?;
            } else if !current.is_full() && !next.is_empty() {
                Self::shift_tuples_previous(&mut next, &mut current)?;
            }

            store.save_page(&current)?;
            self.page_refs[position] = current.reference();
            current = next;
        }

        store.save_page(&current)?;
        self.page_refs[count - 1] = current.reference();
        Ok(())
    }

    /// Reclaims every empty page, last to first. Returns how many were removed.
    pub fn remove_empty_pages<S>(&mut self, store: &mut S) -> Result<usize, DatabaseError>
    where
        S: PageStore + ?Sized,
    {
        let mut removed = 0;
        for position in (0..self.page_refs.len()).rev() {
            if !self.page_refs[position].is_empty() {
                continue;
            }
            let reference = self.page_refs.remove(position);
            store.delete_page(&self.table_name, reference.page_id)?;
            log::info!(
                "Reclaimed empty page {} of table '{}'",
                reference.page_id,
                self.table_name
            );
            removed += 1;
        }
        Ok(removed)
    }

    /// Checks the structural invariants against the stored pages and
    /// returns a description of every violation found.
    pub fn verify_invariants<S>(&self, store: &S) -> Result<Vec<String>, DatabaseError>
    where
        S: PageStore + ?Sized,
    {
        let mut violations = Vec::new();
        let mut total = 0;
        let mut previous_max: Option<Value> = None;

        for position in 0..self.page_refs.len() {
            let page = self.load_page_at(position, store)?;
            total += page.size();

            if page.reference() != self.page_refs[position] {
                violations.push(format!("page {} reference is stale", page.page_id));
            }
            if page.is_empty() {
                violations.push(format!("page {} is empty", page.page_id));
            }
            if page.size() > self.max_rows_per_page {
                violations.push(format!(
                    "page {} holds {} tuples, capacity is {}",
                    page.page_id,
                    page.size(),
                    self.max_rows_per_page
                ));
            }
            if page
                .tuples()
                .windows(2)
                .any(|pair| pair[0].compare(&pair[1]) != Ordering::Less)
            {
                violations.push(format!("page {} is not strictly sorted", page.page_id));
            }
            if let (Some(prev), Some(min)) = (&previous_max, page.min()) {
                if prev.compare(min) != Ordering::Less {
                    violations.push(format!(
                        "page {} starts at {} but the previous page ends at {}",
                        page.page_id, min, prev
                    ));
                }
            }
            previous_max = page.max().cloned().or(previous_max);
        }

        if total != self.rows_count {
            violations.push(format!(
                "rows_count is {} but pages hold {} tuples",
                self.rows_count, total
            ));
        }
        Ok(violations)
    }

    fn rearrange_pages<S>(&mut self, store: &mut S) -> Result<(), DatabaseError>
    where
        S: PageStore + ?Sized,
    {
        self.redistribute(store)?;
        self.remove_empty_pages(store)?;
        Ok(())
    }

    fn add_page<S>(&mut self, store: &mut S) -> Result<(), DatabaseError>
    where
        S: PageStore + ?Sized,
    {
        let page = Page::new(
            self.table_name.clone(),
            self.next_page_id,
            self.max_rows_per_page,
        );
        store.save_page(&page)?;
        self.page_refs.push(page.reference());
        self.next_page_id += 1;
        log::info!(
            "Allocated page {} for table '{}' ({} pages)",
            page.page_id,
            self.table_name,
            self.page_refs.len()
        );
        Ok(())
    }

    fn shift_tuples_next(current: &mut Page, next: &mut Page) -> Result<(), DatabaseError> {
        if let Some(tuple) = current.pop_max() {
            log::debug!(
                "Shifting key {} from page {} to page {}",
                tuple.cluster_key_value(),
                current.page_id,
                next.page_id
            );
            next.insert(tuple)?;
        }
        Ok(())
    }

    fn shift_tuples_previous(next: &mut Page, current: &mut Page) -> Result<(), DatabaseError> {
        let mut shifted = 0;
        while current.size() < current.capacity {
            let Some(tuple) = next.pop_min() else {
                break;
            };
            current.insert(tuple)?;
            shifted += 1;
        }
        log::debug!(
            "Pulled {} tuples from page {} into page {}",
            shifted,
            next.page_id,
            current.page_id
        );
        Ok(())
    }
}
