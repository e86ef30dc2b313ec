use std::collections::VecDeque;

use crate::{
    executor::scan::Scanner,
    storage::{persistence::PageStore, table::Table},
    types::{error::DatabaseError, tuple::Tuple},
};

/// Walks a table's pages in clustering-key order, one page in memory at a
/// time.
pub struct SequentialScanner<'a, S: PageStore + ?Sized> {
    store: &'a S,
    table: Table,
    next_position: usize,
    buffered: VecDeque<Tuple>,
    batch_size: usize,
    is_exhausted: bool,
}

impl<'a, S: PageStore + ?Sized> SequentialScanner<'a, S> {
    pub fn new(store: &'a S, table: Table, batch_size: Option<usize>) -> Self {
        Self {
            store,
            table,
            next_position: 0,
            buffered: VecDeque::new(),
            batch_size: batch_size.unwrap_or(32),
            is_exhausted: false,
        }
    }

    pub fn table_name(&self) -> &str {
        self.table.table_name()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Loads the next non-empty page into the buffer. Returns false once
    /// every page has been read.
    fn load_next_page(&mut self) -> Result<bool, DatabaseError> {
        while self.next_position < self.table.page_count() {
            let page = self.table.load_page_at(self.next_position, self.store)?;
            self.next_position += 1;
            if !page.is_empty() {
                self.buffered.extend(page.tuples().iter().cloned());
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl<S: PageStore + ?Sized> Scanner for SequentialScanner<'_, S> {
    fn scan(&mut self) -> Result<Option<Tuple>, DatabaseError> {
        if self.is_exhausted {
            return Ok(None);
        }
        if self.buffered.is_empty() && !self.load_next_page()? {
            self.is_exhausted = true;
            return Ok(None);
        }
        Ok(self.buffered.pop_front())
    }

    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<Tuple>, DatabaseError> {
        let mut tuples = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            match self.scan()? {
                Some(tuple) => tuples.push(tuple),
                None => break,
            }
        }
        Ok(tuples)
    }

    fn reset(&mut self) -> Result<(), DatabaseError> {
        self.next_position = 0;
        self.buffered.clear();
        self.is_exhausted = false;
        Ok(())
    }
}
