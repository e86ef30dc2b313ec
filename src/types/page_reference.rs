use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{PageId, value::Value};

/// Summary of a page used to route lookups without loading the page.
///
/// A table owns its references by value; after every page mutation the
/// table replaces the reference with a fresh [`Page::reference`].
///
/// [`Page::reference`]: crate::types::page::Page::reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReference {
    pub table_name: String,
    pub page_id: PageId,
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub size: usize,
}

impl PageReference {
    pub fn new(table_name: impl Into<String>, page_id: PageId) -> Self {
        Self {
            table_name: table_name.into(),
            page_id,
            min: None,
            max: None,
            size: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Orders two references by their minimum key. An empty reference
    /// compares equal to anything.
    pub fn compare_range_to_range(&self, other: &PageReference) -> Ordering {
        match (&self.min, &other.min) {
            (Some(this_min), Some(other_min)) => this_min.compare(other_min),
            _ => Ordering::Equal,
        }
    }

    /// Locates `key` relative to this page's range: `Equal` when
    /// `min <= key <= max` (or the page is empty), `Greater` when the whole
    /// range lies above the key, `Less` when it lies below.
    pub fn key_in_range(&self, key: &Value) -> Ordering {
        let (Some(min), Some(max)) = (&self.min, &self.max) else {
            return Ordering::Equal;
        };

        if min.compare(key) == Ordering::Greater {
            Ordering::Greater
        } else if max.compare(key) == Ordering::Less {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }

    pub fn contains(&self, key: &Value) -> bool {
        !self.is_empty() && self.key_in_range(key) == Ordering::Equal
    }
}
