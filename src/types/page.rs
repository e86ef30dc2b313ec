use serde::{Deserialize, Serialize};

use crate::{
    types::{
        PageId, error::DatabaseError, page_reference::PageReference, tuple::Tuple, value::Value,
    },
    utils::search::{insertion_index, search_tuples},
};

/*
 * A page is a capacity-bounded run of tuples kept strictly ascending by
 * clustering key:
 *
 *   page_id 3, capacity 4
 *   ┌──────┬──────┬──────┬──────┐
 *   │ k=12 │ k=15 │ k=20 │ k=31 │   min = 12, max = 31
 *   └──────┴──────┴──────┴──────┘
 *
 * An insert may leave `capacity + 1` tuples behind (overflow); the owning
 * table redistributes before the operation returns.
 */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub table_name: String,
    pub page_id: PageId,
    pub capacity: usize,
    tuples: Vec<Tuple>,
    min: Option<Value>,
    max: Option<Value>,
}

impl Page {
    pub fn new(table_name: impl Into<String>, page_id: PageId, capacity: usize) -> Self {
        Self {
            table_name: table_name.into(),
            page_id,
            capacity,
            tuples: Vec::new(),
            min: None,
            max: None,
        }
    }

    pub fn lookup(&self, key: &Value) -> Result<&Tuple, DatabaseError> {
        let index = search_tuples(&self.tuples, &Tuple::key_only(key.clone()));
        if index < 0 {
            return Err(DatabaseError::TupleNotFound {
                key: key.to_string(),
            });
        }
        Ok(&self.tuples[index as usize])
    }

    /// Inserts at the sorted position. Rejects a clustering key that is
    /// already present; does not enforce capacity.
    pub fn insert(&mut self, tuple: Tuple) -> Result<(), DatabaseError> {
        let index = search_tuples(&self.tuples, &tuple);
        if index >= 0 {
            return Err(DatabaseError::DuplicateKey {
                table: self.table_name.clone(),
                page_id: self.page_id,
                key: tuple.cluster_key_value().to_string(),
            });
        }

        self.tuples.insert(insertion_index(index), tuple);
        self.update_min_max();
        Ok(())
    }

    pub fn remove(&mut self, key: &Value) -> Result<Tuple, DatabaseError> {
        let index = search_tuples(&self.tuples, &Tuple::key_only(key.clone()));
        if index < 0 {
            return Err(DatabaseError::TupleNotFound {
                key: key.to_string(),
            });
        }

        let tuple = self.tuples.remove(index as usize);
        self.update_min_max();
        Ok(tuple)
    }

    /// Swaps in a new version of an existing tuple, returning the old one.
    /// The clustering key is unchanged so the sort position is too.
    pub fn replace(&mut self, tuple: Tuple) -> Result<Tuple, DatabaseError> {
        let index = search_tuples(&self.tuples, &tuple);
        if index < 0 {
            return Err(DatabaseError::TupleNotFound {
                key: tuple.cluster_key_value().to_string(),
            });
        }

        let old = std::mem::replace(&mut self.tuples[index as usize], tuple);
        self.update_min_max();
        Ok(old)
    }

    /// Removes every tuple accepted by `predicate`, returning them in key order.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Vec<Tuple>
    where
        F: FnMut(&Tuple) -> bool,
    {
        let (removed, kept): (Vec<Tuple>, Vec<Tuple>) =
            std::mem::take(&mut self.tuples).into_iter().partition(|t| predicate(t));
        self.tuples = kept;
        self.update_min_max();
        removed
    }

    pub fn pop_max(&mut self) -> Option<Tuple> {
        let tuple = self.tuples.pop();
        self.update_min_max();
        tuple
    }

    pub fn pop_min(&mut self) -> Option<Tuple> {
        if self.tuples.is_empty() {
            return None;
        }
        let tuple = self.tuples.remove(0);
        self.update_min_max();
        Some(tuple)
    }

    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    pub fn first(&self) -> Option<&Tuple> {
        self.tuples.first()
    }

    pub fn last(&self) -> Option<&Tuple> {
        self.tuples.last()
    }

    pub fn min(&self) -> Option<&Value> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&Value> {
        self.max.as_ref()
    }

    pub fn size(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.size() == self.capacity
    }

    pub fn is_overflow(&self) -> bool {
        self.size() > self.capacity
    }

    pub fn reference(&self) -> PageReference {
        PageReference {
            table_name: self.table_name.clone(),
            page_id: self.page_id,
            min: self.min.clone(),
            max: self.max.clone(),
            size: self.size(),
        }
    }

    fn update_min_max(&mut self) {
        self.min = self.tuples.first().map(|t| t.cluster_key_value().clone());
        self.max = self.tuples.last().map(|t| t.cluster_key_value().clone());
    }
}
