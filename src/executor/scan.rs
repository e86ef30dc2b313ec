use crate::types::{error::DatabaseError, tuple::Tuple};

pub trait Scanner {
    fn scan(&mut self) -> Result<Option<Tuple>, DatabaseError>;
    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<Tuple>, DatabaseError>;
    fn reset(&mut self) -> Result<(), DatabaseError>;
}

pub struct ScanIterator<S: Scanner> {
    scanner: S,
}

impl<S: Scanner> ScanIterator<S> {
    pub fn new(scanner: S) -> Self {
        Self { scanner }
    }
}

impl<S: Scanner> Iterator for ScanIterator<S> {
    type Item = Result<Tuple, DatabaseError>;
    fn next(&mut self) -> Option<Self::Item> {
        match self.scanner.scan() {
            Ok(Some(tuple)) => Some(Ok(tuple)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
