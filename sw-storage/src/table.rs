use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::StorageError;
use crate::mappable::{Mappable, StorageInspect, StorageMutate};

/// A single in-memory table keyed by `u64`, generic over the row shape.
///
/// Every persisted entity is keyed by an integer id, so one
/// implementation of [`Mappable`]/[`StorageInspect`]/[`StorageMutate`]
/// backs every table in [`crate::Database`].
#[derive(Debug, Clone)]
pub struct Table<T: Mappable<Key = u64>> {
    rows: HashMap<u64, T::GetValue>,
}

impl<T: Mappable<Key = u64>> Default for Table<T> {
    fn default() -> Self {
        Self { rows: HashMap::new() }
    }
}

impl<T: Mappable<Key = u64>> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u64, &T::GetValue)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> StorageInspect<T> for Table<T>
where
    T: Mappable<Key = u64>,
    T::SetValue: Clone + Into<T::GetValue>,
{
    fn get(&self, key: &u64) -> Result<Option<Cow<T::GetValue>>, StorageError> {
        Ok(self.rows.get(key).map(Cow::Borrowed))
    }

    fn contains_key(&self, key: &u64) -> Result<bool, StorageError> {
        Ok(self.rows.contains_key(key))
    }
}

impl<T> StorageMutate<T> for Table<T>
where
    T: Mappable<Key = u64>,
    T::SetValue: Clone + Into<T::GetValue>,
{
    fn insert(&mut self, key: &u64, value: &T::SetValue) -> Result<Option<T::GetValue>, StorageError> {
        Ok(self.rows.insert(*key, value.clone().into()))
    }

    fn remove(&mut self, key: &u64) -> Result<Option<T::GetValue>, StorageError> {
        Ok(self.rows.remove(key))
    }
}
