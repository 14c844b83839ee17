use std::borrow::Cow;

use crate::error::StorageError;

/// A table identity: the key and value shape of one persisted entity kind.
///
/// Keeps the key and value shapes separate so a caller can hold a borrowed
/// `SetValue` while getting back an owned `GetValue` on read.
pub trait Mappable {
    type Key;
    type SetValue: ?Sized;
    type GetValue: Clone;
}

/// Read half of a table.
pub trait StorageInspect<Type: Mappable> {
    fn get(&self, key: &Type::Key) -> Result<Option<Cow<Type::GetValue>>, StorageError>;

    fn contains_key(&self, key: &Type::Key) -> Result<bool, StorageError>;
}

/// Read/write half of a table.
pub trait StorageMutate<Type: Mappable>: StorageInspect<Type> {
    fn insert(&mut self, key: &Type::Key, value: &Type::SetValue) -> Result<Option<Type::GetValue>, StorageError>;

    fn remove(&mut self, key: &Type::Key) -> Result<Option<Type::GetValue>, StorageError>;
}

impl<'a, T: StorageInspect<Type> + ?Sized, Type: Mappable> StorageInspect<Type> for &'a T {
    fn get(&self, key: &Type::Key) -> Result<Option<Cow<Type::GetValue>>, StorageError> {
        (**self).get(key)
    }

    fn contains_key(&self, key: &Type::Key) -> Result<bool, StorageError> {
        (**self).contains_key(key)
    }
}

impl<'a, T: StorageInspect<Type> + ?Sized, Type: Mappable> StorageInspect<Type> for &'a mut T {
    fn get(&self, key: &Type::Key) -> Result<Option<Cow<Type::GetValue>>, StorageError> {
        (**self).get(key)
    }

    fn contains_key(&self, key: &Type::Key) -> Result<bool, StorageError> {
        (**self).contains_key(key)
    }
}

impl<'a, T: StorageMutate<Type> + ?Sized, Type: Mappable> StorageMutate<Type> for &'a mut T {
    fn insert(&mut self, key: &Type::Key, value: &Type::SetValue) -> Result<Option<Type::GetValue>, StorageError> {
        (**self).insert(key, value)
    }

    fn remove(&mut self, key: &Type::Key) -> Result<Option<Type::GetValue>, StorageError> {
        (**self).remove(key)
    }
}
