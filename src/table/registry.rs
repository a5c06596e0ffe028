use indexmap::IndexMap;
use thiserror::Error;

use crate::table::column::ColumnDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no column with id \"{0}\"")]
    NotFound(String),
    #[error("column id \"{0}\" is already registered")]
    DuplicateColumn(String),
}

/// Ordered set of column descriptors, keyed by id.
///
/// Iteration order is registration order, which is also render order.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: IndexMap<String, ColumnDescriptor>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Ids must be unique.
    pub fn register(&mut self, column: ColumnDescriptor) -> Result<(), RegistryError> {
        if self.columns.contains_key(&column.id) {
            return Err(RegistryError::DuplicateColumn(column.id));
        }
        self.columns.insert(column.id.clone(), column);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&ColumnDescriptor, RegistryError> {
        self.columns
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_owned()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.columns.contains_key(id)
    }

    /// Position of a column in render order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.columns.get_index_of(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.values()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl TryFrom<Vec<ColumnDescriptor>> for ColumnRegistry {
    type Error = RegistryError;

    fn try_from(columns: Vec<ColumnDescriptor>) -> Result<Self, Self::Error> {
        let mut registry = Self::new();
        for column in columns {
            registry.register(column)?;
        }
        Ok(registry)
    }
}
