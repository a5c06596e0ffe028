use indexmap::IndexMap;
use serde::Deserialize;

use crate::table::registry::{ColumnRegistry, RegistryError};

// ---------------------------------------------------------------------------
// Sort specification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Desc,
        }
    }
}

// ---------------------------------------------------------------------------
// State changes
// ---------------------------------------------------------------------------

/// Every mutation the view can make. Each one replaces exactly one slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    GlobalFilter(String),
    /// `None` (or an empty value) clears the column's filter.
    ColumnFilter {
        id: String,
        value: Option<String>,
    },
    Sort(Option<SortSpec>),
    /// Header click: cycles `none -> asc -> desc -> none` for one column.
    ToggleSort(String),
    ClearFilters,
}

impl StateChange {
    /// Column id this change refers to, if any.
    pub fn column_id(&self) -> Option<&str> {
        match self {
            Self::ColumnFilter { id, .. } | Self::ToggleSort(id) => Some(id),
            Self::Sort(Some(spec)) => Some(&spec.column_id),
            Self::GlobalFilter(_) | Self::Sort(None) | Self::ClearFilters => None,
        }
    }
}

/// What to do when a change names a column the registry doesn't know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Accept it; the pipeline will skip it.
    #[default]
    Lenient,
    /// Reject it at the setter and leave the state untouched.
    Strict,
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// The three user-mutable slices driving the row pipeline.
///
/// Cloning yields a consistent snapshot of all three.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    global_filter: String,
    column_filters: IndexMap<String, String>,
    sort: Option<SortSpec>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_filter(&self) -> &str {
        &self.global_filter
    }

    pub fn column_filters(&self) -> &IndexMap<String, String> {
        &self.column_filters
    }

    pub fn column_filter(&self, id: &str) -> Option<&str> {
        self.column_filters.get(id).map(String::as_str)
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        self.global_filter = text.into();
    }

    /// Assign or clear one column's filter.
    pub fn set_column_filter(&mut self, id: impl Into<String>, value: Option<String>) {
        let id = id.into();
        match value {
            Some(value) if !value.is_empty() => {
                self.column_filters.insert(id, value);
            }
            _ => {
                self.column_filters.shift_remove(&id);
            }
        }
    }

    /// Replace the sort; any previous sort column is discarded.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    pub fn toggle_sort(&mut self, id: &str) {
        self.sort = match self.sort.take() {
            Some(spec) if spec.column_id == id => match spec.direction {
                SortDirection::Asc => Some(SortSpec::desc(id)),
                SortDirection::Desc => None,
            },
            _ => Some(SortSpec::asc(id)),
        };
    }

    pub fn clear_filters(&mut self) {
        self.global_filter.clear();
        self.column_filters.clear();
    }

    /// Apply a change without consulting any registry.
    pub fn apply(&mut self, change: StateChange) {
        match change {
            StateChange::GlobalFilter(text) => self.set_global_filter(text),
            StateChange::ColumnFilter { id, value } => self.set_column_filter(id, value),
            StateChange::Sort(sort) => self.set_sort(sort),
            StateChange::ToggleSort(id) => self.toggle_sort(&id),
            StateChange::ClearFilters => self.clear_filters(),
        }
    }

    /// Apply a change, consulting `registry` for column ids.
    ///
    /// Header clicks on registered, non-sortable columns are ignored. Unknown
    /// ids are accepted under [`LookupPolicy::Lenient`] and rejected under
    /// [`LookupPolicy::Strict`].
    pub fn apply_checked(
        &mut self,
        registry: &ColumnRegistry,
        policy: LookupPolicy,
        change: StateChange,
    ) -> Result<(), RegistryError> {
        if let Some(id) = change.column_id() {
            match registry.get(id) {
                Ok(column) => {
                    if matches!(change, StateChange::ToggleSort(_)) && !column.sortable {
                        tracing::debug!(column = id, "ignoring sort toggle on unsortable column");
                        return Ok(());
                    }
                }
                Err(err) if policy == LookupPolicy::Strict => return Err(err),
                Err(_) => {
                    tracing::debug!(column = id, "state change names an unregistered column");
                }
            }
        }
        self.apply(change);
        Ok(())
    }
}
