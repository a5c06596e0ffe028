use std::collections::BTreeSet;

use crate::filter::{filter_by_columns, filter_by_text};
use crate::table::registry::ColumnRegistry;
use crate::table::state::{SortDirection, SortSpec, StateChange, ViewState};
use crate::types::Record;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A visible row: the source record plus its position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow<'a> {
    pub index: usize,
    pub record: &'a Record,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortIndicator {
    #[default]
    None,
    Asc,
    Desc,
}

impl SortIndicator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Asc => " \u{25b2}",
            Self::Desc => " \u{25bc}",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDescriptor {
    pub id: String,
    pub header: String,
    pub sortable: bool,
    pub indicator: SortIndicator,
    /// Present only for sortable columns.
    pub on_click: Option<StateChange>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Derive the visible rows: column filters, then the global filter, then sort.
///
/// Pure and total: unknown column ids in `state` are skipped.
pub fn compute_visible_rows<'a>(
    source: &'a [Record],
    registry: &ColumnRegistry,
    state: &ViewState,
) -> Vec<VisibleRow<'a>> {
    let after_columns = filter_by_columns(source, registry, state.column_filters());
    let after_text = filter_by_text(source, after_columns, state.global_filter());

    let mut rows: Vec<VisibleRow<'a>> = after_text
        .into_iter()
        .map(|index| VisibleRow {
            index,
            record: &source[index],
        })
        .collect();

    if let Some(spec) = state.sort() {
        sort_rows(&mut rows, registry, spec);
    }

    tracing::debug!(
        source = source.len(),
        visible = rows.len(),
        "computed visible rows"
    );
    rows
}

/// Stable sort by the column's comparator; reversed afterwards for `Desc`.
fn sort_rows(rows: &mut [VisibleRow<'_>], registry: &ColumnRegistry, spec: &SortSpec) {
    let column = match registry.get(&spec.column_id) {
        Ok(column) => column,
        Err(err) => {
            tracing::debug!("sort skipped: {err}");
            return;
        }
    };

    if column.sort_fn.is_some() {
        rows.sort_by(|a, b| column.compare(a.record, b.record));
    } else {
        rows.sort_by_cached_key(|row| column.raw_value(row.record));
    }

    if spec.direction == SortDirection::Desc {
        rows.reverse();
    }
}

/// Header labels with the current sort indicator and click action.
pub fn header_descriptors(registry: &ColumnRegistry, state: &ViewState) -> Vec<HeaderDescriptor> {
    registry
        .iter()
        .map(|column| {
            let indicator = match state.sort() {
                Some(spec) if spec.column_id == column.id && column.sortable => {
                    match spec.direction {
                        SortDirection::Asc => SortIndicator::Asc,
                        SortDirection::Desc => SortIndicator::Desc,
                    }
                }
                _ => SortIndicator::None,
            };
            HeaderDescriptor {
                id: column.id.clone(),
                header: column.header.clone(),
                sortable: column.sortable,
                indicator,
                on_click: column
                    .sortable
                    .then(|| StateChange::ToggleSort(column.id.clone())),
            }
        })
        .collect()
}

/// Distinct workflow tags across `source`, sorted.
pub fn tag_options(source: &[Record]) -> Vec<String> {
    source
        .iter()
        .filter_map(Record::as_workflow)
        .flat_map(|w| w.config.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{NAME, TYPE, workflow_columns};

    #[test]
    fn empty_source_yields_no_rows() {
        let reg = workflow_columns();
        let mut state = ViewState::new();
        state.set_global_filter("x");
        state.set_sort(Some(SortSpec::desc(NAME)));
        assert!(compute_visible_rows(&[], &reg, &state).is_empty());
    }

    #[test]
    fn unknown_sort_column_keeps_source_order() {
        let reg = workflow_columns();
        let source = vec![Record::group("b"), Record::group("a")];
        let mut state = ViewState::new();
        state.set_sort(Some(SortSpec::asc("Nope")));
        let idx: Vec<usize> = compute_visible_rows(&source, &reg, &state)
            .iter()
            .map(|r| r.index)
            .collect();
        assert_eq!(idx, vec![0, 1]);
    }

    #[test]
    fn headers_carry_indicator_and_click_for_sortable_only() {
        let reg = workflow_columns();
        let mut state = ViewState::new();
        state.set_sort(Some(SortSpec::desc(TYPE)));
        let headers = header_descriptors(&reg, &state);
        let ty = headers.iter().find(|h| h.id == TYPE).unwrap();
        assert_eq!(ty.indicator, SortIndicator::Desc);
        assert_eq!(ty.on_click, Some(StateChange::ToggleSort(TYPE.to_owned())));
        let actions = headers.iter().find(|h| h.id == "Actions").unwrap();
        assert!(!actions.sortable);
        assert!(actions.on_click.is_none());
        assert_eq!(actions.indicator, SortIndicator::None);
    }

    #[test]
    fn tag_options_are_distinct_and_sorted() {
        let json = r#"[
            {"type": "workflow", "file": "a.yaml", "config": {"name": "a", "tags": ["zeta", "alpha"]}},
            {"type": "group", "name": "g"},
            {"type": "workflow", "file": "b.yaml", "config": {"name": "b", "tags": ["alpha", "mid"]}}
        ]"#;
        let source: Vec<Record> = serde_json::from_str(json).unwrap();
        assert_eq!(tag_options(&source), vec!["alpha", "mid", "zeta"]);
    }
}
