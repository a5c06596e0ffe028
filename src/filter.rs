use indexmap::IndexMap;

use crate::table::registry::ColumnRegistry;
use crate::types::{Record, searchable_text};

// ---------------------------------------------------------------------------
// Column filters
// ---------------------------------------------------------------------------

/// Keep the records matching every active column filter (AND).
/// Returns indices into `source`, in source order.
///
/// A filter naming an unregistered column is skipped. A registered column
/// without a predicate matches nothing.
pub(crate) fn filter_by_columns(
    source: &[Record],
    registry: &ColumnRegistry,
    filters: &IndexMap<String, String>,
) -> Vec<usize> {
    let active: Vec<_> = filters
        .iter()
        .filter_map(|(id, value)| match registry.get(id) {
            Ok(column) => Some((column, value.as_str())),
            Err(err) => {
                tracing::debug!("column filter skipped: {err}");
                None
            }
        })
        .collect();

    source
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            active
                .iter()
                .all(|(column, value)| column.matches_filter(record, value))
        })
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Global free-text filter
// ---------------------------------------------------------------------------

/// Case-insensitive substring match against the record's searchable text.
pub(crate) fn matches_text(record: &Record, lower_query: &str) -> bool {
    searchable_text(record)
        .into_iter()
        .any(|text| text.to_lowercase().contains(lower_query))
}

/// Narrow `indices` to the records matching `query`. An empty query keeps all.
pub(crate) fn filter_by_text(source: &[Record], indices: Vec<usize>, query: &str) -> Vec<usize> {
    if query.is_empty() {
        return indices;
    }
    let lower = query.to_lowercase();
    indices
        .into_iter()
        .filter(|&i| source.get(i).is_some_and(|r| matches_text(r, &lower)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{TAGS, workflow_columns};
    use crate::types::{Workflow, WorkflowConfig};

    fn workflow(name: &str, description: &str, tags: &[&str]) -> Record {
        Record::Workflow(Workflow {
            file: format!("{name}.yaml"),
            config: WorkflowConfig {
                name: name.to_owned(),
                description: description.to_owned(),
                tags: tags.iter().map(|t| (*t).to_owned()).collect(),
                group: String::new(),
            },
            status: None,
        })
    }

    fn filters(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    // --- filter_by_text tests ---

    #[test]
    fn text_empty_query_returns_all() {
        let source = vec![workflow("a", "", &[]), Record::group("g")];
        assert_eq!(filter_by_text(&source, vec![0, 1], ""), vec![0, 1]);
    }

    #[test]
    fn text_matches_name_and_group() {
        let source = vec![workflow("daily-etl", "", &["prod"]), Record::group("daily")];
        assert_eq!(filter_by_text(&source, vec![0, 1], "dai"), vec![0, 1]);
        assert_eq!(filter_by_text(&source, vec![0, 1], "prod"), vec![0]);
    }

    #[test]
    fn text_matches_description() {
        let source = vec![workflow("a", "Loads the warehouse", &[]), workflow("b", "", &[])];
        assert_eq!(filter_by_text(&source, vec![0, 1], "warehouse"), vec![0]);
    }

    #[test]
    fn text_is_case_insensitive() {
        let source = vec![workflow("Nightly-Backup", "", &["OPS"])];
        assert_eq!(filter_by_text(&source, vec![0], "nightly"), vec![0]);
        assert_eq!(filter_by_text(&source, vec![0], "ops"), vec![0]);
        assert_eq!(filter_by_text(&source, vec![0], "BACKUP"), vec![0]);
    }

    #[test]
    fn text_does_not_match_group_on_workflow_only_fields() {
        let source = vec![Record::group("etl")];
        assert!(filter_by_text(&source, vec![0], "prod").is_empty());
    }

    #[test]
    fn text_only_narrows_given_indices() {
        let source = vec![workflow("a1", "", &[]), workflow("a2", "", &[])];
        assert_eq!(filter_by_text(&source, vec![1], "a"), vec![1]);
    }

    // --- filter_by_columns tests ---

    #[test]
    fn no_active_filters_keeps_everything() {
        let reg = workflow_columns();
        let source = vec![workflow("a", "", &[]), Record::group("g")];
        assert_eq!(filter_by_columns(&source, &reg, &filters(&[])), vec![0, 1]);
    }

    #[test]
    fn tag_filter_is_exact_match() {
        let reg = workflow_columns();
        let source = vec![
            workflow("a", "", &["production", "prod"]),
            workflow("b", "", &["production"]),
            Record::group("prod"),
        ];
        assert_eq!(
            filter_by_columns(&source, &reg, &filters(&[(TAGS, "prod")])),
            vec![0]
        );
    }

    #[test]
    fn unknown_filter_column_is_skipped() {
        let reg = workflow_columns();
        let source = vec![workflow("a", "", &[]), Record::group("g")];
        assert_eq!(
            filter_by_columns(&source, &reg, &filters(&[("Nope", "x")])),
            vec![0, 1]
        );
    }

    #[test]
    fn column_without_predicate_matches_nothing() {
        let reg = workflow_columns();
        let source = vec![workflow("a", "", &[]), Record::group("g")];
        assert!(filter_by_columns(&source, &reg, &filters(&[("Workflow", "a")])).is_empty());
    }
}
