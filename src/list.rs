use std::collections::HashSet;

use unicode_width::UnicodeWidthStr;

use crate::columns::TAGS;
use crate::components::table::visible_columns;
use crate::table::{
    ColumnRegistry, LookupPolicy, RegistryError, RenderContext, SortDirection, SortSpec,
    StateChange, ViewState, compute_visible_rows,
};
use crate::types::Record;

/// Filters and sort given to `wf-board list`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub group: String,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub sort: Option<String>,
    pub desc: bool,
}

impl ListOptions {
    /// The view state these options describe. Column ids are checked strictly
    /// so a mistyped `--sort` is reported instead of silently ignored.
    pub fn view_state(&self, registry: &ColumnRegistry) -> Result<ViewState, RegistryError> {
        let mut state = ViewState::new();
        let mut changes = Vec::new();
        if let Some(search) = &self.search {
            changes.push(StateChange::GlobalFilter(search.clone()));
        }
        if let Some(tag) = &self.tag {
            changes.push(StateChange::ColumnFilter {
                id: TAGS.to_owned(),
                value: Some(tag.clone()),
            });
        }
        if let Some(id) = &self.sort {
            changes.push(StateChange::Sort(Some(SortSpec {
                column_id: id.clone(),
                direction: if self.desc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                },
            })));
        }
        for change in changes {
            state.apply_checked(registry, LookupPolicy::Strict, change)?;
        }
        Ok(state)
    }
}

/// Render the visible rows as aligned plain-text lines, cells separated by
/// two spaces.
pub fn render_lines(
    source: &[Record],
    registry: &ColumnRegistry,
    state: &ViewState,
    group: &str,
    hidden: &HashSet<String>,
) -> Vec<String> {
    let columns = visible_columns(registry, Some(hidden));
    let ctx = RenderContext {
        group: group.to_owned(),
    };
    let rows = compute_visible_rows(source, registry, state);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| col.render_cell(row.record, &ctx).text())
                .collect()
        })
        .collect();

    let mut widths = vec![0usize; columns.len()];
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.width());
        }
    }

    cells
        .iter()
        .map(|row| {
            let mut line = String::new();
            for (i, (cell, w)) in row.iter().zip(&widths).enumerate() {
                if i > 0 {
                    line.push_str("  ");
                }
                line.push_str(cell);
                line.extend(std::iter::repeat_n(' ', w - cell.width()));
            }
            line.trim_end().to_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{
        ACTIONS, DESCRIPTION, FINISHED_AT, STARTED_AT, STATUS, TYPE, workflow_columns,
    };
    use crate::types::{Workflow, WorkflowConfig};

    fn wf(name: &str, tags: &[&str]) -> Record {
        Record::Workflow(Workflow {
            file: format!("{name}.yaml"),
            config: WorkflowConfig {
                name: name.to_owned(),
                tags: tags.iter().map(|t| (*t).to_owned()).collect(),
                ..WorkflowConfig::default()
            },
            status: None,
        })
    }

    fn narrow() -> HashSet<String> {
        [TYPE, DESCRIPTION, STATUS, STARTED_AT, FINISHED_AT, ACTIONS]
            .iter()
            .map(|s| (*s).to_owned())
            .collect()
    }

    #[test]
    fn lines_are_aligned_and_trimmed() {
        let reg = workflow_columns();
        let source = vec![wf("extract", &["etl"]), wf("ab", &[])];
        let lines = render_lines(&source, &reg, &ViewState::new(), "", &narrow());
        assert_eq!(lines, vec!["extract  [etl]".to_owned(), "ab".to_owned()]);
    }

    #[test]
    fn options_build_filters_and_sort() {
        let reg = workflow_columns();
        let opts = ListOptions {
            tag: Some("etl".to_owned()),
            sort: Some("Workflow".to_owned()),
            desc: true,
            ..ListOptions::default()
        };
        let state = opts.view_state(&reg).unwrap();
        assert_eq!(state.column_filter(TAGS), Some("etl"));
        assert_eq!(state.sort(), Some(&SortSpec::desc("Workflow")));

        let source = vec![wf("a", &["etl"]), wf("b", &["etl"]), wf("c", &[])];
        let lines = render_lines(&source, &reg, &state, "", &narrow());
        assert_eq!(lines, vec!["b  [etl]".to_owned(), "a  [etl]".to_owned()]);
    }

    #[test]
    fn unknown_sort_column_is_an_error() {
        let reg = workflow_columns();
        let opts = ListOptions {
            sort: Some("Nope".to_owned()),
            ..ListOptions::default()
        };
        assert!(matches!(
            opts.view_state(&reg),
            Err(RegistryError::NotFound(id)) if id == "Nope"
        ));
    }
}
