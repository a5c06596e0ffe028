use std::cmp::Ordering;
use std::fmt;

use crate::table::state::StateChange;
use crate::types::{Record, StatusCode};

// ---------------------------------------------------------------------------
// Column behavior signatures
// ---------------------------------------------------------------------------

/// Custom comparator between two records.
pub type SortFn = fn(&Record, &Record) -> Ordering;
/// Column-filter predicate: does `record` match the active filter value?
pub type FilterFn = fn(&Record, &str) -> bool;
/// Raw cell value, used by the default comparator.
pub type ValueFn = fn(&Record) -> String;
/// Cell renderer.
pub type RenderFn = fn(&Record, &RenderContext) -> Cell;

/// Per-view data a renderer may need beyond the record itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// Group scope the listing is showing (empty at the root).
    pub group: String,
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// Semantic color slot. The presentation layer maps it to a theme color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Normal,
    Secondary,
    Faint,
    Accent,
    Status(StatusCode),
}

/// Interactive tag chip; selecting it applies `on_select` to the view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub label: String,
    pub on_select: StateChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Start,
    Stop,
    Retry,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Retry => "retry",
        }
    }
}

/// Per-row control carried by the Actions column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAction {
    pub kind: ActionKind,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellContent {
    #[default]
    Empty,
    Text(String),
    Link {
        label: String,
        href: String,
    },
    Chips(Vec<Chip>),
    Actions(Vec<RowAction>),
}

/// A single rendered cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub content: CellContent,
    pub tone: Tone,
    pub bold: bool,
}

impl Cell {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            content: CellContent::Text(text.into()),
            ..Self::default()
        }
    }

    pub fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            content: CellContent::Text(text.into()),
            tone,
            bold: false,
        }
    }

    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            content: CellContent::Link {
                label: label.into(),
                href: href.into(),
            },
            tone: Tone::Accent,
            bold: true,
        }
    }

    pub fn chips(chips: Vec<Chip>) -> Self {
        Self {
            content: CellContent::Chips(chips),
            tone: Tone::Secondary,
            bold: false,
        }
    }

    pub fn actions(actions: Vec<RowAction>) -> Self {
        Self {
            content: CellContent::Actions(actions),
            tone: Tone::Faint,
            bold: false,
        }
    }

    /// Plain-text form of the cell.
    pub fn text(&self) -> String {
        match &self.content {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Link { label, .. } => label.clone(),
            CellContent::Chips(chips) => chips
                .iter()
                .map(|c| format!("[{}]", c.label))
                .collect::<Vec<_>>()
                .join(" "),
            CellContent::Actions(actions) => actions
                .iter()
                .filter(|a| a.enabled)
                .map(|a| a.kind.label())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Link target, for link cells.
    pub fn href(&self) -> Option<&str> {
        match &self.content {
            CellContent::Link { href, .. } => Some(href),
            _ => None,
        }
    }

    pub fn chip_list(&self) -> &[Chip] {
        match &self.content {
            CellContent::Chips(chips) => chips,
            _ => &[],
        }
    }

    pub fn action_list(&self) -> &[RowAction] {
        match &self.content {
            CellContent::Actions(actions) => actions,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Column descriptor
// ---------------------------------------------------------------------------

/// Binds a column id to its render/sort/filter behavior.
#[derive(Clone)]
pub struct ColumnDescriptor {
    /// Unique identifier within a registry.
    pub id: String,
    /// Display header text.
    pub header: String,
    pub sortable: bool,
    pub sort_fn: Option<SortFn>,
    pub filter_fn: Option<FilterFn>,
    pub value: Option<ValueFn>,
    pub render: RenderFn,
    /// Default width as a fraction of total width (0.0..1.0).
    pub default_width_pct: f32,
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("custom_sort", &self.sort_fn.is_some())
            .field("filterable", &self.filter_fn.is_some())
            .finish_non_exhaustive()
    }
}

impl ColumnDescriptor {
    /// A sortable column with no custom comparator, predicate or accessor.
    pub fn new(id: impl Into<String>, header: impl Into<String>, render: RenderFn) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            sortable: true,
            sort_fn: None,
            filter_fn: None,
            value: None,
            render,
            default_width_pct: 0.1,
        }
    }

    pub fn with_sort(mut self, sort_fn: SortFn) -> Self {
        self.sort_fn = Some(sort_fn);
        self
    }

    pub fn with_filter(mut self, filter_fn: FilterFn) -> Self {
        self.filter_fn = Some(filter_fn);
        self
    }

    pub fn with_value(mut self, value: ValueFn) -> Self {
        self.value = Some(value);
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn width(mut self, pct: f32) -> Self {
        self.default_width_pct = pct;
        self
    }

    pub fn render_cell(&self, record: &Record, ctx: &RenderContext) -> Cell {
        (self.render)(record, ctx)
    }

    /// Raw value: the accessor if set, otherwise the rendered cell's text.
    pub fn raw_value(&self, record: &Record) -> String {
        match self.value {
            Some(value) => value(record),
            None => self.render_cell(record, &RenderContext::default()).text(),
        }
    }

    /// Compare with the custom comparator, or lexicographically on raw values.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self.sort_fn {
            Some(sort_fn) => sort_fn(a, b),
            None => self.raw_value(a).cmp(&self.raw_value(b)),
        }
    }

    /// Columns without a predicate never match a column filter.
    pub fn matches_filter(&self, record: &Record, value: &str) -> bool {
        self.filter_fn.is_some_and(|filter_fn| filter_fn(record, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_name(record: &Record, _ctx: &RenderContext) -> Cell {
        Cell::plain(crate::types::display_name(record))
    }

    #[test]
    fn default_comparator_uses_rendered_text() {
        let col = ColumnDescriptor::new("name", "Name", render_name);
        let a = Record::group("alpha");
        let b = Record::group("beta");
        assert_eq!(col.compare(&a, &b), Ordering::Less);
        assert_eq!(col.compare(&b, &a), Ordering::Greater);
        assert_eq!(col.compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn accessor_takes_precedence_over_render() {
        let col = ColumnDescriptor::new("name", "Name", render_name).with_value(|_| "x".to_owned());
        assert_eq!(col.raw_value(&Record::group("alpha")), "x");
    }

    #[test]
    fn column_without_predicate_never_matches() {
        let col = ColumnDescriptor::new("name", "Name", render_name);
        assert!(!col.matches_filter(&Record::group("alpha"), "alpha"));
    }

    #[test]
    fn cell_text_forms() {
        assert_eq!(Cell::empty().text(), "");
        assert_eq!(Cell::link("etl", "/dags/?group=etl").text(), "etl");
        let actions = Cell::actions(vec![
            RowAction {
                kind: ActionKind::Start,
                enabled: true,
            },
            RowAction {
                kind: ActionKind::Stop,
                enabled: false,
            },
        ]);
        assert_eq!(actions.text(), "start");
    }
}
