use crate::table::column::{
    ActionKind, Cell, Chip, ColumnDescriptor, RenderContext, RowAction, Tone,
};
use crate::table::registry::ColumnRegistry;
use crate::table::state::StateChange;
use crate::types::{
    Record, StatusCode, StatusField, Workflow, display_name, first_tag, status_field, status_of,
    variant_of,
};
use crate::url::{group_link, workflow_link};

// ---------------------------------------------------------------------------
// Column ids
// ---------------------------------------------------------------------------

pub const NAME: &str = "Workflow";
pub const TYPE: &str = "Type";
pub const TAGS: &str = "Tags";
pub const DESCRIPTION: &str = "Config";
pub const STATUS: &str = "Status";
pub const STARTED_AT: &str = "Started At";
pub const FINISHED_AT: &str = "Finished At";
pub const ACTIONS: &str = "Actions";

/// The workflow listing's columns, in display order.
///
/// # Panics
///
/// Panics if two columns share an id.
pub fn workflow_columns() -> ColumnRegistry {
    match ColumnRegistry::try_from(column_list()) {
        Ok(registry) => registry,
        Err(e) => panic!("workflow column set is invalid: {e}"),
    }
}

fn column_list() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new(NAME, "Workflow", render_name)
            .with_value(|r| display_name(r).to_owned())
            .width(0.20),
        ColumnDescriptor::new(TYPE, "Type", render_type)
            .with_sort(|a, b| variant_of(a).cmp(&variant_of(b)))
            .width(0.08),
        ColumnDescriptor::new(TAGS, "Tags", render_tags)
            .with_filter(has_tag)
            .with_sort(|a, b| first_tag(a).cmp(first_tag(b)))
            .width(0.14),
        ColumnDescriptor::new(DESCRIPTION, "Description", render_description)
            .unsortable()
            .width(0.20),
        ColumnDescriptor::new(STATUS, "Status", render_status)
            .with_sort(|a, b| status_of(a).cmp(&status_of(b)))
            .width(0.09),
        // Timestamps are zero-padded upstream, so string order is time order.
        ColumnDescriptor::new(STARTED_AT, "Started At", render_started_at)
            .with_sort(|a, b| {
                status_field(StatusField::StartedAt, a).cmp(status_field(StatusField::StartedAt, b))
            })
            .width(0.11),
        ColumnDescriptor::new(FINISHED_AT, "Finished At", render_finished_at)
            .with_sort(|a, b| {
                status_field(StatusField::FinishedAt, a)
                    .cmp(status_field(StatusField::FinishedAt, b))
            })
            .width(0.11),
        ColumnDescriptor::new(ACTIONS, "Actions", render_actions)
            .unsortable()
            .width(0.07),
    ]
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Exact, case-sensitive tag membership. Groups never match.
fn has_tag(record: &Record, tag: &str) -> bool {
    record
        .as_workflow()
        .is_some_and(|w| w.config.tags.iter().any(|t| t == tag))
}

/// Which controls a workflow row offers in its current state.
pub fn available_actions(workflow: &Workflow) -> Vec<RowAction> {
    let running = workflow.is_running();
    let has_run = workflow
        .status
        .as_ref()
        .is_some_and(|s| !s.request_id.is_empty());
    vec![
        RowAction {
            kind: ActionKind::Start,
            enabled: !running,
        },
        RowAction {
            kind: ActionKind::Stop,
            enabled: running,
        },
        RowAction {
            kind: ActionKind::Retry,
            enabled: !running && has_run,
        },
    ]
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

fn render_name(record: &Record, ctx: &RenderContext) -> Cell {
    match record {
        Record::Group(g) => Cell::link(&g.name, group_link(&g.name)),
        Record::Workflow(w) => Cell::link(
            display_name(record),
            workflow_link(w.file_stem(), &ctx.group),
        ),
    }
}

fn render_type(record: &Record, _ctx: &RenderContext) -> Cell {
    let kind = variant_of(record);
    let tone = match record {
        Record::Group(_) => Tone::Secondary,
        Record::Workflow(_) => Tone::Accent,
    };
    Cell::toned(kind.label(), tone)
}

fn render_tags(record: &Record, _ctx: &RenderContext) -> Cell {
    let Some(workflow) = record.as_workflow() else {
        return Cell::empty();
    };
    Cell::chips(
        workflow
            .config
            .tags
            .iter()
            .map(|tag| Chip {
                label: tag.clone(),
                on_select: StateChange::ColumnFilter {
                    id: TAGS.to_owned(),
                    value: Some(tag.clone()),
                },
            })
            .collect(),
    )
}

fn render_description(record: &Record, _ctx: &RenderContext) -> Cell {
    match record.as_workflow() {
        Some(w) => Cell::toned(&w.config.description, Tone::Secondary),
        None => Cell::empty(),
    }
}

fn render_status(record: &Record, _ctx: &RenderContext) -> Cell {
    let Some(workflow) = record.as_workflow() else {
        return Cell::empty();
    };
    let code = workflow.status_code();
    let text = status_field(StatusField::StatusText, record);
    let label = if text.is_empty() && code != StatusCode::None {
        code.label()
    } else {
        text
    };
    Cell::toned(label, Tone::Status(code))
}

fn render_started_at(record: &Record, _ctx: &RenderContext) -> Cell {
    render_timestamp(record, StatusField::StartedAt)
}

fn render_finished_at(record: &Record, _ctx: &RenderContext) -> Cell {
    render_timestamp(record, StatusField::FinishedAt)
}

fn render_timestamp(record: &Record, field: StatusField) -> Cell {
    if record.as_workflow().is_none() {
        return Cell::empty();
    }
    Cell::toned(status_field(field, record), Tone::Faint)
}

fn render_actions(record: &Record, _ctx: &RenderContext) -> Cell {
    match record.as_workflow() {
        Some(w) => Cell::actions(available_actions(w)),
        None => Cell::empty(),
    }
}
