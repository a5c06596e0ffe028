use std::collections::HashSet;
use std::time::Instant;

use iocraft::prelude::*;

use crate::color::ColorDepth;
use crate::columns::{NAME, TAGS, available_actions, workflow_columns};
use crate::components::footer::{self, Footer, RenderedFooter};
use crate::components::table::{RenderedTable, ScrollableTable, TableBuildConfig, visible_columns};
use crate::components::text_input::{RenderedTextInput, TextInput, filter_suggestions};
use crate::config::types::LayoutConfig;
use crate::engine::{EngineHandle, Event, Request};
use crate::table::{
    ActionKind, ColumnRegistry, LookupPolicy, RenderContext, SortSpec, StateChange, ViewState,
    compute_visible_rows, header_descriptors, tag_options,
};
use crate::theme::ResolvedTheme;
use crate::types::{Record, display_name};
use crate::url::group_from_link;

// ---------------------------------------------------------------------------
// Input mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputMode {
    Normal,
    Search,
    TagPicker,
}

// ---------------------------------------------------------------------------
// Fetched data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ListingData {
    records: Vec<Record>,
    loading: bool,
    error: Option<String>,
}

impl Default for ListingData {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

#[derive(Default, Props)]
pub struct WorkflowsViewProps<'a> {
    pub engine: Option<&'a EngineHandle>,
    pub theme: Option<&'a ResolvedTheme>,
    pub layout: Option<&'a LayoutConfig>,
    pub color_depth: ColorDepth,
    pub width: u16,
    pub height: u16,
    pub show_separator: bool,
    pub initial_group: String,
    pub initial_sort: Option<SortSpec>,
    pub lookup_policy: LookupPolicy,
    pub should_exit: Option<State<bool>>,
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
#[allow(clippy::too_many_lines)]
pub fn WorkflowsView<'a>(
    props: &WorkflowsViewProps<'a>,
    mut hooks: Hooks,
) -> impl Into<AnyElement<'a>> {
    let theme = props.theme.cloned().unwrap_or_default();
    let depth = props.color_depth;
    let policy = props.lookup_policy;
    let should_exit = props.should_exit;
    let engine: Option<EngineHandle> = props.engine.cloned();

    let registry = hooks.use_state(workflow_columns);
    let initial_sort = props.initial_sort.clone();
    let mut view_state = hooks.use_state(move || {
        let mut state = ViewState::new();
        state.set_sort(initial_sort);
        state
    });
    let initial_group = props.initial_group.clone();
    let mut group = hooks.use_state(move || initial_group);
    let mut listing = hooks.use_state(ListingData::default);
    // Computed once from the first snapshot and never refreshed.
    let mut tag_snapshot = hooks.use_state(|| Option::<Vec<String>>::None);

    let mut needs_fetch = hooks.use_state(|| true);
    let mut fetch_in_flight = hooks.use_state(|| false);
    let mut last_fetch = hooks.use_state(|| Option::<Instant>::None);

    let mut cursor = hooks.use_state(|| 0usize);
    let mut scroll_offset = hooks.use_state(|| 0usize);
    let mut chip_cursor = hooks.use_state(|| 0usize);
    let mut input_mode = hooks.use_state(|| InputMode::Normal);
    let mut tag_query = hooks.use_state(String::new);
    let mut tag_selected = hooks.use_state(|| 0usize);
    let mut status_message = hooks.use_state(|| Option::<String>::None);

    let event_channel = hooks.use_state(|| {
        let (tx, rx) = std::sync::mpsc::channel::<Event>();
        (tx, std::sync::Arc::new(std::sync::Mutex::new(rx)))
    });
    let (event_tx, event_rx_arc) = event_channel.read().clone();

    // Fetch on mount, on group change and after every successful mutation.
    if needs_fetch.get()
        && !fetch_in_flight.get()
        && let Some(ref eng) = engine
    {
        needs_fetch.set(false);
        fetch_in_flight.set(true);
        eng.send(Request::FetchRecords {
            group: group.read().clone(),
            reply_tx: event_tx.clone(),
        });
    }

    // Poll engine events.
    {
        let rx_for_poll = event_rx_arc.clone();
        hooks.use_future(async move {
            loop {
                smol::Timer::after(std::time::Duration::from_millis(100)).await;
                let events: Vec<Event> = {
                    let Ok(rx) = rx_for_poll.lock() else {
                        return;
                    };
                    let mut evts = Vec::new();
                    while let Ok(evt) = rx.try_recv() {
                        evts.push(evt);
                    }
                    evts
                };
                for evt in events {
                    match evt {
                        Event::RecordsFetched {
                            group: fetched,
                            records,
                        } => {
                            fetch_in_flight.set(false);
                            if fetched != *group.read() {
                                tracing::debug!("view: dropping stale snapshot for {fetched:?}");
                                needs_fetch.set(true);
                                continue;
                            }
                            if tag_snapshot.read().is_none() {
                                tag_snapshot.set(Some(tag_options(&records)));
                            }
                            let count = records.len();
                            listing.set(ListingData {
                                records,
                                loading: false,
                                error: None,
                            });
                            if cursor.get() >= count {
                                cursor.set(count.saturating_sub(1));
                            }
                            last_fetch.set(Some(Instant::now()));
                        }
                        Event::FetchError { context, message } => {
                            tracing::warn!("view: {context} failed: {message}");
                            fetch_in_flight.set(false);
                            let mut data = listing.read().clone();
                            data.loading = false;
                            data.error = Some(message);
                            listing.set(data);
                        }
                        Event::MutationOk { description } => {
                            status_message.set(Some(description));
                            needs_fetch.set(true);
                        }
                        Event::MutationError {
                            description,
                            message,
                        } => {
                            status_message.set(Some(format!("{description} failed: {message}")));
                        }
                    }
                }
            }
        });
    }

    // -----------------------------------------------------------------------
    // Derived rows
    // -----------------------------------------------------------------------

    let hidden: HashSet<String> = props
        .layout
        .map(|l| l.hidden.iter().cloned().collect())
        .unwrap_or_default();
    let widths = props.layout.map(|l| &l.widths);

    let registry_ref = registry.read();
    let state_snapshot = view_state.read().clone();
    let data = listing.read();
    let rows = compute_visible_rows(&data.records, &registry_ref, &state_snapshot);
    let headers = header_descriptors(&registry_ref, &state_snapshot);
    let total_rows = rows.len();

    // Owned copies for the key handler.
    let row_records: Vec<Record> = rows.iter().map(|r| r.record.clone()).collect();
    let column_ids = sort_key_targets(&registry_ref, &hidden);
    let all_tags = tag_snapshot.read().clone().unwrap_or_default();
    let tag_matches = filter_suggestions(&all_tags, &tag_query.read());

    // Table area: height minus footer (2), input (2 when open) and header (2).
    let input_rows = if *input_mode.read() == InputMode::Normal { 0 } else { 2 };
    let tag_rows = if *input_mode.read() == InputMode::TagPicker {
        tag_matches.len().min(8)
    } else {
        0
    };
    let visible_rows = (props.height as usize)
        .saturating_sub(4 + input_rows + tag_rows)
        .max(1);

    // -----------------------------------------------------------------------
    // Keyboard handling
    // -----------------------------------------------------------------------

    hooks.use_terminal_events({
        let engine_for_keys = engine.clone();
        let event_tx_for_keys = event_tx.clone();
        let tag_matches_for_keys = tag_matches.clone();
        move |event| match event {
            TerminalEvent::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) if kind != KeyEventKind::Release => {
                let apply = |mut view_state: State<ViewState>, change: StateChange| {
                    let registry = registry.read();
                    let mut state = view_state.read().clone();
                    if let Err(e) = state.apply_checked(&registry, policy, change) {
                        return Some(e.to_string());
                    }
                    view_state.set(state);
                    None
                };

                let current_mode = input_mode.read().clone();
                match current_mode {
                    InputMode::Search => match code {
                        KeyCode::Esc => {
                            input_mode.set(InputMode::Normal);
                            apply(view_state, StateChange::GlobalFilter(String::new()));
                        }
                        KeyCode::Enter => {
                            input_mode.set(InputMode::Normal);
                        }
                        KeyCode::Backspace => {
                            let mut q = view_state.read().global_filter().to_owned();
                            q.pop();
                            apply(view_state, StateChange::GlobalFilter(q));
                            cursor.set(0);
                            scroll_offset.set(0);
                        }
                        KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                            let mut q = view_state.read().global_filter().to_owned();
                            q.push(ch);
                            apply(view_state, StateChange::GlobalFilter(q));
                            cursor.set(0);
                            scroll_offset.set(0);
                        }
                        _ => {}
                    },
                    InputMode::TagPicker => match code {
                        KeyCode::Esc => {
                            input_mode.set(InputMode::Normal);
                        }
                        KeyCode::Enter => {
                            input_mode.set(InputMode::Normal);
                            let chosen = tag_matches_for_keys.get(tag_selected.get()).cloned();
                            if chosen.is_some() {
                                status_message.set(apply(
                                    view_state,
                                    StateChange::ColumnFilter {
                                        id: TAGS.to_owned(),
                                        value: chosen,
                                    },
                                ));
                                cursor.set(0);
                                scroll_offset.set(0);
                            }
                        }
                        KeyCode::Down | KeyCode::Tab => {
                            let last = tag_matches_for_keys.len().saturating_sub(1);
                            tag_selected.set((tag_selected.get() + 1).min(last));
                        }
                        KeyCode::Up | KeyCode::BackTab => {
                            tag_selected.set(tag_selected.get().saturating_sub(1));
                        }
                        KeyCode::Backspace => {
                            let mut q = tag_query.read().clone();
                            q.pop();
                            tag_query.set(q);
                            tag_selected.set(0);
                        }
                        KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                            let mut q = tag_query.read().clone();
                            q.push(ch);
                            tag_query.set(q);
                            tag_selected.set(0);
                        }
                        _ => {}
                    },
                    InputMode::Normal => {
                        let current = row_records.get(cursor.get());
                        match code {
                            KeyCode::Char('q') => {
                                if let Some(mut exit) = should_exit {
                                    exit.set(true);
                                }
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                if let Some(mut exit) = should_exit {
                                    exit.set(true);
                                }
                            }
                            KeyCode::Char('j') | KeyCode::Down => {
                                if total_rows > 0 {
                                    let new_cursor =
                                        (cursor.get() + 1).min(total_rows.saturating_sub(1));
                                    cursor.set(new_cursor);
                                    chip_cursor.set(0);
                                    if new_cursor >= scroll_offset.get() + visible_rows {
                                        scroll_offset
                                            .set(new_cursor.saturating_sub(visible_rows) + 1);
                                    }
                                }
                            }
                            KeyCode::Char('k') | KeyCode::Up => {
                                let new_cursor = cursor.get().saturating_sub(1);
                                cursor.set(new_cursor);
                                chip_cursor.set(0);
                                if new_cursor < scroll_offset.get() {
                                    scroll_offset.set(new_cursor);
                                }
                            }
                            KeyCode::Char('/') => {
                                input_mode.set(InputMode::Search);
                            }
                            KeyCode::Char('t') => {
                                tag_query.set(String::new());
                                tag_selected.set(0);
                                input_mode.set(InputMode::TagPicker);
                            }
                            KeyCode::Char('T') => {
                                status_message.set(apply(
                                    view_state,
                                    StateChange::ColumnFilter {
                                        id: TAGS.to_owned(),
                                        value: None,
                                    },
                                ));
                            }
                            KeyCode::Char('c') => {
                                apply(view_state, StateChange::ClearFilters);
                                cursor.set(0);
                                scroll_offset.set(0);
                            }
                            KeyCode::Char(d @ '1'..='9') => {
                                let nth = d as usize - '1' as usize;
                                if let Some(id) = column_ids.get(nth) {
                                    status_message
                                        .set(apply(view_state, StateChange::ToggleSort(id.clone())));
                                }
                            }
                            KeyCode::Char('f') => {
                                if let Some(record) = current {
                                    let chips = registry
                                        .read()
                                        .get(TAGS)
                                        .map(|col| {
                                            col.render_cell(record, &RenderContext::default())
                                                .chip_list()
                                                .to_vec()
                                        })
                                        .unwrap_or_default();
                                    if !chips.is_empty() {
                                        let idx = chip_cursor.get() % chips.len();
                                        chip_cursor.set(idx + 1);
                                        status_message.set(apply(
                                            view_state,
                                            chips[idx].on_select.clone(),
                                        ));
                                        cursor.set(0);
                                        scroll_offset.set(0);
                                    }
                                }
                            }
                            KeyCode::Enter => {
                                let target =
                                    current.and_then(|r| group_target(&registry.read(), r));
                                if let Some(target) = target {
                                    tracing::debug!("view: entering group {target:?}");
                                    group.set(target);
                                    listing.set(ListingData::default());
                                    needs_fetch.set(true);
                                    cursor.set(0);
                                    scroll_offset.set(0);
                                }
                            }
                            KeyCode::Backspace => {
                                if !group.read().is_empty() {
                                    group.set(String::new());
                                    listing.set(ListingData::default());
                                    needs_fetch.set(true);
                                    cursor.set(0);
                                    scroll_offset.set(0);
                                }
                            }
                            KeyCode::Char(ch @ ('s' | 'x' | 'R')) => {
                                let kind = match ch {
                                    's' => ActionKind::Start,
                                    'x' => ActionKind::Stop,
                                    _ => ActionKind::Retry,
                                };
                                status_message.set(send_action(
                                    current,
                                    kind,
                                    engine_for_keys.as_ref(),
                                    &event_tx_for_keys,
                                ));
                            }
                            _ => {}
                        }
                    }
                }
            }
            _ => {}
        }
    });

    // -----------------------------------------------------------------------
    // Build rendered components
    // -----------------------------------------------------------------------

    let ctx = RenderContext {
        group: group.read().clone(),
    };
    let empty_message = if data.loading {
        "Loading workflows\u{2026}"
    } else if state_snapshot.global_filter().is_empty()
        && state_snapshot.column_filters().is_empty()
    {
        "No workflows found"
    } else {
        "No workflows match the current filters"
    };
    let rendered_table = RenderedTable::build(&TableBuildConfig {
        registry: &registry_ref,
        headers: &headers,
        rows: &rows,
        ctx: &ctx,
        cursor: cursor.get(),
        scroll_offset: scroll_offset.get(),
        visible_rows,
        hidden_columns: Some(&hidden),
        width_overrides: widths,
        total_width: props.width,
        depth,
        theme: &theme,
        show_separator: props.show_separator,
        empty_message: Some(empty_message),
    });

    let rendered_text_input = match *input_mode.read() {
        InputMode::Search => Some(RenderedTextInput::build(
            "/",
            state_snapshot.global_filter(),
            depth,
            &theme,
        )),
        InputMode::TagPicker => Some(RenderedTextInput::build_with_suggestions(
            "tag:",
            &tag_query.read(),
            depth,
            &theme,
            &tag_matches,
            Some(tag_selected.get()),
        )),
        InputMode::Normal => None,
    };

    let context_text = if let Some(ref status) = *status_message.read() {
        status.clone()
    } else if data.loading {
        "Fetching workflows\u{2026}".to_owned()
    } else if let Some(ref err) = data.error {
        format!("Error: {err}")
    } else {
        let cursor_pos = if total_rows > 0 { cursor.get() + 1 } else { 0 };
        format!("Row {cursor_pos}/{total_rows} (of {})", data.records.len())
    };

    let rendered_footer = RenderedFooter::build(
        footer::format_scope(&group.read()),
        context_text,
        footer::format_filters(&state_snapshot),
        footer::format_updated_ago(last_fetch.get()),
        depth,
        &theme,
    );

    let width = u32::from(props.width);
    let height = u32::from(props.height);

    element! {
        View(flex_direction: FlexDirection::Column, width, height) {
            View(flex_grow: 1.0, flex_direction: FlexDirection::Column, overflow: Overflow::Hidden) {
                ScrollableTable(table: rendered_table)
            }
            TextInput(input: rendered_text_input)
            Footer(footer: rendered_footer)
        }
    }
    .into_any()
}

// ---------------------------------------------------------------------------
// Action dispatch (used in keyboard handler)
// ---------------------------------------------------------------------------

/// Send a row action for `record` if its control is enabled.
///
/// Returns the status line to show.
fn send_action(
    record: Option<&Record>,
    kind: ActionKind,
    engine: Option<&EngineHandle>,
    reply_tx: &std::sync::mpsc::Sender<Event>,
) -> Option<String> {
    let Some((record, workflow)) = record.and_then(|r| r.as_workflow().map(|w| (r, w))) else {
        return Some(format!("{} applies to workflows only", kind.label()));
    };
    let enabled = available_actions(workflow)
        .iter()
        .any(|a| a.kind == kind && a.enabled);
    let name = display_name(record).to_owned();
    if !enabled {
        return Some(format!("cannot {} {name} now", kind.label()));
    }
    let eng = engine?;
    let request_id = workflow
        .status
        .as_ref()
        .map(|s| s.request_id.clone())
        .unwrap_or_default();
    tracing::info!("view: {} {name}", kind.label());
    eng.send(Request::for_action(
        kind,
        workflow.file.clone(),
        request_id,
        reply_tx.clone(),
    ));
    Some(format!("{} requested for {name}", kind.label()))
}

/// Group a row leads into: the `group` parameter of its name link.
fn group_target(registry: &ColumnRegistry, record: &Record) -> Option<String> {
    if !matches!(record, Record::Group(_)) {
        return None;
    }
    let cell = registry
        .get(NAME)
        .ok()?
        .render_cell(record, &RenderContext::default());
    group_from_link(cell.href()?)
}

/// Column ids in the order the number keys address them.
pub(crate) fn sort_key_targets(registry: &ColumnRegistry, hidden: &HashSet<String>) -> Vec<String> {
    visible_columns(registry, Some(hidden))
        .iter()
        .map(|c| c.id.clone())
        .collect()
}
