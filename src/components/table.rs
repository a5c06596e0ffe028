use std::collections::{HashMap, HashSet};

use iocraft::prelude::*;

use crate::color::ColorDepth;
use crate::table::{ColumnDescriptor, ColumnRegistry, HeaderDescriptor, RenderContext, VisibleRow};
use crate::theme::ResolvedTheme;

// ---------------------------------------------------------------------------
// Pre-rendered table data (all owned)
// ---------------------------------------------------------------------------

/// Pre-render table data into fully owned structures that can be passed
/// into the `element!` macro without lifetime issues.
pub struct RenderedTable {
    pub header_cells: Vec<HeaderCell>,
    pub body_rows: Vec<RenderedRow>,
    pub total_width: u32,
    pub show_separator: bool,
    pub header_fg: Color,
    pub border_fg: Color,
    /// Message to display when there are no rows.
    pub empty_message: Option<String>,
}

pub struct HeaderCell {
    pub text: String,
    pub width: u32,
}

pub struct RenderedRow {
    pub key: usize,
    pub bg: Option<Color>,
    pub cells: Vec<RenderedCell>,
}

pub struct RenderedCell {
    pub text: String,
    pub fg: Color,
    pub weight: Weight,
    pub width: u32,
}

/// Configuration for building a `RenderedTable`.
pub struct TableBuildConfig<'a> {
    pub registry: &'a ColumnRegistry,
    pub headers: &'a [HeaderDescriptor],
    pub rows: &'a [VisibleRow<'a>],
    pub ctx: &'a RenderContext,
    pub cursor: usize,
    pub scroll_offset: usize,
    pub visible_rows: usize,
    pub hidden_columns: Option<&'a HashSet<String>>,
    pub width_overrides: Option<&'a HashMap<String, u16>>,
    pub total_width: u16,
    pub depth: ColorDepth,
    pub theme: &'a ResolvedTheme,
    pub show_separator: bool,
    /// Message to show when rows are empty.
    pub empty_message: Option<&'a str>,
}

/// Columns left after removing hidden ones, in registry order.
pub fn visible_columns<'a>(
    registry: &'a ColumnRegistry,
    hidden: Option<&HashSet<String>>,
) -> Vec<&'a ColumnDescriptor> {
    registry
        .iter()
        .filter(|c| hidden.is_none_or(|h| !h.contains(&c.id)))
        .collect()
}

impl RenderedTable {
    /// Build a `RenderedTable` from a configuration.
    pub fn build(cfg: &TableBuildConfig<'_>) -> Self {
        let theme = cfg.theme;
        let depth = cfg.depth;
        let columns = visible_columns(cfg.registry, cfg.hidden_columns);
        let col_widths = compute_column_widths(&columns, cfg.width_overrides, cfg.total_width);

        let header_fg = theme.text_primary.to_crossterm_color(depth);
        let border_fg = theme.border_faint.to_crossterm_color(depth);
        let selected_bg = theme.bg_selected.to_crossterm_color(depth);

        let header_cells: Vec<HeaderCell> = columns
            .iter()
            .zip(col_widths.iter())
            .map(|(col, &w)| {
                let indicator = cfg
                    .headers
                    .iter()
                    .find(|h| h.id == col.id)
                    .map_or("", |h| h.indicator.symbol());
                HeaderCell {
                    text: format!("{}{indicator}", col.header),
                    width: u32::from(w),
                }
            })
            .collect();

        let end = (cfg.scroll_offset + cfg.visible_rows).min(cfg.rows.len());
        let visible_slice = if cfg.scroll_offset < cfg.rows.len() {
            &cfg.rows[cfg.scroll_offset..end]
        } else {
            &[]
        };

        let body_rows: Vec<RenderedRow> = visible_slice
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let absolute_idx = cfg.scroll_offset + i;
                let bg = (absolute_idx == cfg.cursor).then_some(selected_bg);
                let cells = columns
                    .iter()
                    .zip(col_widths.iter())
                    .map(|(col, &w)| {
                        let cell = col.render_cell(row.record, cfg.ctx);
                        RenderedCell {
                            text: cell.text(),
                            fg: theme.tone_color(cell.tone).to_crossterm_color(depth),
                            weight: if cell.bold { Weight::Bold } else { Weight::Normal },
                            width: u32::from(w),
                        }
                    })
                    .collect();
                RenderedRow {
                    key: row.index,
                    bg,
                    cells,
                }
            })
            .collect();

        let empty_message = if cfg.rows.is_empty() {
            cfg.empty_message.map(String::from)
        } else {
            None
        };

        Self {
            header_cells,
            body_rows,
            total_width: u32::from(cfg.total_width),
            show_separator: cfg.show_separator,
            header_fg,
            border_fg,
            empty_message,
        }
    }
}

// ---------------------------------------------------------------------------
// ScrollableTable component
// ---------------------------------------------------------------------------

#[derive(Default, Props)]
pub struct ScrollableTableProps {
    /// Pre-rendered table data.
    pub table: Option<RenderedTable>,
}

#[component]
pub fn ScrollableTable(props: &mut ScrollableTableProps) -> impl Into<AnyElement<'static>> {
    let Some(table) = props.table.take() else {
        return element! { View }.into_any();
    };

    element! {
        View(flex_direction: FlexDirection::Column, width: table.total_width) {
            // Header row
            View(
                border_style: if table.show_separator { BorderStyle::Single } else { BorderStyle::None },
                border_edges: Edges::Bottom,
                border_color: table.border_fg,
            ) {
                #(table.header_cells.into_iter().enumerate().map(|(i, hc)| {
                    element! {
                        View(key: i, width: hc.width) {
                            Text(
                                content: hc.text,
                                weight: Weight::Bold,
                                color: table.header_fg,
                                wrap: TextWrap::NoWrap,
                            )
                        }
                    }
                }))
            }

            // Empty-state message or body rows
            #(table.empty_message.into_iter().map(|msg| {
                element! {
                    View(padding_top: 1, padding_left: 2) {
                        Text(
                            content: msg,
                            color: Color::DarkGrey,
                        )
                    }
                }
            }))
            #(table.body_rows.into_iter().map(|row| {
                element! {
                    View(key: row.key, background_color: row.bg) {
                        #(row.cells.into_iter().enumerate().map(|(ci, cell)| {
                            element! {
                                View(key: ci, width: cell.width) {
                                    Text(
                                        content: cell.text,
                                        color: cell.fg,
                                        weight: cell.weight,
                                        wrap: TextWrap::NoWrap,
                                    )
                                }
                            }
                        }))
                    }
                }
            }))
        }
    }
    .into_any()
}

// ---------------------------------------------------------------------------
// Column width computation
// ---------------------------------------------------------------------------

/// Split `total` across columns: fixed overrides first, the remainder shared
/// in proportion to each column's default width.
pub(crate) fn compute_column_widths(
    columns: &[&ColumnDescriptor],
    overrides: Option<&HashMap<String, u16>>,
    total: u16,
) -> Vec<u16> {
    let fixed: Vec<Option<u16>> = columns
        .iter()
        .map(|c| overrides.and_then(|o| o.get(&c.id)).copied())
        .collect();

    let fixed_total = fixed
        .iter()
        .flatten()
        .fold(0u16, |acc, w| acc.saturating_add(*w));
    let remaining = total.saturating_sub(fixed_total);
    let flexible_pct: f32 = columns
        .iter()
        .zip(&fixed)
        .filter(|(_, w)| w.is_none())
        .map(|(c, _)| c.default_width_pct)
        .sum();

    columns
        .iter()
        .zip(&fixed)
        .map(|(col, w)| {
            w.unwrap_or_else(|| {
                #[allow(clippy::cast_precision_loss)]
                let ratio = if flexible_pct > 0.0 {
                    col.default_width_pct / flexible_pct
                } else {
                    1.0 / columns.len() as f32
                };
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let width = (f32::from(remaining) * ratio).round() as u16;
                width
            })
        })
        .collect()
}
