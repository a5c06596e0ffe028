// Row pipeline: column registry + view state -> ordered visible rows.
// Free of any UI dependency; the components layer renders its output.

pub mod column;
pub mod pipeline;
pub mod registry;
pub mod state;

pub use column::{
    ActionKind, Cell, CellContent, Chip, ColumnDescriptor, RenderContext, RowAction, Tone,
};
pub use pipeline::{
    HeaderDescriptor, SortIndicator, VisibleRow, compute_visible_rows, header_descriptors,
    tag_options,
};
pub use registry::{ColumnRegistry, RegistryError};
pub use state::{LookupPolicy, SortDirection, SortSpec, StateChange, ViewState};
