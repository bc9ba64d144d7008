//! hubstats-table: persisted popularity table and derived outputs
//!
//! The stats table is a flat CSV keyed by `(date, model_id)`. New fetches
//! are upserted into it; deltas, summaries and the README section are
//! computed from a loaded snapshot.

pub mod delta;
pub mod report;
pub mod summary;
pub mod table;

pub use delta::{
    DeltaRow, ModelDeltaSummary, compute_deltas, deltas_path, summarize_by_model, totals_by_date,
    write_deltas,
};
pub use report::{MARKER, MissingMarkerError, render_markdown, update_report, update_report_file};
pub use summary::{AuthorTotal, FetchSummary};
pub use table::{StatsTable, upsert};
