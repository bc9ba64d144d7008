//! hubstats-hub - client for the model Hub listing API
//!
//! Builds listing queries, follows `Link: rel="next"` pagination, and
//! flattens raw model objects into [`hubstats_core::ModelRecord`] rows.

pub mod author;
pub mod link;
pub mod normalize;
pub mod paginate;

pub use author::{author_stats, downloads_all_time, list_author_models};
pub use link::{Cursor, parse_link_header};
pub use normalize::{Normalized, normalize, normalize_all};
pub use paginate::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, ModelQuery, Page, Pages, paginate_all};

/// Public Hub API root
pub const DEFAULT_BASE_URL: &str = "https://huggingface.co/api";
