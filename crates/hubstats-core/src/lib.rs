//! hubstats-core - shared infrastructure for Hub popularity tracking
//!
//! Provides the model snapshot record, a blocking HTTP transport, the
//! retrying JSON fetcher, and logging/progress setup.

pub mod error;
pub mod fetch;
pub mod http;
pub mod logging;
pub mod progress;
pub mod record;
pub mod retry;

// Re-exports for convenience
pub use error::FetchError;
pub use fetch::{Fetch, FetchResult, Fetcher};
pub use http::{HttpResponse, HttpSettings, HttpTransport, Transport};
pub use logging::{Verbosity, init_logging};
pub use progress::{ProgressContext, fmt_num};
pub use record::{ModelRecord, author_of};
pub use retry::{RetryPolicy, RetryState, Sleeper, ThreadSleeper};
