pub mod comment;
pub mod post;
pub mod user;

pub use comment::*;
pub use post::*;
pub use user::*;

use chrono::Utc;

/// ISO-8601 with millisecond precision, always UTC with a `Z` suffix.
/// Fixed-width, so lexicographic order equals chronological order.
pub(crate) const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub(crate) fn timestamp_now() -> String {
    Utc::now().format(TIME_FORMAT).to_string()
}
