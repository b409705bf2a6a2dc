pub mod context;
pub mod error;
pub mod id;
pub mod record;
pub mod sanitize;
pub mod time;

pub use context::RequestContext;
pub use error::{CoreError, Result};
pub use id::{generate_id, sanitize_id, sanitize_ids, validate_id};
pub use record::{ID_KEY, Record, SORT_TITLE_KEY, TITLE_KEY, TYPE_KEY, record_id};
pub use time::{sanitize_date, sanitize_time};
