use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// `imagePath` of a student without a custom photo. Never deleted from storage.
pub const DEFAULT_IMAGE: &str = "default.jpg";
