//! Timezone resolution and tolerance-window matching primitives

pub mod resolver;
pub mod window;

pub use resolver::{local_date, minute_of_day};
pub use window::is_within_window;
