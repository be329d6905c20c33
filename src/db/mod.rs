//! Durable storage: store contracts, Postgres implementation, cache layer

pub mod cache;
pub mod postgres;
pub mod store;

pub use cache::RecurringScheduleCache;
pub use postgres::PostgresStore;
pub use store::{ExecutionHistoryStore, RetryQueue, ScheduleStore, StopLossStore};
