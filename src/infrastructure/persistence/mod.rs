mod pg_pool;
mod repositories;

pub use repositories::{InMemoryHistoryStore, PgHistoryStore};

pub use pg_pool::create_pool;
