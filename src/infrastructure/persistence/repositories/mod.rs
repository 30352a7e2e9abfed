mod in_memory_history_store;
mod pg_history_store;

pub use in_memory_history_store::InMemoryHistoryStore;
pub use pg_history_store::PgHistoryStore;
