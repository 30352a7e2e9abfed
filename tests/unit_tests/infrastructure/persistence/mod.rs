mod in_memory_history_store_test;
mod pg_pool_test;
