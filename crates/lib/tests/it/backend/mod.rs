//! Storage backend integration tests

mod in_memory;
mod save_load;
