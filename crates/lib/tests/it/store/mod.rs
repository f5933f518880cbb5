//! KeyValueStore integration tests
//!
//! Reads, writes, typed helpers and change notification, within one context
//! and across contexts sharing a storage area.

mod key_value;
