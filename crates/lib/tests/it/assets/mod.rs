//! Asset integration tests
//!
//! Background uploads against the size ceiling, the custom style sheet, and
//! the deck summary shown by the dashboard.

mod deck;
