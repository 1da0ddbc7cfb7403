//! Flutter bridge for the DailyToDo core.

pub mod api;
