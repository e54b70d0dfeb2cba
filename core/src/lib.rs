//! City Tracker core: a capacity/population counter with clamping,
//! bounded undo and a persisted snapshot.

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod flash;
pub mod history;
pub mod rules;
pub mod snapshot;
pub mod store;
pub mod types;
