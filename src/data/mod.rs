//! Data layer: loading, command interpretation, and exports.
//!
//! Architecture:
//! ```text
//!  .csv / .xlsx / .xls / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (typed columns)
//!   └──────────┘
//!        │
//!        ├──────────────────────────────┐
//!        ▼                              ▼
//!   ┌──────────────────────┐      ┌─────────────────────────┐
//!   │ command + aggregate   │      │ info / summary / report  │
//!   └──────────────────────┘      │ histogram                │
//!     "<op> of <column>"          └─────────────────────────┘
//!        → Outcome
//! ```
//!
//! Nothing here keeps state: every request reloads the file.

pub mod aggregate;
pub mod command;
pub mod error;
pub mod histogram;
pub mod info;
pub mod loader;
pub mod model;
pub mod report;
pub mod summary;

pub use aggregate::{analyze_file, evaluate, interpret, AggregateResult, ColumnStats, Outcome, StatValue};
pub use command::{Command, Operation, Request};
pub use error::{CommandError, LoadError};
pub use loader::load_file;
pub use model::{CellValue, Column, ColumnType, Dataset};
