//! Descriptive statistics over uploaded tabular files.
//!
//! A file is stored through [`upload::store_upload`], described once into a
//! [`session::Session`], and then queried with short commands such as
//! `"mean of age"` via [`data::interpret`] or [`data::analyze_file`].

pub mod config;
pub mod data;
pub mod session;
pub mod upload;
