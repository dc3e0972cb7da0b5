//! docshelf: terminal client for a document management backend
//!
//! The [`dialog`] module holds the modal dialog registry that drives the
//! create/edit flows; [`api`] wraps the backend's REST endpoints.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod dialog;
pub mod ui;
pub mod utils;
