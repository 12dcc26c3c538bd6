//! A terminal dashboard for one Git repository.
//!
//! [`api`] defines the request/response contract with a repository backend,
//! [`git`] implements it with `git2`, [`model`] holds the pure transforms
//! (diff classification, lineage layout, tree flattening), [`views`] and
//! [`dashboard`] keep the panels consistent, and [`ui`] runs the terminal.

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod git;
pub mod logging;
pub mod model;
pub mod ui;
pub mod views;
