//! # UI Module
//!
//! Styling shared by the dashboard views. Chart widgets live in `charts`.

pub mod styles;
