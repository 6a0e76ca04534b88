//! Route modules for the API server
//!
//! - screens: per-screen views, view state commands and row actions
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration, exports and shared lookups
//! - api.rs: view and view state endpoints
//! - actions.rs: record and row action endpoints

pub mod screens;
