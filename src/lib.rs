//! Core library for the ordersync command line application.
//!
//! The library exposes the work-order reconciliation pipeline that powers the
//! command-line trigger as well as the test suite. The modules are structured
//! to keep responsibilities narrow and composable: IO adapters live under
//! [`io`], data representations inside [`model`], the row-to-order logic in
//! [`normalize`] and [`aggregate`], costing in [`extract`] and [`catalog`],
//! and the orchestration under [`sync`].

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod io;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod sync;

pub use error::{Result, SyncError};
