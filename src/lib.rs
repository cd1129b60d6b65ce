// Location Tracker - Core Library
// Exposes all modules for use in the TUI, the API server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod form;
pub mod performance;
pub mod store;
pub mod view;
pub mod workflow;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Settings;
pub use db::{
    Event, SqliteStore,
    load_locations_csv, load_sales_csv, setup_database,
    get_events_for_entity, count_sales,
};
pub use entities::{Location, LocationCategory, ParseCategoryError, Sale};
pub use error::{FormError, StoreError};
pub use form::LocationForm;
pub use performance::{aggregate, PerformanceCache, RankedLocation};
pub use store::{LocationStore, MemoryStore, Snapshot};
pub use view::{
    dashboard_route, LocationRow, LocationsView, RowAction, Screen, TableBody,
};
pub use workflow::{CrudWorkflowController, DeleteOutcome, DeleteState, FormState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
