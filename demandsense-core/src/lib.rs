//! Core library for the `demandsense` dashboard.
//!
//! This crate defines:
//! - Configuration & secrets handling
//! - Weather sources (simulated and live)
//! - Inventory loading with a time-boxed snapshot
//! - The weather-driven demand rule engine
//! - The dashboard projection of a demand report
//!
//! It is used by `demandsense-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod model;
pub mod session;
pub mod weather;

pub use config::Config;
pub use dashboard::DashboardView;
pub use engine::{DemandEngine, RuleSet};
pub use error::{InventoryError, WeatherError};
pub use inventory::{InventorySource, InventoryStore};
pub use model::{DemandReport, DemandRow, InventoryRow, MarketSignal, RestockStatus, WeatherReading};
pub use session::{SessionCache, SessionId};
pub use weather::{Scenario, SimCondition, SourceMode, WeatherSource};
