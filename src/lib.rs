pub mod api;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod optimizer;
pub mod planner;
pub mod prices;
pub mod state;
pub mod telemetry;
