// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::UsersModule;

pub mod config;
pub use config::UsersConfig;

// === INTERNAL MODULES ===
// Exposed for integration tests and the server binary; the contract above is the stable surface.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
