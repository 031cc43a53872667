// === PUBLIC CONTRACT ===
pub mod contract;

// Re-export the public contract components
pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::AttendanceLog;

// === INTERNAL MODULES ===
// Exposed for integration tests; only `contract` and `module` are stable.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
