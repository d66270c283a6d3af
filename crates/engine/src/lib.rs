//! GAT Engine library.
//!
//! Server-side data-collection services for published scenario courses.
//!
//! ## Structure
//!
//! - `use_cases/` - Data set lifecycle, exports and reports
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `config` - Environment configuration
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
