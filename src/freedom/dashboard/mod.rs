pub mod aggregate;
pub mod error;
pub mod export;
pub mod facets;
pub mod filter;
pub mod io;
pub mod model;
pub mod normalize;
pub mod present;
pub mod session;

pub use error::{DashboardError, Result};
