//! API endpoint implementations.

mod health;
mod routines;

pub use health::HealthApi;
pub use routines::{RoutinesApi, routines_path};
