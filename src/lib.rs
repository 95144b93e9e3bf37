pub mod logging;
pub mod error;
pub mod utils;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use error::AppError;
