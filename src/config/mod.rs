pub mod app_config;
pub mod model;

pub use app_config::{load_config, load_config_from};
pub use model::ServiceConfig;
