pub mod classify;
pub mod model;

pub use classify::{Credentials, LatencyQuality, Performance};
pub use model::{ConnectivityTestResult, Details, TestStatus};
