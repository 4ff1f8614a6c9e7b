mod booker_configuration;
mod data;
mod error;
mod http_client;
mod util;

pub mod booking;
pub mod checks;
pub mod injection;
pub mod json_path;
pub mod preflight;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod session;
pub mod step;
pub mod stub_server;
pub mod suite;

#[cfg(test)]
mod testing;

pub use booker_codegen::stub_booker_test;
pub use booker_configuration::{BookerConfiguration, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use data::{RequestData, ResponseData};
pub use error::{Error, FailureKind};
pub use http_client::{HttpClient, ReqwestHttpClient};
