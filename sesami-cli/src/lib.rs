pub mod config;
pub mod http;

pub use config::{Config, ConfigError, Overrides, init_config, sesami_home};
pub use http::ReqwestTransport;

