use figment::{
    Figment,
    providers::{Format, Yaml},
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::time::Duration;

fn default_client_id() -> String {
    "client_0".to_owned()
}
fn default_controller_addrs() -> String {
    "127.0.0.1:9090".to_owned()
}
fn default_chunk_size() -> usize {
    64 * 1024
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_owned()
}
fn default_log_base() -> String {
    "logs".to_owned()
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_controller_addrs")]
    pub controller_addrs: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_base")]
    pub log_base: String,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    let env = std::env::var("ENV").unwrap_or_else(|_| "default".to_owned());
    let config_file_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| format!("./client/config/{}.yaml", env));
    println!("Reading config from file : {config_file_path}");
    Figment::new()
        .merge(Yaml::file(config_file_path))
        .extract()
        .unwrap()
});
