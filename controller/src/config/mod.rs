use figment::{
    Figment,
    providers::{Format, Yaml},
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::time::Duration;

fn default_controller_id() -> String {
    "controller_0".to_owned()
}
fn default_listen_addrs() -> String {
    "0.0.0.0:9090".to_owned()
}
fn default_replication_factor() -> usize {
    3
}
fn default_minor_heartbeat_secs() -> u64 {
    5
}
fn default_grace_period_secs() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_owned()
}
fn default_log_base() -> String {
    "logs".to_owned()
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_controller_id")]
    pub controller_id: String,
    #[serde(default = "default_listen_addrs")]
    pub listen_addrs: String,
    #[serde(default = "default_replication_factor")]
    pub replication_factor: usize,
    // must match the chunk servers' minor interval, it anchors expiry
    #[serde(default = "default_minor_heartbeat_secs")]
    pub minor_heartbeat_secs: u64,
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_base")]
    pub log_base: String,
}

impl Config {
    /// A chunk server is expired once it has been silent for longer than one
    /// minor interval plus the grace period.
    pub fn expiry_threshold(&self) -> Duration {
        Duration::from_secs(self.minor_heartbeat_secs + self.grace_period_secs)
    }
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    let env = std::env::var("ENV").unwrap_or_else(|_| "default".to_owned());
    let config_file_path = std::env::var("CONFIG_PATH")
        .unwrap_or_else(|_| format!("./controller/config/{}.yaml", env));
    println!("Reading config from file : {config_file_path}");
    Figment::new()
        .merge(Yaml::file(config_file_path))
        .extract()
        .unwrap()
});
