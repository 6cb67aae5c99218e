use figment::{
    Figment,
    providers::{Format, Yaml},
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::time::Duration;

fn default_chunkserver_id() -> String {
    "chunkserver_0".to_owned()
}
fn default_controller_addrs() -> String {
    "127.0.0.1:9090".to_owned()
}
fn default_listen_addrs() -> String {
    "0.0.0.0:9190".to_owned()
}
fn default_external_addrs() -> String {
    "127.0.0.1:9190".to_owned()
}
fn default_storage_root() -> String {
    "./chunks".to_owned()
}
fn default_slice_size() -> usize {
    8 * 1024
}
fn default_minor_heartbeat_secs() -> u64 {
    5
}
fn default_major_every_minor_ticks() -> u64 {
    10
}
fn default_send_timeout_secs() -> u64 {
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
    #[serde(default = "default_chunkserver_id")]
    pub chunkserver_id: String,
    #[serde(default = "default_controller_addrs")]
    pub controller_addrs: String,
    #[serde(default = "default_listen_addrs")]
    pub listen_addrs: String,
    // the address peers and the controller reach this server on, used as
    // this server's identity in heartbeats and replica chains
    #[serde(default = "default_external_addrs")]
    pub external_addrs: String,
    #[serde(default = "default_storage_root")]
    pub storage_root: String,
    #[serde(default = "default_slice_size")]
    pub slice_size: usize,
    #[serde(default = "default_minor_heartbeat_secs")]
    pub minor_heartbeat_secs: u64,
    // one minor tick in every N is replaced by a full inventory report, so
    // the major heartbeat period is N times the minor one
    #[serde(default = "default_major_every_minor_ticks")]
    pub major_every_minor_ticks: u64,
    // bounds heartbeat sends and chain forwards alike
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_base")]
    pub log_base: String,
}

impl Config {
    pub fn minor_heartbeat_period(&self) -> Duration {
        Duration::from_secs(self.minor_heartbeat_secs)
    }
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    let env = std::env::var("ENV").unwrap_or_else(|_| "default".to_owned());
    let config_file_path = std::env::var("CONFIG_PATH")
        .unwrap_or_else(|_| format!("./chunkserver/config/{}.yaml", env));
    println!("Reading config from file : {config_file_path}");
    Figment::new()
        .merge(Yaml::file(config_file_path))
        .extract()
        .unwrap()
});
