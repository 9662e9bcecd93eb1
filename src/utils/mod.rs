/// TOML configuration file support (`deepsearch.toml`).
pub mod toml_config;
