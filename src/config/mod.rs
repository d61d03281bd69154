//! Configuration system
//!
//! TOML file (default `data/config.toml`) deserialized into [`Config`], with
//! every field defaulted so partial files are valid.

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{CacheConfig, ChartConfig, Config, ServerConfig};
pub use utils::{
    get_config_clone, is_config_initialized, load_config, load_config_from_path,
    read_config_file, reload_config_from_path, unknown_keys, with_config, CONFIG_FILE_PATH,
};
