use cachedns_domain::{CliOverrides, Config};

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    Config::load(path, overrides).map_err(|e| anyhow::anyhow!("Configuration error: {}", e))
}
