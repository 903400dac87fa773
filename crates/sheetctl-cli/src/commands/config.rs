//! Configuration commands.

use std::io::Write;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration.
pub fn dump<W: Write>(config: &ClientConfig, output: &mut W) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    writeln!(output, "# config.toml ({})", ClientConfig::default_path().display())?;
    write!(output, "{}", toml_str)?;
    Ok(())
}

/// Show the configuration file path.
pub fn path<W: Write>(output: &mut W) -> ClientResult<()> {
    writeln!(output, "config: {}", ClientConfig::default_path().display())?;
    Ok(())
}
