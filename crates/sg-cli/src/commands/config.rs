//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success, print_warning};
use sg_core::config;
use sg_core::{SshAuth, SshConfig};

fn resolve(config_path: Option<&PathBuf>) -> PathBuf {
    config_path
        .cloned()
        .unwrap_or_else(config::default_config_path)
}

/// Show current configuration
pub fn config_show(config_path: Option<&PathBuf>) -> Result<()> {
    let path = resolve(config_path);

    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Run 'swarmgate config init' to create one");
        return Ok(());
    }

    print_info(&format!("Configuration file: {:?}", path));
    println!();

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    println!("{}", content);

    Ok(())
}

/// Print the configuration file path
pub fn config_path(config_path: Option<&PathBuf>) {
    println!("{}", resolve(config_path).display());
}

/// Write a starter configuration file
pub fn config_init(config_path: Option<&PathBuf>, force: bool) -> Result<()> {
    let config_file = resolve(config_path);
    let config_dir = config_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_dir);

    if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
        print_success(&format!("Created config directory: {:?}", config_dir));
    }

    if config_file.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", config_file));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    std::fs::write(&config_file, default_config())
        .with_context(|| format!("Failed to write config file: {:?}", config_file))?;

    print_success(&format!("Created configuration file: {:?}", config_file));
    Ok(())
}

/// Starter configuration content
fn default_config() -> String {
    let defaults = SshConfig::default();
    let default_key = match &defaults.auth {
        SshAuth::KeyFile { path, .. } => path.display().to_string(),
        SshAuth::Agent => String::new(),
    };

    format!(
        r#"# swarmgate configuration

# Deadline for each daemon call, in seconds
# request_timeout = 30

# Without a [remote] section, DOCKER_HOST and DOCKER_API_VERSION are used

# [remote]
# SSH host of the manager node (host, host:port or [v6]:port)
# host = "manager.example.com"
# Daemon socket on that host
# socket_path = "/var/run/docker.sock"
# api_version = "1.41"

# [remote.ssh]
# user = "{user}"
# Seconds allowed for TCP connect plus authentication
# connect_timeout = 30
# keepalive_interval = 15

# [remote.ssh.auth]
# method = "key_file"
# path = "{key}"
# Or use the running ssh-agent:
# method = "agent"

# [remote.ssh.host_key]
# policy = "known_hosts"
# Or pin a fingerprint:
# policy = "fingerprint"
# fingerprint = "SHA256:..."
"#,
        user = defaults.user,
        key = default_key
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_core::ConfigFile;

    #[test]
    fn test_default_config_parses() {
        let config: ConfigFile = toml_parse(&default_config());
        assert!(config.remote.is_none());
        assert!(config.request_timeout.is_none());
    }

    fn toml_parse(content: &str) -> ConfigFile {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        config::load_config(&path).unwrap()
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        config_init(Some(&path), false).unwrap();
        assert!(path.exists());

        std::fs::write(&path, "request_timeout = 5\n").unwrap();
        config_init(Some(&path), false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "request_timeout = 5\n");

        config_init(Some(&path), true).unwrap();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .starts_with("# swarmgate configuration"));
    }
}
