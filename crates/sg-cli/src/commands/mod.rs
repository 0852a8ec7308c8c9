//! Command implementations

mod config;
mod list;
mod rm;

pub use config::{config_init, config_path, config_show};
pub use list::{
    containers_command, networks_command, nodes_command, ping_command, services_command,
    tasks_command,
};
pub use rm::rm_command;

/// Parse a `key=value` filter argument
///
/// Only the first `=` splits, so values may contain `=` (e.g. labels).
pub fn parse_filter(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", arg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("name=web").unwrap(),
            ("name".to_string(), "web".to_string())
        );
        assert_eq!(
            parse_filter("label=com.example.tier=front").unwrap(),
            ("label".to_string(), "com.example.tier=front".to_string())
        );
        assert_eq!(
            parse_filter("dangling=").unwrap(),
            ("dangling".to_string(), String::new())
        );
        assert!(parse_filter("web").is_err());
        assert!(parse_filter("=web").is_err());
    }
}
