//! Clap command tree and its mapping onto [`GatewayConfig`].

use std::path::Path;

use clap::{value_parser, Arg, ArgMatches, Command};

use crate::config::{ConfigError, GatewayConfig};

/// Build the CLI command tree.
pub fn build_cli() -> Command {
    Command::new("docgate")
        .about("HTTP gateway for get/set/del operations on a document store")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to docgate.toml"),
        )
        .arg(
            Arg::new("listen")
                .long("listen")
                .help("Listen address (default: 0.0.0.0:8080)"),
        )
        .arg(
            Arg::new("store-url")
                .long("store-url")
                .help("Document store: memory: or sqlite:<path> (default: memory:)"),
        )
        .arg(
            Arg::new("collection")
                .long("collection")
                .help("Default collection (default: datasets)"),
        )
        .arg(
            Arg::new("max-body-bytes")
                .long("max-body-bytes")
                .help("Largest accepted request body in bytes")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("retry-backoff-ms")
                .long("retry-backoff-ms")
                .help("Wait before retrying a failed store connection")
                .value_parser(value_parser!(u64)),
        )
        .subcommand(Command::new("print-config").about("Print a commented default docgate.toml"))
}

/// Resolve the effective configuration: file first, then flag overrides.
pub fn config_from_matches(matches: &ArgMatches) -> Result<GatewayConfig, ConfigError> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => GatewayConfig::load(Path::new(path))?,
        None => GatewayConfig::default(),
    };

    if let Some(listen) = matches.get_one::<String>("listen") {
        config.listen = listen.clone();
    }
    if let Some(url) = matches.get_one::<String>("store-url") {
        config.store_url = url.clone();
    }
    if let Some(collection) = matches.get_one::<String>("collection") {
        config.default_collection = collection.clone();
    }
    if let Some(limit) = matches.get_one::<usize>("max-body-bytes") {
        config.max_body_bytes = *limit;
    }
    if let Some(backoff) = matches.get_one::<u64>("retry-backoff-ms") {
        config.retry_backoff_ms = *backoff;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_defaults() {
        let matches = build_cli().get_matches_from([
            "docgate",
            "--listen",
            "127.0.0.1:9000",
            "--store-url",
            "sqlite:x.db",
            "--max-body-bytes",
            "2048",
        ]);
        let config = config_from_matches(&matches).unwrap();
        assert_eq!(config.listen, "127.0.0.1:9000");
        assert_eq!(config.store_url, "sqlite:x.db");
        assert_eq!(config.max_body_bytes, 2048);
        assert_eq!(config.default_collection, "datasets");
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_collection = \"from_file\"\nretry_backoff_ms = 10").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let matches =
            build_cli().get_matches_from(["docgate", "--config", &path, "--retry-backoff-ms", "20"]);
        let config = config_from_matches(&matches).unwrap();
        assert_eq!(config.default_collection, "from_file");
        assert_eq!(config.retry_backoff_ms, 20);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let matches = build_cli().get_matches_from(["docgate", "--collection", ""]);
        assert!(config_from_matches(&matches).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli().debug_assert();
    }
}
