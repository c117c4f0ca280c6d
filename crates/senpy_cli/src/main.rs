//! Command-line host for the built-in plugins.
//!
//! Reads one JSON entry from stdin, runs `maxSentiment` with the given raw
//! parameters (`max=true`, `maximum=yes`) and prints the resulting entries.

use clap::Parser;
use log::info;
use senpy_core::{
    builtin_registry, default_log_level, init_logging, Entry, PluginError, MAX_SENTIMENT_ID,
};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

/// Runs the maxSentiment plugin over one entry read from stdin
#[derive(Parser, Debug)]
#[command(name = "senpy")]
#[command(version)]
#[command(about = "Reduce an entry's emotion set to its strongest emotion")]
struct Cli {
    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, requires = "log_dir")]
    log_level: Option<String>,

    /// Plugin parameters as key=value, e.g. `max=true`
    #[arg(value_parser = parse_param)]
    params: Vec<(String, String)>,
}

impl Cli {
    fn raw_params(&self) -> Map<String, Value> {
        self.params
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect()
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("parameter name is empty in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("senpy: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        init_logging(&level, &log_dir.to_string_lossy())?;
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|err| format!("failed to read stdin: {err}"))?;
    let entry: Entry =
        serde_json::from_str(&input).map_err(|err| format!("invalid entry JSON: {err}"))?;

    let outputs = analyse(entry, &cli.raw_params()).map_err(|err| err.to_string())?;
    let rendered = serde_json::to_string_pretty(&outputs)
        .map_err(|err| format!("failed to render output: {err}"))?;
    println!("{rendered}");
    Ok(())
}

fn analyse(entry: Entry, params: &Map<String, Value>) -> Result<Vec<Entry>, PluginError> {
    let mut registry = builtin_registry()?;
    registry.activate(MAX_SENTIMENT_ID)?;
    let outputs = registry.analyse(MAX_SENTIMENT_ID, entry, params);
    registry.deactivate_all()?;
    info!("event=cli_run module=cli status=done plugin={MAX_SENTIMENT_ID}");
    outputs
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use serde_json::Value;
    use std::path::Path;

    #[test]
    fn parses_params_and_log_options() {
        let cli = Cli::try_parse_from(["senpy", "--log-dir", "/tmp/logs", "maximum=true"]).unwrap();
        assert_eq!(cli.log_dir.as_deref(), Some(Path::new("/tmp/logs")));
        assert_eq!(
            cli.raw_params().get("maximum"),
            Some(&Value::String("true".to_string()))
        );
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let cli = Cli::try_parse_from(["senpy", "note=a=b"]).unwrap();
        assert_eq!(cli.params, vec![("note".to_string(), "a=b".to_string())]);
    }

    #[test]
    fn rejects_bare_words_and_missing_values() {
        assert!(Cli::try_parse_from(["senpy", "max"]).is_err());
        assert!(Cli::try_parse_from(["senpy", "=true"]).is_err());
        assert!(Cli::try_parse_from(["senpy", "--log-dir"]).is_err());
        assert!(Cli::try_parse_from(["senpy", "--log-level", "info"]).is_err());
    }
}
