use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use cmdspec::config::SpecFile;
use cmdspec::{Diagnostics, ParseError, ParsedArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

/// Parse a command line against a declarative spec file.
#[derive(Debug, Parser)]
#[command(name = "cmdspec", version)]
struct Cli {
    /// Spec file to load (default: ~/.config/cmdspec/spec.toml)
    #[arg(long, value_name = "FILE")]
    spec: Option<PathBuf>,

    /// Output format for the parsed values
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Diagnostic patterns, e.g. "parser,assign" or "all"
    #[arg(long, value_name = "PATTERNS")]
    debug: Option<String>,

    /// Tokens to parse, after `--`
    #[arg(last = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

fn init_tracing(diagnostics: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if diagnostics {
        if let Ok(directive) = "cmdspec::diag=trace".parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug.is_some());

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        let status = e.downcast_ref::<ParseError>().map_or(1, ParseError::exit_status);
        std::process::exit(status);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut file = match &cli.spec {
        Some(path) => SpecFile::load(path)?,
        None => SpecFile::load_default()?,
    };
    if let Some(patterns) = &cli.debug {
        file.debug
            .extend(Diagnostics::parse(patterns).patterns().iter().cloned());
    }
    let spec = file.build()?;

    let args = spec.parse(cli.tokens)?;
    let output = match cli.format {
        Format::Json => {
            let mut json =
                serde_json::to_string_pretty(&args).context("Failed to serialize result")?;
            json.push('\n');
            json
        }
        Format::Text => render_text(&args),
    };
    print!("{output}");
    Ok(())
}

fn render_text(args: &ParsedArgs) -> String {
    let mut out = String::new();
    for (name, value) in args.iter() {
        out.push_str(&format!("{name} = {value}\n"));
    }
    out.push_str(&format!("rest = {}\n", args.rest().join(" ")));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdspec::SpecBuilder;

    #[test]
    fn tokens_follow_the_separator() {
        let cli = Cli::try_parse_from(["cmdspec", "--format", "text", "--", "-v", "a"]).unwrap();
        assert_eq!(cli.format, Format::Text);
        assert_eq!(cli.tokens, ["-v", "a"]);
        assert!(cli.spec.is_none());
    }

    #[test]
    fn text_output_lists_every_name_and_the_rest() {
        let mut b = SpecBuilder::new("t");
        b.add_flag("-v", false, "verbose")
            .unwrap()
            .add_end_marker("--")
            .unwrap();
        let spec = b.finalize().unwrap();
        let args = spec.parse(["-v", "--", "x", "y"]).unwrap();
        let text = render_text(&args);
        assert!(text.contains("v = true\n"));
        assert!(text.contains("-v = true\n"));
        assert!(text.ends_with("rest = x y\n"));
    }
}
