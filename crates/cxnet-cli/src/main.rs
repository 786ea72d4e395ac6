use cxnet_core::{Config, Engine, ImportedNetwork, ValidationReport};
use serde::Serialize;
use serde_json::Value;
use std::io::{Read, Write};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Cx(cxnet_core::Error),
    Json(serde_json::Error),
    Invalid(Box<ValidationReport>),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Cx(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Invalid(report) => {
                write!(f, "document has {} validation error(s)", report.errors.len())
            }
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<cxnet_core::Error> for CliError {
    fn from(value: cxnet_core::Error) -> Self {
        Self::Cx(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Command {
    #[default]
    Validate,
    Import,
    View,
    Export,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    out: Option<String>,
    pretty: bool,
    config: Option<String>,
    require_metadata: bool,
    verbose: bool,
}

fn usage() -> &'static str {
    "cxnet-cli\n\
\n\
USAGE:\n\
  cxnet-cli [validate] [--pretty] [--config <json>] [--require-metadata] [--verbose] [<path>|-]\n\
  cxnet-cli import [--pretty] [--config <json>] [--out <path>] [<path>|-]\n\
  cxnet-cli view [--pretty] [--config <json>] [--out <path>] [<path>|-]\n\
  cxnet-cli export [--pretty] [--config <json>] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - validate prints the validation report and exits with 3 when it contains errors.\n\
  - import prints every model built from the document; view prints only the resolved view.\n\
  - export imports the document and writes it back as normalized CX2.\n\
  - --config takes inline JSON merged over the defaults, e.g. '{\"validation\":{\"requireStatus\":true}}'.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "validate" => args.command = Command::Validate,
            "import" => args.command = Command::Import,
            "view" => args.command = Command::View,
            "export" => args.command = Command::Export,
            "--pretty" => args.pretty = true,
            "--require-metadata" => args.require_metadata = true,
            "--verbose" | "-v" => args.verbose = true,
            "--config" => {
                let Some(config) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(config.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    match out {
        None => std::io::stdout().lock().write_all(text.as_bytes())?,
        Some(path) => std::fs::write(path, text)?,
    }
    Ok(())
}

fn build_engine(args: &Args) -> Result<Engine, CliError> {
    let mut config = match args.config.as_deref() {
        Some(text) => Config::from_json_str(text)?,
        None => Config::empty_object(),
    };
    if args.require_metadata {
        config.set_value(cxnet_core::config::REQUIRE_METADATA, Value::Bool(true));
    }
    Ok(Engine::new().with_config(config))
}

fn import(engine: &Engine, text: &str) -> Result<ImportedNetwork, CliError> {
    match engine.import_str(text) {
        Ok(imported) => Ok(imported),
        Err(cxnet_core::Error::InvalidDocument { report }) => Err(CliError::Invalid(report)),
        Err(err) => Err(err.into()),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let engine = build_engine(&args)?;
    let text = read_input(args.input.as_deref())?;
    let out = args.out.as_deref();

    match args.command {
        Command::Validate => {
            let report = engine.validate_str(&text)?;
            write_json(&report, args.pretty, out)?;
            if report.is_valid {
                Ok(())
            } else {
                Err(CliError::Invalid(Box::new(report)))
            }
        }
        Command::Import => write_json(&import(&engine, &text)?, args.pretty, out),
        Command::View => write_json(&import(&engine, &text)?.bundle.view, args.pretty, out),
        Command::Export => {
            let imported = import(&engine, &text)?;
            write_json(&engine.export(&imported.bundle), args.pretty, out)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_tracing(args.verbose);
    let command = args.command;

    match run(args) {
        Ok(()) => {}
        Err(CliError::Invalid(report)) => {
            // The validate command already printed the full report.
            if command != Command::Validate {
                for issue in &report.errors {
                    eprintln!("error: {issue}");
                }
            }
            eprintln!("{}", CliError::Invalid(report));
            let code = if command == Command::Validate { 3 } else { 1 };
            std::process::exit(code);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
