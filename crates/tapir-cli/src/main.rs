use serde::Serialize;
use std::io::Read;
use tapir::{Connection, Graph, GraphInput, LayoutConfig, NormalizedPosition, Session};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(tapir::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<tapir::Error> for CliError {
    fn from(value: tapir::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Connections,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    config: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    rerun: bool,
    rerun_ms: Option<u64>,
    verbose: bool,
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    connections: &'a [Connection],
    positions: &'a [NormalizedPosition],
}

fn usage() -> &'static str {
    "tapir-cli\n\
\n\
USAGE:\n\
  tapir-cli [layout] [--pretty] [--config <path>] [--width <w>] [--height <h>] [--rerun] [--rerun-ms <ms>] [--verbose] [<path>|-]\n\
  tapir-cli connections [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the graph JSON is read from stdin.\n\
  - Input shape: {\"nodes\": [{\"id\", \"x\", \"y\"}], \"edges\": [[\"a\", \"b\"]]} with x/y in [0,1].\n\
  - layout prints {\"connections\": [...], \"positions\": [...]} once the run converges.\n\
  - --rerun re-optimizes from the converged layout for --rerun-ms (default 3000) and prints that result.\n\
  - Log level comes from RUST_LOG (default: warn; --verbose: debug). Logs go to stderr.\n\
"
}

fn next_f64<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<f64, CliError> {
    let Some(v) = it.next() else {
        return Err(CliError::Usage(usage()));
    };
    let v = v.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "connections" => args.command = Command::Connections,
            "--pretty" => args.pretty = true,
            "--rerun" => args.rerun = true,
            "--verbose" | "-v" => args.verbose = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--width" => args.width = Some(next_f64(&mut it)?),
            "--height" => args.height = Some(next_f64(&mut it)?),
            "--rerun-ms" => {
                let Some(ms) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.rerun_ms = Some(ms.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
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
            "-" if args.input.is_none() => args.input = Some("-".to_string()),
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

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Keep an already-installed global subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
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

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    use std::io::Write;

    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn load_config(args: &Args) -> Result<LayoutConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => LayoutConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => LayoutConfig::default(),
    };
    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    if let Some(ms) = args.rerun_ms {
        config.rerun_duration_ms = ms;
    }
    Ok(config)
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;
    tracing::debug!(
        command = ?args.command,
        input = args.input.as_deref().unwrap_or("-"),
        rerun = args.rerun,
        "tapir-cli"
    );
    let text = read_input(args.input.as_deref())?;
    let input = GraphInput::from_json(&text)?;

    match args.command {
        Command::Connections => {
            let graph = Graph::build(&input, config.width, config.height)?;
            write_json(&graph.adjacency().connections(), args.pretty)
        }
        Command::Layout => {
            let mut session = Session::start(&input, &config, ())?;
            session.run_to_end();
            if args.rerun {
                session.reset();
                session.run_to_end();
            }

            let positions = session.positions().unwrap_or_default();
            write_json(
                &LayoutOut {
                    connections: session.connections(),
                    positions,
                },
                args.pretty,
            )
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
    init_logging(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
