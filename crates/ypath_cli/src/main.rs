use serde_json::Value;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use tracing::{Level, debug};
use ypath_core::{PathError, Selection, resolve, validate};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "Usage: ypath [OPTIONS] <PATH> [FILE]";

fn print_help() {
    println!(
        "ypath {VERSION} - select a node of a JSON document by path

{USAGE}

Arguments:
  <PATH>     Path expression (e.g. 'a.b[2]' or 'items[name=foo].value')
  [FILE]     Input JSON file (reads from stdin if omitted)

Options:
  -c, --check    Only check the syntax of <PATH>
  -v, --verbose  Log resolution steps to stderr (repeat for more detail)
  -h, --help     Show this help message
  -V, --version  Show version"
    );
}

fn print_version() {
    println!("ypath {VERSION}");
}

enum ParsedArgs {
    Help,
    Version,
    Check {
        path: String,
        verbosity: u8,
    },
    Select {
        path: String,
        file: Option<String>,
        verbosity: u8,
    },
}

fn usage_error(message: &str) -> String {
    format!("{message}\n\n{USAGE}\n\nFor more information, try '--help'")
}

fn parse_args() -> Result<ParsedArgs, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut positional = Vec::new();
    let mut check = false;
    let mut verbosity = 0u8;

    for arg in &args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(ParsedArgs::Help),
            "-V" | "--version" => return Ok(ParsedArgs::Version),
            "-c" | "--check" => check = true,
            "-v" | "--verbose" => verbosity = verbosity.saturating_add(1),
            "-vv" => verbosity = verbosity.saturating_add(2),
            s if s.starts_with('-') => {
                return Err(usage_error(&format!("unknown option: {s}")));
            }
            _ => positional.push(arg.clone()),
        }
    }

    let mut iter = positional.into_iter();
    let (Some(path), file) = (iter.next(), iter.next()) else {
        return Err(usage_error("missing required argument: <PATH>"));
    };
    if iter.next().is_some() {
        return Err(usage_error("too many arguments"));
    }

    if check {
        if file.is_some() {
            return Err(usage_error("--check takes no input file"));
        }
        return Ok(ParsedArgs::Check { path, verbosity });
    }
    Ok(ParsedArgs::Select {
        path,
        file,
        verbosity,
    })
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn read_input(file: Option<&str>) -> Result<String, String> {
    match file {
        Some(path) => fs::read_to_string(path).map_err(|e| format!("error reading file '{path}': {e}")),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("error reading stdin: {e}"))?;
            Ok(buffer)
        }
    }
}

/// Error message with a marker under the offending position of the path
fn describe(path: &str, err: &PathError) -> String {
    let column = path.get(..err.offset).map_or(err.offset, |s| s.chars().count());
    format!("{err}\n  {path}\n  {:>width$}", "^", width = column + 1)
}

fn run() -> Result<(), String> {
    match parse_args()? {
        ParsedArgs::Help => {
            print_help();
            Ok(())
        }
        ParsedArgs::Version => {
            print_version();
            Ok(())
        }
        ParsedArgs::Check { path, verbosity } => {
            init_logging(verbosity);
            let result = validate(&path);
            match result.error {
                Some(err) => Err(describe(&path, &err)),
                None => {
                    println!("valid");
                    Ok(())
                }
            }
        }
        ParsedArgs::Select {
            path,
            file,
            verbosity,
        } => {
            init_logging(verbosity);
            let input = read_input(file.as_deref())?;

            let json: Value =
                serde_json::from_str(&input).map_err(|e| format!("error parsing JSON: {e}"))?;
            debug!(bytes = input.len(), "parsed input document");

            let mut selection = Selection::from(&json);
            if let Err(err) = resolve(&mut selection, &path) {
                return Err(format!(
                    "{}\n  unresolved: {}",
                    describe(&path, &err.error),
                    err.remaining
                ));
            }

            let output = selection.to_value().unwrap_or(Value::Null);
            let output = serde_json::to_string_pretty(&output)
                .map_err(|e| format!("error serializing output: {e}"))?;

            println!("{output}");
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ypath: {e}");
            ExitCode::FAILURE
        }
    }
}
