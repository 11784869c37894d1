//! permit CLI: driving adapter for the permit rule compiler.
//!
//! Subcommands:
//! - `check <rule>...`: compile rules and print the canonical tree
//! - `match --rule <rule>... <path>... [--trace]`: decide paths against rules
//! - `filter <config> [key=value...]`: filter pairs through a params config
//!
//! `-v` / `--verbose` anywhere enables debug logging on stderr.

use std::process;

use permit::{Params, ParamsConfig, ParamsError, Permittable, Values};

fn main() {
    let (verbose, args) = split_verbose(std::env::args().skip(1).collect());
    init_tracing(verbose);

    if args.is_empty() {
        print_usage();
        process::exit(1);
    }

    let result = match args[0].as_str() {
        "check" => cmd_check(&args[1..]),
        "match" => cmd_match(&args[1..]),
        "filter" => cmd_filter(&args[1..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("check requires at least one rule".into());
    }

    let rules = Permittable::compile(args).map_err(|e| format!("rules invalid: {e}"))?;

    println!("{rules}");
    println!("depth: {}", rules.depth());
    Ok(())
}

fn cmd_match(args: &[String]) -> Result<(), String> {
    let request = parse_match(args)?;
    let rules = Permittable::compile(&request.rules).map_err(|e| format!("rules invalid: {e}"))?;

    for path in &request.paths {
        if request.trace {
            println!("{:#?}", rules.match_with_trace(path));
        } else {
            println!("{}\t{path}", decision(rules.is_permitted(path)));
        }
    }
    Ok(())
}

fn cmd_filter(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("filter requires a config file path".into());
    }

    let config = load_config(&args[0]).map_err(|e| e.to_string())?;
    let params = Params::from_config(config).map_err(|e| format!("config invalid: {e}"))?;
    let values = parse_pairs(&args[1..])?;

    let filtered = params.filter(&values).map_err(|e| e.to_string())?;
    for (key, items) in &filtered {
        for value in items {
            println!("{key}={value}");
        }
    }
    Ok(())
}

fn decision(permitted: bool) -> &'static str {
    if permitted {
        "permit"
    } else {
        "deny"
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(path: &str) -> Result<ParamsConfig, ParamsError> {
    let content = std::fs::read_to_string(path).map_err(|e| ParamsError::InvalidConfig {
        source: format!("failed to read \"{path}\": {e}"),
    })?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| ParamsError::InvalidConfig {
            source: format!("JSON parse error: {e}"),
        })
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| ParamsError::InvalidConfig {
            source: format!("YAML parse error: {e}"),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

/// Parsed `match` arguments.
#[derive(Debug, Default, PartialEq, Eq)]
struct MatchRequest {
    rules: Vec<String>,
    paths: Vec<String>,
    trace: bool,
}

fn split_verbose(args: Vec<String>) -> (bool, Vec<String>) {
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let rest = args
        .into_iter()
        .filter(|a| a != "-v" && a != "--verbose")
        .collect();
    (verbose, rest)
}

fn parse_match(args: &[String]) -> Result<MatchRequest, String> {
    let mut request = MatchRequest::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--rule" | "-r" => {
                i += 1;
                let rule = args
                    .get(i)
                    .ok_or_else(|| "--rule requires a value".to_owned())?;
                request.rules.push(rule.clone());
            }
            "--trace" => request.trace = true,
            flag if flag.starts_with("--") => {
                return Err(format!("unexpected argument \"{flag}\""));
            }
            path => request.paths.push(path.to_owned()),
        }
        i += 1;
    }

    if request.rules.is_empty() {
        return Err("match requires at least one --rule".into());
    }
    if request.paths.is_empty() {
        return Err("match requires at least one path".into());
    }
    Ok(request)
}

fn parse_pairs(args: &[String]) -> Result<Values, String> {
    let mut values = Values::new();
    for pair in args {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("invalid pair \"{pair}\", expected key=value"))?;
        values.append(key, value);
    }
    Ok(values)
}

fn print_usage() {
    eprintln!(
        "Usage: permit [-v] <command> [options]

Commands:
  check <rule>...                            Compile rules and print the tree
  match --rule <rule>... <path>... [--trace] Decide paths against rules
  filter <config> [key=value...]             Filter pairs through a params config
  help                                       Show this help

Options:
  -v, --verbose                              Debug logging on stderr"
    );
}
