//! Command-line interface for dotparse
//! Parses DOT files and prints their tree, their streaming events, or their tokens.
//!
//! Usage:
//!   dotast parse `<path>` [--format tree|json|yaml|dot] [--config `<file>`]  - Print the parsed tree
//!   dotast stream `<path>` [--config `<file>`]                              - Print Enter/Exit/Stmt events
//!   dotast tokens `<path>`                                                - Print the token table

use clap::{Arg, ArgMatches, Command};
use dotparse::ast::Node;
use dotparse::combos::{CallbackError, Callbacks};
use dotparse::config::DotOptions;
use dotparse::dot::{self, DotGrammar};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config_arg = || {
        Arg::new("config")
            .long("config")
            .short('c')
            .help("YAML or JSON file with parse options")
    };
    let path_arg = || {
        Arg::new("path")
            .help("Path to the DOT file")
            .required(true)
            .index(1)
    };

    let matches = Command::new("dotast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse DOT graph files and inspect the result")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("parse")
                .about("Parse a file and print its tree")
                .arg(path_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["tree", "json", "yaml", "dot"])
                        .default_value("tree"),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("stream")
                .about("Stream-parse a file and print each event")
                .arg(path_arg())
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the token table")
                .arg(path_arg()),
        )
        .get_matches();

    let outcome = match matches.subcommand() {
        Some(("parse", args)) => handle_parse_command(args),
        Some(("stream", args)) => handle_stream_command(args),
        Some(("tokens", args)) => handle_tokens_command(args),
        _ => Err("unknown command".to_string()),
    };

    if let Err(message) = outcome {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn read_source(args: &ArgMatches) -> Result<String, String> {
    let path = args
        .get_one::<String>("path")
        .ok_or_else(|| "missing path".to_string())?;
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))
}

fn load_grammar(args: &ArgMatches) -> Result<DotGrammar, String> {
    let options = match args.get_one::<String>("config") {
        Some(path) => DotOptions::load(path).map_err(|e| e.to_string())?,
        None => DotOptions::default(),
    };
    Ok(DotGrammar::with_options(options))
}

/// Handle the parse command
fn handle_parse_command(args: &ArgMatches) -> Result<(), String> {
    let source = read_source(args)?;
    let grammar = load_grammar(args)?;
    let tree = grammar.parse(&source).map_err(|e| e.to_string())?;

    let format = args.get_one::<String>("format").map(String::as_str);
    let output = match format {
        Some("json") => serde_json::to_string_pretty(&tree).map_err(|e| e.to_string())?,
        Some("yaml") => serde_yaml::to_string(&tree).map_err(|e| e.to_string())?,
        Some("dot") => dot::render(&tree).map_err(|e| e.to_string())?,
        _ => tree.dump(),
    };
    println!("{}", output.trim_end());
    Ok(())
}

/// Prints events indented by scope depth.
#[derive(Default)]
struct EventPrinter {
    depth: usize,
}

impl EventPrinter {
    fn print(&self, text: String) {
        println!("{}{}", "  ".repeat(self.depth), text);
    }
}

impl Callbacks for EventPrinter {
    fn stmt(&mut self, node: &Node) -> Result<(), CallbackError> {
        self.print(format!("stmt {}", describe(node)));
        Ok(())
    }

    fn enter(&mut self, scope: &str, node: &Node) -> Result<(), CallbackError> {
        let name = node.kid("ID").and_then(Node::value).unwrap_or_default();
        self.print(format!("enter {} {}", scope, name));
        self.depth += 1;
        Ok(())
    }

    fn exit(&mut self, scope: &str) -> Result<(), CallbackError> {
        self.depth = self.depth.saturating_sub(1);
        self.print(format!("exit {}", scope));
        Ok(())
    }
}

fn describe(node: &Node) -> String {
    let mut text = node.label.clone();
    if let Some(value) = node.value() {
        text.push_str(&format!(" ({})", value));
    }
    if let Some(span) = node.span() {
        text.push_str(&format!(" @ {}", span));
    }
    text
}

/// Handle the stream command
fn handle_stream_command(args: &ArgMatches) -> Result<(), String> {
    let source = read_source(args)?;
    let grammar = load_grammar(args)?;
    let mut printer = EventPrinter::default();
    grammar
        .stream_parse(&source, &mut printer)
        .map_err(|e| e.to_string())
}

/// Handle the tokens command
fn handle_tokens_command(args: &ArgMatches) -> Result<(), String> {
    let source = read_source(args)?;
    let tokens = dot::tokenize(&source).map_err(|e| e.to_string())?;
    println!("Type     | Lexeme     | Position");
    println!("---------+------------+------------");
    for token in tokens {
        let name = dot::DotToken::from_kind(token.kind).map_or("?", |t| t.name());
        println!("{:<8} | {:<10} | {}", name, token.lexeme, token.span);
    }
    Ok(())
}
