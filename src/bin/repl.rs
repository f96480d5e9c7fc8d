//! Interactive evaluator for LogicExpr rules.
//!
//! ```bash
//! # Start the REPL
//! cargo run --bin farm-repl
//!
//! # Run a script of REPL commands, then exit
//! cargo run --bin farm-repl -- --script session.farm
//!
//! # Run a script, then drop into the REPL
//! cargo run --bin farm-repl -- --script session.farm --repl
//! ```
//!
//! ## Commands
//! - `.data <json>`   - replace the current data context
//! - `.show`          - print the current data context
//! - `.load <file>`   - load a JSON array of rules into the active context
//! - `.rules`         - list loaded rules
//! - `.query <rule_type|path|tag> <key>` - run the engine for one query kind
//! - `.config <file>` - reload engine configuration from a TOML file
//! - `.status`        - summarize engine configuration
//! - `.help`          - show this help
//! - `.quit`          - exit
//!
//! Any other non-empty line is parsed as a LogicExpr and evaluated against
//! the current data context.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use farm_core::{EngineConfig, EvaluateRequest, EvaluationEngine, Query, QueryContext, QueryInput, StaticRule, Value};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

#[derive(Parser)]
#[command(name = "farm-repl", about = "Interactive evaluator for LogicExpr rules")]
struct Args {
    /// Path to an engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Execute a script of REPL commands before entering the REPL
    #[arg(short, long)]
    script: Option<String>,

    /// Stay in the REPL after running --script
    #[arg(short, long)]
    repl: bool,
}

struct ReplState {
    config: EngineConfig,
    engine: EvaluationEngine<StaticRule>,
    data: Value,
    context: Option<QueryContext<StaticRule>>,
}

impl ReplState {
    fn new(config: EngineConfig) -> Self {
        let engine = EvaluationEngine::new(config.clone());
        ReplState {
            config,
            engine,
            data: Value::Obj(indexmap::IndexMap::new()),
            context: None,
        }
    }

    fn prompt(&self) -> String {
        match &self.context {
            Some(ctx) => format!("farm[{}]> ", ctx.identifier),
            None => "farm> ".to_string(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config '{}': {}. Using defaults.", path, e);
            EngineConfig::default()
        }),
        None => EngineConfig::load().unwrap_or_else(|_| EngineConfig::default()),
    };

    init_tracing(&config);

    let mut state = ReplState::new(config);

    if let Some(script_path) = &args.script {
        println!("Executing script: {}", script_path);
        match execute_script(&mut state, script_path) {
            Ok(()) => {
                if !args.repl {
                    return Ok(());
                }
                println!("Script completed. Entering REPL...");
            }
            Err(e) => {
                println!("Script error: {}", e);
                if !args.repl {
                    std::process::exit(1);
                }
                println!("Entering REPL despite errors...");
            }
        }
    } else {
        println!("Product-FARM rule-evaluation REPL");
        println!("==================================");
        println!("Type .help for the command reference.");
        println!();
    }

    run_repl(&mut state)
}

fn init_tracing(config: &EngineConfig) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run_repl(state: &mut ReplState) -> Result<(), Box<dyn std::error::Error>> {
    let mut rl = DefaultEditor::new()?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }

    loop {
        let prompt = state.prompt();
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if let Err(e) = handle_line(state, line) {
                    println!("Error: {}", e);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);
    Ok(())
}

fn history_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => {
            let dir = PathBuf::from(home).join(".farm-repl");
            let _ = fs::create_dir_all(&dir);
            dir.join("history")
        }
        None => PathBuf::from(".farm-repl_history"),
    }
}

fn execute_script(state: &mut ReplState, path: &str) -> Result<(), String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read script '{}': {}", path, e))?;
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        println!("> {}", line);
        handle_line(state, line).map_err(|e| format!("Line {}: {}", line_num + 1, e))?;
    }
    Ok(())
}

fn handle_line(state: &mut ReplState, line: &str) -> Result<(), String> {
    if let Some(rest) = line.strip_prefix('.') {
        handle_meta(state, rest.trim())
    } else {
        handle_eval(state, line)
    }
}

fn handle_meta(state: &mut ReplState, command: &str) -> Result<(), String> {
    let (verb, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
    let rest = rest.trim();

    match verb {
        "help" => {
            print_help();
            Ok(())
        }
        "quit" | "exit" => {
            println!("Goodbye!");
            std::process::exit(0);
        }
        "data" => {
            let value: Value = serde_json::from_str(rest).map_err(|e| format!("invalid JSON: {}", e))?;
            state.data = value;
            println!("Data context replaced.");
            Ok(())
        }
        "show" => {
            println!("{}", serde_json::to_string_pretty(&state.data).unwrap_or_default());
            Ok(())
        }
        "load" => {
            let content = fs::read_to_string(rest).map_err(|e| format!("failed to read '{}': {}", rest, e))?;
            let rules: Vec<StaticRule> = serde_json::from_str(&content).map_err(|e| format!("invalid rule set: {}", e))?;
            let count = rules.len();
            state.context = Some(QueryContext::new(rest.to_string(), rules));
            println!("Loaded {} rule(s) as context '{}'.", count, rest);
            Ok(())
        }
        "rules" => {
            match &state.context {
                Some(ctx) if !ctx.rules.is_empty() => {
                    for rule in &ctx.rules {
                        println!(
                            "  {} [{}] in={:?} out={:?}",
                            rule.id, rule.rule_type, rule.inputs, rule.outputs
                        );
                    }
                    Ok(())
                }
                _ => {
                    println!("No rules loaded. Use .load <file>.");
                    Ok(())
                }
            }
        }
        "query" => handle_query(state, rest),
        "config" => {
            state.config = EngineConfig::from_file(rest).map_err(|e| format!("{}", e))?;
            state.engine = EvaluationEngine::new(state.config.clone());
            println!("Configuration reloaded from '{}'.", rest);
            Ok(())
        }
        "status" => {
            println!("Math scale: {}", state.config.math.scale);
            println!("Cache policy: {:?}", state.config.cache.policy);
            println!(
                "Rules loaded: {}",
                state.context.as_ref().map(|c| c.rules.len()).unwrap_or(0)
            );
            Ok(())
        }
        _ => Err(format!("unknown command '.{}'. Type .help for the command reference.", verb)),
    }
}

fn handle_query(state: &mut ReplState, rest: &str) -> Result<(), String> {
    let mut parts = rest.splitn(2, char::is_whitespace);
    let kind = parts.next().unwrap_or("");
    let key = parts.next().unwrap_or("").trim();

    let query = match kind {
        "rule_type" | "type" => Query::rule_type(key),
        "path" | "attribute_path" => Query::attribute_path(key),
        "tag" | "attribute_tag" => Query::attribute_tag(key),
        _ => return Err(format!("unknown query kind '{}' (use rule_type, path, or tag)", kind)),
    };

    let ctx = state.context.as_ref().ok_or_else(|| "no rules loaded. Use .load <file>.".to_string())?;

    let attributes = match &state.data {
        Value::Obj(map) => map.clone(),
        _ => return Err("data context must be a JSON object; use .data {...}".to_string()),
    };

    let request = EvaluateRequest {
        queries: vec![query],
        input: QueryInput::new(attributes),
        trace_token: Some(uuid::Uuid::new_v4()),
    };

    let output = state.engine.evaluate(ctx, request).map_err(|e| format!("{}", e))?;
    if output.attributes.is_empty() {
        println!("(no output)");
    } else {
        for (key, value) in &output.attributes {
            println!("  {} = {}", key, value);
        }
    }
    Ok(())
}

fn handle_eval(state: &ReplState, line: &str) -> Result<(), String> {
    let expr = farm_core::logic::parse(line).map_err(|e| format!("{}", e))?;
    match farm_core::evaluate(&expr, &state.data, &state.config) {
        Ok(value) => {
            println!("{}", value);
            Ok(())
        }
        Err(e) => Err(format!("{}", e)),
    }
}

fn print_help() {
    println!("Product-FARM REPL Cheatsheet");
    println!("=============================");
    println!();
    println!("  <expr>                 Evaluate a LogicExpr against the current data context");
    println!("  .data <json>           Replace the data context (must be a JSON object)");
    println!("  .show                  Print the current data context");
    println!("  .load <file>           Load a JSON array of rules as the active context");
    println!("  .rules                 List rules in the active context");
    println!("  .query <kind> <key>    Evaluate rules matching rule_type/path/tag == key");
    println!("  .config <file>         Reload engine configuration from a TOML file");
    println!("  .status                Show engine configuration summary");
    println!("  .help                  Show this help");
    println!("  .quit                  Exit");
    println!();
    println!("Examples:");
    println!(r#"  .data {{"a": 3}}"#);
    println!(r#"  {{"*": [{{"var": "a"}}, 2]}}"#);
    println!("  .load rules.json");
    println!("  .query path total");
}
