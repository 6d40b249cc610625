use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use specbridge_core::{unique_record_keys, StreamConfig};
use specbridge_protocol::ParseContext;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Replay the legacy spec-file read protocol over a JSON document.
#[derive(Parser)]
#[command(
    name = "specbridge",
    version,
    about = "Replay the legacy spec-file protocol over a JSON document"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the record stream of a configuration document
    Lines {
        /// Path to the JSON configuration document
        file: PathBuf,
        /// Field name that introduces nested record groups
        #[arg(long)]
        record_field: Option<String>,
        /// Logical name under which record keys are reported
        #[arg(long, default_value = "mode_name")]
        alias: String,
        /// Zoom depth at which a record body sits
        #[arg(long)]
        max_depth: Option<usize>,
        /// Subtree to open before replaying
        #[arg(long)]
        scope: Option<String>,
        /// Stop after this many lines even without a group end
        #[arg(long, default_value_t = 64)]
        limit: usize,
    },

    /// Print the named-table dimensions of a document subtree
    Shape {
        /// Path to the JSON configuration document
        file: PathBuf,
        /// Subtree to open before measuring
        #[arg(long)]
        scope: Option<String>,
    },

    /// List the declared top-level keys with their diagnostic ordinals
    Vars {
        /// Path to the JSON configuration document
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Lines {
            file,
            record_field,
            alias,
            max_depth,
            scope,
            limit,
        } => cmd_lines(
            &file,
            record_field.as_deref(),
            &alias,
            max_depth,
            scope.as_deref(),
            limit,
            cli.output,
        ),
        Commands::Shape { file, scope } => cmd_shape(&file, scope.as_deref(), cli.output),
        Commands::Vars { file } => cmd_vars(&file, cli.output),
    };
    if let Err(msg) = result {
        eprintln!("error: {}", msg);
        process::exit(1);
    }
}

fn load(file: &Path) -> Result<Value, String> {
    let text = fs::read_to_string(file).map_err(|e| format!("{}: {}", file.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {}", file.display(), e))
}

fn cmd_lines(
    file: &Path,
    record_field: Option<&str>,
    alias: &str,
    max_depth: Option<usize>,
    scope: Option<&str>,
    limit: usize,
    output: OutputFormat,
) -> Result<(), String> {
    let doc = load(file)?;
    if doc.is_array() && !unique_record_keys(&doc) {
        return Err("record keys are not unique".to_string());
    }

    let options = match record_field {
        Some(field) => {
            let mut options = StreamConfig::records(field, alias);
            if let Some(depth) = max_depth {
                options.max_depth = depth;
            }
            options
        }
        None => StreamConfig {
            record_alias: alias.to_string(),
            max_depth: max_depth.unwrap_or(1),
            ..StreamConfig::default()
        },
    };

    let mut ctx = ParseContext::new(&doc, options);
    if let Some(name) = scope {
        ctx.open_scope(name).map_err(|e| e.to_string())?;
    }

    let count = ctx.read_line_size();
    let mut lines = Vec::new();
    let mut ended = false;
    for _ in 0..limit {
        let (name, data, done) = ctx.read_line().map_err(|e| e.to_string())?;
        if done {
            ended = true;
            break;
        }
        lines.push((name, data));
    }

    match output {
        OutputFormat::Text => {
            println!("group size: {}", count);
            for (name, data) in &lines {
                println!("{} = {}", name, data);
            }
            if ended {
                println!("-- end of group --");
            }
        }
        OutputFormat::Json => {
            let lines: Vec<Value> = lines
                .iter()
                .map(|(name, data)| serde_json::json!({"name": name, "data": data}))
                .collect();
            let report = serde_json::json!({
                "count": count,
                "lines": lines,
                "done": ended,
            });
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }
    }
    Ok(())
}

fn cmd_shape(file: &Path, scope: Option<&str>, output: OutputFormat) -> Result<(), String> {
    let doc = load(file)?;
    let mut ctx = ParseContext::new(&doc, StreamConfig::default());
    if let Some(name) = scope {
        ctx.open_scope(name).map_err(|e| e.to_string())?;
    }
    let (rows, cols) = ctx.read_named_table_size().map_err(|e| e.to_string())?;
    match output {
        OutputFormat::Text => {
            println!("rows: {}", rows);
            println!("cols: {}", cols);
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({"rows": rows, "cols": cols}))
                    .unwrap()
            );
        }
    }
    Ok(())
}

fn cmd_vars(file: &Path, output: OutputFormat) -> Result<(), String> {
    let doc = load(file)?;
    let ctx = ParseContext::new(&doc, StreamConfig::default());
    let vars = ctx.declared_vars();
    match output {
        OutputFormat::Text => {
            for (ordinal, name) in vars.iter().enumerate() {
                println!("{} {}", ordinal, name);
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({"vars": vars})).unwrap()
            );
        }
    }
    Ok(())
}
