//! keydash CLI
//!
//! Entry point for the `keydash` command-line tool.

use clap::{Parser, Subcommand, ValueEnum};
use keydash::{EffectiveConfig, ExportTargets, KeydashConfig, Pipeline};
use keydash_classifier::{aerospace_rules, aerospace_service_rules, karabiner_rules, normalize_key, RuleInput};
use keydash_model::{LayerId, LAYERS};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keydash")]
#[command(about = "Keyboard shortcut dashboard generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every source and write the dashboard data files
    Generate {
        /// Path to config file (default: ~/.config/keydash/config.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output directory (overrides output.dir)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the JSON export to stdout instead of writing files
        #[arg(long)]
        stdout: bool,

        /// Skip the browser script artifact
        #[arg(long)]
        no_js: bool,
    },

    /// Print the layer registry
    Layers {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Explain which classification rule a command hits
    Explain {
        /// Rule set to apply
        #[arg(long, short = 's', value_enum)]
        source: RuleSource,

        /// Key the command is bound to
        #[arg(long, short = 'k', default_value = "")]
        key: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// The command to explain (after --)
        #[arg(last = true, required = true)]
        cmd: Vec<String>,
    },

    /// Look up the cheatsheet description for a key
    Lookup {
        /// Layer id (hyper, alt, alt-shift, service)
        #[arg(long, short = 'l')]
        layer: LayerId,

        /// Key token
        #[arg(long, short = 'k')]
        key: String,

        /// Path to config file (default: ~/.config/keydash/config.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RuleSource {
    Karabiner,
    Aerospace,
    AerospaceService,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            output,
            stdout,
            no_js,
        } => {
            run_generate(config, output, stdout, no_js);
        }
        Commands::Layers { json } => {
            run_layers(json);
        }
        Commands::Explain { source, key, json, cmd } => {
            run_explain(source, &key, json, cmd);
        }
        Commands::Lookup { layer, key, config } => {
            run_lookup(layer, &key, config);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keydash=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run_generate(config_path: Option<PathBuf>, output: Option<PathBuf>, stdout: bool, no_js: bool) {
    let mut overrides = serde_json::Map::new();
    let mut output_overrides = serde_json::Map::new();
    if let Some(dir) = output {
        output_overrides.insert("dir".to_string(), serde_json::json!(dir.to_string_lossy()));
    }
    if no_js {
        output_overrides.insert("js".to_string(), serde_json::json!(false));
    }
    if !output_overrides.is_empty() {
        overrides.insert("output".to_string(), serde_json::Value::Object(output_overrides));
    }
    let overrides = (!overrides.is_empty()).then_some(serde_json::Value::Object(overrides));

    let config = load_config(config_path, overrides);
    let pipeline = match Pipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };

    if stdout {
        let json = pipeline.build().and_then(|(export, _)| Ok(export.to_json()?));
        match json {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(e.exit_code());
            }
        }
        return;
    }

    let output = &pipeline.config().output;
    let targets = ExportTargets {
        json: output.json,
        js: output.js,
    };
    match pipeline.run(targets) {
        Ok((_, summary)) => {
            if summary.written.is_empty() {
                eprintln!("Nothing written: output.json and output.js are both disabled");
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run_layers(json_output: bool) {
    if json_output {
        let output: Vec<serde_json::Value> = LAYERS
            .iter()
            .map(|meta| {
                serde_json::json!({
                    "id": meta.id,
                    "name": meta.name,
                    "activatorKeys": meta.activator_keys,
                    "layerClass": meta.layer_class,
                    "description": meta.description,
                })
            })
            .collect();

        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        for meta in LAYERS.iter() {
            println!("{:<10} {:<10} [{}]  {}", meta.id.as_str(), meta.name, meta.activator_keys.join("+"), meta.description);
        }
    }
}

fn run_explain(source: RuleSource, key: &str, json_output: bool, cmd: Vec<String>) {
    let rules = match source {
        RuleSource::Karabiner => karabiner_rules(),
        RuleSource::Aerospace => aerospace_rules(),
        RuleSource::AerospaceService => aerospace_service_rules(),
    };

    let command = cmd.join(" ");
    let key = normalize_key(key);
    let explanation = rules.explain(&RuleInput::new(&key, &command));

    if json_output {
        match explanation.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", explanation.to_human());
    }
}

fn run_lookup(layer: LayerId, key: &str, config_path: Option<PathBuf>) {
    let config = load_config(config_path, None);
    let pipeline = match Pipeline::new(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };

    let key = normalize_key(key);
    match pipeline.cheatsheet().describe(layer.as_str(), &key) {
        Some(description) => println!("{}", description),
        None => {
            eprintln!("No cheatsheet entry for {} {}", layer, key);
            process::exit(1);
        }
    }
}

fn load_config(config_path: Option<PathBuf>, overrides: Option<serde_json::Value>) -> KeydashConfig {
    match EffectiveConfig::load(config_path.as_deref(), overrides) {
        Ok(effective) => {
            for source in &effective.sources {
                tracing::debug!(origin = ?source.origin, path = ?source.path, "config layer");
            }
            effective.config
        }
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    }
}
