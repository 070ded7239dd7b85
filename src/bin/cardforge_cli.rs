//! CardForge CLI - generate, render and export cards
//!
//! Human-readable lines by default, a JSON report with --json.
//! Exit codes: 0 all cards exported, 1 setup failure (config, DPI, output
//! directory), 2 one or more cards failed.

use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;

use cardforge_core::{
    BatchRequest, CardOverrides, CardPipeline, Color, ColorIdentity, ExportFormat, ForgeConfig, PrintSpec,
};

#[derive(Parser)]
#[command(name = "cardforge-cli")]
#[command(about = "CardForge CLI - procedural trading card generator")]
struct Cli {
    /// Base seed; card i uses seed + i. Random when omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of cards to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    count: u32,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    #[arg(short, long, value_enum, default_value_t = ExportFormat::Png)]
    format: ExportFormat,

    /// Card name override
    #[arg(long)]
    name: Option<String>,

    /// Color identity override as symbols, e.g. "WU" or "C"
    #[arg(long)]
    colors: Option<String>,

    /// Type line override, e.g. "Instant" or "Creature — Elf Druid"
    #[arg(long = "type")]
    type_line: Option<String>,

    /// Theme for the art prompt
    #[arg(long)]
    concept: Option<String>,

    /// Ability override; repeat for several
    #[arg(long, alias = "ability")]
    abilities: Vec<String>,

    #[arg(long)]
    power: Option<u32>,

    #[arg(long)]
    toughness: Option<u32>,

    /// Request art and flavor text from the AI provider (falls back to placeholders)
    #[arg(long)]
    use_ai_art: bool,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// PDF resolution (72-1200)
    #[arg(long)]
    dpi: Option<u32>,

    /// Generate cards in parallel
    #[arg(long)]
    parallel: bool,

    /// Print a JSON report to stdout
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &cli.config {
        Some(path) => match ForgeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => ForgeConfig::default(),
    };
    if let Some(dpi) = cli.dpi {
        match PrintSpec::from_user(dpi) {
            Ok(print) => config.print = print,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let base_seed = cli.seed.unwrap_or_else(|| {
        let seed = rand::random::<u64>();
        info!("no seed given, using {}", seed);
        seed
    });

    let overrides = CardOverrides {
        name: cli.name,
        color_identity: cli.colors.as_deref().map(parse_colors),
        type_line: cli.type_line,
        abilities: if cli.abilities.is_empty() { None } else { Some(cli.abilities) },
        power: cli.power,
        toughness: cli.toughness,
        concept: cli.concept,
        set_code: None,
        collector_number: None,
    };

    let request = BatchRequest {
        base_seed,
        count: cli.count,
        output_dir: cli.output,
        format: cli.format,
        overrides,
        parallel: cli.parallel,
    };

    let pipeline = CardPipeline::from_config(&config, cli.use_ai_art);
    let report = match pipeline.run_batch(&request) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        let failures: Vec<_> = report
            .failures()
            .map(|(outcome, e)| {
                serde_json::json!({
                    "index": outcome.index,
                    "seed": outcome.seed,
                    "error": e.to_string(),
                })
            })
            .collect();
        let output = serde_json::json!({
            "success": report.is_success(),
            "baseSeed": base_seed,
            "cards": report.exported().collect::<Vec<_>>(),
            "failures": failures,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("could not serialize report: {}", e),
        }
    } else {
        for card in report.exported() {
            println!("Generated {} -> {}", card.description, card.path.display());
        }
        for (outcome, e) in report.failures() {
            eprintln!("Card #{} (seed {}) failed: {}", outcome.index + 1, outcome.seed, e);
        }
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

/// Lenient symbol parsing: unknown characters are warned about and skipped.
fn parse_colors(symbols: &str) -> ColorIdentity {
    let colors: Vec<Color> = symbols
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .filter_map(|c| {
            let color = Color::from_symbol(c);
            if color.is_none() {
                warn!("ignoring unknown color symbol '{}'", c);
            }
            color
        })
        .collect();
    ColorIdentity::new(colors)
}
