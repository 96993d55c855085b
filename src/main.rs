//! `ldl`: compile level definitions and preview what the generator builds.

use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum};

use ldl::config::GenerationConfig;
use ldl::dsl::Compiler;
use ldl::level::library::current_day_index;
use ldl::level::{
    ElementContext, ElementRegistry, Level, LevelDefinition, LevelLibrary, LevelType, Placement,
    SettingKey,
};

#[derive(Parser)]
#[command(name = "ldl", version, about = "Level Definition Language compiler and generator")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Generation config (defaults to ~/.ldl/config.yaml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a level file and print a summary.
    Check { file: PathBuf },
    /// Run the generator over a level file and print the placements.
    Generate {
        file: PathBuf,
        /// Level seed; defaults to the seed of the level's type.
        #[arg(long)]
        seed: Option<u64>,
        /// Frontier to generate up to.
        #[arg(long)]
        until: Option<i32>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Compile every level in a directory and list them by arcade group.
    Levels { dir: PathBuf },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Yaml,
}

fn main() {
    let cli = Cli::parse();
    ldl::logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => GenerationConfig::load_from(path).unwrap_or_else(|| {
            eprintln!("could not load config {}, using defaults", path.display());
            GenerationConfig::default()
        }),
        None => GenerationConfig::load_or_default(),
    };

    let result = match cli.command {
        Command::Check { file } => check(&file),
        Command::Generate {
            file,
            seed,
            until,
            format,
        } => generate(&file, seed, until.unwrap_or(config.generate_ahead), format, &config),
        Command::Levels { dir } => levels(&dir),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn read_level(file: &Path) -> Result<(String, String), String> {
    let source = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let id = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("level")
        .to_string();
    Ok((id, source))
}

fn check(file: &Path) -> Result<(), String> {
    let (id, source) = read_level(file)?;
    let manager = Compiler::compile(&source).map_err(|e| format!("{id}: {e}"))?;

    println!("{id}: ok");
    println!("  structures: {}", manager.amount_of_structures());
    for (i, structure) in manager.structures().iter().enumerate() {
        println!("    #{i}: {}x{}", structure.width(), structure.height());
    }
    let mut aliases: Vec<_> = manager.aliases().iter().collect();
    aliases.sort();
    for (from, to) in aliases {
        println!("  alias {from} -> {to}");
    }
    for key in SettingKey::ALL {
        if let Some(value) = manager.setting(key.as_str()) {
            println!("  setting {} = {value}", key.as_str());
        }
    }
    for rule in manager.boss_setting().rules() {
        println!("  boss {} at {}", rule.boss, rule.trigger);
    }
    Ok(())
}

fn session_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

fn generate(
    file: &Path,
    seed: Option<u64>,
    until: i32,
    format: Format,
    config: &GenerationConfig,
) -> Result<(), String> {
    let (id, source) = read_level(file)?;
    let level_type = LevelType::from_level_id(&id);
    let seed = seed.unwrap_or_else(|| level_type.seed(&id, current_day_index(), session_seed()));
    let definition =
        LevelDefinition::compile(&id, level_type, seed, &source).map_err(|e| format!("{id}: {e}"))?;

    let mut level = Level::from_definition(&definition, config);
    let mut elements = ElementContext::new(ElementRegistry::standard(), config, seed);
    let mut placements: Vec<Placement> = Vec::new();
    let built = level.generate(until, &mut elements, &mut placements);

    match format {
        Format::Text => {
            println!(
                "# {id} seed={seed} structures={built} generated_until={}",
                level.generated_until()
            );
            for p in &placements {
                if p.modifiers.is_empty() {
                    println!("{} {} {}", p.id, p.x, p.y);
                } else {
                    println!("{} {} {} {}", p.id, p.x, p.y, p.modifiers.join(":"));
                }
            }
        }
        Format::Yaml => {
            let yaml = serde_yaml::to_string(&placements).map_err(|e| e.to_string())?;
            print!("{yaml}");
        }
    }
    Ok(())
}

fn levels(dir: &Path) -> Result<(), String> {
    let library =
        LevelLibrary::load_dir(dir, current_day_index(), session_seed()).map_err(|e| e.to_string())?;
    for (group, ids) in library.arcade_groups() {
        println!("{group}: {}", ids.join(", "));
    }
    for id in library.ids() {
        if let Some(def) = library.get(id) {
            if def.level_type() != LevelType::Arcade {
                println!("{id}: {:?}", def.level_type());
            }
        }
    }
    for (id, err) in library.unavailable() {
        println!("{id}: unavailable ({err})");
    }
    Ok(())
}
