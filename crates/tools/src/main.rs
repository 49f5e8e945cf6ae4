use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use wyrmvale_core::journal_file::{load_journal_from_file, write_journal_to_file};
use wyrmvale_core::{InputEvent, Recorder, RosterEntry, SimMode, TickReport, replay_to_end};
use wyrmvale_tools::{WorldArgs, init_tracing};

#[derive(Parser)]
#[command(author, version, about = "Headless host for the wyrmvale simulation core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a content bundle and a map, and report what they contain
    Validate {
        #[command(flatten)]
        world: WorldArgs,
    },
    /// Simulate a session and print a summary
    Run {
        #[command(flatten)]
        world: WorldArgs,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long, default_value_t = 1200)]
        ticks: u64,
        #[arg(long, value_enum, default_value_t = Mode::RealTime)]
        mode: Mode,
        /// Walk the party along this heading (radians) every other tick
        #[arg(long)]
        heading: Option<f64>,
        /// Write the final world snapshot as JSON
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Write the input journal as hash-chained JSON lines
        #[arg(long)]
        journal: Option<PathBuf>,
    },
    /// Replay a journal file and print the final tick and snapshot hash
    Replay {
        #[command(flatten)]
        world: WorldArgs,
        /// Path to the journal JSONL file to replay
        #[arg(short, long)]
        journal: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    RealTime,
    TurnBased,
}

impl From<Mode> for SimMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::RealTime => SimMode::RealTime,
            Mode::TurnBased => SimMode::TurnBased,
        }
    }
}

fn default_roster() -> Vec<RosterEntry> {
    use wyrmvale_core::CharacterClass::{Archer, Cleric, Knight, Sorcerer};
    [("Aldric", Knight), ("Wren", Archer), ("Mira", Sorcerer), ("Hale", Cleric)]
        .into_iter()
        .map(|(name, class)| RosterEntry { name: name.to_string(), class })
        .collect()
}

fn validate(world: &WorldArgs) -> Result<()> {
    let (content, map) = world.load()?;
    if map.grid.start().is_none() {
        warn!("map has no spawn marker");
    }
    println!("Content fingerprint: {:#018x}", content.fingerprint());
    println!("Tile types: {}", content.tiles().len());
    println!("Quests: {}", content.quests().len());
    println!("Map: {}x{}, start {:?}", map.grid.width(), map.grid.height(), map.start_tile());
    println!("Monster spawns: {}", map.monster_spawns.len());
    println!("NPCs: {}", map.npc_spawns.len());
    println!("Special tiles: {}", map.grid.specials().len());
    Ok(())
}

struct RunOptions {
    seed: u64,
    ticks: u64,
    mode: SimMode,
    heading: Option<f64>,
    snapshot: Option<PathBuf>,
    journal: Option<PathBuf>,
}

fn run(world: &WorldArgs, options: RunOptions) -> Result<()> {
    let (content, map) = world.load()?;
    let mut recorder = Recorder::new(options.seed, Arc::clone(&content), &map, default_roster())
        .context("failed to create the party")?;

    let mut kills = 0usize;
    let mut refused = 0usize;
    for tick in 0..options.ticks {
        let inputs = match options.heading {
            Some(heading) if tick % 2 == 0 => {
                vec![InputEvent::Move { dx: heading.cos(), dy: heading.sin() }]
            }
            _ => Vec::new(),
        };
        let report: TickReport = recorder.step(&inputs, options.mode);
        kills += report.killed_monsters().count();
        refused += report.action_errors.len();
        if recorder.world().party().is_wiped_out() {
            warn!(tick = report.tick, "party wiped out");
            break;
        }
    }

    let (world_state, journal) = recorder.finish();
    let party = world_state.party();
    println!("Ticks: {}", world_state.current_tick());
    println!("Monsters killed: {kills}");
    println!("Inputs refused: {refused}");
    println!("Gold: {}", party.gold);
    for member in &party.members {
        println!(
            "  {} ({}) level {} hp {}/{} sp {}/{}",
            member.name,
            member.class.as_str(),
            member.level,
            member.hp,
            member.max_hp,
            member.sp,
            member.max_sp
        );
    }
    println!("Snapshot Hash: {}", world_state.snapshot_hash());

    if let Some(path) = options.snapshot {
        let json = serde_json::to_string_pretty(&world_state.snapshot()).context("failed to serialize snapshot")?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
    }
    if let Some(path) = options.journal {
        write_journal_to_file(&path, &journal)
            .with_context(|| format!("failed to write journal {}", path.display()))?;
        info!(path = %path.display(), records = journal.inputs.len(), "journal written");
    }
    Ok(())
}

fn replay(world: &WorldArgs, journal: &Path) -> Result<()> {
    let (content, map) = world.load()?;
    let loaded = load_journal_from_file(journal)
        .with_context(|| format!("failed to read journal file: {}", journal.display()))?;
    if loaded.journal.halt_tick().is_none() {
        bail!("journal {} was never closed", journal.display());
    }

    let result = replay_to_end(content, &map, &loaded.journal).context("replay failed")?;

    println!("Replay complete.");
    println!("Final Tick: {}", result.final_tick);
    println!("Snapshot Hash: {}", result.final_snapshot_hash);
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Validate { world } => validate(&world),
        Command::Run { world, seed, ticks, mode, heading, snapshot, journal } => run(
            &world,
            RunOptions { seed, ticks, mode: mode.into(), heading, snapshot, journal },
        ),
        Command::Replay { world, journal } => replay(&world, &journal),
    }
}
