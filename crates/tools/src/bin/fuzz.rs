use anyhow::{Context, Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::info;
use wyrmvale_core::{Attribute, CharacterClass, InputEvent, NpcId, Party, RosterEntry, SimMode, World};
use wyrmvale_tools::{WorldArgs, init_tracing};

#[derive(Parser)]
#[command(author, version, about = "Random-input invariant harness", long_about = None)]
struct Args {
    #[command(flatten)]
    world: WorldArgs,
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 10_000)]
    ticks: u64,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_input(rng: &mut ChaCha8Rng, npcs: &[NpcId]) -> InputEvent {
    let member = rng.next_u64() as usize % 4;
    let slot = rng.next_u64() as usize % 4;
    match rng.next_u64() % 12 {
        0..=3 => InputEvent::Move {
            dx: choose(rng, &[-1.0, 0.0, 1.0]),
            dy: choose(rng, &[-1.0, 0.0, 1.0]),
        },
        4 => InputEvent::Turn { facing: (rng.next_u64() % 628) as f64 / 100.0 },
        5 => InputEvent::MeleeAttack { member },
        6 => InputEvent::CastSpell { member, spell: None, target: None },
        7 => InputEvent::UseItem { member, slot },
        8 => InputEvent::PickUp,
        9 if !npcs.is_empty() => InputEvent::Interact { npc: choose(rng, npcs) },
        10 => InputEvent::AllocateStat { member, attribute: choose(rng, &Attribute::ALL) },
        _ => InputEvent::Rest,
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    info!(seed = args.seed, ticks = args.ticks, "starting fuzz harness");
    let (content, map) = args.world.load()?;
    let roster: Vec<RosterEntry> = CharacterClass::ALL
        .iter()
        .take(4)
        .map(|class| RosterEntry { name: class.as_str().to_string(), class: *class })
        .collect();
    let party = Party::from_roster(&roster, &content).context("failed to create the party")?;
    let mut world = World::new(args.seed, content, &map, party);
    let npcs: Vec<NpcId> = world.npcs().map(|(id, _)| id).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut mode = SimMode::RealTime;

    for _ in 0..args.ticks {
        if rng.next_u64() % 200 == 0 {
            mode = choose(&mut rng, &[SimMode::RealTime, SimMode::TurnBased]);
        }
        let inputs: Vec<InputEvent> = (0..rng.next_u64() % 3).map(|_| random_input(&mut rng, &npcs)).collect();
        world.step(&inputs, mode);

        let violations = world.invariant_violations();
        if !violations.is_empty() {
            bail!("invariants failed at tick {}: {violations:?}", world.current_tick());
        }
        if world.party().is_wiped_out() {
            info!(tick = world.current_tick(), "party wiped out");
            break;
        }
    }

    println!("Fuzzing completed successfully after {} ticks.", world.current_tick());
    println!("Snapshot Hash: {}", world.snapshot_hash());
    Ok(())
}
