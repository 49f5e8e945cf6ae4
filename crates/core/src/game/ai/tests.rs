use super::*;
use crate::content::tuning::Tuning;
use crate::test_support::{grid_from_rows, sample_content};

fn goblin_at(content: &ContentBundle, tile: TilePos) -> Monster {
    let def = content.monster("goblin").expect("goblin");
    Monster::from_def("goblin", def, tile.center())
}

fn context<'a, 'g>(
    oracle: &'a CollisionOracle<'g>,
    party: TilePos,
    tuning: &'a Tuning,
) -> AiContext<'a, 'g> {
    AiContext {
        id: MonsterId::default(),
        oracle,
        party_position: party.center(),
        party_targetable: true,
        tuning,
    }
}

const OPEN: [&str; 3] = ["............", "............", "............"];

#[test]
fn patrolling_monster_spots_the_party_and_closes_in() {
    let content = sample_content();
    let grid = grid_from_rows(&content, &OPEN);
    let oracle = CollisionOracle::new(&grid, Vec::new());
    let ctx = context(&oracle, TilePos::new(5, 1), content.tuning());
    let mut goblin = goblin_at(&content, TilePos::new(0, 1));
    goblin.alert_radius = 512.0;
    let start = goblin.position;

    let outcome = update_monster(&mut goblin, &ctx, &mut Dice::new(1));

    assert_eq!(goblin.state, AiState::Pursuing);
    assert!(goblin.engaging);
    assert_eq!(
        outcome.transitions,
        vec![(AiState::Patrolling, AiState::Alert), (AiState::Alert, AiState::Pursuing)]
    );
    assert!(goblin.position.x > start.x);
}

#[test]
fn attack_waits_for_the_cooldown_then_strikes() {
    let content = sample_content();
    let grid = grid_from_rows(&content, &OPEN);
    let oracle = CollisionOracle::new(&grid, Vec::new());
    let ctx = context(&oracle, TilePos::new(4, 1), content.tuning());
    let mut goblin = goblin_at(&content, TilePos::new(3, 1));
    goblin.attack_radius = 64.0;
    goblin.attack_cooldown = 10;
    goblin.set_state(AiState::Attacking);
    let mut dice = Dice::new(5);

    for _ in 0..8 {
        assert!(update_monster(&mut goblin, &ctx, &mut dice).attack.is_none());
    }
    goblin.state_timer = 9;
    let outcome = update_monster(&mut goblin, &ctx, &mut dice);
    assert_eq!(outcome.attack, Some(AttackIntent::Melee));
    assert_eq!(goblin.attack_count, 1);
    assert_eq!(goblin.state, AiState::Attacking);
    assert_eq!(goblin.state_timer, 0);
}

#[test]
fn unprovoked_monster_gives_up_on_a_distant_party() {
    let content = sample_content();
    let grid = grid_from_rows(&content, &OPEN);
    let oracle = CollisionOracle::new(&grid, Vec::new());
    let ctx = context(&oracle, TilePos::new(11, 1), content.tuning());
    let mut goblin = goblin_at(&content, TilePos::new(0, 1));
    goblin.alert_radius = 64.0;
    goblin.set_state(AiState::Pursuing);
    goblin.attack_count = 3;

    update_monster(&mut goblin, &ctx, &mut Dice::new(2));

    assert_eq!(goblin.state, AiState::Idle);
    assert_eq!(goblin.attack_count, 0);
    assert!(!goblin.engaging);
}

#[test]
fn fleeing_ends_in_idle_and_forgets_the_provocation() {
    let content = sample_content();
    let grid = grid_from_rows(&content, &OPEN);
    let oracle = CollisionOracle::new(&grid, Vec::new());
    let ctx = context(&oracle, TilePos::new(11, 1), content.tuning());
    let mut goblin = goblin_at(&content, TilePos::new(1, 1));
    goblin.set_state(AiState::Fleeing);
    goblin.was_attacked = true;
    goblin.state_timer = content.tuning().ai.flee_duration_ticks;

    update_monster(&mut goblin, &ctx, &mut Dice::new(3));

    assert_eq!(goblin.state, AiState::Idle);
    assert!(!goblin.was_attacked);
}

#[test]
fn idle_monster_outside_its_tether_heads_home() {
    let content = sample_content();
    let grid = grid_from_rows(&content, &OPEN);
    let oracle = CollisionOracle::new(&grid, Vec::new());
    let mut ctx = context(&oracle, TilePos::new(0, 0), content.tuning());
    ctx.party_targetable = false;
    let mut goblin = goblin_at(&content, TilePos::new(1, 1));
    goblin.set_state(AiState::Idle);
    goblin.position = TilePos::new(10, 1).center();
    assert!(goblin.outside_tether());

    update_monster(&mut goblin, &ctx, &mut Dice::new(4));

    assert_eq!(goblin.state, AiState::Patrolling);
    assert_eq!(goblin.move_target.map(|target| target.tile), Some(TilePos::new(1, 1)));
}

#[test]
fn ranged_monster_without_a_clear_shot_repositions_and_fires() {
    let content = sample_content();
    let grid = grid_from_rows(&content, &["......", "......", "..W...", "......", "......"]);
    let oracle = CollisionOracle::new(&grid, Vec::new());
    let ctx = context(&oracle, TilePos::new(3, 2), content.tuning());
    let def = content.monster("goblin_shaman").expect("shaman");
    let mut shaman = Monster::from_def("goblin_shaman", def, TilePos::new(1, 2).center());
    shaman.set_state(AiState::Attacking);
    shaman.was_attacked = true;
    let start = shaman.position;
    assert!(shaman.position.distance(ctx.party_position) <= shaman.attack_radius);
    assert!(!oracle.line_of_sight(shaman.position, ctx.party_position));

    let mut dice = Dice::new(9);
    let fired = (0..1500).find_map(|_| update_monster(&mut shaman, &ctx, &mut dice).attack);

    assert!(matches!(fired, Some(AttackIntent::Ranged { .. })), "shaman never fired");
    assert_ne!(shaman.position, start);
    assert!(oracle.line_of_sight(shaman.position, ctx.party_position));
}
