mod common;

use wyrmvale_core::character::Character;
use wyrmvale_core::game::roll_loot;
use wyrmvale_core::quest::QuestManager;
use wyrmvale_core::rng::Dice;
use wyrmvale_core::{
    ActionError, AiState, Attribute, CharacterClass, DamageType, Party, QuestStatus, RewardBundle,
    SimMode, TilePos, Vec2, World,
};

use common::{load_content, open_field};

#[test]
fn kill_quest_completes_on_the_fifth_goblin_and_pays_once() {
    let content = load_content();
    let mut quests = QuestManager::new(content.quests().clone());
    assert_eq!(quests.initialize_starting_quests(), vec!["goblin_hunt".to_string()]);

    for _ in 0..4 {
        assert!(quests.on_monster_killed("goblin").is_empty());
    }
    let hunt = quests.get("goblin_hunt").expect("goblin_hunt active");
    assert_eq!((hunt.progress, hunt.status), (4, QuestStatus::Active));

    assert_eq!(quests.on_monster_killed("goblin"), vec!["goblin_hunt".to_string()]);
    assert_eq!(quests.get("goblin_hunt").map(|quest| quest.status), Some(QuestStatus::Completed));

    assert_eq!(quests.claim_rewards("goblin_hunt"), Ok(RewardBundle { gold: 50, experience: 100 }));
    assert!(matches!(quests.claim_rewards("goblin_hunt"), Err(ActionError::NotAllowed(_))));
}

#[test]
fn cleric_regenerates_on_the_six_hundred_tick_period() {
    let content = load_content();
    let tuning = content.tuning();
    let mut cleric = Character::new("Hale", CharacterClass::Cleric, &content).expect("cleric");
    assert_eq!(cleric.base(Attribute::Personality), 18);
    assert_eq!(cleric.base(Attribute::Intellect), 14);
    assert_eq!(cleric.level, 1);

    cleric.sp -= 5;
    let drained = cleric.sp;
    for _ in 0..180 {
        cleric.update(SimMode::RealTime, false, tuning);
    }
    assert_eq!(cleric.sp, drained);

    for _ in 180..tuning.sp_regen_interval_ticks {
        cleric.update(SimMode::RealTime, false, tuning);
    }
    assert_eq!(cleric.sp, drained + 1 + 18 / 10);
}

fn count_drops(monster: &str, item: &str) -> usize {
    let content = load_content();
    let table = content.loot_table(monster);
    let mut dice = Dice::new(12345);
    (0..1000).map(|_| roll_loot(table, &mut dice).iter().filter(|key| *key == item).count()).sum()
}

#[test]
fn dragon_bow_drops_about_one_in_twenty() {
    let bows = count_drops("dragon", "bow_of_hellfire");
    assert!((20..=80).contains(&bows), "bow_of_hellfire dropped {bows} times");
}

#[test]
fn pixie_rolls_each_entry_independently() {
    let rings = count_drops("pixie", "magic_ring");
    let robes = count_drops("pixie", "wizard_robes");
    assert!((20..=80).contains(&rings), "magic_ring dropped {rings} times");
    assert!((20..=80).contains(&robes), "wizard_robes dropped {robes} times");
}

#[test]
fn leather_armor_turns_fifty_into_forty_seven() {
    let content = load_content();
    let mut knight = Character::new("Aldric", CharacterClass::Knight, &content).expect("knight");
    knight.attributes.insert(Attribute::Endurance, 20);
    knight.max_hp = 200;
    knight.hp = 200;
    assert_eq!(knight.effective(Attribute::Endurance), 24);
    assert_eq!(knight.armor_class(), 6);
    assert_eq!(knight.take_damage(50, DamageType::Physical), 47);
}

#[test]
fn pursuing_monster_closes_on_the_party_without_dithering() {
    let content = load_content();
    let map = open_field(&content, 12, 4);
    let party = Party::from_roster(&common::roster(), &content).expect("party");
    let mut world = World::new(6, content, &map, party);
    world.place_party(Vec2::new(320.0, 32.0));
    let id = world.spawn_monster("goblin", TilePos::new(0, 0)).expect("goblin spawns");
    {
        let monster = world.monster_mut(id).expect("spawned");
        monster.speed = 1.8;
        monster.alert_radius = 512.0;
    }
    let start = world.monster(id).expect("spawned").position;
    assert_eq!(start, Vec2::new(32.0, 32.0));
    let party_at = world.party().position;

    let mut xs = vec![start.x];
    for _ in 0..100 {
        world.step(&[], SimMode::RealTime);
        xs.push(world.monster(id).expect("alive").position.x);
    }

    assert!(xs.windows(2).all(|pair| pair[1] >= pair[0]), "x went backwards: {xs:?}");
    assert!(xs[100] > xs[0]);
    let reversals = xs
        .windows(3)
        .filter(|w| (w[1] - w[0]).signum() * (w[2] - w[1]).signum() < 0.0)
        .count();
    assert!(reversals <= 10);

    let end = world.monster(id).expect("alive");
    let closed = start.distance(party_at) - end.position.distance(party_at);
    assert!(closed >= 0.25 * start.distance(party_at), "closed only {closed}px");
    assert_eq!(end.state, AiState::Pursuing);
}
