mod common;

use proptest::prelude::*;
use proptest::sample::select;
use wyrmvale_core::character::Character;
use wyrmvale_core::quest::QuestManager;
use wyrmvale_core::{Attribute, CharacterClass, DamageType};

use common::load_content;

const WEARABLES: [&str; 8] = [
    "leather_armor",
    "chain_mail",
    "iron_helm",
    "wizard_robes",
    "amulet_of_wisdom",
    "magic_ring",
    "dagger",
    "iron_mace",
];

fn stat_totals(character: &Character) -> (Vec<i32>, i32, i32) {
    let attributes = Attribute::ALL.iter().map(|attribute| character.effective(*attribute)).collect();
    (attributes, character.armor_class(), character.max_sp)
}

proptest! {
    #[test]
    fn poison_keeps_the_longer_duration(first in 1u32..20_000, second in 1u32..20_000) {
        let content = load_content();
        let mut cleric = Character::new("Hale", CharacterClass::Cleric, &content).unwrap();
        cleric.apply_poison(first);
        cleric.apply_poison(second);
        prop_assert_eq!(cleric.poison_ticks, first.max(second));
    }

    #[test]
    fn armor_never_drives_damage_below_one(incoming in 1i32..400, endurance in 0i32..200) {
        let content = load_content();
        let mut knight = Character::new("Aldric", CharacterClass::Knight, &content).unwrap();
        knight.attributes.insert(Attribute::Endurance, endurance);
        knight.max_hp = 10_000;
        knight.hp = 10_000;
        let armor_class = knight.armor_class();
        let dealt = knight.take_damage(incoming, DamageType::Physical);
        prop_assert!(dealt >= 1);
        prop_assert_eq!(dealt, (incoming - armor_class / 2).max(1));
        prop_assert_eq!(knight.hp, 10_000 - dealt);
    }

    #[test]
    fn equipping_back_the_displaced_item_restores_everything(
        class in select(vec![CharacterClass::Knight, CharacterClass::Cleric, CharacterClass::Sorcerer]),
        key in select(WEARABLES.to_vec()),
    ) {
        let content = load_content();
        let tuning = content.tuning();
        let mut character = Character::new("Probe", class, &content).unwrap();
        let item = content.instantiate(key).unwrap();
        let Ok(slot) = character.equip_slot_for(&item) else {
            return Ok(());
        };
        let equipment = character.equipment.clone();
        let totals = stat_totals(&character);

        match character.equip_into(slot, item, tuning) {
            Some(previous) => {
                character.equip_into(slot, previous, tuning);
            }
            None => {
                character.unequip(slot, tuning);
            }
        }

        prop_assert_eq!(&character.equipment, &equipment);
        prop_assert_eq!(stat_totals(&character), totals);
    }

    #[test]
    fn kill_progress_never_decreases(kills in proptest::collection::vec(
        select(vec!["goblin", "dragon", "giant_spider", "pixie"]),
        0..40,
    )) {
        let content = load_content();
        let mut quests = QuestManager::new(content.quests().clone());
        quests.initialize_starting_quests();
        quests.activate("spider_nest").unwrap();
        quests.activate("dragon_slayer").unwrap();

        let progress = |quests: &QuestManager| -> Vec<u32> {
            quests.quests().map(|quest| quest.progress).collect()
        };
        let mut before = progress(&quests);
        for key in kills {
            quests.on_monster_killed(key);
            let after = progress(&quests);
            prop_assert!(before.iter().zip(&after).all(|(old, new)| new >= old));
            before = after;
        }
    }
}
