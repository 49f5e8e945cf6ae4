//! Starting templates for the six character classes.
//! Item and spell keys named here must resolve in the loaded bundle; character creation
//! reports a missing key instead of inventing a fallback.

use crate::types::{Attribute, CharacterClass, MagicSchool, SkillType};

pub struct ClassTemplate {
    /// Values in `Attribute::ALL` order.
    pub attributes: [i32; 7],
    pub skills: &'static [(SkillType, u32)],
    pub schools: &'static [(MagicSchool, &'static [&'static str])],
    pub weapon: &'static str,
    pub armor: Option<&'static str>,
    /// Spell placed in the spell slot at creation, when the class has one.
    pub ready_spell: Option<&'static str>,
}

impl ClassTemplate {
    pub fn attribute(&self, attribute: Attribute) -> i32 {
        Attribute::ALL
            .iter()
            .position(|candidate| *candidate == attribute)
            .map_or(0, |index| self.attributes[index])
    }
}

pub fn class_template(class: CharacterClass) -> ClassTemplate {
    match class {
        CharacterClass::Knight => ClassTemplate {
            attributes: [20, 8, 8, 18, 14, 12, 10],
            skills: &[(SkillType::Sword, 1), (SkillType::Shield, 1), (SkillType::LeatherArmor, 1)],
            schools: &[],
            weapon: "iron_sword",
            armor: Some("leather_armor"),
            ready_spell: None,
        },
        CharacterClass::Paladin => ClassTemplate {
            attributes: [16, 10, 14, 16, 12, 10, 10],
            skills: &[(SkillType::Mace, 1), (SkillType::ChainArmor, 1)],
            schools: &[(MagicSchool::Spirit, &["spirit_lash"]), (MagicSchool::Body, &["heal"])],
            weapon: "iron_mace",
            armor: Some("leather_armor"),
            ready_spell: None,
        },
        CharacterClass::Archer => ClassTemplate {
            attributes: [12, 12, 10, 12, 20, 16, 12],
            skills: &[(SkillType::Bow, 1), (SkillType::Dagger, 1), (SkillType::LeatherArmor, 1)],
            schools: &[(MagicSchool::Air, &["lightning_bolt"])],
            weapon: "longbow",
            armor: Some("leather_armor"),
            ready_spell: None,
        },
        CharacterClass::Cleric => ClassTemplate {
            attributes: [10, 14, 18, 12, 10, 10, 12],
            skills: &[(SkillType::Mace, 1), (SkillType::Meditation, 1)],
            schools: &[
                (MagicSchool::Body, &["heal"]),
                (MagicSchool::Mind, &["awaken"]),
                (MagicSchool::Spirit, &["spirit_lash"]),
            ],
            weapon: "iron_mace",
            armor: None,
            ready_spell: Some("heal"),
        },
        CharacterClass::Sorcerer => ClassTemplate {
            attributes: [8, 20, 12, 10, 12, 12, 12],
            skills: &[(SkillType::Staff, 1), (SkillType::Dagger, 1), (SkillType::Meditation, 1)],
            schools: &[
                (MagicSchool::Fire, &["fire_bolt"]),
                (MagicSchool::Air, &["lightning_bolt", "wizard_eye"]),
                (MagicSchool::Water, &["ice_shard", "water_walk"]),
            ],
            weapon: "quarterstaff",
            armor: None,
            ready_spell: Some("fire_bolt"),
        },
        CharacterClass::Druid => ClassTemplate {
            attributes: [10, 16, 16, 12, 12, 12, 12],
            skills: &[(SkillType::Staff, 1), (SkillType::Spear, 1)],
            schools: &[
                (MagicSchool::Earth, &["poison_spray"]),
                (MagicSchool::Water, &["ice_shard"]),
                (MagicSchool::Body, &["heal"]),
            ],
            weapon: "quarterstaff",
            armor: None,
            ready_spell: Some("poison_spray"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeaponCategory;

    #[test]
    fn every_class_can_wield_its_starting_weapon_category() {
        let categories = [
            ("iron_sword", WeaponCategory::Sword),
            ("iron_mace", WeaponCategory::Mace),
            ("longbow", WeaponCategory::Bow),
            ("quarterstaff", WeaponCategory::Staff),
        ];
        for class in CharacterClass::ALL {
            let template = class_template(class);
            let category = categories
                .iter()
                .find(|(key, _)| *key == template.weapon)
                .map(|(_, category)| *category)
                .expect("starting weapon has a known category");
            assert!(class.can_wield(category), "{} cannot wield {}", class.as_str(), template.weapon);
            assert!(
                template.skills.iter().any(|(skill, _)| *skill == category.skill()),
                "{} lacks the skill for its starting weapon",
                class.as_str()
            );
        }
    }

    #[test]
    fn cleric_template_matches_regeneration_fixture() {
        let template = class_template(CharacterClass::Cleric);
        assert_eq!(template.attribute(Attribute::Personality), 18);
        assert_eq!(template.attribute(Attribute::Intellect), 14);
    }
}
