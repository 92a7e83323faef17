//! Cinder card list: ids, metadata, summoning procedures.

use crate::cards::{
    Attribute, CardDatabase, CardDefinition, CardId, CardKind, CardMeta, Race, SummonCategory,
};
use crate::core::error::ModelError;
use crate::rules::{MaterialSpec, SummonProcedure};

pub const ACOLYTE: CardId = CardId(1001);
pub const HERALD: CardId = CardId(1002);
pub const RITE: CardId = CardId(1003);
pub const SANCTUM: CardId = CardId(1004);
pub const VIGIL: CardId = CardId(1005);
pub const ZEALOT: CardId = CardId(1100);

pub const REQUIEM: CardId = CardId(2001);
pub const SOVEREIGN: CardId = CardId(2002);
pub const SEQUENCE: CardId = CardId(2003);
pub const BELLWARDEN: CardId = CardId(2004);

/// Alternate print of the Acolyte.
pub const ACOLYTE_ALT: CardId = CardId(11001);

/// Archetype marker shared by every card name.
pub const ARCHETYPE: &str = "Cinder";

/// Every Cinder card definition.
#[must_use]
pub fn definitions() -> Vec<CardDefinition> {
    use Attribute::{Dark, Light};
    use Race::Fiend;

    vec![
        CardDefinition::new(ACOLYTE, "Cinder Acolyte", CardMeta::monster(Light, Fiend, 4)),
        CardDefinition::new(HERALD, "Cinder Herald", CardMeta::monster(Light, Fiend, 4)),
        CardDefinition::new(RITE, "Cinder Rite", CardMeta::non_monster(CardKind::Spell)),
        CardDefinition::new(SANCTUM, "Cinder Sanctum", CardMeta::non_monster(CardKind::FieldSpell)),
        CardDefinition::new(VIGIL, "Cinder Vigil", CardMeta::non_monster(CardKind::Trap)),
        CardDefinition::new(ZEALOT, "Cinder Zealot", CardMeta::monster(Dark, Fiend, 4)),
        CardDefinition::new(
            REQUIEM,
            "Cinder Requiem",
            CardMeta::extra(SummonCategory::Link, Light, Fiend, 1),
        ),
        CardDefinition::new(
            SOVEREIGN,
            "Cinder Sovereign",
            CardMeta::extra(SummonCategory::Fusion, Light, Fiend, 8),
        ),
        CardDefinition::new(
            SEQUENCE,
            "Cinder Sequence",
            CardMeta::extra(SummonCategory::Link, Dark, Fiend, 2),
        ),
        CardDefinition::new(
            BELLWARDEN,
            "Cinder Bellwarden",
            CardMeta::extra(SummonCategory::Xyz, Light, Fiend, 4),
        ),
    ]
}

/// Material requirements of the extra deck cards.
#[must_use]
pub fn procedures() -> Vec<SummonProcedure> {
    vec![
        // 1 LIGHT Fiend
        SummonProcedure::new(
            REQUIEM,
            SummonCategory::Link,
            MaterialSpec::new(1, 1)
                .attribute(Attribute::Light)
                .race(Race::Fiend),
        ),
        // Cinder Acolyte + 1 Fiend
        SummonProcedure::new(
            SOVEREIGN,
            SummonCategory::Fusion,
            MaterialSpec::new(2, 2).named(ACOLYTE).race(Race::Fiend),
        ),
        // 2 Fiends
        SummonProcedure::new(
            SEQUENCE,
            SummonCategory::Link,
            MaterialSpec::new(2, 2).race(Race::Fiend),
        ),
        // 2 level 4 monsters
        SummonProcedure::new(BELLWARDEN, SummonCategory::Xyz, MaterialSpec::new(2, 2)),
    ]
}

/// Card database holding the Cinder pool and its alias ids.
pub fn database() -> Result<CardDatabase, ModelError> {
    let mut db = CardDatabase::new();
    for card in definitions() {
        db.register(card)?;
    }
    db.add_alias(ACOLYTE_ALT, ACOLYTE)?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{MetadataResolver, Provenance};

    #[test]
    fn test_database_resolves_pool() {
        let db = database().unwrap();
        assert_eq!(db.len(), definitions().len());

        let sovereign = db.resolve(SOVEREIGN).unwrap();
        assert!(sovereign.meta.from_extra);
        assert_eq!(sovereign.meta.category, SummonCategory::Fusion);

        let alt = db.resolve(ACOLYTE_ALT).unwrap();
        assert_eq!(alt.cid, ACOLYTE);
        assert_eq!(alt.provenance, Provenance::Alias { requested: ACOLYTE_ALT });

        assert_eq!(db.resolve(CardId(900_001)).unwrap().provenance, Provenance::Inert);
        assert!(db.resolve(CardId(4242)).is_err());
    }

    #[test]
    fn test_every_extra_card_has_a_procedure() {
        let procs = procedures();
        for card in definitions().iter().filter(|c| c.meta.from_extra) {
            assert!(procs.iter().any(|p| p.card == card.id && p.category == card.meta.category));
        }
    }
}
