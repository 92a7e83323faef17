//! Summoning procedures and material sufficiency.
//!
//! Each extra deck card registers a `SummonProcedure`: its category and a
//! `MaterialSpec` describing which monsters may be used. `check` decides
//! whether a concrete material set is sufficient.
//!
//! ## Counting rules
//!
//! - Link: with `n` materials, link rating `r` and maximum contribution
//!   `c` (a link material may count as its own rating instead of one),
//!   the set is legal iff `n <= r <= c`.
//! - Fusion: `min..=max` materials, one each.
//! - Synchro: exactly one tuner; levels sum to the synchro level.
//! - Xyz: `min..=max` materials whose level equals the rank.
//!
//! Link monsters have no level, so they are never synchro or xyz material.

use serde::{Deserialize, Serialize};

use crate::cards::{Attribute, CardId, CardInstance, CardMeta, Race, SummonCategory};
use crate::core::error::Illegal;

/// Which monsters qualify as materials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSpec {
    pub min: u8,
    pub max: u8,
    /// Specific cards that must each be one of the materials.
    #[serde(default)]
    pub named: Vec<CardId>,
    /// Requirements for every material not claimed by `named`.
    #[serde(default)]
    pub attribute: Option<Attribute>,
    #[serde(default)]
    pub race: Option<Race>,
}

impl MaterialSpec {
    /// Between `min` and `max` monsters with no further requirement.
    #[must_use]
    pub fn new(min: u8, max: u8) -> Self {
        Self {
            min,
            max,
            named: Vec::new(),
            attribute: None,
            race: None,
        }
    }

    #[must_use]
    pub fn named(mut self, card: CardId) -> Self {
        self.named.push(card);
        self
    }

    #[must_use]
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attribute = Some(attribute);
        self
    }

    #[must_use]
    pub fn race(mut self, race: Race) -> Self {
        self.race = Some(race);
        self
    }

    fn generic_fits(&self, card: &CardInstance) -> bool {
        self.attribute.map_or(true, |a| card.meta.attribute == a)
            && self.race.map_or(true, |r| card.meta.race == r)
    }
}

/// How one extra deck card is summoned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonProcedure {
    pub card: CardId,
    pub category: SummonCategory,
    pub materials: MaterialSpec,
}

impl SummonProcedure {
    #[must_use]
    pub fn new(card: CardId, category: SummonCategory, materials: MaterialSpec) -> Self {
        Self {
            card,
            category,
            materials,
        }
    }

    /// Decide whether `materials` can summon a card with `target` metadata.
    pub fn check(&self, target: &CardMeta, materials: &[&CardInstance]) -> Result<(), Illegal> {
        let spec = &self.materials;

        for m in materials {
            if !m.meta.is_monster() {
                return Err(Illegal::InvalidMaterial(m.cid));
            }
        }

        // Named materials claim one distinct card each, the rest must
        // satisfy the generic requirements.
        let mut pool: Vec<&CardInstance> = materials.to_vec();
        for &named in &spec.named {
            match pool.iter().position(|m| m.cid == named) {
                Some(pos) => {
                    pool.remove(pos);
                }
                None => return Err(Illegal::InvalidMaterial(named)),
            }
        }
        if let Some(bad) = pool.iter().find(|m| !spec.generic_fits(m)) {
            return Err(Illegal::InvalidMaterial(bad.cid));
        }

        let n = materials.len() as u32;
        match self.category {
            SummonCategory::Normal => Err(Illegal::NotSummonable(self.card)),
            SummonCategory::Link => check_link(target, materials, u32::from(spec.min)),
            SummonCategory::Fusion => check_count(n, spec),
            SummonCategory::Synchro => check_synchro(target, materials, spec),
            SummonCategory::Xyz => {
                if let Some(bad) = materials
                    .iter()
                    .find(|m| m.meta.is_link() || m.meta.level != target.level)
                {
                    return Err(Illegal::InvalidMaterial(bad.cid));
                }
                check_count(n, spec)
            }
        }
    }
}

/// Contribution of one material toward a link summon.
#[must_use]
pub fn link_contribution(material: &CardInstance) -> u32 {
    if material.meta.is_link() {
        u32::from(material.link_rating().max(1))
    } else {
        1
    }
}

fn check_link(target: &CardMeta, materials: &[&CardInstance], min: u32) -> Result<(), Illegal> {
    let rating = u32::from(target.link_rating.unwrap_or(0));
    let n = materials.len() as u32;
    let floor = rating.min(min.max(1));

    if n < floor {
        return Err(Illegal::InsufficientMaterials {
            required: floor,
            provided: n,
        });
    }
    if n > rating {
        return Err(Illegal::TooManyMaterials {
            max: rating,
            provided: n,
        });
    }
    let contribution: u32 = materials.iter().map(|m| link_contribution(m)).sum();
    if contribution < rating {
        return Err(Illegal::InsufficientMaterials {
            required: rating,
            provided: contribution,
        });
    }
    Ok(())
}

fn check_count(n: u32, spec: &MaterialSpec) -> Result<(), Illegal> {
    if n < u32::from(spec.min) {
        return Err(Illegal::InsufficientMaterials {
            required: u32::from(spec.min),
            provided: n,
        });
    }
    if n > u32::from(spec.max) {
        return Err(Illegal::TooManyMaterials {
            max: u32::from(spec.max),
            provided: n,
        });
    }
    Ok(())
}

fn check_synchro(
    target: &CardMeta,
    materials: &[&CardInstance],
    spec: &MaterialSpec,
) -> Result<(), Illegal> {
    if let Some(bad) = materials.iter().find(|m| m.meta.is_link()) {
        return Err(Illegal::InvalidMaterial(bad.cid));
    }
    let tuners: Vec<_> = materials.iter().filter(|m| m.meta.tuner).collect();
    match tuners.len() {
        1 => {}
        0 => {
            return Err(match materials.first() {
                Some(m) => Illegal::InvalidMaterial(m.cid),
                None => Illegal::InsufficientMaterials {
                    required: u32::from(spec.min.max(2)),
                    provided: 0,
                },
            })
        }
        _ => return Err(Illegal::InvalidMaterial(tuners[1].cid)),
    }
    check_count(materials.len() as u32, spec)?;

    let sum: u32 = materials.iter().map(|m| u32::from(m.meta.level)).sum();
    let level = u32::from(target.level);
    if sum != level {
        return Err(Illegal::InsufficientMaterials {
            required: level,
            provided: sum,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Provenance, ResolvedCard};
    use crate::core::entity::InstanceId;

    fn inst(id: u32, meta: CardMeta) -> CardInstance {
        CardInstance::new(
            InstanceId(id),
            &ResolvedCard {
                cid: CardId::new(id),
                name: format!("Card {id}"),
                meta,
                provenance: Provenance::Direct,
            },
        )
    }

    fn fiend(id: u32, level: u8) -> CardInstance {
        inst(id, CardMeta::monster(Attribute::Light, Race::Fiend, level))
    }

    fn link_meta(rating: u8) -> CardMeta {
        CardMeta::extra(SummonCategory::Link, Attribute::Light, Race::Fiend, rating)
    }

    fn link_proc(rating_min: u8) -> SummonProcedure {
        SummonProcedure::new(
            CardId::new(500),
            SummonCategory::Link,
            MaterialSpec::new(rating_min, 5).race(Race::Fiend),
        )
    }

    #[test]
    fn test_link_flat_count() {
        let target = link_meta(2);
        let a = fiend(1, 4);
        let b = fiend(2, 4);
        assert!(link_proc(1).check(&target, &[&a, &b]).is_ok());
        assert_eq!(
            link_proc(1).check(&target, &[&a]),
            Err(Illegal::InsufficientMaterials {
                required: 2,
                provided: 1
            })
        );
    }

    #[test]
    fn test_link_material_contributes_rating() {
        let target = link_meta(2);
        let link2 = inst(7, link_meta(2));
        // A single link-2 material satisfies a link-2 summon
        assert!(link_proc(1).check(&target, &[&link2]).is_ok());

        // A link-1 only contributes one
        let link1 = inst(8, link_meta(1));
        assert_eq!(
            link_proc(1).check(&target, &[&link1]),
            Err(Illegal::InsufficientMaterials {
                required: 2,
                provided: 1
            })
        );
    }

    #[test]
    fn test_link_too_many() {
        let target = link_meta(1);
        let a = fiend(1, 4);
        let b = fiend(2, 4);
        assert_eq!(
            link_proc(1).check(&target, &[&a, &b]),
            Err(Illegal::TooManyMaterials { max: 1, provided: 2 })
        );
    }

    #[test]
    fn test_generic_filter() {
        let target = link_meta(1);
        let dragon = inst(3, CardMeta::monster(Attribute::Dark, Race::Dragon, 4));
        assert_eq!(
            link_proc(1).check(&target, &[&dragon]),
            Err(Illegal::InvalidMaterial(CardId::new(3)))
        );
    }

    #[test]
    fn test_fusion_named_material() {
        let target = CardMeta::extra(SummonCategory::Fusion, Attribute::Light, Race::Fiend, 8);
        let proc = SummonProcedure::new(
            CardId::new(600),
            SummonCategory::Fusion,
            MaterialSpec::new(2, 2)
                .named(CardId::new(1))
                .attribute(Attribute::Light)
                .race(Race::Fiend),
        );
        let herald = fiend(1, 6);
        let other = fiend(2, 6);
        assert!(proc.check(&target, &[&other, &herald]).is_ok());
        assert_eq!(
            proc.check(&target, &[&other, &other]),
            Err(Illegal::InvalidMaterial(CardId::new(1)))
        );
        assert_eq!(
            proc.check(&target, &[&herald]),
            Err(Illegal::InsufficientMaterials {
                required: 2,
                provided: 1
            })
        );
    }

    #[test]
    fn test_synchro() {
        let target = CardMeta::extra(SummonCategory::Synchro, Attribute::Light, Race::Fiend, 8);
        let proc = SummonProcedure::new(
            CardId::new(700),
            SummonCategory::Synchro,
            MaterialSpec::new(2, 5),
        );
        let tuner = inst(1, CardMeta::monster(Attribute::Light, Race::Fiend, 2).with_tuner());
        let six = fiend(2, 6);
        let four = fiend(3, 4);

        assert!(proc.check(&target, &[&tuner, &six]).is_ok());
        assert_eq!(
            proc.check(&target, &[&tuner, &four]),
            Err(Illegal::InsufficientMaterials {
                required: 8,
                provided: 6
            })
        );
        assert_eq!(
            proc.check(&target, &[&four, &four]),
            Err(Illegal::InvalidMaterial(CardId::new(3)))
        );
    }

    #[test]
    fn test_xyz_levels_must_match_rank() {
        let target = CardMeta::extra(SummonCategory::Xyz, Attribute::Light, Race::Fiend, 6);
        let proc = SummonProcedure::new(CardId::new(800), SummonCategory::Xyz, MaterialSpec::new(2, 2));
        let a = fiend(1, 6);
        let b = fiend(2, 6);
        let c = fiend(3, 4);
        assert!(proc.check(&target, &[&a, &b]).is_ok());
        assert_eq!(
            proc.check(&target, &[&a, &c]),
            Err(Illegal::InvalidMaterial(CardId::new(3)))
        );
        assert_eq!(
            proc.check(&target, &[&a]),
            Err(Illegal::InsufficientMaterials {
                required: 2,
                provided: 1
            })
        );
    }

    #[test]
    fn test_non_monster_material() {
        let target = link_meta(1);
        let spell = inst(9, CardMeta::non_monster(crate::cards::CardKind::Spell));
        assert_eq!(
            link_proc(1).check(&target, &[&spell]),
            Err(Illegal::InvalidMaterial(CardId::new(9)))
        );
    }
}
