//! Target selection helpers.
//!
//! - `CardFilter`: predicate over card instances (builder style)
//! - `find`: locations in a set of zones matching a filter
//! - `distinct`: collapse interchangeable pile copies
//! - `combinations`: k-subsets for material and multi-target choices

use crate::cards::{Attribute, CardId, CardInstance, CardKind, Race, SummonCategory};
use crate::core::entity::InstanceId;
use crate::core::state::GameState;
use crate::core::Zone;
use crate::zones::CardLoc;

/// Filter for valid targets. Unset fields match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub card: Option<CardId>,
    /// Substring of the card name shared by an archetype.
    pub archetype: Option<&'static str>,
    pub kind: Option<CardKind>,
    pub attribute: Option<Attribute>,
    pub race: Option<Race>,
    pub category: Option<SummonCategory>,
    pub from_extra: Option<bool>,
    pub exclude: Option<InstanceId>,
}

impl CardFilter {
    /// Match every card.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn card(mut self, id: CardId) -> Self {
        self.card = Some(id);
        self
    }

    #[must_use]
    pub fn archetype(mut self, name: &'static str) -> Self {
        self.archetype = Some(name);
        self
    }

    #[must_use]
    pub fn monster(mut self) -> Self {
        self.kind = Some(CardKind::Monster);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: CardKind) -> Self {
        self.kind = Some(kind);
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

    #[must_use]
    pub fn category(mut self, category: SummonCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Only main deck cards.
    #[must_use]
    pub fn main_deck(mut self) -> Self {
        self.from_extra = Some(false);
        self
    }

    #[must_use]
    pub fn excluding(mut self, uid: InstanceId) -> Self {
        self.exclude = Some(uid);
        self
    }

    /// Check a card against every set field.
    #[must_use]
    pub fn matches(&self, card: &CardInstance) -> bool {
        self.card.map_or(true, |id| card.cid == id)
            && self.archetype.map_or(true, |a| card.name.contains(a))
            && self.kind.map_or(true, |k| card.meta.kind == k)
            && self.attribute.map_or(true, |a| card.meta.attribute == a)
            && self.race.map_or(true, |r| card.meta.race == r)
            && self.category.map_or(true, |c| card.meta.category == c)
            && self.from_extra.map_or(true, |x| card.meta.from_extra == x)
            && self.exclude.map_or(true, |u| card.uid != u)
    }
}

/// Locations in `zones` holding a card that matches `filter`.
#[must_use]
pub fn find(state: &GameState, zones: &[Zone], filter: &CardFilter) -> Vec<CardLoc> {
    zones
        .iter()
        .flat_map(|&z| state.cards_in(z))
        .filter(|(_, c)| filter.matches(c))
        .map(|(loc, _)| loc)
        .collect()
}

/// Keep one location per card id within each pile zone.
///
/// Copies of a card in a pile carry no flags, so targeting any of them
/// leads to the same position. Field cards are kept individually.
#[must_use]
pub fn distinct(state: &GameState, locs: &[CardLoc]) -> Vec<CardLoc> {
    let mut seen: Vec<(Zone, CardId)> = Vec::new();
    let mut out = Vec::with_capacity(locs.len());
    for &loc in locs {
        let Some(card) = state.card_at(loc) else {
            continue;
        };
        if !loc.zone.is_field() {
            let key = (loc.zone, card.cid);
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
        }
        out.push(loc);
    }
    out
}

/// All `k`-element subsets of `items`, in lexicographic index order.
#[must_use]
pub fn combinations<T: Copy>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let n = items.len();
    if k > n {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(idx.iter().map(|&i| items[i]).collect());

        // Advance the rightmost index that still has room
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if idx[i] != i + n - k {
                break;
            }
            if i == 0 {
                return out;
            }
        }
        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardMeta, Provenance, ResolvedCard};

    fn card(id: u32, name: &str, meta: CardMeta) -> ResolvedCard {
        ResolvedCard {
            cid: CardId::new(id),
            name: name.into(),
            meta,
            provenance: Provenance::Direct,
        }
    }

    #[test]
    fn test_filter_matches() {
        let mut state = GameState::default();
        let fiend = card(1, "Cinder Zealot", CardMeta::monster(Attribute::Light, Race::Fiend, 4));
        let loc = state.spawn(Zone::Hand, &fiend).unwrap();
        let inst = state.card_at(loc).unwrap();

        assert!(CardFilter::any().matches(inst));
        assert!(CardFilter::any().archetype("Cinder").monster().matches(inst));
        assert!(!CardFilter::any().race(Race::Dragon).matches(inst));
        assert!(!CardFilter::any().excluding(inst.uid).matches(inst));
        assert!(CardFilter::any().main_deck().attribute(Attribute::Light).matches(inst));
    }

    #[test]
    fn test_find_and_distinct() {
        let mut state = GameState::default();
        let zealot = card(1, "Cinder Zealot", CardMeta::monster(Attribute::Light, Race::Fiend, 4));
        let other = card(2, "Other", CardMeta::monster(Attribute::Dark, Race::Dragon, 4));
        state.spawn(Zone::Deck, &zealot).unwrap();
        state.spawn(Zone::Deck, &other).unwrap();
        state.spawn(Zone::Deck, &zealot).unwrap();

        let all = find(&state, &[Zone::Deck], &CardFilter::any());
        assert_eq!(all.len(), 3);

        let unique = distinct(&state, &all);
        assert_eq!(unique, vec![CardLoc::new(Zone::Deck, 0), CardLoc::new(Zone::Deck, 1)]);
    }

    #[test]
    fn test_combinations() {
        let items = [1, 2, 3, 4];
        let pairs = combinations(&items, 2);
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], vec![1, 2]);
        assert_eq!(pairs[5], vec![3, 4]);

        assert_eq!(combinations(&items, 4), vec![vec![1, 2, 3, 4]]);
        assert_eq!(combinations(&items, 0), vec![Vec::<i32>::new()]);
        assert!(combinations(&items, 5).is_empty());
    }
}
