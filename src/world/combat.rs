// src/world/combat.rs
//! Разрешение атак
//!
//! Атакующий бросает по кубику на каждую армию в исходной стране, защитник —
//! на каждую армию в целевой. Исход решают суммы: атака успешна, только если
//! сумма атакующего строго больше. Потери считаются попарно: кубики обеих
//! сторон сортируются по убыванию, в каждой паре проигрывает меньший кубик,
//! ничья — в пользу атакующего. Лишние кубики большей стороны не сравниваются.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Country, CountryId};

pub const DIE_SIDES: u8 = 6;

/// `count` бросков шестигранного кубика
pub fn roll_dice<R: Rng + ?Sized>(count: u32, rng: &mut R) -> Vec<u8> {
    (0..count).map(|_| rng.gen_range(1..=DIE_SIDES)).collect()
}

/// Результаты бросков обеих сторон
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub attacker: Vec<u8>,
    pub defender: Vec<u8>,
}

impl DiceRoll {
    #[must_use]
    pub fn new(attacker: Vec<u8>, defender: Vec<u8>) -> Self {
        Self { attacker, defender }
    }

    pub fn roll<R: Rng + ?Sized>(attackers: u32, defenders: u32, rng: &mut R) -> Self {
        Self::new(roll_dice(attackers, rng), roll_dice(defenders, rng))
    }

    #[must_use]
    pub fn attacker_sum(&self) -> u32 {
        self.attacker.iter().map(|&d| u32::from(d)).sum()
    }

    #[must_use]
    pub fn defender_sum(&self) -> u32 {
        self.defender.iter().map(|&d| u32::from(d)).sum()
    }

    #[must_use]
    pub fn attacker_wins(&self) -> bool {
        self.attacker_sum() > self.defender_sum()
    }

    /// Потери `(атакующего, защитника)` по попарному сравнению
    #[must_use]
    pub fn casualties(&self) -> (u32, u32) {
        let mut attacker = self.attacker.clone();
        let mut defender = self.defender.clone();
        attacker.sort_unstable_by(|a, b| b.cmp(a));
        defender.sort_unstable_by(|a, b| b.cmp(a));

        attacker
            .iter()
            .zip(&defender)
            .fold((0, 0), |(lost, killed), (a, d)| {
                if a >= d {
                    (lost, killed + 1)
                } else {
                    (lost + 1, killed)
                }
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// Страна захвачена атакующим
    Conquered,
    /// Атака отбита
    Repelled,
}

/// Итог одной атаки
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battle {
    pub attacker: CountryId,
    pub defender: CountryId,
    pub roll: DiceRoll,
    pub attacker_casualties: u32,
    pub defender_casualties: u32,
    pub outcome: BattleOutcome,
}

/// Применяет броски к двум странам и возвращает их новые значения.
///
/// При захвате в целевую страну переходит `min(s.armies − 1, t.slots)` армий,
/// из которых вычитаются потери атакующего (но остаётся минимум одна).
/// При отражении обе стороны теряют свои потери, не опускаясь ниже одной армии.
pub(crate) fn resolve(source: &Country, target: &Country, roll: DiceRoll) -> (Country, Country, Battle) {
    let (attacker_casualties, defender_casualties) = roll.casualties();

    let (source, target, outcome) = if roll.attacker_wins() {
        let movers = source.armies.saturating_sub(1).min(target.slots);
        let occupying = movers.saturating_sub(attacker_casualties).max(1);
        (
            source.with_armies(source.armies - movers),
            target.with_player(source.player).with_armies(occupying),
            BattleOutcome::Conquered,
        )
    } else {
        (
            source.with_armies(source.armies.saturating_sub(attacker_casualties).max(1)),
            target.with_armies(target.armies.saturating_sub(defender_casualties).max(1)),
            BattleOutcome::Repelled,
        )
    };

    let battle = Battle {
        attacker: source.id,
        defender: target.id,
        roll,
        attacker_casualties,
        defender_casualties,
        outcome,
    };
    (source, target, battle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn casualties_compare_sorted_pairs() {
        let roll = DiceRoll::new(vec![1, 4, 6, 2], vec![5, 6]);
        // пара 6:6 за атакующим, пара 4:5 за защитником
        assert_eq!(roll.casualties(), (1, 1));
        assert_eq!(roll.attacker_sum(), 13);
        assert_eq!(roll.defender_sum(), 11);
        assert!(roll.attacker_wins());
    }

    #[test]
    fn equal_sums_favour_defender() {
        let roll = DiceRoll::new(vec![3, 3], vec![6]);
        assert!(!roll.attacker_wins());
        assert_eq!(roll.casualties(), (1, 0));
    }

    #[test]
    fn unpaired_dice_are_ignored() {
        let roll = DiceRoll::new(vec![2], vec![1, 1, 1]);
        assert_eq!(roll.casualties(), (0, 1));
    }

    #[test]
    fn dice_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let dice = roll_dice(500, &mut rng);
        assert_eq!(dice.len(), 500);
        assert!(dice.iter().all(|d| (1..=DIE_SIDES).contains(d)));
        assert!(dice.contains(&1) && dice.contains(&6));
    }
}
