// src/world/reinforcement.rs
//! Подкрепления
//!
//! Для страны игрока глубина — число переходов до ближайшей чужой или
//! свободной страны (пограничная страна имеет глубину 0). Страны группируются
//! по глубине, и бюджет подкреплений раздаётся корзинам по возрастанию
//! глубины: сначала граница, остаток уходит вглубь.
//!
//! Бюджет: `min(размер наибольшей компоненты связности, сумма свободных мест)`.

use crate::error::{Error, Result};
use crate::graph::Graph;

use super::{Country, CountryId, PlayerId};

/// Стратегия раздачи армий внутри одной корзины глубины
pub trait Distribute {
    /// Раздаёт не более `n` армий странам с `available` свободными местами.
    /// Возвращает по числу на страну; значения больше `available[i]` обрезаются,
    /// недостающие считаются нулями, лишние отбрасываются.
    fn distribute(&mut self, n: u32, available: &[u32]) -> Vec<u32>;
}

/// По одной армии по кругу, пока не кончится бюджет или места
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenDistribution;

impl Distribute for EvenDistribution {
    fn distribute(&mut self, n: u32, available: &[u32]) -> Vec<u32> {
        let mut amounts = vec![0; available.len()];
        let mut left = n;
        while left > 0 {
            let mut placed = false;
            for (amount, &free) in amounts.iter_mut().zip(available) {
                if left == 0 {
                    break;
                }
                if *amount < free {
                    *amount += 1;
                    left -= 1;
                    placed = true;
                }
            }
            if !placed {
                break;
            }
        }
        amounts
    }
}

impl<F> Distribute for F
where
    F: FnMut(u32, &[u32]) -> Vec<u32>,
{
    fn distribute(&mut self, n: u32, available: &[u32]) -> Vec<u32> {
        self(n, available)
    }
}

/// Корзины глубины: `index[d]` — страны игрока на расстоянии `d` от чужой земли.
///
/// # Ошибки
/// `Error::EnclosedTerritory`, если из какой-то страны игрока не достижима ни
/// одна чужая или свободная страна.
pub fn depth_index(
    graph: &Graph<Country>,
    player: PlayerId,
    components: &[Graph<Country>],
) -> Result<Vec<Vec<CountryId>>> {
    let mut index: Vec<Vec<CountryId>> = Vec::new();

    for id in components.iter().flat_map(|component| component.keys()) {
        let path = graph
            .shortest_path_by(id, |country, _| !country.is_occupied_by(player))
            .map_err(|err| match err {
                Error::NoPath => Error::EnclosedTerritory(id),
                other => other,
            })?;
        // путь включает саму страну и найденную чужую
        let depth = path.len().saturating_sub(2);
        if index.len() <= depth {
            index.resize_with(depth + 1, Vec::new);
        }
        index[depth].push(id);
    }

    Ok(index)
}

/// Общий бюджет подкреплений игрока
#[must_use]
pub fn total_reinforcements(components: &[Graph<Country>]) -> u32 {
    let largest = components.iter().map(|component| component.len()).max().unwrap_or(0);
    let available: u32 = components
        .iter()
        .flat_map(|component| component.values())
        .map(Country::available_slots)
        .sum();
    u32::try_from(largest).unwrap_or(u32::MAX).min(available)
}

/// Пары `(страна, сколько добавить)` в порядке корзин
pub fn reinforcement_map<D: Distribute + ?Sized>(
    graph: &Graph<Country>,
    components: &[Graph<Country>],
    index: &[Vec<CountryId>],
    distributor: &mut D,
) -> Vec<(CountryId, u32)> {
    let mut budget = total_reinforcements(components);
    let mut map = Vec::new();

    for bucket in index {
        if budget == 0 {
            break;
        }
        let available: Vec<u32> = bucket
            .iter()
            .map(|id| graph.get(*id).map_or(0, Country::available_slots))
            .collect();

        let mut amounts = distributor.distribute(budget, &available);
        if amounts.len() != bucket.len() {
            tracing::warn!(
                expected = bucket.len(),
                got = amounts.len(),
                "distribution length differs from bucket size, missing entries count as zero"
            );
            amounts.resize(bucket.len(), 0);
        }
        for ((id, free), amount) in bucket.iter().zip(&available).zip(amounts) {
            let granted = amount.min(*free).min(budget);
            budget -= granted;
            map.push((*id, granted));
        }
    }

    map
}
