// src/world/mod.rs
//! Мир: страны, игроки и переходы состояния
//!
//! `World` — неизменяемый снимок: гексагональная сетка и ячейки Вороного
//! (только для отладки и отрисовки), а также граф стран. Страны и их
//! смежность задаются один раз при генерации; после этого меняются лишь
//! значения вершин — владелец и число армий.
//!
//! Каждый переход (`move_armies`, `attack`, `reinforce`, `assign_players`)
//! возвращает новый `World`, исходный снимок остаётся прежним.

pub mod builder;
pub mod combat;
pub mod reinforcement;

pub use builder::build_world;
pub use combat::{Battle, BattleOutcome, DiceRoll};
pub use reinforcement::{Distribute, EvenDistribution};

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Point, Polygon};
use crate::graph::{Graph, Vertex};
use crate::hexgrid::Hexagon;

/// Число армий, с которым игрок начинает в своей первой стране
pub const STARTING_ARMIES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountryId(pub u32);

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Кто управляет игроком
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerKind {
    Human,
    Computer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub kind: PlayerKind,
}

impl Player {
    #[must_use]
    pub const fn new(id: u32, kind: PlayerKind) -> Self {
        Self {
            id: PlayerId(id),
            kind,
        }
    }
}

/// Страна — вершина графа мира
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    /// Граница страны (объединение гексагонов, сжатое внутрь)
    pub polygon: Polygon,
    pub center: Point,
    pub player: Option<PlayerId>,
    pub armies: u32,
    /// Вместимость: сколько армий страна может содержать
    pub slots: u32,
}

impl Country {
    #[must_use]
    pub fn new(id: CountryId, polygon: Polygon, center: Point, slots: u32) -> Self {
        Self {
            id,
            polygon,
            center,
            player: None,
            armies: 0,
            slots,
        }
    }

    /// Свободные места для подкреплений
    #[must_use]
    pub fn available_slots(&self) -> u32 {
        self.slots.saturating_sub(self.armies)
    }

    #[must_use]
    pub fn is_occupied_by(&self, player: PlayerId) -> bool {
        self.player == Some(player)
    }

    #[must_use]
    pub fn with_player(&self, player: Option<PlayerId>) -> Self {
        Self {
            player,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_armies(&self, armies: u32) -> Self {
        Self {
            armies,
            ..self.clone()
        }
    }
}

impl Vertex for Country {
    type Id = CountryId;

    fn id(&self) -> CountryId {
        self.id
    }
}

/// Сериализуемый снимок мира для слоя отображения и отладки
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub width: f64,
    pub height: f64,
    pub countries: Vec<Country>,
    pub edges: Vec<(CountryId, CountryId)>,
    pub cells: Vec<Polygon>,
}

#[derive(Debug, Clone)]
pub struct World {
    pub width: f64,
    pub height: f64,
    /// Гексагональная сетка (генерируется один раз, общая для всех снимков)
    pub hexagons: Arc<Vec<Hexagon>>,
    /// Границы ячеек Вороного (отладка)
    pub cells: Arc<Vec<Polygon>>,
    pub countries: Graph<Country>,
}

impl World {
    #[must_use]
    pub fn new(
        width: f64,
        height: f64,
        hexagons: Vec<Hexagon>,
        cells: Vec<Polygon>,
        countries: Graph<Country>,
    ) -> Self {
        Self {
            width,
            height,
            hexagons: Arc::new(hexagons),
            cells: Arc::new(cells),
            countries,
        }
    }

    /// Тот же мир с другим графом стран
    #[must_use]
    pub fn with_countries(&self, countries: Graph<Country>) -> Self {
        Self {
            countries,
            ..self.clone()
        }
    }

    pub fn country(&self, id: CountryId) -> Result<&Country> {
        self.countries.get(id).ok_or(Error::UnknownCountry(id))
    }

    pub fn countries(&self) -> impl Iterator<Item = &Country> + '_ {
        self.countries.values()
    }

    #[must_use]
    pub fn neighbours(&self, id: CountryId) -> Vec<&Country> {
        self.countries.adjacent_values(id)
    }

    #[must_use]
    pub fn countries_occupied_by(&self, player: PlayerId) -> Vec<&Country> {
        self.countries()
            .filter(|c| c.is_occupied_by(player))
            .collect()
    }

    #[must_use]
    pub fn armies_for_player(&self, player: PlayerId) -> u32 {
        self.countries_occupied_by(player)
            .iter()
            .map(|c| c.armies)
            .sum()
    }

    /// Размещает каждого игрока в случайной свободной стране с двумя армиями.
    ///
    /// # Ошибки
    /// `Error::NotEnoughCountries`, если игроков больше, чем стран.
    pub fn assign_players<R: Rng + ?Sized>(&self, players: &[Player], rng: &mut R) -> Result<World> {
        let keys: Vec<CountryId> = self.countries.keys().collect();
        if players.len() > keys.len() {
            return Err(Error::NotEnoughCountries {
                players: players.len(),
                countries: keys.len(),
            });
        }

        let chosen = rand::seq::index::sample(rng, keys.len(), players.len());
        let mut updated = Vec::with_capacity(players.len());
        for (player, index) in players.iter().zip(chosen.iter()) {
            let country = self.country(keys[index])?;
            tracing::debug!(player = %player.id, country = %country.id, "player placed");
            updated.push(
                country
                    .with_player(Some(player.id))
                    .with_armies(STARTING_ARMIES),
            );
        }

        Ok(self.with_countries(self.countries.merge(updated)))
    }

    fn check_adjacent(&self, source: CountryId, target: CountryId) -> Result<(&Country, &Country)> {
        let s = self.country(source)?;
        let t = self.country(target)?;
        if !self.countries.adjacent(source, target) {
            return Err(Error::NotAdjacent(source, target));
        }
        Ok((s, t))
    }

    /// Проверяет, что страна занята и в ней больше одной армии; возвращает владельца
    fn check_source(country: &Country) -> Result<PlayerId> {
        let player = country.player.ok_or(Error::Unoccupied(country.id))?;
        if country.armies <= 1 {
            return Err(Error::InsufficientArmies {
                country: country.id,
                armies: country.armies,
            });
        }
        Ok(player)
    }

    /// Сколько армий `player` может ввести в `target` за один ход
    fn capacity_for(target: &Country, player: PlayerId) -> u32 {
        if target.is_occupied_by(player) {
            target.available_slots()
        } else {
            target.slots
        }
    }

    #[must_use]
    pub fn can_move(&self, source: CountryId, target: CountryId) -> bool {
        self.plan_move(source, target).is_ok()
    }

    fn plan_move(&self, source: CountryId, target: CountryId) -> Result<(Country, Country)> {
        let (s, t) = self.check_adjacent(source, target)?;
        let player = Self::check_source(s)?;
        if t.player.is_some_and(|owner| owner != player) {
            return Err(Error::OccupiedByOpponent(target));
        }

        let n = (s.armies - 1).min(Self::capacity_for(t, player));
        if n == 0 {
            return Err(Error::NoCapacity(target));
        }

        let kept = if t.is_occupied_by(player) { t.armies } else { 0 };
        Ok((
            s.with_armies(s.armies - n),
            t.with_player(Some(player)).with_armies(kept + n),
        ))
    }

    /// Перемещает армии в соседнюю свободную или свою страну.
    ///
    /// Переходит `min(s.armies − 1, вместимость t)` армий; в исходной стране
    /// всегда остаётся хотя бы одна. Свободная страна переходит к игроку;
    /// страну другого игрока ход не занимает (`Error::OccupiedByOpponent`),
    /// для этого есть `attack`.
    pub fn move_armies(&self, source: CountryId, target: CountryId) -> Result<World> {
        let (s, t) = self.plan_move(source, target)?;
        tracing::debug!(%source, %target, armies = t.armies, "armies moved");
        Ok(self.with_countries(self.countries.merge([s, t])))
    }

    #[must_use]
    pub fn can_attack(&self, source: CountryId, target: CountryId) -> bool {
        self.check_attack(source, target).is_ok()
    }

    fn check_attack(&self, source: CountryId, target: CountryId) -> Result<(&Country, &Country)> {
        let (s, t) = self.check_adjacent(source, target)?;
        let player = Self::check_source(s)?;
        match t.player {
            None => Err(Error::Unoccupied(target)),
            Some(owner) if owner == player => Err(Error::SameOwner(source, target)),
            Some(_) => Ok((s, t)),
        }
    }

    /// Атака соседней страны противника: бросает кубики и разрешает бой
    pub fn attack<R: Rng + ?Sized>(
        &self,
        source: CountryId,
        target: CountryId,
        rng: &mut R,
    ) -> Result<(World, Battle)> {
        let (s, t) = self.check_attack(source, target)?;
        let roll = DiceRoll::roll(s.armies, t.armies, rng);
        self.resolve_attack(source, target, roll)
    }

    /// Разрешает атаку с заранее известным результатом бросков
    pub fn resolve_attack(
        &self,
        source: CountryId,
        target: CountryId,
        roll: DiceRoll,
    ) -> Result<(World, Battle)> {
        let (s, t) = self.check_attack(source, target)?;
        let (s, t, battle) = combat::resolve(s, t, roll);
        tracing::debug!(
            %source,
            %target,
            outcome = ?battle.outcome,
            attacker_casualties = battle.attacker_casualties,
            defender_casualties = battle.defender_casualties,
            "attack resolved"
        );
        Ok((self.with_countries(self.countries.merge([s, t])), battle))
    }

    /// Подкрепления игроку с распределением по умолчанию
    pub fn reinforce(&self, player: PlayerId) -> Result<World> {
        self.reinforce_with(player, &mut EvenDistribution)
    }

    /// Подкрепления игроку: сначала граница, затем глубина (см. `reinforcement`)
    pub fn reinforce_with<D: Distribute + ?Sized>(
        &self,
        player: PlayerId,
        distributor: &mut D,
    ) -> Result<World> {
        let components = self
            .countries
            .filter(|c| c.is_occupied_by(player))
            .connected_components();
        if components.is_empty() {
            return Ok(self.clone());
        }

        let index = reinforcement::depth_index(&self.countries, player, &components)?;
        let map = reinforcement::reinforcement_map(&self.countries, &components, &index, distributor);

        let mut updated = Vec::with_capacity(map.len());
        for (id, amount) in map {
            if amount > 0 {
                let country = self.country(id)?;
                updated.push(country.with_armies(country.armies + amount));
            }
        }
        tracing::debug!(
            %player,
            countries = updated.len(),
            "reinforcements applied"
        );

        Ok(self.with_countries(self.countries.merge(updated)))
    }

    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            width: self.width,
            height: self.height,
            countries: self.countries().cloned().collect(),
            edges: self.countries.edges(),
            cells: self.cells.as_ref().clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const P: PlayerId = PlayerId(0);
    pub const Q: PlayerId = PlayerId(1);

    pub fn country(id: u32, player: Option<PlayerId>, armies: u32, slots: u32) -> Country {
        let x = f64::from(id) * 10.0;
        let polygon = Polygon::new(vec![
            Point::new(x, 0.0),
            Point::new(x + 10.0, 0.0),
            Point::new(x + 10.0, 10.0),
            Point::new(x, 10.0),
        ]);
        Country {
            player,
            armies,
            ..Country::new(CountryId(id), polygon, Point::new(x + 5.0, 5.0), slots)
        }
    }

    pub fn world(countries: Vec<Country>, edges: &[(u32, u32)]) -> World {
        let graph = Graph::new(
            countries,
            edges.iter().map(|&(a, b)| (CountryId(a), CountryId(b))),
        )
        .unwrap();
        World::new(100.0, 10.0, Vec::new(), Vec::new(), graph)
    }

    /// Цепочка q1 - p1 - p2 - p3: p1(4 армии, 4 места), p2(2, 3), p3(1, 2), q1(2, 2)
    pub fn frontier_chain() -> World {
        world(
            vec![
                country(1, Some(P), 4, 4),
                country(2, Some(P), 2, 3),
                country(3, Some(P), 1, 2),
                country(4, Some(Q), 2, 2),
            ],
            &[(4, 1), (1, 2), (2, 3)],
        )
    }
}
