// src/config.rs
//! Конфигурация генерации мира
//!
//! Этот модуль определяет все параметры, управляющие построением карты и партии:
//! - Размер карты и готовые пресеты размеров
//! - Гексагональную сетку (радиус гексагона, гексагонов на слот армии)
//! - Диаграмму Вороного (число стран-зародышей, итерации релаксации Ллойда)
//! - Состав игроков
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::geometry::BoundingBox;
use crate::hexgrid::Hexgrid;
use crate::world::{Player, PlayerKind};

/// Предел числа гексагонов сетки: мелкий радиус на большой карте иначе
/// порождает неподъёмную сетку
pub const MAX_HEXAGONS: usize = 1_000_000;

/// Готовые размеры карты
///
/// Каждый пресет задаёт размеры и число зародышей Вороного так, чтобы средняя
/// страна содержала примерно одинаковое число гексагонов.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum MapSize {
    /// 600×400, 12 стран — быстрая партия на двоих-троих
    Small,
    /// 800×600, 20 стран
    #[default]
    Medium,
    /// 1200×900, 40 стран
    Large,
}

impl MapSize {
    /// Ширина и высота карты в пикселях
    ///
    /// # Примеры
    /// ```
    /// use hexconquest::config::MapSize;
    /// assert_eq!(MapSize::Medium.dimensions(), (800, 600));
    /// ```
    #[must_use]
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            MapSize::Small => (600, 400),
            MapSize::Medium => (800, 600),
            MapSize::Large => (1200, 900),
        }
    }

    /// Настройки диаграммы Вороного по умолчанию для данного размера
    #[must_use]
    pub fn default_voronoi(self) -> VoronoiSettings {
        let seeds = match self {
            MapSize::Small => 12,
            MapSize::Medium => 20,
            MapSize::Large => 40,
        };
        VoronoiSettings {
            seeds,
            ..VoronoiSettings::default()
        }
    }
}

/// Параметры гексагональной сетки
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HexgridSettings {
    /// Радиус гексагона (от центра до вершины) в пикселях
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Сколько гексагонов страны дают одно место для армии
    #[serde(default = "default_hexagons_per_slot")]
    pub hexagons_per_slot: usize,
}

fn default_radius() -> f64 {
    8.0
}
fn default_hexagons_per_slot() -> usize {
    16
}

impl Default for HexgridSettings {
    fn default() -> Self {
        Self {
            radius: 8.0,
            hexagons_per_slot: 16,
        }
    }
}

/// Параметры диаграммы Вороного
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoronoiSettings {
    /// Число зародышей (верхняя граница числа стран)
    #[serde(default = "default_seeds")]
    pub seeds: usize,

    /// Итерации релаксации Ллойда:
    /// - `0` — сырая диаграмма (страны сильно различаются размером),
    /// - `2..=3` — достаточно ровные страны,
    /// - больше — почти правильная сетка.
    #[serde(default = "default_relaxations")]
    pub relaxations: usize,
}

fn default_seeds() -> usize {
    20
}
fn default_relaxations() -> usize {
    2
}

impl Default for VoronoiSettings {
    fn default() -> Self {
        Self {
            seeds: 20,
            relaxations: 2,
        }
    }
}

/// Состав игроков. Люди ходят первыми.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSettings {
    #[serde(default = "default_humans")]
    pub humans: usize,

    #[serde(default = "default_computers")]
    pub computers: usize,
}

fn default_humans() -> usize {
    1
}
fn default_computers() -> usize {
    4
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            humans: 1,
            computers: 4,
        }
    }
}

/// Основные параметры генерации мира
///
/// Полная конфигурация для генерации одного мира. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldGenerationParams {
    /// Сид генератора случайных чисел (детерминированная генерация)
    #[serde(default)]
    pub seed: u64,

    /// Ширина карты в пикселях (по умолчанию 800)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в пикселях (по умолчанию 600)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Отступ границы страны внутрь, в пикселях (зазор между странами)
    #[serde(default = "default_country_inset")]
    pub country_inset: f64,

    #[serde(default)]
    pub hexgrid: HexgridSettings,

    #[serde(default)]
    pub voronoi: VoronoiSettings,

    #[serde(default)]
    pub players: PlayerSettings,
}

impl WorldGenerationParams {
    /// Параметры для готового размера карты
    #[must_use]
    pub fn with_size(seed: u64, size: MapSize) -> Self {
        let (width, height) = size.dimensions();
        Self {
            seed,
            width,
            height,
            voronoi: size.default_voronoi(),
            ..Self::default()
        }
    }

    /// Загружает параметры из TOML-файла
    ///
    /// # Ошибки
    /// Возвращает ошибку, если файл не найден или содержит недопустимый формат.
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = 42
    /// width = 1024
    /// height = 768
    ///
    /// [voronoi]
    /// seeds = 30
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Разбирает и проверяет параметры из строки TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let params: Self = toml::from_str(contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Проверяет согласованность параметров
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig("map dimensions must be positive".into()));
        }
        if !(self.hexgrid.radius.is_finite() && self.hexgrid.radius > 0.0) {
            return Err(Error::InvalidConfig("hexagon radius must be positive".into()));
        }
        let hexagons = Hexgrid::new(
            f64::from(self.width),
            f64::from(self.height),
            self.hexgrid.radius,
        )
        .max_hexagons();
        if hexagons > MAX_HEXAGONS as f64 {
            return Err(Error::InvalidConfig(format!(
                "hexagon radius {} yields about {hexagons:.0} hexagons, at most {MAX_HEXAGONS} are allowed",
                self.hexgrid.radius
            )));
        }
        if self.hexgrid.hexagons_per_slot == 0 {
            return Err(Error::InvalidConfig("hexagons_per_slot must be at least 1".into()));
        }
        if self.voronoi.seeds == 0 {
            return Err(Error::InvalidConfig("at least one Voronoi seed is required".into()));
        }
        if !(self.country_inset.is_finite() && self.country_inset >= 0.0) {
            return Err(Error::InvalidConfig("country_inset must be non-negative".into()));
        }
        if self.country_inset >= self.hexgrid.radius {
            return Err(Error::InvalidConfig(
                "country_inset must be smaller than the hexagon radius".into(),
            ));
        }
        let players = self.players.humans + self.players.computers;
        if players > self.voronoi.seeds {
            return Err(Error::NotEnoughCountries {
                players,
                countries: self.voronoi.seeds,
            });
        }
        Ok(())
    }

    /// Прямоугольник карты
    #[must_use]
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(f64::from(self.width), f64::from(self.height))
    }

    /// Игроки в порядке хода: сначала люди, затем компьютеры
    #[must_use]
    pub fn players(&self) -> Vec<Player> {
        let humans = std::iter::repeat_n(PlayerKind::Human, self.players.humans);
        let computers = std::iter::repeat_n(PlayerKind::Computer, self.players.computers);
        humans
            .chain(computers)
            .zip(0..)
            .map(|(kind, id)| Player::new(id, kind))
            .collect()
    }
}

fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_country_inset() -> f64 {
    2.0
}

impl Default for WorldGenerationParams {
    fn default() -> Self {
        Self {
            seed: 0,
            width: 800,
            height: 600,
            country_inset: 2.0,
            hexgrid: HexgridSettings::default(),
            voronoi: VoronoiSettings::default(),
            players: PlayerSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let params = WorldGenerationParams::from_toml_str("").unwrap();
        assert_eq!(params.width, 800);
        assert_eq!(params.height, 600);
        assert_eq!(params.hexgrid, HexgridSettings::default());
        assert_eq!(params.voronoi, VoronoiSettings::default());
        assert_eq!(params.players, PlayerSettings::default());
        assert!((params.country_inset - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nested_tables_override_defaults() {
        let params = WorldGenerationParams::from_toml_str(
            r"
            seed = 7
            width = 400

            [voronoi]
            seeds = 9

            [players]
            computers = 2
            ",
        )
        .unwrap();
        assert_eq!(params.seed, 7);
        assert_eq!(params.width, 400);
        assert_eq!(params.height, 600);
        assert_eq!(params.voronoi.seeds, 9);
        assert_eq!(params.voronoi.relaxations, 2);
        assert_eq!(params.players.humans, 1);
        assert_eq!(params.players.computers, 2);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            WorldGenerationParams::from_toml_str("width = 0"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            WorldGenerationParams::from_toml_str("[hexgrid]\nradius = -1.0"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            WorldGenerationParams::from_toml_str("[voronoi]\nseeds = 3"),
            Err(Error::NotEnoughCountries { players: 5, countries: 3 })
        ));
        assert!(matches!(
            WorldGenerationParams::from_toml_str("width = \"wide\""),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn tiny_radius_is_rejected_before_building_the_grid() {
        let result = WorldGenerationParams::from_toml_str("[hexgrid]\nradius = 1e-4");
        assert!(matches!(result, Err(Error::InvalidConfig(msg)) if msg.contains("hexagons")));

        // радиус 0.5 на карте 800×600 ещё укладывается в предел
        let fine = WorldGenerationParams::from_toml_str("country_inset = 0.1\n[hexgrid]\nradius = 0.5");
        assert!(fine.is_ok());
    }

    #[test]
    fn players_are_ordered_humans_first() {
        let params = WorldGenerationParams {
            players: PlayerSettings {
                humans: 2,
                computers: 1,
            },
            ..WorldGenerationParams::default()
        };
        let players = params.players();
        assert_eq!(
            players,
            vec![
                Player::new(0, PlayerKind::Human),
                Player::new(1, PlayerKind::Human),
                Player::new(2, PlayerKind::Computer),
            ]
        );
    }

    #[test]
    fn map_size_presets() {
        let large = WorldGenerationParams::with_size(3, MapSize::Large);
        assert_eq!((large.width, large.height), (1200, 900));
        assert_eq!(large.voronoi.seeds, 40);
        assert!(large.validate().is_ok());
        assert_eq!(MapSize::default(), MapSize::Medium);
    }
}
