//! Процедурная генерация гексагональных карт и пошаговая игра за территории
//!
//! Конвейер: [`Hexgrid`] → диаграмма Вороного с релаксацией Ллойда →
//! страны из слитых гексагонов → [`World`] (граф стран) → [`Game`].

pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod graph;
pub mod hexgrid;
pub mod voronoi;
pub mod world;

pub use config::{HexgridSettings, MapSize, PlayerSettings, VoronoiSettings, WorldGenerationParams};
pub use error::{Error, Result};
pub use game::Game;
pub use geometry::{BoundingBox, Point, Polygon};
pub use graph::{Graph, Vertex};
pub use hexgrid::{Hexagon, Hexgrid};
pub use world::{
    Battle, BattleOutcome, Country, CountryId, DiceRoll, Player, PlayerId, PlayerKind, World,
    WorldSnapshot, build_world,
};
