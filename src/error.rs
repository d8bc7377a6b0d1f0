// src/error.rs
//! Ошибки движка
//!
//! Все нарушения предусловий (ход между несмежными странами, атака своей страны,
//! поиск пути без цели и т.д.) возвращаются вызывающему как `Err` и никогда
//! не исправляются молча.

use crate::world::{CountryId, PlayerId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Country not found: {0}")]
    UnknownCountry(CountryId),

    #[error("Vertex not found in graph: {0}")]
    MissingVertex(String),

    #[error("Countries {0} and {1} are not adjacent")]
    NotAdjacent(CountryId, CountryId),

    #[error("Country {0} is not occupied by any player")]
    Unoccupied(CountryId),

    #[error("Country {country} has {armies} armies, at least 2 are required")]
    InsufficientArmies { country: CountryId, armies: u32 },

    #[error("Country {0} is occupied by another player")]
    OccupiedByOpponent(CountryId),

    #[error("Countries {0} and {1} belong to the same player")]
    SameOwner(CountryId, CountryId),

    #[error("Country {0} has no free slots")]
    NoCapacity(CountryId),

    #[error("No reachable vertex satisfies the predicate")]
    NoPath,

    #[error("Cannot place {players} players on {countries} countries")]
    NotEnoughCountries { players: usize, countries: usize },

    #[error("Country {0} cannot reach any foreign country")]
    EnclosedTerritory(CountryId),

    #[error("Player {0} is already the current player")]
    SamePlayer(PlayerId),

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    #[error("Invalid Voronoi sites: {0}")]
    InvalidSites(String),

    #[error("World contains no countries")]
    EmptyWorld,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
