// src/world/builder.rs
//! Построение мира
//!
//! 1. Гексагональная сетка покрывает карту.
//! 2. Случайные зародыши + релаксация Ллойда дают диаграмму Вороного.
//! 3. Каждый гексагон относится к ячейке, содержащей его центр.
//! 4. Гексагоны ячейки сливаются в один многоугольник и сжимаются внутрь.
//! 5. Вместимость страны — число гексагонов, делённое на `hexagons_per_slot`
//!    с округлением вверх.
//! 6. Соседние ячейки дают рёбра графа стран.
//!
//! Ячейка без единого гексагона отбрасывается вместе со своими рёбрами.

use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::WorldGenerationParams;
use crate::error::{Error, Result};
use crate::geometry::Polygon;
use crate::graph::Graph;
use crate::hexgrid::{Hexagon, Hexgrid};
use crate::voronoi::{Diagram, random_sites, relax};

use super::{Country, CountryId, World};

/// Генерирует мир по параметрам. Результат полностью определяется `rng`.
///
/// # Ошибки
/// `Error::InvalidConfig` при некорректных параметрах, `Error::EmptyWorld`,
/// если ни одна ячейка не получила гексагонов.
pub fn build_world<R: Rng + ?Sized>(params: &WorldGenerationParams, rng: &mut R) -> Result<World> {
    params.validate()?;

    let bbox = params.bbox();
    let grid = Hexgrid::new(bbox.width(), bbox.height(), params.hexgrid.radius);
    let hexagons: Vec<Hexagon> = grid.hexagons().collect();

    let sites = random_sites(params.voronoi.seeds, bbox, rng);
    let diagram = relax(&sites, bbox, params.voronoi.relaxations)?;
    tracing::debug!(
        hexagons = hexagons.len(),
        cells = diagram.cells.len(),
        "tessellation ready"
    );

    let members = assign_hexagons(&hexagons, &diagram);

    let mut countries = Vec::new();
    for (index, tiles) in members.iter().enumerate() {
        if tiles.is_empty() {
            tracing::warn!(cell = index, "voronoi cell holds no hexagons, dropped");
            continue;
        }
        let id = CountryId(u32::try_from(index).map_err(|_| {
            Error::InvalidConfig(format!("too many Voronoi cells: {}", members.len()))
        })?);
        countries.push(make_country(id, tiles, &hexagons, params)?);
    }

    if countries.is_empty() {
        return Err(Error::EmptyWorld);
    }

    let edges: Vec<(CountryId, CountryId)> = diagram
        .cells
        .iter()
        .enumerate()
        .flat_map(|(i, cell)| cell.neighbours.iter().map(move |&j| (i, j)))
        .filter(|&(i, j)| i < j && !members[i].is_empty() && !members[j].is_empty())
        .filter_map(|(i, j)| Some((CountryId(u32::try_from(i).ok()?), CountryId(u32::try_from(j).ok()?))))
        .collect();

    let graph = Graph::new(countries, edges)?;
    tracing::info!(
        countries = graph.len(),
        borders = graph.edges().len(),
        "world built"
    );

    let cells = diagram.cells.into_iter().map(|cell| cell.polygon).collect();
    Ok(World::new(bbox.width(), bbox.height(), hexagons, cells, graph))
}

/// Индексы гексагонов для каждой ячейки диаграммы.
///
/// Гексагон достаётся первой ячейке, содержащей его центр; центры вне карты
/// (крайние гексагоны) не достаются никому.
fn assign_hexagons(hexagons: &[Hexagon], diagram: &Diagram) -> Vec<Vec<usize>> {
    let locate = |hex: &Hexagon| diagram.locate(hex.centroid());

    #[cfg(feature = "parallel")]
    let owners: Vec<Option<usize>> = hexagons.par_iter().map(locate).collect();
    #[cfg(not(feature = "parallel"))]
    let owners: Vec<Option<usize>> = hexagons.iter().map(locate).collect();

    let mut members = vec![Vec::new(); diagram.cells.len()];
    for (hex, owner) in owners.into_iter().enumerate() {
        if let Some(cell) = owner {
            members[cell].push(hex);
        }
    }
    members
}

fn make_country(
    id: CountryId,
    tiles: &[usize],
    hexagons: &[Hexagon],
    params: &WorldGenerationParams,
) -> Result<Country> {
    let polygons: Vec<Polygon> = tiles.iter().map(|&i| hexagons[i].polygon.clone()).collect();
    let merged = Polygon::merge(&polygons)?;
    let center = merged.centroid()?;
    let polygon = merged.offset(-params.country_inset);

    let slots = tiles.len().div_ceil(params.hexgrid.hexagons_per_slot);
    let slots = u32::try_from(slots)
        .map_err(|_| Error::InvalidConfig(format!("country {id} has too many slots")))?;

    Ok(Country::new(id, polygon, center, slots))
}
