// src/voronoi/mod.rs
//! Диаграмма Вороного, обрезанная прямоугольником
//!
//! Используется инкрементальное построение пересечением полуплоскостей: ячейка
//! каждого сайта начинается как весь прямоугольник и последовательно обрезается
//! серединным перпендикуляром к каждому другому сайту. Каждое ребро ячейки
//! помечается источником — граница прямоугольника или сайт, чей перпендикуляр
//! его породил. Ребро ненулевой длины с меткой сайта `j` делает ячейки `i` и `j`
//! соседями.
//!
//! Ячейки разбивают прямоугольник без зазоров и перекрытий; точка на общей
//! границе считается принадлежащей обеим ячейкам (см. `Polygon::contains_point`).

pub mod lloyd;

pub use lloyd::{random_sites, relax};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, EPSILON, Point, Polygon};

/// Ячейка диаграммы
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Сайт, породивший ячейку
    pub site: Point,
    pub polygon: Polygon,
    /// Индексы соседних ячеек (общее ребро ненулевой длины), по возрастанию
    pub neighbours: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub bbox: BoundingBox,
    pub cells: Vec<Cell>,
}

impl Diagram {
    /// Сайты в порядке ячеек
    #[must_use]
    pub fn sites(&self) -> Vec<Point> {
        self.cells.iter().map(|c| c.site).collect()
    }

    /// Индекс ячейки, содержащей точку (первая подходящая при попадании на границу)
    #[must_use]
    pub fn locate(&self, p: Point) -> Option<usize> {
        self.cells.iter().position(|c| c.polygon.contains_point(p))
    }
}

/// Источник ребра ячейки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeSource {
    Border,
    Site(usize),
}

/// Вершина обрезаемой ячейки вместе с меткой ребра, которое из неё выходит
type TaggedVertex = (Point, EdgeSource);

/// Строит диаграмму Вороного для `sites`, обрезанную прямоугольником `bbox`.
///
/// # Ошибки
/// `Error::InvalidSites`, если сайтов нет, сайт лежит вне прямоугольника или
/// два сайта совпадают.
pub fn tessellate(sites: &[Point], bbox: BoundingBox) -> Result<Diagram> {
    validate_sites(sites, bbox)?;

    let clip = |i: usize| clip_cell(i, sites, bbox);

    #[cfg(feature = "parallel")]
    let clipped: Vec<Vec<TaggedVertex>> = (0..sites.len()).into_par_iter().map(clip).collect();
    #[cfg(not(feature = "parallel"))]
    let clipped: Vec<Vec<TaggedVertex>> = (0..sites.len()).map(clip).collect();

    // Соседство делаем симметричным: достаточно, чтобы общее ребро нашлось
    // хотя бы с одной стороны (численно короткие рёбра могут выпасть у другой)
    let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); sites.len()];
    for (i, ring) in clipped.iter().enumerate() {
        let n = ring.len();
        for k in 0..n {
            let (a, source) = ring[k];
            let b = ring[(k + 1) % n].0;
            if let EdgeSource::Site(j) = source {
                if a.distance(b) > EPSILON * bbox.width().max(bbox.height()).max(1.0) {
                    neighbours[i].push(j);
                    neighbours[j].push(i);
                }
            }
        }
    }

    let cells = clipped
        .into_iter()
        .zip(neighbours)
        .enumerate()
        .map(|(i, (ring, mut adjacent))| {
            adjacent.sort_unstable();
            adjacent.dedup();
            Cell {
                site: sites[i],
                polygon: Polygon::new(ring.into_iter().map(|(p, _)| p).collect()),
                neighbours: adjacent,
            }
        })
        .collect();

    Ok(Diagram { bbox, cells })
}

fn validate_sites(sites: &[Point], bbox: BoundingBox) -> Result<()> {
    if sites.is_empty() {
        return Err(Error::InvalidSites("no sites".into()));
    }
    if let Some(p) = sites.iter().find(|p| !bbox.contains(**p)) {
        return Err(Error::InvalidSites(format!(
            "site ({}, {}) lies outside the bounding box",
            p.x, p.y
        )));
    }
    for (i, a) in sites.iter().enumerate() {
        if sites[i + 1..].iter().any(|b| a.distance(*b) < EPSILON) {
            return Err(Error::InvalidSites(format!(
                "site ({}, {}) occurs more than once",
                a.x, a.y
            )));
        }
    }
    Ok(())
}

/// Ячейка сайта `i`: прямоугольник, обрезанный полуплоскостями всех остальных сайтов
fn clip_cell(i: usize, sites: &[Point], bbox: BoundingBox) -> Vec<TaggedVertex> {
    let mut ring: Vec<TaggedVertex> = bbox
        .to_polygon()
        .points
        .into_iter()
        .map(|p| (p, EdgeSource::Border))
        .collect();

    let site = sites[i];
    for (j, &other) in sites.iter().enumerate() {
        if j == i || ring.is_empty() {
            continue;
        }
        ring = clip_half_plane(&ring, site, other, j);
    }
    ring
}

/// Отсекает часть выпуклого многоугольника, которая ближе к `other`, чем к `site`
/// (алгоритм Сазерленда — Ходжмана с переносом меток рёбер).
fn clip_half_plane(
    ring: &[TaggedVertex],
    site: Point,
    other: Point,
    other_index: usize,
) -> Vec<TaggedVertex> {
    let mid = site.lerp(other, 0.5);
    let normal = other.sub(site);
    // Знаковое расстояние (в масштабе |normal|); сторона `site` при <= 0
    let side = |p: Point| p.sub(mid).dot(normal);
    let tolerance = EPSILON * normal.dot(normal).max(1.0);

    let n = ring.len();
    let mut out = Vec::with_capacity(n + 1);
    for k in 0..n {
        let (cur, tag) = ring[k];
        let next = ring[(k + 1) % n].0;
        let (dc, dn) = (side(cur), side(next));
        let cur_inside = dc <= tolerance;
        let next_inside = dn <= tolerance;

        match (cur_inside, next_inside) {
            (true, true) => out.push((cur, tag)),
            (true, false) => {
                out.push((cur, tag));
                let t = dc / (dc - dn);
                out.push((cur.lerp(next, t), EdgeSource::Site(other_index)));
            }
            (false, true) => {
                let t = dc / (dc - dn);
                out.push((cur.lerp(next, t), tag));
            }
            (false, false) => {}
        }
    }

    // Точка пересечения может совпасть с вершиной. Из двух совпавших вершин
    // остаётся первая, но с меткой второй: ребро между ними нулевое, а дальше
    // идёт ребро второй вершины
    out.dedup_by(|later, earlier| {
        if later.0.distance(earlier.0) < EPSILON {
            earlier.1 = later.1;
            true
        } else {
            false
        }
    });
    if out.len() > 1 && out[0].0.distance(out[out.len() - 1].0) < EPSILON {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BoundingBox {
        BoundingBox::new(100.0, 100.0)
    }

    #[test]
    fn two_sites_split_rectangle_in_half() {
        let sites = [Point::new(25.0, 50.0), Point::new(75.0, 50.0)];
        let diagram = tessellate(&sites, bbox()).unwrap();
        assert_eq!(diagram.sites(), sites.to_vec());
        assert!((diagram.cells[0].polygon.area() - 5000.0).abs() < 1e-6);
        assert!((diagram.cells[1].polygon.area() - 5000.0).abs() < 1e-6);
        assert_eq!(diagram.cells[0].neighbours, vec![1]);
        assert_eq!(diagram.cells[1].neighbours, vec![0]);
    }

    #[test]
    fn single_site_owns_whole_rectangle() {
        let diagram = tessellate(&[Point::new(10.0, 10.0)], bbox()).unwrap();
        assert!((diagram.cells[0].polygon.area() - 10_000.0).abs() < 1e-6);
        assert!(diagram.cells[0].neighbours.is_empty());
    }

    #[test]
    fn grid_of_sites_has_no_diagonal_neighbours_through_corners() {
        // Четыре сайта в углах квадрата: ячейки сходятся в одной точке,
        // а диагональные пары делят лишь вершину, но не ребро
        let sites = [
            Point::new(25.0, 25.0),
            Point::new(75.0, 25.0),
            Point::new(25.0, 75.0),
            Point::new(75.0, 75.0),
        ];
        let diagram = tessellate(&sites, bbox()).unwrap();
        assert_eq!(diagram.cells[0].neighbours, vec![1, 2]);
        assert_eq!(diagram.cells[3].neighbours, vec![1, 2]);
        let total: f64 = diagram.cells.iter().map(|c| c.polygon.area()).sum();
        assert!((total - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn every_site_lies_in_its_cell() {
        let sites = [
            Point::new(12.0, 80.0),
            Point::new(40.0, 33.0),
            Point::new(90.0, 5.0),
            Point::new(60.0, 60.0),
            Point::new(3.0, 3.0),
        ];
        let diagram = tessellate(&sites, bbox()).unwrap();
        for cell in &diagram.cells {
            assert!(cell.polygon.contains_point(cell.site));
        }
        assert_eq!(diagram.locate(Point::new(89.0, 6.0)), Some(2));
    }

    #[test]
    fn invalid_sites_are_rejected() {
        assert!(matches!(tessellate(&[], bbox()), Err(Error::InvalidSites(_))));
        assert!(matches!(
            tessellate(&[Point::new(1.0, 1.0), Point::new(1.0, 1.0)], bbox()),
            Err(Error::InvalidSites(_))
        ));
        assert!(matches!(
            tessellate(&[Point::new(-1.0, 1.0)], bbox()),
            Err(Error::InvalidSites(_))
        ));
    }
}
