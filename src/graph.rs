// src/graph.rs
//! Неизменяемый неориентированный граф
//!
//! Вершины хранятся по ключу (`Vertex::id`), смежность — в `petgraph::graphmap::UnGraphMap`.
//! Все операции принимают `&self` и возвращают новый граф: исходный никогда не
//! изменяется, поэтому снимки мира можно свободно раздавать слою отображения и ИИ.
//!
//! ## Инварианты
//! - смежность симметрична: `adjacent(k, j) == adjacent(j, k)`;
//! - смежность не ссылается на отсутствующие вершины — удаление вершины
//!   удаляет и все её рёбра;
//! - обход детерминирован: ключи перебираются по возрастанию, соседи — в
//!   порядке добавления рёбер.
//!
//! ## Пример
//! ```
//! use hexconquest::graph::{Graph, Vertex};
//!
//! #[derive(Debug, Clone)]
//! struct Town(u32);
//!
//! impl Vertex for Town {
//!     type Id = u32;
//!     fn id(&self) -> u32 {
//!         self.0
//!     }
//! }
//!
//! let graph = Graph::new([Town(1), Town(2), Town(3)], [(1, 2), (2, 3)]).unwrap();
//! assert!(graph.adjacent(2, 1));
//! assert_eq!(graph.shortest_path(1, 3).unwrap(), vec![1, 2, 3]);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Debug;

use petgraph::graphmap::{NodeTrait, UnGraphMap};

use crate::error::{Error, Result};

/// Значение, которое можно хранить в вершине графа
pub trait Vertex: Clone {
    type Id: NodeTrait + Debug;

    fn id(&self) -> Self::Id;
}

#[derive(Debug, Clone)]
pub struct Graph<V: Vertex> {
    vertices: BTreeMap<V::Id, V>,
    adjacency: UnGraphMap<V::Id, ()>,
}

impl<V: Vertex> Default for Graph<V> {
    fn default() -> Self {
        Self {
            vertices: BTreeMap::new(),
            adjacency: UnGraphMap::new(),
        }
    }
}

fn missing<K: Debug>(k: K) -> Error {
    Error::MissingVertex(format!("{k:?}"))
}

impl<V: Vertex> Graph<V> {
    /// Строит граф из значений вершин и списка рёбер.
    ///
    /// # Ошибки
    /// `Error::MissingVertex`, если ребро ссылается на неизвестную вершину.
    pub fn new(
        values: impl IntoIterator<Item = V>,
        edges: impl IntoIterator<Item = (V::Id, V::Id)>,
    ) -> Result<Self> {
        let mut graph = Self::default();
        for value in values {
            graph.insert(value);
        }
        for (a, b) in edges {
            graph.connect(a, b)?;
        }
        Ok(graph)
    }

    fn insert(&mut self, value: V) {
        let id = value.id();
        self.adjacency.add_node(id);
        self.vertices.insert(id, value);
    }

    fn connect(&mut self, a: V::Id, b: V::Id) -> Result<()> {
        if !self.contains(a) {
            return Err(missing(a));
        }
        if !self.contains(b) {
            return Err(missing(b));
        }
        self.adjacency.add_edge(a, b, ());
        Ok(())
    }

    fn detach(&mut self, id: V::Id) {
        self.vertices.remove(&id);
        self.adjacency.remove_node(id);
    }

    // ── Доступ ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: V::Id) -> bool {
        self.vertices.contains_key(&id)
    }

    #[must_use]
    pub fn get(&self, id: V::Id) -> Option<&V> {
        self.vertices.get(&id)
    }

    /// Вершина с наименьшим ключом
    #[must_use]
    pub fn first(&self) -> Option<&V> {
        self.vertices.values().next()
    }

    /// Вершина с наибольшим ключом
    #[must_use]
    pub fn last(&self) -> Option<&V> {
        self.vertices.values().next_back()
    }

    /// Ключи по возрастанию
    pub fn keys(&self) -> impl Iterator<Item = V::Id> + '_ {
        self.vertices.keys().copied()
    }

    /// Значения в порядке возрастания ключей
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.vertices.values()
    }

    /// Каждое ребро один раз, как `(меньший ключ, больший ключ)`, по возрастанию
    #[must_use]
    pub fn edges(&self) -> Vec<(V::Id, V::Id)> {
        let mut edges: Vec<(V::Id, V::Id)> = self
            .adjacency
            .all_edges()
            .map(|(a, b, _)| if a <= b { (a, b) } else { (b, a) })
            .collect();
        edges.sort_unstable();
        edges
    }

    // ── Изменение (возвращает новый граф) ──────────────────────────────

    /// Добавляет вершину или заменяет значение существующей (рёбра сохраняются)
    #[must_use]
    pub fn add_vertex(&self, value: V) -> Self {
        let mut graph = self.clone();
        graph.insert(value);
        graph
    }

    /// Удаляет вершину вместе со всеми инцидентными рёбрами
    #[must_use]
    pub fn remove_vertex(&self, id: V::Id) -> Self {
        let mut graph = self.clone();
        graph.detach(id);
        graph
    }

    pub fn add_edge(&self, a: V::Id, b: V::Id) -> Result<Self> {
        let mut graph = self.clone();
        graph.connect(a, b)?;
        Ok(graph)
    }

    #[must_use]
    pub fn remove_edge(&self, a: V::Id, b: V::Id) -> Self {
        let mut graph = self.clone();
        graph.adjacency.remove_edge(a, b);
        graph
    }

    /// Вставляет значения по ключу, заменяя существующие. Смежность не меняется.
    #[must_use]
    pub fn merge(&self, values: impl IntoIterator<Item = V>) -> Self {
        let mut graph = self.clone();
        for value in values {
            graph.insert(value);
        }
        graph
    }

    /// Заменяет значение вершины результатом `f`
    pub fn update(&self, id: V::Id, f: impl FnOnce(&V) -> V) -> Result<Self> {
        let current = self.get(id).ok_or_else(|| missing(id))?;
        let next = f(current);
        if next.id() != id {
            return Err(missing(next.id()));
        }
        Ok(self.add_vertex(next))
    }

    // ── Смежность ──────────────────────────────────────────────────────

    #[must_use]
    pub fn adjacent(&self, a: V::Id, b: V::Id) -> bool {
        self.adjacency.contains_edge(a, b)
    }

    #[must_use]
    pub fn adjacent_vertices(&self, id: V::Id) -> Vec<V::Id> {
        if !self.adjacency.contains_node(id) {
            return Vec::new();
        }
        self.adjacency.neighbors(id).collect()
    }

    #[must_use]
    pub fn adjacent_values(&self, id: V::Id) -> Vec<&V> {
        self.adjacent_vertices(id)
            .into_iter()
            .filter_map(|k| self.get(k))
            .collect()
    }

    /// Индуцированный подграф на вершинах, удовлетворяющих предикату
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&V) -> bool) -> Self {
        let mut graph = self.clone();
        for (id, value) in &self.vertices {
            if !predicate(value) {
                graph.detach(*id);
            }
        }
        graph
    }

    // ── Обходы ─────────────────────────────────────────────────────────

    /// Вершины, достижимые из `start`, в порядке обхода в ширину (включая `start`)
    #[must_use]
    pub fn traverse(&self, start: V::Id) -> Vec<V::Id> {
        if !self.contains(start) {
            return Vec::new();
        }

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut order = Vec::new();

        while let Some(current) = queue.pop_front() {
            order.push(current);
            for next in self.adjacency.neighbors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        order
    }

    /// Кратчайший путь от `from` до `to` включительно
    pub fn shortest_path(&self, from: V::Id, to: V::Id) -> Result<Vec<V::Id>> {
        self.shortest_path_by(from, |_, id| id == to)
    }

    /// Кратчайший путь от `from` до первой вершины, удовлетворяющей предикату.
    ///
    /// Поиск в ширину; при равной длине побеждает вершина, найденная раньше.
    /// Сама `from` тоже проверяется — тогда путь состоит из неё одной.
    ///
    /// # Ошибки
    /// `Error::MissingVertex`, если `from` нет в графе; `Error::NoPath`, если ни
    /// одна достижимая вершина не подходит.
    pub fn shortest_path_by(
        &self,
        from: V::Id,
        predicate: impl Fn(&V, V::Id) -> bool,
    ) -> Result<Vec<V::Id>> {
        if !self.contains(from) {
            return Err(missing(from));
        }

        let mut parents: HashMap<V::Id, Option<V::Id>> = HashMap::from([(from, None)]);
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            if self.get(current).is_some_and(|v| predicate(v, current)) {
                return Ok(reconstruct(&parents, current));
            }
            for next in self.adjacency.neighbors(current) {
                if !parents.contains_key(&next) {
                    parents.insert(next, Some(current));
                    queue.push_back(next);
                }
            }
        }

        Err(Error::NoPath)
    }

    /// Разбиение на компоненты связности (в порядке наименьших ключей)
    #[must_use]
    pub fn connected_components(&self) -> Vec<Self> {
        let mut remaining: BTreeSet<V::Id> = self.keys().collect();
        let mut components = Vec::new();

        while let Some(&start) = remaining.iter().next() {
            let island: HashSet<V::Id> = self.traverse(start).into_iter().collect();
            remaining.retain(|k| !island.contains(k));
            components.push(self.filter(|v| island.contains(&v.id())));
        }
        components
    }
}

fn reconstruct<K: NodeTrait>(parents: &HashMap<K, Option<K>>, end: K) -> Vec<K> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(&Some(parent)) = parents.get(&current) {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Node {
        id: char,
        weight: u32,
    }

    impl Vertex for Node {
        type Id = char;

        fn id(&self) -> char {
            self.id
        }
    }

    fn node(id: char) -> Node {
        Node { id, weight: 0 }
    }

    /// A–B–C–D и отдельно E–F
    fn sample() -> Graph<Node> {
        Graph::new(
            "ABCDEF".chars().map(node),
            [('A', 'B'), ('B', 'C'), ('C', 'D'), ('E', 'F')],
        )
        .unwrap()
    }

    #[test]
    fn adjacency_is_symmetric() {
        let graph = sample();
        assert!(graph.adjacent('A', 'B'));
        assert!(graph.adjacent('B', 'A'));
        assert!(!graph.adjacent('A', 'C'));
        assert_eq!(graph.adjacent_vertices('B'), vec!['A', 'C']);
    }

    #[test]
    fn edge_to_unknown_vertex_is_rejected() {
        assert!(matches!(sample().add_edge('A', 'Z'), Err(Error::MissingVertex(_))));
        assert!(Graph::new([node('A')], [('A', 'B')]).is_err());
    }

    #[test]
    fn edits_do_not_touch_the_source_graph() {
        let graph = sample();
        let without_b = graph.remove_vertex('B');
        assert!(graph.contains('B'));
        assert!(graph.adjacent('A', 'B'));
        assert!(!without_b.contains('B'));
        assert!(without_b.adjacent_vertices('A').is_empty());
        assert_eq!(without_b.adjacent_vertices('C'), vec!['D']);
    }

    #[test]
    fn remove_edge_and_add_edge() {
        let graph = sample().remove_edge('B', 'C');
        assert!(!graph.adjacent('C', 'B'));
        let graph = graph.add_edge('A', 'F').unwrap();
        assert_eq!(graph.edges(), vec![('A', 'B'), ('A', 'F'), ('C', 'D'), ('E', 'F')]);
    }

    #[test]
    fn merge_upserts_values_and_keeps_edges() {
        let graph = sample().merge([Node { id: 'B', weight: 7 }, node('G')]);
        assert_eq!(graph.get('B').unwrap().weight, 7);
        assert!(graph.adjacent('A', 'B'));
        assert!(graph.contains('G'));
        assert!(graph.adjacent_vertices('G').is_empty());
        assert_eq!(graph.len(), 7);
    }

    #[test]
    fn update_replaces_a_single_value() {
        let graph = sample()
            .update('C', |n| Node { weight: n.weight + 3, ..n.clone() })
            .unwrap();
        assert_eq!(graph.get('C').unwrap().weight, 3);
        assert!(sample().update('Z', Clone::clone).is_err());
    }

    #[test]
    fn filter_returns_induced_subgraph() {
        let graph = sample().filter(|n| n.id != 'C');
        assert_eq!(graph.keys().collect::<Vec<_>>(), vec!['A', 'B', 'D', 'E', 'F']);
        assert_eq!(graph.adjacent_vertices('B'), vec!['A']);
        assert!(graph.adjacent_vertices('D').is_empty());
    }

    #[test]
    fn traverse_follows_discovery_order() {
        let graph = sample().add_edge('A', 'D').unwrap();
        assert_eq!(graph.traverse('A'), vec!['A', 'B', 'D', 'C']);
        assert_eq!(graph.traverse('E'), vec!['E', 'F']);
        assert!(graph.traverse('Z').is_empty());
    }

    #[test]
    fn shortest_path_along_chain() {
        let graph = sample();
        assert_eq!(
            graph.shortest_path_by('A', |_, id| id == 'D').unwrap(),
            vec!['A', 'B', 'C', 'D']
        );
        assert_eq!(graph.shortest_path('D', 'A').unwrap(), vec!['D', 'C', 'B', 'A']);
        assert_eq!(graph.shortest_path('A', 'A').unwrap(), vec!['A']);
    }

    #[test]
    fn shortest_path_takes_the_shortcut() {
        let graph = sample().add_edge('A', 'C').unwrap();
        assert_eq!(graph.shortest_path('A', 'D').unwrap(), vec!['A', 'C', 'D']);
    }

    #[test]
    fn shortest_path_without_target_fails() {
        let graph = sample();
        assert!(matches!(graph.shortest_path('A', 'E'), Err(Error::NoPath)));
        assert!(matches!(graph.shortest_path('Z', 'A'), Err(Error::MissingVertex(_))));
    }

    #[test]
    fn connected_components_partition_vertices() {
        let components = sample().add_vertex(node('G')).connected_components();
        let keys: Vec<Vec<char>> = components.iter().map(|c| c.keys().collect()).collect();
        assert_eq!(keys, vec![vec!['A', 'B', 'C', 'D'], vec!['E', 'F'], vec!['G']]);
        assert!(components[0].adjacent('C', 'D'));
    }

    #[test]
    fn first_and_last_follow_key_order() {
        let graph = sample();
        assert_eq!(graph.first().map(|n| n.id), Some('A'));
        assert_eq!(graph.last().map(|n| n.id), Some('F'));
        assert!(Graph::<Node>::default().first().is_none());
    }
}
