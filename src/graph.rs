//! A generic, mutable directed graph used to order interdependent items.
//!
//! Every node is identified by a unique key and stores an arbitrary payload.
//! Edges point from a node to the nodes it *depends on* (forward edges), and
//! each node can also list the nodes which depend on it (back edges).
//!
//! Because the direction is "depends on", a node is ready to be processed once
//! its set of forward edges is empty. Removing a processed node drops it from
//! the forward edges of every dependent, which is what lets the next batch of
//! nodes become ready.
//!
//! Nodes live in a [`StableGraph`](petgraph::stable_graph::StableGraph) arena,
//! so removing one node never invalidates the indices held for the others.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};

struct Entry<K, V> {
    key: K,
    value: V,
}

/// A directed graph keyed by `K`, storing a `V` in each node.
pub struct DependencyGraph<K, V> {
    index: BTreeMap<K, NodeIndex>,
    graph: StableDiGraph<Entry<K, V>, ()>,
}

/// Read-only view of a single node, handed to [`DependencyGraph::matching`]
/// predicates.
pub struct Node<'a, K, V> {
    graph: &'a StableDiGraph<Entry<K, V>, ()>,
    index: NodeIndex,
}

impl<'a, K, V> Node<'a, K, V> {
    pub fn key(&self) -> &'a K {
        &self.graph[self.index].key
    }

    pub fn value(&self) -> &'a V {
        &self.graph[self.index].value
    }

    /// Keys of the nodes this node depends on, in the order the edges were added.
    pub fn forward_edges(&self) -> Vec<&'a K> {
        adjacent(self.graph, self.index, Direction::Outgoing)
    }

    /// Keys of the nodes depending on this node, in the order the edges were added.
    pub fn back_edges(&self) -> Vec<&'a K> {
        adjacent(self.graph, self.index, Direction::Incoming)
    }

    /// Number of outstanding forward edges.
    pub fn dependency_count(&self) -> usize {
        self.graph
            .neighbors_directed(self.index, Direction::Outgoing)
            .count()
    }

    /// A node with no forward edges left has all of its dependencies satisfied.
    pub fn is_ready(&self) -> bool {
        self.dependency_count() == 0
    }
}

fn adjacent<K, V>(
    graph: &StableDiGraph<Entry<K, V>, ()>,
    index: NodeIndex,
    direction: Direction,
) -> Vec<&K> {
    let mut keys: Vec<&K> = graph
        .neighbors_directed(index, direction)
        .map(|neighbor| &graph[neighbor].key)
        .collect();

    // petgraph walks the edge list newest first
    keys.reverse();
    keys
}

impl<K, V> DependencyGraph<K, V>
where
    K: Ord + Clone,
{
    pub fn new() -> Self {
        Self {
            index: BTreeMap::new(),
            graph: StableDiGraph::default(),
        }
    }

    /// Inserts a node without any edges. Returns `false` and leaves the graph
    /// untouched if the key is already taken.
    pub fn add_node(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }

        let index = self.graph.add_node(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, index);
        true
    }

    /// Records that `src` depends on `dest`.
    ///
    /// Returns `false` if either node is missing or the edge already exists.
    /// Self-loops are accepted here, callers that can't tolerate them have to
    /// check for them first.
    pub fn add_edge(&mut self, src: &K, dest: &K) -> bool {
        let (Some(&src), Some(&dest)) = (self.index.get(src), self.index.get(dest)) else {
            return false;
        };

        if self.graph.find_edge(src, dest).is_some() {
            return false;
        }

        self.graph.add_edge(src, dest, ());
        true
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn value(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&index| &self.graph[index].value)
    }

    pub fn value_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = *self.index.get(key)?;
        Some(&mut self.graph[index].value)
    }

    pub fn node(&self, key: &K) -> Option<Node<'_, K, V>> {
        self.index.get(key).map(|&index| Node {
            graph: &self.graph,
            index,
        })
    }

    /// Keys of the nodes `key` depends on, or `None` if there is no such node.
    pub fn neighbors(&self, key: &K) -> Option<Vec<&K>> {
        self.node(key).map(|node| node.forward_edges())
    }

    /// Keys of the nodes depending on `key`, or `None` if there is no such node.
    pub fn dependents(&self, key: &K) -> Option<Vec<&K>> {
        self.node(key).map(|node| node.back_edges())
    }

    /// Removes a node together with every edge touching it.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(index) => {
                self.graph.remove_node(index);
                true
            }
            None => false,
        }
    }

    /// Collects every node accepted by `predicate`, in ascending key order.
    pub fn matching<F>(&self, mut predicate: F) -> Vec<(&K, &V)>
    where
        F: FnMut(&Node<'_, K, V>) -> bool,
    {
        self.index
            .iter()
            .filter_map(|(key, &index)| {
                let node = Node {
                    graph: &self.graph,
                    index,
                };
                predicate(&node).then(|| (key, &self.graph[index].value))
            })
            .collect()
    }

    /// Groups of nodes that can never become ready because they depend on
    /// each other, including single nodes depending on themselves. Keys are
    /// sorted inside each group and the groups are sorted as well.
    pub fn cycles(&self) -> Vec<Vec<K>> {
        let mut cycles: Vec<Vec<K>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some())
            .map(|scc| {
                let mut keys: Vec<K> = scc.iter().map(|&i| self.graph[i].key.clone()).collect();
                keys.sort();
                keys
            })
            .collect();

        cycles.sort();
        cycles
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.index.keys()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl<K, V> Default for DependencyGraph<K, V>
where
    K: Ord + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Debug for DependencyGraph<K, V>
where
    K: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, &index) in &self.index {
            map.entry(key, &adjacent(&self.graph, index, Direction::Outgoing));
        }
        map.finish()
    }
}

/// Renders the graph as a Mermaid flowchart, an arrow reads "depends on".
impl<K, V> Display for DependencyGraph<K, V>
where
    K: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "graph LR")?;

        for &index in self.index.values() {
            let name = self.graph[index].key.to_string().replace('"', "\\\"");
            writeln!(f, "    {}[\"{}\"]", index.index(), name)?;
        }

        for &index in self.index.values() {
            let mut targets: Vec<_> = self
                .graph
                .neighbors_directed(index, Direction::Outgoing)
                .collect();
            targets.reverse();

            for target in targets {
                writeln!(f, "    {} --> {}", index.index(), target.index())?;
            }
        }

        Ok(())
    }
}
