//! node.rs - XLink topology and node-local tile/core addressing (spec §4.6).
//!
//! A `Node` is a collection of tiles (each a `core_tile::Core`) plus the `Switch` that
//! routes traffic to other nodes. This module only holds the topology graph; resolving
//! a chanend id to a live destination endpoint is `crate::routing`'s job, since that
//! also has to reach across node boundaries into other `Node`s owned by the same
//! `driver::Engine`.

use std::collections::HashMap;

use crate::switch::{Switch, SwitchLink};

pub struct Node {
    pub id: u16,
    pub switch: Switch,
    pub num_tiles: u8,
}

impl Node {
    pub fn new(id: u16, num_tiles: u8) -> Self {
        Self {
            id,
            switch: Switch::new(id),
            num_tiles,
        }
    }
}

/// The full inter-node XLink graph: an adjacency list keyed by node id, used to resolve
/// multi-hop routes and to detect routing cycles (spec §4.6 "a route that revisits a
/// node is a configuration error, detected rather than looped forever").
#[derive(Debug, Clone, Default)]
pub struct Topology {
    links: HashMap<u16, Vec<u16>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, a: u16, b: u16) {
        self.links.entry(a).or_default().push(b);
        self.links.entry(b).or_default().push(a);
    }

    pub fn neighbors(&self, node: u16) -> &[u16] {
        self.links.get(&node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Breadth-first path from `from` to `to`, or `None` if unreachable. Visits each
    /// node at most once, so a cyclic topology cannot cause non-termination (Brent's
    /// cycle-detection guarantee restated as a simple visited-set BFS).
    pub fn route(&self, from: u16, to: u16) -> Option<Vec<u16>> {
        if from == to {
            return Some(vec![from]);
        }
        let mut visited = std::collections::HashSet::new();
        let mut queue = std::collections::VecDeque::new();
        let mut parent = HashMap::new();
        visited.insert(from);
        queue.push_back(from);
        while let Some(cur) = queue.pop_front() {
            for &next in self.neighbors(cur) {
                if visited.insert(next) {
                    parent.insert(next, cur);
                    if next == to {
                        let mut path = vec![to];
                        let mut cursor = to;
                        while let Some(&p) = parent.get(&cursor) {
                            path.push(p);
                            cursor = p;
                        }
                        path.reverse();
                        return Some(path);
                    }
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

/// Mechanical translation of a topology route into the hop-by-hop `SwitchLink`s each
/// node along the path should install (spec §4.7 boot-time route programming).
pub fn links_for_route(path: &[u16]) -> Vec<(u16, SwitchLink)> {
    let mut out = Vec::new();
    for (i, &node) in path.iter().enumerate() {
        if let Some(&next) = path.get(i + 1) {
            out.push((
                node,
                SwitchLink {
                    to_node: *path.last().unwrap(),
                    via_link: (next % 256) as u8,
                },
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_finds_shortest_path() {
        let mut t = Topology::new();
        t.connect(0, 1);
        t.connect(1, 2);
        t.connect(0, 2); // direct shortcut
        let path = t.route(0, 2).unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn route_to_self_is_trivial() {
        let t = Topology::new();
        assert_eq!(t.route(5, 5), Some(vec![5]));
    }

    #[test]
    fn route_is_none_when_unreachable() {
        let mut t = Topology::new();
        t.connect(0, 1);
        assert_eq!(t.route(0, 9), None);
    }

    #[test]
    fn cyclic_topology_terminates() {
        let mut t = Topology::new();
        t.connect(0, 1);
        t.connect(1, 2);
        t.connect(2, 0);
        assert!(t.route(0, 2).is_some());
    }
}
