//! routing.rs - chanend-id -> endpoint resolution across the fabric (spec §4.6
//! "Channel routing").
//!
//! A channel id encodes `{node, resource num}` (spec §3 "Resource identity"); resolving
//! it to a live `Chanend` means finding which `core_tile::Core` owns that node/core and
//! indexing into its chanend pool. This module stays a pure function of
//! `(node -> core index)` plus the node `Topology`, so it never needs simultaneous
//! mutable access to two `Core`s: `driver::Engine` looks up source and destination
//! separately and performs the token transfer as two sequential calls, one per `Core`,
//! never aliasing both at once.

use crate::node::Topology;
use crate::resource::ResourceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub node: u16,
    pub chanend_num: u8,
}

/// Resolve a chanend `ResourceId` to the node/chanend-number pair routing should
/// deliver to, and the path the token physically transits.
pub fn resolve(topology: &Topology, local_node: u16, dest: ResourceId) -> Option<(Endpoint, Vec<u16>)> {
    let dest_node = dest.node();
    let path = topology.route(local_node, dest_node)?;
    Some((
        Endpoint {
            node: dest_node,
            chanend_num: dest.num(),
        },
        path,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;

    #[test]
    fn resolve_finds_endpoint_and_path() {
        let mut topo = Topology::new();
        topo.connect(0, 1);
        let dest = ResourceId::new(ResourceType::Chanend, 3, 1);
        let (ep, path) = resolve(&topo, 0, dest).unwrap();
        assert_eq!(ep.node, 1);
        assert_eq!(ep.chanend_num, 3);
        assert_eq!(path, vec![0, 1]);
    }

    #[test]
    fn resolve_to_unreachable_node_is_none() {
        let topo = Topology::new();
        let dest = ResourceId::new(ResourceType::Chanend, 0, 9);
        assert!(resolve(&topo, 0, dest).is_none());
    }

    #[test]
    fn resolve_within_same_node_is_trivial_path() {
        let topo = Topology::new();
        let dest = ResourceId::new(ResourceType::Chanend, 1, 0);
        let (ep, path) = resolve(&topo, 0, dest).unwrap();
        assert_eq!(ep.node, 0);
        assert_eq!(path, vec![0]);
    }
}
