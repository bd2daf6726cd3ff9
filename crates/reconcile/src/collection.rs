//! Collection normalizer.
//!
//! Records hold sets; the REST API holds ordered lists. Writing a set always
//! produces a list (possibly empty) so members removed from the desired set
//! are removed remotely too.

use std::collections::BTreeSet;
use stingray::NodeRecord;

/// Collapse a remote list into a set, ignoring order and duplicates.
pub fn to_set<I, S>(list: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    list.into_iter().map(Into::into).collect()
}

/// Expand a set into a list in sorted order.
///
/// The order is deterministic but unrelated to any earlier remote order.
pub fn to_ordered_list(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

/// Addresses of the live entries of a node table.
///
/// Entries without `state` were removed out-of-band and are skipped, as are
/// entries without an address.
pub fn project_nodes(table: &[NodeRecord]) -> BTreeSet<String> {
    table
        .iter()
        .filter(|entry| entry.state.is_some())
        .filter_map(|entry| entry.node.clone())
        .collect()
}

/// One address-only entry per node; the traffic manager fills in the rest.
pub fn build_node_table(nodes: &BTreeSet<String>) -> Vec<NodeRecord> {
    nodes.iter().map(NodeRecord::address).collect()
}
