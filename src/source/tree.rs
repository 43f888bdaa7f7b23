//! Source tree traversal

use crate::cohesity::models::ProtectionSourceNode;
use std::collections::VecDeque;

/// Find a node of VMware type `type_tag` anywhere under `roots`.
///
/// With a `name`, only a node with exactly that name matches; without one,
/// the first node of the type in breadth-first order is taken.
pub fn resolve_leaf(
    roots: &[ProtectionSourceNode],
    type_tag: &str,
    name: Option<&str>,
) -> Option<i64> {
    let mut queue: VecDeque<&ProtectionSourceNode> = roots.iter().collect();

    while let Some(node) = queue.pop_front() {
        let source = &node.protection_source;
        if source.vmware_type() == Some(type_tag)
            && name.map_or(true, |wanted| wanted == source.name)
        {
            return Some(source.id);
        }
        queue.extend(node.nodes.iter());
    }

    None
}
