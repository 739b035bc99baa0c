// ABOUTME: Slash-separated path resolution over the structure block
// ABOUTME: Descends one component at a time using depth-scoped cursors

use super::block::Block;
use super::error::DtbError;
use super::iter::{Cursor, MatchKind};
use super::parser::DeviceTree;

/// Resolve `path` below `start`
///
/// Every component but the last names a node; the last one is matched
/// against `kind`. Names compare exactly, so "cpu" does not match "cpu@0".
pub(crate) fn find<'a>(
    tree: &DeviceTree<'a>,
    start: &Block<'a>,
    kind: MatchKind,
    path: &str,
) -> Result<Option<Block<'a>>, DtbError> {
    let path = path.trim_start_matches('/');

    if let Some((first, rest)) = path.split_once('/') {
        return match find(tree, start, MatchKind::Node, first)? {
            Some(node) => find(tree, &node, kind, rest),
            None => Ok(None),
        };
    }

    // "/" or "node/" names nothing, even if a property has an empty name
    if path.is_empty() {
        return Ok(None);
    }

    let mut cursor = Cursor::new(tree, start, kind);
    while let Some(block) = cursor.try_next()? {
        if block.name == path {
            return Ok(Some(block));
        }
    }
    Ok(None)
}
