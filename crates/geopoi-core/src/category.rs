//! Category tree assembly from the flat `categories` table.

use std::collections::{HashMap, HashSet};

use crate::types::Category;

/// Build the forest of root categories from flat rows.
///
/// A row is a root when its `parent_id` is absent or empty. Every other row is
/// attached under its parent. Rows whose parent does not resolve, rows that
/// point at themselves and rows caught in a parent cycle are unreachable from a
/// root and are dropped. Each id is placed at most once, so no category can
/// appear among its own descendants. Input order is kept among siblings.
pub fn build_category_tree(rows: Vec<Category>) -> Vec<Category> {
    let mut by_parent: HashMap<String, Vec<Category>> = HashMap::new();
    let mut roots = Vec::new();
    for mut row in rows {
        row.children.clear();
        match row.parent_id.as_deref().filter(|p| !p.is_empty()) {
            None => {
                row.parent_id = None;
                roots.push(row);
            }
            Some(parent) => by_parent.entry(parent.to_string()).or_default().push(row),
        }
    }

    let mut placed = HashSet::new();
    roots
        .into_iter()
        .filter_map(|root| attach(root, &mut by_parent, &mut placed))
        .collect()
}

fn attach(
    mut node: Category,
    by_parent: &mut HashMap<String, Vec<Category>>,
    placed: &mut HashSet<String>,
) -> Option<Category> {
    if !placed.insert(node.id.clone()) {
        return None;
    }
    let children = by_parent.remove(&node.id).unwrap_or_default();
    node.children = children
        .into_iter()
        .filter_map(|child| attach(child, by_parent, placed))
        .collect();
    Some(node)
}
