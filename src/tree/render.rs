//! ASCII rendering for property trees.

use super::DisplayNode;

/// Render display nodes as ASCII art.
///
/// Example output:
/// ```text
/// MyLibProperties
/// ├── Version
/// └── Authors
/// ```
///
/// Property nodes carry no label of their own, so their child is drawn
/// under the closest labelled node. Collapsed nodes show a `[+]` marker
/// instead of their children.
pub fn render_nodes(nodes: &[DisplayNode]) -> String {
    let mut output = String::new();
    let mut pending: Vec<&str> = Vec::new();

    for node in nodes {
        if !node.label.is_empty() {
            flush_children(&mut output, &mut pending);
            output.push_str(&node.label);
            if !node.expanded && !node.children.is_empty() {
                output.push_str(" [+]");
            }
            output.push('\n');
        }

        if node.expanded {
            pending.extend(node.children.iter().map(String::as_str));
        }
    }

    flush_children(&mut output, &mut pending);
    output
}

fn flush_children(output: &mut String, pending: &mut Vec<&str>) {
    for (i, child) in pending.iter().enumerate() {
        let branch = if i == pending.len() - 1 { "└── " } else { "├── " };
        output.push_str(branch);
        output.push_str(child);
        output.push('\n');
    }
    pending.clear();
}
