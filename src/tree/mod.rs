//! Property tree for the active project
//!
//! [`PropertyTreeBuilder`] turns the host's project model into a flat
//! list of [`DisplayNode`]s. The view that shows them is external; it
//! only has to implement [`TreeView`].

pub mod render;

pub use render::render_nodes;

use crate::error::HostError;
use crate::host::ProjectModel;

/// Label of the placeholder node shown when nothing is open
pub const NO_PROJECTS_LABEL: &str = "Projects";

/// Sole child of the placeholder node
pub const NO_PROJECTS_MESSAGE: &str = "no projects are open.";

/// Appended to the project name, without a separator, for the header node
pub const HEADER_SUFFIX: &str = "Properties";

/// A node handed to the tree view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    pub label: String,
    pub children: Vec<String>,
    pub expanded: bool,
}

impl DisplayNode {
    /// Placeholder shown when the host has no projects
    pub fn no_projects() -> Self {
        Self {
            label: NO_PROJECTS_LABEL.to_string(),
            children: vec![NO_PROJECTS_MESSAGE.to_string()],
            expanded: true,
        }
    }

    /// Header labelled `<name>Properties`, no separator
    pub fn header(project_name: &str) -> Self {
        Self {
            label: format!("{}{}", project_name, HEADER_SUFFIX),
            children: vec![],
            expanded: false,
        }
    }

    /// One expanded node per property; the property name is its only child
    pub fn property(name: &str) -> Self {
        Self {
            label: String::new(),
            children: vec![name.to_string()],
            expanded: true,
        }
    }
}

/// Something that displays a list of nodes
pub trait TreeView {
    fn clear(&mut self);

    fn add(&mut self, node: DisplayNode);
}

impl TreeView for Vec<DisplayNode> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn add(&mut self, node: DisplayNode) {
        self.push(node);
    }
}

/// Builds the property tree of the first open project
pub struct PropertyTreeBuilder<M> {
    model: M,
}

impl<M: ProjectModel> PropertyTreeBuilder<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// A fresh node list for the current project state
    pub fn build(&self) -> Result<Vec<DisplayNode>, HostError> {
        let projects = self.model.projects();
        let project = match projects.first() {
            Some(project) => project,
            None => return Ok(vec![DisplayNode::no_projects()]),
        };

        let properties = self.model.properties(project)?;

        let mut nodes = Vec::with_capacity(properties.len() + 1);
        nodes.push(DisplayNode::header(&project.name));
        nodes.extend(properties.iter().map(|property| DisplayNode::property(&property.name)));

        tracing::debug!(project = %project.name, properties = properties.len(), "built property tree");
        Ok(nodes)
    }

    /// Replace everything in `view` with a fresh build
    ///
    /// The view is cleared first, so it stays empty if the build fails.
    pub fn populate(&self, view: &mut dyn TreeView) -> Result<usize, HostError> {
        view.clear();
        let nodes = self.build()?;
        let count = nodes.len();
        for node in nodes {
            view.add(node);
        }
        Ok(count)
    }
}
