use std::collections::{BTreeSet, HashMap};

use self::node::Node;
use crate::error::{BuildError, Result};

pub mod node;

/// Component name to the components it depends on.
///
/// Keys are unique and keep their insertion order, which is the order
/// dependants are built in.
#[derive(Debug, Clone, Default)]
pub struct DependencyMap {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

#[derive(PartialEq, Clone, Copy)]
enum NodeStatus {
    Inactive,
    Active,
    Visited,
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, D, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for (name, deps) in pairs {
            map.insert(Node::new(name).with_dependencies(deps))?;
        }
        Ok(map)
    }

    pub fn insert(&mut self, node: Node) -> Result<()> {
        if self.index.contains_key(&node.name) {
            return Err(BuildError::Configuration(format!(
                "component '{}' declared more than once",
                node.name
            )));
        }
        self.index.insert(node.name.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Every name that appears as a dependency anywhere, once each, sorted.
    pub fn all_dependencies(&self) -> Vec<String> {
        self.nodes
            .iter()
            .flat_map(|node| node.dependencies.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns the first dependency cycle found, as the chain of names that
    /// closes back on its first element.
    pub fn detect_cycle(&self) -> Option<Vec<String>> {
        self.detect_cycle_from(self.nodes.iter().map(|n| n.name.as_str()))
    }

    /// Like [`detect_cycle`](Self::detect_cycle), but only follows edges
    /// reachable from `roots`.
    pub fn detect_cycle_from<'a, I>(&'a self, roots: I) -> Option<Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut visited: HashMap<&str, NodeStatus> = self
            .nodes
            .iter()
            .map(|n| (n.name.as_str(), NodeStatus::Inactive))
            .collect();
        let mut stack = Vec::new();

        for root in roots {
            if visited.get(root) == Some(&NodeStatus::Inactive) {
                if let Some(cycle) = self.visit(root, &mut visited, &mut stack) {
                    return Some(cycle);
                }
            }
        }

        None
    }

    fn visit<'a>(
        &'a self,
        u: &'a str,
        visited: &mut HashMap<&'a str, NodeStatus>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        // names with no entry of their own are leaves
        let status = visited.get(u).copied()?;

        if status == NodeStatus::Active {
            let start = stack.iter().position(|&n| n == u).unwrap_or(0);
            let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(u.to_string());
            return Some(cycle);
        }

        if status == NodeStatus::Inactive {
            visited.insert(u, NodeStatus::Active);
            stack.push(u);

            if let Some(node) = self.get(u) {
                for neighbor in &node.dependencies {
                    if let Some(cycle) = self.visit(neighbor, visited, stack) {
                        return Some(cycle);
                    }
                }
            }

            stack.pop();
            visited.insert(u, NodeStatus::Visited);
        }

        None
    }

    /// Dependencies may not have dependencies of their own.
    pub fn check_depth(&self) -> Result<()> {
        self.check_depth_of(self.nodes.iter())
    }

    fn check_depth_of<'a, I>(&'a self, nodes: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Node>,
    {
        for node in nodes {
            for dep in &node.dependencies {
                if let Some(inner) = self.get(dep) {
                    if !inner.dependencies.is_empty() {
                        return Err(BuildError::Configuration(format!(
                            "'{}' depends on '{}', which has dependencies of its own ({}); \
                             nested dependencies are not supported",
                            node.name,
                            dep,
                            inner.dependencies.join(", ")
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_from(&self.nodes.iter().collect::<Vec<_>>())
    }

    fn validate_from(&self, roots: &[&Node]) -> Result<()> {
        if let Some(cycle) = self.detect_cycle_from(roots.iter().map(|n| n.name.as_str())) {
            return Err(BuildError::Configuration(format!(
                "circular dependency: {}",
                cycle.join(" -> ")
            )));
        }
        self.check_depth_of(roots.iter().copied())
    }

    /// The order to build `requested` in: the dependency closure of the
    /// requested components first, then the requested components themselves
    /// in the order given. Each name appears once.
    ///
    /// Only the requested components and what they reach are validated, so an
    /// unsupported chain elsewhere in the map does not get in the way.
    pub fn build_order<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<String>> {
        let mut roots: Vec<&Node> = Vec::new();
        for name in requested {
            let name = name.as_ref();
            let node = self.get(name).ok_or_else(|| {
                BuildError::Configuration(format!("no rule to make target '{}'", name))
            })?;
            if !roots.iter().any(|n| n.name == node.name) {
                roots.push(node);
            }
        }
        self.validate_from(&roots)?;

        let mut subset = DependencyMap::new();
        for node in &roots {
            subset.insert((*node).clone())?;
        }

        let mut order = subset.all_dependencies();
        for node in roots {
            if !order.contains(&node.name) {
                order.push(node.name.clone());
            }
        }
        Ok(order)
    }
}

pub fn all_dependencies(map: &DependencyMap) -> Vec<String> {
    map.all_dependencies()
}
