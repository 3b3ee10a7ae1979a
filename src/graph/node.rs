/// One named entry of a dependency map: a component and the names of the
/// components it needs built first, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub dependencies: Vec<String>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Node {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Node
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }
}
