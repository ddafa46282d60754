//! Declared parameter shape of a remote operation.
//!
//! Snapshot of what the service description declares for one operation:
//! an ordered sequence of named elements, each either a leaf or a wrapper
//! carrying its own nested sequence. Read-only once built; the engine never
//! mutates a schema between calls.

/// One declared parameter element.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterElement {
    pub name: String,
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Leaf,
    Wrapper(Vec<ParameterElement>),
}

impl ParameterElement {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ElementKind::Leaf,
        }
    }

    pub fn wrapper(name: impl Into<String>, nested: Vec<ParameterElement>) -> Self {
        Self {
            name: name.into(),
            kind: ElementKind::Wrapper(nested),
        }
    }

    /// Nested elements when this is a wrapper with at least one child.
    pub fn nested(&self) -> Option<&[ParameterElement]> {
        match &self.kind {
            ElementKind::Wrapper(nested) if !nested.is_empty() => Some(nested),
            _ => None,
        }
    }
}

/// The declared top-level parameter elements of one operation, in schema
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationSchema {
    pub elements: Vec<ParameterElement>,
}

impl OperationSchema {
    pub fn new(elements: Vec<ParameterElement>) -> Self {
        Self { elements }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|element| element.name.as_str())
    }
}
