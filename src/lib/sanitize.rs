//! Safe serialization of object graphs that may contain cycles.
//!
//! Upstream views are assembled as an [`ObjectGraph`]: an arena of nodes
//! addressed by [`NodeId`], so back-references are plain ids. [`safe_serialize`]
//! walks the graph depth-first and produces a finite JSON document:
//!
//! - a node already on the current path becomes [`CIRCULAR_MARKER`];
//! - objects whose type name is in the stringify list become their string form;
//! - objects whose type name is in the elide list become `"[TypeName]"`;
//! - function-valued fields are dropped (functions inside arrays become `null`).

use std::collections::HashSet;

use serde_json::{Map, Number, Value};

/// Replacement emitted where a reference points back at one of its ancestors.
pub const CIRCULAR_MARKER: &str = "[Circular]";

/// Index of a node inside an [`ObjectGraph`].
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<NodeId>),
    Object {
        type_name: Option<String>,
        /// String form for identifier and big-number wrappers.
        display: Option<String>,
        fields: Vec<(String, NodeId)>,
    },
    Function {
        name: String,
    },
}

/// Arena of nodes with stable ids.
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    nodes: Vec<Node>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn insert(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn null(&mut self) -> NodeId {
        self.insert(Node::Null)
    }

    pub fn bool(&mut self, value: bool) -> NodeId {
        self.insert(Node::Bool(value))
    }

    pub fn uint(&mut self, value: u64) -> NodeId {
        self.insert(Node::Number(Number::from(value)))
    }

    /// Non-finite values have no JSON form and become `null`.
    pub fn float(&mut self, value: f64) -> NodeId {
        match Number::from_f64(value) {
            Some(number) => self.insert(Node::Number(number)),
            None => self.null(),
        }
    }

    pub fn string(&mut self, value: impl Into<String>) -> NodeId {
        self.insert(Node::String(value.into()))
    }

    pub fn array(&mut self, items: Vec<NodeId>) -> NodeId {
        self.insert(Node::Array(items))
    }

    pub fn function(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(Node::Function { name: name.into() })
    }

    /// Opaque wrapper (public key, big number) carrying a string form.
    pub fn wrapper(&mut self, type_name: &str, display: impl Into<String>) -> NodeId {
        self.insert(Node::Object {
            type_name: Some(type_name.to_string()),
            display: Some(display.into()),
            fields: Vec::new(),
        })
    }

    /// Empty object; fields can be attached later, which is how cycles are formed.
    pub fn object(&mut self, type_name: Option<&str>) -> NodeId {
        self.insert(Node::Object {
            type_name: type_name.map(str::to_string),
            display: None,
            fields: Vec::new(),
        })
    }

    /// Append a field to an object node. Non-object targets are left untouched.
    pub fn set_field(&mut self, object: NodeId, key: impl Into<String>, value: NodeId) {
        if let Some(Node::Object { fields, .. }) = self.nodes.get_mut(object) {
            fields.push((key.into(), value));
        }
    }
}

/// Type names that are stringified or elided during serialization.
#[derive(Debug, Clone, Copy)]
pub struct SanitizePolicy<'a> {
    pub stringify: &'a [&'a str],
    pub elide: &'a [&'a str],
}

impl SanitizePolicy<'static> {
    pub const DEFAULT: SanitizePolicy<'static> = SanitizePolicy {
        stringify: &["PublicKey", "BN"],
        elide: &["EventEmitter", "Connection", "Provider", "Wallet", "Keypair"],
    };
}

impl Default for SanitizePolicy<'static> {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Serialize `root` into JSON, replacing cycles and non-serializable nodes.
pub fn safe_serialize(graph: &ObjectGraph, root: NodeId, policy: &SanitizePolicy<'_>) -> Value {
    let mut path = HashSet::new();
    visit(graph, root, policy, &mut path)
}

fn visit(
    graph: &ObjectGraph,
    id: NodeId,
    policy: &SanitizePolicy<'_>,
    path: &mut HashSet<NodeId>,
) -> Value {
    let Some(node) = graph.node(id) else {
        return Value::Null;
    };
    if path.contains(&id) {
        return Value::String(CIRCULAR_MARKER.into());
    }

    match node {
        Node::Null | Node::Function { .. } => Value::Null,
        Node::Bool(value) => Value::Bool(*value),
        Node::Number(number) => Value::Number(number.clone()),
        Node::String(value) => Value::String(value.clone()),
        Node::Array(items) => {
            path.insert(id);
            let values = items
                .iter()
                .map(|item| visit(graph, *item, policy, path))
                .collect();
            path.remove(&id);
            Value::Array(values)
        }
        Node::Object {
            type_name,
            display,
            fields,
        } => {
            if let Some(name) = type_name.as_deref() {
                if policy.elide.iter().any(|candidate| *candidate == name) {
                    return Value::String(format!("[{name}]"));
                }
                if policy.stringify.iter().any(|candidate| *candidate == name) {
                    if let Some(display) = display {
                        return Value::String(display.clone());
                    }
                }
            }

            path.insert(id);
            let mut map = Map::new();
            for (key, child) in fields {
                if matches!(graph.node(*child), Some(Node::Function { .. })) {
                    continue;
                }
                map.insert(key.clone(), visit(graph, *child, policy, path));
            }
            path.remove(&id);
            Value::Object(map)
        }
    }
}
