//! Node implementation for the fraud graph

use super::property::{PropertyMap, PropertyValue};
use super::schema::NodeKind;
use super::types::NodeId;
use serde::{Deserialize, Serialize, Serializer};

/// A node in the fraud graph
///
/// Nodes have:
/// - A store-assigned ID
/// - Exactly one kind (label)
/// - A canonical identity key, unique per kind
/// - Attributes, including the key attribute itself
/// - Creation and update timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Kind (label) of this node
    pub kind: NodeKind,

    /// Canonical key string, see [`PropertyValue::key_string`]
    pub key: String,

    /// Attributes associated with this node
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Node {
    /// Create a node with no attributes besides its key
    pub fn new(id: NodeId, kind: NodeKind, key: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let key = key.into();
        let mut properties = PropertyMap::new();
        properties.insert(kind.key_attribute().to_string(), PropertyValue::String(key.clone()));

        Node {
            id,
            kind,
            key,
            properties,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if node is of a specific kind
    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    /// Get an attribute value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Attribute as a string slice, `None` when missing, null or non-string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(PropertyValue::as_string)
    }

    /// Overwrite every attribute with `attributes` (last write wins).
    ///
    /// Attributes not mentioned keep no stale value: the map is replaced, not
    /// merged, apart from the key attribute which is always retained.
    pub fn replace_attributes(&mut self, attributes: PropertyMap) {
        let key_attr = self.kind.key_attribute();
        let key_value = self
            .properties
            .remove(key_attr)
            .unwrap_or_else(|| PropertyValue::String(self.key.clone()));
        self.properties = attributes;
        self.properties.insert(key_attr.to_string(), key_value);
        self.update_timestamp();
    }


    fn update_timestamp(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

/// Read-only projection of a node handed to callers: kind tag, key and
/// attributes rendered as plain JSON scalars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub label: NodeKind,
    pub key: String,
    #[serde(serialize_with = "plain_properties")]
    pub properties: PropertyMap,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        NodeView {
            label: node.kind,
            key: node.key.clone(),
            properties: node.properties.clone(),
        }
    }
}

fn plain_properties<S: Serializer>(props: &PropertyMap, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(props.iter().map(|(k, v)| (k, v.to_json())))
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
