//! Translation tree: nested mapping of keys to strings or further mappings.
//!
//! A lang file holds exactly one tree. Leaves are always strings; any other
//! scalar is rejected when the tree is built, so the translator only ever
//! has two cases to handle.

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A value stored under a key in a [`TranslationTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationValue {
    /// Human-readable text to translate
    Leaf(String),
    /// Nested group of keys
    Node(TranslationTree),
}

impl TranslationValue {
    /// Number of string leaves at or below this value.
    pub fn leaf_count(&self) -> usize {
        match self {
            TranslationValue::Leaf(_) => 1,
            TranslationValue::Node(tree) => tree.leaf_count(),
        }
    }
}

impl From<&str> for TranslationValue {
    fn from(text: &str) -> Self {
        TranslationValue::Leaf(text.to_string())
    }
}

impl From<String> for TranslationValue {
    fn from(text: String) -> Self {
        TranslationValue::Leaf(text)
    }
}

impl From<TranslationTree> for TranslationValue {
    fn from(tree: TranslationTree) -> Self {
        TranslationValue::Node(tree)
    }
}

/// Ordered mapping of unique keys to [`TranslationValue`]s.
///
/// Entries keep their insertion order so a translated file reads in the same
/// order as its source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTree {
    entries: Vec<(String, TranslationValue)>,
}

impl TranslationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under `key`.
    ///
    /// Re-inserting an existing key replaces its value but keeps the key's
    /// original position, matching how PHP arrays treat duplicate keys.
    /// Returns the previous value, if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<TranslationValue>,
    ) -> Option<TranslationValue> {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Builder-style [`insert`](Self::insert), handy for literals in tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<TranslationValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&TranslationValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TranslationValue)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of string leaves in the tree, at any depth.
    pub fn leaf_count(&self) -> usize {
        self.entries.iter().map(|(_, value)| value.leaf_count()).sum()
    }
}

// ==================== Serde ====================

impl Serialize for TranslationTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for TranslationValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TranslationValue::Leaf(text) => serializer.serialize_str(text),
            TranslationValue::Node(tree) => tree.serialize(serializer),
        }
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = TranslationTree;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a mapping of translation keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut tree = TranslationTree::new();
        while let Some((key, value)) = access.next_entry::<String, TranslationValue>()? {
            tree.insert(key, value);
        }
        Ok(tree)
    }
}

impl<'de> Deserialize<'de> for TranslationTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TreeVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = TranslationValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a string or a nested mapping of translation keys")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(TranslationValue::Leaf(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(TranslationValue::Leaf(value))
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Self::Value, A::Error> {
        TreeVisitor.visit_map(access).map(TranslationValue::Node)
    }
}

impl<'de> Deserialize<'de> for TranslationValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}
