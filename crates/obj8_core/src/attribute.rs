//! Order-preserving attribute table.
//!
//! The same table type backs two things: the file header (global attributes
//! such as `TEXTURE` or `GLOBAL_specular`) and the render state that is
//! active when a `TRIS` batch is drawn (`ATTR_light_level`, manipulators, ...).
//!
//! Names are unique and remember their first-insertion position; iteration
//! always yields names in that order. Each name owns an ordered list of values.
//! A name whose list is empty is treated as absent when serializing.

use std::collections::HashMap;
use std::fmt;

use obj8_math::format_float;
use serde::Serialize;

/// A single attribute value as it appears after the directive keyword.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AttrValue {
    /// Presence-only attribute; renders as nothing (or `1` inside a list).
    Flag,
    Int(i64),
    Float(f64),
    Text(String),
    /// Several fields on one line, separated by tabs.
    List(Vec<AttrValue>),
}

impl AttrValue {
    /// Convenience constructor for text values.
    pub fn text(value: impl Into<String>) -> Self {
        AttrValue::Text(value.into())
    }

    fn fmt_member(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Flag => f.write_str("1"),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Flag => Ok(()),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => f.write_str(&format_float(*v)),
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\t")?;
                    }
                    item.fmt_member(f)?;
                }
                Ok(())
            }
        }
    }
}

/// Render one directive line: the name, then a tab and the value if it has text.
pub fn directive_line(name: &str, value: &AttrValue) -> String {
    let rendered = value.to_string();
    if rendered.is_empty() {
        name.to_string()
    } else {
        format!("{}\t{}", name, rendered)
    }
}

/// A named attribute with its ordered values.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attribute<V> {
    pub name: String,
    pub values: Vec<V>,
}

impl<V> Attribute<V> {
    /// An attribute with no values counts as unset.
    pub fn is_set(&self) -> bool {
        !self.values.is_empty()
    }
}

/// Order-preserving multi-map from attribute name to values.
#[derive(Clone, Debug, Serialize)]
pub struct AttributeTable<V> {
    entries: Vec<Attribute<V>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl<V> Default for AttributeTable<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V: PartialEq> PartialEq for AttributeTable<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V> AttributeTable<V> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for `name` so it serializes at this position later.
    pub fn register(&mut self, name: &str) {
        self.slot(name);
    }

    fn slot(&mut self, name: &str) -> &mut Attribute<V> {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push(Attribute {
                    name: name.to_string(),
                    values: Vec::new(),
                });
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.entries[idx]
    }

    /// Replace all values of `name` with a single value.
    pub fn set(&mut self, name: &str, value: V) {
        let slot = self.slot(name);
        slot.values.clear();
        slot.values.push(value);
    }

    /// Add one more value to `name`.
    pub fn append(&mut self, name: &str, value: V) {
        self.slot(name).values.push(value);
    }

    /// Empty the value list of `name`, keeping its position.
    pub fn clear(&mut self, name: &str) {
        if let Some(&idx) = self.index.get(name) {
            self.entries[idx].values.clear();
        }
    }

    /// Empty every value list.
    pub fn clear_all(&mut self) {
        for entry in &mut self.entries {
            entry.values.clear();
        }
    }

    /// Values of `name`; empty when unset or unknown.
    pub fn values(&self, name: &str) -> &[V] {
        self.index
            .get(name)
            .map(|&idx| self.entries[idx].values.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `name` currently has at least one value.
    pub fn is_set(&self, name: &str) -> bool {
        !self.values(name).is_empty()
    }

    /// Whether `name` has ever been registered or set.
    pub fn contains_key(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All attributes in first-insertion order, including unset ones.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute<V>> {
        self.entries.iter()
    }

    /// Only the attributes that have values, in first-insertion order.
    pub fn iter_set(&self) -> impl Iterator<Item = &Attribute<V>> {
        self.entries.iter().filter(|a| a.is_set())
    }

    /// Number of attributes that have values.
    pub fn len(&self) -> usize {
        self.iter_set().count()
    }

    /// True when no attribute has a value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttributeTable<AttrValue> {
    /// Serialize every set attribute, one line per value.
    pub fn to_lines(&self) -> Vec<String> {
        self.iter_set()
            .flat_map(|attr| {
                attr.values
                    .iter()
                    .map(move |value| directive_line(&attr.name, value))
            })
            .collect()
    }
}
