//! Exact-match color to object-template lookup.
//!
//! A `ColorKeyTable` is built once from an ordered list of (color, template)
//! pairs and is immutable afterwards. Duplicate colors are silently ignored:
//! the first occurrence wins. Rebuilding from the same list is idempotent.

use std::collections::HashMap;

use crate::color::Rgba;

/// Opaque reference to a spawnable object definition.
///
/// The core never interprets the id; an external factory resolves it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectTemplateRef(String);

impl ObjectTemplateRef {
    /// Create a template reference from an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The template id.
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Immutable mapping from exact color values to object templates.
#[derive(Clone, Debug, Default)]
pub struct ColorKeyTable {
    entries: HashMap<Rgba, ObjectTemplateRef>,
}

impl ColorKeyTable {
    /// Build a table from an ordered sequence of (color, template) pairs.
    ///
    /// The list is iterated once; a pair whose color is already present is
    /// skipped, so the first entry for a given color wins. This is not an
    /// error.
    pub fn build<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Rgba, ObjectTemplateRef)>,
    {
        let mut entries = HashMap::new();
        for (color, template) in pairs {
            entries.entry(color).or_insert(template);
        }
        Self { entries }
    }

    /// Look up the template for an exact color.
    ///
    /// Returns `None` for colors not present in the table.
    pub fn lookup(&self, color: Rgba) -> Option<&ObjectTemplateRef> {
        self.entries.get(&color)
    }

    /// Number of distinct color keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
