//! The marker attribute vocabulary

use std::fmt;

use crate::cst::ast::{Attribute, AttributeList};

/// Nullability marker attributes the rewriter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Marker {
    CanBeNull,
    NotNull,
}

impl Marker {
    pub const ALL: [Marker; 2] = [Marker::CanBeNull, Marker::NotNull];

    /// Attribute name as written in source
    pub const fn name(self) -> &'static str {
        match self {
            Marker::CanBeNull => "CanBeNull",
            Marker::NotNull => "NotNull",
        }
    }

    /// Exact, case-sensitive lookup; `CanBeNullAttribute` is not a marker
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|marker| marker.name() == name)
    }

    pub fn matches(self, attribute: &Attribute) -> bool {
        attribute.simple_name().as_deref().and_then(Self::from_name) == Some(self)
    }

    /// First attribute in source order that is this marker
    pub fn find_in(self, lists: impl IntoIterator<Item = AttributeList>) -> Option<Attribute> {
        lists
            .into_iter()
            .flat_map(|list| list.attributes())
            .find(|attribute| self.matches(attribute))
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
