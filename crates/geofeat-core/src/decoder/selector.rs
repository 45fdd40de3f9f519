use std::collections::HashSet;

use crate::schema::{Projection, Schema};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    /// Every old-schema field is wanted.
    All,
    Subset(HashSet<String>),
}

/// Decides, per old-schema field, whether to materialize or skip it.
///
/// [`Projection::All`] selects every field of the schema it is built against.
/// When an explicit projection names exactly the old schema's fields, `wants`
/// returns true without a membership test. Equal counts alone are not enough to take
/// that path: a projection of the same size that names other fields must not
/// select the missing ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelector {
    selection: Selection,
}

impl FieldSelector {
    pub fn new(projection: &Projection, old_schema: &Schema) -> Self {
        let selection = match projection {
            Projection::All => Selection::All,
            Projection::Fields(names) => {
                let covers_all = names.len() == old_schema.len()
                    && old_schema.fields().iter().all(|f| names.contains(&f.name));
                if covers_all {
                    Selection::All
                } else {
                    Selection::Subset(names.clone())
                }
            }
        };
        Self { selection }
    }

    pub fn wants(&self, name: &str) -> bool {
        match &self.selection {
            Selection::All => true,
            Selection::Subset(names) => names.contains(name),
        }
    }

    /// True when no projection is applied.
    pub fn is_pass_through(&self) -> bool {
        self.selection == Selection::All
    }
}
