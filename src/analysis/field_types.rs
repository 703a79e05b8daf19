//! Field to field-type lookup.
//!
//! Two-column lines mapping a field entity to its type entity; the lookup
//! key is the field's canonical query string and the answer is the type's
//! file name. Absent information yields the empty string.

use std::collections::HashMap;

use crate::core::entity::Entity;
use crate::core::errors::{AnalysisError, Result};

pub struct FieldTypes {
    types: HashMap<String, String>,
}

impl FieldTypes {
    pub fn parse(input: &str) -> Result<Self> {
        let mut types = HashMap::new();
        for line in input.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut columns: Vec<&str> = trimmed.split('\t').collect();
            if columns.len() < 2 {
                columns = trimmed.split(' ').filter(|c| !c.is_empty()).collect();
            }
            if columns.len() < 2 {
                return Err(AnalysisError::MalformedLine {
                    line: line.to_string(),
                });
            }
            types.insert(
                Entity::new(columns[0]).query_string(),
                Entity::new(columns[1]).filename(),
            );
        }
        Ok(FieldTypes { types })
    }

    pub fn type_of(&self, field: &str) -> &str {
        self.types
            .get(&Entity::new(field).query_string())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Null-object view: no field-type information answers the empty string.
pub fn type_of<'a>(field_types: Option<&'a FieldTypes>, field: &str) -> &'a str {
    field_types.map(|ft| ft.type_of(field)).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn looks_up_type_file_by_canonical_field() {
        let ft =
            FieldTypes::parse("p_C1.java/[CN]/C1/[FE]/counter\tp_C2.java/[CN]/C2\n").unwrap();
        assert_eq!(ft.type_of("p_C1.java/[CN]/C1/[FE]/counter"), "C2");
        assert_eq!(ft.type_of("p_C1.java/[CN]/C1/[FE]/unknown"), "");
    }

    #[test]
    fn absent_lookup_yields_empty() {
        assert_eq!(type_of(None, "p_C1.java/[CN]/C1/[FE]/counter"), "");
    }

    #[test]
    fn short_line_is_malformed() {
        assert!(matches!(
            FieldTypes::parse("only-one-column\n"),
            Err(AnalysisError::MalformedLine { .. })
        ));
    }
}
