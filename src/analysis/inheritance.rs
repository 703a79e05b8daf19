//! Subclass to superclass relations.
//!
//! Built once from a two-column line stream. Entities are given stable
//! integer indices on first sight; the outbound and inbound lists are the
//! index-level views the metrics engine consumes. An absent inheritance
//! file is represented as `Option::None` at every call site and answers
//! false or empty uniformly, see [`is_superclass`].

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::core::entity::Entity;
use crate::core::errors::{AnalysisError, Result};

pub struct Inheritance {
    superclasses: Vec<Vec<usize>>,
    index: IndexMap<String, usize>,
    superclass_files: HashSet<String>,
}

impl Inheritance {
    /// Parses `subclass \t superclass` lines, with a space-separated
    /// fallback. Lines with fewer than two columns abort the build.
    pub fn parse(input: &str) -> Result<Self> {
        let mut result = Inheritance {
            superclasses: Vec::new(),
            index: IndexMap::new(),
            superclass_files: HashSet::new(),
        };
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
            let sub_idx = result.intern(columns[0]);
            let super_idx = result.intern(columns[1]);
            result.superclasses[sub_idx].push(super_idx);
            result
                .superclass_files
                .insert(Entity::new(columns[1]).filename());
        }
        Ok(result)
    }

    fn intern(&mut self, name: &str) -> usize {
        let next = self.index.len();
        let idx = *self.index.entry(name.to_string()).or_insert(next);
        if idx == next {
            self.superclasses.push(Vec::new());
        }
        idx
    }

    /// Per subclass with at least one superclass:
    /// `[subclass, superclass, superclass, ...]`.
    pub fn outbound_list(&self) -> Vec<Vec<usize>> {
        let mut result = Vec::new();
        for (i, sup) in self.superclasses.iter().enumerate() {
            if sup.is_empty() {
                continue;
            }
            let mut entry = vec![i];
            entry.extend_from_slice(sup);
            result.push(entry);
        }
        result
    }

    /// Inverts the outbound list: per unique superclass, in encounter
    /// order, `[superclass, first subclass, other subclasses, ...]`.
    pub fn inbound_list(&self) -> Vec<Vec<usize>> {
        let outbound = self.outbound_list();
        let mut result: Vec<Vec<usize>> = Vec::new();
        for (i, sub) in outbound.iter().enumerate() {
            let mut inbound: Vec<usize> = Vec::new();
            'parents: for &parent in &sub[1..] {
                for group in &result {
                    if group[0] == parent {
                        continue 'parents;
                    }
                }
                inbound.push(parent);
                inbound.push(sub[0]);
                for (k, other) in outbound.iter().enumerate() {
                    if k == i {
                        continue;
                    }
                    if other[1..].contains(&parent) {
                        inbound.push(other[0]);
                    }
                }
            }
            if !inbound.is_empty() {
                result.push(inbound);
            }
        }
        result
    }

    /// File name of the entity behind an index.
    pub fn file(&self, i: usize) -> String {
        match self.index.get_index(i) {
            Some((name, _)) => Entity::new(name).filename(),
            None => String::new(),
        }
    }

    pub fn is_superclass(&self, file: &str) -> bool {
        self.superclass_files.contains(file)
    }
}

/// Null-object view: no inheritance information answers false.
pub fn is_superclass(inheritance: Option<&Inheritance>, file: &str) -> bool {
    inheritance.is_some_and(|inh| inh.is_superclass(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const STREAM: &str = indoc! {"
        p_C1.java/[CN]/\tp_C.java/[CN]/
        p_C2.java/[CN]/\tp_C.java/[CN]/
        p_C3.java/[CN]/\tp_D.java/[CN]/
    "};

    #[test]
    fn outbound_list_pairs_each_subclass_with_its_superclasses() {
        let inh = Inheritance::parse(STREAM).unwrap();
        // indices: C1=0, C=1, C2=2, C3=3, D=4
        assert_eq!(
            inh.outbound_list(),
            vec![vec![0, 1], vec![2, 1], vec![3, 4]]
        );
    }

    #[test]
    fn inbound_list_groups_subclasses_per_unique_superclass() {
        let inh = Inheritance::parse(STREAM).unwrap();
        assert_eq!(inh.inbound_list(), vec![vec![1, 0, 2], vec![4, 3]]);
    }

    #[test]
    fn superclass_files_are_marked() {
        let inh = Inheritance::parse(STREAM).unwrap();
        assert!(inh.is_superclass("C"));
        assert!(inh.is_superclass("D"));
        assert!(!inh.is_superclass("C1"));
    }

    #[test]
    fn file_resolves_indices() {
        let inh = Inheritance::parse(STREAM).unwrap();
        assert_eq!(inh.file(0), "C1");
        assert_eq!(inh.file(1), "C");
        assert_eq!(inh.file(99), "");
    }

    #[test]
    fn space_separated_fallback() {
        let inh = Inheritance::parse("p_C1.java/[CN]/ p_C.java/[CN]/\n").unwrap();
        assert!(inh.is_superclass("C"));
    }

    #[test]
    fn short_line_is_malformed() {
        assert!(matches!(
            Inheritance::parse("p_C1.java/[CN]/\n"),
            Err(AnalysisError::MalformedLine { .. })
        ));
    }

    #[test]
    fn absent_inheritance_answers_false() {
        assert!(!is_superclass(None, "C"));
        let inh = Inheritance::parse(STREAM).unwrap();
        assert!(is_superclass(Some(&inh), "C"));
    }
}
