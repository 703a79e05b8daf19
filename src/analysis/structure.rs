//! Per-file method and field inventories.
//!
//! Built by replaying a dependency stream and classifying each endpoint:
//! entities with a parameter list are methods, the rest are fields. An
//! optional reassignment map relocates entities the same way the graph
//! builder does, so a simulated move is reflected in the inventories.

use std::collections::HashMap;

use crate::core::entity::Entity;
use crate::core::errors::Result;
use crate::core::scanner::DependencyScanner;

use super::finder::Finder;
use super::graph::Reassignments;

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<String>,
    source_entity: String,
}

impl Method {
    /// Signature string used for method matching across files.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.parameters.join(","))
    }

    pub fn entity(&self) -> Entity<'_> {
        Entity::new(&self.source_entity)
    }
}

#[derive(Default)]
pub struct Structure {
    files: Vec<String>,
    methods: HashMap<String, Vec<Method>>,
    fields: HashMap<String, Vec<String>>,
}

impl Structure {
    pub fn build(reassignments: Option<&Reassignments>, input: &str) -> Result<Self> {
        let mut result = Structure::default();
        for record in DependencyScanner::new(input) {
            let d = record?;
            if d.from.len() != 1 {
                continue;
            }
            for raw in [&d.from[0], &d.to] {
                let e = Entity::new(raw);
                let mut file = e.filename();
                if let Some(map) = reassignments {
                    if let Some(f) = map.get(&e.query_string()) {
                        file = f.clone();
                    }
                }
                match e.parameters() {
                    None => {
                        result
                            .fields
                            .entry(file.clone())
                            .or_default()
                            .push(e.name());
                    }
                    Some(parameters) => {
                        result.methods.entry(file.clone()).or_default().push(Method {
                            name: e.name(),
                            parameters,
                            source_entity: raw.to_string(),
                        });
                    }
                }
                if !result.files.contains(&file) {
                    result.files.push(file);
                }
            }
        }
        Ok(result)
    }

    /// Distinct file names, in first-seen order.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn methods(&self, file: &str) -> &[Method] {
        self.methods.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self, file: &str) -> &[String] {
        self.fields.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Counts the file's methods that receive at least one dependency from
    /// outside the file their entity belongs to.
    pub fn public_methods_count(&self, file: &str, finder: &Finder) -> usize {
        self.methods(file)
            .iter()
            .filter(|m| {
                let own_file = m.entity().filename();
                finder
                    .dependencies_of(&m.entity())
                    .map(|deps| {
                        deps.income
                            .iter()
                            .any(|d| Entity::new(d).filename() != own_file)
                    })
                    .unwrap_or(false)
            })
            .count()
    }
}
