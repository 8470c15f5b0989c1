//! Accumulates class coverage and aggregates it into a bundle.

use super::coverage::{BundleCoverage, ClassCoverage, CoverageNode, PackageCoverage};
use crate::result::{ReportError, ReportResult};
use std::collections::HashMap;
use std::path::Path;

/// Accumulator of analyzed classes, threaded through analysis by value
#[derive(Debug, Default)]
pub struct CoverageBuilder {
    classes: Vec<ClassCoverage>,
    index: HashMap<String, usize>,
}

impl CoverageBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an analyzed class
    ///
    /// Classes without code are dropped. Re-adding the same class (same
    /// name and id) is a no-op; a different class under an existing name
    /// is an error.
    pub fn add(mut self, class: ClassCoverage, origin: &Path) -> ReportResult<Self> {
        if !class.has_code() {
            return Ok(self);
        }
        if let Some(&existing) = self.index.get(class.name()) {
            if self.classes[existing].id() != class.id() {
                return Err(ReportError::analysis(
                    origin,
                    format!("can't add different class with same name: {}", class.name()),
                ));
            }
            return Ok(self);
        }
        let _ = self.index.insert(class.name().to_string(), self.classes.len());
        self.classes.push(class);
        Ok(self)
    }

    /// Analyzed classes in insertion order
    #[must_use]
    pub fn classes(&self) -> &[ClassCoverage] {
        &self.classes
    }

    /// Classes flagged as not matching their execution data
    pub fn no_match_classes(&self) -> impl Iterator<Item = &ClassCoverage> {
        self.classes.iter().filter(|c| c.is_no_match())
    }

    /// Aggregate into a named bundle
    ///
    /// Packages appear in the order their first class was added and keep
    /// their classes in insertion order.
    #[must_use]
    pub fn into_bundle(self, name: &str) -> BundleCoverage {
        let mut packages: Vec<PackageCoverage> = Vec::new();
        let mut package_index: HashMap<String, usize> = HashMap::new();

        for class in self.classes {
            let package_name = class.package_name().to_string();
            let index = *package_index.entry(package_name).or_insert_with_key(|key| {
                packages.push(PackageCoverage::new(key.clone()));
                packages.len() - 1
            });
            packages[index].add_class(class);
        }

        BundleCoverage::new(name, packages)
    }
}
