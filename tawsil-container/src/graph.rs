//! Dependency graph diagnostics.
//!
//! Walks the recorded constructor-argument lists without constructing
//! anything:
//! - Checks that every reachable dependency is registered
//! - Lists dependency cycles
//!
//! Cycles are reported, not rejected: the construction engine breaks them
//! with lazy references.

use std::collections::{BTreeMap, HashSet};

use tawsil_support::rendering::{render_chain, suggest_similar};
use tracing::{debug, instrument, warn};

use crate::error::{DiError, NotRegisteredError};
use crate::identifier::ServiceId;

/// Outcome of a successful graph inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphReport {
    /// Number of registered services inspected.
    pub services: usize,
    /// Each cycle as a chain closed on its first identifier,
    /// e.g. `[A, B, A]`.
    pub cycles: Vec<Vec<ServiceId>>,
}

impl GraphReport {
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

/// Depth-first walk over the dependency graph.
///
/// Keeps the current path to detect cycles and to report who required a
/// missing dependency.
pub(crate) struct GraphInspector {
    /// Outgoing edges of every registered service, sorted for stable output.
    /// Factory-backed services have no edges.
    edges: BTreeMap<ServiceId, Vec<ServiceId>>,
    /// Currently being visited (for cycle detection)
    visiting: HashSet<ServiceId>,
    /// Already inspected
    inspected: HashSet<ServiceId>,
    /// Current DFS path
    path: Vec<ServiceId>,
    cycles: Vec<Vec<ServiceId>>,
}

impl GraphInspector {
    pub fn new(edges: BTreeMap<ServiceId, Vec<ServiceId>>) -> Self {
        Self {
            edges,
            visiting: HashSet::new(),
            inspected: HashSet::new(),
            path: Vec::new(),
            cycles: Vec::new(),
        }
    }

    /// Inspects the whole graph.
    ///
    /// # Errors
    /// [`DiError::NotRegistered`] for the first unregistered dependency met.
    #[instrument(skip(self), name = "graph_inspection")]
    pub fn inspect(mut self) -> Result<GraphReport, DiError> {
        let keys: Vec<ServiceId> = self.edges.keys().cloned().collect();

        debug!(services = keys.len(), "Starting dependency graph inspection");

        for key in &keys {
            self.inspect_key(key)?;
        }

        debug!(cycles = self.cycles.len(), "Dependency graph inspection passed");
        Ok(GraphReport {
            services: keys.len(),
            cycles: self.cycles,
        })
    }

    fn inspect_key(&mut self, key: &ServiceId) -> Result<(), DiError> {
        if self.inspected.contains(key) {
            return Ok(());
        }

        if self.visiting.contains(key) {
            let cycle_start = self.path.iter().position(|k| k == key).unwrap_or(0);
            let mut chain: Vec<ServiceId> = self.path[cycle_start..].to_vec();
            chain.push(key.clone());

            debug!(cycle = %render_chain(&chain), "Cycle will be broken with a lazy reference");
            self.cycles.push(chain);
            return Ok(());
        }

        let Some(dependencies) = self.edges.get(key).cloned() else {
            let err = NotRegisteredError {
                identifier: key.clone(),
                required_by: self.path.clone(),
                suggestions: self.find_similar(key),
            };
            warn!(identifier = %key, required_by = %render_chain(&err.required_by), "Unregistered dependency");
            return Err(DiError::NotRegistered(err));
        };

        self.visiting.insert(key.clone());
        self.path.push(key.clone());

        for dependency in &dependencies {
            self.inspect_key(dependency)?;
        }

        self.path.pop();
        self.visiting.remove(key);
        self.inspected.insert(key.clone());

        Ok(())
    }

    fn find_similar(&self, target: &ServiceId) -> Vec<String> {
        let available: Vec<&str> = self.edges.keys().map(ServiceId::as_str).collect();
        suggest_similar(target.as_str(), &available, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(entries: &[(&str, &[&str])]) -> BTreeMap<ServiceId, Vec<ServiceId>> {
        entries
            .iter()
            .map(|(key, deps)| {
                (
                    ServiceId::from(*key),
                    deps.iter().map(|d| ServiceId::from(*d)).collect(),
                )
            })
            .collect()
    }

    fn ids(chain: &[&str]) -> Vec<ServiceId> {
        chain.iter().map(|id| ServiceId::from(*id)).collect()
    }

    #[test]
    fn valid_simple_graph() {
        let report = GraphInspector::new(graph(&[
            ("IDatabase", &[]),
            ("IUserRepo", &["IDatabase"]),
            ("IUserService", &["IUserRepo"]),
        ]))
        .inspect()
        .unwrap();

        assert_eq!(report.services, 3);
        assert!(!report.has_cycles());
    }

    #[test]
    fn two_service_cycle_is_reported() {
        let report = GraphInspector::new(graph(&[("A", &["B"]), ("B", &["A"])]))
            .inspect()
            .unwrap();

        assert_eq!(report.cycles, vec![ids(&["A", "B", "A"])]);
    }

    #[test]
    fn three_service_cycle_is_reported() {
        let report = GraphInspector::new(graph(&[("A", &["B"]), ("B", &["C"]), ("C", &["A"])]))
            .inspect()
            .unwrap();

        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].len(), 4);
    }

    #[test]
    fn self_dependency_is_reported() {
        let report = GraphInspector::new(graph(&[("A", &["A"])])).inspect().unwrap();
        assert_eq!(report.cycles, vec![ids(&["A", "A"])]);
    }

    #[test]
    fn detect_missing_dependency() {
        let result = GraphInspector::new(graph(&[("IUserService", &["IUserRepo"])])).inspect();

        match result.unwrap_err() {
            DiError::NotRegistered(err) => {
                assert_eq!(err.identifier, "IUserRepo");
                assert_eq!(err.required_by, ids(&["IUserService"]));
                assert_eq!(err.suggestions, vec!["IUserService".to_string()]);
            }
            other => panic!("Expected NotRegistered, got: {other:?}"),
        }
    }

    #[test]
    fn diamond_dependency_has_no_cycle() {
        //     A
        //    / \
        //   B   C
        //    \ /
        //     D
        let report = GraphInspector::new(graph(&[
            ("D", &[]),
            ("B", &["D"]),
            ("C", &["D"]),
            ("A", &["B", "C"]),
        ]))
        .inspect()
        .unwrap();

        assert!(!report.has_cycles());
    }
}
