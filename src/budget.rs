//! Streaming budget checker for scene event streams.
//!
//! Unity scenes are long streams of small documents, so the defaults allow many
//! more documents than a configuration file would ever need, while still stopping
//! resource-amplifying inputs.

use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Budgets for a streaming scan.
///
/// ```rust
/// let mut options = saphyr_unity::Options::default();
/// options.budget = Some(saphyr_unity::Budget {
///     max_documents: 10,
///     ..saphyr_unity::Budget::default()
/// });
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Budget {
    /// Maximum total events (counting every event).
    ///
    /// Default: 50,000,000
    pub max_events: usize,
    /// Maximum structural nesting depth (sequences + mappings).
    ///
    /// Default: 2,000
    pub max_depth: usize,
    /// Maximum number of documents in the stream.
    ///
    /// Default: 1,000,000
    pub max_documents: usize,
    /// Maximum number of *nodes* (SeqStart/MapStart/Scalar).
    ///
    /// Default: 25,000,000
    pub max_nodes: usize,
    /// Maximum total bytes of scalar contents.
    ///
    /// Default: 1 GiB
    pub max_total_scalar_bytes: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_events: 50_000_000,
            max_depth: 2_000,
            max_documents: 1_000_000,
            max_nodes: 25_000_000,
            max_total_scalar_bytes: 1024 * 1024 * 1024,
        }
    }
}

/// What tripped the budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BudgetBreach {
    /// The total number of events exceeded [`Budget::max_events`].
    Events { events: usize },
    /// Nesting depth exceeded [`Budget::max_depth`].
    Depth { depth: usize },
    /// Too many documents in the stream.
    Documents { documents: usize },
    /// Too many nodes.
    Nodes { nodes: usize },
    /// Scalar text exceeded [`Budget::max_total_scalar_bytes`].
    ScalarBytes { total_scalar_bytes: usize },
    /// A container end without a matching start.
    Unbalanced,
}

/// Counters collected while enforcing a [`Budget`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BudgetReport {
    pub events: usize,
    pub documents: usize,
    pub nodes: usize,
    pub max_depth: usize,
    pub total_scalar_bytes: usize,
}

/// Incremental enforcer fed one event at a time by the live event source.
#[derive(Debug)]
pub struct BudgetEnforcer {
    budget: Budget,
    report: BudgetReport,
    depth: usize,
}

impl BudgetEnforcer {
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            report: BudgetReport::default(),
            depth: 0,
        }
    }

    /// Observe an [`Event`], updating the internal counters.
    ///
    /// Returns `Err(BudgetBreach)` as soon as a limit is exceeded.
    pub fn observe(&mut self, ev: &Event) -> Result<(), BudgetBreach> {
        self.report.events += 1;
        if self.report.events > self.budget.max_events {
            return Err(BudgetBreach::Events {
                events: self.report.events,
            });
        }

        match ev {
            Event::StreamStart { .. } | Event::StreamEnd { .. } | Event::DocumentEnd { .. } => {}
            Event::DocumentStart { .. } => {
                self.report.documents += 1;
                if self.report.documents > self.budget.max_documents {
                    return Err(BudgetBreach::Documents {
                        documents: self.report.documents,
                    });
                }
            }
            Event::Scalar { value, .. } => {
                self.bump_nodes()?;
                self.report.total_scalar_bytes =
                    self.report.total_scalar_bytes.saturating_add(value.len());
                if self.report.total_scalar_bytes > self.budget.max_total_scalar_bytes {
                    return Err(BudgetBreach::ScalarBytes {
                        total_scalar_bytes: self.report.total_scalar_bytes,
                    });
                }
            }
            Event::SeqStart { .. } | Event::MapStart { .. } => {
                self.bump_nodes()?;
                self.depth = self.depth.saturating_add(1);
                if self.depth > self.report.max_depth {
                    self.report.max_depth = self.depth;
                }
                if self.report.max_depth > self.budget.max_depth {
                    return Err(BudgetBreach::Depth {
                        depth: self.report.max_depth,
                    });
                }
            }
            Event::SeqEnd { .. } | Event::MapEnd { .. } => {
                self.depth = self.depth.checked_sub(1).ok_or(BudgetBreach::Unbalanced)?;
            }
        }

        Ok(())
    }

    fn bump_nodes(&mut self) -> Result<(), BudgetBreach> {
        self.report.nodes += 1;
        if self.report.nodes > self.budget.max_nodes {
            return Err(BudgetBreach::Nodes {
                nodes: self.report.nodes,
            });
        }
        Ok(())
    }

    /// Counters observed so far.
    pub fn report(&self) -> &BudgetReport {
        &self.report
    }

    /// Finish the scan; an unbalanced stream is reported as a breach.
    pub fn finalize(self) -> Result<BudgetReport, BudgetBreach> {
        if self.depth != 0 {
            return Err(BudgetBreach::Unbalanced);
        }
        Ok(self.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;

    fn scalar(value: &str) -> Event {
        Event::Scalar {
            value: value.to_owned(),
            tag: None,
            anchor: None,
            location: Location::UNKNOWN,
        }
    }

    fn map_start() -> Event {
        Event::MapStart {
            tag: None,
            anchor: None,
            location: Location::UNKNOWN,
        }
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut enforcer = BudgetEnforcer::new(Budget {
            max_depth: 2,
            ..Budget::default()
        });
        enforcer.observe(&map_start()).unwrap();
        enforcer.observe(&map_start()).unwrap();
        assert_eq!(
            enforcer.observe(&map_start()),
            Err(BudgetBreach::Depth { depth: 3 })
        );
    }

    #[test]
    fn scalar_bytes_accumulate() {
        let mut enforcer = BudgetEnforcer::new(Budget {
            max_total_scalar_bytes: 5,
            ..Budget::default()
        });
        enforcer.observe(&scalar("abc")).unwrap();
        assert_eq!(
            enforcer.observe(&scalar("def")),
            Err(BudgetBreach::ScalarBytes {
                total_scalar_bytes: 6
            })
        );
    }

    #[test]
    fn unbalanced_end_is_a_breach() {
        let mut enforcer = BudgetEnforcer::new(Budget::default());
        let end = Event::MapEnd {
            location: Location::UNKNOWN,
        };
        assert_eq!(enforcer.observe(&end), Err(BudgetBreach::Unbalanced));
    }

    #[test]
    fn finalize_reports_counters() {
        let mut enforcer = BudgetEnforcer::new(Budget::default());
        enforcer.observe(&map_start()).unwrap();
        enforcer.observe(&scalar("k")).unwrap();
        enforcer.observe(&scalar("v")).unwrap();
        enforcer
            .observe(&Event::MapEnd {
                location: Location::UNKNOWN,
            })
            .unwrap();
        let report = enforcer.finalize().unwrap();
        assert_eq!(report.events, 4);
        assert_eq!(report.nodes, 3);
        assert_eq!(report.max_depth, 1);
    }
}
