//! End-to-end hierarchy run over a snapshot.
//!
//! Phases run strictly in order: load the type table, normalize every row,
//! build the tree. Each phase is timed and logged.

use crate::config::{OnError, TraceGraphConfig};
use crate::error::{Result, TraceGraphError};
use crate::hierarchy::{BuildReport, Hierarchy, HierarchyBuilder};
use crate::normalize::{normalize, TypeTable};
use crate::observability::{PhaseTimer, RunMetrics};
use crate::snapshot::{Snapshot, TraversalRow};
use crate::types::Item;

/// A record dropped under [`OnError::Skip`].
#[derive(Debug)]
pub struct SkippedRecord {
    pub node_id: i64,
    pub db_key: Option<String>,
    pub error: TraceGraphError,
}

#[derive(Debug)]
pub struct HierarchyRun {
    pub types: TypeTable,
    pub hierarchy: Hierarchy,
    pub report: BuildReport,
    pub skipped: Vec<SkippedRecord>,
    pub metrics: RunMetrics,
}

impl HierarchyRun {
    pub fn descendants(&self) -> usize {
        self.metrics.descendants
    }
}

/// Load the type table from a snapshot's type-definition nodes.
pub fn load_types(snapshot: &Snapshot, config: &TraceGraphConfig) -> Result<TypeTable> {
    TypeTable::from_nodes(&snapshot.types, config.keys.prefix_len)
}

/// Normalize traversal rows. Under [`OnError::Abort`] the first failure is
/// returned; under [`OnError::Skip`] failed rows are collected and logged.
pub fn normalize_rows(
    rows: &[TraversalRow],
    table: &TypeTable,
    on_error: OnError,
) -> Result<(Vec<Item>, Vec<SkippedRecord>)> {
    let mut items = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();
    for row in rows {
        match normalize(&row.item, row.parent_key.as_deref(), table) {
            Ok(item) => items.push(item),
            Err(e) if on_error == OnError::Skip && e.is_data_error() => {
                tracing::warn!(node_id = row.item.id, error = %e, "skipping record");
                skipped.push(SkippedRecord {
                    node_id: row.item.id,
                    db_key: row.item.db_key().map(str::to_string),
                    error: e,
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok((items, skipped))
}

/// Load types, normalize, and build the hierarchy for a whole snapshot.
pub fn run_hierarchy(snapshot: &Snapshot, config: &TraceGraphConfig) -> Result<HierarchyRun> {
    let mut metrics = RunMetrics::new();

    let timer = PhaseTimer::start("load_types");
    let types = load_types(snapshot, config)?;
    metrics.load_types_ms = timer.finish();
    metrics.types_loaded = types.len();

    let timer = PhaseTimer::start("normalize");
    let (items, skipped) = normalize_rows(&snapshot.rows, &types, config.normalize.on_error)?;
    metrics.normalize_ms = timer.finish();
    metrics.records_read = snapshot.rows.len();
    metrics.items_normalized = items.len();
    metrics.records_skipped = skipped.len();

    let timer = PhaseTimer::start("build");
    let outcome = HierarchyBuilder::new(config.hierarchy.duplicates)
        .sorted(config.hierarchy.sort_children)
        .build(items)?;
    metrics.build_ms = timer.finish();
    metrics.duplicate_keys = outcome.report.duplicates.len();
    metrics.cycle_breaks = outcome.report.cycle_breaks.len();
    metrics.descendants = outcome.hierarchy.root().count_descendants();

    tracing::info!(
        descendants = metrics.descendants,
        skipped = metrics.records_skipped,
        duplicates = metrics.duplicate_keys,
        "hierarchy built in memory"
    );

    Ok(HierarchyRun {
        types,
        hierarchy: outcome.hierarchy,
        report: outcome.report,
        skipped,
        metrics,
    })
}

/// Normalize the single row carrying `db_key`, if any.
///
/// When a traversal reached the node along several paths the first row wins.
pub fn lookup_item(snapshot: &Snapshot, table: &TypeTable, db_key: &str) -> Result<Option<Item>> {
    snapshot
        .rows_for_key(db_key)
        .next()
        .map(|row| normalize(&row.item, row.parent_key.as_deref(), table))
        .transpose()
}
