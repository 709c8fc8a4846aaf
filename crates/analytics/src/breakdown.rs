//! Grouping of treatments by active ingredient and by antimicrobial class.

use crate::engine::{MetricsEngine, percent_of};
use crate::report::{
    ActiveIngredientShare, ActiveMetricShare, ClassBreakdown, ClassMetricShare, MetricBreakdown,
};
use core_types::{AmuEntry, MetricType};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// How many active ingredients the dashboard summary lists.
pub const DASHBOARD_TOP_ACTIVES: usize = 5;
/// How many active ingredients the chart view plots.
pub const CHART_TOP_ACTIVES: usize = 10;
/// Label for treatments recorded without an antimicrobial class.
pub const UNCLASSIFIED: &str = "Unclassified";

struct ActiveBucket {
    name: String,
    total: Decimal,
    is_hp_cia: bool,
}

struct ClassBucket {
    class_name: String,
    total: Decimal,
    hp_cia: Decimal,
}

fn class_label(entry: &AmuEntry) -> &str {
    entry
        .antimicrobial_class
        .as_deref()
        .filter(|class| !class.is_empty())
        .unwrap_or(UNCLASSIFIED)
}

/// Sums `value` per exact `active_name`, keeping first-seen order, then ranks
/// descending. The sort is stable, so ties stay in first-seen order.
fn fold_actives<F>(entries: &[AmuEntry], value: F) -> Vec<ActiveBucket>
where
    F: Fn(&AmuEntry) -> Decimal,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<ActiveBucket> = Vec::new();

    for entry in entries {
        let slot = *index.entry(entry.active_name.as_str()).or_insert_with(|| {
            buckets.push(ActiveBucket {
                name: entry.active_name.clone(),
                total: Decimal::ZERO,
                is_hp_cia: false,
            });
            buckets.len() - 1
        });
        let bucket = &mut buckets[slot];
        bucket.total = bucket.total.saturating_add(value(entry));
        // One HP-CIA product flags the whole ingredient.
        bucket.is_hp_cia |= entry.is_hp_cia;
    }

    buckets.sort_by(|a, b| b.total.cmp(&a.total));
    buckets
}

fn fold_classes<F>(entries: &[AmuEntry], value: F) -> Vec<ClassBucket>
where
    F: Fn(&AmuEntry) -> Decimal,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<ClassBucket> = Vec::new();

    for entry in entries {
        let label = class_label(entry);
        let slot = *index.entry(label).or_insert_with(|| {
            buckets.push(ClassBucket {
                class_name: label.to_string(),
                total: Decimal::ZERO,
                hp_cia: Decimal::ZERO,
            });
            buckets.len() - 1
        });
        let amount = value(entry);
        let bucket = &mut buckets[slot];
        bucket.total = bucket.total.saturating_add(amount);
        if entry.is_hp_cia {
            bucket.hp_cia = bucket.hp_cia.saturating_add(amount);
        }
    }

    buckets.sort_by(|a, b| b.total.cmp(&a.total));
    buckets
}

fn total_of<F>(entries: &[AmuEntry], value: F) -> Decimal
where
    F: Fn(&AmuEntry) -> Decimal,
{
    entries
        .iter()
        .map(value)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Ranks active ingredients by total mg and keeps the first `limit`.
///
/// Shares are against the mg of *all* entries, so truncated lists sum to less
/// than 100.
pub fn group_by_active_ingredient(entries: &[AmuEntry], limit: usize) -> Vec<ActiveIngredientShare> {
    let overall = total_of(entries, AmuEntry::total_mg);
    fold_actives(entries, AmuEntry::total_mg)
        .into_iter()
        .take(limit)
        .map(|bucket| ActiveIngredientShare {
            share_percent: percent_of(bucket.total, overall),
            name: bucket.name,
            total_mg: bucket.total,
            is_hp_cia: bucket.is_hp_cia,
        })
        .collect()
}

/// Ranks every antimicrobial class by total mg, with the HP-CIA mg inside each.
pub fn group_by_class(entries: &[AmuEntry]) -> Vec<ClassBreakdown> {
    let overall = total_of(entries, AmuEntry::total_mg);
    fold_classes(entries, AmuEntry::total_mg)
        .into_iter()
        .map(|bucket| ClassBreakdown {
            share_percent: percent_of(bucket.total, overall),
            class_name: bucket.class_name,
            total_mg: bucket.total,
            hp_cia_mg: bucket.hp_cia,
        })
        .collect()
}

impl MetricsEngine {
    /// The chart breakdown expressed in `metric` instead of raw mg.
    ///
    /// Grouping rules are identical to `group_by_class` and
    /// `group_by_active_ingredient`; only the per-entry scalar changes.
    pub fn breakdown_by_metric(
        &self,
        entries: &[AmuEntry],
        metric: MetricType,
        limit: usize,
    ) -> MetricBreakdown {
        let value = |entry: &AmuEntry| self.entry_value(entry, metric);
        let total = total_of(entries, value);

        let classes = fold_classes(entries, value)
            .into_iter()
            .map(|bucket| ClassMetricShare {
                share_percent: percent_of(bucket.total, total),
                class_name: bucket.class_name,
                value: bucket.total,
                hp_cia_value: bucket.hp_cia,
            })
            .collect();

        let top_actives = fold_actives(entries, value)
            .into_iter()
            .take(limit)
            .map(|bucket| ActiveMetricShare {
                share_percent: percent_of(bucket.total, total),
                name: bucket.name,
                value: bucket.total,
                is_hp_cia: bucket.is_hp_cia,
            })
            .collect();

        MetricBreakdown {
            metric,
            total,
            classes,
            top_actives,
        }
    }
}
