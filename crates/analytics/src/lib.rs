//! # AMU Analytics Engine
//!
//! This crate turns recorded treatments into antimicrobial-stewardship
//! indicators: mg/PCU, DDDvet, DCDvet and the HP-CIA share, plus the
//! per-ingredient and per-class breakdowns the dashboard charts.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of the
//!   database or HTTP; callers load the herd and entries and hand them over.
//! - **Stateless Calculation:** `MetricsEngine` holds only its reference
//!   constants. The same inputs always produce the same report, so the preview
//!   path and the stored-data path share one implementation.
//! - **No failure modes:** zero denominators degrade to `0` instead of erroring.
//!
//! ## Public API
//!
//! - `MetricsEngine`: herd metrics, breakdowns, metric-selection variant, trends.
//! - `group_by_active_ingredient` / `group_by_class`: raw-mg groupings.
//! - `AmuMetrics`, `HerdOverview` and the breakdown row types.

pub mod breakdown;
pub mod engine;
pub mod report;
pub mod trends;

pub use breakdown::{
    CHART_TOP_ACTIVES, DASHBOARD_TOP_ACTIVES, UNCLASSIFIED, group_by_active_ingredient,
    group_by_class,
};
pub use engine::MetricsEngine;
pub use report::{
    ActiveIngredientShare, ActiveMetricShare, AmuMetrics, ClassBreakdown, ClassMetricShare,
    HerdOverview, MetricBreakdown, TrendPoint,
};
