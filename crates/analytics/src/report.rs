use core_types::{Herd, MetricType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whole-herd stewardship indicators for a set of treatments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmuMetrics {
    pub mg_per_pcu: Decimal,
    pub dddvet: Decimal,
    pub dcdvet: Decimal,
    /// Percentage (0-100) of total mg that came from HP-CIA products.
    pub hp_cia_share: Decimal,
    pub total_mg: Decimal,
}

impl AmuMetrics {
    pub fn zero() -> Self {
        Self {
            mg_per_pcu: Decimal::ZERO,
            dddvet: Decimal::ZERO,
            dcdvet: Decimal::ZERO,
            hp_cia_share: Decimal::ZERO,
            total_mg: Decimal::ZERO,
        }
    }
}

impl Default for AmuMetrics {
    fn default() -> Self {
        Self::zero()
    }
}

/// One active ingredient's contribution, in raw mg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveIngredientShare {
    pub name: String,
    pub total_mg: Decimal,
    /// Set when any treatment with this ingredient was an HP-CIA product.
    pub is_hp_cia: bool,
    pub share_percent: Decimal,
}

/// One antimicrobial class's contribution, in raw mg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassBreakdown {
    pub class_name: String,
    pub total_mg: Decimal,
    pub share_percent: Decimal,
    /// Sum of mg from HP-CIA treatments within the class.
    pub hp_cia_mg: Decimal,
}

/// Active-ingredient row of a breakdown in a selectable metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveMetricShare {
    pub name: String,
    pub value: Decimal,
    pub is_hp_cia: bool,
    pub share_percent: Decimal,
}

/// Class row of a breakdown in a selectable metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetricShare {
    pub class_name: String,
    pub value: Decimal,
    pub share_percent: Decimal,
    pub hp_cia_value: Decimal,
}

/// Chart data for one `MetricType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBreakdown {
    pub metric: MetricType,
    /// Sum of the per-entry values over every treatment.
    pub total: Decimal,
    pub classes: Vec<ClassMetricShare>,
    pub top_actives: Vec<ActiveMetricShare>,
}

/// Herd indicators for a single calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM`
    pub month: String,
    pub mg_per_pcu: Decimal,
    pub dddvet: Decimal,
    pub dcdvet: Decimal,
    pub hp_cia_share: Decimal,
}

/// Everything the dashboard home screen renders for one herd.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerdOverview {
    pub herd: Herd,
    pub metrics: AmuMetrics,
    pub trends: Vec<TrendPoint>,
    pub top_actives: Vec<ActiveIngredientShare>,
    pub class_breakdown: Vec<ClassBreakdown>,
}
