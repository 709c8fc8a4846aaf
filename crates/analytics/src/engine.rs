use crate::breakdown::{DASHBOARD_TOP_ACTIVES, group_by_active_ingredient, group_by_class};
use crate::report::{AmuMetrics, HerdOverview};
use configuration::MetricsConfig;
use core_types::{AmuEntry, Herd, MetricType};
use rust_decimal::Decimal;

/// A stateless calculator for deriving stewardship metrics from treatment records.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    params: MetricsConfig,
}

impl MetricsEngine {
    /// Creates an engine with the given reference weight and dose factors.
    pub fn new(params: MetricsConfig) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MetricsConfig {
        &self.params
    }

    /// Population Correction Unit: the herd's adult count at the standard weight.
    pub fn pcu(&self, herd: &Herd) -> Decimal {
        Decimal::from(herd.adult_count).saturating_mul(self.params.standard_weight_kg)
    }

    /// The treated animal's weight, or the standard weight when it was not recorded.
    /// A recorded weight of zero counts as not recorded.
    pub fn entry_weight(&self, entry: &AmuEntry) -> Decimal {
        match entry.animal_weight_kg {
            Some(weight) if !weight.is_zero() => weight,
            _ => self.params.standard_weight_kg,
        }
    }

    /// Treatment length in days; absent or zero means a single day.
    pub fn entry_duration(entry: &AmuEntry) -> Decimal {
        match entry.duration_days {
            Some(days) if days != 0 => Decimal::from(days),
            _ => Decimal::ONE,
        }
    }

    /// The entry's DDDvet contribution: mg/kg scaled by days and the daily-dose factor.
    pub fn entry_dddvet(&self, entry: &AmuEntry) -> Decimal {
        ratio(entry.total_mg(), self.entry_weight(entry))
            .saturating_mul(Self::entry_duration(entry))
            .saturating_mul(self.params.ddd_factor)
    }

    /// The entry's DCDvet contribution: mg/kg scaled by the course-dose factor.
    pub fn entry_dcdvet(&self, entry: &AmuEntry) -> Decimal {
        ratio(entry.total_mg(), self.entry_weight(entry)).saturating_mul(self.params.dcd_factor)
    }

    /// The per-entry scalar a chart plots for `metric`.
    ///
    /// For `MetricType::MgPerPcu` this is the entry's raw mg; dividing by PCU only
    /// makes sense for the herd total.
    pub fn entry_value(&self, entry: &AmuEntry, metric: MetricType) -> Decimal {
        match metric {
            MetricType::MgPerPcu => entry.total_mg(),
            MetricType::Dddvet => self.entry_dddvet(entry),
            MetricType::Dcdvet => self.entry_dcdvet(entry),
        }
    }

    /// The main entry point: folds every entry into the herd-level indicators.
    ///
    /// Entry order does not matter. An empty herd or an empty treatment list
    /// yields zeros rather than an error. Sums saturate at `Decimal::MAX`.
    pub fn compute_metrics<'a, I>(&self, herd: &Herd, entries: I) -> AmuMetrics
    where
        I: IntoIterator<Item = &'a AmuEntry>,
    {
        let mut total_mg = Decimal::ZERO;
        let mut hp_cia_mg = Decimal::ZERO;
        let mut dddvet = Decimal::ZERO;
        let mut dcdvet = Decimal::ZERO;

        for entry in entries {
            let entry_mg = entry.total_mg();
            total_mg = total_mg.saturating_add(entry_mg);
            if entry.is_hp_cia {
                hp_cia_mg = hp_cia_mg.saturating_add(entry_mg);
            }
            dddvet = dddvet.saturating_add(self.entry_dddvet(entry));
            dcdvet = dcdvet.saturating_add(self.entry_dcdvet(entry));
        }

        let pcu = self.pcu(herd);
        let mg_per_pcu = if pcu > Decimal::ZERO {
            ratio(total_mg, pcu)
        } else {
            Decimal::ZERO
        };
        let hp_cia_share = percent_of(hp_cia_mg, total_mg);

        AmuMetrics {
            mg_per_pcu,
            dddvet,
            dcdvet,
            hp_cia_share,
            total_mg,
        }
    }

    /// Assembles the dashboard payload: herd metrics, monthly trends, the top
    /// five active ingredients and the full class breakdown.
    pub fn herd_overview(&self, herd: &Herd, entries: &[AmuEntry]) -> HerdOverview {
        let metrics = self.compute_metrics(herd, entries);
        let trends = self.monthly_trends(herd, entries, self.params.trend_months);
        tracing::debug!(
            herd_id = herd.id,
            entries = entries.len(),
            total_mg = %metrics.total_mg,
            "Computed herd overview."
        );

        HerdOverview {
            herd: herd.clone(),
            metrics,
            trends,
            top_actives: group_by_active_ingredient(entries, DASHBOARD_TOP_ACTIVES),
            class_breakdown: group_by_class(entries),
        }
    }
}

/// `numerator / denominator`, or zero when the denominator is zero.
/// A quotient too large for `Decimal` saturates at `MAX`/`MIN`.
pub(crate) fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or_else(|| {
        if numerator.is_sign_negative() == denominator.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

/// `part` as a percentage of `whole`; zero unless `whole` is positive.
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole > Decimal::ZERO {
        ratio(part, whole).saturating_mul(Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    pub(crate) fn herd(adult_count: i32) -> Herd {
        Herd {
            id: 1,
            farm_name: "Green Valley Dairy Farm".to_string(),
            country: "UK".to_string(),
            species: "dairy_cattle".to_string(),
            adult_count,
        }
    }

    pub(crate) fn entry(
        id: i32,
        active: &str,
        class: Option<&str>,
        concentration: Decimal,
        units: Decimal,
        is_hp_cia: bool,
    ) -> AmuEntry {
        AmuEntry {
            id,
            herd_id: Some(1),
            product_name: format!("Product {id}"),
            active_name: active.to_string(),
            antimicrobial_class: class.map(str::to_string),
            is_hp_cia,
            species: "dairy_cattle".to_string(),
            age_class: "adult".to_string(),
            route: "injectable".to_string(),
            pack_concentration_mg_per_unit: concentration,
            units_administered: units,
            duration_days: None,
            animal_weight_kg: None,
            start_date: None,
            end_date: None,
            notes: None,
        }
    }

    pub(crate) fn approx(actual: Decimal, expected: Decimal) -> bool {
        (actual - expected).abs() < dec!(0.0001)
    }

    /// The three treatments the demo farm is seeded with.
    pub(crate) fn demo_entries() -> Vec<AmuEntry> {
        let mut enro = entry(
            1,
            "Enrofloxacin",
            Some("Fluoroquinolones"),
            dec!(25),
            dec!(180),
            true,
        );
        enro.duration_days = Some(1);
        enro.animal_weight_kg = Some(dec!(425));
        enro.start_date = NaiveDate::from_ymd_opt(2024, 11, 1);

        let mut amox = entry(2, "Amoxicillin", Some("Penicillins"), dec!(200), dec!(400), false);
        amox.duration_days = Some(3);
        amox.start_date = NaiveDate::from_ymd_opt(2024, 11, 5);

        let mut ceft = entry(
            3,
            "Ceftiofur",
            Some("Cephalosporins"),
            dec!(50),
            dec!(59),
            true,
        );
        ceft.duration_days = Some(1);
        ceft.animal_weight_kg = Some(dec!(425));
        ceft.start_date = NaiveDate::from_ymd_opt(2024, 11, 10);

        vec![enro, amox, ceft]
    }

    #[test]
    fn single_hp_cia_treatment() {
        let engine = MetricsEngine::default();
        let mut e = entry(1, "Enrofloxacin", Some("Fluoroquinolones"), dec!(25), dec!(180), true);
        e.animal_weight_kg = Some(dec!(425));
        e.duration_days = Some(1);

        let metrics = engine.compute_metrics(&herd(250), &[e]);

        assert_eq!(metrics.total_mg, dec!(4500));
        assert_eq!(engine.pcu(&herd(250)), dec!(106250));
        assert!(approx(metrics.mg_per_pcu, dec!(0.04235)));
        assert!(approx(metrics.dddvet, dec!(1.0588)));
        assert!(approx(metrics.dcdvet, dec!(1.5882)));
        assert_eq!(metrics.hp_cia_share, dec!(100));
    }

    #[test]
    fn empty_entries_yield_zeros() {
        let engine = MetricsEngine::default();
        let entries: Vec<AmuEntry> = Vec::new();
        let metrics = engine.compute_metrics(&herd(250), &entries);
        assert_eq!(metrics, AmuMetrics::zero());
    }

    #[test]
    fn zero_adults_means_zero_mg_per_pcu() {
        let engine = MetricsEngine::default();
        let metrics = engine.compute_metrics(&herd(0), &demo_entries());
        assert_eq!(metrics.mg_per_pcu, Decimal::ZERO);
        assert!(metrics.total_mg > Decimal::ZERO);
    }

    #[test]
    fn total_mg_is_exact_sum_and_share_is_bounded() {
        let engine = MetricsEngine::default();
        let entries = demo_entries();
        let metrics = engine.compute_metrics(&herd(250), &entries);

        // 25*180 + 200*400 + 50*59
        assert_eq!(metrics.total_mg, dec!(87450));
        let expected_share = dec!(7450) / dec!(87450) * dec!(100);
        assert_eq!(metrics.hp_cia_share, expected_share);
        assert!(metrics.hp_cia_share >= Decimal::ZERO);
        assert!(metrics.hp_cia_share <= dec!(100));
    }

    #[test]
    fn missing_weight_and_duration_use_fallbacks() {
        let engine = MetricsEngine::default();
        let mut e = entry(1, "Amoxicillin", Some("Penicillins"), dec!(200), dec!(400), false);
        e.duration_days = Some(3);
        let metrics = engine.compute_metrics(&herd(250), std::slice::from_ref(&e));

        // (80000 / 425) * 3 * 0.1 and (80000 / 425) * 0.15
        assert!(approx(metrics.dddvet, dec!(56.4706)));
        assert!(approx(metrics.dcdvet, dec!(28.2353)));

        // Zero is treated as "not recorded".
        e.duration_days = Some(0);
        e.animal_weight_kg = Some(Decimal::ZERO);
        assert_eq!(engine.entry_weight(&e), dec!(425));
        assert_eq!(MetricsEngine::entry_duration(&e), Decimal::ONE);
    }

    #[test]
    fn configured_constants_are_used() {
        let engine = MetricsEngine::new(MetricsConfig {
            standard_weight_kg: dec!(500),
            ddd_factor: dec!(1),
            dcd_factor: dec!(2),
            trend_months: 12,
        });
        let e = entry(1, "Amoxicillin", None, dec!(10), dec!(50), false);
        let metrics = engine.compute_metrics(&herd(2), &[e]);

        assert_eq!(metrics.mg_per_pcu, dec!(0.5));
        assert_eq!(metrics.dddvet, Decimal::ONE);
        assert_eq!(metrics.dcdvet, dec!(2));
    }

    #[test]
    fn entry_value_reuses_raw_mg_for_mg_per_pcu() {
        let engine = MetricsEngine::default();
        let e = entry(1, "Amoxicillin", None, dec!(200), dec!(400), false);
        assert_eq!(engine.entry_value(&e, MetricType::MgPerPcu), dec!(80000));
        assert_eq!(engine.entry_value(&e, MetricType::Dddvet), engine.entry_dddvet(&e));
        assert_eq!(engine.entry_value(&e, MetricType::Dcdvet), engine.entry_dcdvet(&e));
    }

    #[test]
    fn oversized_stored_values_saturate_without_panicking() {
        let engine = MetricsEngine::default();
        let huge = Decimal::from(1_000_000_000_000_000_i64);
        let entries = vec![
            entry(1, "Enrofloxacin", Some("Fluoroquinolones"), huge, huge, true),
            entry(2, "Enrofloxacin", Some("Fluoroquinolones"), huge, huge, true),
        ];
        let metrics = engine.compute_metrics(&herd(250), &entries);

        assert_eq!(metrics.total_mg, Decimal::MAX);
        assert_eq!(metrics.hp_cia_share, dec!(100));
        assert!(metrics.dddvet > Decimal::ZERO);

        let overview = engine.herd_overview(&herd(250), &entries);
        assert_eq!(overview.top_actives[0].total_mg, Decimal::MAX);
    }

    #[test]
    fn tiny_weight_saturates_instead_of_dropping_to_zero() {
        let engine = MetricsEngine::default();
        let mut e = entry(1, "Amoxicillin", None, dec!(1000000), dec!(1000000), false);
        e.animal_weight_kg = Some(Decimal::new(1, 22));
        let metrics = engine.compute_metrics(&herd(250), &[e]);

        assert!(metrics.dcdvet > dec!(1000000000000));
        assert!(metrics.dddvet > dec!(1000000000000));
    }

    #[test]
    fn ratio_is_zero_only_for_zero_denominator() {
        assert_eq!(ratio(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(ratio(dec!(10), dec!(4)), dec!(2.5));
        assert_eq!(ratio(Decimal::MAX, dec!(0.5)), Decimal::MAX);
        assert_eq!(ratio(Decimal::MIN, dec!(0.5)), Decimal::MIN);
    }

    #[test]
    fn compute_is_idempotent() {
        let engine = MetricsEngine::default();
        let entries = demo_entries();
        let first = engine.compute_metrics(&herd(250), &entries);
        let second = engine.compute_metrics(&herd(250), &entries);
        assert_eq!(first, second);
    }

    #[test]
    fn overview_limits_top_actives_to_five() {
        let engine = MetricsEngine::default();
        let entries: Vec<AmuEntry> = (1..=7)
            .map(|i| entry(i, &format!("Active {i}"), None, Decimal::from(i), dec!(10), false))
            .collect();
        let overview = engine.herd_overview(&herd(250), &entries);

        assert_eq!(overview.top_actives.len(), 5);
        assert_eq!(overview.top_actives[0].name, "Active 7");
        assert_eq!(overview.class_breakdown.len(), 1);
        assert!(overview.trends.is_empty());
    }

    #[test]
    fn overview_serializes_with_wire_field_names() {
        let engine = MetricsEngine::default();
        let overview = engine.herd_overview(&herd(250), &demo_entries());
        let json = serde_json::to_value(&overview).unwrap();

        assert_eq!(json["herd"]["adult_count"], 250);
        assert_eq!(json["metrics"]["total_mg"].as_f64(), Some(87450.0));
        assert!(json["top_actives"][0]["share_percent"].is_number());
        assert!(json["class_breakdown"][0]["hp_cia_mg"].is_number());
        assert_eq!(json["trends"][0]["month"], "2024-11");
    }
}
