//! Month-by-month stewardship indicators.

use crate::engine::MetricsEngine;
use crate::report::TrendPoint;
use core_types::{AmuEntry, Herd};
use std::collections::BTreeMap;

impl MetricsEngine {
    /// Buckets treatments by the calendar month of their start date and runs the
    /// herd calculation per bucket.
    ///
    /// Undated treatments belong to no month. Months without treatments are
    /// omitted. The result is ascending by month and keeps only the latest
    /// `months` buckets.
    pub fn monthly_trends(&self, herd: &Herd, entries: &[AmuEntry], months: usize) -> Vec<TrendPoint> {
        let mut buckets: BTreeMap<String, Vec<&AmuEntry>> = BTreeMap::new();
        for entry in entries {
            if let Some(start) = entry.start_date {
                buckets
                    .entry(start.format("%Y-%m").to_string())
                    .or_default()
                    .push(entry);
            }
        }

        let skip = buckets.len().saturating_sub(months);
        buckets
            .into_iter()
            .skip(skip)
            .map(|(month, bucket)| {
                let metrics = self.compute_metrics(herd, bucket);
                TrendPoint {
                    month,
                    mg_per_pcu: metrics.mg_per_pcu,
                    dddvet: metrics.dddvet,
                    dcdvet: metrics.dcdvet,
                    hp_cia_share: metrics.hp_cia_share,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::MetricsEngine;
    use crate::engine::tests::{entry, herd};
    use chrono::NaiveDate;
    use core_types::AmuEntry;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn dated(id: i32, year: i32, month: u32, mg: Decimal, hp: bool) -> AmuEntry {
        let mut e = entry(id, "Amoxicillin", Some("Penicillins"), mg, dec!(1), hp);
        e.start_date = NaiveDate::from_ymd_opt(year, month, 15);
        e
    }

    #[test]
    fn buckets_by_start_month_in_order() {
        let engine = MetricsEngine::default();
        let entries = vec![
            dated(1, 2024, 11, dec!(1000), true),
            dated(2, 2024, 2, dec!(500), false),
            dated(3, 2024, 11, dec!(3000), false),
            entry(4, "Undated", None, dec!(99999), dec!(1), true),
        ];
        let trends = engine.monthly_trends(&herd(250), &entries, 12);

        let months: Vec<&str> = trends.iter().map(|t| t.month.as_str()).collect();
        assert_eq!(months, vec!["2024-02", "2024-11"]);
        assert_eq!(trends[0].hp_cia_share, Decimal::ZERO);
        assert_eq!(trends[1].hp_cia_share, dec!(25));
        assert_eq!(trends[1].mg_per_pcu, dec!(4000) / dec!(106250));
    }

    #[test]
    fn keeps_only_latest_months() {
        let engine = MetricsEngine::default();
        let entries: Vec<AmuEntry> = (1..=12)
            .map(|m| dated(m as i32, 2023, m, dec!(100), false))
            .chain(std::iter::once(dated(13, 2024, 1, dec!(100), false)))
            .collect();
        let trends = engine.monthly_trends(&herd(250), &entries, 12);

        assert_eq!(trends.len(), 12);
        assert_eq!(trends.first().unwrap().month, "2023-02");
        assert_eq!(trends.last().unwrap().month, "2024-01");
    }
}
