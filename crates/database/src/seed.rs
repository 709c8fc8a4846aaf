//! Demo data for a fresh installation: one dairy herd, three treatments and a
//! small medication catalog.

use crate::{DbError, DbRepository};
use chrono::NaiveDate;
use core_types::{NewAmuEntry, NewMedication};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const DEMO_FARM_NAME: &str = "Green Valley Dairy Farm";
pub const DEMO_ADULT_COUNT: i32 = 250;

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The treatments recorded against the demo herd.
pub fn demo_entries() -> Vec<NewAmuEntry> {
    vec![
        NewAmuEntry {
            product_name: "Baytril 2.5%".to_string(),
            active_name: "Enrofloxacin".to_string(),
            antimicrobial_class: Some("Fluoroquinolones".to_string()),
            is_hp_cia: true,
            species: "dairy_cattle".to_string(),
            age_class: "adult".to_string(),
            route: "injectable".to_string(),
            pack_concentration_mg_per_unit: dec!(25),
            units_administered: dec!(180),
            duration_days: Some(1),
            animal_weight_kg: Some(dec!(425)),
            start_date: date(2024, 11, 1),
            end_date: date(2024, 11, 1),
            notes: Some("Respiratory infection treatment".to_string()),
        },
        NewAmuEntry {
            product_name: "Amoxinsol".to_string(),
            active_name: "Amoxicillin".to_string(),
            antimicrobial_class: Some("Penicillins".to_string()),
            is_hp_cia: false,
            species: "dairy_cattle".to_string(),
            age_class: "adult".to_string(),
            route: "intramammary".to_string(),
            pack_concentration_mg_per_unit: dec!(200),
            units_administered: dec!(400),
            duration_days: Some(3),
            animal_weight_kg: None,
            start_date: date(2024, 11, 5),
            end_date: date(2024, 11, 7),
            notes: Some("Mastitis treatment protocol".to_string()),
        },
        NewAmuEntry {
            product_name: "Excenel RTU".to_string(),
            active_name: "Ceftiofur".to_string(),
            antimicrobial_class: Some("Cephalosporins".to_string()),
            is_hp_cia: true,
            species: "dairy_cattle".to_string(),
            age_class: "adult".to_string(),
            route: "injectable".to_string(),
            pack_concentration_mg_per_unit: dec!(50),
            units_administered: dec!(59),
            duration_days: Some(1),
            animal_weight_kg: Some(dec!(425)),
            start_date: date(2024, 11, 10),
            end_date: None,
            notes: Some("Post-surgical prophylaxis".to_string()),
        },
    ]
}

/// The starting medication catalog.
pub fn demo_medications() -> Vec<NewMedication> {
    let medication = |product: &str, active: &str, class: &str, hp: bool, conc: Decimal, route: &str| {
        NewMedication {
            product_name: product.to_string(),
            active_name: active.to_string(),
            antimicrobial_class: Some(class.to_string()),
            is_hp_cia: hp,
            pack_concentration_mg_per_unit: conc,
            default_route: route.to_string(),
        }
    };
    vec![
        medication("Baytril 2.5%", "Enrofloxacin", "Fluoroquinolones", true, dec!(25), "injectable"),
        medication("Amoxinsol", "Amoxicillin", "Penicillins", false, dec!(200), "intramammary"),
        medication("Excenel RTU", "Ceftiofur", "Cephalosporins", true, dec!(50), "injectable"),
        medication(
            "Pen & Strep",
            "Penicillin & Streptomycin",
            "Penicillins",
            false,
            dec!(250),
            "injectable",
        ),
    ]
}

impl DbRepository {
    /// Wipes herds, treatments and the catalog, then loads the demo data.
    ///
    /// Runs in one transaction; returns the id of the demo herd.
    pub async fn seed_demo_data(&self) -> Result<i32, DbError> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("TRUNCATE amu_entries, medications, herds RESTART IDENTITY CASCADE")
            .execute(&mut *tx)
            .await?;

        let herd_id: i32 = sqlx::query_scalar(
            "INSERT INTO herds (farm_name, country, species, adult_count) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(DEMO_FARM_NAME)
        .bind("UK")
        .bind("dairy_cattle")
        .bind(DEMO_ADULT_COUNT)
        .fetch_one(&mut *tx)
        .await?;

        for entry in demo_entries() {
            sqlx::query(
                r#"
                INSERT INTO amu_entries (
                    herd_id, product_name, active_name, antimicrobial_class, is_hp_cia, species,
                    age_class, route, pack_concentration_mg_per_unit, units_administered,
                    duration_days, animal_weight_kg, start_date, end_date, notes
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                "#,
            )
            .bind(herd_id)
            .bind(&entry.product_name)
            .bind(&entry.active_name)
            .bind(&entry.antimicrobial_class)
            .bind(entry.is_hp_cia)
            .bind(&entry.species)
            .bind(&entry.age_class)
            .bind(&entry.route)
            .bind(entry.pack_concentration_mg_per_unit)
            .bind(entry.units_administered)
            .bind(entry.duration_days)
            .bind(entry.animal_weight_kg)
            .bind(entry.start_date)
            .bind(entry.end_date)
            .bind(&entry.notes)
            .execute(&mut *tx)
            .await?;
        }

        for medication in demo_medications() {
            sqlx::query(
                r#"
                INSERT INTO medications (
                    product_name, active_name, antimicrobial_class, is_hp_cia,
                    pack_concentration_mg_per_unit, default_route
                ) VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&medication.product_name)
            .bind(&medication.active_name)
            .bind(&medication.antimicrobial_class)
            .bind(medication.is_hp_cia)
            .bind(medication.pack_concentration_mg_per_unit)
            .bind(&medication.default_route)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(herd_id, "Seeded demo herd, treatments and medications.");
        Ok(herd_id)
    }
}
