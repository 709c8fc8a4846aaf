use crate::DbError;
use core_types::{AmuEntry, Herd, Medication, MedicationFilter, NewAmuEntry, NewMedication};
use sqlx::postgres::PgPool;

const ENTRY_COLUMNS: &str = "id, herd_id, product_name, active_name, antimicrobial_class, is_hp_cia, \
     species, age_class, route, pack_concentration_mg_per_unit, units_administered, \
     duration_days, animal_weight_kg, start_date, end_date, notes";

const MEDICATION_COLUMNS: &str = "id, product_name, active_name, antimicrobial_class, is_hp_cia, \
     pack_concentration_mg_per_unit, default_route";

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

fn not_found_on_missing_row(e: sqlx::Error) -> DbError {
    if let sqlx::Error::RowNotFound = e {
        DbError::NotFound
    } else {
        e.into()
    }
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ==========================================================================
    // Herds
    // ==========================================================================

    pub async fn get_herd(&self, herd_id: i32) -> Result<Herd, DbError> {
        sqlx::query_as::<_, Herd>(
            "SELECT id, farm_name, country, species, adult_count FROM herds WHERE id = $1",
        )
        .bind(herd_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_on_missing_row)
    }

    // ==========================================================================
    // Treatment entries
    // ==========================================================================

    /// Fetches the treatments recorded against one herd, most recent first.
    pub async fn get_entries_for_herd(&self, herd_id: i32) -> Result<Vec<AmuEntry>, DbError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM amu_entries WHERE herd_id = $1 \
             ORDER BY start_date DESC NULLS LAST, id DESC"
        );
        let entries = sqlx::query_as::<_, AmuEntry>(&sql)
            .bind(herd_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    /// Fetches every treatment regardless of herd, most recent first.
    pub async fn get_all_entries(&self) -> Result<Vec<AmuEntry>, DbError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM amu_entries ORDER BY start_date DESC NULLS LAST, id DESC"
        );
        let entries = sqlx::query_as::<_, AmuEntry>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    /// Inserts a treatment under `herd_id` and returns the stored row.
    pub async fn create_entry(&self, herd_id: i32, entry: &NewAmuEntry) -> Result<AmuEntry, DbError> {
        let sql = format!(
            r#"
            INSERT INTO amu_entries (
                herd_id, product_name, active_name, antimicrobial_class, is_hp_cia, species,
                age_class, route, pack_concentration_mg_per_unit, units_administered,
                duration_days, animal_weight_kg, start_date, end_date, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {ENTRY_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, AmuEntry>(&sql)
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
            .fetch_one(&self.pool)
            .await?;
        tracing::debug!(entry_id = created.id, herd_id, "Created AMU entry.");
        Ok(created)
    }

    /// Replaces every editable field of a treatment recorded against `herd_id`.
    /// A treatment belonging to another herd is reported as not found.
    pub async fn update_entry(
        &self,
        herd_id: i32,
        entry_id: i32,
        entry: &NewAmuEntry,
    ) -> Result<AmuEntry, DbError> {
        let sql = format!(
            r#"
            UPDATE amu_entries SET
                product_name = $1, active_name = $2, antimicrobial_class = $3, is_hp_cia = $4,
                species = $5, age_class = $6, route = $7, pack_concentration_mg_per_unit = $8,
                units_administered = $9, duration_days = $10, animal_weight_kg = $11,
                start_date = $12, end_date = $13, notes = $14
            WHERE id = $15 AND herd_id = $16
            RETURNING {ENTRY_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, AmuEntry>(&sql)
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
            .bind(entry_id)
            .bind(herd_id)
            .fetch_optional(&self.pool)
            .await?;
        updated.ok_or(DbError::NotFound)
    }

    pub async fn delete_entry(&self, herd_id: i32, entry_id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM amu_entries WHERE id = $1 AND herd_id = $2")
            .bind(entry_id)
            .bind(herd_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    // ==========================================================================
    // Medication catalog
    // ==========================================================================

    /// Lists catalog products ordered by name, narrowed by the optional filter.
    pub async fn get_medications(&self, filter: &MedicationFilter) -> Result<Vec<Medication>, DbError> {
        let sql = format!(
            r#"
            SELECT {MEDICATION_COLUMNS} FROM medications
            WHERE ($1::TEXT IS NULL OR product_name ILIKE $1 OR active_name ILIKE $1)
              AND ($2::TEXT IS NULL OR antimicrobial_class = $2)
            ORDER BY product_name, id
            "#
        );
        let medications = sqlx::query_as::<_, Medication>(&sql)
            .bind(filter.search_pattern())
            .bind(filter.class())
            .fetch_all(&self.pool)
            .await?;
        Ok(medications)
    }

    pub async fn create_medication(&self, medication: &NewMedication) -> Result<Medication, DbError> {
        let sql = format!(
            r#"
            INSERT INTO medications (
                product_name, active_name, antimicrobial_class, is_hp_cia,
                pack_concentration_mg_per_unit, default_route
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MEDICATION_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Medication>(&sql)
            .bind(&medication.product_name)
            .bind(&medication.active_name)
            .bind(&medication.antimicrobial_class)
            .bind(medication.is_hp_cia)
            .bind(medication.pack_concentration_mg_per_unit)
            .bind(&medication.default_route)
            .fetch_one(&self.pool)
            .await?;
        tracing::debug!(medication_id = created.id, "Created medication.");
        Ok(created)
    }

    pub async fn update_medication(
        &self,
        medication_id: i32,
        medication: &NewMedication,
    ) -> Result<Medication, DbError> {
        let sql = format!(
            r#"
            UPDATE medications SET
                product_name = $1, active_name = $2, antimicrobial_class = $3,
                is_hp_cia = $4, pack_concentration_mg_per_unit = $5, default_route = $6
            WHERE id = $7
            RETURNING {MEDICATION_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Medication>(&sql)
            .bind(&medication.product_name)
            .bind(&medication.active_name)
            .bind(&medication.antimicrobial_class)
            .bind(medication.is_hp_cia)
            .bind(medication.pack_concentration_mg_per_unit)
            .bind(&medication.default_route)
            .bind(medication_id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_on_missing_row)
    }

    pub async fn delete_medication(&self, medication_id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM medications WHERE id = $1")
            .bind(medication_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}
