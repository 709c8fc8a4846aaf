use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// Upper bound on a product's strength, in mg per unit.
pub const MAX_CONCENTRATION_MG_PER_UNIT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Upper bound on the units given in one treatment.
pub const MAX_UNITS_ADMINISTERED: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Longest accepted treatment course, in days.
pub const MAX_DURATION_DAYS: i32 = 365;
/// Recorded animal weights must fall within this range, in kg.
pub const MIN_ANIMAL_WEIGHT_KG: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
pub const MAX_ANIMAL_WEIGHT_KG: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// A managed livestock group. `adult_count` drives the PCU denominator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Herd {
    pub id: i32,
    pub farm_name: String,
    pub country: String,
    pub species: String,
    pub adult_count: i32,
}

/// A single recorded antimicrobial treatment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AmuEntry {
    pub id: i32,
    pub herd_id: Option<i32>,
    pub product_name: String,
    pub active_name: String,
    pub antimicrobial_class: Option<String>,
    pub is_hp_cia: bool,
    pub species: String,
    pub age_class: String,
    pub route: String,
    pub pack_concentration_mg_per_unit: Decimal,
    pub units_administered: Decimal,
    pub duration_days: Option<i32>,
    pub animal_weight_kg: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl AmuEntry {
    /// Total active substance administered: concentration times units.
    /// Saturates at `Decimal::MAX` for stored rows outside the accepted ranges.
    pub fn total_mg(&self) -> Decimal {
        self.pack_concentration_mg_per_unit
            .saturating_mul(self.units_administered)
    }
}

/// The body of a create or update request for a treatment entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAmuEntry {
    pub product_name: String,
    pub active_name: String,
    #[serde(default)]
    pub antimicrobial_class: Option<String>,
    #[serde(default)]
    pub is_hp_cia: bool,
    pub species: String,
    pub age_class: String,
    pub route: String,
    pub pack_concentration_mg_per_unit: Decimal,
    pub units_administered: Decimal,
    #[serde(default)]
    pub duration_days: Option<i32>,
    #[serde(default)]
    pub animal_weight_kg: Option<Decimal>,
    #[serde(default, deserialize_with = "blank_date_as_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_date_as_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewAmuEntry {
    /// Rejects payloads the metrics engine would otherwise fold in silently.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("product_name", &self.product_name)?;
        require_text("active_name", &self.active_name)?;
        require_non_negative(
            "pack_concentration_mg_per_unit",
            self.pack_concentration_mg_per_unit,
        )?;
        require_at_most(
            "pack_concentration_mg_per_unit",
            self.pack_concentration_mg_per_unit,
            MAX_CONCENTRATION_MG_PER_UNIT,
        )?;
        require_non_negative("units_administered", self.units_administered)?;
        require_at_most(
            "units_administered",
            self.units_administered,
            MAX_UNITS_ADMINISTERED,
        )?;

        if let Some(days) = self.duration_days {
            if days <= 0 {
                return Err(invalid("duration_days", "must be at least 1 day"));
            }
            if days > MAX_DURATION_DAYS {
                return Err(invalid(
                    "duration_days",
                    &format!("must be at most {MAX_DURATION_DAYS} days"),
                ));
            }
        }
        if let Some(weight) = self.animal_weight_kg {
            if weight < MIN_ANIMAL_WEIGHT_KG || weight > MAX_ANIMAL_WEIGHT_KG {
                return Err(invalid(
                    "animal_weight_kg",
                    &format!("must be between {MIN_ANIMAL_WEIGHT_KG} and {MAX_ANIMAL_WEIGHT_KG} kg"),
                ));
            }
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(invalid("end_date", "must not be before start_date"));
            }
        }
        Ok(())
    }

    /// Materializes the payload as a stored entry, e.g. for preview calculations
    /// where nothing is written to the database.
    pub fn into_entry(self, id: i32, herd_id: Option<i32>) -> AmuEntry {
        AmuEntry {
            id,
            herd_id,
            product_name: self.product_name,
            active_name: self.active_name,
            antimicrobial_class: self.antimicrobial_class,
            is_hp_cia: self.is_hp_cia,
            species: self.species,
            age_class: self.age_class,
            route: self.route,
            pack_concentration_mg_per_unit: self.pack_concentration_mg_per_unit,
            units_administered: self.units_administered,
            duration_days: self.duration_days,
            animal_weight_kg: self.animal_weight_kg,
            start_date: self.start_date,
            end_date: self.end_date,
            notes: self.notes,
        }
    }
}

/// A catalog product that treatments can be recorded against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Medication {
    pub id: i32,
    pub product_name: String,
    pub active_name: String,
    pub antimicrobial_class: Option<String>,
    pub is_hp_cia: bool,
    pub pack_concentration_mg_per_unit: Decimal,
    pub default_route: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMedication {
    pub product_name: String,
    pub active_name: String,
    #[serde(default)]
    pub antimicrobial_class: Option<String>,
    #[serde(default)]
    pub is_hp_cia: bool,
    pub pack_concentration_mg_per_unit: Decimal,
    #[serde(default = "default_route")]
    pub default_route: String,
}

fn default_route() -> String {
    "injectable".to_string()
}

impl NewMedication {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("product_name", &self.product_name)?;
        require_text("active_name", &self.active_name)?;
        require_non_negative(
            "pack_concentration_mg_per_unit",
            self.pack_concentration_mg_per_unit,
        )?;
        require_at_most(
            "pack_concentration_mg_per_unit",
            self.pack_concentration_mg_per_unit,
            MAX_CONCENTRATION_MG_PER_UNIT,
        )
    }
}

/// Catalog listing filter: free-text search over product and active names,
/// plus an exact antimicrobial class.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MedicationFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, rename = "class")]
    pub class_name: Option<String>,
}

impl MedicationFilter {
    /// An `ILIKE` pattern for the search term, if one was given.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| {
                let escaped = term
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                format!("%{escaped}%")
            })
    }

    /// The class to match, ignoring blank values and the UI's `all` option.
    pub fn class(&self) -> Option<&str> {
        self.class_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }
}

fn invalid(field: &str, reason: &str) -> CoreError {
    CoreError::InvalidInput(field.to_string(), reason.to_string())
}

fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be blank"));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: Decimal) -> Result<(), CoreError> {
    if value < Decimal::ZERO {
        return Err(invalid(field, "must not be negative"));
    }
    Ok(())
}

fn require_at_most(field: &str, value: Decimal, max: Decimal) -> Result<(), CoreError> {
    if value > max {
        return Err(invalid(field, &format!("must be at most {max}")));
    }
    Ok(())
}

/// Form submissions send `""` for an unset date.
fn blank_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
