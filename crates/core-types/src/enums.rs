use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The metric a chart breakdown is expressed in.
///
/// `MgPerPcu` shares its name with the whole-herd ratio, but when used as a
/// per-entry selector it yields the entry's raw milligrams; the PCU division
/// only happens at herd level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    #[default]
    MgPerPcu,
    Dddvet,
    Dcdvet,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::MgPerPcu => "mg_per_pcu",
            MetricType::Dddvet => "dddvet",
            MetricType::Dcdvet => "dcdvet",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mg_per_pcu" | "mg" => Ok(MetricType::MgPerPcu),
            "dddvet" => Ok(MetricType::Dddvet),
            "dcdvet" => Ok(MetricType::Dcdvet),
            other => Err(CoreError::UnknownMetric(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        assert_eq!("mg_per_pcu".parse::<MetricType>(), Ok(MetricType::MgPerPcu));
        assert_eq!("DDDvet".parse::<MetricType>(), Ok(MetricType::Dddvet));
        assert_eq!(" dcdvet ".parse::<MetricType>(), Ok(MetricType::Dcdvet));
        assert!("pcu".parse::<MetricType>().is_err());
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&MetricType::MgPerPcu).unwrap();
        assert_eq!(json, "\"mg_per_pcu\"");
        let back: MetricType = serde_json::from_str("\"dddvet\"").unwrap();
        assert_eq!(back, MetricType::Dddvet);
    }
}
