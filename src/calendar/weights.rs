use crate::model::DayType;
use crate::scheduler::SchedError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Poids par type de jour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    pub regular: f64,
    pub friday: f64,
    pub weekend: f64,
    pub holiday: f64,
    pub long_weekend_middle: f64,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            regular: 1.0,
            friday: 1.2,
            weekend: 1.5,
            holiday: 2.0,
            long_weekend_middle: 2.5,
        }
    }
}

impl WeightTable {
    /// Table par défaut surchargée (totalement ou partiellement).
    pub fn with_overrides(overrides: &BTreeMap<DayType, f64>) -> Result<Self, SchedError> {
        let mut table = Self::default();
        for (&day_type, &weight) in overrides {
            table.set(day_type, weight)?;
        }
        Ok(table)
    }

    pub fn weight(&self, day_type: DayType) -> f64 {
        match day_type {
            DayType::Regular => self.regular,
            DayType::Friday => self.friday,
            DayType::Weekend => self.weekend,
            DayType::Holiday => self.holiday,
            DayType::LongWeekendMiddle => self.long_weekend_middle,
        }
    }

    pub fn set(&mut self, day_type: DayType, weight: f64) -> Result<(), SchedError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(SchedError::InvalidWeight { day_type, weight });
        }
        let slot = match day_type {
            DayType::Regular => &mut self.regular,
            DayType::Friday => &mut self.friday,
            DayType::Weekend => &mut self.weekend,
            DayType::Holiday => &mut self.holiday,
            DayType::LongWeekendMiddle => &mut self.long_weekend_middle,
        };
        *slot = weight;
        Ok(())
    }
}
