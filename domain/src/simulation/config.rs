use rust_decimal::Decimal;
use serde::Serialize;

use super::Group;
use crate::Period;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SimulationPhase {
    AwaitingSurvey,
    InProgress { period: Period },
    Completed,
}

/// Holding granted to treatment participants before their first visible
/// period, bought at the price of `price_period` rather than the current one.
#[derive(Clone, Debug)]
pub struct EndowmentConfig {
    pub stock: String,
    pub quantity: Decimal,
    pub price_period: Period,
}

#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub total_periods: Period,
    /// Periods before this one are played automatically at enrollment.
    pub first_visible_period: Period,
    pub control_starting_cash: Decimal,
    pub treatment_starting_cash: Decimal,
    pub endowment: EndowmentConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_periods: 15,
            first_visible_period: 6,
            control_starting_cash: Decimal::new(1000, 0),
            treatment_starting_cash: Decimal::new(500, 0),
            endowment: EndowmentConfig {
                stock: "Lunaris Ventures".to_string(),
                quantity: Decimal::new(10, 0),
                price_period: 1,
            },
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn starting_cash(
        &self,
        group: Group,
    ) -> Decimal {
        match group {
            Group::Control => self.control_starting_cash,
            Group::Treatment => self.treatment_starting_cash,
        }
    }
}
