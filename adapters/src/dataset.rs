use rust_decimal::Decimal;

use domain::{PriceRow, Period};

/// Price paths in cents, one row per stock, periods 1 to 15.
const DEFAULT_PRICE_PATHS: [(&str, [i64; 15]); 5] = [
    (
        "Aurelia Motors",
        [4820, 4975, 5110, 4890, 5230, 5415, 5360, 5580, 5720, 5490, 5310, 5650, 5840, 6010, 5930],
    ),
    (
        "Borealis Energy",
        [3150, 3080, 2960, 3020, 2870, 2740, 2810, 2690, 2550, 2620, 2480, 2390, 2450, 2310, 2280],
    ),
    (
        "Cobalt Dynamics",
        [1200, 1265, 1190, 1340, 1410, 1375, 1520, 1460, 1610, 1580, 1705, 1650, 1790, 1720, 1860],
    ),
    (
        "Lunaris Ventures",
        [2500, 2440, 2610, 2380, 2290, 2150, 2320, 2060, 1980, 2140, 1890, 1770, 1950, 1820, 1700],
    ),
    (
        "Nimbus Health",
        [7600, 7640, 7590, 7710, 7680, 7750, 7820, 7790, 7860, 7930, 7900, 7980, 8040, 8010, 8090],
    ),
];

/// Fictional dataset used when no database supplies `stock_prices`.
#[must_use]
pub fn default_price_rows() -> Vec<PriceRow> {
    DEFAULT_PRICE_PATHS
        .iter()
        .flat_map(|(name, cents)| {
            cents
                .iter()
                .enumerate()
                .map(move |(idx, &c)| PriceRow::new(*name, idx as Period + 1, Decimal::new(c, 2)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use domain::{MarketData, SimulationConfig};

    use super::*;

    #[test]
    fn default_dataset_covers_every_period_and_the_endowment_stock() {
        let market = MarketData::from_rows(default_price_rows()).unwrap();
        let config = SimulationConfig::default();

        assert_eq!(market.series().len(), 5);
        assert!(market.series().iter().all(|s| s.len() == config.total_periods));
        assert!(market.find(&config.endowment.stock).is_some());
    }
}
