use rust_decimal::Decimal;
use serde::Serialize;

/// A position in one stock. A holding whose quantity reaches zero is removed
/// from the ledger rather than kept as an empty entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holding {
    pub quantity: Decimal,
    pub average_buy_price: Decimal,
}

impl Holding {
    #[must_use]
    pub fn new(
        quantity: Decimal,
        average_buy_price: Decimal,
    ) -> Self {
        Self {
            quantity,
            average_buy_price,
        }
    }

    /// Adds to the position. The new average is the plain mean of the old
    /// average and the fill price, independent of quantities.
    ///
    /// Returns `None` without touching the position if the quantity overflows.
    pub(super) fn merged(
        &self,
        quantity: Decimal,
        price: Decimal,
    ) -> Option<Self> {
        Some(Self {
            quantity: self.quantity.checked_add(quantity)?,
            average_buy_price: (self.average_buy_price + price) / Decimal::TWO,
        })
    }
}
