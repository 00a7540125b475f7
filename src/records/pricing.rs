use serde::{Deserialize, Serialize};

use super::Metric;

/// Purchase/selling figures of a sale. Profit is fixed when the sale is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub purchase: f64,
    pub selling: f64,
    #[serde(default)]
    pub fees: f64,
    pub profit: f64,
}

impl Pricing {
    pub fn new(purchase: f64, selling: f64, fees: Option<f64>) -> Self {
        let fees = fees.unwrap_or(0.0);
        Self {
            purchase,
            selling,
            fees,
            profit: selling - purchase - fees,
        }
    }

    pub fn amount(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Purchase => Some(self.purchase),
            Metric::Selling => Some(self.selling),
            Metric::Fees => Some(self.fees),
            Metric::Profit => Some(self.profit),
            Metric::Amount => None,
        }
    }

    pub fn values(&self) -> [f64; 4] {
        [self.purchase, self.selling, self.fees, self.profit]
    }
}
