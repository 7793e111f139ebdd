use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::types::PaymentToken;

/// Sale price in the payment currency plus its USD value.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    /// `total_price / 10^decimals`, exact.
    pub amount: Decimal,
    pub symbol: String,
    pub usd: f64,
}

impl PriceQuote {
    /// Shift the integer `total_price` by the token's decimals and value it in USD.
    pub fn compute(total_price: &str, token: &PaymentToken) -> Result<Self> {
        let mut amount = Decimal::from_str(total_price.trim())
            .with_context(|| format!("invalid total_price {total_price:?}"))?;
        amount
            .set_scale(token.decimals)
            .with_context(|| format!("unsupported token decimals {}", token.decimals))?;

        let unit_usd: f64 = token
            .usd_price
            .trim()
            .parse()
            .with_context(|| format!("invalid usd_price {:?}", token.usd_price))?;
        let usd = amount.to_f64().unwrap_or(0.0) * unit_usd;

        Ok(Self {
            amount,
            symbol: token.symbol.clone(),
            usd,
        })
    }

    /// Amount without trailing zeros but with at least one decimal, e.g. `1.18`, `2.0`.
    pub fn amount_display(&self) -> String {
        let amount = self.amount.normalize();
        if amount.scale() == 0 {
            format!("{amount}.0")
        } else {
            amount.to_string()
        }
    }

    pub fn usd_display(&self) -> String {
        format!("{:.2}", self.usd)
    }

    /// `1.18 ETH, ($5003.20)`
    pub fn summary(&self) -> String {
        format!(
            "{} {}, (${})",
            self.amount_display(),
            self.symbol,
            self.usd_display()
        )
    }
}
