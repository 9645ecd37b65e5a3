use std::{collections::BTreeMap, fmt};

use rust_decimal::Decimal;

/// Every quotation is expressed as units of the target currency per 1 USD.
pub const BASE_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Currency {
    Brl,
    Eur,
    Jpy,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Brl, Currency::Eur, Currency::Jpy];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Brl => "BRL",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub type RateMap = BTreeMap<Currency, Decimal>;
