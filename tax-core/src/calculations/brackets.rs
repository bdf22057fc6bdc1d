//! Progressive income tax bands.
//!
//! | Band                  | Rate | Tax on full band |
//! |-----------------------|------|------------------|
//! | 0 – 150,000           | 0%   | 0                |
//! | 150,001 – 500,000     | 10%  | 35,000           |
//! | 500,001 – 1,000,000   | 15%  | 75,000           |
//! | 1,000,001 – 2,000,000 | 20%  | 200,000          |
//! | 2,000,001 and above   | 35%  | unbounded        |
//!
//! Each band starts one currency unit above the previous band's end.

use rust_decimal_macros::dec;

use crate::models::Bracket;

pub const BRACKETS: [Bracket; 5] = [
    Bracket {
        name: "0-150,000",
        lower_bound: dec!(0),
        upper_bound: Some(dec!(150000)),
        rate_percent: dec!(0),
        max_tax_in_bracket: Some(dec!(0)),
    },
    Bracket {
        name: "150,001-500,000",
        lower_bound: dec!(150001),
        upper_bound: Some(dec!(500000)),
        rate_percent: dec!(10),
        max_tax_in_bracket: Some(dec!(35000)),
    },
    Bracket {
        name: "500,001-1,000,000",
        lower_bound: dec!(500001),
        upper_bound: Some(dec!(1000000)),
        rate_percent: dec!(15),
        max_tax_in_bracket: Some(dec!(75000)),
    },
    Bracket {
        name: "1,000,001-2,000,000",
        lower_bound: dec!(1000001),
        upper_bound: Some(dec!(2000000)),
        rate_percent: dec!(20),
        max_tax_in_bracket: Some(dec!(200000)),
    },
    Bracket {
        name: "2,000,001 ขึ้นไป",
        lower_bound: dec!(2000001),
        upper_bound: None,
        rate_percent: dec!(35),
        max_tax_in_bracket: None,
    },
];

/// The bracket table in ascending order.
pub fn brackets() -> &'static [Bracket] {
    &BRACKETS
}
