//! Indian rupee formatting (lakh/crore digit grouping).

use axent_common::marketplace::PriceUnit;

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;
const THOUSAND: f64 = 1_000.0;

/// Group integer digits the Indian way: last three, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// `₹12,34,567`, or `₹12,34,567.50` with decimals.
pub fn format_inr(amount: f64, show_decimals: bool) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let formatted = if show_decimals {
        format!("{:.2}", amount.abs())
    } else {
        format!("{:.0}", amount.abs())
    };
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    match frac_part {
        Some(frac) => format!("{}₹{}.{}", sign, group_indian(int_part), frac),
        None => format!("{}₹{}", sign, group_indian(int_part)),
    }
}

/// Short form for cards: `₹1.20Cr`, `₹2.50L`, `₹4.5K`.
pub fn format_compact(amount: f64) -> String {
    if amount >= CRORE {
        format!("₹{:.2}Cr", amount / CRORE)
    } else if amount >= LAKH {
        format!("₹{:.2}L", amount / LAKH)
    } else if amount >= THOUSAND {
        format!("₹{:.1}K", amount / THOUSAND)
    } else {
        format_inr(amount, false)
    }
}

/// `₹1,500/day`
pub fn format_price_with_unit(price: f64, unit: PriceUnit) -> String {
    format!("{}/{}", format_inr(price, false), unit.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "₹0")]
    #[case(999.0, "₹999")]
    #[case(1500.0, "₹1,500")]
    #[case(123456.0, "₹1,23,456")]
    #[case(1234567.0, "₹12,34,567")]
    #[case(123456789.0, "₹12,34,56,789")]
    #[case(-4800.0, "-₹4,800")]
    fn test_format_inr(#[case] amount: f64, #[case] expected: &str) {
        assert_eq!(format_inr(amount, false), expected);
    }

    #[test]
    fn test_format_inr_with_decimals() {
        assert_eq!(format_inr(1234567.5, true), "₹12,34,567.50");
        assert_eq!(format_inr(99.999, true), "₹100.00");
    }

    #[rstest]
    #[case(12_000_000.0, "₹1.20Cr")]
    #[case(250_000.0, "₹2.50L")]
    #[case(4_500.0, "₹4.5K")]
    #[case(950.0, "₹950")]
    fn test_format_compact(#[case] amount: f64, #[case] expected: &str) {
        assert_eq!(format_compact(amount), expected);
    }

    #[test]
    fn test_price_with_unit() {
        assert_eq!(format_price_with_unit(1500.0, PriceUnit::Day), "₹1,500/day");
        assert_eq!(format_price_with_unit(350.0, PriceUnit::Hour), "₹350/hour");
    }
}
