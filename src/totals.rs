use crate::quote::LineItem;

/// The fixed IVA rate applied to every quotation. Not configurable.
pub const TAX_RATE: f64 = 0.19;

/// The five monetary figures displayed in the totals block, all in whole
/// pesos. Derived from the line items on every render, never stored.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Totals {
    pub sub_total: i64,
    pub discount_value: i64,
    pub sub_total_with_discount: i64,
    pub tax: i64,
    pub total: i64,
}

/// Lenient amount parsing: skip leading whitespace, accept an optional
/// sign, then take the longest prefix of ASCII digits. Anything that leaves
/// no digits—including the empty string—is zero. "12abc" parses as 12.
/// Never fails; a quotation must be producible from whatever partial data
/// the user has entered.
pub fn parse_amount(text: &str) -> i64 {
    let text = text.trim_start();
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits: &str = &rest[..rest
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len())];
    digits.parse::<i64>().map(|value| sign * value).unwrap_or(0)
}

/// Derive the totals block from the line items and the discount percentage.
///
/// Rounding is to the nearest integer with halves away from zero
/// ([f64::round]); for the non-negative amounts this pipeline produces that
/// matches the usual nearest-integer rule. The discount percentage is
/// applied as given: values outside 0–100 yield a negative or overshooting
/// discount rather than an error.
pub fn compute_totals(items: &[LineItem], discount_percent: i64) -> Totals {
    let sub_total: i64 = items.iter().map(LineItem::line_total).sum();
    let discount_value = (sub_total as f64 * discount_percent as f64 / 100.0).round() as i64;
    let sub_total_with_discount = sub_total - discount_value;
    let tax = (sub_total_with_discount as f64 * TAX_RATE).round() as i64;
    let total = sub_total_with_discount + tax;

    Totals {
        sub_total,
        discount_value,
        sub_total_with_discount,
        tax,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(price: &str, quantity: &str) -> LineItem {
        LineItem {
            number: String::new(),
            description: String::new(),
            price: price.into(),
            quantity: quantity.into(),
        }
    }

    #[test]
    fn parses_leading_integers() {
        assert_eq!(parse_amount("120000"), 120_000);
        assert_eq!(parse_amount("  42"), 42);
        assert_eq!(parse_amount("-3"), -3);
        assert_eq!(parse_amount("+7"), 7);
        assert_eq!(parse_amount("12abc"), 12);
        assert_eq!(parse_amount("3.7"), 3);
        assert_eq!(parse_amount("abc"), 0);
        assert_eq!(parse_amount(""), 0);
        assert_eq!(parse_amount("-"), 0);
    }

    #[test]
    fn totals_for_the_standard_two_item_quote() {
        let items = vec![item("120000", "1"), item("15000", "1")];
        let totals = compute_totals(&items, 10);
        assert_eq!(
            totals,
            Totals {
                sub_total: 135_000,
                discount_value: 13_500,
                sub_total_with_discount: 121_500,
                tax: 23_085,
                total: 144_585,
            }
        );
    }

    #[test]
    fn discount_rounds_to_the_nearest_peso() {
        let items = vec![item("100001", "1")];
        let totals = compute_totals(&items, 10);
        // 10% of 100001 is 10000.1, which rounds down
        assert_eq!(totals.discount_value, 10_000);
        assert_eq!(totals.sub_total_with_discount, 90_001);
    }

    #[test]
    fn tax_follows_the_discounted_subtotal() {
        let items = vec![item("100000", "1")];
        let totals = compute_totals(&items, 15);
        assert_eq!(totals.discount_value, 15_000);
        assert_eq!(totals.tax, (85_000.0_f64 * TAX_RATE).round() as i64);
        assert_eq!(totals.total, totals.sub_total_with_discount + totals.tax);
    }

    #[test]
    fn unparseable_rows_contribute_zero_without_failing() {
        let items = vec![item("", "abc"), item("1000", "2")];
        let totals = compute_totals(&items, 0);
        assert_eq!(totals.sub_total, 2_000);
        assert_eq!(totals.total, 2_380);
    }

    #[test]
    fn discount_is_deliberately_unclamped() {
        let items = vec![item("1000", "1")];

        let overshoot = compute_totals(&items, 150);
        assert_eq!(overshoot.discount_value, 1_500);
        assert_eq!(overshoot.sub_total_with_discount, -500);

        let negative = compute_totals(&items, -10);
        assert_eq!(negative.discount_value, -100);
        assert_eq!(negative.sub_total_with_discount, 1_100);
    }

    #[test]
    fn no_items_means_all_zeroes() {
        assert_eq!(compute_totals(&[], 25), Totals::default());
    }
}
