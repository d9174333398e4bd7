use crate::totals::parse_amount;
use chrono::NaiveDate;

/// One row of the quotation. Price and quantity are kept as the free-form
/// text the user typed; they are parsed leniently (see
/// [parse_amount](crate::parse_amount)) everywhere an amount is needed, so
/// a half-filled row never prevents the document from rendering.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// The row label shown in the N° column
    pub number: String,
    pub description: String,
    /// Unit price in whole pesos, as entered
    pub price: String,
    pub quantity: String,
}

impl LineItem {
    /// The row's total: unit price times quantity, with unparseable values
    /// contributing zero
    pub fn line_total(&self) -> i64 {
        parse_amount(&self.price) * parse_amount(&self.quantity)
    }
}

/// Everything needed to render one quotation. An immutable snapshot: the
/// composer only reads it, and a render call never mutates it.
///
/// All text fields treat the empty string as "not provided". The header
/// fields (company, subtitle, title, sequence number) then fall back to
/// fixed defaults; everything else renders as blank. Dates are optional and
/// render as empty strings when absent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QuoteData {
    pub company: String,
    pub subtitle: String,
    /// The document title shown at the top right, e.g. "Cotización"
    pub title: String,
    /// The pre-rendered document number, usually zero-padded to seven
    /// digits by a [SequenceCounter](crate::SequenceCounter)
    pub sequence_number: String,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub client: String,
    /// Postal address; embedded newlines each become their own line
    pub address: String,
    pub phone: String,
    /// Chilean RUT of the client
    pub tax_id: String,
    pub email: String,
    pub project: String,
    /// Free-form introduction, word-wrapped across the page width
    pub description: String,
    /// Discount percentage. Deliberately unclamped: values outside 0–100
    /// produce a negative or overshooting discount instead of an error.
    pub discount_percent: i64,
    /// Rows in render order
    pub items: Vec<LineItem>,
}

impl QuoteData {
    /// Suggested label for the next row: the last row's number plus one.
    /// Follows the same lenient parse as amounts, so a blank or garbled
    /// label restarts the count at 1.
    pub fn next_item_number(&self) -> String {
        let last = self
            .items
            .last()
            .map(|item| parse_amount(&item.number))
            .unwrap_or(0);
        (last + 1).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(number: &str, price: &str, quantity: &str) -> LineItem {
        LineItem {
            number: number.into(),
            description: String::new(),
            price: price.into(),
            quantity: quantity.into(),
        }
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        assert_eq!(item("1", "120000", "1").line_total(), 120_000);
        assert_eq!(item("2", "15000", "3").line_total(), 45_000);
    }

    #[test]
    fn unparseable_amounts_contribute_zero() {
        assert_eq!(item("1", "", "abc").line_total(), 0);
        assert_eq!(item("1", "1000", "").line_total(), 0);
    }

    #[test]
    fn next_item_number_counts_from_the_last_row() {
        let mut quote = QuoteData::default();
        assert_eq!(quote.next_item_number(), "1");

        quote.items.push(item("1", "1000", "1"));
        quote.items.push(item("7", "1000", "1"));
        assert_eq!(quote.next_item_number(), "8");

        quote.items.push(item("garbled", "0", "0"));
        assert_eq!(quote.next_item_number(), "1");
    }
}
