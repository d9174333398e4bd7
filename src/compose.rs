//! Lays one quotation out onto a single A4 page and serializes it.
//!
//! Composition is a strict top-to-bottom state machine over one mutable
//! [Cursor]: header, description, client block, project line, item table,
//! totals block, footer, in that order. Each stage draws at the current
//! position and only ever advances the cursor, so stages can be tested in
//! isolation by asserting cursor deltas and emitted spans.

use crate::colour::{colours, Colour};
use crate::currency::format_clp;
use crate::document::Document;
use crate::font::{BuiltinFont, Font};
use crate::info::Info;
use crate::layout::{self, Cursor, Margins};
use crate::page::{Page, SpanFont, SpanLayout};
use crate::pagesize;
use crate::quote::QuoteData;
use crate::sequence::SequenceCounter;
use crate::totals::{compute_totals, parse_amount, Totals, TAX_RATE};
use crate::units::Pt;
use crate::PDFError;
use chrono::NaiveDate;
use id_arena::{Arena, Id};
use log::debug;

const MARGIN_H: Pt = Pt(50.0);
const MARGIN_V: Pt = Pt(60.0);

/// Baseline step between successive lines of body text
const LINE: Pt = Pt(15.0);
/// Baseline step between the header's left-column lines
const HEADER_LINE: Pt = Pt(25.0);
/// Vertical gap between the header and the description
const HEADER_GAP: Pt = Pt(110.0);
/// Vertical gap closing the description and client sections
const SECTION_GAP: Pt = Pt(30.0);
/// Vertical gap around the item table
const TABLE_GAP: Pt = Pt(40.0);
/// Extra leading added below each wrapped description line
const DESCRIPTION_LEADING: Pt = Pt(8.0);

const COMPANY_SIZE: Pt = Pt(18.0);
const TITLE_SIZE: Pt = Pt(14.0);
const BODY_SIZE: Pt = Pt(10.0);
const FOOTNOTE_SIZE: Pt = Pt(8.0);

// item table column offsets from the left margin; fixed, not sized to
// content
const COL_DESCRIPTION: Pt = Pt(40.0);
const COL_PRICE: Pt = Pt(220.0);
/// Right edge unit prices align to
const COL_PRICE_EDGE: Pt = Pt(270.0);
const COL_QUANTITY: Pt = Pt(290.0);

/// Baseline of the lowest footer line, measured up from the bottom edge of
/// the page. The footer is anchored here regardless of where the cursor
/// ended up, so a long enough quotation will run into it: the page is a
/// single fixed canvas with no pagination or overflow detection.
pub const FOOTER_BASELINE: Pt = Pt(72.0);
/// Horizontal offset of the approval block, from the right edge of the page
const APPROVAL_INDENT: Pt = Pt(200.0);

// header fallbacks for fields the user left blank
const DEFAULT_COMPANY: &str = "DeCodigo";
const DEFAULT_SUBTITLE: &str = "Diseño a tu alcance";
const DEFAULT_TITLE: &str = "Cotización";
const DEFAULT_SEQUENCE: &str = "0000001";

const CONTACT_EMAIL: &str = "social@decodigo.cl";
const CONTACT_ADDRESS: &str = "Calle Lateral 122, Santiago, Chile";
const APPROVAL_LABEL: &str = "APROBADO POR";
const APPROVAL_NAME: &str = "Daniel Morales";
const APPROVAL_HANDLE: &str = "@DeCodigo";

/// The two weights the composer typesets with, resolved against the
/// document's font arena
struct Typeset<'a> {
    fonts: &'a Arena<Font>,
    regular: Id<Font>,
    bold: Id<Font>,
}

impl Typeset<'_> {
    fn width(&self, text: &str, font: Id<Font>, size: Pt) -> Pt {
        layout::width_of_text(text, &self.fonts[font], size)
    }

    fn put(
        &self,
        page: &mut Page,
        text: impl Into<String>,
        font: Id<Font>,
        size: Pt,
        colour: Colour,
        x: Pt,
        y: Pt,
    ) {
        page.add_span(SpanLayout {
            text: text.into(),
            font: SpanFont { id: font, size },
            colour,
            coords: (x, y),
        });
    }

    fn put_right(
        &self,
        page: &mut Page,
        text: impl Into<String>,
        font: Id<Font>,
        size: Pt,
        colour: Colour,
        right_edge: Pt,
        y: Pt,
    ) {
        let text = text.into();
        let x = layout::right_align(&text, right_edge, &self.fonts[font], size);
        self.put(page, text, font, size, colour, x, y);
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

/// Dates render the way es-CL writes them; absent dates render as nothing
/// rather than failing
fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_default()
}

/// Two-column header: company identity on the left, document identity
/// right-aligned against the right margin
fn header(ts: &Typeset, page: &mut Page, cursor: &mut Cursor, quote: &QuoteData) {
    let top = cursor.y;

    let company = or_default(&quote.company, DEFAULT_COMPANY);
    let subtitle = or_default(&quote.subtitle, DEFAULT_SUBTITLE);
    let title = or_default(&quote.title, DEFAULT_TITLE);
    let sequence = or_default(&quote.sequence_number, DEFAULT_SEQUENCE);

    ts.put(
        page,
        company,
        ts.bold,
        COMPANY_SIZE,
        colours::BLACK,
        cursor.x,
        cursor.y,
    );
    cursor.advance(HEADER_LINE);
    ts.put(
        page,
        subtitle,
        ts.regular,
        BODY_SIZE,
        colours::MUTED,
        cursor.x,
        cursor.y,
    );
    cursor.advance(HEADER_LINE);
    ts.put(
        page,
        format!("Fecha Emisión: {}", format_date(quote.issue_date)),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        cursor.x,
        cursor.y,
    );

    let right = cursor.right();
    let mut right_y = top - HEADER_LINE;
    ts.put_right(
        page,
        title,
        ts.bold,
        TITLE_SIZE,
        colours::BLACK,
        right,
        right_y,
    );
    right_y -= LINE;
    ts.put_right(
        page,
        format!("Presupuesto Nº {sequence}"),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        right,
        right_y,
    );
    right_y -= LINE;
    ts.put_right(
        page,
        format!("F.Venc.: {}", format_date(quote.due_date)),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        right,
        right_y,
    );

    cursor.advance(HEADER_GAP);
}

/// Free-text introduction, word-wrapped across the full content width
fn description(ts: &Typeset, page: &mut Page, cursor: &mut Cursor, quote: &QuoteData) {
    let lines = layout::split_into_lines(&quote.description, cursor.width(), |s| {
        ts.width(s, ts.regular, BODY_SIZE)
    });

    for line in lines {
        ts.put(
            page,
            line,
            ts.regular,
            BODY_SIZE,
            colours::BLACK,
            cursor.x,
            cursor.y,
        );
        cursor.advance(BODY_SIZE + DESCRIPTION_LEADING);
    }

    cursor.advance(SECTION_GAP);
}

/// Fixed-label client lines; the address may carry embedded newlines, each
/// of which becomes its own output line
fn client_block(ts: &Typeset, page: &mut Page, cursor: &mut Cursor, quote: &QuoteData) {
    ts.put(
        page,
        "CLIENTE",
        ts.bold,
        BODY_SIZE,
        colours::BLACK,
        cursor.x,
        cursor.y,
    );
    cursor.advance(LINE);
    ts.put(
        page,
        quote.client.as_str(),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        cursor.x,
        cursor.y,
    );
    cursor.advance(LINE);

    for line in quote.address.split('\n') {
        ts.put(
            page,
            line,
            ts.regular,
            BODY_SIZE,
            colours::BLACK,
            cursor.x,
            cursor.y,
        );
        cursor.advance(LINE);
    }

    ts.put(
        page,
        format!("Fono: {}", quote.phone),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        cursor.x,
        cursor.y,
    );
    cursor.advance(LINE);
    ts.put(
        page,
        format!("RUT: {}", quote.tax_id),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        cursor.x,
        cursor.y,
    );
    cursor.advance(LINE);
    ts.put(
        page,
        format!("Email: {}", quote.email),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        cursor.x,
        cursor.y,
    );
    cursor.advance(SECTION_GAP);
}

fn project_line(ts: &Typeset, page: &mut Page, cursor: &mut Cursor, quote: &QuoteData) {
    ts.put(
        page,
        format!("PROYECTO: {}", quote.project),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        cursor.x,
        cursor.y,
    );
    cursor.advance(TABLE_GAP);
}

/// Header row plus one row per item, in input order. Unit prices and line
/// totals are right-aligned to their columns; column positions are fixed
/// constants from the left margin.
fn item_table(ts: &Typeset, page: &mut Page, cursor: &mut Cursor, quote: &QuoteData) {
    let left = cursor.left();

    ts.put(page, "N°", ts.bold, BODY_SIZE, colours::BLACK, left, cursor.y);
    ts.put(
        page,
        "DESCRIPCIÓN",
        ts.bold,
        BODY_SIZE,
        colours::BLACK,
        left + COL_DESCRIPTION,
        cursor.y,
    );
    ts.put(
        page,
        "PRECIO",
        ts.bold,
        BODY_SIZE,
        colours::BLACK,
        left + COL_PRICE,
        cursor.y,
    );
    ts.put(
        page,
        "CANT.",
        ts.bold,
        BODY_SIZE,
        colours::BLACK,
        left + COL_QUANTITY,
        cursor.y,
    );
    ts.put_right(
        page,
        "TOTAL",
        ts.bold,
        BODY_SIZE,
        colours::BLACK,
        cursor.right(),
        cursor.y,
    );
    cursor.advance(LINE);

    for item in &quote.items {
        ts.put(
            page,
            item.number.as_str(),
            ts.regular,
            BODY_SIZE,
            colours::BLACK,
            left,
            cursor.y,
        );
        ts.put(
            page,
            item.description.as_str(),
            ts.regular,
            BODY_SIZE,
            colours::BLACK,
            left + COL_DESCRIPTION,
            cursor.y,
        );
        ts.put_right(
            page,
            format_clp(parse_amount(&item.price)),
            ts.regular,
            BODY_SIZE,
            colours::BLACK,
            left + COL_PRICE_EDGE,
            cursor.y,
        );
        ts.put(
            page,
            item.quantity.as_str(),
            ts.regular,
            BODY_SIZE,
            colours::BLACK,
            left + COL_QUANTITY,
            cursor.y,
        );
        ts.put_right(
            page,
            format_clp(item.line_total()),
            ts.regular,
            BODY_SIZE,
            colours::BLACK,
            cursor.right(),
            cursor.y,
        );
        cursor.advance(LINE);
    }

    cursor.advance(TABLE_GAP);
}

/// The five derived figures, right-aligned under a heading in fixed order
fn totals_block(
    ts: &Typeset,
    page: &mut Page,
    cursor: &mut Cursor,
    quote: &QuoteData,
    totals: &Totals,
) {
    let right = cursor.right();

    ts.put_right(
        page,
        "TOTALES",
        ts.bold,
        BODY_SIZE,
        colours::BLACK,
        right,
        cursor.y,
    );
    cursor.advance(LINE);
    ts.put_right(
        page,
        format!("SUBTOTAL: {}", format_clp(totals.sub_total)),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        right,
        cursor.y,
    );
    cursor.advance(LINE);
    ts.put_right(
        page,
        format!(
            "DESCUENTO ({}%): -{}",
            quote.discount_percent,
            format_clp(totals.discount_value)
        ),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        right,
        cursor.y,
    );
    cursor.advance(LINE);
    ts.put_right(
        page,
        format!(
            "SUBTOTAL C/DCTO: {}",
            format_clp(totals.sub_total_with_discount)
        ),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        right,
        cursor.y,
    );
    cursor.advance(LINE);
    ts.put_right(
        page,
        format!(
            "{}% IVA: {}",
            (TAX_RATE * 100.0).round() as i64,
            format_clp(totals.tax)
        ),
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        right,
        cursor.y,
    );
    cursor.advance(LINE);
    ts.put_right(
        page,
        format!("TOTAL: {}", format_clp(totals.total)),
        ts.bold,
        BODY_SIZE,
        colours::BLACK,
        right,
        cursor.y,
    );
    cursor.advance(LINE);
}

/// Contact and approval columns anchored at [FOOTER_BASELINE]. Deliberately
/// does not take the cursor: the footer always sits at the same place on
/// the page.
fn footer(ts: &Typeset, page: &mut Page) {
    let left = page.content_box.x1;
    let approval_x = page.media_box.x2 - APPROVAL_INDENT;

    ts.put(
        page,
        CONTACT_EMAIL,
        ts.regular,
        FOOTNOTE_SIZE,
        colours::MUTED,
        left,
        FOOTER_BASELINE + LINE,
    );
    ts.put(
        page,
        CONTACT_ADDRESS,
        ts.regular,
        FOOTNOTE_SIZE,
        colours::MUTED,
        left,
        FOOTER_BASELINE,
    );

    ts.put(
        page,
        APPROVAL_LABEL,
        ts.bold,
        BODY_SIZE,
        colours::BLACK,
        approval_x,
        FOOTER_BASELINE + LINE * 2.0,
    );
    ts.put(
        page,
        APPROVAL_NAME,
        ts.regular,
        BODY_SIZE,
        colours::BLACK,
        approval_x,
        FOOTER_BASELINE + LINE,
    );
    ts.put(
        page,
        APPROVAL_HANDLE,
        ts.regular,
        FOOTNOTE_SIZE,
        colours::MUTED,
        approval_x,
        FOOTER_BASELINE,
    );
}

/// Render one quotation to a complete, self-contained, single-page PDF.
///
/// This is total over its input: unparseable amounts and missing optional
/// fields are defaulted, never surfaced. The only error condition is the
/// document failing to serialize.
pub fn render_quote(quote: &QuoteData) -> Result<Vec<u8>, PDFError> {
    debug!("rendering quotation with {} line items", quote.items.len());
    let totals = compute_totals(&quote.items, quote.discount_percent);

    let mut doc = Document::default();
    let regular = doc.add_font(Font::builtin(BuiltinFont::Helvetica));
    let bold = doc.add_font(Font::builtin(BuiltinFont::HelveticaBold));

    let mut info = Info::new();
    info.title(format!(
        "{} Nº {}",
        or_default(&quote.title, DEFAULT_TITLE),
        or_default(&quote.sequence_number, DEFAULT_SEQUENCE)
    ));
    info.author(or_default(&quote.company, DEFAULT_COMPANY));
    if !quote.project.is_empty() {
        info.subject(&quote.project);
    }
    doc.set_info(info);

    let mut page = Page::new(pagesize::A4, Some(Margins::symmetric(MARGIN_V, MARGIN_H)));
    {
        let ts = Typeset {
            fonts: &doc.fonts,
            regular,
            bold,
        };
        let mut cursor = Cursor::at_top(&page);
        header(&ts, &mut page, &mut cursor, quote);
        description(&ts, &mut page, &mut cursor, quote);
        client_block(&ts, &mut page, &mut cursor, quote);
        project_line(&ts, &mut page, &mut cursor, quote);
        item_table(&ts, &mut page, &mut cursor, quote);
        totals_block(&ts, &mut page, &mut cursor, quote, &totals);
        footer(&ts, &mut page);
    }
    doc.add_page(page);

    let mut bytes = Vec::new();
    doc.write(&mut bytes)?;
    debug!("quotation serialized to {} bytes", bytes.len());
    Ok(bytes)
}

/// Render a quotation stamped with the counter's current number, advancing
/// the counter only after the document has actually been produced.
pub fn render_quote_numbered<C: SequenceCounter>(
    quote: &QuoteData,
    counter: &mut C,
) -> Result<Vec<u8>, PDFError> {
    let mut stamped = quote.clone();
    stamped.sequence_number = counter.current();
    let bytes = render_quote(&stamped)?;
    counter.increment_and_get();
    Ok(bytes)
}
