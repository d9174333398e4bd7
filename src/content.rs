//! Renders laid-out spans into a PDF content stream.

use crate::colour::Colour;
use crate::font::Font;
use crate::page::{SpanFont, SpanLayout};
use id_arena::Arena;
use std::io::Write;

/// Converts the page's span list into low-level PDF text operators, tracking
/// the current font and colour so state changes are only emitted when a span
/// actually differs from its predecessor.
#[allow(clippy::write_with_newline)]
pub(crate) fn render_spans(
    spans: &[SpanLayout],
    fonts: &Arena<Font>,
) -> Result<Vec<u8>, std::io::Error> {
    if spans.is_empty() {
        return Ok(Vec::default());
    }

    let mut content: Vec<u8> = Vec::default();
    write!(&mut content, "q\n")?;

    // unwrap is safe, as we know spans isn't empty
    let mut current_font: SpanFont = spans.first().unwrap().font;
    let mut current_colour: Colour = spans.first().unwrap().colour;

    write!(
        &mut content,
        "/F{} {} Tf\n",
        current_font.id.index(),
        current_font.size
    )?;
    write_colour(&mut content, current_colour)?;

    for span in spans.iter() {
        if span.font != current_font {
            current_font = span.font;
            write!(
                &mut content,
                "/F{} {} Tf\n",
                current_font.id.index(),
                current_font.size
            )?;
        }
        if span.colour != current_colour {
            current_colour = span.colour;
            write_colour(&mut content, current_colour)?;
        }

        write!(&mut content, "BT\n")?;
        write!(&mut content, "{} {} Td\n", span.coords.0, span.coords.1)?;
        write!(&mut content, "<")?;
        fonts[current_font.id].encode_text(&span.text, &mut content)?;
        write!(&mut content, "> Tj\n")?;
        write!(&mut content, "ET\n")?;
    }

    write!(&mut content, "Q\n")?;
    Ok(content)
}

#[allow(clippy::write_with_newline)]
fn write_colour(content: &mut Vec<u8>, colour: Colour) -> Result<(), std::io::Error> {
    match colour {
        Colour::RGB { r, g, b } => write!(content, "{r} {g} {b} rg\n"),
        Colour::Grey { g } => write!(content, "{g} g\n"),
    }
}
