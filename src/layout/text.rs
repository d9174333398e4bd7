use crate::font::Font;
use crate::page::Page;
use crate::units::Pt;

/// Calculates the vertical offset from a text coordinate to the font's
/// baseline.
///
/// In PDF, text coordinates specify the baseline position. This function
/// returns the negative ascent value, which can be added to a y-coordinate
/// to account for the font's ascender height when positioning text from a
/// top reference point.
pub fn baseline_offset(font: &Font, size: Pt) -> Pt {
    Pt(0.0) - font.ascent(size)
}

/// Calculates the coordinates of where text can start on a page to be just
/// within the top left margin, taking into account the ascending height of
/// the font and the font size.
pub fn baseline_start(page: &Page, font: &Font, size: Pt) -> (Pt, Pt) {
    let ascent = baseline_offset(font, size);
    let x = page.content_box.x1;
    let y = page.content_box.y2 + ascent;
    (x, y)
}

/// Calculate the width of a given string of text given the font and font
/// size
pub fn width_of_text(text: &str, font: &Font, size: Pt) -> Pt {
    text.chars().map(|ch| font.char_width(ch, size)).sum()
}

/// Greedily fill lines of at most `max_width`, measuring candidate lines
/// with the supplied closure.
///
/// The text is split on single spaces; words are accumulated onto the
/// current line until appending the next word would push the measured width
/// past `max_width`, at which point the line is committed and the word
/// starts a new one. A single word wider than `max_width` is never split
/// mid-word—it is placed alone on its own line and allowed to overflow.
/// Empty input yields no lines, and joining the returned lines with single
/// spaces reproduces the whitespace-normalized input.
pub fn split_into_lines<F>(text: &str, max_width: Pt, measure: F) -> Vec<String>
where
    F: Fn(&str) -> Pt,
{
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if measure(&candidate) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// The x-coordinate at which `text` must start so that it ends exactly at
/// `right_edge`. Used for every column value that aligns to a fixed right
/// margin: prices, line totals, the totals block, the due date.
pub fn right_align(text: &str, right_edge: Pt, font: &Font, size: Pt) -> Pt {
    right_edge - width_of_text(text, font, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BuiltinFont;
    use pretty_assertions::assert_eq;

    /// measures every character as one point, making widths easy to reason
    /// about in tests
    fn one_pt_per_char(text: &str) -> Pt {
        Pt(text.chars().count() as f32)
    }

    #[test]
    fn empty_input_yields_no_lines() {
        let lines = split_into_lines("", Pt(100.0), one_pt_per_char);
        assert_eq!(lines, Vec::<String>::new());
    }

    #[test]
    fn wraps_at_the_word_that_overflows() {
        let lines = split_into_lines("uno dos tres cuatro", Pt(11.0), one_pt_per_char);
        assert_eq!(lines, vec!["uno dos".to_string(), "tres cuatro".to_string()]);
    }

    #[test]
    fn an_overwide_word_is_never_split() {
        let lines = split_into_lines("supercalifragilistico", Pt(5.0), one_pt_per_char);
        assert_eq!(lines, vec!["supercalifragilistico".to_string()]);

        let lines = split_into_lines("ok supercalifragilistico ok", Pt(5.0), one_pt_per_char);
        assert_eq!(
            lines,
            vec![
                "ok".to_string(),
                "supercalifragilistico".to_string(),
                "ok".to_string()
            ]
        );
    }

    #[test]
    fn rejoining_lines_reproduces_the_input() {
        let text = "la rapida liebre marron salta sobre el perro perezoso";
        let lines = split_into_lines(text, Pt(14.0), one_pt_per_char);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn wrapping_respects_font_metrics() {
        let font = Font::builtin(BuiltinFont::Helvetica);
        let text = "hola mundo hola mundo";
        let narrow = split_into_lines(text, Pt(60.0), |s| width_of_text(s, &font, Pt(10.0)));
        let wide = split_into_lines(text, Pt(600.0), |s| width_of_text(s, &font, Pt(10.0)));
        assert!(narrow.len() > 1);
        assert_eq!(wide.len(), 1);
        for line in &narrow {
            assert!(width_of_text(line, &font, Pt(10.0)) <= Pt(60.0));
        }
    }

    #[test]
    fn right_aligned_text_ends_at_the_right_edge() {
        let font = Font::builtin(BuiltinFont::Helvetica);
        for text in ["$135.000", "TOTAL", "F.Venc.: 07-08-2026"] {
            let x = right_align(text, Pt(545.28), &font, Pt(10.0));
            let end = x + width_of_text(text, &font, Pt(10.0));
            assert!(
                (end.0 - 545.28).abs() < 1e-3,
                "{text} ends at {end}, expected 545.28"
            );
        }
    }
}
