use crate::refs::{ObjectReferences, RefType};
use crate::{PDFError, Pt};
use id_arena::Id;
use owned_ttf_parser::{AsFaceRef, GlyphId, OwnedFace};
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo};
use pdf_writer::{Finish, Name, Pdf, Ref, Str};
use std::io::Write;

/// The two weights of the builtin typeface. These are base-14 fonts that
/// every conforming PDF reader provides, so the generated document stays
/// self-contained without carrying font programs. Metrics come from the
/// Adobe core font metrics, expressed in thousandths of an em.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

impl BuiltinFont {
    /// The PostScript name written as the `BaseFont` of the font dictionary
    pub fn base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn ascii_widths(&self) -> &'static [u16; 95] {
        match self {
            BuiltinFont::Helvetica => &HELVETICA_WIDTHS,
            BuiltinFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Advance width of a character in thousandths of an em. Characters
    /// outside the metrics tables fall back to the width of the question
    /// mark, which is also what they render as (see [winansi_byte]).
    pub fn advance(&self, ch: char) -> u16 {
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            return self.ascii_widths()[(code - 0x20) as usize];
        }
        self.latin1_advance(ch)
            .unwrap_or_else(|| self.advance('?'))
    }

    fn latin1_advance(&self, ch: char) -> Option<u16> {
        let bold = matches!(self, BuiltinFont::HelveticaBold);
        Some(match ch {
            '\u{a0}' => 278,
            'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => {
                if bold {
                    722
                } else {
                    667
                }
            }
            'É' | 'È' | 'Ê' | 'Ë' => 667,
            'Í' | 'Ì' | 'Î' | 'Ï' => 278,
            'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 778,
            'Ú' | 'Ù' | 'Û' | 'Ü' => 722,
            'Ñ' => 722,
            'Ç' => 722,
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'é' | 'è' | 'ê' | 'ë' => 556,
            'í' | 'ì' | 'î' | 'ï' => 278,
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ú' | 'ù' | 'û' | 'ü' | 'ñ' => {
                if bold {
                    611
                } else {
                    556
                }
            }
            'ç' => {
                if bold {
                    556
                } else {
                    500
                }
            }
            '°' => 400,
            'º' => 365,
            'ª' => 370,
            '¡' => 333,
            '¿' => {
                if bold {
                    611
                } else {
                    556
                }
            }
            '©' | '®' => 737,
            _ => return None,
        })
    }
}

/// A font usable in a document: either one of the builtin base-14 faces, or
/// a TTF/OTF face parsed with [owned_ttf_parser] and embedded in its
/// entirety in the generated PDF. Fonts are referred to throughout by their
/// [Id] within the document's font arena.
pub enum Font {
    Builtin(BuiltinFont),
    Embedded(OwnedFace),
}

// ascender / descender of the builtin faces, in thousandths of an em
const BUILTIN_ASCENDER: f32 = 718.0;
const BUILTIN_DESCENDER: f32 = -207.0;

impl Font {
    /// Use one of the builtin base-14 faces; no font program is embedded
    pub fn builtin(which: BuiltinFont) -> Font {
        Font::Builtin(which)
    }

    /// Load a font from raw TTF/OTF bytes, returning an error if the font
    /// could not be parsed. The font program will be embedded in its
    /// entirety, so large fonts may dramatically increase the size of the
    /// generated PDF.
    pub fn load(bytes: Vec<u8>) -> Result<Font, PDFError> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font::Embedded(face))
    }

    fn units_per_em(&self) -> f32 {
        match self {
            Font::Builtin(_) => 1000.0,
            Font::Embedded(face) => face.as_face_ref().units_per_em() as f32,
        }
    }

    /// Calculate the ascent (distance from the baseline to the top of the
    /// font) for the given font size
    pub fn ascent(&self, size: Pt) -> Pt {
        let scaling: Pt = size / self.units_per_em();
        match self {
            Font::Builtin(_) => scaling * BUILTIN_ASCENDER,
            Font::Embedded(face) => scaling * face.as_face_ref().ascender() as f32,
        }
    }

    /// Calculate the descent (distance from the baseline to the bottom of
    /// the font) for the given font size. Note: this is usually negative
    pub fn descent(&self, size: Pt) -> Pt {
        let scaling: Pt = size / self.units_per_em();
        match self {
            Font::Builtin(_) => scaling * BUILTIN_DESCENDER,
            Font::Embedded(face) => scaling * face.as_face_ref().descender() as f32,
        }
    }

    /// Calculate the default line height of the font for the given size. The
    /// returned value is how much to vertically offset a second row of text
    /// below a first row of text.
    pub fn line_height(&self, size: Pt) -> Pt {
        let leading = match self {
            Font::Builtin(_) => Pt(0.0),
            Font::Embedded(face) => {
                (size / self.units_per_em()) * face.as_face_ref().line_gap() as f32
            }
        };
        leading + self.ascent(size) - self.descent(size)
    }

    /// The horizontal advance of a single character at the given size.
    /// Characters the font has no glyph for advance by the width of the
    /// replacement they render as (builtin) or not at all (embedded).
    pub fn char_width(&self, ch: char, size: Pt) -> Pt {
        let scaling: Pt = size / self.units_per_em();
        match self {
            Font::Builtin(builtin) => scaling * builtin.advance(ch) as f32,
            Font::Embedded(face) => {
                let advance = face
                    .as_face_ref()
                    .glyph_index(ch)
                    .and_then(|gid| face.as_face_ref().glyph_hor_advance(gid))
                    .unwrap_or_default();
                scaling * advance as f32
            }
        }
    }

    /// Hex-encode a string of text into show-text operands for this font:
    /// two hex digits per WinAnsi byte for builtin faces, four per glyph id
    /// for embedded faces.
    pub(crate) fn encode_text(
        &self,
        text: &str,
        content: &mut Vec<u8>,
    ) -> Result<(), std::io::Error> {
        match self {
            Font::Builtin(_) => {
                for ch in text.chars() {
                    write!(content, "{:02x}", winansi_byte(ch).unwrap_or(b'?'))?;
                }
            }
            Font::Embedded(face) => {
                for ch in text.chars() {
                    let gid = face
                        .as_face_ref()
                        .glyph_index(ch)
                        .or_else(|| face.as_face_ref().glyph_index('\u{FFFD}'))
                        .or_else(|| face.as_face_ref().glyph_index('?'))
                        .unwrap_or(GlyphId(0));
                    write!(content, "{:04x}", gid.0)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, id: Id<Font>, writer: &mut Pdf) {
        let font_index = id.index();
        let font_id = refs.gen(RefType::Font(font_index));
        match self {
            Font::Builtin(builtin) => {
                let mut font = writer.type1_font(font_id);
                font.base_font(Name(builtin.base_name().as_bytes()));
                font.encoding_predefined(Name(b"WinAnsiEncoding"));
            }
            Font::Embedded(face) => {
                let cid_font_id = write_cid(face, refs, font_index, writer);
                let to_unicode_id = write_to_unicode(face, refs, font_index, writer);

                let mut font = writer.type0_font(font_id);
                font.base_font(Name(format!("F{font_index}").as_bytes()));
                font.encoding_predefined(Name(b"Identity-H"));
                font.descendant_font(cid_font_id);
                font.to_unicode(to_unicode_id);
            }
        }
    }
}

/// Map a character to its byte in the WinAnsi encoding the builtin fonts are
/// declared with. Returns [None] for characters the encoding cannot
/// represent; callers substitute a question mark.
pub(crate) fn winansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        0x20AC => Some(0x80),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95),
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        _ => None,
    }
}

/// Every glyph the face can map from Unicode, as (glyph id, char) pairs
/// sorted by glyph id. Used for the CID width runs and the ToUnicode CMap.
fn glyph_map(face: &OwnedFace) -> Vec<(u16, char)> {
    let mut map: std::collections::HashMap<u16, char> = std::collections::HashMap::new();

    if let Some(cmap) = face.as_face_ref().tables().cmap {
        for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
            subtable.codepoints(|codepoint: u32| {
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(index) = subtable.glyph_index(codepoint).filter(|index| index.0 > 0)
                    {
                        map.entry(index.0).or_insert(ch);
                    }
                }
            });
        }
    }

    let mut ids: Vec<(u16, char)> = map.into_iter().collect();
    ids.sort_by_key(|&(gid, _)| gid);
    ids
}

fn write_font_data(
    face: &OwnedFace,
    refs: &mut ObjectReferences,
    font_index: usize,
    writer: &mut Pdf,
) -> Ref {
    let id = refs.gen(RefType::FontData(font_index));

    writer
        .stream(id, face.as_slice())
        .pair(Name(b"Length1"), face.as_slice().len() as i32);

    id
}

fn write_descriptor(
    face: &OwnedFace,
    refs: &mut ObjectReferences,
    font_index: usize,
    writer: &mut Pdf,
) -> Ref {
    let font_data_stream_id = write_font_data(face, refs, font_index, writer);
    let id = refs.gen(RefType::FontDescriptor(font_index));

    let face_ref = face.as_face_ref();
    let scaling = 1000.0 / face_ref.units_per_em() as f32;

    let mut descriptor = writer.font_descriptor(id);
    descriptor.name(Name(format!("F{font_index}").as_bytes()));
    descriptor.family(Str(format!("F{font_index}").as_bytes()));

    let mut flags: FontFlags = FontFlags::empty();
    if face_ref.is_monospaced() {
        flags.set(FontFlags::FIXED_PITCH, true);
    }
    if face_ref.is_italic() {
        flags.set(FontFlags::ITALIC, true);
    }
    descriptor.flags(flags);

    let bbox = face_ref.global_bounding_box();
    descriptor.bbox(pdf_writer::Rect {
        x1: bbox.x_min as f32 * scaling,
        y1: bbox.y_min as f32 * scaling,
        x2: bbox.x_max as f32 * scaling,
        y2: bbox.y_max as f32 * scaling,
    });
    descriptor.italic_angle(face_ref.italic_angle());
    descriptor.ascent(face_ref.ascender() as f32 * scaling);
    descriptor.descent(face_ref.descender() as f32 * scaling);
    descriptor.cap_height(
        face_ref
            .capital_height()
            .map(|h| h as f32 * scaling)
            .unwrap_or(1000.0),
    );
    descriptor.stem_v(80.0);
    descriptor.font_file2(font_data_stream_id);

    id
}

fn write_cid(
    face: &OwnedFace,
    refs: &mut ObjectReferences,
    font_index: usize,
    writer: &mut Pdf,
) -> Ref {
    let font_descriptor_id = write_descriptor(face, refs, font_index, writer);
    let id = refs.gen(RefType::CidFont(font_index));

    let mut cid_font = writer.cid_font(id);
    cid_font.subtype(CidFontType::Type2);
    cid_font.base_font(Name(format!("F{font_index}").as_bytes()));
    cid_font.system_info(SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    });
    cid_font.font_descriptor(font_descriptor_id);

    let face_ref = face.as_face_ref();
    let scaling = 1000.0 / face_ref.units_per_em() as f32;

    let mut widths = cid_font.widths();
    widths.consecutive(0, [1000.0]);

    // emit runs of consecutive glyph ids; a gap starts a new block
    let mut run_start: u16 = 0;
    let mut run: Vec<f32> = Vec::new();
    for (gid, _) in glyph_map(face) {
        if !run.is_empty() && gid != run_start + run.len() as u16 {
            widths.consecutive(run_start, run.drain(..));
        }
        if run.is_empty() {
            run_start = gid;
        }
        let advance = face_ref
            .glyph_hor_advance(GlyphId(gid))
            .unwrap_or_default() as f32
            * scaling;
        run.push(advance);
    }
    if !run.is_empty() {
        widths.consecutive(run_start, run);
    }
    widths.finish();

    cid_font.default_width(1000.0);
    cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

    id
}

fn write_to_unicode(
    face: &OwnedFace,
    refs: &mut ObjectReferences,
    font_index: usize,
    writer: &mut Pdf,
) -> Ref {
    let id = refs.gen(RefType::ToUnicode(font_index));

    let mut map: String = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo\n\
         << /Registry (Adobe)\n\
         /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    let ids = glyph_map(face);
    for block in ids.chunks(100) {
        map.push_str(&format!("{} beginbfchar\n", block.len()));
        for (gid, ch) in block {
            map.push_str(&format!("<{gid:04x}> <{:04x}>\n", *ch as u32));
        }
        map.push_str("endbfchar\n");
    }
    map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
        map.as_bytes(),
        miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
    );
    let mut stream = writer.stream(id, compressed.as_slice());
    stream.filter(pdf_writer::Filter::FlateDecode);

    id
}

// Glyph advances for the printable ASCII range (0x20..=0x7E), in thousandths
// of an em, from the Adobe core font metrics.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Pt, expected: f32) {
        assert!(
            (actual.0 - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn digit_advance_matches_the_metrics_tables() {
        let regular = Font::builtin(BuiltinFont::Helvetica);
        assert_close(regular.char_width('0', Pt(10.0)), 5.56);
        assert_close(regular.char_width(' ', Pt(10.0)), 2.78);
    }

    #[test]
    fn bold_runs_wider_than_regular_where_the_afm_says_so() {
        assert!(BuiltinFont::HelveticaBold.advance('a') >= BuiltinFont::Helvetica.advance('a'));
        assert!(BuiltinFont::HelveticaBold.advance('m') > BuiltinFont::Helvetica.advance('m'));
        assert_eq!(BuiltinFont::Helvetica.advance('i'), 222);
        assert_eq!(BuiltinFont::HelveticaBold.advance('i'), 278);
    }

    #[test]
    fn unknown_characters_fall_back_to_the_question_mark_width() {
        let width = BuiltinFont::Helvetica.advance('☃');
        assert_eq!(width, BuiltinFont::Helvetica.advance('?'));
    }

    #[test]
    fn spanish_text_encodes_through_winansi() {
        assert_eq!(winansi_byte('ó'), Some(0xF3));
        assert_eq!(winansi_byte('ñ'), Some(0xF1));
        assert_eq!(winansi_byte('º'), Some(0xBA));
        assert_eq!(winansi_byte('☃'), None);
    }

    #[test]
    fn ascent_and_descent_scale_with_size() {
        let font = Font::builtin(BuiltinFont::Helvetica);
        assert_close(font.ascent(Pt(10.0)), 7.18);
        assert_close(font.descent(Pt(10.0)), -2.07);
        assert_close(font.line_height(Pt(10.0)), 9.25);
    }
}
