//! Content-stream interpretation: page operations to positioned fragments.
//!
//! Works on owned [`RawPage`] data so pages can be interpreted in parallel
//! once the document has been read. Coordinates are converted from PDF user
//! space (y up) to page space (y down) here.

use crate::error::Result;
use crate::model::{BBox, Fragment, PageStream};
use crate::outline::merge::is_spaceless_script_char;

use super::backend::{
    decode_content, decode_text, get_number_from_value, BackendFontInfo, ContentOp, PdfValue,
};

/// Estimated glyph width as a fraction of the font size.
const CHAR_WIDTH_RATIO: f32 = 0.5;

/// Ascender height as a fraction of the font size.
const ASCENT_RATIO: f32 = 0.8;

/// Descender depth as a fraction of the font size.
const DESCENT_RATIO: f32 = 0.2;

/// TJ adjustment (thousandths of an em) treated as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// One page copied out of the document, ready for interpretation.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Page number (1-indexed)
    pub number: u32,
    pub width: f32,
    pub height: f32,
    /// Fonts referenced by the page resources
    pub fonts: Vec<BackendFontInfo>,
    /// Decompressed content stream
    pub content: Vec<u8>,
}

/// Decode and interpret one page.
pub fn interpret_page(raw: &RawPage) -> Result<PageStream> {
    let ops = decode_content(&raw.content)?;
    Ok(interpret_ops(raw, &ops))
}

/// Text matrix with line tracking.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    /// Start of the current line (Td/T* are relative to it)
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    /// Move to the start of the next line, offset from the current line start.
    fn next_line_offset(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    /// Advance along the baseline after showing text.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Vertical scale factor applied to the font size.
    fn scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Graphics text state tracked while walking the operations.
struct TextState<'a> {
    fonts: &'a [BackendFontInfo],
    font: Option<&'a BackendFontInfo>,
    font_label: String,
    font_size: f32,
    leading: f32,
    matrix: TextMatrix,
    in_text: bool,
}

impl<'a> TextState<'a> {
    fn new(fonts: &'a [BackendFontInfo]) -> Self {
        Self {
            fonts,
            font: None,
            font_label: String::new(),
            font_size: 12.0,
            leading: 0.0,
            matrix: TextMatrix::default(),
            in_text: false,
        }
    }

    fn select_font(&mut self, resource: &[u8], size: f32) {
        self.font = self.fonts.iter().find(|f| f.name == resource);
        self.font_label = match self.font {
            Some(info) => info.base_font.clone(),
            None => String::from_utf8_lossy(resource).to_string(),
        };
        self.font_size = size;
    }

    fn next_line(&mut self) {
        self.matrix.next_line_offset(0.0, -self.leading);
    }

    fn decode(&self, bytes: &[u8]) -> String {
        decode_text(self.font.and_then(|f| f.encoding.as_deref()), bytes)
    }

    /// Text of a TJ array, with word spaces for large negative adjustments.
    fn decode_array(&self, items: &[PdfValue]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&self.decode(bytes)),
                other => {
                    let Some(n) = get_number_from_value(other) else {
                        continue;
                    };
                    let ends_spaced = combined
                        .chars()
                        .last()
                        .map_or(true, |c| c.is_whitespace() || is_spaceless_script_char(c));
                    if -n > TJ_SPACE_THRESHOLD && !ends_spaced {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    /// Emit a fragment at the current position and advance past it.
    fn show(&mut self, text: String, page: &mut PageStream) {
        let chars = text.chars().count() as f32;
        let advance = chars * self.font_size * CHAR_WIDTH_RATIO;

        if self.in_text && !text.trim().is_empty() {
            let (x, y) = self.matrix.position();
            let size = self.font_size * self.matrix.scale();
            let width = chars * size * CHAR_WIDTH_RATIO;
            let top = page.height - (y + size * ASCENT_RATIO);
            let bottom = page.height - (y - size * DESCENT_RATIO);

            let bbox = BBox::new(x, top, x + width, bottom);
            page.push(Fragment::new(text, size, page.number, bbox).with_font(self.font_label.clone()));
        }

        self.matrix.advance(advance);
    }
}

fn number(operands: &[PdfValue], index: usize, default: f32) -> f32 {
    operands
        .get(index)
        .and_then(get_number_from_value)
        .unwrap_or(default)
}

/// Walk decoded operations and collect the page's text fragments.
pub fn interpret_ops(raw: &RawPage, ops: &[ContentOp]) -> PageStream {
    let mut page = PageStream::new(raw.number, raw.width, raw.height);
    let mut state = TextState::new(&raw.fonts);

    for op in ops {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => {
                state.in_text = true;
                state.matrix = TextMatrix::default();
            }
            "ET" => {
                state.in_text = false;
            }
            "Tf" => {
                if let Some(PdfValue::Name(resource)) = operands.first() {
                    let size = number(operands, 1, 12.0);
                    state.select_font(resource, size);
                }
            }
            "TL" => {
                state.leading = number(operands, 0, 0.0);
            }
            "Td" => {
                state
                    .matrix
                    .next_line_offset(number(operands, 0, 0.0), number(operands, 1, 0.0));
            }
            "TD" => {
                let ty = number(operands, 1, 0.0);
                state.leading = -ty;
                state.matrix.next_line_offset(number(operands, 0, 0.0), ty);
            }
            "Tm" => {
                if operands.len() >= 6 {
                    state.matrix.set(
                        number(operands, 0, 1.0),
                        number(operands, 1, 0.0),
                        number(operands, 2, 0.0),
                        number(operands, 3, 1.0),
                        number(operands, 4, 0.0),
                        number(operands, 5, 0.0),
                    );
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = operands.first() {
                    let text = state.decode(bytes);
                    state.show(text, &mut page);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = operands.first() {
                    let text = state.decode_array(items);
                    state.show(text, &mut page);
                }
            }
            "'" | "\"" => {
                state.next_line();
                let index = if op.operator == "\"" { 2 } else { 0 };
                if let Some(PdfValue::Str(bytes)) = operands.get(index) {
                    let text = state.decode(bytes);
                    state.show(text, &mut page);
                }
            }
            _ => {}
        }
    }

    page
}
