//! Fonts available to the page-number overlay.
//!
//! A [`FontSet`] is built once and handed to the overlay by reference. The
//! standard set carries two of the PDF standard-14 faces, which every
//! viewer provides, so nothing has to be embedded.

use std::collections::BTreeMap;

/// Name of the Helvetica face in [`FontSet::standard`].
pub const HELVETICA: &str = "Helvetica";
/// Name of the Courier face in [`FontSet::standard`].
pub const COURIER: &str = "Courier";

// WinAnsi 32..=126, 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const COURIER_WIDTHS: [u16; 95] = [600; 95];

/// Metrics and PDF name of one font face.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFace {
    name: String,
    base_font: String,
    widths: [u16; 95],
    missing_width: u16,
    ascent: i16,
    descent: i16,
    line_gap: i16,
}

impl FontFace {
    /// Describe a simple (single-byte, WinAnsi) font.
    ///
    /// `widths` covers character codes 32 through 126; `ascent`, `descent`
    /// and `line_gap` are in 1/1000 em with `descent` negative.
    pub fn new(
        name: impl Into<String>,
        base_font: impl Into<String>,
        widths: [u16; 95],
        ascent: i16,
        descent: i16,
        line_gap: i16,
    ) -> Self {
        Self {
            name: name.into(),
            base_font: base_font.into(),
            widths,
            missing_width: 600,
            ascent,
            descent,
            line_gap,
        }
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `/BaseFont` written into the font dictionary.
    pub fn base_font(&self) -> &str {
        &self.base_font
    }

    /// Ascent in 1/1000 em.
    pub fn ascent(&self) -> i16 {
        self.ascent
    }

    /// Descent in 1/1000 em (negative).
    pub fn descent(&self) -> i16 {
        self.descent
    }

    /// Advance width of `text` in points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .bytes()
            .map(|b| match b {
                32..=126 => u32::from(self.widths[usize::from(b - 32)]),
                _ => u32::from(self.missing_width),
            })
            .sum();
        units as f32 * size / 1000.0
    }

    /// Distance between consecutive baselines in points.
    pub fn line_height(&self, size: f32) -> f32 {
        let units = i32::from(self.ascent) - i32::from(self.descent) + i32::from(self.line_gap);
        units as f32 * size / 1000.0
    }
}

/// Immutable collection of font faces keyed by name.
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    faces: BTreeMap<String, FontFace>,
}

impl FontSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Helvetica and Courier.
    pub fn standard() -> Self {
        Self::new()
            .with_face(FontFace::new(
                HELVETICA,
                "Helvetica",
                HELVETICA_WIDTHS,
                718,
                -207,
                231,
            ))
            .with_face(FontFace::new(
                COURIER,
                "Courier",
                COURIER_WIDTHS,
                629,
                -157,
                434,
            ))
    }

    /// Add a face, replacing any face with the same name.
    pub fn with_face(mut self, face: FontFace) -> Self {
        self.faces.insert(face.name.clone(), face);
        self
    }

    /// Look up a face by name.
    pub fn get(&self, name: &str) -> Option<&FontFace> {
        self.faces.get(name)
    }

    /// Registered face names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.faces.keys().map(String::as_str)
    }
}
