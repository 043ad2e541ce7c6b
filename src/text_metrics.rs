use crate::error::MeasureError;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_CATALOG: Lazy<Mutex<FontCatalog>> = Lazy::new(|| Mutex::new(FontCatalog::new()));

/// Ascent plus descent as a fraction of the em size, used when no face is
/// available.
const FALLBACK_ASCENT_DESCENT: f32 = 1.15;

/// Font family and pixel size a line of text is measured with.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

/// Measurement capability of a drawing surface.
///
/// Label wrapping and sizing only ever talk to this trait, so layout can run
/// against a real font database, the approximate table below, or a test
/// double.
pub trait TextMeasure {
    /// Advance width of `text` in pixels.
    fn text_width(&self, text: &str, font: &FontSpec) -> Result<f64, MeasureError>;
    /// Font bounding-box ascent plus descent in pixels.
    fn ascent_descent(&self, font: &FontSpec) -> Result<f64, MeasureError>;
}

/// Measures against installed system fonts through fontdb.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFontMeasurer {
    /// Fall back to [`ApproxMeasurer`] when no face matches the family.
    pub fallback: bool,
}

impl SystemFontMeasurer {
    pub fn with_fallback() -> Self {
        Self { fallback: true }
    }

    fn or_fallback(
        &self,
        measured: Result<f64, MeasureError>,
        approx: impl FnOnce() -> Result<f64, MeasureError>,
    ) -> Result<f64, MeasureError> {
        match measured {
            Err(MeasureError::FontUnavailable(family)) if self.fallback => {
                log::debug!("no face for `{family}`, using approximate metrics");
                approx()
            }
            other => other,
        }
    }
}

impl TextMeasure for SystemFontMeasurer {
    fn text_width(&self, text: &str, font: &FontSpec) -> Result<f64, MeasureError> {
        let measured = if text.is_empty() || font.size <= 0.0 {
            Ok(0.0)
        } else {
            let mut guard = FONT_CATALOG.lock().map_err(|_| MeasureError::Poisoned)?;
            guard
                .measure(text, font.size as f32, &font.family)
                .map(f64::from)
        };
        self.or_fallback(measured, || ApproxMeasurer.text_width(text, font))
    }

    fn ascent_descent(&self, font: &FontSpec) -> Result<f64, MeasureError> {
        let measured = {
            let mut guard = FONT_CATALOG.lock().map_err(|_| MeasureError::Poisoned)?;
            guard
                .ascent_descent(font.size as f32, &font.family)
                .map(f64::from)
        };
        self.or_fallback(measured, || ApproxMeasurer.ascent_descent(font))
    }
}

/// Table-driven widths calibrated for a proportional sans/serif stack.
/// Never fails and never touches the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasurer;

impl TextMeasure for ApproxMeasurer {
    fn text_width(&self, text: &str, font: &FontSpec) -> Result<f64, MeasureError> {
        Ok(f64::from(fallback_text_width(text, font.size as f32)))
    }

    fn ascent_descent(&self, font: &FontSpec) -> Result<f64, MeasureError> {
        Ok(f64::from(font.size as f32 * FALLBACK_ASCENT_DESCENT))
    }
}

/// Picks the measurer the config asks for.
pub fn measurer(fast_text_metrics: bool) -> Box<dyn TextMeasure> {
    if fast_text_metrics {
        Box::new(ApproxMeasurer)
    } else {
        Box::new(SystemFontMeasurer::with_fallback())
    }
}

pub(crate) fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars()
        .filter(|ch| *ch != '\n')
        .map(char_width_factor)
        .sum::<f32>()
        * font_size
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    // Advance widths per em at a 16px baseline for the default font stack.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' | '\'' => {
            0.321
        }
        '-' => 0.375,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}

struct FontCatalog {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl FontCatalog {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn face(&mut self, font_family: &str) -> Result<&mut FontFace, MeasureError> {
        let family_key = normalize_family_key(font_family);
        if !self.cache.contains_key(&family_key) {
            let face = self.load_face(font_family);
            if face.is_none() {
                log::warn!("no system font matches `{font_family}`");
            }
            self.cache.insert(family_key.clone(), face);
        }
        self.cache
            .get_mut(&family_key)
            .and_then(|face| face.as_mut())
            .ok_or(MeasureError::FontUnavailable(family_key))
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Result<f32, MeasureError> {
        let face = self.face(font_family)?;
        let normalized = text.replace('\t', "    ");
        Ok(face.measure_width(&normalized, font_size))
    }

    fn ascent_descent(&mut self, font_size: f32, font_family: &str) -> Result<f32, MeasureError> {
        let face = self.face(font_family)?;
        Ok(face.ascent_descent(font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let family_key = normalize_family_key(font_family);
        if let Some(face) = load_cached_face(&family_key) {
            return Some(face);
        }
        #[derive(Clone, Copy)]
        enum FamilyToken {
            Generic(fontdb::Family<'static>),
            Name(usize),
        }

        let mut names: Vec<String> = Vec::new();
        let mut order: Vec<FamilyToken> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => order.push(FamilyToken::Generic(Family::Serif)),
                "sans-serif" | "system-ui" | "ui-sans-serif" => {
                    order.push(FamilyToken::Generic(Family::SansSerif))
                }
                "monospace" | "ui-monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
                "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
                "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
                _ => {
                    order.push(FamilyToken::Name(names.len()));
                    names.push(raw.to_string());
                }
            }
        }
        if order.is_empty() {
            order.push(FamilyToken::Generic(Family::Serif));
        }

        let families: Vec<Family<'_>> = order
            .iter()
            .map(|token| match *token {
                FamilyToken::Generic(family) => family,
                FamilyToken::Name(idx) => Family::Name(names[idx].as_str()),
            })
            .collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
            log::debug!("loaded {} system font faces", self.db.len());
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<FontFace> = None;
        self.db.with_face_data(id, |data, index| {
            let bytes = data.to_vec();
            if let Some(face) = FontFace::new(bytes.clone(), index) {
                if let Some((font_path, meta_path)) = cache_paths(&family_key)
                    && !font_path.exists()
                {
                    if let Some(parent) = font_path.parent() {
                        let _ = fs::create_dir_all(parent);
                    }
                    let _ = fs::write(&font_path, &bytes);
                    let _ = fs::write(&meta_path, index.to_string());
                }
                loaded = Some(face);
            }
        });
        loaded
    }
}

/// Parsed metrics of one face. Glyph advances outside ASCII are resolved
/// lazily by re-parsing the retained font data.
struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let (units_per_em, ascender, descender, ascii_advances) = {
            let face = Face::parse(&data, index).ok()?;
            let mut advances = [0u16; 128];
            for byte in 0u8..=127 {
                if let Some(glyph_id) = face.glyph_index(byte as char) {
                    advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                }
            }
            (
                face.units_per_em().max(1),
                face.ascender(),
                face.descender(),
                advances,
            )
        };
        Some(Self {
            data,
            index,
            units_per_em,
            ascender,
            descender,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn ascent_descent(&self, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;
        (f32::from(self.ascender) - f32::from(self.descender)) * scale
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;
        let mut pending: Vec<char> = Vec::new();

        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            if ch.is_ascii() {
                let advance = self.ascii_advances[ch as usize];
                if advance == 0 {
                    width += fallback;
                } else {
                    width += f32::from(advance) * scale;
                }
                continue;
            }
            match self.advance_cache.get(&ch) {
                Some(Some(advance)) => width += f32::from(*advance) * scale,
                Some(None) => width += fallback,
                None => pending.push(ch),
            }
        }

        if !pending.is_empty() {
            let face = Face::parse(&self.data, self.index).ok();
            for ch in pending {
                let advance = face.as_ref().and_then(|face| {
                    let glyph = face.glyph_index(ch)?;
                    face.glyph_hor_advance(glyph)
                });
                self.advance_cache.insert(ch, advance);
                match advance {
                    Some(advance) => width += f32::from(advance) * scale,
                    None => width += fallback,
                }
            }
        }

        width.max(0.0)
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "serif".to_string()
    } else {
        trimmed.to_string()
    }
}

fn cache_paths(family_key: &str) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    family_key.hash(&mut hasher);
    let hash = hasher.finish();
    let dir = base.join("tlr").join("font-cache");
    let font_path = dir.join(format!("{hash:x}.font"));
    let meta_path = dir.join(format!("{hash:x}.meta"));
    Some((font_path, meta_path))
}

fn load_cached_face(family_key: &str) -> Option<FontFace> {
    let (font_path, meta_path) = cache_paths(family_key)?;
    if !font_path.exists() || !meta_path.exists() {
        return None;
    }
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    FontFace::new(bytes, index)
}
