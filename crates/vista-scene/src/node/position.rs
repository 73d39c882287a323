//! Widget position records.
//!
//! A position is four independent fields `(x, y, w, h)`. A raw value with
//! magnitude below 1 (and not 0) is a fraction of the parent's size, any
//! other value is in pixels. Negative `x`/`y` place the widget's far edge
//! that far from the parent's right/bottom edge; negative `w`/`h` are
//! subtracted from the parent's size.

use std::cell::Cell;

use vista_engine::coords::Rect;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Field {
    Pixels(f32),
    Fraction(f32),
}

impl Field {
    pub fn from_raw(v: f32) -> Self {
        if v != 0.0 && v.abs() < 1.0 { Field::Fraction(v) } else { Field::Pixels(v) }
    }

    pub fn is_fraction(self) -> bool {
        matches!(self, Field::Fraction(_))
    }

    /// Value in pixels against a parent extent, before the negative rules.
    fn scaled(self, parent: f32) -> f32 {
        match self {
            Field::Pixels(v) => v,
            Field::Fraction(f) => f * parent,
        }
    }
}

/// Position record of a widget with its cached pixel forms.
///
/// The caches are filled on first query and cleared by the scene when the
/// record or an ancestor changes.
#[derive(Debug, Clone)]
pub struct Position {
    fields: [Field; 4],
    rel: Cell<Option<Rect>>,
    abs: Cell<Option<Rect>>,
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Position {
    /// Position from raw values, classifying each field by magnitude.
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::from_fields([Field::from_raw(x), Field::from_raw(y), Field::from_raw(w), Field::from_raw(h)])
    }

    pub fn from_fields(fields: [Field; 4]) -> Self {
        Self { fields, rel: Cell::new(None), abs: Cell::new(None) }
    }

    /// The whole parent.
    pub fn fill() -> Self {
        Self::from_fields([Field::Pixels(0.0), Field::Pixels(0.0), Field::Fraction(1.0), Field::Fraction(1.0)])
    }

    pub fn fields(&self) -> [Field; 4] {
        self.fields
    }

    /// Pixel rectangle relative to a parent of size `(pw, ph)`.
    pub fn resolve(&self, pw: f32, ph: f32) -> Rect {
        let [fx, fy, fw, fh] = self.fields;
        let mut w = fw.scaled(pw);
        let mut h = fh.scaled(ph);
        if w < 0.0 {
            w = (pw + w).max(0.0);
        }
        if h < 0.0 {
            h = (ph + h).max(0.0);
        }
        let mut x = fx.scaled(pw);
        let mut y = fy.scaled(ph);
        if x < 0.0 {
            x += pw - w;
        }
        if y < 0.0 {
            y += ph - h;
        }
        Rect::new(x, y, w, h)
    }

    pub(crate) fn cached_rel(&self) -> Option<Rect> {
        self.rel.get()
    }

    pub(crate) fn cached_abs(&self) -> Option<Rect> {
        self.abs.get()
    }

    pub(crate) fn store(&self, rel: Rect, abs: Rect) {
        self.rel.set(Some(rel));
        self.abs.set(Some(abs));
    }

    pub(crate) fn invalidate(&self) {
        self.rel.set(None);
        self.abs.set(None);
    }
}
