//! Color parsing: single-character codes and tuples.

use vista_engine::paint::Color;

use crate::error::{Result, VistaError};

/// Color of a one-letter code (`r g b c m y k w`).
pub fn from_code(code: char) -> Option<Color> {
    let c = match code {
        'r' => Color::rgb(1.0, 0.0, 0.0),
        'g' => Color::rgb(0.0, 1.0, 0.0),
        'b' => Color::rgb(0.0, 0.0, 1.0),
        'c' => Color::rgb(0.0, 1.0, 1.0),
        'm' => Color::rgb(1.0, 0.0, 1.0),
        'y' => Color::rgb(1.0, 1.0, 0.0),
        'k' => Color::BLACK,
        'w' => Color::WHITE,
        _ => return None,
    };
    Some(c)
}

/// Color from an RGB or RGBA tuple in `[0, 1]`.
pub fn from_tuple(values: &[f32]) -> Result<Color> {
    if !matches!(values.len(), 3 | 4) {
        return Err(VistaError::invalid(format!("a color needs 3 or 4 components, got {}", values.len())));
    }
    if let Some(v) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
        return Err(VistaError::OutOfRange(format!("color component {v} outside [0, 1]")));
    }
    let a = values.get(3).copied().unwrap_or(1.0);
    Ok(Color::new(values[0], values[1], values[2], a))
}

/// Parses a one-letter code.
pub fn parse(text: &str) -> Result<Color> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => from_code(c).ok_or_else(|| VistaError::invalid(format!("unknown color code {c:?}"))),
        _ => Err(VistaError::invalid(format!("unknown color {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!(parse("r").unwrap(), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(parse("k").unwrap(), Color::BLACK);
        assert!(parse("q").is_err());
        assert!(parse("red").is_err());
    }

    #[test]
    fn tuples() {
        assert_eq!(from_tuple(&[0.5, 0.5, 0.5]).unwrap().a, 1.0);
        assert_eq!(from_tuple(&[0.0, 0.0, 0.0, 0.25]).unwrap().a, 0.25);
        assert!(matches!(from_tuple(&[1.0, 2.0, 0.0]), Err(VistaError::OutOfRange(_))));
        assert!(matches!(from_tuple(&[1.0]), Err(VistaError::InvalidArgument(_))));
    }
}
