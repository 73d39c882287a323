//! Tick unit selection, tick values and tick text.

use std::sync::OnceLock;

use vista_math::Range;

/// Iteration cap on tick generation.
pub const MAX_TICKS: usize = 1000;

/// Ascending `{10, 20, 25, 50} · 10^e` for `e` in `-10..=97`.
pub fn tick_units() -> &'static [f64] {
    static UNITS: OnceLock<Vec<f64>> = OnceLock::new();
    UNITS.get_or_init(|| {
        (-10..=97)
            .flat_map(|e| [10.0, 20.0, 25.0, 50.0].map(|m| format!("{m}e{e}").parse::<f64>().unwrap_or(m * 10f64.powi(e))))
            .collect()
    })
}

/// Unit table of the angular axis, in degrees.
pub const POLAR_UNITS: [f64; 9] = [1.0, 2.0, 3.0, 5.0, 6.0, 9.0, 18.0, 30.0, 45.0];

/// Smallest unit from `units` whose on-screen spacing reaches `min_pix`.
///
/// `world_len` is the ridge length in data units and `screen_len` its
/// length in pixels. `None` when nothing qualifies or the ridge is
/// degenerate.
pub fn pick_unit(units: &[f64], world_len: f64, screen_len: f64, min_pix: f64) -> Option<f64> {
    let world_len = world_len.abs();
    if !(world_len > 0.0) || !(screen_len > 0.0) || !world_len.is_finite() {
        return None;
    }
    let px_per_unit = screen_len / world_len;
    units.iter().copied().find(|&u| u * px_per_unit >= min_pix)
}

/// Minimum tick spacing for a dimension: doubled for x when the limits hold
/// five-digit magnitudes, since those labels are wide.
pub fn min_tick_pixels(base: f64, dim: usize, lim: Range) -> f64 {
    if dim == 0 && lim.min.abs().max(lim.max.abs()) >= 10_000.0 { 2.0 * base } else { base }
}

/// Multiples of `unit` inside `lim`, both ends included.
pub fn tick_values(lim: Range, unit: f64) -> Vec<f64> {
    let lim = lim.normalized();
    if !(unit > 0.0) || !(lim.range() > 0.0) {
        return Vec::new();
    }
    let first = (lim.min / unit).ceil() * unit;
    let last = (lim.max / unit).floor() * unit;
    let mut out = Vec::new();
    let mut count = 0usize;
    loop {
        let t = first + count as f64 * unit;
        if t >= last + unit / 2.0 || count >= MAX_TICKS {
            break;
        }
        // Snap accumulated error near zero.
        out.push(if t.abs() < unit * 1e-9 { 0.0 } else { t });
        count += 1;
    }
    out
}

/// Decimals every fixed-point label carries at least.
pub const FIXED_DECIMALS: usize = 4;

/// Shared number format of one axis' labels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickFormat {
    /// Fixed point with the given decimals.
    Fixed(usize),
    /// Scientific with the given mantissa decimals.
    Exp(usize),
}

/// Decimals needed to write `unit` exactly.
fn decimals(unit: f64) -> usize {
    let unit = unit.abs();
    for n in 0..=15usize {
        let scaled = unit * 10f64.powi(n as i32);
        if (scaled - scaled.round()).abs() <= 1e-6 * scaled.max(1.0) {
            return n;
        }
    }
    15
}

/// Chooses one format for all ticks of an axis: fixed point with at least
/// [`FIXED_DECIMALS`] decimals while the labels stay short, scientific
/// beyond that.
pub fn tick_format(unit: f64, values: &[f64]) -> TickFormat {
    let n = decimals(unit).max(FIXED_DECIMALS);
    let before = values
        .iter()
        .map(|v| format!("{:.0}", v.abs().trunc()).len() + usize::from(*v < 0.0))
        .max()
        .unwrap_or(1);
    if before + 1 + n <= 9 {
        return TickFormat::Fixed(n);
    }
    let exp = |v: f64| if v == 0.0 { 0 } else { v.abs().log10().floor() as i32 };
    let top = values.iter().map(|&v| exp(v)).max().unwrap_or(0);
    let mantissa = (top - exp(unit)).clamp(0, 6) as usize;
    TickFormat::Exp(mantissa)
}

/// Formats one tick; negative zero prints as zero.
pub fn format_tick(value: f64, format: TickFormat) -> String {
    let s = match format {
        TickFormat::Fixed(n) => format!("{value:.n$}"),
        TickFormat::Exp(n) => format!("{value:.n$e}"),
    };
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().take_while(|c| *c != 'e').all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => s,
    }
}

/// Values and labels for one axis dimension.
pub fn tick_texts(values: &[f64], unit: f64) -> Vec<String> {
    let fmt = tick_format(unit, values);
    values.iter().map(|&v| format_tick(v, fmt)).collect()
}

/// User override of the generated ticks.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TickSpec {
    #[default]
    Auto,
    /// Positions with generated text.
    Values(Vec<f64>),
    /// Texts at positions `0, 1, 2, ...`.
    Labels(Vec<String>),
    /// Explicit value to text pairs.
    Map(Vec<(f64, String)>),
}

impl TickSpec {
    /// Ticks inside `lim`; `None` means generate automatically.
    pub fn resolve(&self, lim: Range) -> Option<Vec<(f64, String)>> {
        let lim = lim.normalized();
        let inside = |v: f64| v >= lim.min && v <= lim.max;
        let pairs: Vec<(f64, String)> = match self {
            TickSpec::Auto => return None,
            TickSpec::Values(vals) => {
                let unit = vals.windows(2).map(|w| (w[1] - w[0]).abs()).fold(f64::INFINITY, f64::min);
                let unit = if unit.is_finite() && unit > 0.0 { unit } else { 1.0 };
                let texts = tick_texts(vals, unit);
                vals.iter().copied().zip(texts).collect()
            }
            TickSpec::Labels(texts) => texts.iter().enumerate().map(|(i, t)| (i as f64, t.clone())).collect(),
            TickSpec::Map(pairs) => pairs.clone(),
        };
        Some(pairs.into_iter().filter(|(v, _)| inside(*v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── units ─────────────────────────────────────────────────────────────

    #[test]
    fn unit_table_is_ascending() {
        let u = tick_units();
        assert!(u.windows(2).all(|w| w[0] < w[1]));
        assert!(u.contains(&0.2));
        assert!(u.contains(&5e3));
    }

    #[test]
    fn smallest_unit_meeting_spacing() {
        // 400 px for one data unit: 0.1 gives 40 px.
        assert_eq!(pick_unit(tick_units(), 1.0, 400.0, 40.0), Some(0.1));
        assert_eq!(pick_unit(tick_units(), 1.0, 399.0, 40.0), Some(0.2));
    }

    #[test]
    fn degenerate_ridge_has_no_unit() {
        assert_eq!(pick_unit(tick_units(), 0.0, 400.0, 40.0), None);
        assert_eq!(pick_unit(tick_units(), 1.0, 0.0, 40.0), None);
        assert_eq!(pick_unit(&POLAR_UNITS, 360.0, 10.0, 40.0), None);
    }

    #[test]
    fn spacing_stays_within_four_minimums() {
        for screen in [40.0, 97.0, 333.0, 1234.0] {
            for world in [0.003, 1.0, 7.5, 12345.0] {
                let u = pick_unit(tick_units(), world, screen, 40.0).unwrap();
                let px = u * screen / world;
                assert!((40.0..160.0).contains(&px), "{px} for {world}/{screen}");
                let ticks = tick_values(Range::new(0.0, world), u);
                assert!(!ticks.is_empty());
            }
        }
    }

    #[test]
    fn wide_x_labels_double_the_spacing() {
        assert_eq!(min_tick_pixels(40.0, 0, Range::new(0.0, 20_000.0)), 80.0);
        assert_eq!(min_tick_pixels(40.0, 1, Range::new(0.0, 20_000.0)), 40.0);
    }

    // ── values ────────────────────────────────────────────────────────────

    #[test]
    fn values_include_both_multiples() {
        let v = tick_values(Range::new(0.0, 1.0001), 0.2);
        assert_eq!(v.len(), 6);
        assert!((v[5] - 1.0).abs() < 1e-12);
        assert_eq!(tick_values(Range::new(-0.5, 0.5), 0.5), vec![-0.5, 0.0, 0.5]);
    }

    #[test]
    fn zero_range_gives_nothing() {
        assert!(tick_values(Range::new(3.0, 3.0), 1.0).is_empty());
    }

    #[test]
    fn generation_is_capped() {
        assert_eq!(tick_values(Range::new(0.0, 1e6), 1.0).len(), MAX_TICKS);
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[test]
    fn fixed_format_keeps_trailing_zeros() {
        let v = tick_values(Range::new(0.0, 1.0001), 0.2);
        assert_eq!(tick_texts(&v, 0.2), vec!["0.0000", "0.2000", "0.4000", "0.6000", "0.8000", "1.0000"]);
        assert_eq!(tick_texts(&[0.25, 0.5], 0.25), vec!["0.2500", "0.5000"]);
        assert_eq!(tick_texts(&[0.0, 1e-5], 1e-5), vec!["0.00000", "0.00001"]);
    }

    #[test]
    fn negative_zero_prints_as_zero() {
        assert_eq!(format_tick(-0.0, TickFormat::Fixed(2)), "0.00");
        assert_eq!(format_tick(-1e-20, TickFormat::Fixed(1)), "0.0");
        assert_eq!(format_tick(-0.5, TickFormat::Fixed(1)), "-0.5");
    }

    #[test]
    fn long_numbers_switch_to_exponent() {
        let v = [0.0, 2e9, 4e9];
        assert_eq!(tick_format(2e9, &v), TickFormat::Exp(0));
        assert_eq!(tick_texts(&v, 2e9), vec!["0e0", "2e9", "4e9"]);
        assert_eq!(tick_format(1e-8, &[1e-8]), TickFormat::Exp(0));
    }

    // ── overrides ─────────────────────────────────────────────────────────

    #[test]
    fn overrides_resolve_inside_limits() {
        let lim = Range::new(0.0, 2.5);
        assert_eq!(TickSpec::Auto.resolve(lim), None);
        let labels = TickSpec::Labels(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        assert_eq!(labels.resolve(lim).unwrap(), vec![(0.0, String::from("a")), (1.0, String::from("b")), (2.0, String::from("c"))]);
        let vals = TickSpec::Values(vec![0.5, 1.0, 1.5]).resolve(lim).unwrap();
        assert_eq!(vals[0].1, "0.5000");
    }
}
