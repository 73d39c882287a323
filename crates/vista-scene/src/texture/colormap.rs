//! Colormaps: lookup tables of exactly 256 RGBA entries.

use std::collections::BTreeMap;

use crate::error::{Result, VistaError};

pub const COLORMAP_SIZE: usize = 256;

/// Control points of one channel: `(position in [0, 1], value)`.
pub type Channel = Vec<(f32, f32)>;

/// Accepted colormap definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum ColormapSpec {
    /// RGB or RGBA tuples spread evenly over `[0, 1]`.
    Tuples(Vec<Vec<f32>>),
    /// Row-major `N×3` or `N×4` array.
    Array { values: Vec<f32>, columns: usize },
    /// Per-channel control points keyed by `r`, `g`, `b` and optionally `a`.
    Dict(BTreeMap<String, Channel>),
}

impl From<Vec<[f32; 3]>> for ColormapSpec {
    fn from(v: Vec<[f32; 3]>) -> Self {
        ColormapSpec::Tuples(v.into_iter().map(|c| c.to_vec()).collect())
    }
}

impl From<Vec<[f32; 4]>> for ColormapSpec {
    fn from(v: Vec<[f32; 4]>) -> Self {
        ColormapSpec::Tuples(v.into_iter().map(|c| c.to_vec()).collect())
    }
}

/// A resampled colormap.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    table: Vec<[f32; 4]>,
}

impl Default for Colormap {
    fn default() -> Self {
        Self::gray()
    }
}

/// Linear interpolation of evenly spaced `samples` at table entry `i`.
fn resample_even(samples: &[f32], i: usize) -> f32 {
    let n = samples.len();
    if n == 1 {
        return samples[0];
    }
    // Exact at the sample positions, so a 256-entry input maps onto itself.
    let x = (i * (n - 1)) as f32 / (COLORMAP_SIZE - 1) as f32;
    let i = (x.floor() as usize).min(n - 2);
    let f = x - i as f32;
    samples[i] * (1.0 - f) + samples[i + 1] * f
}

/// Linear interpolation through control points; clamps outside them.
fn resample_points(points: &[(f32, f32)], t: f32) -> f32 {
    let (first, last) = (points[0], points[points.len() - 1]);
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }
    for w in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (w[0], w[1]);
        if t >= x0 && t <= x1 {
            return if x1 > x0 { y0 + (y1 - y0) * (t - x0) / (x1 - x0) } else { y1 };
        }
    }
    last.1
}

fn step(i: usize) -> f32 {
    i as f32 / (COLORMAP_SIZE - 1) as f32
}

impl Colormap {
    pub fn new(spec: &ColormapSpec) -> Result<Self> {
        match spec {
            ColormapSpec::Tuples(rows) => Self::from_rows(rows.iter().map(|r| r.as_slice())),
            ColormapSpec::Array { values, columns } => {
                if !matches!(columns, 3 | 4) || values.is_empty() || values.len() % columns != 0 {
                    return Err(VistaError::invalid(format!(
                        "colormap array of {} values is not N×3 or N×4 (columns {columns})",
                        values.len()
                    )));
                }
                Self::from_rows(values.chunks_exact(*columns))
            }
            ColormapSpec::Dict(channels) => Self::from_dict(channels),
        }
    }

    fn from_rows<'a>(rows: impl Iterator<Item = &'a [f32]>) -> Result<Self> {
        let rows: Vec<[f32; 4]> = rows
            .map(|r| match r {
                [r, g, b] => Ok([*r, *g, *b, 1.0]),
                [r, g, b, a] => Ok([*r, *g, *b, *a]),
                other => Err(VistaError::invalid(format!("colormap entry {other:?} is not RGB or RGBA"))),
            })
            .collect::<Result<_>>()?;
        if rows.is_empty() {
            return Err(VistaError::invalid("colormap has no entries"));
        }
        let channel = |c: usize| rows.iter().map(|r| r[c]).collect::<Vec<f32>>();
        let chans = [channel(0), channel(1), channel(2), channel(3)];
        let table = (0..COLORMAP_SIZE)
            .map(|i| std::array::from_fn(|c| resample_even(&chans[c], i).clamp(0.0, 1.0)))
            .collect();
        Ok(Self { table })
    }

    fn from_dict(channels: &BTreeMap<String, Channel>) -> Result<Self> {
        if let Some(k) = channels.keys().find(|k| !matches!(k.as_str(), "r" | "g" | "b" | "a")) {
            return Err(VistaError::invalid(format!("colormap dict key {k:?} is not one of r, g, b, a")));
        }
        let mut points: [Channel; 4] = [vec![(0.0, 0.0)], vec![(0.0, 0.0)], vec![(0.0, 0.0)], vec![(0.0, 1.0)]];
        for (c, key) in ["r", "g", "b", "a"].iter().enumerate() {
            if let Some(list) = channels.get(*key) {
                if list.is_empty() {
                    return Err(VistaError::invalid(format!("colormap channel {key} has no control points")));
                }
                if list.iter().any(|(p, _)| !(0.0..=1.0).contains(p)) {
                    return Err(VistaError::OutOfRange(format!("colormap channel {key} has a position outside [0, 1]")));
                }
                let mut list = list.clone();
                list.sort_by(|a, b| a.0.total_cmp(&b.0));
                points[c] = list;
            }
        }
        let table = (0..COLORMAP_SIZE)
            .map(|i| std::array::from_fn(|c| resample_points(&points[c], step(i)).clamp(0.0, 1.0)))
            .collect();
        Ok(Self { table })
    }

    /// The 256 RGBA entries.
    pub fn table(&self) -> &[[f32; 4]] {
        &self.table
    }

    /// The table as a definition; feeding it back yields the same map.
    pub fn get_map(&self) -> ColormapSpec {
        ColormapSpec::from(self.table.clone())
    }

    /// Entry for a normalized value.
    pub fn lookup(&self, v: f32) -> [f32; 4] {
        let i = (v.clamp(0.0, 1.0) * (COLORMAP_SIZE - 1) as f32).round() as usize;
        self.table[i]
    }

    pub fn gray() -> Self {
        let table = (0..COLORMAP_SIZE).map(|i| {
            let v = step(i);
            [v, v, v, 1.0]
        });
        Self { table: table.collect() }
    }

    /// A named preset.
    pub fn preset(name: &str) -> Result<Self> {
        let rows: &[[f32; 3]] = match name {
            "gray" => return Ok(Self::gray()),
            "hot" => &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0]],
            "jet" => &[
                [0.0, 0.0, 0.5],
                [0.0, 0.0, 1.0],
                [0.0, 0.5, 1.0],
                [0.0, 1.0, 1.0],
                [0.5, 1.0, 0.5],
                [1.0, 1.0, 0.0],
                [1.0, 0.5, 0.0],
                [1.0, 0.0, 0.0],
                [0.5, 0.0, 0.0],
            ],
            "cool" => &[[0.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
            "copper" => &[[0.0, 0.0, 0.0], [1.0, 0.7812, 0.4975]],
            "bone" => &[[0.0, 0.0, 0.0], [0.3194, 0.3194, 0.4444], [0.6528, 0.7778, 0.7778], [1.0, 1.0, 1.0]],
            "summer" => &[[0.0, 0.5, 0.4], [1.0, 1.0, 0.4]],
            "winter" => &[[0.0, 0.0, 1.0], [0.0, 1.0, 0.5]],
            "autumn" => &[[1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
            "spring" => &[[1.0, 0.0, 1.0], [1.0, 1.0, 0.0]],
            "pink" => &[[0.1178, 0.0, 0.0], [0.7488, 0.6134, 0.6134], [0.9048, 0.9048, 0.7069], [1.0, 1.0, 1.0]],
            "hsv" => &[
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 1.0, 1.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
                [1.0, 0.0, 0.0],
            ],
            "viridis" => &[
                [0.267, 0.005, 0.329],
                [0.283, 0.141, 0.458],
                [0.254, 0.265, 0.530],
                [0.207, 0.372, 0.553],
                [0.164, 0.471, 0.558],
                [0.128, 0.567, 0.551],
                [0.135, 0.659, 0.518],
                [0.267, 0.749, 0.441],
                [0.478, 0.821, 0.318],
                [0.741, 0.873, 0.150],
                [0.993, 0.906, 0.144],
            ],
            _ => return Err(VistaError::invalid(format!("unknown colormap {name:?}"))),
        };
        Self::new(&ColormapSpec::from(rows.to_vec()))
    }

    pub const PRESETS: [&'static str; 13] = [
        "gray", "hot", "jet", "cool", "copper", "bone", "summer", "winter", "autumn", "spring", "pink", "hsv", "viridis",
    ];
}
