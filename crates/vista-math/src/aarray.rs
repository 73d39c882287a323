//! Anisotropic N-D arrays.
//!
//! An [`Aarray`] is a row-major array plus a per-dimension `sampling`
//! (world units per element) and `origin` (world position of element 0).
//! Dimension order is array order (`[z, y, x]` for volumes); world points are
//! `(x, y, z)`, so every point conversion reverses the axes.

use crate::error::MathError;
use crate::point::Point;

/// Element types accepted at the texture boundary.
pub trait Scalar: Copy + Default + PartialOrd + core::fmt::Debug {
    fn to_f64(self) -> f64;
}

macro_rules! impl_scalar {
    ($($t:ty),*) => {
        $(impl Scalar for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, f32, f64);

impl Scalar for bool {
    #[inline]
    fn to_f64(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }
}

/// One entry of a slicing request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SliceArg {
    /// Keep the whole dimension.
    Full,
    /// Select one element; the dimension is dropped.
    Index(usize),
    /// `start..stop` with a positive step.
    Range { start: usize, stop: usize, step: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aarray<T> {
    data: Vec<T>,
    shape: Vec<usize>,
    sampling: Vec<f64>,
    origin: Vec<f64>,
}

impl<T: Scalar> Aarray<T> {
    /// Wraps `data` with unit sampling and zero origin.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> Result<Self, MathError> {
        let n = shape.len();
        Self::with_geometry(data, shape, vec![1.0; n], vec![0.0; n])
    }

    pub fn with_geometry(
        data: Vec<T>,
        shape: Vec<usize>,
        sampling: Vec<f64>,
        origin: Vec<f64>,
    ) -> Result<Self, MathError> {
        if shape.is_empty() {
            return Err(MathError::invalid("array must have at least one dimension"));
        }
        let count: usize = shape.iter().product();
        if count != data.len() {
            return Err(MathError::invalid(format!(
                "shape {shape:?} needs {count} elements, got {}",
                data.len()
            )));
        }
        let mut a = Self { data, shape, sampling: Vec::new(), origin: Vec::new() };
        a.set_sampling(sampling)?;
        a.set_origin(origin)?;
        Ok(a)
    }

    /// Zero-filled array.
    pub fn zeros(shape: Vec<usize>) -> Result<Self, MathError> {
        let count = shape.iter().product();
        Self::new(vec![T::default(); count], shape)
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn sampling(&self) -> &[f64] {
        &self.sampling
    }

    #[inline]
    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn set_sampling(&mut self, sampling: Vec<f64>) -> Result<(), MathError> {
        if sampling.len() != self.ndim() {
            return Err(MathError::invalid(format!(
                "sampling has {} entries for a {}-D array",
                sampling.len(),
                self.ndim()
            )));
        }
        if let Some(bad) = sampling.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(MathError::invalid(format!("sampling must be finite and > 0, got {bad}")));
        }
        self.sampling = sampling;
        Ok(())
    }

    pub fn set_origin(&mut self, origin: Vec<f64>) -> Result<(), MathError> {
        if origin.len() != self.ndim() {
            return Err(MathError::invalid(format!(
                "origin has {} entries for a {}-D array",
                origin.len(),
                self.ndim()
            )));
        }
        if let Some(bad) = origin.iter().find(|o| !o.is_finite()) {
            return Err(MathError::invalid(format!("origin must be finite, got {bad}")));
        }
        self.origin = origin;
        Ok(())
    }

    /// Flat offset of a full index, or `None` if any component is outside.
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.ndim() {
            return None;
        }
        let mut off = 0usize;
        for (i, (&ix, &n)) in index.iter().zip(&self.shape).enumerate() {
            if ix >= n {
                return None;
            }
            off = if i == 0 { ix } else { off * n + ix };
        }
        Some(off)
    }

    pub fn get(&self, index: &[usize]) -> Option<T> {
        self.offset(index).map(|o| self.data[o])
    }

    pub fn set(&mut self, index: &[usize], v: T) -> Result<(), MathError> {
        let o = self
            .offset(index)
            .ok_or_else(|| MathError::out_of_range(format!("index {index:?} for shape {:?}", self.shape)))?;
        self.data[o] = v;
        Ok(())
    }

    /// World position of the first element, as `(x, y, z)`.
    pub fn get_start(&self) -> Point {
        self.reversed_point(|d| self.origin[d])
    }

    /// World position one step past the last element in every dimension.
    pub fn get_end(&self) -> Point {
        self.reversed_point(|d| self.origin[d] + self.sampling[d] * self.shape[d] as f64)
    }

    /// World extent `sampling * shape`, as `(x, y, z)`.
    pub fn get_size(&self) -> Point {
        self.reversed_point(|d| self.sampling[d] * self.shape[d] as f64)
    }

    /// World position of an index.
    pub fn index_to_point(&self, index: &[usize]) -> Result<Point, MathError> {
        self.check_spatial()?;
        if index.len() != self.ndim() {
            return Err(MathError::invalid(format!(
                "index {index:?} does not match {}-D array",
                self.ndim()
            )));
        }
        Ok(self.reversed_point(|d| self.origin[d] + index[d] as f64 * self.sampling[d]))
    }

    /// Nearest index of a world point: `round((p - origin) / sampling)` per axis.
    pub fn point_to_index(&self, p: Point) -> Result<Vec<usize>, MathError> {
        self.check_spatial()?;
        let n = self.ndim();
        let mut out = Vec::with_capacity(n);
        for d in 0..n {
            let world = p.get(n - 1 - d);
            let f = ((world - self.origin[d]) / self.sampling[d]).round();
            if !(f >= 0.0 && f < self.shape[d] as f64) {
                return Err(MathError::out_of_range(format!(
                    "point {:?} lies outside the array along dimension {d}",
                    p.to_array()
                )));
            }
            out.push(f as usize);
        }
        Ok(out)
    }

    /// Nearest-neighbour lookup.
    pub fn sample(&self, p: Point) -> Result<T, MathError> {
        let ix = self.point_to_index(p)?;
        self.get(&ix)
            .ok_or_else(|| MathError::out_of_range(format!("index {ix:?}")))
    }

    /// Nearest-neighbour lookup with a fallback for points outside the array.
    pub fn sample_or(&self, p: Point, default: T) -> T {
        self.sample(p).unwrap_or(default)
    }

    /// Strided / reducing slice that keeps world coordinates consistent.
    ///
    /// Missing trailing arguments mean [`SliceArg::Full`].
    pub fn slice(&self, args: &[SliceArg]) -> Result<Aarray<T>, MathError> {
        if args.len() > self.ndim() {
            return Err(MathError::invalid(format!(
                "{} slice arguments for a {}-D array",
                args.len(),
                self.ndim()
            )));
        }
        // Per source dimension: the selected indices and whether the dim survives.
        let mut picks: Vec<Vec<usize>> = Vec::with_capacity(self.ndim());
        let mut shape = Vec::new();
        let mut sampling = Vec::new();
        let mut origin = Vec::new();
        for d in 0..self.ndim() {
            let n = self.shape[d];
            let arg = args.get(d).copied().unwrap_or(SliceArg::Full);
            match arg {
                SliceArg::Index(i) => {
                    if i >= n {
                        return Err(MathError::out_of_range(format!(
                            "index {i} >= {n} in dimension {d}"
                        )));
                    }
                    picks.push(vec![i]);
                }
                SliceArg::Full => {
                    picks.push((0..n).collect());
                    shape.push(n);
                    sampling.push(self.sampling[d]);
                    origin.push(self.origin[d]);
                }
                SliceArg::Range { start, stop, step } => {
                    if step == 0 {
                        return Err(MathError::invalid("slice step must be > 0"));
                    }
                    let stop = stop.min(n);
                    let start = start.min(stop);
                    let sel: Vec<usize> = (start..stop).step_by(step).collect();
                    shape.push(sel.len());
                    sampling.push(self.sampling[d] * step as f64);
                    origin.push(self.origin[d] + start as f64 * self.sampling[d]);
                    picks.push(sel);
                }
            }
        }
        let data = self.gather(&picks);
        if shape.is_empty() {
            // Every dimension was reduced: a 1-element 1-D array.
            return Aarray::new(data, vec![1]);
        }
        Aarray::with_geometry(data, shape, sampling, origin)
    }

    /// Fancy indexing along one dimension. The result is a plain array
    /// (unit sampling, zero origin).
    pub fn take(&self, dim: usize, indices: &[usize]) -> Result<Aarray<T>, MathError> {
        if dim >= self.ndim() {
            return Err(MathError::invalid(format!("dimension {dim} of a {}-D array", self.ndim())));
        }
        if let Some(bad) = indices.iter().find(|&&i| i >= self.shape[dim]) {
            return Err(MathError::out_of_range(format!(
                "take index {bad} >= {} in dimension {dim}",
                self.shape[dim]
            )));
        }
        let picks: Vec<Vec<usize>> = (0..self.ndim())
            .map(|d| if d == dim { indices.to_vec() } else { (0..self.shape[d]).collect() })
            .collect();
        let mut shape = self.shape.clone();
        shape[dim] = indices.len();
        Aarray::new(self.gather(&picks), shape)
    }

    /// Boolean-mask selection over the flat data; anisotropy is dropped.
    pub fn masked(&self, mask: &[bool]) -> Result<Vec<T>, MathError> {
        if mask.len() != self.data.len() {
            return Err(MathError::invalid(format!(
                "mask of {} entries for {} elements",
                mask.len(),
                self.data.len()
            )));
        }
        Ok(self.data.iter().zip(mask).filter(|(_, m)| **m).map(|(v, _)| *v).collect())
    }

    /// Finite extrema of the data, `None` when nothing is finite.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in &self.data {
            let f = v.to_f64();
            if f.is_finite() {
                lo = lo.min(f);
                hi = hi.max(f);
            }
        }
        (lo <= hi).then_some((lo, hi))
    }

    /// Element-wise conversion that keeps shape and geometry.
    pub fn map<U: Scalar>(&self, f: impl Fn(T) -> U) -> Aarray<U> {
        Aarray {
            data: self.data.iter().map(|v| f(*v)).collect(),
            shape: self.shape.clone(),
            sampling: self.sampling.clone(),
            origin: self.origin.clone(),
        }
    }

    pub fn to_f32(&self) -> Aarray<f32> {
        self.map(|v| v.to_f64() as f32)
    }

    fn check_spatial(&self) -> Result<(), MathError> {
        if self.ndim() > 3 {
            return Err(MathError::invalid(format!(
                "point conversion needs at most 3 dimensions, array has {}",
                self.ndim()
            )));
        }
        Ok(())
    }

    fn reversed_point(&self, f: impl Fn(usize) -> f64) -> Point {
        let n = self.ndim().min(3);
        let mut v = [0.0; 3];
        for (i, slot) in v.iter_mut().enumerate().take(n) {
            *slot = f(n - 1 - i);
        }
        match n {
            1 => Point::from_slice(&v[..1]),
            2 => Point::new2(v[0], v[1]),
            _ => Point::new(v[0], v[1], v[2]),
        }
    }

    fn gather(&self, picks: &[Vec<usize>]) -> Vec<T> {
        let total: usize = picks.iter().map(Vec::len).product();
        let mut out = Vec::with_capacity(total);
        if total == 0 {
            return out;
        }
        let mut cursor = vec![0usize; picks.len()];
        let mut index = vec![0usize; picks.len()];
        loop {
            for (d, c) in cursor.iter().enumerate() {
                index[d] = picks[d][*c];
            }
            if let Some(o) = self.offset(&index) {
                out.push(self.data[o]);
            }
            // Odometer increment, last dimension fastest.
            let mut d = picks.len();
            loop {
                if d == 0 {
                    return out;
                }
                d -= 1;
                cursor[d] += 1;
                if cursor[d] < picks[d].len() {
                    break;
                }
                cursor[d] = 0;
            }
        }
    }
}
