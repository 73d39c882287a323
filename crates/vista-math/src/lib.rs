//! Value types for the **vista** visualization stack.
//!
//! This crate is intentionally dependency-free so host-side data pipelines
//! can build points, pointsets and anisotropic arrays without pulling in any
//! engine or GPU code.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`aarray`] | `Aarray`, `SliceArg`, `Scalar` |
//! | [`error`] | `MathError` |
//! | [`point`] | `Point` |
//! | [`pointset`] | `Pointset` |
//! | [`quaternion`] | `Quaternion` |
//! | [`range`] | `Range` |
//!
//! # Quick start
//!
//! ```rust
//! use vista_math::{Aarray, Point};
//!
//! let a = Aarray::with_geometry(vec![0u8, 1, 2, 3], vec![2, 2], vec![0.5, 0.5], vec![0.0, 0.0])
//!     .unwrap();
//! assert_eq!(a.sample(Point::new2(0.5, 0.0)).unwrap(), 1);
//! ```

pub mod aarray;
pub mod error;
pub mod point;
pub mod pointset;
pub mod quaternion;
pub mod range;

pub use aarray::{Aarray, Scalar, SliceArg};
pub use error::MathError;
pub use point::Point;
pub use pointset::Pointset;
pub use quaternion::Quaternion;
pub use range::Range;
