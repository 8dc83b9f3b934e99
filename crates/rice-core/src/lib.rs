//! # Core types
//!
//! Everything the rest of Rice builds on, kept free of any widget or
//! layout policy:
//!
//! - [`Rect`], [`Insets`], [`Point`]: integer geometry on the pixel grid.
//! - [`Color`] and the `u32` ARGB helpers used by every pixel buffer.
//! - [`Image`]: an immutable, shareable ARGB raster.
//! - [`Surface`] and [`Font`]: the two seams a backend implements.
//! - [`LayoutError`] and [`ImageError`].
//!
//! ```rust
//! use rice_core::*;
//!
//! let mut r = Rect::new(0, 0, 10, 10);
//! r.union_with(&Rect::new(5, 5, 10, 10));
//! assert_eq!(r, Rect::new(0, 0, 15, 15));
//! ```

pub mod color;
pub mod error;
pub mod font;
pub mod geometry;
pub mod image;
pub mod render_api;

pub use color::*;
pub use error::*;
pub use font::*;
pub use geometry::*;
pub use self::image::*;
pub use render_api::*;
