//! Software rendering for Rice.
//!
//! [`Raster`] is an in-memory ARGB [`Surface`](rice_core::Surface) with a
//! clip stack; [`draw`] holds the pixel helpers the widgets use to build
//! their images (gradients, nine-patch stretching, bilinear scaling and
//! gradient rounded rectangles).

pub mod draw;
pub mod raster;

pub use draw::*;
pub use raster::*;
