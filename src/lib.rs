//! # Lienzo
//!
//! Lienzo is a software (CPU) 2D vector graphics rendering library. It
//! ingests a tree of paints — shapes with fills and strokes, pictures,
//! nested scenes — and rasterizes them with analytic anti-aliasing
//! straight into a pixel buffer you own. No GPU, no window system, no
//! surface plumbing: hand it memory, get pixels back.
//!
//! ## Features
//!
//! - **Shape rendering**: paths with cubic Béziers, rects, circles and
//!   arcs, filled by non-zero or even-odd rule.
//! - **Strokes**: widths, butt/round/square caps, bevel/round/miter
//!   joins, dash patterns.
//! - **Fills**: solid colors, linear and radial gradients with pad,
//!   reflect and repeat spreads.
//! - **Compositing**: per-paint opacity plus alpha, inverse-alpha, luma,
//!   inverse-luma and clip-path masking, all premultiplied SRC-OVER.
//! - **Concurrency**: per-paint preparation runs on a worker pool sized
//!   at [`init`]; drawing joins lazily per paint.
//!
//! ## Getting Started
//!
//! ```toml
//! [dependencies]
//! lienzo = "0.4"
//! ```
//!
//! ### Basic Usage
//!
//! ```rust
//! use lienzo::{Canvas, Color, Colorspace, Shape};
//!
//! // One-time engine setup: 0 worker threads keeps everything inline.
//! lienzo::init(0).unwrap();
//!
//! // The canvas renders into any u32 buffer you provide.
//! let mut pixels = vec![0u32; 256 * 256];
//! let mut canvas = Canvas::new().unwrap();
//! canvas
//!     .target(&mut pixels, 256, 256, 256, Colorspace::Argb8888)
//!     .unwrap();
//!
//! // Build a paint and hand it to the canvas.
//! let mut circle = Shape::new();
//! circle.append_circle(128.0, 128.0, 80.0, 80.0).unwrap();
//! circle.fill(Color::rgb(30, 120, 220)).unwrap();
//! canvas.push(circle).unwrap();
//!
//! // The three-phase protocol: prepare, composite, barrier.
//! canvas.update().unwrap();
//! canvas.draw().unwrap();
//! canvas.sync().unwrap();
//!
//! lienzo::term().unwrap();
//! ```

mod animation;
mod canvas;
mod color;
mod engine;
mod error;
mod gradient;
mod loader;
mod math;
mod paint;
mod path;
mod picture;
mod raster;
mod renderer;
mod scene;
mod scheduler;
mod shape;
mod stroke;

pub use animation::Animation;
pub use canvas::Canvas;
pub use color::{Color, Colorspace};
pub use engine::{init, term, version};
pub use error::{Error, Result};
pub use gradient::{Brush, ColorStop, Gradient, SpreadMode};
pub use loader::{FileType, LoadModule};
pub use math::{Matrix, Point};
pub use paint::{Composite, CompositeMethod, Paint, PaintId, PaintKind};
pub use path::{Path, PathCommand};
pub use picture::{Bitmap, Picture};
pub use raster::{RectI, Span, SpanList, Surface, SwRenderer};
pub use renderer::Renderer;
pub use scene::Scene;
pub use shape::{FillRule, Shape};
pub use stroke::{DashPattern, Stroke, StrokeCap, StrokeJoin};
