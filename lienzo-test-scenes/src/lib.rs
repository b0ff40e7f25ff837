pub mod expectations;
pub mod scene;

pub use expectations::{check_pixels, checksum, PixelExpectation};
pub use scene::{random_shapes, CANVAS_HEIGHT, CANVAS_WIDTH};
