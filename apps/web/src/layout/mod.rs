// Sheet layout: pure geometry from a validated SheetSpec to draw commands.
// Logo decoding is the only I/O; callers run layout inside spawn_blocking.

pub mod commands;
pub mod engine;
pub mod font_metrics;
pub mod logo;

// Re-export the public API consumed by the renderer and handlers.
pub use commands::{DrawCommand, FontFace, LogoImage, TextAlign};
pub use engine::{layout_sheet, SheetLayout};
