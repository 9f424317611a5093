// Rendering backends for laid-out sheets. Only PDF is produced today.

pub mod pdf;

pub use pdf::render_pdf;
