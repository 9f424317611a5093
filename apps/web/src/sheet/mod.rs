// Sheet parameters: the raw form, its ordered validation, and the SheetSpec
// handed to the layout engine.

pub mod models;
pub mod validation;

pub use models::{SheetForm, SheetSpec};
pub use validation::{validate_form, ValidationError};
