pub mod codec;
pub mod draft;
mod record;
pub mod samples;

pub use draft::MealDraft;
pub use record::{validate, Meal};
