use bytes::Bytes;

use super::{validate, Meal};
use crate::error::ValidationError;
use crate::rating::StarRating;

pub const NEW_MEAL_TITLE: &str = "New Meal";

/// Live field values of the meal detail form.
///
/// `can_save` and `build` share [`validate`], so the save action is enabled
/// exactly when `build` would succeed.
#[derive(Debug, Clone)]
pub struct MealDraft {
    name: String,
    photo: Option<Bytes>,
    rating: StarRating,
    max_rating: Option<i64>,
    editing_name: bool,
}

impl MealDraft {
    pub fn new(max_rating: Option<i64>) -> Self {
        Self {
            name: String::new(),
            photo: None,
            rating: StarRating::default(),
            max_rating,
            editing_name: false,
        }
    }

    pub fn from_meal(meal: &Meal, max_rating: Option<i64>) -> Self {
        let mut rating = StarRating::default();
        rating.set_value(meal.rating());
        Self {
            name: meal.name().to_owned(),
            photo: meal.photo().cloned(),
            rating,
            max_rating,
            editing_name: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn photo(&self) -> Option<&Bytes> {
        self.photo.as_ref()
    }

    pub fn rating(&self) -> &StarRating {
        &self.rating
    }

    pub fn rating_mut(&mut self) -> &mut StarRating {
        &mut self.rating
    }

    pub fn title(&self) -> &str {
        if self.name.is_empty() {
            NEW_MEAL_TITLE
        } else {
            &self.name
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_photo(&mut self, photo: Option<Bytes>) {
        self.photo = photo;
    }

    /// Saving is blocked while the name field is being edited.
    pub fn begin_editing_name(&mut self) {
        self.editing_name = true;
    }

    pub fn end_editing_name(&mut self, text: impl Into<String>) {
        self.name = text.into();
        self.editing_name = false;
    }

    pub fn check(&self) -> Result<(), ValidationError> {
        validate(&self.name, self.rating.value(), self.max_rating)
    }

    pub fn can_save(&self) -> bool {
        !self.editing_name && self.check().is_ok()
    }

    pub fn build(&self) -> Result<Meal, ValidationError> {
        Meal::bounded(
            self.name.clone(),
            self.photo.clone(),
            self.rating.value(),
            self.max_rating,
        )
    }
}
