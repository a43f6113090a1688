use bytes::Bytes;

use crate::error::ValidationError;

/// The validation gate shared by [`Meal::new`] and the edit form.
///
/// `max_rating` is the optional form-level cap; `None` checks only the
/// record invariant (non-empty name, non-negative rating).
pub fn validate(name: &str, rating: i64, max_rating: Option<i64>) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if rating < 0 {
        return Err(ValidationError::NegativeRating(rating));
    }
    if let Some(max) = max_rating {
        if rating > max {
            return Err(ValidationError::RatingTooHigh { rating, max });
        }
    }
    Ok(())
}

/// One meal entry. Fields are private so a `Meal` can only come out of
/// [`Meal::new`] (or the decoder, which goes through it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meal {
    name: String,
    photo: Option<Bytes>,
    rating: i64,
}

impl Meal {
    pub fn new(
        name: impl Into<String>,
        photo: Option<Bytes>,
        rating: i64,
    ) -> Result<Self, ValidationError> {
        Self::bounded(name, photo, rating, None)
    }

    /// Like [`Meal::new`] but also rejects ratings above `max_rating`.
    pub fn bounded(
        name: impl Into<String>,
        photo: Option<Bytes>,
        rating: i64,
        max_rating: Option<i64>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate(&name, rating, max_rating)?;
        Ok(Self {
            name,
            photo,
            rating,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn photo(&self) -> Option<&Bytes> {
        self.photo.as_ref()
    }

    pub fn rating(&self) -> i64 {
        self.rating
    }
}
