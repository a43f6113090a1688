use base64ct::{Base64, Encoding};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use super::Meal;
use crate::error::DecodeError;

/// Newest archive layout this build writes and understands.
pub const ARCHIVE_VERSION: u32 = 1;

/// On-disk shape of a single meal. Photos travel as standard base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealWire {
    pub name: String,
    #[serde(default)]
    pub photo: Option<String>,
    pub rating: i64,
}

impl From<&Meal> for MealWire {
    fn from(m: &Meal) -> Self {
        Self {
            name: m.name().to_owned(),
            photo: m.photo().map(|p| Base64::encode_string(p)),
            rating: m.rating(),
        }
    }
}

impl MealWire {
    fn into_meal(self, index: usize) -> Result<Meal, DecodeError> {
        let photo = match self.photo {
            Some(b64) => Some(Bytes::from(
                Base64::decode_vec(&b64).map_err(|_| DecodeError::Photo)?,
            )),
            None => None,
        };
        Meal::new(self.name, photo, self.rating)
            .map_err(|reason| DecodeError::InvalidRecord { index, reason })
    }
}

#[derive(Serialize)]
struct ArchiveOut {
    version: u32,
    #[serde(with = "time::serde::rfc3339")]
    saved_at: OffsetDateTime,
    meals: Vec<MealWire>,
}

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default = "legacy_version")]
    version: u32,
}

#[derive(Deserialize)]
struct ArchiveIn {
    #[serde(default, with = "time::serde::rfc3339::option")]
    saved_at: Option<OffsetDateTime>,
    meals: Vec<MealWire>,
}

fn legacy_version() -> u32 {
    1
}

pub fn encode_meal(meal: &Meal) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&MealWire::from(meal))
}

pub fn decode_meal(raw: &[u8]) -> Result<Meal, DecodeError> {
    let wire: MealWire = serde_json::from_slice(raw)?;
    wire.into_meal(0)
}

/// Encodes the full ordered collection as one archive document.
pub fn encode_archive(meals: &[Meal]) -> Result<Bytes, serde_json::Error> {
    let doc = ArchiveOut {
        version: ARCHIVE_VERSION,
        saved_at: OffsetDateTime::now_utc(),
        meals: meals.iter().map(MealWire::from).collect(),
    };
    serde_json::to_vec_pretty(&doc).map(Bytes::from)
}

/// Decodes an archive, rejecting it whole if any record fails validation.
pub fn decode_archive(raw: &[u8]) -> Result<Vec<Meal>, DecodeError> {
    let probe: VersionProbe = serde_json::from_slice(raw)?;
    if probe.version > ARCHIVE_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            found: probe.version,
            supported: ARCHIVE_VERSION,
        });
    }

    let doc: ArchiveIn = serde_json::from_slice(raw)?;
    debug!(version = probe.version, saved_at = ?doc.saved_at, count = doc.meals.len(), "archive decoded");

    doc.meals
        .into_iter()
        .enumerate()
        .map(|(i, w)| w.into_meal(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn single_meal_round_trips_with_photo() {
        let photo = Bytes::from_static(&[0u8, 1, 2, 254, 255]);
        let meal = Meal::new("Soup", Some(photo.clone()), 3).unwrap();

        let raw = encode_meal(&meal).unwrap();
        let back = decode_meal(&raw).unwrap();

        assert_eq!(back, meal);
        assert_eq!(back.photo(), Some(&photo));
    }

    #[test]
    fn missing_photo_decodes_as_absent() {
        let meal = decode_meal(br#"{"name":"Toast","rating":1}"#).unwrap();
        assert_eq!(meal.name(), "Toast");
        assert!(meal.photo().is_none());
    }

    #[test]
    fn missing_name_is_malformed() {
        let err = decode_meal(br#"{"rating":1}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn invalid_record_is_decode_failure() {
        let err = decode_meal(br#"{"name":"","rating":1}"#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidRecord {
                index: 0,
                reason: ValidationError::EmptyName
            }
        ));
    }

    #[test]
    fn bad_base64_photo_rejected() {
        let err = decode_meal(br#"{"name":"Toast","photo":"***","rating":1}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Photo));
    }

    #[test]
    fn archive_keeps_order_and_reports_bad_index() {
        let meals = vec![
            Meal::new("A", None, 1).unwrap(),
            Meal::new("B", Some(Bytes::from_static(b"img")), 2).unwrap(),
        ];
        let raw = encode_archive(&meals).unwrap();
        assert_eq!(decode_archive(&raw).unwrap(), meals);

        let raw = br#"{"version":1,"meals":[{"name":"ok","rating":1},{"name":"bad","rating":-2}]}"#;
        let err = decode_archive(raw).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidRecord {
                index: 1,
                reason: ValidationError::NegativeRating(-2)
            }
        ));
    }

    #[test]
    fn archive_without_version_is_treated_as_v1() {
        let meals = decode_archive(br#"{"meals":[{"name":"Old","rating":4}]}"#).unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].rating(), 4);
    }

    #[test]
    fn newer_archive_version_rejected() {
        let err = decode_archive(br#"{"version":99,"meals":[]}"#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnsupportedVersion {
                found: 99,
                supported: ARCHIVE_VERSION
            }
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            decode_archive(b"\x00\x01not json").unwrap_err(),
            DecodeError::Malformed(_)
        ));
    }
}
