use bytes::Bytes;
use tracing::warn;

use super::Meal;

const CAPRESE_SALAD: &[u8] = include_bytes!("../../assets/caprese_salad.png");
const CHICKEN_POTATOES: &[u8] = include_bytes!("../../assets/chicken_potatoes.png");
const PASTA_MEATBALLS: &[u8] = include_bytes!("../../assets/pasta_meatballs.png");

const SAMPLES: [(&str, &[u8], i64); 3] = [
    ("Caprese Salad", CAPRESE_SALAD, 2),
    ("Chicken & Potatoes", CHICKEN_POTATOES, 4),
    ("Pasta with Meatballs", PASTA_MEATBALLS, 3),
];

// every entry must pass the record invariant; a bad constant fails the build
const _: () = {
    let mut i = 0;
    while i < SAMPLES.len() {
        assert!(!SAMPLES[i].0.is_empty(), "sample meal needs a name");
        assert!(SAMPLES[i].2 >= 0, "sample meal rating must not be negative");
        i += 1;
    }
};

/// Built-in meals shown when nothing has been saved yet.
pub fn sample_meals() -> Vec<Meal> {
    SAMPLES
        .into_iter()
        .filter_map(
            |(name, photo, rating)| match Meal::new(name, Some(Bytes::from_static(photo)), rating) {
                Ok(meal) => Some(meal),
                Err(e) => {
                    warn!(meal = name, error = %e, "dropping invalid sample meal");
                    None
                }
            },
        )
        .collect()
}
