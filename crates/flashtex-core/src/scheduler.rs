//! SM-2 scheduling.
//!
//! Pure functions from (previous state, rating, today) to the next
//! [`ReviewState`]. Nothing here touches the filesystem; persisting the result
//! is the deck's job.

use chrono::NaiveDate;

use crate::error::DeckResult;
use crate::model::{EaseFactor, Rating, ReviewState};

/// Compute the next state for a raw rating.
///
/// Ratings outside 1..=5 fail with [`DeckError::InvalidRating`] and no state
/// is produced.
///
/// [`DeckError::InvalidRating`]: crate::error::DeckError::InvalidRating
pub fn next_state(
    current: Option<&ReviewState>,
    rating: i64,
    today: NaiveDate,
) -> DeckResult<ReviewState> {
    let rating = Rating::new(rating)?;
    Ok(schedule(current, rating, today))
}

/// Compute the next state for an already validated rating.
///
/// A card with no prior state starts from `repetitions = 0` and ease 2.50.
/// Interval growth on the third and later successes uses the ease factor the
/// card had *before* this review.
pub fn schedule(current: Option<&ReviewState>, rating: Rating, today: NaiveDate) -> ReviewState {
    let previous_ease = current.map_or(EaseFactor::INITIAL, |s| s.ease_factor);
    let previous_reps = current.map_or(0, |s| s.repetitions);
    let previous_interval = current.map_or(1, |s| s.interval_days);

    let (repetitions, interval_days) = if rating.is_success() {
        let repetitions = previous_reps.saturating_add(1);
        let interval = match repetitions {
            1 => 1,
            2 => 6,
            _ => scale_interval(previous_interval, previous_ease),
        };
        (repetitions, interval)
    } else {
        (0, 1)
    };

    ReviewState {
        last_review_date: today,
        interval_days,
        ease_factor: adjust_ease(previous_ease, rating),
        repetitions,
    }
}

/// `ease + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))`, floored at 1.30.
///
/// In hundredths the adjustment is `10 - d * (8 + 2d)` with `d = 5 - q`, which
/// keeps the arithmetic exact.
pub fn adjust_ease(ease: EaseFactor, rating: Rating) -> EaseFactor {
    let d = 5 - i64::from(rating.value());
    let delta = 10 - d * (8 + 2 * d);
    EaseFactor::from_hundredths(i64::from(ease.hundredths()) + delta)
}

/// `round(interval * ease)`, half away from zero, never below one day.
fn scale_interval(interval: u32, ease: EaseFactor) -> u32 {
    let scaled = (u64::from(interval) * u64::from(ease.hundredths()) + 50) / 100;
    u32::try_from(scaled.max(1)).unwrap_or(u32::MAX)
}
