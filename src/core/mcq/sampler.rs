//! Round sampling: draw a fixed-size set of distinct questions from a bank.

use rand::Rng;
use rand::seq::index;

use super::bank::Question;
use super::McqError;

/// Number of questions presented per MCQ round.
pub const DEFAULT_ROUND_SIZE: usize = 5;

/// Draw `count` distinct questions uniformly at random, without replacement.
///
/// The returned order is randomized as well. Call this fresh on every round
/// entry; the result must then stay fixed for the lifetime of that round
/// attempt.
pub fn sample_questions<R: Rng + ?Sized>(
    bank: &[Question],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Question>, McqError> {
    if bank.len() < count {
        return Err(McqError::BankTooSmall {
            available: bank.len(),
            requested: count,
        });
    }

    Ok(index::sample(rng, bank.len(), count)
        .iter()
        .map(|i| bank[i].clone())
        .collect())
}
