//! Bisection Elo solver, a direct port of `original_source/app/core/elo.py`.

use super::{RatingInput, delta_coefficient};

/// `W(rating_j, scalar)`: expected win probability of a player rated `scalar`
/// against a player rated `rating_j` (`app/core/elo.py::expected_win_rate`).
fn expected_win_rate(rating_j: f64, scalar: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((scalar - rating_j) / 400.0))
}

/// Sum of `W(rating_j, scalar)` over the whole field.
fn sum_expected_win_rate(ratings: &[f64], scalar: f64) -> f64 {
    ratings.iter().map(|&r| expected_win_rate(r, scalar)).sum()
}

/// Bisection search over `[0, 4000]` for the rating `r` such that
/// `sum_expected_win_rate(ratings, r) == target`, 25 iterations, precision
/// 0.01 (`app/core/elo.py::binary_search_expected_rating`).
fn binary_search_expected_rating(ratings: &[f64], target: f64) -> f64 {
    let mut lo = 0.0f64;
    let mut hi = 4000.0f64;
    for _ in 0..25 {
        let mid = (lo + hi) / 2.0;
        if hi - lo < 0.01 {
            break;
        }
        if sum_expected_win_rate(ratings, mid) > target {
            // Higher rated -> lower expected win sum against the field, so
            // raising `mid` pushes the sum down; narrow toward the high side
            // when the sum is still above target.
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

/// Computes the delta vector for a contest field (`app/core/elo.py::elo_delta`).
///
/// `input.rank` must already reflect ties/placements (1-indexed); `input.rating`
/// is each participant's prior rating; `input.attended_count` is each
/// participant's prior attended-contest count.
pub fn elo_delta(input: &RatingInput) -> Vec<f64> {
    let n = input.len();
    if n == 0 {
        return Vec::new();
    }
    let mut deltas = Vec::with_capacity(n);
    for i in 0..n {
        let expected_rank = sum_expected_win_rate(&input.rating, input.rating[i]) + 0.5;
        let mean_rank = (expected_rank * input.rank[i]).sqrt();
        // Solve for the rating whose expected-rank would equal mean_rank - 1.
        let target = mean_rank - 1.0;
        let expected_rating = binary_search_expected_rating(&input.rating, target);
        let raw_delta = expected_rating - input.rating[i];
        deltas.push(raw_delta * delta_coefficient(input.attended_count[i]));
    }
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_field(n: usize) -> RatingInput {
        // Ranks 1..=n, ratings spread around 1500, attended counts spanning
        // the f(k) clamp boundary at k=100.
        let rank: Vec<f64> = (1..=n).map(|r| r as f64).collect();
        let rating: Vec<f64> = (0..n)
            .map(|i| 1200.0 + (i as f64) * (800.0 / n as f64))
            .collect();
        let attended_count: Vec<u32> = (0..n)
            .map(|i| if i % 2 == 0 { 5 } else { 150 })
            .collect();
        RatingInput {
            rank,
            rating,
            attended_count,
        }
    }

    #[test]
    fn top_rank_gains_rating_typical_field() {
        let input = synthetic_field(20);
        let deltas = elo_delta(&input);
        // Rank 1 (best placement) should gain, last place should lose.
        assert!(deltas[0] > 0.0);
        assert!(*deltas.last().unwrap() < 0.0);
    }

    #[test]
    fn better_rank_never_yields_worse_delta_for_equal_rating() {
        // Two participants with identical prior rating; the better-ranked one
        // must not end up with a strictly worse delta.
        let input = RatingInput {
            rank: vec![1.0, 2.0, 3.0],
            rating: vec![1500.0, 1500.0, 1500.0],
            attended_count: vec![10, 10, 10],
        };
        let deltas = elo_delta(&input);
        assert!(deltas[0] >= deltas[1]);
        assert!(deltas[1] >= deltas[2]);
    }

    #[test]
    fn empty_field_yields_empty_deltas() {
        let input = RatingInput {
            rank: vec![],
            rating: vec![],
            attended_count: vec![],
        };
        assert!(elo_delta(&input).is_empty());
    }
}
