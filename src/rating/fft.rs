//! FFT-accelerated Elo solver, a port of `original_source/app/core/fft.py`.
//!
//! Computes the same contract as [`super::elo::elo_delta`] but avoids the
//! O(n^2) pairwise `expected_win_rate` sums by convolving a quantized rating
//! histogram against a fixed kernel once, then doing O(1) lookups per
//! participant. Used for large contest fields where the bisection solver's
//! per-participant O(n) inner sum becomes the bottleneck.

use rustfft::FftPlanner;
use rustfft::num_complex::Complex64;

use super::{RatingInput, delta_coefficient};

const EXPAND_SIZE: f64 = 100.0;
const MAX_RATING: i64 = 400_000;

/// Quantizes ratings into an integer histogram over `[0, MAX_RATING]`
/// (`app/core/fft.py`'s `np.bincount(np.round(rating * EXPAND_SIZE))`).
fn bincount(ratings: &[f64]) -> Vec<f64> {
    let mut counts = vec![0.0; (MAX_RATING + 1) as usize];
    for &r in ratings {
        let bucket = (r * EXPAND_SIZE).round() as i64;
        let bucket = bucket.clamp(0, MAX_RATING) as usize;
        counts[bucket] += 1.0;
    }
    counts
}

/// Builds the symmetric kernel `f[i] = 1 / (1 + 10^(i / (400*EXPAND_SIZE)))`
/// for `i` in `[-MAX_RATING, MAX_RATING]`.
fn build_kernel() -> Vec<f64> {
    let len = (2 * MAX_RATING + 1) as usize;
    let mut kernel = vec![0.0; len];
    for offset in -MAX_RATING..=MAX_RATING {
        let exponent = offset as f64 / (400.0 * EXPAND_SIZE);
        kernel[(offset + MAX_RATING) as usize] = 1.0 / (1.0 + 10f64.powf(exponent));
    }
    kernel
}

/// Linear convolution of `a` and `b` via zero-padded complex FFT, returning
/// the first `out_len` samples.
fn convolve(a: &[f64], b: &[f64], out_len: usize) -> Vec<f64> {
    let conv_len = a.len() + b.len() - 1;
    let fft_len = conv_len.next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_len);
    let ifft = planner.plan_fft_inverse(fft_len);

    let mut fa: Vec<Complex64> = a
        .iter()
        .map(|&x| Complex64::new(x, 0.0))
        .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
        .take(fft_len)
        .collect();
    let mut fb: Vec<Complex64> = b
        .iter()
        .map(|&x| Complex64::new(x, 0.0))
        .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
        .take(fft_len)
        .collect();

    fft.process(&mut fa);
    fft.process(&mut fb);

    let mut product: Vec<Complex64> = fa.iter().zip(fb.iter()).map(|(x, y)| x * y).collect();
    ifft.process(&mut product);

    let scale = fft_len as f64;
    product
        .into_iter()
        .take(out_len)
        .map(|c| c.re / scale)
        .collect()
}

/// Integer bisection over `[0, MAX_RATING]` for the smallest `x` such that
/// `cumulative[x] + 1 >= target`, mirroring
/// `app/core/fft.py::binary_search_expected_rating`'s integer search.
fn bisect_cumulative(cumulative: &[f64], target: f64) -> i64 {
    let mut lo: i64 = 0;
    let mut hi: i64 = MAX_RATING;
    while lo < hi {
        let mid = (lo + hi) / 2;
        if cumulative[(mid + MAX_RATING) as usize] + 1.0 < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Computes the delta vector for a contest field using the FFT-accelerated
/// solver. Same contract as [`super::elo::elo_delta`]; should agree with it
/// within 0.05 per participant (SPEC_FULL.md §8).
pub fn elo_delta(input: &RatingInput) -> Vec<f64> {
    let n = input.len();
    if n == 0 {
        return Vec::new();
    }

    let histogram = bincount(&input.rating);
    let kernel = build_kernel();
    // `convolve` returns samples indexed by `x` in `[0, 2*MAX_RATING]`;
    // `cumulative[x]` corresponds to offset `x - MAX_RATING` from each rating
    // bucket, i.e. the sum of W(rating_j, x/EXPAND_SIZE) over the field.
    let cumulative = convolve(&kernel, &histogram, (2 * MAX_RATING + 1) as usize);

    let mut deltas = Vec::with_capacity(n);
    for i in 0..n {
        let bucket = (input.rating[i] * EXPAND_SIZE).round() as i64;
        let bucket = bucket.clamp(0, MAX_RATING);
        let expected_rank = cumulative[(bucket + MAX_RATING) as usize] + 0.5;
        let mean_rank = (expected_rank * input.rank[i]).sqrt();
        let target = mean_rank;
        let x = bisect_cumulative(&cumulative, target);
        let expected_rating = x as f64 / EXPAND_SIZE;
        let raw_delta = expected_rating - input.rating[i];
        deltas.push(raw_delta * delta_coefficient(input.attended_count[i]));
    }
    deltas
}
