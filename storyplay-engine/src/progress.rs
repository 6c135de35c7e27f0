//! Progress percentage computation
//!
//! Pure functions mapping a playback position to a 0-100 percentage. Each
//! chapter owns an equal share of the bar (`chapter_weight`), each line an
//! equal share of its chapter, and elapsed time interpolates linearly within
//! the current line.
//!
//! Boundary values are exact: the last line of chapter `c` ends at
//! `(c + 1) * chapter_weight` because it is computed as
//! `chapter_base + chapter_weight`, not via the per-line ratio. Sampling
//! cadence affects resolution only, never correctness.

/// Progress at the start of chapter `chapter_index`
pub fn chapter_base(chapter_index: usize, chapter_weight: f64) -> f64 {
    chapter_index as f64 * chapter_weight
}

/// Progress at the instant line `line_index` becomes visible
pub fn line_base(
    chapter_index: usize,
    line_index: usize,
    total_lines: usize,
    chapter_weight: f64,
) -> f64 {
    let base = chapter_base(chapter_index, chapter_weight);
    if total_lines == 0 {
        return base;
    }
    base + (line_index as f64 / total_lines as f64) * chapter_weight
}

/// Progress at the instant line `line_index` completes
///
/// For the last line this is exactly the next chapter's base.
pub fn line_end(
    chapter_index: usize,
    line_index: usize,
    total_lines: usize,
    chapter_weight: f64,
) -> f64 {
    if total_lines == 0 || line_index + 1 >= total_lines {
        return chapter_base(chapter_index + 1, chapter_weight);
    }
    chapter_base(chapter_index, chapter_weight)
        + ((line_index + 1) as f64 / total_lines as f64) * chapter_weight
}

/// Interpolated progress within line `line_index`, `elapsed_ms` after it
/// became visible
///
/// Monotonically non-decreasing in `elapsed_ms`; clamped so it never
/// overshoots the line's end value.
pub fn line_progress(
    chapter_index: usize,
    line_index: usize,
    elapsed_ms: u64,
    total_lines: usize,
    line_duration_ms: u64,
    chapter_weight: f64,
) -> f64 {
    let start = line_base(chapter_index, line_index, total_lines, chapter_weight);
    let end = line_end(chapter_index, line_index, total_lines, chapter_weight);

    if line_duration_ms == 0 {
        return end;
    }

    let ratio = (elapsed_ms as f64 / line_duration_ms as f64).clamp(0.0, 1.0);
    start + ratio * (end - start)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEIGHT: f64 = 25.0; // 4 chapters

    #[test]
    fn test_chapter_base_at_line_zero() {
        for c in 0..4 {
            assert_eq!(line_base(c, 0, 3, WEIGHT), c as f64 * WEIGHT);
            assert_eq!(line_progress(c, 0, 0, 3, 1000, WEIGHT), c as f64 * WEIGHT);
        }
    }

    #[test]
    fn test_last_line_end_is_exact_chapter_boundary() {
        // No floating drift allowed at chapter boundaries.
        for c in 0..4 {
            let end = line_end(c, 2, 3, WEIGHT);
            assert_eq!(end, (c + 1) as f64 * WEIGHT);
        }
        assert_eq!(line_end(3, 2, 3, WEIGHT), 100.0);
    }

    #[test]
    fn test_interpolation_midpoint() {
        // Chapter 0, line 0 of 2, halfway through a 1000ms line:
        // span is 0..12.5, midpoint 6.25.
        let p = line_progress(0, 0, 500, 2, 1000, WEIGHT);
        assert_eq!(p, 6.25);
    }

    #[test]
    fn test_elapsed_clamped_to_line_end() {
        let end = line_end(1, 1, 2, WEIGHT);
        let p = line_progress(1, 1, 10_000, 2, 1000, WEIGHT);
        assert_eq!(p, end);
        assert_eq!(p, 50.0);
    }

    #[test]
    fn test_monotonic_within_line() {
        let mut last = 0.0;
        for elapsed in (0..=1000).step_by(50) {
            let p = line_progress(0, 0, elapsed, 4, 1000, WEIGHT);
            assert!(p >= last, "progress regressed at {}ms", elapsed);
            last = p;
        }
    }

    #[test]
    fn test_empty_chapter_spans_full_weight() {
        assert_eq!(line_base(2, 0, 0, WEIGHT), 50.0);
        assert_eq!(line_end(2, 0, 0, WEIGHT), 75.0);
    }

    #[test]
    fn test_uneven_weight_sums_to_hundred() {
        // 3 chapters: weight is not representable exactly, but the final
        // boundary must still compute to 100.
        let weight = 100.0 / 3.0;
        let end = line_end(2, 4, 5, weight);
        assert!((end - 100.0).abs() < 1e-9);
    }
}
