//! Modulo-12 degree arithmetic.
//!
//! A position is a `(degree, octave)` pair whose absolute value is
//! `degree + 12 * octave`. Every function here returns the canonical split,
//! with `degree` in `0..12` and any overflow carried into `octave`.

/// Number of degrees in one octave.
pub const DEGREES_PER_OCTAVE: i32 = 12;

/// Splits an absolute degree into its canonical `(degree, octave)` pair.
///
/// # Examples
///
/// ```
/// use musicore::theory::degree::normalize;
///
/// assert_eq!(normalize(13), (1, 1));
/// assert_eq!(normalize(-1), (11, -1));
/// ```
pub fn normalize(abs_degree: i32) -> (i32, i32) {
    (
        abs_degree.rem_euclid(DEGREES_PER_OCTAVE),
        abs_degree.div_euclid(DEGREES_PER_OCTAVE),
    )
}

/// Returns the absolute degree of a `(degree, octave)` pair.
pub fn absolute(degree: i32, octave: i32) -> i32 {
    degree + DEGREES_PER_OCTAVE * octave
}

/// Adds two `(degree, octave)` pairs and normalizes the result.
///
/// Neither operand needs to be canonical: `(12, 0)` is treated the same as
/// `(0, 1)`.
pub fn add(a: (i32, i32), b: (i32, i32)) -> (i32, i32) {
    let (degree, carry) = normalize(a.0 + b.0);
    (degree, a.1 + b.1 + carry)
}
