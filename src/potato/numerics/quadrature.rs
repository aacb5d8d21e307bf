//! Fixed 16-point Gauss–Legendre quadrature on `[-1, 1]`, rescaled to an
//! arbitrary interval. Used by the Uniform potato numerics to integrate the
//! Fox–Glynn Poisson kernel against the uniform firing-time density without
//! deriving a closed-form incomplete-gamma difference.

pub const NODES: [f64; 16] = [
    -0.9894009349916499,
    -0.9445750230732326,
    -0.8656312023878318,
    -0.7554044083550030,
    -0.6178762444026438,
    -0.4580167776572274,
    -0.2816035507792589,
    -0.0950125098376374,
    0.0950125098376374,
    0.2816035507792589,
    0.4580167776572274,
    0.6178762444026438,
    0.7554044083550030,
    0.8656312023878318,
    0.9445750230732326,
    0.9894009349916499,
];

pub const WEIGHTS: [f64; 16] = [
    0.0271524594117541,
    0.0622535239386479,
    0.0951585116824928,
    0.1246289712555339,
    0.1495959888165767,
    0.1691565193950025,
    0.1826034150449236,
    0.1894506104550685,
    0.1894506104550685,
    0.1826034150449236,
    0.1691565193950025,
    0.1495959888165767,
    0.1246289712555339,
    0.0951585116824928,
    0.0622535239386479,
    0.0271524594117541,
];

/// Nodes and weights rescaled from `[-1, 1]` to `[a, b]`, with weights
/// pre-divided by `(b - a)` since callers integrate an average density.
pub fn nodes_and_weights(a: f64, b: f64) -> Vec<(f64, f64)> {
    let half_width = (b - a) / 2.0;
    let mid = (a + b) / 2.0;
    NODES
        .iter()
        .zip(WEIGHTS.iter())
        .map(|(&x, &w)| (mid + half_width * x, w * half_width / (b - a)))
        .collect()
}
