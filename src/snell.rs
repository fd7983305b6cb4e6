//! Generalized Snell's law for complex refractive indices.
//!
//! Inside an absorbing layer the refraction angle is complex, so the engine
//! never works with angles directly: it carries the complex cosine of the
//! refraction angle, which is all the transfer matrices need.
//!
//! All internal angles are referenced to the left bounding medium (the
//! incidence medium), never to the neighbouring layer.

use crate::matrix::C64;


/// Complex cosine of the refraction angle in a layer of index `n2`, for a
/// plane wave incident at `theta_i` (radians) from the medium of index `n1`.
///
/// Uses the principal square root, `cos = sqrt(1 - (n1 / n2)^2 * sin^2(theta_i))`.
pub fn cos_theta_in_layer(n1: C64, n2: C64, theta_i: f64) -> C64 {
    let ratio = n1 / n2;
    (C64::new(1.0, 0.0) - ratio * ratio * theta_i.sin().powi(2)).sqrt()
}
