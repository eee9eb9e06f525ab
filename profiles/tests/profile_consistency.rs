//! Cross-instance consistency of shared profile state.
//!
//! Instances that differ only in scale radius or flux share one cached
//! Info object, so every dimensionless derived quantity must agree
//! between them after undoing the scaling.

use approx::assert_relative_eq;
use ndarray::Array2;
use profiles::{fill_k_image, fill_x_image, AccuracyParams, SecondKick, Spergel};

#[test]
fn spergel_maxk_is_scale_invariant() {
    // Two instances with ν = 1.0 differing only in scale radius:
    // maxK·scaleRadius must be identical, because the dimensionless
    // Info-level maxK is shared.
    let params = AccuracyParams::shared_default();
    let a = Spergel::with_scale_radius(1.0, 1.0, 1.0, &params).unwrap();
    let b = Spergel::with_scale_radius(1.0, 5.0, 7.0, &params).unwrap();

    assert_relative_eq!(
        a.max_k() * a.scale_radius(),
        b.max_k() * b.scale_radius(),
        epsilon = 1e-14
    );
    assert_relative_eq!(
        a.step_k().unwrap() * a.scale_radius(),
        b.step_k().unwrap() * b.scale_radius(),
        epsilon = 1e-14
    );
    assert_relative_eq!(
        a.half_light_radius().unwrap() / a.scale_radius(),
        b.half_light_radius().unwrap() / b.scale_radius(),
        epsilon = 1e-14
    );
}

#[test]
fn spergel_surface_brightness_scales() {
    // x_value scales as flux/r0², k_value(0) is the flux.
    let params = AccuracyParams::shared_default();
    let unit = Spergel::with_scale_radius(0.5, 1.0, 1.0, &params).unwrap();
    let scaled = Spergel::with_scale_radius(0.5, 2.0, 6.0, &params).unwrap();

    for &(x, y) in &[(0.5, 0.0), (1.0, 1.0), (0.0, 3.0)] {
        assert_relative_eq!(
            scaled.x_value(x, y),
            6.0 / 4.0 * unit.x_value(x / 2.0, y / 2.0),
            max_relative = 1e-12
        );
    }
    assert_relative_eq!(scaled.k_value(0.0, 0.0), 6.0, epsilon = 1e-13);
}

#[test]
fn second_kick_scale_invariants() {
    let params = AccuracyParams::shared_default();
    let a = SecondKick::new(1.0, 2.0, 1.0, &params).unwrap();
    let b = SecondKick::new(0.25, 2.0, 4.0, &params).unwrap();

    assert_relative_eq!(
        a.max_k() * a.lam_over_r0(),
        b.max_k() * b.lam_over_r0(),
        epsilon = 1e-14
    );
    assert_relative_eq!(a.delta(), b.delta(), epsilon = 1e-15);
    assert_relative_eq!(
        a.half_light_radius() / a.lam_over_r0(),
        b.half_light_radius() / b.lam_over_r0(),
        epsilon = 1e-14
    );
    // The structure function lives in r0 units, untouched by the
    // angular scale.
    assert_relative_eq!(
        a.structure_function(0.7),
        b.structure_function(0.7),
        epsilon = 1e-15
    );
}

#[test]
fn rendered_image_conserves_flux() {
    // A wide, finely sampled grid of the Spergel profile should sum to
    // nearly the total flux.
    let params = AccuracyParams::shared_default();
    let flux = 2.5;
    let profile = Spergel::with_scale_radius(1.5, 1.0, flux, &params).unwrap();

    let n = 257;
    let extent = 30.0;
    let step = 2.0 * extent / (n - 1) as f64;
    let mut image = Array2::zeros((n, n));
    fill_x_image(&profile, &mut image, -extent, step, -extent, step);

    let pixel_sum: f64 = image.iter().sum::<f64>() * step * step;
    assert_relative_eq!(pixel_sum, flux, max_relative = 2e-2);
}

#[test]
fn fourier_grid_matches_pointwise_values() {
    let params = AccuracyParams::shared_default();
    let profile = SecondKick::new(0.5, 2.0, 1.0, &params).unwrap();

    let n = 33;
    let dk = 0.5;
    let k0 = -(n as f64 - 1.0) / 2.0 * dk;
    let mut image = Array2::zeros((n, n));
    fill_k_image(&profile, &mut image, k0, dk, k0, dk);

    let mid = (n - 1) / 2;
    assert_relative_eq!(image[(mid, mid)], 1.0, epsilon = 1e-12);
    for col in [0, 5, 20, n - 1] {
        let kx = k0 + col as f64 * dk;
        assert_relative_eq!(
            image[(mid, col)],
            profile.k_value(kx, 0.0),
            epsilon = 1e-14
        );
    }
}
