//! Batch evaluation of profiles onto pixel grids.
//!
//! The image-filling layer consumes profiles through the
//! [`RadialProfile`] trait (per-point real and Fourier values plus the
//! derived sampling bounds), and the fill functions here evaluate a
//! profile over a regular grid of coordinates, row-parallel via rayon.
//! Both families are axisymmetric with real transforms, so Fourier
//! grids are plain `f64` arrays.

use ndarray::Array2;
use rand::RngCore;
use rayon::prelude::*;

use profile_math::PhotonArray;

use crate::error::ProfileError;
use crate::second_kick::SecondKick;
use crate::spergel::Spergel;

/// The evaluation surface shared by every radially symmetric profile
/// family.
pub trait RadialProfile: Sync {
    /// Surface brightness at image coordinates `(x, y)`.
    fn x_value(&self, x: f64, y: f64) -> f64;

    /// Fourier-space value at `(kx, ky)`.
    fn k_value(&self, kx: f64, ky: f64) -> f64;

    /// Total flux.
    fn flux(&self) -> f64;

    /// Recommended Fourier sampling step.
    fn step_k(&self) -> Result<f64, ProfileError>;

    /// Recommended Fourier truncation frequency.
    fn max_k(&self) -> Result<f64, ProfileError>;

    /// Shoot `n` weighted photons from an external random source.
    fn shoot_photons(
        &self,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<PhotonArray, ProfileError>;
}

impl RadialProfile for Spergel {
    fn x_value(&self, x: f64, y: f64) -> f64 {
        Spergel::x_value(self, x, y)
    }

    fn k_value(&self, kx: f64, ky: f64) -> f64 {
        Spergel::k_value(self, kx, ky)
    }

    fn flux(&self) -> f64 {
        Spergel::flux(self)
    }

    fn step_k(&self) -> Result<f64, ProfileError> {
        Spergel::step_k(self)
    }

    fn max_k(&self) -> Result<f64, ProfileError> {
        Ok(Spergel::max_k(self))
    }

    fn shoot_photons(
        &self,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<PhotonArray, ProfileError> {
        self.shoot(n, rng)
    }
}

impl RadialProfile for SecondKick {
    fn x_value(&self, x: f64, y: f64) -> f64 {
        SecondKick::x_value(self, x, y)
    }

    fn k_value(&self, kx: f64, ky: f64) -> f64 {
        SecondKick::k_value(self, kx, ky)
    }

    fn flux(&self) -> f64 {
        SecondKick::flux(self)
    }

    fn step_k(&self) -> Result<f64, ProfileError> {
        Ok(SecondKick::step_k(self))
    }

    fn max_k(&self) -> Result<f64, ProfileError> {
        Ok(SecondKick::max_k(self))
    }

    fn shoot_photons(
        &self,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<PhotonArray, ProfileError> {
        self.shoot(n, rng)
    }
}

/// Fill `image[(row, col)]` with real-space values at
/// `(x0 + col·dx, y0 + row·dy)`.
pub fn fill_x_image<P: RadialProfile>(
    profile: &P,
    image: &mut Array2<f64>,
    x0: f64,
    dx: f64,
    y0: f64,
    dy: f64,
) {
    fill_grid(image, x0, dx, y0, dy, |x, y| profile.x_value(x, y));
}

/// Fill `image[(row, col)]` with Fourier-space values at
/// `(kx0 + col·dkx, ky0 + row·dky)`.
pub fn fill_k_image<P: RadialProfile>(
    profile: &P,
    image: &mut Array2<f64>,
    kx0: f64,
    dkx: f64,
    ky0: f64,
    dky: f64,
) {
    fill_grid(image, kx0, dkx, ky0, dky, |kx, ky| profile.k_value(kx, ky));
}

fn fill_grid<F>(image: &mut Array2<f64>, x0: f64, dx: f64, y0: f64, dy: f64, value: F)
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    let ncols = image.ncols();
    if ncols == 0 {
        return;
    }
    if let Some(slice) = image.as_slice_mut() {
        slice
            .par_chunks_mut(ncols)
            .enumerate()
            .for_each(|(row, out)| {
                let y = y0 + row as f64 * dy;
                for (col, v) in out.iter_mut().enumerate() {
                    *v = value(x0 + col as f64 * dx, y);
                }
            });
    } else {
        // Non-contiguous views fall back to serial indexed writes.
        for ((row, col), v) in image.indexed_iter_mut() {
            *v = value(x0 + col as f64 * dx, y0 + row as f64 * dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AccuracyParams;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_fill_x_image_matches_pointwise() {
        let params = AccuracyParams::shared_default();
        let profile = Spergel::with_scale_radius(0.5, 1.0, 2.0, &params).unwrap();

        let mut image = Array2::zeros((16, 21));
        fill_x_image(&profile, &mut image, -2.0, 0.2, -1.5, 0.2);

        for row in [0, 7, 15] {
            for col in [0, 10, 20] {
                let x = -2.0 + col as f64 * 0.2;
                let y = -1.5 + row as f64 * 0.2;
                assert_relative_eq!(
                    image[(row, col)],
                    profile.x_value(x, y),
                    epsilon = 1e-15
                );
            }
        }
    }

    #[test]
    fn test_fill_x_image_center_pixel_closed_form() {
        // A grid crossing the origin exactly picks up the explicit
        // central branch, here infinite for a cuspy index.
        let params = AccuracyParams::shared_default();
        let profile = Spergel::with_scale_radius(-0.3, 1.0, 1.0, &params).unwrap();

        let mut image = Array2::zeros((5, 5));
        fill_x_image(&profile, &mut image, -2.0, 1.0, -2.0, 1.0);
        assert!(image[(2, 2)].is_infinite());
        assert!(image[(2, 3)].is_finite());
    }

    #[test]
    fn test_fill_k_image_flux_at_origin() {
        let params = AccuracyParams::shared_default();
        let profile = Spergel::with_scale_radius(1.0, 1.5, 4.0, &params).unwrap();

        let mut image = Array2::zeros((9, 9));
        fill_k_image(&profile, &mut image, -1.0, 0.25, -1.0, 0.25);
        assert_relative_eq!(image[(4, 4)], 4.0, epsilon = 1e-13);
        // Axisymmetry on the grid
        assert_relative_eq!(image[(4, 0)], image[(0, 4)], epsilon = 1e-13);
    }

    #[test]
    fn test_trait_object_usability() {
        let params = AccuracyParams::shared_default();
        let spergel = Spergel::with_scale_radius(0.5, 1.0, 1.0, &params).unwrap();
        let profiles: Vec<&dyn RadialProfile> = vec![&spergel];
        for p in profiles {
            assert!(p.max_k().unwrap() > 0.0);
            assert!(p.step_k().unwrap() > 0.0);
            assert_relative_eq!(p.flux(), 1.0, epsilon = 1e-15);
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            let photons = p.shoot_photons(1000, &mut rng).unwrap();
            assert_eq!(photons.len(), 1000);
        }
    }

    #[test]
    fn test_second_kick_through_trait() {
        let params = AccuracyParams::shared_default();
        let sk = SecondKick::new(1.0, 2.0, 1.0, &params).unwrap();
        let p: &dyn RadialProfile = &sk;
        assert!(p.max_k().unwrap() > 0.0);
        assert_relative_eq!(p.k_value(0.0, 0.0), 1.0, epsilon = 1e-12);

        let mut image = Array2::zeros((8, 8));
        fill_x_image(&sk, &mut image, -2.0, 0.5, -2.0, 0.5);
        assert!(image.iter().all(|v| v.is_finite()));
    }
}
