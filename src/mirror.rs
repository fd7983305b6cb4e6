//! Assembly of the mirror transfer matrix and the quantities derived from it.
//!
//! For every block the layer matrices are chained into a period matrix, each
//! new factor multiplied on the left together with the interface it crosses.
//! Repeated periods are folded in with a matrix power over the period and
//! its closing interface, then the interface with whatever precedes the
//! block is applied on the right. Blocks accumulate on the left, and the
//! interface into the right medium closes the product.

use std::sync::Arc;

use itertools::Itertools;
use log::trace;

use crate::error::{MirrorError, Result};
use crate::fresnel::interface;
use crate::layer::{Layer, LayerOptics};
use crate::matrix::{unary, TransferMatrix, TransferOps, C64};
use crate::metal::Materials;
use crate::result::Sample;
use crate::snell::cos_theta_in_layer;
use crate::state::{OpticalContext, Polarization, Regime};
use crate::structure::Structure;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::metal::{Drude, MetalModel};
    use crate::permittivity::EpsType;
    use crate::structure::Block;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn air() -> Layer {
        Layer::medium(C64::new(1.0, 0.0))
    }

    fn constant(d: f64, n: f64) -> Layer {
        Layer::ConstRefractiveIndex {
            d,
            n: C64::new(n, 0.0),
        }
    }

    fn mirror(blocks: Vec<Block>, left: Layer, right: Layer) -> Mirror {
        Mirror::new(Structure::new(blocks), left, right, Arc::new(Materials::default())).unwrap()
    }

    fn ctx(wavelength: f64, angle: f64, polarization: Polarization) -> OpticalContext {
        OpticalContext::new(wavelength, angle, polarization).unwrap()
    }

    fn assert_matrix_eq(a: &TransferMatrix, b: &TransferMatrix) {
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() <= 1e-10 * x.norm().max(1.0), "a: {}, b: {}", a, b);
        }
    }

    #[test]
    fn gaas_slab_golden_reflectance() {
        let gaas = Layer::GaAs {
            d: 100.0,
            eps_type: EpsType::Adachi,
        };
        let mirror = mirror(vec![Block::new(1, vec![gaas])], air(), air());
        let response = mirror.response(&ctx(600.0, 0.0, Polarization::S)).unwrap();
        assert!((response.reflectance - 0.58362152065577).abs() < 1e-6);
        assert_relative_eq!(response.absorbance, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn air_slab_is_invisible() {
        let mirror = mirror(vec![Block::new(1, vec![constant(250.0, 1.0)])], air(), air());
        for angle in [0.0, 30.0, 60.0, 85.0] {
            for polarization in [Polarization::S, Polarization::P] {
                let response = mirror.response(&ctx(532.0, angle, polarization)).unwrap();
                assert!(response.reflectance < 1e-20);
                assert_relative_eq!(response.transmittance, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn lossless_stack_conserves_energy() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..50 {
            let blocks = vec![
                Block::new(
                    rng.random_range(1..6),
                    vec![
                        constant(rng.random_range(10.0..200.0), rng.random_range(1.2..3.6)),
                        constant(rng.random_range(10.0..200.0), rng.random_range(1.2..3.6)),
                    ],
                ),
                Block::new(1, vec![constant(rng.random_range(10.0..200.0), 2.0)]),
            ];
            let mirror = mirror(blocks, air(), Layer::medium(C64::new(1.5, 0.0)));
            let angle = rng.random_range(0.0..80.0);
            let wavelength = rng.random_range(400.0..1200.0);
            for polarization in [Polarization::S, Polarization::P] {
                let response = mirror.response(&ctx(wavelength, angle, polarization)).unwrap();
                assert_relative_eq!(
                    response.reflectance + response.transmittance,
                    1.0,
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn single_slab_matches_airy_formula() {
        let n = C64::new(2.3, 0.0);
        let d = 180.0;
        let wavelength = 633.0;
        let mirror = mirror(vec![Block::new(1, vec![constant(d, n.re)])], air(), air());
        let response = mirror.response(&ctx(wavelength, 0.0, Polarization::S)).unwrap();

        let one = C64::new(1.0, 0.0);
        let r12 = (one - n) / (one + n);
        let r23 = -r12;
        let phase = (C64::i() * 4.0 * std::f64::consts::PI * n * d / wavelength).exp();
        let r = (r12 + r23 * phase) / (one + r12 * r23 * phase);
        assert_relative_eq!(response.reflectance, r.norm_sqr(), max_relative = 1e-12);
    }

    #[test]
    fn repeat_matches_explicit_copies() {
        let left = air();
        let right = Layer::medium(C64::new(3.0, 0.0));
        let layer = Layer::AlGaAs {
            d: 73.0,
            k: 0.02,
            x: 0.2,
            eps_type: EpsType::Adachi,
        };
        let c = ctx(850.0, 20.0, Polarization::P);
        for count in [1, 2, 5] {
            let repeated = mirror(vec![Block::new(count, vec![layer.clone()])], left.clone(), right.clone());
            let in_block = mirror(
                vec![Block::new(1, vec![layer.clone(); count])],
                left.clone(),
                right.clone(),
            );
            let as_blocks = mirror(
                vec![Block::new(1, vec![layer.clone()]); count],
                left.clone(),
                right.clone(),
            );
            let expected = repeated.matrix(&c).unwrap();
            assert_matrix_eq(&in_block.matrix(&c).unwrap(), &expected);
            assert_matrix_eq(&as_blocks.matrix(&c).unwrap(), &expected);
        }
    }

    #[test]
    fn repeated_period_matches_explicit_periods() {
        let period = vec![constant(60.0, 3.5), constant(80.0, 2.9)];
        let c = ctx(980.0, 35.0, Polarization::S);
        let repeated = mirror(vec![Block::new(4, period.clone())], air(), air());
        let explicit_layers: Vec<Layer> = (0..4).flat_map(|_| period.clone()).collect();
        let explicit = mirror(vec![Block::new(1, explicit_layers)], air(), air());
        assert_matrix_eq(&repeated.matrix(&c).unwrap(), &explicit.matrix(&c).unwrap());
    }

    #[test]
    fn cluster_sheet_in_host() {
        let host = Layer::GaAs {
            d: f64::INFINITY,
            eps_type: EpsType::Adachi,
        };
        let sheet = Layer::TwoDimensional {
            d: 8.0,
            k: 0.0,
            x: 0.0,
            lattice_factor: 2.5,
            eps_type: EpsType::Adachi,
            metal: MetalModel::Drude(Drude {
                eps_inf: 1.0,
                w_plasma: 9.0,
                gamma_plasma: 0.0,
            }),
        };
        let mirror = mirror(vec![Block::new(1, vec![sheet])], host.clone(), host);
        for polarization in [Polarization::S, Polarization::P] {
            let response = mirror.response(&ctx(1000.0, 40.0, polarization)).unwrap();
            assert!(response.reflectance > 0.0);
            assert_relative_eq!(
                response.reflectance + response.transmittance,
                1.0,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn material_regimes_need_single_layer() {
        let two = mirror(
            vec![Block::new(1, vec![constant(10.0, 2.0), constant(10.0, 3.0)])],
            air(),
            air(),
        );
        let c = ctx(600.0, 0.0, Polarization::S);
        assert_eq!(
            two.compute(Regime::RefractiveIndex, &c),
            Err(MirrorError::SingleLayerRegime {
                regime: "refractive_index".to_string(),
                layers: 2
            })
        );
        assert!(two.compute(Regime::Reflectance, &c).is_ok());

        let one = mirror(vec![Block::new(1, vec![constant(10.0, 2.0)])], air(), air());
        assert_eq!(
            one.compute(Regime::Permittivity, &c),
            Ok(Sample::Complex(C64::new(4.0, 0.0)))
        );
        assert_eq!(
            one.compute(Regime::ExtinctionCoefficient, &c),
            Err(MirrorError::NotAMieLayer("ConstRefractiveIndex".to_string()))
        );
    }

    #[test]
    fn rejects_invalid_structure() {
        let result = Mirror::new(Structure::default(), air(), air(), Arc::new(Materials::default()));
        assert!(matches!(result, Err(MirrorError::EmptyStructure)));
    }
}

/// Reflection and transmission of the whole mirror at one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Response {
    /// Amplitude reflection coefficient.
    pub r: C64,
    /// Amplitude transmission coefficient.
    pub t: C64,
    pub reflectance: f64,
    pub transmittance: f64,
    pub absorbance: f64,
}

/// A validated structure between two semi-infinite media.
#[derive(Debug, Clone)]
pub struct Mirror {
    structure: Structure,
    left: Layer,
    right: Layer,
    materials: Arc<Materials>,
}

impl Mirror {
    pub fn new(structure: Structure, left: Layer, right: Layer, materials: Arc<Materials>) -> Result<Self> {
        structure.validate()?;
        left.validate()?;
        right.validate()?;
        Ok(Self {
            structure,
            left,
            right,
            materials,
        })
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn materials(&self) -> &Materials {
        &self.materials
    }

    /// Refractive index and refraction cosine of a bounding medium.
    fn boundary(&self, medium: &Layer, ctx: &OpticalContext, n_left: C64) -> Result<(C64, C64)> {
        let n = medium.n(ctx, &self.materials)?;
        Ok((n, cos_theta_in_layer(n_left, n, ctx.angle)))
    }

    /// Transfer matrix of the whole mirror, from the left to the right medium.
    pub fn matrix(&self, ctx: &OpticalContext) -> Result<TransferMatrix> {
        let pol = ctx.polarization;
        let n_left = self.left.n(ctx, &self.materials)?;
        let (mut n_before, mut cos_before) = self.boundary(&self.left, ctx, n_left)?;
        let mut mirror = unary();

        for (index, block) in self.structure.blocks.iter().enumerate() {
            let optics = block
                .layers
                .iter()
                .map(|layer| layer.optics(ctx, &self.materials, n_left))
                .collect::<Result<Vec<LayerOptics>>>()?;
            let (first, last) = match (optics.first(), optics.last()) {
                (Some(first), Some(last)) => (*first, *last),
                _ => return Err(MirrorError::EmptyBlock(index)),
            };

            let mut period = first.matrix;
            for (prev, cur) in optics.iter().tuple_windows() {
                period = (cur.matrix * interface(prev.n, prev.cos_theta, cur.n, cur.cos_theta, pol)) * period;
            }
            if block.repeat > 1 {
                let exponent = u32::try_from(block.repeat - 1).map_err(|_| MirrorError::InvalidRepeat {
                    index,
                    repeat: block.repeat,
                })?;
                let closing = interface(last.n, last.cos_theta, first.n, first.cos_theta, pol);
                period = period * (closing * period).power(exponent);
            }
            period = period * interface(n_before, cos_before, first.n, first.cos_theta, pol);
            mirror = period * mirror;
            trace!("block {} (x{}) at {} nm: {}", index, block.repeat, ctx.wavelength, period);

            n_before = last.n;
            cos_before = last.cos_theta;
        }

        let (n_right, cos_right) = self.boundary(&self.right, ctx, n_left)?;
        Ok(interface(n_before, cos_before, n_right, cos_right, pol) * mirror)
    }

    /// Amplitudes, reflectance, transmittance and absorbance at one sample.
    pub fn response(&self, ctx: &OpticalContext) -> Result<Response> {
        let m = self.matrix(ctx)?;
        let r = -m[(1, 0)] / m[(1, 1)];
        let t = m.det() / m[(1, 1)];

        let n_left = self.left.n(ctx, &self.materials)?;
        let (n1, cos1) = self.boundary(&self.left, ctx, n_left)?;
        let (n2, cos2) = self.boundary(&self.right, ctx, n_left)?;
        let ratio = match ctx.polarization {
            Polarization::S => (n2 * cos2) / (n1 * cos1),
            Polarization::P => (n2 * cos1) / (n1 * cos2),
        };

        let reflectance = r.norm_sqr();
        let transmittance = ratio.norm() * t.norm_sqr();
        Ok(Response {
            r,
            t,
            reflectance,
            transmittance,
            absorbance: 1.0 - reflectance - transmittance,
        })
    }

    pub fn reflectance(&self, ctx: &OpticalContext) -> Result<f64> {
        Ok(self.response(ctx)?.reflectance)
    }

    pub fn transmittance(&self, ctx: &OpticalContext) -> Result<f64> {
        Ok(self.response(ctx)?.transmittance)
    }

    pub fn absorbance(&self, ctx: &OpticalContext) -> Result<f64> {
        Ok(self.response(ctx)?.absorbance)
    }

    /// Fails unless `regime` can be computed for this structure.
    pub fn check_regime(&self, regime: Regime) -> Result<()> {
        let layers = self.structure.layer_count();
        if regime.requires_single_layer() && layers != 1 {
            return Err(MirrorError::SingleLayerRegime {
                regime: regime.to_string(),
                layers,
            });
        }
        Ok(())
    }

    fn single_layer(&self, regime: Regime) -> Result<&Layer> {
        self.check_regime(regime)?;
        self.structure.first_layer().ok_or(MirrorError::EmptyStructure)
    }

    pub fn refractive_index(&self, ctx: &OpticalContext) -> Result<C64> {
        self.single_layer(Regime::RefractiveIndex)?.n(ctx, &self.materials)
    }

    pub fn permittivity(&self, ctx: &OpticalContext) -> Result<C64> {
        self.single_layer(Regime::Permittivity)?
            .permittivity(ctx, &self.materials)
    }

    /// Mie extinction coefficient in cm^-1.
    pub fn extinction_coefficient(&self, ctx: &OpticalContext) -> Result<f64> {
        let (extinction, _) = self
            .single_layer(Regime::ExtinctionCoefficient)?
            .mie_coefficients(ctx, &self.materials)?;
        Ok(extinction)
    }

    /// Mie scattering coefficient in cm^-1.
    pub fn scattering_coefficient(&self, ctx: &OpticalContext) -> Result<f64> {
        let (_, scattering) = self
            .single_layer(Regime::ScatteringCoefficient)?
            .mie_coefficients(ctx, &self.materials)?;
        Ok(scattering)
    }

    /// Value of `regime` at one sample.
    pub fn compute(&self, regime: Regime, ctx: &OpticalContext) -> Result<Sample> {
        Ok(match regime {
            Regime::Reflectance => Sample::Real(self.reflectance(ctx)?),
            Regime::Transmittance => Sample::Real(self.transmittance(ctx)?),
            Regime::Absorbance => Sample::Real(self.absorbance(ctx)?),
            Regime::Permittivity => Sample::Complex(self.permittivity(ctx)?),
            Regime::RefractiveIndex => Sample::Complex(self.refractive_index(ctx)?),
            Regime::ExtinctionCoefficient => Sample::Real(self.extinction_coefficient(ctx)?),
            Regime::ScatteringCoefficient => Sample::Real(self.scattering_coefficient(ctx)?),
        })
    }
}
