//! Statistical distributions built on [`RandomSource::next_f64`].
//!
//! Every sampler only consumes uniform doubles in `(0, 1]`, so the
//! logarithms below never see zero.

use crate::{RandomError, RandomSource};
use std::f64::consts::PI;

fn positive(name: &'static str, value: f64) -> Result<f64, RandomError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(RandomError::InvalidParameter { name, value })
    }
}

/// Box-Muller transform, one output per pair of uniforms
fn standard_normal<R: RandomSource + ?Sized>(random: &mut R) -> f64 {
    let u1 = random.next_f64();
    let u2 = random.next_f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin()
}

/// Marsaglia-Tsang with unit scale; `shape` must already be validated
fn standard_gamma<R: RandomSource + ?Sized>(random: &mut R, shape: f64) -> f64 {
    if shape < 1.0 {
        // Boost to shape + 1 and correct with u^(1/shape)
        let w = random.next_f64();
        return standard_gamma(random, shape + 1.0) * w.powf(1.0 / shape);
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();

    loop {
        let (x, v) = loop {
            let x = standard_normal(random);
            let v = 1.0 + c * x;
            if v > 0.0 {
                break (x, v * v * v);
            }
        };

        let u = random.next_f64();
        if u < 1.0 - 0.0331 * x.powi(4) || u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
}

/// Distribution sampling for every random source
pub trait Distributions: RandomSource {
    /// Standard normal sample (mean 0, standard deviation 1)
    fn normal(&mut self) -> f64 {
        standard_normal(self)
    }

    fn normal_with(&mut self, mean: f64, standard_deviation: f64) -> Result<f64, RandomError> {
        let sd = positive("standard_deviation", standard_deviation)?;
        Ok(mean + sd * standard_normal(self))
    }

    /// Exponential sample with mean 1
    fn exponential(&mut self) -> f64 {
        -self.next_f64().ln()
    }

    fn exponential_with(&mut self, mean: f64) -> Result<f64, RandomError> {
        let mean = positive("mean", mean)?;
        Ok(-mean * self.next_f64().ln())
    }

    fn gamma(&mut self, shape: f64, scale: f64) -> Result<f64, RandomError> {
        let shape = positive("shape", shape)?;
        let scale = positive("scale", scale)?;
        Ok(standard_gamma(self, shape) * scale)
    }

    fn chi_squared(&mut self, degrees_of_freedom: f64) -> Result<f64, RandomError> {
        let dof = positive("degrees_of_freedom", degrees_of_freedom)?;
        Ok(standard_gamma(self, dof / 2.0) * 2.0)
    }

    fn inverse_gamma(&mut self, shape: f64, scale: f64) -> Result<f64, RandomError> {
        let shape = positive("shape", shape)?;
        let scale = positive("scale", scale)?;
        Ok(scale / standard_gamma(self, shape))
    }

    fn weibull(&mut self, shape: f64, scale: f64) -> Result<f64, RandomError> {
        let shape = positive("shape", shape)?;
        let scale = positive("scale", scale)?;
        Ok(scale * (-self.next_f64().ln()).powf(1.0 / shape))
    }

    fn cauchy(&mut self, median: f64, scale: f64) -> Result<f64, RandomError> {
        let scale = positive("scale", scale)?;
        Ok(median + scale * (PI * (self.next_f64() - 0.5)).tan())
    }

    fn student_t(&mut self, degrees_of_freedom: f64) -> Result<f64, RandomError> {
        let dof = positive("degrees_of_freedom", degrees_of_freedom)?;
        let z = standard_normal(self);
        let chi_squared = standard_gamma(self, dof / 2.0) * 2.0;
        Ok(z / (chi_squared / dof).sqrt())
    }

    /// Laplace sample as an exponential magnitude with a random sign
    fn laplace(&mut self, mean: f64, scale: f64) -> Result<f64, RandomError> {
        let scale = positive("scale", scale)?;
        let magnitude = -scale * self.next_f64().ln();
        Ok(if self.next_bool() {
            mean + magnitude
        } else {
            mean - magnitude
        })
    }

    fn log_normal(&mut self, mu: f64, sigma: f64) -> Result<f64, RandomError> {
        Ok(self.normal_with(mu, sigma)?.exp())
    }

    fn beta(&mut self, a: f64, b: f64) -> Result<f64, RandomError> {
        let a = positive("a", a)?;
        let b = positive("b", b)?;
        let x = standard_gamma(self, a);
        let y = standard_gamma(self, b);
        Ok(x / (x + y))
    }
}

impl<R: RandomSource + ?Sized> Distributions for R {}
