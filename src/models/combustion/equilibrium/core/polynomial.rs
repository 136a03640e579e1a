//! Thermodynamic functions of a single species from its 9-coefficient polynomial.
//!
//! With `x = T·10⁻³` and coefficients `c[0..9]`, the model is
//!
//! ```text
//! H(T)  = 4.184 · (c1 + c2·x + c3·x² + … + c8·x⁷)                      J/mol
//! S°(T) = 4.184 · (c0 + 10⁻³·c2·ln x
//!                  + 10⁻³·(2·c3·x + 3/2·c4·x² + 4/3·c5·x³ + … + 7/6·c8·x⁶))  J/(mol·K)
//! cp(T) = dH/dT                                                         J/(mol·K)
//! ```
//!
//! The 4.184 factor converts calories to joules. All functions are pure and
//! evaluate their polynomials with Horner's method.

/// Calorie-to-joule conversion factor.
pub const CAL_TO_J: f64 = 4.184;

/// Universal gas constant, J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.314;

/// Standard-state pressure, Pa.
pub const STANDARD_PRESSURE: f64 = 101_325.0;

/// Polynomial coefficients of one species.
pub type Coefficients = [f64; 9];

/// Standard molar enthalpy at `temperature` (K), in J/mol.
#[must_use]
pub fn enthalpy(c: &Coefficients, temperature: f64) -> f64 {
    let x = temperature * 1e-3;
    let poly = c[8];
    let poly = poly * x + c[7];
    let poly = poly * x + c[6];
    let poly = poly * x + c[5];
    let poly = poly * x + c[4];
    let poly = poly * x + c[3];
    let poly = poly * x + c[2];
    let poly = poly * x + c[1];
    CAL_TO_J * poly
}

/// Molar entropy at `temperature` (K), in J/(mol·K).
///
/// A nonzero `partial_pressure` (Pa) converts the standard-state entropy into
/// the partial entropy of the species in a gas mixture. Zero means no
/// pressure correction, which is what condensed species use.
#[must_use]
pub fn entropy(c: &Coefficients, temperature: f64, partial_pressure: f64) -> f64 {
    let standard = standard_entropy(c, temperature);
    if partial_pressure == 0.0 {
        return standard;
    }
    standard - GAS_CONSTANT * (partial_pressure / STANDARD_PRESSURE).ln()
}

/// Molar isobaric heat capacity at `temperature` (K), in J/(mol·K).
#[must_use]
pub fn heat_capacity(c: &Coefficients, temperature: f64) -> f64 {
    let x = temperature * 1e-3;
    let poly = 7.0 * c[8];
    let poly = poly * x + 6.0 * c[7];
    let poly = poly * x + 5.0 * c[6];
    let poly = poly * x + 4.0 * c[5];
    let poly = poly * x + 3.0 * c[4];
    let poly = poly * x + 2.0 * c[3];
    let poly = poly * x + c[2];
    CAL_TO_J * 1e-3 * poly
}

/// Molar Gibbs free energy `H − T·S` at `temperature` (K), in J/mol.
///
/// `partial_pressure` follows the same convention as [`entropy`].
#[must_use]
pub fn gibbs_energy(c: &Coefficients, temperature: f64, partial_pressure: f64) -> f64 {
    enthalpy(c, temperature) - temperature * entropy(c, temperature, partial_pressure)
}

fn standard_entropy(c: &Coefficients, temperature: f64) -> f64 {
    let x = temperature * 1e-3;
    let poly = 7.0 / 6.0 * c[8];
    let poly = poly * x + 6.0 / 5.0 * c[7];
    let poly = poly * x + 5.0 / 4.0 * c[6];
    let poly = poly * x + 4.0 / 3.0 * c[5];
    let poly = poly * x + 3.0 / 2.0 * c[4];
    let poly = poly * x + 2.0 * c[3];
    let poly = poly * x;
    CAL_TO_J * (c[0] + 1e-3 * c[2] * x.ln() + 1e-3 * poly)
}
