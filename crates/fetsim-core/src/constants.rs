//! Physical constants shared by all device models.

/// Boltzmann constant (J/K).
pub const BOLTZMANN: f64 = 1.380649e-23;

/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;

/// Offset between degrees Celsius and kelvin.
pub const CELSIUS_TO_KELVIN: f64 = 273.15;

/// Reference impedance for scattering parameters (ohms).
pub const Z0: f64 = 50.0;

/// Convert a temperature in degrees Celsius to kelvin.
pub fn kelvin(celsius: f64) -> f64 {
    celsius + CELSIUS_TO_KELVIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelvin() {
        assert!((kelvin(26.5) - 299.65).abs() < 1e-12);
        assert_eq!(kelvin(-CELSIUS_TO_KELVIN), 0.0);
    }
}
