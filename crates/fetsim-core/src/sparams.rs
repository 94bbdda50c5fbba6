//! Conversion between admittance and scattering parameters.
//!
//! All ports share one real reference impedance `z0`:
//!
//! ```text
//! S = (E - z0·Y) · (E + z0·Y)⁻¹
//! Y = (E + S)⁻¹ · (E - S) / z0
//! ```

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::{Error, Result};

fn check_square(m: &DMatrix<Complex64>, what: &str) -> Result<()> {
    if m.nrows() != m.ncols() {
        return Err(Error::MatrixError(format!(
            "{what} matrix must be square, got {}x{}",
            m.nrows(),
            m.ncols()
        )));
    }
    Ok(())
}

/// Convert an admittance matrix into scattering parameters.
pub fn y_to_s(y: &DMatrix<Complex64>, z0: f64) -> Result<DMatrix<Complex64>> {
    check_square(y, "admittance")?;
    let n = y.nrows();
    let e = DMatrix::<Complex64>::identity(n, n);
    let zy = y.map(|v| v * z0);

    let inv = (&e + &zy)
        .try_inverse()
        .ok_or_else(|| Error::MatrixError("E + z0·Y is singular".into()))?;
    Ok((&e - &zy) * inv)
}

/// Convert scattering parameters back into an admittance matrix.
pub fn s_to_y(s: &DMatrix<Complex64>, z0: f64) -> Result<DMatrix<Complex64>> {
    check_square(s, "scattering")?;
    let n = s.nrows();
    let e = DMatrix::<Complex64>::identity(n, n);

    let inv = (&e + s)
        .try_inverse()
        .ok_or_else(|| Error::MatrixError("E + S is singular".into()))?;
    Ok((inv * (&e - s)).map(|v| v / z0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_matched_load_does_not_reflect() {
        let y = DMatrix::from_element(1, 1, c(1.0 / 50.0));
        let s = y_to_s(&y, 50.0).unwrap();
        assert!(s[(0, 0)].norm() < 1e-15, "S11 = {}", s[(0, 0)]);
    }

    #[test]
    fn test_open_reflects_fully() {
        let y = DMatrix::from_element(1, 1, c(0.0));
        let s = y_to_s(&y, 50.0).unwrap();
        assert!((s[(0, 0)] - c(1.0)).norm() < 1e-15);
    }

    #[test]
    fn test_series_resistor_two_port() {
        // 50 ohm in series between the ports
        let g = 1.0 / 50.0;
        let y = DMatrix::from_row_slice(2, 2, &[c(g), c(-g), c(-g), c(g)]);
        let s = y_to_s(&y, 50.0).unwrap();

        assert!((s[(0, 0)] - c(1.0 / 3.0)).norm() < 1e-12, "S11 = {}", s[(0, 0)]);
        assert!((s[(1, 0)] - c(2.0 / 3.0)).norm() < 1e-12, "S21 = {}", s[(1, 0)]);
    }

    #[test]
    fn test_s_to_y_inverts_y_to_s() {
        let y = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(1e-3, 2e-3),
                Complex64::new(-1e-3, 0.0),
                Complex64::new(4e-3, -1e-3),
                Complex64::new(2e-3, 5e-4),
            ],
        );
        let back = s_to_y(&y_to_s(&y, 50.0).unwrap(), 50.0).unwrap();
        for (a, b) in y.iter().zip(back.iter()) {
            assert!((a - b).norm() < 1e-15, "{a} != {b}");
        }
    }

    #[test]
    fn test_non_square_rejected() {
        let y = DMatrix::from_element(2, 3, c(0.0));
        assert!(matches!(y_to_s(&y, 50.0), Err(Error::MatrixError(_))));
    }
}
