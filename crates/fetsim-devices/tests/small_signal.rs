//! Small-signal analysis of a biased JFET.

use fetsim_core::constants::Z0;
use fetsim_core::sparams::s_to_y;
use fetsim_core::Circuit;
use fetsim_devices::{Jfet, JfetParams, OperatingPoint, Terminal};
use nalgebra::DMatrix;
use num_complex::Complex64;

fn biased_jfet() -> Jfet {
    let mut circuit = Circuit::new();
    let g = circuit.add_named_node("g").unwrap();
    let d = circuit.add_named_node("d").unwrap();
    let s = circuit.add_named_node("s").unwrap();
    let params = JfetParams::from_model_card(&[
        ("Beta", "1m"),
        ("Lambda", "0.02"),
        ("Cgd", "1p"),
        ("Cgs", "3p"),
    ])
    .unwrap();

    let mut j = Jfet::with_params("J1", g, d, s, params);
    j.set_voltage(Terminal::Gate, -0.5);
    j.set_voltage(Terminal::Drain, 5.0);
    j.set_voltage(Terminal::Source, 0.0);
    j.calc_dc();
    j.calc_operating_points();
    j
}

fn scattering(j: &Jfet) -> DMatrix<Complex64> {
    j.stamps().scattering_matrix().clone()
}

#[test]
fn test_sp_round_trips_to_admittance() {
    let mut j = biased_jfet();
    for f in [1e3, 1e6, 1e9] {
        j.calc_sp(f).unwrap();
        let y = s_to_y(&scattering(&j), Z0).unwrap();
        let expected = j.ac_admittance(f).unwrap();
        let err = (&y - &expected).map(|v| v.norm()).max();
        assert!(err < 1e-12, "f = {f}: |Y - Y(S)| = {err}\n{y}\n{expected}");
    }
}

#[test]
fn test_sp_rows_and_columns_sum_to_one() {
    // the terminal admittance matrix is indefinite, so S maps the common
    // mode onto itself
    let mut j = biased_jfet();
    j.calc_sp(1e8).unwrap();
    let s = scattering(&j);
    let one = Complex64::new(1.0, 0.0);
    for k in 0..3 {
        assert!((s.row(k).sum() - one).norm() < 1e-12, "row {k} of {s}");
        assert!((s.column(k).sum() - one).norm() < 1e-12, "column {k} of {s}");
    }
}

#[test]
fn test_sp_at_dc_limit() {
    let mut j = biased_jfet();
    j.calc_sp(0.0).unwrap();
    let s = scattering(&j);

    // the reverse-biased gate is almost an open circuit
    assert!((s[(0, 0)].re - 1.0).abs() < 1e-6, "S11 = {}", s[(0, 0)]);
    for v in s.iter() {
        assert!(v.im.abs() < 1e-15);
    }
}

#[test]
fn test_operating_point_export() {
    let j = biased_jfet();
    let op = j.operating_point();
    for key in ["gm", "gds", "Id", "ggs", "ggd", "Ugs", "Ugd", "Cgd", "Cgs"] {
        assert!(op.contains(key), "{key} missing from {op}");
    }
    assert_eq!(op.get("Ugs").unwrap(), -0.5);
    assert_eq!(op.get("Ugd").unwrap(), -5.5);

    let json = serde_json::to_value(op).unwrap();
    assert_eq!(json["Ugd"], serde_json::json!(-5.5));
    let back: OperatingPoint = serde_json::from_value(json).unwrap();
    assert_eq!(back.get("Id").unwrap(), op.get("Id").unwrap());
}

#[test]
fn test_params_from_json() {
    let p: JfetParams = serde_json::from_str(r#"{"Beta": 2e-3, "Vt0": -1.5}"#).unwrap();
    assert_eq!(p.beta, 2e-3);
    assert_eq!(p.vt0, -1.5);
    assert_eq!(p.is, 1e-14);
    assert!(p.validate().is_ok());

    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json["Lambda"], serde_json::json!(0.0));
}
