//! JFET (Junction Field Effect Transistor) device model using Shichman-Hodges equations.
//!
//! The device is a channel between drain and source, controlled by the gate,
//! plus two gate junction diodes (gate-source, gate-drain). It provides
//!
//! - [`Jfet::init_dc`]: splice optional `Rs`/`Rd` series resistances into the
//!   network and seed the Newton iteration,
//! - [`Jfet::calc_dc`]: the Newton companion model (3×3 conductance matrix
//!   and equivalent currents) at the present terminal voltages,
//! - [`Jfet::calc_operating_points`]: junction conductances and depletion
//!   capacitances at the converged operating point,
//! - [`Jfet::calc_sp`]: the small-signal scattering parameters at a frequency.
//!
//! Terminal slots are gate = 0, drain = 1, source = 2.

use std::f64::consts::PI;

use fetsim_core::constants::{kelvin, Z0};
use fetsim_core::sparams::y_to_s;
use fetsim_core::units::parse_value;
use fetsim_core::{Circuit, DeviceStamps, Element, MnaSystem, NodeId};
use log::{debug, trace};
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::diode::{
    clear_series_resistance, critical_voltage, depletion_capacitance, ensure_series_resistance,
    junction_current, junction_current_floored, limit_junction_voltage, thermal_voltage,
    SeriesResistance,
};
use crate::error::{Error, Result};
use crate::operating_point::OperatingPoint;
use crate::passive::Resistor;
use crate::stamp::{node_to_index, Stamp};

/// Device temperature (°C) used for the thermal voltage.
pub const REFERENCE_TEMPERATURE: f64 = 26.5;

/// Initial gate voltage, close to the gate junction turn-on.
pub const GATE_SEED_VOLTAGE: f64 = 0.8;

/// JFET terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Gate,
    Drain,
    Source,
}

impl Terminal {
    pub const ALL: [Terminal; 3] = [Terminal::Gate, Terminal::Drain, Terminal::Source];

    /// Slot of this terminal in the device stamps.
    pub const fn slot(self) -> usize {
        match self {
            Terminal::Gate => 0,
            Terminal::Drain => 1,
            Terminal::Source => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Terminal::Gate => "gate",
            Terminal::Drain => "drain",
            Terminal::Source => "source",
        }
    }
}

/// JFET model parameters (Shichman-Hodges model).
///
/// Serialized with the model-card spellings (`Is`, `Vt0`, ...); missing
/// fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JfetParams {
    /// Gate saturation current (A). Default: 1e-14.
    #[serde(rename = "Is")]
    pub is: f64,
    /// Gate junction emission coefficient. Default: 1.0.
    #[serde(rename = "N")]
    pub n: f64,
    /// Threshold voltage (V). Default: -2.0.
    #[serde(rename = "Vt0")]
    pub vt0: f64,
    /// Channel-length modulation (1/V). Default: 0.0.
    #[serde(rename = "Lambda")]
    pub lambda: f64,
    /// Transconductance parameter (A/V^2). Default: 1e-4.
    #[serde(rename = "Beta")]
    pub beta: f64,
    /// Zero-bias gate-drain capacitance (F). Default: 0.0.
    #[serde(rename = "Cgd")]
    pub cgd: f64,
    /// Zero-bias gate-source capacitance (F). Default: 0.0.
    #[serde(rename = "Cgs")]
    pub cgs: f64,
    /// Gate junction grading coefficient. Default: 0.5.
    #[serde(rename = "M")]
    pub m: f64,
    /// Gate junction potential (V). Default: 1.0.
    #[serde(rename = "Pb")]
    pub pb: f64,
    /// Source series resistance (Ω); 0 wires the source directly. Default: 0.0.
    #[serde(rename = "Rs")]
    pub rs: f64,
    /// Drain series resistance (Ω); 0 wires the drain directly. Default: 0.0.
    #[serde(rename = "Rd")]
    pub rd: f64,
}

impl JfetParams {
    /// Parameter names as they appear on a model card.
    pub const NAMES: [&'static str; 11] = [
        "Is", "N", "Vt0", "Lambda", "Beta", "Cgd", "Cgs", "M", "Pb", "Rs", "Rd",
    ];

    /// Create default N-channel JFET parameters.
    pub fn njf_default() -> Self {
        Self {
            is: 1e-14,
            n: 1.0,
            vt0: -2.0,
            lambda: 0.0,
            beta: 1e-4,
            cgd: 0.0,
            cgs: 0.0,
            m: 0.5,
            pb: 1.0,
            rs: 0.0,
            rd: 0.0,
        }
    }

    /// Load parameters from `name=value` model-card pairs on top of the
    /// defaults. Values accept SPICE scale suffixes.
    pub fn from_model_card(pairs: &[(&str, &str)]) -> Result<Self> {
        let mut params = Self::njf_default();
        for (name, value) in pairs {
            let parsed = parse_value(value)
                .ok_or_else(|| Error::InvalidParameter(format!("{name}={value}")))?;
            params.set(name, parsed)?;
        }
        params.validate()?;
        Ok(params)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        let field = match name.to_ascii_lowercase().as_str() {
            "is" => &mut self.is,
            "n" => &mut self.n,
            "vt0" => &mut self.vt0,
            "lambda" => &mut self.lambda,
            "beta" => &mut self.beta,
            "cgd" => &mut self.cgd,
            "cgs" => &mut self.cgs,
            "m" => &mut self.m,
            "pb" => &mut self.pb,
            "rs" => &mut self.rs,
            "rd" => &mut self.rd,
            _ => return None,
        };
        Some(field)
    }

    /// Read a parameter by name (case-insensitive).
    pub fn get(&self, name: &str) -> Result<f64> {
        let value = match name.to_ascii_lowercase().as_str() {
            "is" => self.is,
            "n" => self.n,
            "vt0" => self.vt0,
            "lambda" => self.lambda,
            "beta" => self.beta,
            "cgd" => self.cgd,
            "cgs" => self.cgs,
            "m" => self.m,
            "pb" => self.pb,
            "rs" => self.rs,
            "rd" => self.rd,
            _ => return Err(Error::UnknownParameter(name.to_string())),
        };
        Ok(value)
    }

    /// Write a parameter by name (case-insensitive). Not validated.
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        let field = self
            .field_mut(name)
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))?;
        *field = value;
        Ok(())
    }

    /// Reject parameter sets the device equations are not defined for.
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &str, value: f64| Error::InvalidValue {
            name: name.to_string(),
            value,
        };

        for name in Self::NAMES {
            let value = self.get(name)?;
            if !value.is_finite() {
                return Err(invalid(name, value));
            }
        }
        if self.is <= 0.0 {
            return Err(invalid("Is", self.is));
        }
        if self.n <= 0.0 {
            return Err(invalid("N", self.n));
        }
        if self.pb <= 0.0 {
            return Err(invalid("Pb", self.pb));
        }
        if self.rs < 0.0 {
            return Err(invalid("Rs", self.rs));
        }
        if self.rd < 0.0 {
            return Err(invalid("Rd", self.rd));
        }
        Ok(())
    }
}

impl Default for JfetParams {
    fn default() -> Self {
        Self::njf_default()
    }
}

/// Operating region of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum JfetRegion {
    /// Cutoff: channel is pinched off, no current flows.
    Cutoff,
    /// Saturation: channel pinched at the drain (or source) end.
    Saturation,
    /// Linear (triode): channel conducts along its whole length.
    Linear,
}

/// Which end of the channel acts as the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// `Uds >= 0`, the source terminal is the source.
    Normal,
    /// `Uds < 0`, drain and source swap roles.
    Inverse,
}

/// Channel current and its derivatives at one bias point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelEval {
    /// Drain-to-source channel current.
    pub ids: f64,
    /// Transconductance, the `Ugs` column of the companion model.
    pub gm: f64,
    /// Output conductance, the `Uds` column of the companion model.
    pub gds: f64,
    pub region: JfetRegion,
    pub mode: ChannelMode,
}

fn region(overdrive: f64, channel_voltage: f64) -> JfetRegion {
    if overdrive < 0.0 {
        JfetRegion::Cutoff
    } else if overdrive <= channel_voltage {
        JfetRegion::Saturation
    } else {
        JfetRegion::Linear
    }
}

/// Evaluate the channel at gate-source voltage `ugs` and gate-drain voltage
/// `ugd`.
///
/// Normal mode uses the overdrive `Ugs - Vt0` and `β' = β(1 + λUds)`;
/// inverse mode uses `Ugd - Vt0`, `β' = β(1 - λUds)` and a reversed
/// current. The two modes meet continuously at `Uds = 0`.
pub fn evaluate_channel(params: &JfetParams, ugs: f64, ugd: f64) -> ChannelEval {
    let beta = params.beta;
    let l = params.lambda;
    let uds = ugs - ugd;

    if uds >= 0.0 {
        let ugst = ugs - params.vt0;
        let region = region(ugst, uds);
        let b = beta * (1.0 + l * uds);
        let (ids, gm, gds) = match region {
            JfetRegion::Cutoff => (0.0, 0.0, 0.0),
            JfetRegion::Saturation => (b * ugst * ugst, b * 2.0 * ugst, l * b * ugst * ugst),
            JfetRegion::Linear => (
                b * uds * (2.0 * ugst - uds),
                b * 2.0 * uds,
                b * 2.0 * (ugst - uds) + l * beta * uds * (2.0 * ugst - uds),
            ),
        };
        ChannelEval {
            ids,
            gm,
            gds,
            region,
            mode: ChannelMode::Normal,
        }
    } else {
        let ugdt = ugd - params.vt0;
        let region = region(ugdt, -uds);
        let b = beta * (1.0 - l * uds);
        let (ids, gm, gds) = match region {
            JfetRegion::Cutoff => (0.0, 0.0, 0.0),
            JfetRegion::Saturation => (
                -b * ugdt * ugdt,
                -b * 2.0 * ugdt,
                beta * l * ugdt * ugdt + b * 2.0 * ugdt,
            ),
            JfetRegion::Linear => (
                b * uds * (2.0 * ugdt + uds),
                b * 2.0 * uds,
                2.0 * b * ugdt - beta * l * uds * (2.0 * ugdt + uds),
            ),
        };
        ChannelEval {
            ids,
            gm,
            gds,
            region,
            mode: ChannelMode::Inverse,
        }
    }
}

/// A JFET element.
///
/// The device owns its series-resistance sub-elements. A clone starts out
/// without them, wired to the outer nodes, and splices its own at the next
/// [`Jfet::init_dc`].
#[derive(Debug)]
pub struct Jfet {
    /// Device name (e.g., "J1").
    pub name: String,
    /// Model parameters. Changes to `rs`/`rd` take effect at the next
    /// [`Jfet::init_dc`].
    pub params: JfetParams,
    stamps: DeviceStamps,
    ugd_prev: f64,
    ugs_prev: f64,
    rs: Option<SeriesResistance>,
    rd: Option<SeriesResistance>,
    op: OperatingPoint,
}

impl Clone for Jfet {
    fn clone(&self) -> Self {
        let mut stamps = self.stamps.clone();
        for (series, terminal) in [(&self.rs, Terminal::Source), (&self.rd, Terminal::Drain)] {
            if let Some(series) = series.as_ref().filter(|s| s.is_attached()) {
                stamps.set_node(terminal.slot(), series.outer_node());
            }
        }
        Self {
            name: self.name.clone(),
            params: self.params.clone(),
            stamps,
            ugd_prev: self.ugd_prev,
            ugs_prev: self.ugs_prev,
            rs: None,
            rd: None,
            op: self.op.clone(),
        }
    }
}

impl Jfet {
    /// Create a new N-channel JFET with default parameters.
    pub fn new(name: impl Into<String>, gate: NodeId, drain: NodeId, source: NodeId) -> Self {
        Self::with_params(name, gate, drain, source, JfetParams::njf_default())
    }

    /// Create with custom parameters.
    pub fn with_params(
        name: impl Into<String>,
        gate: NodeId,
        drain: NodeId,
        source: NodeId,
        params: JfetParams,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            stamps: DeviceStamps::new(vec![gate, drain, source]),
            ugd_prev: 0.0,
            ugs_prev: 0.0,
            rs: None,
            rd: None,
            op: OperatingPoint::new(),
        }
    }

    /// Node a terminal is wired to (an internal node when a series
    /// resistance is active).
    pub fn node(&self, terminal: Terminal) -> NodeId {
        self.stamps.node(terminal.slot())
    }

    /// Terminal state and the stamps written by the analyses.
    pub fn stamps(&self) -> &DeviceStamps {
        &self.stamps
    }

    pub fn voltage(&self, terminal: Terminal) -> f64 {
        self.stamps.v(terminal.slot()).re
    }

    pub fn set_voltage(&mut self, terminal: Terminal, volts: f64) {
        self.stamps.set_v(terminal.slot(), volts);
    }

    /// Copy terminal voltages out of a solution vector indexed by
    /// `circuit`'s matrix rows.
    pub fn load_voltages(&mut self, circuit: &Circuit, solution: &DVector<f64>) -> Result<()> {
        for terminal in Terminal::ALL {
            let volts = match node_to_index(circuit, self.node(terminal))? {
                Some(row) => solution[row],
                None => 0.0,
            };
            self.set_voltage(terminal, volts);
        }
        Ok(())
    }

    /// Parameter by model-card name.
    pub fn property(&self, name: &str) -> Result<f64> {
        self.params.get(name)
    }

    pub fn operating_point(&self) -> &OperatingPoint {
        &self.op
    }

    /// Limited `(Ugs, Ugd)` from the last DC evaluation.
    pub fn previous_junction_voltages(&self) -> (f64, f64) {
        (self.ugs_prev, self.ugd_prev)
    }

    /// Series resistances currently spliced into the network.
    pub fn series_resistances(&self) -> impl Iterator<Item = &Resistor> {
        self.rs
            .iter()
            .chain(self.rd.iter())
            .filter(|s| s.is_attached())
            .map(SeriesResistance::resistor)
    }

    fn thermal_voltage() -> f64 {
        thermal_voltage(kelvin(REFERENCE_TEMPERATURE))
    }

    /// Raw `(Ugs, Ugd)` from the present terminal voltages.
    fn junction_voltages(&self) -> (f64, f64) {
        let vg = self.stamps.v(Terminal::Gate.slot());
        let ugd = (vg - self.stamps.v(Terminal::Drain.slot())).re;
        let ugs = (vg - self.stamps.v(Terminal::Source.slot())).re;
        (ugs, ugd)
    }

    /// Prepare the device for a DC analysis.
    ///
    /// Inserts (or removes) the source and drain series resistances
    /// according to `Rs`/`Rd`, seeds the terminal voltages and resets the
    /// limiter state. Safe to call repeatedly.
    pub fn init_dc(&mut self, network: &mut Circuit) -> Result<()> {
        self.set_voltage(Terminal::Gate, GATE_SEED_VOLTAGE);
        self.set_voltage(Terminal::Drain, 0.0);
        self.set_voltage(Terminal::Source, 0.0);
        let (ugs, ugd) = self.junction_voltages();
        self.ugs_prev = ugs;
        self.ugd_prev = ugd;

        let rs = self.params.rs;
        if rs != 0.0 {
            ensure_series_resistance(
                &self.name,
                &mut self.stamps,
                &mut self.rs,
                network,
                "Rs",
                Terminal::Source.name(),
                Terminal::Source.slot(),
            )?
            .set_resistance(rs);
        } else {
            clear_series_resistance(&mut self.stamps, &mut self.rs, network, Terminal::Source.slot())?;
        }

        let rd = self.params.rd;
        if rd != 0.0 {
            ensure_series_resistance(
                &self.name,
                &mut self.stamps,
                &mut self.rd,
                network,
                "Rd",
                Terminal::Drain.name(),
                Terminal::Drain.slot(),
            )?
            .set_resistance(rd);
        } else {
            clear_series_resistance(&mut self.stamps, &mut self.rd, network, Terminal::Drain.slot())?;
        }

        debug!(
            "{}: DC init, gate={} drain={} source={} (Rs={}, Rd={})",
            self.name,
            self.node(Terminal::Gate),
            self.node(Terminal::Drain),
            self.node(Terminal::Source),
            rs,
            rd
        );
        Ok(())
    }

    /// Remove the series resistances and their internal nodes from the
    /// network and rewire the terminals to their outer nodes.
    ///
    /// Call before dropping a device whose `Rs`/`Rd` were spliced in.
    pub fn detach(&mut self, network: &mut Circuit) -> Result<()> {
        clear_series_resistance(&mut self.stamps, &mut self.rs, network, Terminal::Source.slot())?;
        clear_series_resistance(&mut self.stamps, &mut self.rd, network, Terminal::Drain.slot())?;
        self.rs = None;
        self.rd = None;
        debug!("{}: detached from the network", self.name);
        Ok(())
    }

    /// Compute the Newton companion model at the present terminal voltages.
    ///
    /// Junction voltages are limited against the previous iteration and the
    /// limited values are kept for the next call. Writes `gm`, `gds` and `Id`
    /// to the operating point.
    pub fn calc_dc(&mut self) {
        let is = self.params.is;
        let n_ut = self.params.n * Self::thermal_voltage();

        let (ugs, ugd) = self.junction_voltages();

        let ucrit = critical_voltage(n_ut, is);
        let ugs = limit_junction_voltage(ugs, self.ugs_prev, n_ut, ucrit);
        let ugd = limit_junction_voltage(ugd, self.ugd_prev, n_ut, ucrit);
        self.ugs_prev = ugs;
        self.ugd_prev = ugd;

        let uds = ugs - ugd;

        let (igs, ggs) = junction_current_floored(ugs, is, n_ut);
        let (igd, ggd) = junction_current_floored(ugd, is, n_ut);

        let ch = evaluate_channel(&self.params, ugs, ugd);
        trace!(
            "{}: Ugs={ugs} Ugd={ugd} {:?}/{:?} Ids={}",
            self.name,
            ch.mode,
            ch.region,
            ch.ids
        );
        let ChannelEval { ids, gm, gds, .. } = ch;

        self.op.set("gm", gm);
        self.op.set("gds", gds);
        self.op.set("Id", ids);

        let ieq_g = igs - ggs * ugs;
        let ieq_d = igd - ggd * ugd;
        let ieq_s = ids - gm * ugs - gds * uds;

        let st = &mut self.stamps;
        st.set_i(0, -ieq_g - ieq_d);
        st.set_i(1, ieq_d - ieq_s);
        st.set_i(2, ieq_g + ieq_s);

        st.set_y(0, 0, ggs + ggd);
        st.set_y(0, 1, -ggd);
        st.set_y(0, 2, -ggs);
        st.set_y(1, 0, gm - ggd);
        st.set_y(1, 1, gds + ggd);
        st.set_y(1, 2, -gm - gds);
        st.set_y(2, 0, -ggs - gm);
        st.set_y(2, 1, -gds);
        st.set_y(2, 2, ggs + gds + gm);
    }

    /// Evaluate junction conductances and depletion capacitances at the
    /// present (converged) terminal voltages, without limiting.
    pub fn calc_operating_points(&mut self) {
        let p = &self.params;
        let n_ut = p.n * Self::thermal_voltage();
        let (ugs, ugd) = self.junction_voltages();

        let (_, ggs) = junction_current(ugs, p.is, n_ut);
        let (_, ggd) = junction_current(ugd, p.is, n_ut);
        let cgd = depletion_capacitance(p.cgd, ugd, p.pb, p.m);
        let cgs = depletion_capacitance(p.cgs, ugs, p.pb, p.m);

        self.op.set("ggs", ggs);
        self.op.set("ggd", ggd);
        self.op.set("Ugs", ugs);
        self.op.set("Ugd", ugd);
        self.op.set("Cgd", cgd);
        self.op.set("Cgs", cgs);
    }

    /// Small-signal admittance matrix at `frequency` (Hz).
    ///
    /// Needs `gm`/`gds` from [`Jfet::calc_dc`] and the junction values from
    /// [`Jfet::calc_operating_points`].
    pub fn ac_admittance(&self, frequency: f64) -> Result<DMatrix<Complex64>> {
        let cgd = self.op.get("Cgd")?;
        let cgs = self.op.get("Cgs")?;
        let ggs = self.op.get("ggs")?;
        let ggd = self.op.get("ggd")?;
        let gds = self.op.get("gds")?;
        let gm = Complex64::from(self.op.get("gm")?);

        let omega = 2.0 * PI * frequency;
        let ygd = Complex64::new(ggd, omega * cgd);
        let ygs = Complex64::new(ggs, omega * cgs);
        let yds = Complex64::from(gds);

        Ok(DMatrix::from_row_slice(
            3,
            3,
            &[
                ygd + ygs,
                -ygd,
                -ygs,
                gm - ygd,
                ygd + yds,
                -yds - gm,
                -ygs - gm,
                -yds,
                ygs + yds + gm,
            ],
        ))
    }

    /// Write the scattering parameters at `frequency` (Hz) into the S stamp.
    pub fn calc_sp(&mut self, frequency: f64) -> Result<()> {
        let y = self.ac_admittance(frequency)?;
        let s = y_to_s(&y, Z0)?;
        for row in 0..3 {
            for col in 0..3 {
                self.stamps.set_s(row, col, s[(row, col)]);
            }
        }
        Ok(())
    }
}

impl Stamp for Jfet {
    /// Stamps the last companion model computed by [`Jfet::calc_dc`] and
    /// the attached series resistances.
    fn stamp(&self, circuit: &Circuit, mna: &mut MnaSystem) -> Result<()> {
        let mut rows = [None; 3];
        for terminal in Terminal::ALL {
            rows[terminal.slot()] = node_to_index(circuit, self.node(terminal))?;
        }
        mna.stamp_block(
            &rows,
            self.stamps.conductance_matrix(),
            self.stamps.current_vector(),
        )?;
        for resistor in self.series_resistances() {
            resistor.stamp(circuit, mna)?;
        }
        Ok(())
    }
}

impl Element for Jfet {
    fn name(&self) -> &str {
        &self.name
    }

    fn nodes(&self) -> Vec<NodeId> {
        self.stamps.nodes().to_vec()
    }
}
