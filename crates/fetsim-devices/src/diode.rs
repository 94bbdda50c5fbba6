//! PN-junction utilities shared by junction devices.
//!
//! The exponential diode law, its Newton voltage limiting, the depletion
//! capacitance law, and the topology helpers that splice a series resistance
//! between a device terminal and a fresh internal node.

use std::f64::consts::SQRT_2;

use fetsim_core::constants::{BOLTZMANN, ELEMENTARY_CHARGE};
use fetsim_core::{Circuit, DeviceStamps, NodeId};
use log::{debug, trace};

use crate::error::Result;
use crate::passive::Resistor;

/// Thermal voltage kT/q at a given temperature.
pub fn thermal_voltage(temp_k: f64) -> f64 {
    BOLTZMANN * temp_k / ELEMENTARY_CHARGE
}

/// Junction voltage above which an unlimited Newton step may overflow the
/// exponential: `n·Ut·ln(n·Ut / (√2·Is))`.
pub fn critical_voltage(n_ut: f64, is: f64) -> f64 {
    n_ut * (n_ut / (SQRT_2 * is)).ln()
}

/// Limit the per-iteration change of a junction voltage (SPICE `pnjlim`).
///
/// Steps that stay below `critical`, or that move by less than `2·n_ut`,
/// pass through. Otherwise the new voltage grows logarithmically from the
/// previous one, or from zero when the previous value was non-positive.
pub fn limit_junction_voltage(raw: f64, previous: f64, n_ut: f64, critical: f64) -> f64 {
    if raw > critical && (raw - previous).abs() > 2.0 * n_ut {
        let limited = if previous > 0.0 {
            let arg = 1.0 + (raw - previous) / n_ut;
            if arg > 0.0 {
                previous + n_ut * arg.ln()
            } else {
                critical
            }
        } else {
            n_ut * (raw / n_ut).ln()
        };
        trace!("junction step {previous} -> {raw} limited to {limited}");
        limited
    } else {
        raw
    }
}

/// Shockley junction current and conductance, `(I, dI/dU)`.
pub fn junction_current(u: f64, is: f64, n_ut: f64) -> (f64, f64) {
    let e = (u / n_ut).exp();
    (is * (e - 1.0), is / n_ut * e)
}

/// Junction current with a linear floor below `-10·n·Ut`.
///
/// Deep in reverse bias the exponential derivative vanishes; `Is` is added
/// as a minimum slope so the Newton matrix keeps a conductance there.
pub fn junction_current_floored(u: f64, is: f64, n_ut: f64) -> (f64, f64) {
    let (i, g) = junction_current(u, is, n_ut);
    let gtiny = if u < -10.0 * n_ut { is } else { 0.0 };
    (i + gtiny * u, g + gtiny)
}

/// Depletion capacitance of a junction at voltage `u`.
///
/// Power law in reverse bias, linear extrapolation from `c0` in forward
/// bias; both give `c0` at zero bias.
pub fn depletion_capacitance(c0: f64, u: f64, pb: f64, m: f64) -> f64 {
    if u < 0.0 {
        c0 * (1.0 - u / pb).powf(-m)
    } else {
        c0 * (1.0 + m * u / pb)
    }
}

/// A series resistance owned by a device, sitting between the terminal's
/// outer node and an internal node the device is rewired to.
#[derive(Debug, Clone)]
pub struct SeriesResistance {
    resistor: Resistor,
    attached: bool,
}

impl SeriesResistance {
    fn detached(name: String) -> Self {
        Self {
            resistor: Resistor::new(name, NodeId::GROUND, NodeId::GROUND, 0.0),
            attached: false,
        }
    }

    /// The resistor sub-element, `node_pos` outer and `node_neg` internal.
    pub fn resistor(&self) -> &Resistor {
        &self.resistor
    }

    /// Whether the resistor is currently part of the network.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn outer_node(&self) -> NodeId {
        self.resistor.node_pos
    }

    pub fn internal_node(&self) -> NodeId {
        self.resistor.node_neg
    }

    pub fn set_resistance(&mut self, ohms: f64) {
        self.resistor.resistance = ohms;
    }

    fn attach(
        &mut self,
        owner: &str,
        stamps: &DeviceStamps,
        network: &mut Circuit,
        terminal: &str,
        slot: usize,
    ) -> Result<()> {
        let outer = stamps.node(slot);
        let internal = network.add_internal_node(format!("{owner}.{terminal}"))?;
        if let Err(e) = network.insert_element(self.resistor.name.clone(), &[outer, internal]) {
            network.remove_node(internal)?;
            return Err(e.into());
        }
        self.resistor.node_pos = outer;
        self.resistor.node_neg = internal;
        self.attached = true;
        debug!(
            "{owner}: {} inserted between {outer} and internal {terminal} node {internal}",
            self.resistor.name
        );
        Ok(())
    }
}

/// Make sure `existing` holds an attached series resistance for terminal
/// `slot`, creating or re-attaching it as needed, and rewire the terminal
/// to the internal node.
///
/// Calling this again on an attached resistance changes nothing.
pub fn ensure_series_resistance<'a>(
    owner: &str,
    stamps: &mut DeviceStamps,
    existing: &'a mut Option<SeriesResistance>,
    network: &mut Circuit,
    label: &str,
    terminal: &str,
    slot: usize,
) -> Result<&'a mut SeriesResistance> {
    let series = existing.get_or_insert_with(|| SeriesResistance::detached(format!("{owner}.{label}")));
    if !series.attached {
        series.attach(owner, stamps, network, terminal, slot)?;
    }
    stamps.set_node(slot, series.internal_node());
    Ok(series)
}

/// Detach a series resistance, if one is attached, and wire terminal `slot`
/// straight to its outer node again. The sub-element is kept for reuse.
pub fn clear_series_resistance(
    stamps: &mut DeviceStamps,
    existing: &mut Option<SeriesResistance>,
    network: &mut Circuit,
    slot: usize,
) -> Result<()> {
    let Some(series) = existing.as_mut().filter(|s| s.attached) else {
        return Ok(());
    };
    network.remove_element(&series.resistor.name)?;
    network.remove_node(series.internal_node())?;
    stamps.set_node(slot, series.outer_node());
    series.attached = false;
    debug!(
        "{} removed, terminal restored to {}",
        series.resistor.name,
        series.outer_node()
    );
    Ok(())
}
