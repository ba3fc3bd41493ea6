//! Reportable state descriptors
//!
//! A descriptor names one quantity inside [`SystemState`] and how many bytes
//! it takes on the wire. The report encodes straight from the live state, so
//! no copy of a reported value is kept anywhere else.

use openshoe_protocol::ids::state as id;

use super::idset::IdSet;
use super::RegistryError;
use crate::state::SystemState;

/// Quantity inside [`SystemState`] that can be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateVariable {
    SpecificForce,
    AngularRate,
    ImuTemperatures,
    SupplyVoltage,
    Position,
    Velocity,
    Quaternion,
    Zupt,
    CycleCounter,
    SoftFaults,
    DeadlineOverruns,
    AccelerometerBiases,
}

impl StateVariable {
    /// Bytes this variable occupies in a report
    pub const fn encoded_size(self) -> usize {
        match self {
            StateVariable::SpecificForce
            | StateVariable::AngularRate
            | StateVariable::ImuTemperatures
            | StateVariable::Position
            | StateVariable::Velocity
            | StateVariable::AccelerometerBiases => 12,
            StateVariable::Quaternion => 16,
            StateVariable::SupplyVoltage
            | StateVariable::CycleCounter
            | StateVariable::DeadlineOverruns => 4,
            StateVariable::SoftFaults => 2,
            StateVariable::Zupt => 1,
        }
    }

    /// Write the current value big-endian into `out`
    ///
    /// `out` must be exactly [`StateVariable::encoded_size`] bytes long.
    pub fn encode(self, state: &SystemState, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.encoded_size());
        match self {
            StateVariable::SpecificForce => put_f32s(out, &state.imu.specific_force),
            StateVariable::AngularRate => put_f32s(out, &state.imu.angular_rate),
            StateVariable::ImuTemperatures => put_f32s(out, &state.imu.temperatures),
            StateVariable::SupplyVoltage => put_f32s(out, &[state.imu.supply_voltage]),
            StateVariable::Position => put_f32s(out, &state.nav.position),
            StateVariable::Velocity => put_f32s(out, &state.nav.velocity),
            StateVariable::Quaternion => put_f32s(out, &state.nav.quaternion),
            StateVariable::Zupt => out[0] = u8::from(state.nav.zupt),
            StateVariable::CycleCounter => out.copy_from_slice(&state.cycle_counter.to_be_bytes()),
            StateVariable::SoftFaults => out.copy_from_slice(&state.faults.flags().to_be_bytes()),
            StateVariable::DeadlineOverruns => {
                out.copy_from_slice(&state.faults.overruns().to_be_bytes())
            }
            StateVariable::AccelerometerBiases => {
                put_f32s(out, &state.nav.accelerometer_biases)
            }
        }
    }
}

fn put_f32s(out: &mut [u8], values: &[f32]) {
    for (chunk, value) in out.chunks_exact_mut(4).zip(values) {
        chunk.copy_from_slice(&value.to_be_bytes());
    }
}

/// Static description of one reportable state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateDescriptor {
    /// State ID as used by the host
    pub id: u8,
    /// Where the value lives
    pub variable: StateVariable,
    /// Encoded size in bytes
    pub size: u8,
}

impl StateDescriptor {
    /// Describe a state using the variable's natural size
    pub const fn new(id: u8, variable: StateVariable) -> Self {
        Self {
            id,
            variable,
            size: variable.encoded_size() as u8,
        }
    }
}

/// States reported by the standard runtime
pub const STANDARD_STATES: &[StateDescriptor] = &[
    StateDescriptor::new(id::CYCLE_COUNTER, StateVariable::CycleCounter),
    StateDescriptor::new(id::SOFT_FAULTS, StateVariable::SoftFaults),
    StateDescriptor::new(id::DEADLINE_OVERRUNS, StateVariable::DeadlineOverruns),
    StateDescriptor::new(id::SPECIFIC_FORCE, StateVariable::SpecificForce),
    StateDescriptor::new(id::ANGULAR_RATE, StateVariable::AngularRate),
    StateDescriptor::new(id::IMU_TEMPERATURES, StateVariable::ImuTemperatures),
    StateDescriptor::new(id::IMU_SUPPLY_VOLTAGE, StateVariable::SupplyVoltage),
    StateDescriptor::new(id::POSITION, StateVariable::Position),
    StateDescriptor::new(id::VELOCITY, StateVariable::Velocity),
    StateDescriptor::new(id::QUATERNION, StateVariable::Quaternion),
    StateDescriptor::new(id::ZUPT, StateVariable::Zupt),
    StateDescriptor::new(id::ACCELEROMETER_BIASES, StateVariable::AccelerometerBiases),
];

/// ID-indexed state lookup
#[derive(Debug, Clone)]
pub struct StateTable {
    ids: IdSet,
    entries: [Option<StateDescriptor>; 256],
}

impl Default for StateTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTable {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            ids: IdSet::new(),
            entries: [None; 256],
        }
    }

    /// Add descriptors to the table; a rejected batch changes nothing
    pub fn register(&mut self, descriptors: &[StateDescriptor]) -> Result<(), RegistryError> {
        let mut seen = self.ids;
        for descriptor in descriptors {
            if descriptor.size as usize != descriptor.variable.encoded_size() {
                return Err(RegistryError::StateSize(descriptor.id));
            }
            if !seen.insert(descriptor.id) {
                return Err(RegistryError::DuplicateState(descriptor.id));
            }
        }

        for descriptor in descriptors {
            self.ids.insert(descriptor.id);
            self.entries[descriptor.id as usize] = Some(*descriptor);
        }
        Ok(())
    }

    /// Descriptor registered for `id`
    pub fn lookup(&self, id: u8) -> Option<StateDescriptor> {
        self.entries[id as usize]
    }

    /// Set of registered state IDs
    pub fn ids(&self) -> &IdSet {
        &self.ids
    }

    /// Number of registered states
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check whether no state is registered
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
