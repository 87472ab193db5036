//! Safety supervisor.
//!
//! The supervisor runs **every tick after the inputs are read and before
//! the FSM**.  It keeps a fault bitmask; while any bit is set the
//! service forces every output low and holds the cycle in `Error`.
//!
//! ## Fault lifecycle
//!
//! 1. The robot asserts `r_error`.
//! 2. The supervisor sets the corresponding bit.
//! 3. The service drives all outputs low and forces `Error`;
//!    `error_enter` drops any requested pulses.
//! 4. Each tick the supervisor re-evaluates.  When the input drops, the
//!    bit clears, but the cycle stays in `Error`.
//! 5. Only an operator reset leaves `Error`.
//!
//! With `r_error` unmapped the input always reads low and no fault is
//! ever raised.

use crate::error::SafetyFault;
use crate::fsm::context::InputSnapshot;
use log::{error, info};

/// Safety supervisor.
#[derive(Debug, Default)]
pub struct SafetySupervisor {
    /// Latched fault bitmask.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate all safety conditions against the latest input snapshot.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, inputs: &InputSnapshot) -> u8 {
        self.eval_fault(SafetyFault::RobotError, inputs.robot_error);
        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    /// Check if a specific fault is active.
    #[cfg(test)]
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    /// Set or clear a fault bit based on a boolean condition.
    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("SAFETY FAULT SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
