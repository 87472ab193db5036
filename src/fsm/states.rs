//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch.  Handlers only touch the [`FsmContext`]; pulses are
//! requested, not driven.
//!
//! ```text
//!  IDLE ──[target armed ∧ start button]──▶ STARTING ──▶ PICK_IN
//!    ▲                                                  │    ▲
//!    │◀──[target reached, no open batch]────────────────┘    │
//!    │                                  [batch full / target] │
//!    │                                           ▼            │
//!    │                                        MARKING         │
//!    │                                           ▼            │
//!    └──────[next ∧ target reached]────────  AFTER_MARK ──[next]
//!
//!  Any state ──[robot error]──▶ ERROR ──[reset command]──▶ IDLE
//! ```

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::io_map::OutputSignal;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "IDLE",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Starting
        StateDescriptor {
            id: StateId::Starting,
            name: "STARTING",
            on_enter: Some(starting_enter),
            on_exit: None,
            on_update: starting_update,
        },
        // Index 2 — PickIn
        StateDescriptor {
            id: StateId::PickIn,
            name: "PICK_IN",
            on_enter: Some(pick_in_enter),
            on_exit: None,
            on_update: pick_in_update,
        },
        // Index 3 — Marking
        StateDescriptor {
            id: StateId::Marking,
            name: "MARKING",
            on_enter: None,
            on_exit: None,
            on_update: marking_update,
        },
        // Index 4 — AfterMark
        StateDescriptor {
            id: StateId::AfterMark,
            name: "AFTER_MARK",
            on_enter: None,
            on_exit: None,
            on_update: after_mark_update,
        },
        // Index 5 — Error
        StateDescriptor {
            id: StateId::Error,
            name: "ERROR",
            on_enter: Some(error_enter),
            on_exit: Some(error_exit),
            on_update: error_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE — waiting for an armed target and the start button
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.counters.batch_count = 0;
    info!(
        "IDLE: total={} target={} armed={}",
        ctx.counters.total_done, ctx.counters.target_n, ctx.counters.target_set
    );
}

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.counters.target_set && ctx.inputs.start_button {
        info!("IDLE: start button pressed with target {}", ctx.counters.target_n);
        return Some(StateId::Starting);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  STARTING — send the robot to its ready pose
// ═══════════════════════════════════════════════════════════════════════════

fn starting_enter(ctx: &mut FsmContext) {
    ctx.requests.pulse(OutputSignal::Start);
}

fn starting_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::PickIn)
}

// ═══════════════════════════════════════════════════════════════════════════
//  PICK_IN — count objects, request picks, close batches
// ═══════════════════════════════════════════════════════════════════════════

fn pick_in_enter(ctx: &mut FsmContext) {
    ctx.counters.batch_count = 0;
}

fn pick_in_update(ctx: &mut FsmContext) -> Option<StateId> {
    // 1. Count independently of everything below.
    if ctx.object_edge {
        ctx.counters.batch_count += 1;
        ctx.counters.total_done += 1;
        ctx.counted = true;
        debug!(
            "PICK_IN: object {} (batch {}/{})",
            ctx.counters.total_done, ctx.counters.batch_count, ctx.config.batch_size
        );
    }

    // 2. Target reached: finish, or mark the partial batch first.
    if ctx.counters.target_reached() {
        if ctx.counters.batch_count == 0 {
            return Some(finish_run(ctx));
        }
        info!(
            "PICK_IN: target {} reached with {} in batch, marking",
            ctx.counters.target_n, ctx.counters.batch_count
        );
        ctx.requests.pulse(OutputSignal::Over);
        return Some(StateId::Marking);
    }

    // 3. Batch full.
    if ctx.counters.batch_count >= ctx.config.batch_size {
        info!("PICK_IN: batch of {} complete, marking", ctx.counters.batch_count);
        ctx.requests.pulse(OutputSignal::Over);
        return Some(StateId::Marking);
    }

    // 4. Robot ready for two more.
    if ctx.inputs.ready {
        ctx.requests.pulse(OutputSignal::Continue);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MARKING — robot runs the laser cycle on its own
// ═══════════════════════════════════════════════════════════════════════════

fn marking_update(_ctx: &mut FsmContext) -> Option<StateId> {
    Some(StateId::AfterMark)
}

// ═══════════════════════════════════════════════════════════════════════════
//  AFTER_MARK — wait for the robot to finish mark + pick-out
// ═══════════════════════════════════════════════════════════════════════════

fn after_mark_update(ctx: &mut FsmContext) -> Option<StateId> {
    if !ctx.inputs.next {
        return None;
    }
    if ctx.counters.target_reached() {
        return Some(finish_run(ctx));
    }
    Some(StateId::PickIn)
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERROR — robot fault, all outputs forced low
// ═══════════════════════════════════════════════════════════════════════════

fn error_enter(ctx: &mut FsmContext) {
    ctx.requests.pulses.clear();
    ctx.requests.all_off = true;
    warn!("ERROR: all outputs forced low, waiting for reset");
}

fn error_exit(_ctx: &mut FsmContext) {
    info!("ERROR: reset received, resuming");
}

fn error_update(_ctx: &mut FsmContext) -> Option<StateId> {
    // Only an operator reset leaves ERROR; the service forces that.
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  Helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Pulse `count_ok`, disarm the target and head back to IDLE.
fn finish_run(ctx: &mut FsmContext) -> StateId {
    info!(
        "Run complete: {} of {} processed",
        ctx.counters.total_done, ctx.counters.target_n
    );
    ctx.requests.pulse(OutputSignal::CountOk);
    ctx.counters.target_set = false;
    ctx.run_complete = true;
    StateId::Idle
}
