//! Terminal display
//!
//! Clears the screen and redraws the statistics table. Read-only over the
//! accumulator.

use crate::gate::GateState;
use crate::speed_groups::GroupSelection;
use crate::stats::{StatAccumulator, StatCell};
use std::io::{self, Write};

/// ANSI erase-display sequence
const CLEAR_SCREEN: &str = "\x1b[2J";

/// Width of the rule under each group header
const RULE_WIDTH: usize = 78;

/// Status line above the table.
///
/// Settling gets its own line with the progress counter instead of being
/// folded into DISABLED; the counter is already running at that point.
fn gate_line(state: &GateState) -> String {
    match state {
        GateState::Collecting => "COLLECTING ...".to_string(),
        GateState::Settling { samples, required } => {
            format!("SETTLING ({}/{}) ...", samples, required)
        }
        GateState::Disabled(reason) => format!("DISABLED ({})", reason),
    }
}

fn bucket_line(angle: u32, cell: &StatCell) -> String {
    format!(
        "  angle: {:2} | error: {:.2} | =:{:3}% | +:{:4}% | -:{:3}% | sat: {:4} | count: {:5}",
        angle,
        cell.mean_error(),
        cell.exact_pct(),
        cell.overshoot_pct(),
        cell.undershoot_pct(),
        cell.saturated_count,
        cell.count
    )
}

/// Redraw the whole table
pub fn render<W: Write>(
    out: &mut W,
    gate: &GateState,
    stats: &StatAccumulator,
    selection: GroupSelection,
) -> io::Result<()> {
    writeln!(out, "{}", CLEAR_SCREEN)?;
    writeln!(out, "{}\n", gate_line(gate))?;

    for group in selection.groups() {
        if stats.is_empty(group) {
            continue;
        }
        writeln!(out, "speed group: {:<18} {}", group.name(), group.label())?;
        writeln!(out, "  {}", "-".repeat(RULE_WIDTH))?;
        for (angle, cell) in stats.buckets(group) {
            writeln!(out, "{}", bucket_line(angle, cell))?;
        }
        writeln!(out)?;
    }

    out.flush()
}
