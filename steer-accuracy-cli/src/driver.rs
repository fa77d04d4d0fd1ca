//! Stream driver
//!
//! Pulls heartbeats from the bus, runs each snapshot through the gate and
//! classifier, and redraws the display on a fixed message cadence. Owns all
//! mutable state; nothing is shared.

use crate::classifier::{self, Sample};
use crate::gate::EngagementGate;
use crate::report;
use crate::speed_groups::GroupSelection;
use crate::stats::StatAccumulator;
use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use steer_telemetry::{ControlLaw, Poll, Snapshot, SubMaster};

/// Fixed inputs of a run
#[derive(Debug, Clone, Copy)]
pub struct DriverSettings {
    pub law: ControlLaw,
    pub selection: GroupSelection,
    pub settle_samples: u32,
    pub render_every: u64,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Interrupted,
    StreamClosed,
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub messages: u64,
    pub countable: u64,
    pub classified: u64,
    pub dropped_heartbeats: u64,
    pub end: EndReason,
}

pub struct StreamDriver<W: Write> {
    settings: DriverSettings,
    gate: EngagementGate,
    stats: StatAccumulator,
    out: W,
    messages: u64,
    countable: u64,
    classified: u64,
}

impl<W: Write> StreamDriver<W> {
    pub fn new(settings: DriverSettings, out: W) -> Self {
        Self {
            settings,
            gate: EngagementGate::new(settings.settle_samples),
            stats: StatAccumulator::new(),
            out,
            messages: 0,
            countable: 0,
            classified: 0,
        }
    }

    /// Run until the stream closes or `running` is cleared
    pub fn run<R: Read>(
        &mut self,
        sm: &mut SubMaster<R>,
        running: &AtomicBool,
    ) -> Result<RunSummary> {
        log::info!(
            "Collecting steering accuracy for the {} controller",
            self.settings.law
        );

        let end = loop {
            if !running.load(Ordering::SeqCst) {
                break EndReason::Interrupted;
            }

            match sm.poll().context("Failed to read from telemetry bus")? {
                Poll::Heartbeat => {
                    let snapshot = sm.snapshot(self.settings.law);
                    self.handle_heartbeat(&snapshot)?;
                }
                Poll::Idle => continue,
                Poll::Closed => break EndReason::StreamClosed,
            }
        };

        Ok(RunSummary {
            messages: self.messages,
            countable: self.countable,
            classified: self.classified,
            dropped_heartbeats: sm.heartbeats_dropped(),
            end,
        })
    }

    /// Process one heartbeat's snapshot
    pub fn handle_heartbeat(&mut self, snapshot: &Snapshot<'_>) -> Result<()> {
        self.messages += 1;

        if self
            .gate
            .update(snapshot.active, snapshot.standstill, snapshot.steering_pressed)
        {
            self.countable += 1;
            let controller = snapshot
                .controller()
                .with_context(|| format!("Bad snapshot at message {}", self.messages))?;
            let sample = Sample::from_snapshot(snapshot, &controller);
            if classifier::record(&mut self.stats, &sample).group.is_some() {
                self.classified += 1;
            }
        }

        if self.messages % self.settings.render_every == 0 {
            report::render(
                &mut self.out,
                &self.gate.state(),
                &self.stats,
                self.settings.selection,
            )
            .context("Failed to draw display")?;
        }

        Ok(())
    }

    pub fn stats(&self) -> &StatAccumulator {
        &self.stats
    }

    /// Give back the display writer
    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }
}
