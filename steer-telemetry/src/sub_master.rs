//! Multi-topic subscriber with a conflated heartbeat
//!
//! [`SubMaster`] is the entry point of the library. It owns the bus stream,
//! keeps the latest value of every subscribed topic, and reports when a new
//! `carControl` heartbeat has arrived. Heartbeats are conflated: if several
//! arrive between two polls, only one is reported and the rest are counted
//! as dropped.

use crate::config::BusConfig;
use crate::snapshot::Snapshot;
use crate::transport::{BusStream, Endpoint, Fill, FrameReader};
use crate::types::{
    timestamp_from_nanos, CarControl, CarState, ControlLaw, ControlsState, Result, Timestamp,
    Topic, TopicMessage,
};
use crate::wire::decode_payload;
use std::collections::HashMap;
use std::io::Read;

/// Result of a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A new heartbeat arrived and the topic view is up to date
    Heartbeat,
    /// No heartbeat yet (read timed out, or only other topics arrived)
    Idle,
    /// The publisher closed the stream
    Closed,
}

/// Synchronized latest-value view over the subscribed topics
pub struct SubMaster<R: Read> {
    reader: FrameReader<R>,
    car_state: CarState,
    car_control: CarControl,
    controls_state: ControlsState,
    received: HashMap<Topic, u64>,
    last_log_mono_time: Option<u64>,
    heartbeats_dropped: u64,
}

impl SubMaster<BusStream> {
    /// Resolve `addr`, connect, and subscribe
    ///
    /// # Example
    /// ```no_run
    /// use steer_telemetry::{BusConfig, Poll, SubMaster};
    ///
    /// let config = BusConfig::new();
    /// let mut sm = SubMaster::connect("127.0.0.1", &config).unwrap();
    /// while sm.poll().unwrap() != Poll::Closed {
    ///     println!("vEgo = {}", sm.car_state().v_ego);
    /// }
    /// ```
    pub fn connect(addr: &str, config: &BusConfig) -> Result<Self> {
        let endpoint = Endpoint::resolve(addr, config)?;
        let stream = endpoint.connect(config)?;
        Ok(Self::from_reader(stream, config.max_frame_bytes))
    }
}

impl<R: Read> SubMaster<R> {
    /// Subscribe over an already open stream
    pub fn from_reader(reader: R, max_frame_bytes: usize) -> Self {
        Self {
            reader: FrameReader::new(reader, max_frame_bytes),
            car_state: CarState::default(),
            car_control: CarControl::default(),
            controls_state: ControlsState::default(),
            received: HashMap::new(),
            last_log_mono_time: None,
            heartbeats_dropped: 0,
        }
    }

    /// Read from the bus once and update the topic view
    ///
    /// Blocks for at most the transport's read timeout.
    pub fn poll(&mut self) -> Result<Poll> {
        // Frames left over from an earlier read come first
        let heartbeats = self.drain_frames()?;
        if heartbeats > 0 {
            return Ok(self.conflate(heartbeats));
        }

        match self.reader.fill()? {
            Fill::Data(_) => {
                let heartbeats = self.drain_frames()?;
                if heartbeats > 0 {
                    Ok(self.conflate(heartbeats))
                } else {
                    Ok(Poll::Idle)
                }
            }
            Fill::Timeout => Ok(Poll::Idle),
            Fill::Eof => {
                if self.reader.pending_bytes() > 0 {
                    log::warn!(
                        "Stream closed with {} bytes of an incomplete frame",
                        self.reader.pending_bytes()
                    );
                }
                log::info!("Telemetry stream closed");
                Ok(Poll::Closed)
            }
        }
    }

    /// Apply every complete buffered frame, returning the number of heartbeats seen
    fn drain_frames(&mut self) -> Result<u64> {
        let mut heartbeats = 0;
        while let Some(payload) = self.reader.next_frame()? {
            if let Some(received) = decode_payload(&payload)? {
                if received.message.topic() == Topic::CarControl {
                    heartbeats += 1;
                }
                self.last_log_mono_time = Some(received.log_mono_time);
                self.apply(received.message);
            }
        }
        Ok(heartbeats)
    }

    fn conflate(&mut self, heartbeats: u64) -> Poll {
        if heartbeats > 1 {
            log::debug!("Conflated {} heartbeats into one", heartbeats);
            self.heartbeats_dropped += heartbeats - 1;
        }
        Poll::Heartbeat
    }

    fn apply(&mut self, message: TopicMessage) {
        *self.received.entry(message.topic()).or_insert(0) += 1;
        match message {
            TopicMessage::CarState(m) => self.car_state = m,
            TopicMessage::CarControl(m) => self.car_control = m,
            TopicMessage::ControlsState(m) => self.controls_state = m,
        }
    }

    /// Latest vehicle state
    pub fn car_state(&self) -> &CarState {
        &self.car_state
    }

    /// Latest control output
    pub fn car_control(&self) -> &CarControl {
        &self.car_control
    }

    /// Latest controller internal state
    pub fn controls_state(&self) -> &ControlsState {
        &self.controls_state
    }

    /// Number of messages received on a topic
    pub fn received(&self, topic: Topic) -> u64 {
        self.received.get(&topic).copied().unwrap_or(0)
    }

    /// Heartbeats discarded by conflation
    pub fn heartbeats_dropped(&self) -> u64 {
        self.heartbeats_dropped
    }

    /// Publisher time of the most recent message
    pub fn last_log_time(&self) -> Option<Timestamp> {
        self.last_log_mono_time.map(timestamp_from_nanos)
    }

    /// Project the current view for one control law
    pub fn snapshot(&self, law: ControlLaw) -> Snapshot<'_> {
        Snapshot::new(
            self.car_state.v_ego,
            self.controls_state.active,
            self.car_state.standstill,
            self.car_state.steering_pressed,
            law,
            &self.controls_state.lateral_control_state,
        )
    }
}
