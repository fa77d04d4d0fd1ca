//! Envelope decoding
//!
//! Turns a frame payload into a typed [`TopicMessage`]. The envelope is a
//! JSON object `{"topic", "logMonoTime", "data"}`; `data` is deserialized
//! into the struct for the named topic. Topics the monitor does not
//! subscribe to are skipped.

use crate::types::{
    CarControl, CarState, ControlsState, Result, TelemetryError, Topic, TopicMessage,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    topic: String,
    log_mono_time: u64,
    data: serde_json::Value,
}

/// A message received from the bus
#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    /// Publisher's monotonic time in nanoseconds
    pub log_mono_time: u64,
    pub message: TopicMessage,
}

/// Decode a frame payload
///
/// # Returns
/// * `Ok(Some(_))` for a subscribed topic
/// * `Ok(None)` for any other topic
/// * `Err(_)` if the envelope or the topic data is malformed
pub fn decode_payload(payload: &[u8]) -> Result<Option<Received>> {
    let envelope: Envelope =
        serde_json::from_slice(payload).map_err(TelemetryError::MalformedEnvelope)?;

    let Some(topic) = Topic::from_name(&envelope.topic) else {
        log::trace!("Skipping unsubscribed topic '{}'", envelope.topic);
        return Ok(None);
    };

    let message = match topic {
        Topic::CarState => TopicMessage::CarState(decode_data::<CarState>(topic, envelope.data)?),
        Topic::CarControl => {
            TopicMessage::CarControl(decode_data::<CarControl>(topic, envelope.data)?)
        }
        Topic::ControlsState => {
            TopicMessage::ControlsState(decode_data::<ControlsState>(topic, envelope.data)?)
        }
    };

    log::trace!("Decoded {} @ {}", topic, envelope.log_mono_time);

    Ok(Some(Received {
        log_mono_time: envelope.log_mono_time,
        message,
    }))
}

fn decode_data<T: DeserializeOwned>(topic: Topic, data: serde_json::Value) -> Result<T> {
    serde_json::from_value(data).map_err(|source| TelemetryError::DecodeError {
        topic: topic.name().to_string(),
        source,
    })
}

/// Encode a message into a frame payload (publisher side, used by tools and tests)
pub fn encode_payload(log_mono_time: u64, message: &TopicMessage) -> Result<Vec<u8>> {
    let data = match message {
        TopicMessage::CarState(m) => serde_json::to_value(m),
        TopicMessage::CarControl(m) => serde_json::to_value(m),
        TopicMessage::ControlsState(m) => serde_json::to_value(m),
    }
    .map_err(TelemetryError::MalformedEnvelope)?;

    let envelope = Envelope {
        topic: message.topic().name().to_string(),
        log_mono_time,
        data,
    };
    serde_json::to_vec(&envelope).map_err(TelemetryError::MalformedEnvelope)
}
