// Subscriber behaviour over in-memory streams and real sockets
use std::io::{Cursor, Read};

use steer_telemetry::transport::write_frame;
use steer_telemetry::wire::encode_payload;
use steer_telemetry::{
    CarControl, CarState, ControlLaw, ControlsState, LateralControlState, LateralState, Poll,
    SubMaster, TelemetryError, Topic, TopicMessage,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn frame(time: u64, message: &TopicMessage) -> Vec<u8> {
    let mut data = Vec::new();
    write_frame(&mut data, &encode_payload(time, message).unwrap()).unwrap();
    data
}

fn engaged_controls(actual: f64, desired: f64) -> TopicMessage {
    TopicMessage::ControlsState(ControlsState {
        active: true,
        lateral_control_state: LateralControlState {
            pid_state: Some(LateralState {
                steering_angle_deg: actual,
                steering_angle_desired_deg: desired,
                saturated: false,
            }),
            ..Default::default()
        },
    })
}

#[test]
fn partial_frame_completes_on_next_read() {
    init_logging();

    let heartbeat = frame(1, &TopicMessage::CarControl(CarControl::default()));
    let (head, tail) = heartbeat.split_at(heartbeat.len() / 2);

    // A chained reader hands out the two halves in separate reads
    let stream = Cursor::new(head.to_vec()).chain(Cursor::new(tail.to_vec()));
    let mut sm = SubMaster::from_reader(stream, 1024);

    assert_eq!(sm.poll().unwrap(), Poll::Idle);
    assert_eq!(sm.poll().unwrap(), Poll::Heartbeat);
    assert_eq!(sm.received(Topic::CarControl), 1);
    assert_eq!(sm.poll().unwrap(), Poll::Closed);
}

#[test]
fn oversized_frame_is_fatal() {
    init_logging();

    let message = engaged_controls(1.0, 2.0);
    let mut sm = SubMaster::from_reader(Cursor::new(frame(1, &message)), 8);
    assert!(matches!(
        sm.poll(),
        Err(TelemetryError::FrameTooLarge { limit: 8, .. })
    ));
}

#[cfg(unix)]
#[test]
fn unix_socket_stream_with_timeouts() {
    use std::io::Write;
    use std::os::unix::net::UnixStream;
    use std::time::Duration;

    init_logging();

    let (mut publisher, subscriber) = UnixStream::pair().unwrap();
    subscriber
        .set_read_timeout(Some(Duration::from_millis(20)))
        .unwrap();
    let mut sm = SubMaster::from_reader(subscriber, 1024 * 1024);

    // Nothing published yet
    assert_eq!(sm.poll().unwrap(), Poll::Idle);

    let mut batch = Vec::new();
    batch.extend(frame(
        10,
        &TopicMessage::CarState(CarState {
            v_ego: 26.0,
            standstill: false,
            steering_pressed: false,
        }),
    ));
    batch.extend(frame(11, &engaged_controls(4.9, 5.0)));
    batch.extend(frame(12, &TopicMessage::CarControl(CarControl::default())));
    publisher.write_all(&batch).unwrap();

    let mut poll = sm.poll().unwrap();
    while poll == Poll::Idle {
        poll = sm.poll().unwrap();
    }
    assert_eq!(poll, Poll::Heartbeat);

    let snapshot = sm.snapshot(ControlLaw::Pid);
    assert_eq!(snapshot.speed, 26.0);
    let controller = snapshot.controller().unwrap();
    assert_eq!(controller.steering_angle_deg, 4.9);
    assert_eq!(controller.steering_angle_desired_deg, 5.0);

    drop(publisher);
    let mut poll = sm.poll().unwrap();
    while poll == Poll::Idle {
        poll = sm.poll().unwrap();
    }
    assert_eq!(poll, Poll::Closed);
}
