mod support;

use api::{EventSink, FaceFrameFeatures};
use common::lifecycle::FACE_FRAME_FEATURES;
use common::{
    LifecycleError, LifecycleState, SensorLifecycle, StatusProperty, NO_SENSOR_STATUS_TEXT,
    RUNNING_STATUS_TEXT, SENSOR_NOT_AVAILABLE_STATUS_TEXT,
};
use std::sync::{Arc, Mutex};
use support::MockDriver;

#[test]
fn open_allocates_one_slot_per_body() {
    let driver = MockDriver::new(6);
    let states = driver.source_states.clone();
    let status = StatusProperty::new();
    let mut lifecycle = SensorLifecycle::new(Box::new(driver), status.clone());
    assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);

    let (sink, _rx) = EventSink::channel(4);
    lifecycle.open(sink).expect("open");

    assert_eq!(lifecycle.state(), LifecycleState::Open);
    assert_eq!(lifecycle.slots().len(), 6);
    assert_eq!(states.lock().unwrap().len(), 6);
    assert!(lifecycle.mapper().is_some());
    assert_eq!(status.get().as_deref(), Some(RUNNING_STATUS_TEXT));
}

#[test]
fn face_sources_request_the_full_feature_set() {
    let driver = MockDriver::new(1);
    let status = StatusProperty::new();
    let mut lifecycle = SensorLifecycle::new(Box::new(driver), status);
    let (sink, _rx) = EventSink::channel(4);
    lifecycle.open(sink).unwrap();

    let features = lifecycle.slots().source(0).unwrap().features();
    assert_eq!(features, FACE_FRAME_FEATURES);
    assert!(features.contains(FaceFrameFeatures::ROTATION_ORIENTATION));
    assert!(features.contains(FaceFrameFeatures::POINTS_IN_COLOR_SPACE));
    assert!(!features.contains(FaceFrameFeatures::POINTS_IN_INFRARED_SPACE));
}

#[test]
fn unavailable_sensor_reports_no_sensor_on_open() {
    let mut driver = MockDriver::new(2);
    driver.available = false;
    let status = StatusProperty::new();
    let mut lifecycle = SensorLifecycle::new(Box::new(driver), status.clone());
    let (sink, _rx) = EventSink::channel(4);
    lifecycle.open(sink).unwrap();
    assert_eq!(status.get().as_deref(), Some(NO_SENSOR_STATUS_TEXT));
}

#[test]
fn close_releases_in_order() {
    let driver = MockDriver::new(2);
    let calls = driver.calls.clone();
    let mut lifecycle = SensorLifecycle::new(Box::new(driver), StatusProperty::new());
    let (sink, _rx) = EventSink::channel(4);
    lifecycle.open(sink).unwrap();
    calls.lock().unwrap().clear();

    lifecycle.close();
    lifecycle.close();

    assert_eq!(lifecycle.state(), LifecycleState::Closed);
    assert_eq!(
        *calls.lock().unwrap(),
        vec!["dispose 0", "dispose 1", "close body reader", "close sensor"]
    );
    assert!(matches!(
        lifecycle.open(EventSink::channel(1).0),
        Err(LifecycleError::Closed)
    ));
}

#[test]
fn opening_twice_is_rejected() {
    let mut lifecycle = SensorLifecycle::new(Box::new(MockDriver::new(1)), StatusProperty::new());
    lifecycle.open(EventSink::channel(1).0).unwrap();
    assert!(matches!(
        lifecycle.open(EventSink::channel(1).0),
        Err(LifecycleError::AlreadyOpen)
    ));
}

#[test]
fn failed_open_releases_what_was_opened() {
    let mut driver = MockDriver::new(2);
    driver.fail_open = true;
    let calls = driver.calls.clone();
    let states = driver.source_states.clone();
    let mut lifecycle = SensorLifecycle::new(Box::new(driver), StatusProperty::new());

    let err = lifecycle.open(EventSink::channel(1).0).unwrap_err();
    assert!(matches!(err, LifecycleError::Driver { stage: "open sensor", .. }));
    assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);
    assert!(states.lock().unwrap().iter().all(|s| s.lock().unwrap().disposed));
    assert!(calls
        .lock()
        .unwrap()
        .contains(&"close body reader".to_string()));
}

#[test]
fn availability_changes_only_touch_the_status() {
    let status = StatusProperty::new();
    let mut lifecycle = SensorLifecycle::new(Box::new(MockDriver::new(1)), status.clone());
    lifecycle.open(EventSink::channel(1).0).unwrap();

    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let seen_by_listener = seen.clone();
    status.subscribe(move |text| seen_by_listener.lock().unwrap().push(text.to_string()));

    lifecycle.on_availability_changed(false);
    assert_eq!(lifecycle.state(), LifecycleState::Open);
    assert_eq!(status.get().as_deref(), Some(SENSOR_NOT_AVAILABLE_STATUS_TEXT));

    lifecycle.on_availability_changed(false);
    lifecycle.on_availability_changed(true);
    assert_eq!(status.get().as_deref(), Some(RUNNING_STATUS_TEXT));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![SENSOR_NOT_AVAILABLE_STATUS_TEXT, RUNNING_STATUS_TEXT],
        "repeated values must not notify"
    );

    lifecycle.close();
    lifecycle.on_availability_changed(false);
    assert_eq!(status.get().as_deref(), Some(RUNNING_STATUS_TEXT));
}
