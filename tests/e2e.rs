mod common;

use common::TestCore;
use rs9000::{
    CoreAuditStage, CoreConfig, DisplayUnit, Occupancy, ScriptDriver, Seat, VehicleClass,
};
use serde_json::json;

#[test]
fn driver_seat_session_shows_toggles_and_hides() {
    let mut t = TestCore::new();
    assert_eq!(
        t.drain_messages(),
        vec![json!({"type": "units", "data": {"label": "mph"}})]
    );

    t.core.context_mut().set_radar_enabled(true);
    t.frame();
    assert!(!t.radar_displayed());

    t.enter_driver_seat();
    t.frame();
    assert!(t.radar_displayed());
    assert_eq!(
        t.drain_messages(),
        vec![json!({"type": "radarDisplay", "data": {"visible": true}})]
    );

    t.tap_toggle();
    assert!(t.controller_visible());
    assert_eq!(
        t.drain_messages(),
        vec![json!({"type": "controllerDisplay", "data": {"visible": true}})]
    );

    t.exit_vehicle();
    t.frame();
    assert!(!t.radar_displayed());
    assert!(t.controller_visible());
    assert_eq!(
        t.drain_messages(),
        vec![json!({"type": "radarDisplay", "data": {"visible": false}})]
    );

    assert_eq!(t.audit.count(CoreAuditStage::RadarShown), 1);
    assert_eq!(t.audit.count(CoreAuditStage::RadarHidden), 1);
    assert_eq!(t.audit.count(CoreAuditStage::ControllerToggled), 1);
}

#[test]
fn toggle_is_ignored_outside_a_qualifying_vehicle() {
    let mut t = TestCore::new();
    t.tap_toggle();
    assert!(!t.controller_visible());

    t.host().set_occupancy(Some(Occupancy::driver(VehicleClass(2))));
    t.tap_toggle();
    assert!(!t.controller_visible());

    t.host().set_occupancy(Some(Occupancy::new(
        Seat::Passenger(0),
        VehicleClass::EMERGENCY,
    )));
    t.tap_toggle();
    assert!(!t.controller_visible());
    assert_eq!(t.drain_messages().len(), 1);
}

#[test]
fn enabling_while_seated_shows_on_the_next_frame() {
    let mut t = TestCore::new();
    t.enter_driver_seat();
    t.frames(3);
    assert!(!t.radar_displayed());

    t.core
        .dispatch_request(r#"{"type":"setRadarEnabled","data":{"enabled":true}}"#)
        .unwrap();
    t.frame();
    assert!(t.radar_displayed());

    // Disabling does not hide a displayed radar; only leaving the seat does.
    t.core.context_mut().set_radar_enabled(false);
    t.frame();
    assert!(t.radar_displayed());
}

#[test]
fn keyboard_confirmation_reaches_listeners_once() {
    let mut t = TestCore::new();
    assert!(t.core.show_keyboard(8, "").unwrap());
    t.frames(3);
    assert!(t.keyboard_results.borrow().is_empty());

    t.host().set_keyboard_status(1, Some("ABC123".to_string()));
    t.frames(3);
    assert_eq!(*t.keyboard_results.borrow(), vec!["ABC123".to_string()]);
    assert!(!t.core.scheduler().contains("keyboard.poll"));

    // A new session can start once the previous one finished.
    assert!(t.core.show_keyboard(4, "X").unwrap());
    assert_eq!(t.host().prompts().len(), 2);
}

#[test]
fn keyboard_cancellation_is_silent() {
    let mut t = TestCore::new();
    t.core.show_keyboard(8, "PLATE").unwrap();
    t.host().set_keyboard_status(2, None);
    t.frames(2);
    assert!(t.keyboard_results.borrow().is_empty());
    assert!(!t.core.context().keyboard().is_active());
    assert_eq!(t.audit.count(CoreAuditStage::KeyboardCancelled), 1);
}

#[test]
fn confirmed_without_text_emits_empty_string() {
    let mut t = TestCore::new();
    t.core.show_keyboard(8, "").unwrap();
    t.host().set_keyboard_status(1, None);
    t.frame();
    assert_eq!(*t.keyboard_results.borrow(), vec![String::new()]);
}

#[test]
fn unknown_keyboard_status_keeps_waiting() {
    let mut t = TestCore::new();
    t.core.show_keyboard(8, "").unwrap();
    t.host().set_keyboard_status(7, None);
    t.frames(2);
    assert!(t.core.context().keyboard().is_active());
    assert!(t.logs.messages().iter().any(|m| m == "unknown_status"));
}

#[test]
fn configured_units_are_announced() {
    let config = CoreConfig::from_settings_json(r#"{"units":"km/h"}"#).unwrap();
    assert_eq!(config.units, DisplayUnit::Kilometers);
    let t = TestCore::with_config(config);
    assert_eq!(
        t.drain_messages(),
        vec![json!({"type": "units", "data": {"label": "km/h"}})]
    );
}

#[test]
fn metrics_snapshots_reach_the_log() {
    let mut config = CoreConfig::default();
    config.metrics_interval = std::time::Duration::from_millis(32);
    let mut t = TestCore::with_config(config);
    t.enter_driver_seat();
    t.frames(4);
    let snapshots: Vec<_> = t
        .logs
        .events()
        .into_iter()
        .filter(|e| e.message == "core_metrics")
        .collect();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].target, "rs9000::runtime.metrics");
}

#[test]
fn shutdown_stops_all_work() {
    let mut t = TestCore::new();
    t.core.context_mut().set_radar_enabled(true);
    t.core.shutdown();
    t.enter_driver_seat();
    let summary = t.frame();
    assert_eq!(summary.invoked, 0);
    assert!(!t.radar_displayed());
    assert_eq!(t.audit.count(CoreAuditStage::CoreStopped), 1);
}

#[test]
fn script_driver_replays_a_patrol() {
    let script = r#"
{"radarEnabled":true,"deltaMs":16}
{"occupancy":{"seat":-1,"class":18}}
{"occupancy":{"seat":-1,"class":18},"held":[73]}
{"occupancy":{"seat":-1,"class":18},"request":{"type":"showKeyboard","data":{"limit":8}}}
{"occupancy":{"seat":-1,"class":18},"keyboardStatus":1,"keyboardText":"LSPD01"}
{"occupancy":{"seat":0,"class":18}}
"#;
    let mut driver = ScriptDriver::new(CoreConfig::default());
    let mut out = Vec::<u8>::new();
    let report = driver.run(script.as_bytes(), &mut out).unwrap();
    let lines: Vec<String> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();

    assert_eq!(report.frames, 6);
    assert_eq!(report.messages, 4);
    assert_eq!(report.events, 1);
    assert_eq!(
        lines,
        vec![
            r#"{"type":"units","data":{"label":"mph"}}"#,
            r#"{"type":"radarDisplay","data":{"visible":true}}"#,
            r#"{"type":"controllerDisplay","data":{"visible":true}}"#,
            r#"{"event":"rs9000:_keyboardResult","data":"LSPD01"}"#,
            r#"{"type":"radarDisplay","data":{"visible":false}}"#,
        ]
    );
}
