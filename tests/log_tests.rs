//! Tests for the simulation log
//!
//! These tests verify that:
//! - Entries carry the simulation timestamp at which they were logged
//! - Filtering, counting, and recent-entry queries behave correctly
//! - The log serializes to JSON
//! - Ink deposition entries follow the expected message format

use bevy::prelude::*;
use regex::Regex;
use std::time::Duration;

use inkfall::combat::CombatPlugin;
use inkfall::sim::components::{Cloud, CloudKind, InkEmitter, RenderColor};
use inkfall::sim::log::{SimEventType, SimLog};
use inkfall::sim::CloudPlugin;
use inkfall::world::{Body, Velocity};

// =============================================================================
// Pure Log Tests
// =============================================================================

#[test]
fn test_entries_carry_sim_time() {
    let mut log = SimLog::default();
    log.sim_time = 1.5;
    log.log(SimEventType::Ink, "first".to_string());
    log.sim_time = 3.0;
    log.log(SimEventType::Combine, "second".to_string());

    assert_eq!(log.entries[0].timestamp, 1.5);
    assert_eq!(log.entries[1].timestamp, 3.0);
}

#[test]
fn test_filter_and_count_by_type() {
    let mut log = SimLog::default();
    log.log(SimEventType::Ink, "a".to_string());
    log.log(SimEventType::Combine, "b".to_string());
    log.log(SimEventType::Ink, "c".to_string());

    assert_eq!(log.count_of(SimEventType::Ink), 2);
    assert_eq!(log.count_of(SimEventType::Transform), 0);
    let ink = log.filter_by_type(SimEventType::Ink);
    assert_eq!(ink.len(), 2);
    assert_eq!(ink[1].message, "c");
}

#[test]
fn test_recent_returns_last_entries_in_order() {
    let mut log = SimLog::default();
    for i in 0..5 {
        log.log(SimEventType::Combat, format!("entry {}", i));
    }
    let recent = log.recent(2);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].message, "entry 3");
    assert_eq!(recent[1].message, "entry 4");
}

#[test]
fn test_clear_resets_time_and_entries() {
    let mut log = SimLog::default();
    log.sim_time = 10.0;
    log.log(SimEventType::Decay, "x".to_string());
    log.clear();
    assert!(log.entries.is_empty());
    assert_eq!(log.sim_time, 0.0);
}

#[test]
fn test_log_serializes_to_json() {
    let mut log = SimLog::default();
    log.log(SimEventType::Launch, "cloud launched".to_string());
    let json = log.to_json().unwrap();
    assert!(json.contains("cloud launched"));
    assert!(json.contains("Launch"));
}

// =============================================================================
// In-Simulation Format Tests
// =============================================================================

#[test]
fn test_ink_entries_follow_message_format() {
    let mut app = App::new();
    app.insert_resource(Time::<()>::default());
    app.add_plugins((CloudPlugin, CombatPlugin));

    let cloud = Cloud::new(CloudKind::Normal, None, 30.0);
    let color = cloud.original_color;
    app.world_mut().spawn((
        cloud,
        InkEmitter::new(0.2),
        RenderColor(color),
        Transform::from_xyz(0.0, 3.0, 0.0),
        Velocity(Vec3::ZERO),
        Body::kinematic(),
    ));

    for _ in 0..90 {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(1.0 / 60.0));
        app.update();
    }

    let pattern =
        Regex::new(r"^ink dropped at -?\d+\.\d -?\d+\.\d -?\d+\.\d \(size \d+\.\d\)$").unwrap();
    let log = app.world().resource::<SimLog>();
    let ink = log.filter_by_type(SimEventType::Ink);
    assert!(!ink.is_empty(), "the cloud should have rained by now");
    for entry in ink {
        assert!(
            pattern.is_match(&entry.message),
            "unexpected ink message: {}",
            entry.message
        );
        assert!(entry.timestamp > 0.0);
    }
}
