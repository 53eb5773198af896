// ABOUTME: Integration tests for the hot-reload controller
// ABOUTME: Eligibility rules, live control pushes, all-camera atomicity, batches and concurrency
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{attach_recording_camera, create_test_controller, ControlCall, RecordingControl};
use motionctl::dispatch::{EditAction, EditStatus};
use motionctl::errors::ErrorCode;
use motionctl::hot_reload::controls::NoControls;
use motionctl::hot_reload::Scope;
use motionctl::registry::VisibilityTier;

#[tokio::test]
async fn test_single_camera_edit_reports_old_and_new() {
    let controller = create_test_controller(1).await;
    let (cam, _) = attach_recording_camera(&controller, 1).await;

    let outcome = controller
        .apply("threshold", "2000", Scope::SingleCamera(cam))
        .await;
    assert_eq!(outcome.status, EditStatus::Applied);
    assert_eq!(outcome.old_value.as_deref(), Some("1500"));
    assert_eq!(outcome.new_value.as_deref(), Some("2000"));

    let config = controller.camera_config(cam).await.unwrap();
    assert_eq!(config.int("threshold"), Some(2000));

    // The default context is untouched by a single-camera edit
    let default = controller.get("threshold", Scope::AllCameras).await;
    assert_eq!(default.new_value.as_deref(), Some("1500"));
}

#[tokio::test]
async fn test_same_value_is_unchanged() {
    let controller = create_test_controller(1).await;
    let (cam, _) = attach_recording_camera(&controller, 1).await;

    let outcome = controller
        .apply("threshold", "1500", Scope::SingleCamera(cam))
        .await;
    assert_eq!(outcome.status, EditStatus::Unchanged);
    assert!(outcome.status.is_success());
}

#[tokio::test]
async fn test_reserved_namespace_blocked_at_every_ceiling() {
    let controller = create_test_controller(3).await;
    let (cam, _) = attach_recording_camera(&controller, 1).await;

    let outcome = controller
        .apply("sql_event_start", "DROP TABLE", Scope::SingleCamera(cam))
        .await;
    assert_eq!(outcome.status, EditStatus::RejectedSecurity);
    assert_eq!(
        outcome.error.as_ref().map(|e| e.code),
        Some(ErrorCode::SecurityViolation)
    );
    assert!(!controller.validate("sql_event_start").await);

    let config = controller.camera_config(cam).await.unwrap();
    assert_eq!(config.text("sql_event_start"), Some(""));
}

#[tokio::test]
async fn test_local_edits_skip_remote_eligibility() {
    let controller = create_test_controller(1).await;

    let outcome = controller
        .apply_local("sql_event_start", "insert", Scope::AllCameras)
        .await;
    assert_eq!(outcome.status, EditStatus::Applied);
}

#[tokio::test]
async fn test_tier_above_ceiling_refused() {
    let controller = create_test_controller(1).await;
    let (cam, _) = attach_recording_camera(&controller, 1).await;

    let outcome = controller
        .apply("target_dir", "/tmp/elsewhere", Scope::SingleCamera(cam))
        .await;
    assert_eq!(outcome.status, EditStatus::RejectedPermission);

    // Raising the ceiling makes the same edit eligible
    controller
        .apply_local("webcontrol_parms", "2", Scope::AllCameras)
        .await;
    assert_eq!(controller.ceiling().await, VisibilityTier::Advanced);
    let outcome = controller
        .apply("target_dir", "/tmp/elsewhere/", Scope::SingleCamera(cam))
        .await;
    assert_eq!(outcome.status, EditStatus::Applied);
    assert_eq!(outcome.new_value.as_deref(), Some("/tmp/elsewhere"));
}

#[tokio::test]
async fn test_restricted_and_restart_only_refused() {
    let controller = create_test_controller(3).await;

    assert!(!controller.validate("webcontrol_port").await);
    assert!(!controller.validate("framerate").await);
    assert!(controller.validate("threshold").await);

    let restart_only = controller.apply("framerate", "25", Scope::AllCameras).await;
    assert_eq!(restart_only.status, EditStatus::RejectedPermission);
    assert!(restart_only
        .error
        .unwrap()
        .message
        .contains("requires a daemon restart"));

    let unknown = controller.apply("no_such_thing", "1", Scope::AllCameras).await;
    assert_eq!(unknown.status, EditStatus::NotFound);
}

#[tokio::test]
async fn test_zero_ceiling_refuses_everything() {
    let controller = create_test_controller(0).await;

    let outcome = controller
        .apply("threshold", "2000", Scope::AllCameras)
        .await;
    assert_eq!(outcome.status, EditStatus::RejectedPermission);
}

#[tokio::test]
async fn test_live_controls_pushed_after_commit() {
    let controller = create_test_controller(1).await;
    let (cam, control) = attach_recording_camera(&controller, 1).await;

    controller
        .apply("libcam_brightness", "0.5", Scope::SingleCamera(cam))
        .await;
    controller
        .apply("libcam_colour_gain_r", "1.5", Scope::SingleCamera(cam))
        .await;
    controller
        .apply("libcam_colour_gain_b", "2.5", Scope::SingleCamera(cam))
        .await;
    controller
        .apply("libcam_af_trigger", "1", Scope::SingleCamera(cam))
        .await;

    assert_eq!(
        control.calls(),
        vec![
            ControlCall::Brightness(0.5),
            ControlCall::ColourGains(1.5, 0.0),
            ControlCall::ColourGains(1.5, 2.5),
            ControlCall::AfCancel,
        ]
    );
}

#[tokio::test]
async fn test_af_trigger_commands_sent_on_every_set() {
    let controller = create_test_controller(1).await;
    let (cam, control) = attach_recording_camera(&controller, 1).await;

    // 0 is the stored default, so the first Set leaves the value unchanged
    let first = controller
        .apply("libcam_af_trigger", "0", Scope::SingleCamera(cam))
        .await;
    assert_eq!(first.status, EditStatus::Unchanged);
    controller
        .apply("libcam_af_trigger", "1", Scope::SingleCamera(cam))
        .await;
    controller
        .apply("libcam_af_trigger", "1", Scope::SingleCamera(cam))
        .await;

    assert_eq!(
        control.calls(),
        vec![
            ControlCall::AfTrigger,
            ControlCall::AfCancel,
            ControlCall::AfCancel,
        ]
    );
}

#[tokio::test]
async fn test_af_trigger_reaches_every_camera() {
    let controller = create_test_controller(1).await;
    let (_, first) = attach_recording_camera(&controller, 1).await;
    let (_, second) = attach_recording_camera(&controller, 2).await;

    controller
        .apply("libcam_af_trigger", "0", Scope::AllCameras)
        .await;
    controller
        .apply("libcam_af_trigger", "0", Scope::AllCameras)
        .await;

    for control in [first, second] {
        assert_eq!(
            control.calls(),
            vec![ControlCall::AfTrigger, ControlCall::AfTrigger]
        );
    }
}

#[tokio::test]
async fn test_unchanged_value_does_not_touch_device() {
    let controller = create_test_controller(1).await;
    let (cam, control) = attach_recording_camera(&controller, 1).await;

    controller
        .apply("libcam_iso", "100", Scope::SingleCamera(cam))
        .await;
    assert!(control.calls().is_empty());
}

#[tokio::test]
async fn test_device_refusal_keeps_commit_and_adds_notice() {
    let controller = create_test_controller(1).await;
    let index = controller
        .attach_camera(Some(4), &[], RecordingControl::refusing_brightness())
        .await
        .unwrap();

    let outcome = controller
        .apply("libcam_brightness", "-0.25", Scope::SingleCamera(index))
        .await;
    assert_eq!(outcome.status, EditStatus::Applied);
    assert!(outcome.notice.unwrap().contains("sensor busy"));
    let config = controller.camera_config(index).await.unwrap();
    assert_eq!(config.float("libcam_brightness"), Some(-0.25));
}

#[tokio::test]
async fn test_all_cameras_edit_reaches_default_and_cameras() {
    let controller = create_test_controller(1).await;
    let (first, first_control) = attach_recording_camera(&controller, 1).await;
    let (second, second_control) = attach_recording_camera(&controller, 2).await;

    let outcome = controller
        .apply("libcam_iso", "400", Scope::AllCameras)
        .await;
    assert_eq!(outcome.status, EditStatus::Applied);

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.default.int("libcam_iso"), Some(400));
    for (_, config) in &snapshot.cameras {
        assert_eq!(config.int("libcam_iso"), Some(400));
    }
    assert_eq!(first_control.calls(), vec![ControlCall::Iso(400.0)]);
    assert_eq!(second_control.calls(), vec![ControlCall::Iso(400.0)]);
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_all_cameras_rejection_leaves_every_context() {
    let controller = create_test_controller(1).await;
    let (cam, _) = attach_recording_camera(&controller, 1).await;
    controller
        .apply("threshold", "1800", Scope::SingleCamera(cam))
        .await;

    let outcome = controller.apply("threshold", "0", Scope::AllCameras).await;
    assert_eq!(outcome.status, EditStatus::RejectedValidation);

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.default.int("threshold"), Some(1500));
    assert_eq!(snapshot.cameras[0].1.int("threshold"), Some(1800));
}

#[tokio::test]
async fn test_batch_reports_each_entry_in_order() {
    let controller = create_test_controller(1).await;
    let (cam, _) = attach_recording_camera(&controller, 1).await;

    let entries = vec![
        ("threshold".to_owned(), "2500".to_owned()),
        ("threshold".to_owned(), "not-a-number".to_owned()),
        ("sql_event_end".to_owned(), "x".to_owned()),
        ("picture_type".to_owned(), "gif".to_owned()),
        ("bogus".to_owned(), "1".to_owned()),
    ];
    let report = controller
        .apply_batch(&entries, Scope::SingleCamera(cam))
        .await;

    assert_eq!(report.summary.total, 5);
    assert_eq!(report.summary.success, 1);
    assert_eq!(report.summary.errors, 4);
    let statuses: Vec<EditStatus> = report.entries.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            EditStatus::Applied,
            EditStatus::RejectedValidation,
            EditStatus::RejectedSecurity,
            EditStatus::RejectedValidation,
            EditStatus::NotFound,
        ]
    );

    // Failures after the first entry do not roll it back
    let config = controller.camera_config(cam).await.unwrap();
    assert_eq!(config.int("threshold"), Some(2500));
}

#[tokio::test]
async fn test_batch_counts_unchanged_as_success() {
    let controller = create_test_controller(1).await;
    let entries = vec![
        ("threshold".to_owned(), "1500".to_owned()),
        ("event_gap".to_owned(), "30".to_owned()),
    ];
    let report = controller.apply_batch(&entries, Scope::AllCameras).await;
    assert_eq!(report.summary.success, 2);
    assert_eq!(report.summary.errors, 0);
    assert_eq!(report.entries[0].status, EditStatus::Unchanged);
}

#[tokio::test]
async fn test_concurrent_edits_never_share_an_old_value() {
    let controller = create_test_controller(1).await;
    let (cam, _) = attach_recording_camera(&controller, 1).await;

    let mut handles = Vec::new();
    for value in 2000..2040 {
        let controller = Arc::clone(&controller);
        handles.push(tokio::spawn(async move {
            controller
                .apply("threshold", &value.to_string(), Scope::SingleCamera(cam))
                .await
        }));
    }
    let mut chain = HashMap::new();
    for handle in handles {
        let outcome = handle.await.unwrap();
        assert_eq!(outcome.status, EditStatus::Applied);
        let previous = chain.insert(outcome.old_value.unwrap(), outcome.new_value.unwrap());
        assert!(previous.is_none(), "two edits observed the same old value");
    }

    // Following old -> new from the default visits every edit exactly once
    let mut current = "1500".to_owned();
    for _ in 0..40 {
        current = chain.remove(&current).expect("broken edit chain");
    }
    assert!(chain.is_empty());
    let config = controller.camera_config(cam).await.unwrap();
    assert_eq!(config.render("threshold"), Some(current));
}

#[tokio::test]
async fn test_concurrent_all_camera_and_single_edits_stay_consistent() {
    let controller = create_test_controller(1).await;
    let (first, _) = attach_recording_camera(&controller, 1).await;
    attach_recording_camera(&controller, 2).await;

    let mut handles = Vec::new();
    for step in 0..20 {
        let controller = Arc::clone(&controller);
        handles.push(tokio::spawn(async move {
            let scope = if step % 2 == 0 {
                Scope::AllCameras
            } else {
                Scope::SingleCamera(first)
            };
            controller
                .apply("event_gap", &(100 + step).to_string(), scope)
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().status.is_success());
    }

    // Every all-camera edit landed on the default and the second camera together
    let snapshot = controller.snapshot().await;
    assert_eq!(
        snapshot.default.int("event_gap"),
        snapshot.cameras[1].1.int("event_gap")
    );
}

#[tokio::test]
async fn test_device_id_rules() {
    let controller = create_test_controller(2).await;
    let (first, _) = attach_recording_camera(&controller, 1).await;
    let (second, _) = attach_recording_camera(&controller, 2).await;

    let conflict = controller
        .apply("device_id", "1", Scope::SingleCamera(second))
        .await;
    assert_eq!(conflict.status, EditStatus::RejectedConflict);

    let all = controller.apply("device_id", "9", Scope::AllCameras).await;
    assert_eq!(all.status, EditStatus::RejectedConflict);

    let out_of_range = controller
        .apply("device_id", "32001", Scope::SingleCamera(first))
        .await;
    assert_eq!(out_of_range.status, EditStatus::RejectedValidation);

    let moved = controller
        .apply("device_id", "7", Scope::SingleCamera(first))
        .await;
    assert_eq!(moved.status, EditStatus::Applied);
    assert_eq!(controller.find_camera(7).await, Some(first));
    assert_eq!(controller.find_camera(1).await, None);
}

#[tokio::test]
async fn test_attach_assigns_smallest_free_id_and_skips_peripherals() {
    let controller = create_test_controller(1).await;
    controller.register_peripheral(1).await.unwrap();
    assert!(controller.register_peripheral(1).await.is_err());
    assert!(controller.register_peripheral(0).await.is_err());

    let index = controller
        .attach_camera(None, &[], Arc::new(NoControls))
        .await
        .unwrap();
    let cameras = controller.cameras().await;
    assert_eq!(cameras.len(), 1);
    assert_eq!(cameras[0].id, 2);
    assert_eq!(cameras[0].name, "camera 2");
    assert_eq!(cameras[0].index, index);

    let taken = controller
        .attach_camera(Some(2), &[], Arc::new(NoControls))
        .await;
    assert_eq!(taken.unwrap_err().code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_attach_overrides_and_detach() {
    let controller = create_test_controller(1).await;
    let overrides = vec![
        ("device_name".to_owned(), "porch".to_owned()),
        ("threshold".to_owned(), "nope".to_owned()),
    ];
    let index = controller
        .attach_camera(Some(3), &overrides, Arc::new(NoControls))
        .await
        .unwrap();

    let config = controller.camera_config(index).await.unwrap();
    assert_eq!(config.text("device_name"), Some("porch"));
    assert_eq!(config.int("threshold"), Some(1500));
    assert_eq!(controller.cameras().await[0].name, "porch");

    controller.detach_camera(index).await.unwrap();
    assert!(controller.cameras().await.is_empty());
    assert!(controller.detach_camera(index).await.is_err());

    let outcome = controller
        .apply("threshold", "10", Scope::SingleCamera(index))
        .await;
    assert_eq!(outcome.status, EditStatus::NotFound);
}

#[tokio::test]
async fn test_list_allowed_and_params_reads() {
    let controller = create_test_controller(1).await;

    let allowed = controller
        .read("picture_type", EditAction::ListAllowed, Scope::AllCameras)
        .await;
    assert_eq!(allowed.status, EditStatus::Read);
    assert!(allowed.detail.is_some());

    let not_list = controller
        .read("threshold", EditAction::ListAllowed, Scope::AllCameras)
        .await;
    assert_eq!(not_list.status, EditStatus::RejectedValidation);
}

#[tokio::test]
async fn test_action_policy_follows_default_context() {
    let controller = create_test_controller(1).await;
    assert!(!controller.action_policy().await.is_enabled("power"));
    assert!(controller.action_policy().await.is_enabled("movies"));

    controller
        .apply_local("webcontrol_actions", "power=on,movies=off", Scope::AllCameras)
        .await;
    let policy = controller.action_policy().await;
    assert!(policy.is_enabled("power"));
    assert!(!policy.is_enabled("movies"));
}
