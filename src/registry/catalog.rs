// ABOUTME: Static catalog of every camera parameter the control plane knows about
// ABOUTME: Types, bounds, allowed tokens, tiers and hot-reload flags in one ordered table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::types::{
    boolean, float, int, list, params, string, Category as C, CustomHandler, ParameterDescriptor,
    VisibilityTier as T,
};

const INT_MAX: i64 = i32::MAX as i64;

const LOG_TYPES: &[&str] = &["ALL", "COR", "STR", "ENC", "NET", "DBL", "EVT", "TRK", "VID"];
const PAUSE_MODES: &[&str] = &["schedule", "on", "off"];
const FLIP_AXES: &[&str] = &["none", "vertical", "horizontal"];
const LOCATE_MODES: &[&str] = &["off", "on", "preview"];
const LOCATE_STYLES: &[&str] = &["box", "redbox", "cross", "redcross"];
const SECONDARY_METHODS: &[&str] = &["none", "haar", "hog", "dnn"];
const PICTURE_OUTPUTS: &[&str] = &["on", "off", "first", "best", "center"];
const PICTURE_MOTION_OUTPUTS: &[&str] = &["on", "off", "roi"];
const PICTURE_TYPES: &[&str] = &["jpg", "webp", "ppm"];
const ENCODER_PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];
const CONTAINERS: &[&str] = &["mkv", "mp4", "3gp"];
const ON_OFF: &[&str] = &["off", "on"];
const TIMELAPSE_MODES: &[&str] = &["off", "hourly", "daily", "weekly", "monthly"];
const WEB_INTERFACES: &[&str] = &["default", "auto"];
const WEB_AUTH_METHODS: &[&str] = &["none", "basic", "digest"];
const PREVIEW_METHODS: &[&str] = &["mjpeg", "snapshot"];
const PREVIEW_PTZ: &[&str] = &["on", "off", "center"];
const DATABASE_TYPES: &[&str] = &["sqlite3", "mariadb", "mysql", "postgresql"];
const SOUND_WINDOWS: &[&str] = &["hamming", "hann", "none"];

/// Every known parameter, in display order
pub static CATALOG: &[ParameterDescriptor] = &[
    // System
    boolean("daemon", C::System, T::Restricted, false, false),
    string("conf_filename", C::System, T::Never, false, ""),
    string("pid_file", C::System, T::Restricted, false, ""),
    string("log_file", C::System, T::Restricted, false, "").handled_by(CustomHandler::LogFile),
    int("log_level", C::System, T::Advanced, true, 6, 1, 9),
    list("log_type", C::System, T::Advanced, true, "ALL", LOG_TYPES),
    boolean("native_language", C::System, T::Advanced, true, true),
    // Camera
    string("device_name", C::Camera, T::Limited, true, ""),
    int("device_id", C::Camera, T::Advanced, true, 0, 0, 32000)
        .handled_by(CustomHandler::DeviceId),
    list("pause", C::Camera, T::Limited, true, "off", PAUSE_MODES)
        .handled_by(CustomHandler::Pause),
    string("target_dir", C::Camera, T::Advanced, true, "").handled_by(CustomHandler::TargetDir),
    int("watchdog_tmo", C::Camera, T::Advanced, false, 90, 1, INT_MAX),
    int("watchdog_kill", C::Camera, T::Advanced, false, 0, 0, INT_MAX),
    int("device_tmo", C::Camera, T::Advanced, false, 30, 1, INT_MAX),
    string("camera_dir", C::Camera, T::Restricted, false, ""),
    // Source
    string("v4l2_device", C::Source, T::Advanced, false, ""),
    params("v4l2_params", C::Source, T::Advanced, false, ""),
    string("netcam_url", C::Source, T::Advanced, false, ""),
    params("netcam_params", C::Source, T::Advanced, false, ""),
    string("netcam_high_url", C::Source, T::Advanced, false, ""),
    params("netcam_high_params", C::Source, T::Advanced, false, ""),
    string("netcam_userpass", C::Source, T::Restricted, false, ""),
    string("libcam_device", C::Source, T::Advanced, false, "camera0"),
    params("libcam_params", C::Source, T::Advanced, false, ""),
    float("libcam_brightness", C::Source, T::Limited, true, 0.0, -1.0, 1.0),
    float("libcam_contrast", C::Source, T::Limited, true, 1.0, 0.0, 32.0),
    int("libcam_iso", C::Source, T::Limited, true, 100, 100, 6400),
    boolean("libcam_awb_enable", C::Source, T::Limited, true, true),
    int("libcam_awb_mode", C::Source, T::Limited, true, 0, 0, 7),
    boolean("libcam_awb_locked", C::Source, T::Limited, true, false),
    int("libcam_colour_temp", C::Source, T::Limited, true, 0, 0, 10000),
    float("libcam_colour_gain_r", C::Source, T::Limited, true, 0.0, 0.0, 8.0),
    float("libcam_colour_gain_b", C::Source, T::Limited, true, 0.0, 0.0, 8.0),
    int("libcam_af_mode", C::Source, T::Limited, true, 0, 0, 2),
    float("libcam_lens_position", C::Source, T::Limited, true, 0.0, 0.0, 15.0),
    int("libcam_af_range", C::Source, T::Limited, true, 0, 0, 2),
    int("libcam_af_speed", C::Source, T::Limited, true, 0, 0, 1),
    int("libcam_af_trigger", C::Source, T::Limited, true, 0, 0, 1),
    // Image
    int("width", C::Image, T::Advanced, false, 640, 64, 9999),
    int("height", C::Image, T::Advanced, false, 480, 64, 9999),
    int("framerate", C::Image, T::Advanced, false, 15, 2, 100),
    int("minimum_frame_time", C::Image, T::Advanced, true, 0, 0, INT_MAX),
    int("rotate", C::Image, T::Advanced, false, 0, 0, 270).handled_by(CustomHandler::Rotate),
    list("flip_axis", C::Image, T::Advanced, false, "none", FLIP_AXES),
    // Overlay
    list("locate_motion_mode", C::Overlay, T::Limited, true, "off", LOCATE_MODES),
    list("locate_motion_style", C::Overlay, T::Limited, true, "box", LOCATE_STYLES),
    string("text_left", C::Overlay, T::Limited, true, ""),
    string("text_right", C::Overlay, T::Limited, true, "%Y-%m-%d\\n%T"),
    boolean("text_changes", C::Overlay, T::Limited, true, false),
    int("text_scale", C::Overlay, T::Limited, true, 1, 1, 10),
    string("text_event", C::Overlay, T::Limited, true, "%Y%m%d%H%M%S"),
    // Method
    boolean("emulate_motion", C::Method, T::Limited, true, false),
    int("threshold", C::Method, T::Limited, true, 1500, 1, INT_MAX),
    int("threshold_maximum", C::Method, T::Advanced, true, 0, 0, INT_MAX),
    int("threshold_sdevx", C::Method, T::Advanced, true, 0, 0, INT_MAX),
    int("threshold_sdevy", C::Method, T::Advanced, true, 0, 0, INT_MAX),
    int("threshold_sdevxy", C::Method, T::Advanced, true, 0, 0, INT_MAX),
    int("threshold_ratio", C::Method, T::Advanced, true, 0, 0, 100),
    int("threshold_ratio_change", C::Method, T::Advanced, true, 64, 0, 255),
    boolean("threshold_tune", C::Method, T::Advanced, true, false),
    list("secondary_method", C::Method, T::Advanced, false, "none", SECONDARY_METHODS),
    params("secondary_params", C::Method, T::Advanced, false, ""),
    // Masks
    int("noise_level", C::Masks, T::Limited, true, 32, 1, 255),
    boolean("noise_tune", C::Masks, T::Limited, true, true),
    string("despeckle_filter", C::Masks, T::Advanced, true, ""),
    string("area_detect", C::Masks, T::Advanced, true, ""),
    string("mask_file", C::Masks, T::Advanced, true, ""),
    string("mask_privacy", C::Masks, T::Advanced, true, ""),
    int("smart_mask_speed", C::Masks, T::Advanced, true, 0, 0, 10),
    // Detect
    int("lightswitch_percent", C::Detect, T::Advanced, true, 0, 0, 100),
    int("lightswitch_frames", C::Detect, T::Advanced, true, 5, 1, 1000),
    int("minimum_motion_frames", C::Detect, T::Limited, true, 1, 1, 10000),
    int("static_object_time", C::Detect, T::Advanced, true, 10, 1, INT_MAX),
    int("event_gap", C::Detect, T::Limited, true, 60, 0, INT_MAX),
    int("pre_capture", C::Detect, T::Advanced, true, 3, 0, 1000),
    int("post_capture", C::Detect, T::Advanced, true, 10, 0, INT_MAX),
    // Scripts
    string("on_event_start", C::Scripts, T::Restricted, false, ""),
    string("on_event_end", C::Scripts, T::Restricted, false, ""),
    string("on_picture_save", C::Scripts, T::Restricted, false, ""),
    string("on_area_detected", C::Scripts, T::Restricted, false, ""),
    string("on_motion_detected", C::Scripts, T::Restricted, false, ""),
    string("on_movie_start", C::Scripts, T::Restricted, false, ""),
    string("on_movie_end", C::Scripts, T::Restricted, false, ""),
    string("on_camera_lost", C::Scripts, T::Restricted, false, ""),
    string("on_camera_found", C::Scripts, T::Restricted, false, ""),
    string("on_secondary_detect", C::Scripts, T::Restricted, false, ""),
    string("on_action_user", C::Scripts, T::Restricted, false, ""),
    string("on_sound_alert", C::Scripts, T::Restricted, false, ""),
    // Picture
    list("picture_output", C::Picture, T::Limited, true, "off", PICTURE_OUTPUTS),
    list("picture_output_motion", C::Picture, T::Limited, true, "off", PICTURE_MOTION_OUTPUTS),
    list("picture_type", C::Picture, T::Limited, true, "jpg", PICTURE_TYPES),
    int("picture_quality", C::Picture, T::Limited, true, 75, 1, 100),
    string("picture_exif", C::Picture, T::Advanced, true, ""),
    string("picture_filename", C::Picture, T::Advanced, true, "%v-%Y%m%d%H%M%S-%q")
        .handled_by(CustomHandler::FilenameTemplate),
    int("snapshot_interval", C::Picture, T::Limited, true, 0, 0, INT_MAX),
    string("snapshot_filename", C::Picture, T::Advanced, true, "%v-%Y%m%d%H%M%S-snapshot")
        .handled_by(CustomHandler::FilenameTemplate),
    // Movies
    boolean("movie_output", C::Movies, T::Limited, true, true),
    boolean("movie_output_motion", C::Movies, T::Limited, true, false),
    int("movie_max_time", C::Movies, T::Limited, true, 120, 0, INT_MAX),
    int("movie_bps", C::Movies, T::Advanced, true, 400_000, 0, 9_999_999),
    int("movie_quality", C::Movies, T::Limited, true, 60, 0, 100),
    list("movie_encoder_preset", C::Movies, T::Advanced, true, "medium", ENCODER_PRESETS),
    list("movie_container", C::Movies, T::Advanced, true, "mkv", CONTAINERS),
    list("movie_passthrough", C::Movies, T::Advanced, false, "off", ON_OFF),
    string("movie_filename", C::Movies, T::Advanced, true, "%v-%Y%m%d%H%M%S")
        .handled_by(CustomHandler::FilenameTemplate),
    boolean("movie_extpipe_use", C::Movies, T::Advanced, false, false),
    string("movie_extpipe", C::Movies, T::Restricted, false, ""),
    // Timelapse
    int("timelapse_interval", C::Timelapse, T::Limited, true, 0, 0, INT_MAX),
    list("timelapse_mode", C::Timelapse, T::Limited, true, "daily", TIMELAPSE_MODES),
    int("timelapse_fps", C::Timelapse, T::Limited, true, 30, 2, 1000),
    list("timelapse_container", C::Timelapse, T::Advanced, true, "mkv", CONTAINERS),
    string("timelapse_filename", C::Timelapse, T::Advanced, true, "%Y%m%d-timelapse")
        .handled_by(CustomHandler::FilenameTemplate),
    // Pipes
    string("video_pipe", C::Pipes, T::Restricted, false, ""),
    string("video_pipe_motion", C::Pipes, T::Restricted, false, ""),
    // Web control
    int("webcontrol_port", C::WebControl, T::Restricted, false, 8080, 0, 65535),
    int("webcontrol_port2", C::WebControl, T::Restricted, false, 0, 0, 65535),
    string("webcontrol_base_path", C::WebControl, T::Restricted, false, ""),
    boolean("webcontrol_ipv6", C::WebControl, T::Restricted, false, false),
    boolean("webcontrol_localhost", C::WebControl, T::Restricted, false, true),
    int("webcontrol_parms", C::WebControl, T::Restricted, false, 1, 0, 3),
    list("webcontrol_interface", C::WebControl, T::Restricted, false, "default", WEB_INTERFACES),
    list("webcontrol_auth_method", C::WebControl, T::Restricted, false, "none", WEB_AUTH_METHODS),
    string("webcontrol_authentication", C::WebControl, T::Never, false, ""),
    boolean("webcontrol_tls", C::WebControl, T::Restricted, false, false),
    string("webcontrol_cert", C::WebControl, T::Restricted, false, ""),
    string("webcontrol_key", C::WebControl, T::Never, false, ""),
    params("webcontrol_headers", C::WebControl, T::Restricted, false, ""),
    string("webcontrol_html", C::WebControl, T::Restricted, false, ""),
    params("webcontrol_actions", C::WebControl, T::Restricted, false, ""),
    int("webcontrol_lock_minutes", C::WebControl, T::Restricted, false, 10, 0, INT_MAX),
    int("webcontrol_lock_attempts", C::WebControl, T::Restricted, false, 3, 0, INT_MAX),
    // Streams
    int("stream_preview_scale", C::Streams, T::Limited, true, 25, 1, 1000),
    boolean("stream_preview_newline", C::Streams, T::Limited, true, false),
    params("stream_preview_params", C::Streams, T::Advanced, true, ""),
    list("stream_preview_method", C::Streams, T::Limited, true, "mjpeg", PREVIEW_METHODS),
    list("stream_preview_ptz", C::Streams, T::Limited, true, "on", PREVIEW_PTZ),
    int("stream_quality", C::Streams, T::Limited, true, 50, 1, 100),
    boolean("stream_grey", C::Streams, T::Limited, true, false),
    boolean("stream_motion", C::Streams, T::Limited, true, false),
    int("stream_maxrate", C::Streams, T::Limited, true, 1, 1, 100),
    int("stream_scan_time", C::Streams, T::Advanced, true, 5, 1, 600),
    int("stream_scan_scale", C::Streams, T::Advanced, true, 2, 1, 32),
    // Database
    list("database_type", C::Database, T::Restricted, false, "sqlite3", DATABASE_TYPES),
    string("database_dbname", C::Database, T::Restricted, false, "motion"),
    string("database_host", C::Database, T::Restricted, false, "localhost"),
    int("database_port", C::Database, T::Restricted, false, 0, 0, 65535),
    string("database_user", C::Database, T::Restricted, false, ""),
    string("database_password", C::Database, T::Never, false, ""),
    int("database_busy_timeout", C::Database, T::Restricted, false, 0, 0, 10000),
    // SQL templates are read on every event, so they are live, but the
    // reserved prefix keeps them out of reach of remote edits.
    string("sql_event_start", C::Sql, T::Advanced, true, ""),
    string("sql_event_end", C::Sql, T::Advanced, true, ""),
    string("sql_movie_start", C::Sql, T::Advanced, true, ""),
    string("sql_movie_end", C::Sql, T::Advanced, true, ""),
    string("sql_pic_save", C::Sql, T::Advanced, true, ""),
    // Tracking
    boolean("ptz_auto_track", C::Tracking, T::Advanced, true, false),
    int("ptz_wait", C::Tracking, T::Advanced, true, 0, 0, INT_MAX),
    string("ptz_move_track", C::Tracking, T::Restricted, false, ""),
    string("ptz_pan_left", C::Tracking, T::Restricted, false, ""),
    string("ptz_pan_right", C::Tracking, T::Restricted, false, ""),
    string("ptz_tilt_up", C::Tracking, T::Restricted, false, ""),
    string("ptz_tilt_down", C::Tracking, T::Restricted, false, ""),
    string("ptz_zoom_in", C::Tracking, T::Restricted, false, ""),
    string("ptz_zoom_out", C::Tracking, T::Restricted, false, ""),
    // Sound
    string("snd_device", C::Sound, T::Advanced, false, ""),
    params("snd_params", C::Sound, T::Advanced, false, ""),
    list("snd_window", C::Sound, T::Advanced, true, "hamming", SOUND_WINDOWS),
    boolean("snd_show", C::Sound, T::Advanced, true, false),
];
