// ABOUTME: Live peripheral controls pushed to a running camera after a committed change
// ABOUTME: CameraControl setter trait and the parameter-name to control mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::context::ConfigContext;

/// Failure reported by a camera device when a setter is invoked
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The device has no such control
    #[error("control '{0}' is not supported by this device")]
    Unsupported(&'static str),
    /// The device refused the value
    #[error("device rejected '{control}': {reason}")]
    Device {
        /// Control name
        control: &'static str,
        /// Device supplied reason
        reason: String,
    },
    /// The committed configuration lacks a value the control needs
    #[error("configuration has no value for '{0}'")]
    MissingValue(&'static str),
}

/// Result of a control setter
pub type ControlResult = Result<(), ControlError>;

/// Setters a live camera exposes
///
/// Every setter defaults to [`ControlError::Unsupported`], so a device only
/// implements the controls it actually has.
pub trait CameraControl: Send + Sync {
    /// Brightness, -1.0 to 1.0
    fn set_brightness(&self, _value: f64) -> ControlResult {
        Err(ControlError::Unsupported("brightness"))
    }
    /// Contrast, 0.0 to 32.0
    fn set_contrast(&self, _value: f64) -> ControlResult {
        Err(ControlError::Unsupported("contrast"))
    }
    /// Sensor ISO
    fn set_iso(&self, _value: f64) -> ControlResult {
        Err(ControlError::Unsupported("iso"))
    }
    /// Automatic white balance on/off
    fn set_awb_enable(&self, _enabled: bool) -> ControlResult {
        Err(ControlError::Unsupported("awb_enable"))
    }
    /// White balance mode
    fn set_awb_mode(&self, _mode: i64) -> ControlResult {
        Err(ControlError::Unsupported("awb_mode"))
    }
    /// Freeze white balance
    fn set_awb_locked(&self, _locked: bool) -> ControlResult {
        Err(ControlError::Unsupported("awb_locked"))
    }
    /// Colour temperature in Kelvin
    fn set_colour_temp(&self, _kelvin: i64) -> ControlResult {
        Err(ControlError::Unsupported("colour_temp"))
    }
    /// Red and blue gains, always set together
    fn set_colour_gains(&self, _red: f64, _blue: f64) -> ControlResult {
        Err(ControlError::Unsupported("colour_gains"))
    }
    /// Autofocus mode
    fn set_af_mode(&self, _mode: i64) -> ControlResult {
        Err(ControlError::Unsupported("af_mode"))
    }
    /// Manual lens position in dioptres
    fn set_lens_position(&self, _dioptres: f64) -> ControlResult {
        Err(ControlError::Unsupported("lens_position"))
    }
    /// Autofocus range
    fn set_af_range(&self, _range: i64) -> ControlResult {
        Err(ControlError::Unsupported("af_range"))
    }
    /// Autofocus speed
    fn set_af_speed(&self, _speed: i64) -> ControlResult {
        Err(ControlError::Unsupported("af_speed"))
    }
    /// Start an autofocus scan
    fn trigger_af_scan(&self) -> ControlResult {
        Err(ControlError::Unsupported("af_trigger"))
    }
    /// Cancel a running autofocus scan
    fn cancel_af_scan(&self) -> ControlResult {
        Err(ControlError::Unsupported("af_cancel"))
    }
}

/// Camera without live controls; changes take effect on next read
#[derive(Debug, Clone, Copy, Default)]
pub struct NoControls;

impl CameraControl for NoControls {}

/// A live control reachable from a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveControl {
    /// `libcam_brightness`
    Brightness,
    /// `libcam_contrast`
    Contrast,
    /// `libcam_iso`
    Iso,
    /// `libcam_awb_enable`
    AwbEnable,
    /// `libcam_awb_mode`
    AwbMode,
    /// `libcam_awb_locked`
    AwbLocked,
    /// `libcam_colour_temp`
    ColourTemp,
    /// `libcam_colour_gain_r` and `libcam_colour_gain_b`
    ColourGains,
    /// `libcam_af_mode`
    AfMode,
    /// `libcam_lens_position`
    LensPosition,
    /// `libcam_af_range`
    AfRange,
    /// `libcam_af_speed`
    AfSpeed,
    /// `libcam_af_trigger`
    AfTrigger,
}

const GAIN_RED: &str = "libcam_colour_gain_r";
const GAIN_BLUE: &str = "libcam_colour_gain_b";

static LIVE_CONTROLS: [(&str, LiveControl); 14] = [
    ("libcam_brightness", LiveControl::Brightness),
    ("libcam_contrast", LiveControl::Contrast),
    ("libcam_iso", LiveControl::Iso),
    ("libcam_awb_enable", LiveControl::AwbEnable),
    ("libcam_awb_mode", LiveControl::AwbMode),
    ("libcam_awb_locked", LiveControl::AwbLocked),
    ("libcam_colour_temp", LiveControl::ColourTemp),
    (GAIN_RED, LiveControl::ColourGains),
    (GAIN_BLUE, LiveControl::ColourGains),
    ("libcam_af_mode", LiveControl::AfMode),
    ("libcam_lens_position", LiveControl::LensPosition),
    ("libcam_af_range", LiveControl::AfRange),
    ("libcam_af_speed", LiveControl::AfSpeed),
    ("libcam_af_trigger", LiveControl::AfTrigger),
];

impl LiveControl {
    /// Control driven by `parameter`, if any
    #[must_use]
    pub fn for_parameter(parameter: &str) -> Option<Self> {
        LIVE_CONTROLS
            .iter()
            .find(|(name, _)| *name == parameter)
            .map(|(_, control)| *control)
    }

    /// Whether the control is a one-shot command rather than a setting
    ///
    /// Commands are sent on every Set, including ones that leave the stored
    /// value unchanged.
    #[must_use]
    pub const fn is_action(self) -> bool {
        matches!(self, Self::AfTrigger)
    }

    /// Push the committed value(s) from `config` to `device`
    ///
    /// # Errors
    ///
    /// Propagates the device error, or `MissingValue` when `config` lacks a value
    pub fn apply(self, config: &ConfigContext, device: &dyn CameraControl) -> ControlResult {
        match self {
            Self::Brightness => device.set_brightness(float(config, "libcam_brightness")?),
            Self::Contrast => device.set_contrast(float(config, "libcam_contrast")?),
            Self::Iso => device.set_iso(float(config, "libcam_iso")?),
            Self::AwbEnable => device.set_awb_enable(flag(config, "libcam_awb_enable")?),
            Self::AwbMode => device.set_awb_mode(integer(config, "libcam_awb_mode")?),
            Self::AwbLocked => device.set_awb_locked(flag(config, "libcam_awb_locked")?),
            Self::ColourTemp => device.set_colour_temp(integer(config, "libcam_colour_temp")?),
            Self::ColourGains => {
                device.set_colour_gains(float(config, GAIN_RED)?, float(config, GAIN_BLUE)?)
            }
            Self::AfMode => device.set_af_mode(integer(config, "libcam_af_mode")?),
            Self::LensPosition => {
                device.set_lens_position(float(config, "libcam_lens_position")?)
            }
            Self::AfRange => device.set_af_range(integer(config, "libcam_af_range")?),
            Self::AfSpeed => device.set_af_speed(integer(config, "libcam_af_speed")?),
            Self::AfTrigger => {
                if integer(config, "libcam_af_trigger")? == 0 {
                    device.trigger_af_scan()
                } else {
                    device.cancel_af_scan()
                }
            }
        }
    }
}

fn float(config: &ConfigContext, name: &'static str) -> Result<f64, ControlError> {
    config.float(name).ok_or(ControlError::MissingValue(name))
}

fn integer(config: &ConfigContext, name: &'static str) -> Result<i64, ControlError> {
    config.int(name).ok_or(ControlError::MissingValue(name))
}

fn flag(config: &ConfigContext, name: &'static str) -> Result<bool, ControlError> {
    config.bool(name).ok_or(ControlError::MissingValue(name))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::registry::{ParamValue, ParameterRegistry};

    #[derive(Default)]
    struct GainRecorder {
        gains: Mutex<Vec<(f64, f64)>>,
    }

    impl CameraControl for GainRecorder {
        fn set_colour_gains(&self, red: f64, blue: f64) -> ControlResult {
            self.gains.lock().unwrap().push((red, blue));
            Ok(())
        }
    }

    #[test]
    fn test_mapping_covers_both_gains() {
        assert_eq!(
            LiveControl::for_parameter("libcam_colour_gain_r"),
            Some(LiveControl::ColourGains)
        );
        assert_eq!(
            LiveControl::for_parameter("libcam_colour_gain_b"),
            Some(LiveControl::ColourGains)
        );
        assert_eq!(LiveControl::for_parameter("threshold"), None);
    }

    #[test]
    fn test_gains_pushed_as_pair_from_config() {
        let registry = ParameterRegistry::shared();
        let mut config = ConfigContext::from_registry(&registry, "cam1");
        config.store(GAIN_RED, ParamValue::Float(1.5));
        config.store(GAIN_BLUE, ParamValue::Float(2.25));

        let device = GainRecorder::default();
        LiveControl::ColourGains.apply(&config, &device).unwrap();
        assert_eq!(*device.gains.lock().unwrap(), vec![(1.5, 2.25)]);
    }

    #[test]
    fn test_unsupported_by_default() {
        let registry = ParameterRegistry::shared();
        let config = ConfigContext::from_registry(&registry, "cam1");
        let error = LiveControl::Brightness.apply(&config, &NoControls).unwrap_err();
        assert!(matches!(error, ControlError::Unsupported("brightness")));
    }
}
