// ABOUTME: Arena of attached cameras with their configuration contexts and live controls
// ABOUTME: Index-addressed slots plus the default context and peripheral device ids
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::ConfigContext;
use crate::hot_reload::controls::CameraControl;

/// Stable position of a camera in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraIndex(pub usize);

impl fmt::Display for CameraIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One attached camera
pub struct CameraSlot {
    /// Arena position
    pub index: CameraIndex,
    /// Live configuration, locked for every read-modify-write
    pub config: Mutex<ConfigContext>,
    /// Live control surface of the device
    pub control: Arc<dyn CameraControl>,
}

/// Everything guarded by the camera-set lock
pub struct Arena {
    /// Process-wide default configuration
    pub default: ConfigContext,
    slots: Vec<Option<CameraSlot>>,
    peripherals: Vec<i64>,
}

impl Arena {
    /// Empty arena around `default`
    #[must_use]
    pub const fn new(default: ConfigContext) -> Self {
        Self {
            default,
            slots: Vec::new(),
            peripherals: Vec::new(),
        }
    }

    /// Slot at `index`, if attached
    #[must_use]
    pub fn slot(&self, index: CameraIndex) -> Option<&CameraSlot> {
        self.slots.get(index.0).and_then(Option::as_ref)
    }

    /// Attached cameras in index order
    pub fn attached(&self) -> impl Iterator<Item = &CameraSlot> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Default context alongside the attached cameras
    pub fn split_default(&mut self) -> (&mut ConfigContext, Vec<&CameraSlot>) {
        let slots = self.slots.iter().filter_map(Option::as_ref).collect();
        (&mut self.default, slots)
    }

    /// Number of attached cameras
    #[must_use]
    pub fn camera_count(&self) -> usize {
        self.attached().count()
    }

    /// Add a camera; indices are never reused
    pub fn push(&mut self, config: ConfigContext, control: Arc<dyn CameraControl>) -> CameraIndex {
        let index = CameraIndex(self.slots.len());
        self.slots.push(Some(CameraSlot {
            index,
            config: Mutex::new(config),
            control,
        }));
        index
    }

    /// Remove a camera, returning its slot
    pub fn vacate(&mut self, index: CameraIndex) -> Option<CameraSlot> {
        self.slots.get_mut(index.0).and_then(Option::take)
    }

    /// Device ids of non-camera peripherals
    #[must_use]
    pub fn peripherals(&self) -> &[i64] {
        &self.peripherals
    }

    /// Record a non-camera peripheral id
    pub fn add_peripheral(&mut self, device_id: i64) {
        self.peripherals.push(device_id);
    }

    /// Device ids held by peripherals and by every camera except `except`
    pub async fn taken_device_ids(&self, except: Option<CameraIndex>) -> Vec<i64> {
        let mut ids = self.peripherals.clone();
        for slot in self.attached().filter(|slot| Some(slot.index) != except) {
            let id = slot.config.lock().await.device_id();
            if id > 0 {
                ids.push(id);
            }
        }
        ids
    }
}
