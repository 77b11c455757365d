//! Device sensor subscriptions and sample conversion.
//!
//! One [`SensorChannel`] per [`SensorKind`]. A channel is subscribed on the
//! device only while the embedder wants it and the shell is animating; samples
//! are converted to the shell's conventions and coalesced so each kind fires
//! at most once per poll.

use std::time::Duration;

use glam::{DMat3, DQuat, DVec3};
use static_assertions::const_assert_eq;

use crate::platform::SensorService;

/// Standard gravity in m/s².
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Shortest sample interval requested from the device.
pub const SENSOR_UPDATE_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Acceleration in g, pointing away from gravity.
    Accelerometer,
    /// Ambient magnetic field in microtesla.
    Magnetometer,
    /// Angular velocity in radians per second.
    Gyroscope,
    /// Device attitude as a rotation matrix.
    RotationMatrix,
}

impl SensorKind {
    pub const COUNT: usize = 4;

    pub const ALL: [SensorKind; Self::COUNT] = [
        SensorKind::Accelerometer,
        SensorKind::Magnetometer,
        SensorKind::Gyroscope,
        SensorKind::RotationMatrix,
    ];

    pub const fn index(self) -> usize {
        match self {
            SensorKind::Accelerometer => 0,
            SensorKind::Magnetometer => 1,
            SensorKind::Gyroscope => 2,
            SensorKind::RotationMatrix => 3,
        }
    }
}

const_assert_eq!(SensorKind::ALL.len(), SensorKind::COUNT);
const_assert_eq!(SensorKind::RotationMatrix.index(), SensorKind::COUNT - 1);

/// A sample as reported by the device, before conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSensorSample {
    pub kind: SensorKind,
    pub timestamp_ns: i64,
    pub vector: [f64; 3],
    /// Scalar quaternion component, reported by some rotation vector sensors.
    pub scalar: Option<f64>,
}

impl RawSensorSample {
    pub fn new(kind: SensorKind, timestamp_ns: i64, vector: [f64; 3]) -> Self {
        Self {
            kind,
            timestamp_ns,
            vector,
            scalar: None,
        }
    }

    pub fn with_scalar(mut self, scalar: f64) -> Self {
        self.scalar = Some(scalar);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorValue {
    Vector(DVec3),
    Matrix(DMat3),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorEvent {
    pub kind: SensorKind,
    /// Seconds, on the device sensor clock.
    pub timestamp: f64,
    pub value: SensorValue,
}

impl SensorEvent {
    pub fn from_sample(sample: &RawSensorSample) -> Self {
        let [x, y, z] = sample.vector;
        let value = match sample.kind {
            SensorKind::Accelerometer => SensorValue::Vector(DVec3::new(x, y, z) / -STANDARD_GRAVITY),
            SensorKind::Magnetometer | SensorKind::Gyroscope => {
                SensorValue::Vector(DVec3::new(x, y, z))
            }
            SensorKind::RotationMatrix => SensorValue::Matrix(rotation_matrix(x, y, z, sample.scalar)),
        };
        Self {
            kind: sample.kind,
            timestamp: sample.timestamp_ns as f64 / 1e9,
            value,
        }
    }
}

/// Rotation matrix for a rotation vector sensor reading.
///
/// The scalar component is derived from the unit-length constraint when the
/// device does not report it (or reports zero).
pub fn rotation_matrix(x: f64, y: f64, z: f64, scalar: Option<f64>) -> DMat3 {
    let w = match scalar {
        Some(w) if w != 0.0 => w,
        _ => (1.0 - x * x - y * y - z * z).max(0.0).sqrt(),
    };
    DMat3::from_quat(DQuat::from_xyzw(x, y, z, w))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SensorChannel {
    pub requested: bool,
    pub device_enabled: bool,
    pub last_valid: bool,
    pub last: Option<SensorEvent>,
}

#[derive(Debug, Default)]
pub struct SensorMultiplexer {
    channels: [SensorChannel; SensorKind::COUNT],
    received: [bool; SensorKind::COUNT],
    scratch: Vec<RawSensorSample>,
}

impl SensorMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, kind: SensorKind) -> &SensorChannel {
        &self.channels[kind.index()]
    }

    /// Returns `true` if the registration changed.
    pub fn set_requested(&mut self, kind: SensorKind, requested: bool) -> bool {
        let channel = &mut self.channels[kind.index()];
        let changed = channel.requested != requested;
        channel.requested = requested;
        changed
    }

    pub fn is_requested(&self, kind: SensorKind) -> bool {
        self.channel(kind).requested
    }

    /// Latest converted sample, if still valid.
    pub fn last_event(&self, kind: SensorKind) -> Option<&SensorEvent> {
        let channel = self.channel(kind);
        channel.last.as_ref().filter(|_| channel.last_valid)
    }

    /// Brings device subscriptions in line with registrations and the
    /// animating state.
    pub fn sync(&mut self, service: &mut dyn SensorService, animating: bool) {
        for kind in SensorKind::ALL {
            let channel = &mut self.channels[kind.index()];
            let enable = channel.requested && animating;
            if !enable {
                channel.last_valid = false;
            }
            if channel.device_enabled == enable || !service.is_available(kind) {
                continue;
            }

            if enable {
                if service.enable(kind) {
                    channel.device_enabled = true;
                    if let Some(min_delay) = service.min_delay(kind).filter(|d| !d.is_zero()) {
                        service.set_event_rate(kind, min_delay.max(SENSOR_UPDATE_INTERVAL));
                    }
                    tracing::debug!(?kind, "Sensor enabled");
                } else {
                    tracing::warn!(?kind, "Sensor refused to enable");
                }
            } else if service.disable(kind) {
                channel.device_enabled = false;
                tracing::debug!(?kind, "Sensor disabled");
            }
        }
    }

    /// Drains pending samples and appends at most one event per registered
    /// kind to `out`, latest sample winning.
    pub fn poll(&mut self, service: &mut dyn SensorService, out: &mut Vec<SensorEvent>) {
        self.scratch.clear();
        service.drain(&mut self.scratch);
        if self.scratch.is_empty() {
            return;
        }

        self.received = [false; SensorKind::COUNT];
        for sample in &self.scratch {
            let channel = &mut self.channels[sample.kind.index()];
            if !channel.device_enabled {
                continue;
            }
            channel.last = Some(SensorEvent::from_sample(sample));
            channel.last_valid = true;
            self.received[sample.kind.index()] = true;
        }

        for kind in SensorKind::ALL {
            let channel = &self.channels[kind.index()];
            if self.received[kind.index()] && channel.requested {
                out.extend(channel.last);
            }
        }
    }

    /// Unsubscribes everything and releases the device queue.
    pub fn shutdown(&mut self, service: &mut dyn SensorService) {
        self.sync(service, false);
        service.release();
    }
}
