use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Displacement from rest under which the spring is considered settled
const REST_THRESHOLD: f64 = 0.001;
/// Give up looking for a rest point after this long
const MAX_SETTLE: Duration = Duration::from_secs(10);
/// Default spacing between sampled keyframes, about 60 per second
pub const BOUNCE_FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, specta::Type)]
/// A one-shot scale pulse played on the direction label when the direction changes.
/// The label eases up to `peak_scale` over `rise_ms`, then springs back to 1.
pub struct BounceAnimation {
    /// Scale reached at the end of the rise
    pub peak_scale: f64,
    /// Duration of the rise in milliseconds
    pub rise_ms: u32,
    /// Spring tension (origami units)
    pub tension: f64,
    /// Spring friction (origami units)
    pub friction: f64,
}

impl Default for BounceAnimation {
    fn default() -> Self {
        Self {
            peak_scale: 1.04,
            rise_ms: 200,
            tension: 40.0,
            friction: 4.0,
        }
    }
}

impl BounceAnimation {
    /// Spring stiffness converted from origami tension
    fn stiffness(&self) -> f64 {
        (self.tension - 30.0) * 3.62 + 194.0
    }

    /// Spring damping converted from origami friction
    fn damping(&self) -> f64 {
        (self.friction - 8.0) * 3.0 + 25.0
    }

    fn rise(&self) -> Duration {
        Duration::from_millis(u64::from(self.rise_ms))
    }

    /// Returns (natural frequency, damping ratio) for a unit mass
    fn spring_params(&self) -> (f64, f64) {
        let omega = self.stiffness().max(f64::EPSILON).sqrt();
        let zeta = self.damping().max(0.0) / (2.0 * omega);
        (omega, zeta)
    }

    /// Displacement from rest `t` seconds into the spring, starting still at the peak
    fn spring_displacement(&self, t: f64) -> f64 {
        let x0 = self.peak_scale - 1.0;
        let (omega, zeta) = self.spring_params();

        if zeta < 1.0 {
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let decay = (-zeta * omega * t).exp();
            decay * (x0 * (omega_d * t).cos() + (zeta * omega * x0 / omega_d) * (omega_d * t).sin())
        } else {
            x0 * (1.0 + omega * t) * (-omega * t).exp()
        }
    }

    /// Upper bound on the spring's displacement `t` seconds in
    fn spring_envelope(&self, t: f64) -> f64 {
        let x0 = (self.peak_scale - 1.0).abs();
        let (omega, zeta) = self.spring_params();

        if zeta < 1.0 {
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let amplitude = x0 * (1.0 + (zeta * omega / omega_d).powi(2)).sqrt();
            amplitude * (-zeta * omega * t).exp()
        } else {
            x0 * (1.0 + omega * t) * (-omega * t).exp()
        }
    }

    /// Scale of the label `elapsed` after the animation started
    pub fn scale_at(&self, elapsed: Duration) -> f64 {
        let rise = self.rise();
        if elapsed < rise {
            let p = elapsed.as_secs_f64() / rise.as_secs_f64();
            // Cubic ease in-out
            let eased = if p < 0.5 {
                4.0 * p * p * p
            } else {
                1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
            };
            1.0 + (self.peak_scale - 1.0) * eased
        } else {
            let t = (elapsed - rise).as_secs_f64();
            if elapsed >= self.total_duration() {
                1.0
            } else {
                1.0 + self.spring_displacement(t)
            }
        }
    }

    /// How long after the rise it takes the spring to come to rest
    pub fn settle_time(&self) -> Duration {
        let mut t = Duration::ZERO;
        while t < MAX_SETTLE && self.spring_envelope(t.as_secs_f64()) >= REST_THRESHOLD {
            t += Duration::from_millis(1);
        }
        t
    }

    /// Full length of the animation, rise plus spring
    pub fn total_duration(&self) -> Duration {
        self.rise() + self.settle_time()
    }

    /// Sample the scale every `frame` from the start until the spring is at rest. The last value
    /// is always 1 so players can hold it.
    pub fn keyframes(&self, frame: Duration) -> Vec<f64> {
        let frame = frame.max(Duration::from_millis(1));
        let total = self.total_duration();

        let mut scales = Vec::with_capacity((total.as_millis() / frame.as_millis()) as usize + 2);
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            scales.push(self.scale_at(elapsed));
            elapsed += frame;
        }
        scales.push(1.0);
        scales
    }
}
