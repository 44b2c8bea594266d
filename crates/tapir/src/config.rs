use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for one layout run.
///
/// JSON keys use camelCase (`linkDistance`, `chargeStrength`, ...). Every field is optional in a
/// config document; missing keys fall back to [`LayoutConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Canvas width in pixels. Input coordinates are scaled by this before the first tick.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
    /// Rest distance of every link.
    pub link_distance: f64,
    pub link_strength: f64,
    /// Many-body strength; negative values repel.
    pub charge_strength: f64,
    /// Barnes-Hut opening criterion (`cell_width / distance < theta` => approximate).
    pub theta: f64,
    /// Repulsion distances below this are floored to avoid unbounded forces.
    pub charge_distance_min: f64,
    /// Repulsion is ignored beyond this distance. `None` means unbounded.
    pub charge_distance_max: Option<f64>,
    pub center_strength: f64,
    pub collision_radius: f64,
    /// Fraction of an overlap resolved per tick.
    pub collision_strength: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    /// Velocity multiplier applied after forces are accumulated.
    pub velocity_decay: f64,
    pub boundary_margin: f64,
    /// Wall-clock length of a re-optimization run started by `reset`.
    pub rerun_duration_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 700.0,
            link_distance: 80.0,
            link_strength: 1.0,
            charge_strength: -400.0,
            theta: 0.8,
            charge_distance_min: 1.0,
            charge_distance_max: None,
            center_strength: 1.0,
            collision_radius: 30.0,
            collision_strength: 0.85,
            alpha_min: 0.001,
            alpha_decay: 0.02,
            velocity_decay: 0.4,
            boundary_margin: 30.0,
            rerun_duration_ms: 3000,
        }
    }
}

/// A configuration value that was out of range and got replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub value: f64,
    pub replacement: f64,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is out of range; using {}",
            self.field, self.value, self.replacement
        )
    }
}

impl LayoutConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn rerun_duration(&self) -> Duration {
        Duration::from_millis(self.rerun_duration_ms)
    }

    /// Returns a copy with every out-of-range parameter clamped to a safe value.
    ///
    /// Nothing here is rejected: a bad parameter only degrades the layout, so the value is
    /// replaced and reported instead.
    pub fn sanitize(&self) -> (Self, Vec<ConfigWarning>) {
        let defaults = Self::default();
        let mut out = self.clone();
        let mut warnings = Vec::new();
        let w = &mut warnings;

        positive_or_default(w, "width", &mut out.width, defaults.width);
        positive_or_default(w, "height", &mut out.height, defaults.height);
        clamp_field(
            w,
            "linkDistance",
            &mut out.link_distance,
            0.0,
            f64::MAX,
            defaults.link_distance,
        );
        clamp_field(
            w,
            "linkStrength",
            &mut out.link_strength,
            0.0,
            f64::MAX,
            defaults.link_strength,
        );
        clamp_field(
            w,
            "chargeStrength",
            &mut out.charge_strength,
            f64::MIN,
            f64::MAX,
            defaults.charge_strength,
        );
        clamp_field(w, "theta", &mut out.theta, 0.01, f64::MAX, defaults.theta);
        clamp_field(
            w,
            "chargeDistanceMin",
            &mut out.charge_distance_min,
            0.0,
            f64::MAX,
            defaults.charge_distance_min,
        );
        if let Some(max) = out.charge_distance_max {
            if !(max.is_finite() && max > out.charge_distance_min) {
                w.push(ConfigWarning {
                    field: "chargeDistanceMax",
                    value: max,
                    replacement: f64::INFINITY,
                });
                out.charge_distance_max = None;
            }
        }
        clamp_field(
            w,
            "centerStrength",
            &mut out.center_strength,
            0.0,
            1.0,
            defaults.center_strength,
        );
        clamp_field(
            w,
            "collisionRadius",
            &mut out.collision_radius,
            0.0,
            f64::MAX,
            defaults.collision_radius,
        );
        clamp_field(
            w,
            "collisionStrength",
            &mut out.collision_strength,
            0.0,
            1.0,
            defaults.collision_strength,
        );
        clamp_field(w, "alphaMin", &mut out.alpha_min, 1e-6, 1.0, defaults.alpha_min);
        // A zero decay would never reach `alphaMin`.
        clamp_field(
            w,
            "alphaDecay",
            &mut out.alpha_decay,
            1e-4,
            1.0,
            defaults.alpha_decay,
        );
        clamp_field(
            w,
            "velocityDecay",
            &mut out.velocity_decay,
            0.0,
            1.0,
            defaults.velocity_decay,
        );
        let max_margin = out.width.min(out.height) / 2.0;
        clamp_field(
            w,
            "boundaryMargin",
            &mut out.boundary_margin,
            0.0,
            max_margin,
            defaults.boundary_margin.min(max_margin),
        );

        for warning in &warnings {
            tracing::warn!(
                field = warning.field,
                value = warning.value,
                replacement = warning.replacement,
                "layout configuration value clamped"
            );
        }

        (out, warnings)
    }
}

// Non-finite and non-positive values are replaced by `fallback`, never clamped.
fn positive_or_default(
    warnings: &mut Vec<ConfigWarning>,
    field: &'static str,
    value: &mut f64,
    fallback: f64,
) {
    let original = *value;
    if original.is_finite() && original > 0.0 {
        return;
    }
    warnings.push(ConfigWarning {
        field,
        value: original,
        replacement: fallback,
    });
    *value = fallback;
}

fn clamp_field(
    warnings: &mut Vec<ConfigWarning>,
    field: &'static str,
    value: &mut f64,
    lo: f64,
    hi: f64,
    fallback: f64,
) {
    let original = *value;
    let replacement = if original.is_finite() {
        original.clamp(lo, hi)
    } else {
        fallback
    };
    if replacement != original {
        warnings.push(ConfigWarning {
            field,
            value: original,
            replacement,
        });
        *value = replacement;
    }
}
