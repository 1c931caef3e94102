use framegate_capture::WindowSpan;
use framegate_foundation::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

const DEFAULT_IMAGE_FREQUENCY: f64 = 1.0;

/// One vision service binding: which provider to query and the confidence
/// thresholds that count as a match. `inhibit` puts the binding on the
/// veto list instead of the accept list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisionServiceConfig {
    pub vision: String,
    #[serde(default)]
    pub classifications: HashMap<String, f64>,
    #[serde(default)]
    pub objects: HashMap<String, f64>,
    #[serde(default)]
    pub inhibit: bool,
}

impl VisionServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vision.is_empty() {
            return Err(ConfigError::FieldRequired { field: "vision" });
        }
        Ok(())
    }
}

/// Configuration for the threshold-predicate camera.
///
/// The window is either symmetric (`window_seconds`) or asymmetric
/// (`window_seconds_before` / `window_seconds_after`); the two forms are
/// mutually exclusive and at least one bound must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilteredCameraConfig {
    pub camera: String,
    #[serde(default)]
    pub vision_services: Vec<VisionServiceConfig>,
    #[serde(default)]
    pub window_seconds: u32,
    #[serde(default)]
    pub window_seconds_before: u32,
    #[serde(default)]
    pub window_seconds_after: u32,
    #[serde(default)]
    pub image_frequency: f64,
}

impl FilteredCameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.is_empty() {
            return Err(ConfigError::FieldRequired { field: "camera" });
        }
        if self.vision_services.is_empty() {
            return Err(ConfigError::FieldRequired {
                field: "vision_services",
            });
        }
        for vs in &self.vision_services {
            vs.validate()?;
        }
        validate_window(
            self.window_seconds,
            self.window_seconds_before,
            self.window_seconds_after,
        )?;
        if self.image_frequency < 0.0 {
            return Err(ConfigError::FrequencyOutOfRange {
                value: self.image_frequency,
            });
        }
        Ok(())
    }

    pub fn window_span(&self) -> WindowSpan {
        resolve_window(
            self.window_seconds,
            self.window_seconds_before,
            self.window_seconds_after,
        )
    }

    /// Unset frequency falls back to 1 Hz.
    pub fn frequency_hz(&self) -> f64 {
        if self.image_frequency <= 0.0 {
            DEFAULT_IMAGE_FREQUENCY
        } else {
            self.image_frequency
        }
    }
}

/// Configuration for the boolean-oracle camera.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConditionalCameraConfig {
    pub camera: String,
    pub filter_service: String,
    #[serde(default)]
    pub window_seconds: u32,
    #[serde(default)]
    pub window_seconds_before: u32,
    #[serde(default)]
    pub window_seconds_after: u32,
    #[serde(default)]
    pub image_frequency: f64,
}

impl ConditionalCameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.is_empty() {
            return Err(ConfigError::FieldRequired { field: "camera" });
        }
        if self.filter_service.is_empty() {
            return Err(ConfigError::FieldRequired {
                field: "filter_service",
            });
        }
        validate_window(
            self.window_seconds,
            self.window_seconds_before,
            self.window_seconds_after,
        )?;
        if self.image_frequency <= 0.0 {
            return Err(ConfigError::FrequencyOutOfRange {
                value: self.image_frequency,
            });
        }
        Ok(())
    }

    pub fn window_span(&self) -> WindowSpan {
        resolve_window(
            self.window_seconds,
            self.window_seconds_before,
            self.window_seconds_after,
        )
    }

    pub fn frequency_hz(&self) -> f64 {
        self.image_frequency
    }
}

fn validate_window(symmetric: u32, before: u32, after: u32) -> Result<(), ConfigError> {
    if symmetric != 0 && (before != 0 || after != 0) {
        return Err(ConfigError::WindowModeConflict);
    }
    if symmetric == 0 && before == 0 && after == 0 {
        return Err(ConfigError::WindowUnset);
    }
    Ok(())
}

fn resolve_window(symmetric: u32, before: u32, after: u32) -> WindowSpan {
    if symmetric != 0 {
        WindowSpan::symmetric(symmetric)
    } else {
        WindowSpan::asymmetric(before, after)
    }
}
