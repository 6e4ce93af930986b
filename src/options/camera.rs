use serde::{Deserialize, Serialize};

use crate::error::PickerError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Fly-camera projection and movement parameters.
pub struct CameraOptions {
    /// Initial vertical field of view in degrees.
    pub fovy: f32,
    /// Smallest field of view scrolling can reach.
    pub fovy_min: f32,
    /// Largest field of view scrolling can reach.
    pub fovy_max: f32,
    /// Initial eye distance from the origin, along the (1, 1, 1) diagonal.
    /// Also the orbit radius used by the view gizmo.
    pub distance: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            fovy_min: 15.0,
            fovy_max: 150.0,
            distance: 10.0,
            speed: 2.0,
            znear: 0.01,
            zfar: 100.0,
        }
    }
}

impl CameraOptions {
    /// Check that the field-of-view range and clip planes describe a
    /// usable perspective projection.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::OptionsParse`] naming the first bad field.
    pub fn validate(&self) -> Result<(), PickerError> {
        let fov_range = 0.0..180.0;
        if !(fov_range.contains(&self.fovy_min)
            && fov_range.contains(&self.fovy_max)
            && self.fovy_min > 0.0
            && self.fovy_min <= self.fovy_max)
        {
            return Err(PickerError::OptionsParse(format!(
                "camera: fov range [{}, {}] must satisfy 0 < min <= max < 180",
                self.fovy_min, self.fovy_max
            )));
        }
        if !self.fovy.is_finite() {
            return Err(PickerError::OptionsParse(format!(
                "camera: fovy {} is not a number",
                self.fovy
            )));
        }
        if !(self.znear > 0.0
            && self.zfar > self.znear
            && self.zfar.is_finite())
        {
            return Err(PickerError::OptionsParse(format!(
                "camera: clip planes {} / {} must satisfy 0 < znear < zfar",
                self.znear, self.zfar
            )));
        }
        if !(self.distance > 0.0 && self.distance.is_finite()) {
            return Err(PickerError::OptionsParse(format!(
                "camera: distance {} must be positive",
                self.distance
            )));
        }
        if !self.speed.is_finite() {
            return Err(PickerError::OptionsParse(format!(
                "camera: speed {} is not a number",
                self.speed
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CameraOptions::default().validate().is_ok());
    }

    #[test]
    fn inverted_fov_range_is_rejected() {
        let options = CameraOptions {
            fovy_min: 90.0,
            fovy_max: 30.0,
            ..CameraOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(PickerError::OptionsParse(_))
        ));
    }

    #[test]
    fn nan_bounds_are_rejected() {
        let options = CameraOptions {
            fovy_max: f32::NAN,
            ..CameraOptions::default()
        };
        assert!(options.validate().is_err());
        let options = CameraOptions {
            fovy: f32::NAN,
            ..CameraOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn degenerate_clip_planes_are_rejected() {
        let options = CameraOptions {
            znear: 1.0,
            zfar: 1.0,
            ..CameraOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
