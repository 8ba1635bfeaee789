use crate::{
    Component,
    math::{Mat3, Vec2},
};

/// Position, rotation and uniform scale of an entity, with a cached forward transform.
///
/// The transform is recomputed on every mutation, so readers (renderers, collision) can use
/// [`Orientation::transform`] without recomputing trigonometry.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Orientation {
    position: Vec2,
    rotation: f32,
    scale: f32,
    transform: Mat3,
}

impl Orientation {
    pub fn new(position: Vec2, rotation: f32, scale: f32) -> Self {
        Self {
            position,
            rotation,
            scale,
            transform: Mat3::from_orientation(position, rotation, scale),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Rotation in radians.
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The forward (object to world) transform.
    #[inline]
    pub fn transform(&self) -> &Mat3 {
        &self.transform
    }

    /// The unit vector the entity faces.
    #[inline]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.refresh();
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.refresh();
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.refresh();
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.set_position(self.position + offset);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.set_rotation(self.rotation + angle);
    }

    pub fn scale_by(&mut self, factor: f32) {
        self.set_scale(self.scale * factor);
    }

    fn refresh(&mut self) {
        self.transform = Mat3::from_orientation(self.position, self.rotation, self.scale);
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    #[test]
    fn mutations_refresh_transform() {
        // Given
        let mut orientation = Orientation::default();
        assert_eq!(*orientation.transform(), Mat3::IDENTITY);

        // When
        orientation.translate(Vec2::new(2.0, -1.0));
        orientation.scale_by(3.0);

        // Then
        assert_eq!(orientation.position(), Vec2::new(2.0, -1.0));
        assert_eq!(orientation.scale(), 3.0);
        assert_eq!(
            *orientation.transform(),
            Mat3::from_orientation(Vec2::new(2.0, -1.0), 0.0, 3.0)
        );

        // When
        orientation.rotate(PI);

        // Then
        let tip = orientation.transform().transform_point(Vec2::X);
        assert!((tip - Vec2::new(-1.0, -1.0)).norm() < 1e-5);
        assert!((orientation.forward() + Vec2::X).norm() < 1e-6);
    }
}
