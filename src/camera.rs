use crate::voxel::{CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use glam::{IVec2, Mat4, Vec3, Vec4};

/// First-person camera: yaw/pitch in degrees, FPS-style mouse look.
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect_ratio: f32,
    pub mouse_sensitivity: f32,
}

const MAX_PITCH: f32 = 89.0;

impl Camera {
    pub fn new(position: Vec3, aspect_ratio: f32) -> Self {
        Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            fov: 70.0_f32.to_radians(),
            near: 0.1,
            far: 500.0,
            aspect_ratio,
            mouse_sensitivity: 0.1,
        }
    }

    /// Apply a mouse delta in pixels. Pitch is clamped short of the poles.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw += delta_x * self.mouse_sensitivity;
        self.pitch -= delta_y * self.mouse_sensitivity;
        self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// View direction from yaw/pitch.
    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }

    /// Horizontal movement basis: forward projected onto the ground plane.
    pub fn flat_forward(&self) -> Vec3 {
        let forward = self.forward();
        Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero()
    }

    pub fn flat_right(&self) -> Vec3 {
        self.flat_forward().cross(Vec3::Y).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Frustum for culling chunk columns before they are drawn.
    pub fn extract_frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }
}

/// View-frustum test for chunk columns.
///
/// Each clip half-space is a row combination of the view-projection matrix;
/// a column is drawn unless some half-space can reject its whole bounding
/// box.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    half_spaces: [Vec4; 6],
}

impl Frustum {
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let w_row = vp.row(3);
        let mut half_spaces = [Vec4::ZERO; 6];
        for axis in 0..3 {
            let row = vp.row(axis);
            half_spaces[axis * 2] = rescale(w_row + row);
            half_spaces[axis * 2 + 1] = rescale(w_row - row);
        }
        Self { half_spaces }
    }

    /// Visibility of one chunk column's bounding box.
    pub fn is_column_visible(&self, coord: IVec2) -> bool {
        let min = Vec3::new(
            (coord.x * CHUNK_SIZE_X as i32) as f32,
            0.0,
            (coord.y * CHUNK_SIZE_Z as i32) as f32,
        );
        let max = min
            + Vec3::new(
                CHUNK_SIZE_X as f32,
                CHUNK_HEIGHT as f32,
                CHUNK_SIZE_Z as f32,
            );
        self.contains_aabb(min, max)
    }

    /// Conservative box test: the box survives as long as, for every
    /// half-space, its most favourable corner still lies inside.
    pub fn contains_aabb(&self, min: Vec3, max: Vec3) -> bool {
        self.half_spaces.iter().all(|half_space| {
            let normal = half_space.truncate();
            let corner = Vec3::select(normal.cmpge(Vec3::ZERO), max, min);
            normal.dot(corner) >= -half_space.w
        })
    }
}

/// Bring a half-space to unit normal length so plane distances stay
/// comparable across the set.
fn rescale(half_space: Vec4) -> Vec4 {
    let len = half_space.truncate().length();
    if len <= f32::EPSILON {
        half_space
    } else {
        half_space * len.recip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_clamps_at_the_poles() {
        let mut camera = Camera::new(Vec3::ZERO, 16.0 / 9.0);
        camera.rotate(0.0, -10_000.0);
        assert_eq!(camera.pitch, MAX_PITCH);
        camera.rotate(0.0, 20_000.0);
        assert_eq!(camera.pitch, -MAX_PITCH);
    }

    #[test]
    fn sensitivity_scales_pixel_deltas() {
        let mut camera = Camera::new(Vec3::ZERO, 16.0 / 9.0);
        let yaw_before = camera.yaw;
        camera.rotate(10.0, 0.0);
        assert!((camera.yaw - yaw_before - 1.0).abs() < 1e-6);
    }

    #[test]
    fn flat_basis_is_horizontal_and_orthogonal() {
        let mut camera = Camera::new(Vec3::ZERO, 16.0 / 9.0);
        camera.rotate(123.0, -456.0);
        let forward = camera.flat_forward();
        let right = camera.flat_right();
        assert!(forward.y.abs() < 1e-6);
        assert!(right.y.abs() < 1e-6);
        assert!(forward.dot(right).abs() < 1e-5);
    }

    #[test]
    fn column_culling_follows_the_look_direction() {
        // Eye over column (0, 0); the default yaw of -90 degrees faces -z.
        let mut camera = Camera::new(Vec3::new(8.0, 40.0, 8.0), 16.0 / 9.0);

        let frustum = camera.extract_frustum();
        assert!(
            frustum.is_column_visible(IVec2::new(0, -3)),
            "column ahead must survive the cull"
        );
        assert!(
            !frustum.is_column_visible(IVec2::new(0, 3)),
            "column at the player's back must be culled"
        );

        // Swing 180 degrees of mouse travel and the verdicts trade places.
        camera.rotate(1800.0, 0.0);
        let frustum = camera.extract_frustum();
        assert!(!frustum.is_column_visible(IVec2::new(0, -3)));
        assert!(frustum.is_column_visible(IVec2::new(0, 3)));
    }

    #[test]
    fn the_column_underfoot_is_never_culled() {
        let mut camera = Camera::new(Vec3::new(8.0, 40.0, 8.0), 16.0 / 9.0);
        // The column containing the eye survives any look direction, pitch
        // clamp included.
        for (dx, dy) in [(0.0, 0.0), (523.0, -311.0), (-900.0, 4000.0), (135.0, -4000.0)] {
            camera.rotate(dx, dy);
            assert!(
                camera.extract_frustum().is_column_visible(IVec2::ZERO),
                "look delta ({dx}, {dy}) culled the column under the player"
            );
        }
    }
}
