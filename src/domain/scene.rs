// Scene graph model for the SLAM view
//
// A `Scene` owns every handle the 3D view needs (camera, controls, the
// rebuilt geometries, the rover pose and the survivor markers) so that it is
// created once, updated per data slice and disposed in one call.
use super::formatting::marker_color;
use super::telemetry::{Orientation, Point, SurvivorAlert, TrajectoryPoint, Vector3};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub const BACKGROUND_COLOR: u32 = 0x121212;
pub const TRAJECTORY_COLOR: u32 = 0x3a86ff;
const DEFAULT_POINT_INTENSITY: f64 = 0.5;
const PULSE_MIN_SCALE: f64 = 1.0;
const PULSE_MAX_SCALE: f64 = 2.0;
const PULSE_RATE_PER_MS: f64 = 0.002;

#[derive(Debug, Clone, Serialize)]
pub struct PerspectiveCamera {
    pub fov: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vector3,
    pub target: Vector3,
}

impl PerspectiveCamera {
    fn new(aspect: f64) -> Self {
        Self {
            fov: 75.0,
            aspect,
            near: 0.1,
            far: 1000.0,
            position: Vector3::new(10.0, 15.0, 10.0),
            target: Vector3::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f64,
    pub target: Vector3,
}

impl OrbitControls {
    /// Keep the camera aimed at the orbit target
    pub fn update(&self, camera: &mut PerspectiveCamera) {
        camera.target = self.target;
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum Light {
    Ambient { color: u32, intensity: f64 },
    Directional { color: u32, intensity: f64, position: Vector3 },
}

#[derive(Debug, Clone, Serialize)]
pub struct GridHelper {
    pub size: u32,
    pub divisions: u32,
    pub center_color: u32,
    pub line_color: u32,
}

/// Point cloud geometry: flat xyz positions and rgb colors
#[derive(Debug, Clone)]
pub struct PointsObject {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub size: f32,
    pub opacity: f32,
}

impl PointsObject {
    pub fn build(points: &[Point]) -> Self {
        let mut positions = Vec::with_capacity(points.len() * 3);
        let mut colors = Vec::with_capacity(points.len() * 3);

        for point in points {
            positions.extend_from_slice(&[point.x as f32, point.y as f32, point.z as f32]);
            // Zero intensity counts as unset
            let intensity = point
                .intensity
                .filter(|i| *i != 0.0)
                .unwrap_or(DEFAULT_POINT_INTENSITY);
            colors.extend_from_slice(&[0.2, 0.5, intensity as f32]);
        }

        Self {
            positions,
            colors,
            size: 0.1,
            opacity: 0.8,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

#[derive(Debug, Clone)]
pub struct LineObject {
    pub positions: Vec<f32>,
    pub color: u32,
}

impl LineObject {
    pub fn build(trajectory: &[TrajectoryPoint]) -> Self {
        let positions = trajectory
            .iter()
            .flat_map(|p| [p.x as f32, (p.y + 0.05) as f32, p.z as f32])
            .collect();

        Self {
            positions,
            color: TRAJECTORY_COLOR,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Rover pose in scene space; rotation is (x = pitch, y = yaw, z = roll) in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RoverObject {
    pub position: Vector3,
    pub rotation: Vector3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "geometry", rename_all = "lowercase")]
pub enum RoverShape {
    Box { width: f64, height: f64, depth: f64 },
    Cylinder { radius: f64, height: f64, segments: u32 },
}

/// One rigid piece of the rover model, placed relative to the rover origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoverPart {
    pub name: &'static str,
    pub shape: RoverShape,
    pub color: u32,
    pub offset: Vector3,
    pub rotation: Vector3,
}

impl RoverPart {
    const fn new(name: &'static str, shape: RoverShape, color: u32, offset: Vector3) -> Self {
        Self {
            name,
            shape,
            color,
            offset,
            rotation: Vector3 {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
        }
    }
}

const WHEEL: RoverShape = RoverShape::Cylinder {
    radius: 0.15,
    height: 0.1,
    segments: 12,
};
const WHEEL_COLOR: u32 = 0x333333;

/// Body, four wheels turned to roll on the ground, LiDAR puck and forward camera
pub fn rover_parts() -> Vec<RoverPart> {
    let body = RoverShape::Box {
        width: 0.6,
        height: 0.3,
        depth: 0.8,
    };
    let mut parts = vec![RoverPart::new("body", body, 0xffffff, Vector3::default())];

    for (name, x, z) in [
        ("wheel-front-right", 0.35, 0.35),
        ("wheel-rear-right", 0.35, -0.35),
        ("wheel-front-left", -0.35, 0.35),
        ("wheel-rear-left", -0.35, -0.35),
    ] {
        parts.push(RoverPart {
            rotation: Vector3::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0),
            ..RoverPart::new(name, WHEEL, WHEEL_COLOR, Vector3::new(x, -0.1, z))
        });
    }

    let lidar = RoverShape::Cylinder {
        radius: 0.15,
        height: 0.1,
        segments: 16,
    };
    parts.push(RoverPart::new("lidar", lidar, TRAJECTORY_COLOR, Vector3::new(0.0, 0.25, 0.0)));
    let camera = RoverShape::Box {
        width: 0.1,
        height: 0.1,
        depth: 0.1,
    };
    parts.push(RoverPart::new("camera", camera, 0x222222, Vector3::new(0.3, 0.2, 0.0)));
    parts
}

#[derive(Debug, Clone, Serialize)]
pub struct Mesh {
    pub position: Vector3,
    pub radius: f64,
    pub color: u32,
    pub opacity: f64,
    pub scale: f64,
}

/// Cancellation flag for a halo's per-frame pulse
#[derive(Debug, Clone, Default)]
pub struct PulseToken(Arc<AtomicBool>);

impl PulseToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct MarkerPair {
    pub alert_id: String,
    pub marker: Mesh,
    pub halo: Mesh,
    pub pulse: PulseToken,
}

impl MarkerPair {
    fn build(alert: &SurvivorAlert) -> Self {
        let color = marker_color(alert.confidence);
        let position = Vector3::new(
            alert.location.x,
            alert.location.y + 0.3,
            alert.location.z,
        );

        Self {
            alert_id: alert.id.clone(),
            marker: Mesh {
                position,
                radius: 0.3,
                color,
                opacity: 0.8,
                scale: 1.0,
            },
            halo: Mesh {
                position,
                radius: 0.5,
                color,
                opacity: 0.3,
                scale: PULSE_MIN_SCALE,
            },
            pulse: PulseToken::new(),
        }
    }
}

/// Halo scale at a point in time; oscillates between 1x and 2x with no end
pub fn pulse_scale(elapsed: Duration) -> f64 {
    let t = elapsed.as_secs_f64() * 1000.0;
    let wave = 0.5 + (t * PULSE_RATE_PER_MS).sin() * 0.5;
    PULSE_MIN_SCALE + (PULSE_MAX_SCALE - PULSE_MIN_SCALE) * wave
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

#[derive(Debug)]
pub struct Scene {
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub background: u32,
    pub grid: GridHelper,
    pub lights: Vec<Light>,
    point_cloud: Option<PointsObject>,
    trajectory: Option<LineObject>,
    rover: RoverObject,
    rover_parts: Vec<RoverPart>,
    survivors: Vec<MarkerPair>,
    disposed: bool,
}

impl Scene {
    pub fn mount(width: u32, height: u32) -> Self {
        Self {
            camera: PerspectiveCamera::new(aspect_ratio(width, height)),
            controls: OrbitControls {
                enable_damping: true,
                damping_factor: 0.05,
                target: Vector3::default(),
            },
            background: BACKGROUND_COLOR,
            grid: GridHelper {
                size: 50,
                divisions: 50,
                center_color: 0x555555,
                line_color: 0x333333,
            },
            lights: vec![
                Light::Ambient {
                    color: 0xffffff,
                    intensity: 0.5,
                },
                Light::Directional {
                    color: 0xffffff,
                    intensity: 0.8,
                    position: Vector3::new(10.0, 20.0, 10.0),
                },
            ],
            point_cloud: None,
            trajectory: None,
            rover: RoverObject::default(),
            rover_parts: rover_parts(),
            survivors: Vec::new(),
            disposed: false,
        }
    }

    pub fn update_point_cloud(&mut self, points: &[Point]) {
        self.point_cloud = Some(PointsObject::build(points));
    }

    pub fn update_trajectory(&mut self, trajectory: &[TrajectoryPoint]) {
        self.trajectory = Some(LineObject::build(trajectory));
    }

    pub fn update_rover(&mut self, position: Vector3, orientation: Orientation) {
        self.rover.position = Vector3::new(position.x, position.y + 0.1, position.z);
        self.rover.rotation = Vector3::new(
            degrees_to_radians(orientation.pitch),
            degrees_to_radians(orientation.yaw),
            degrees_to_radians(orientation.roll),
        );
    }

    /// Replace every marker pair; pulses of the removed pairs are cancelled first
    pub fn update_survivors(&mut self, alerts: &[SurvivorAlert]) {
        self.clear_survivors();
        self.survivors = alerts.iter().map(MarkerPair::build).collect();
    }

    /// Advance live halo pulses; returns how many were animated
    pub fn animate(&mut self, elapsed: Duration) -> usize {
        self.controls.update(&mut self.camera);

        let scale = pulse_scale(elapsed);
        let mut animated = 0;
        for pair in self.survivors.iter_mut().filter(|p| !p.pulse.is_cancelled()) {
            pair.halo.scale = scale;
            animated += 1;
        }
        animated
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.aspect = aspect_ratio(width, height);
    }

    pub fn dispose(&mut self) {
        self.clear_survivors();
        self.point_cloud = None;
        self.trajectory = None;
        self.rover_parts.clear();
        self.disposed = true;
    }

    fn clear_survivors(&mut self) {
        for pair in self.survivors.drain(..) {
            pair.pulse.cancel();
        }
    }

    pub fn point_cloud(&self) -> Option<&PointsObject> {
        self.point_cloud.as_ref()
    }

    pub fn trajectory(&self) -> Option<&LineObject> {
        self.trajectory.as_ref()
    }

    pub fn rover(&self) -> &RoverObject {
        &self.rover
    }

    pub fn rover_parts(&self) -> &[RoverPart] {
        &self.rover_parts
    }

    pub fn survivors(&self) -> &[MarkerPair] {
        &self.survivors
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn summary(&self, frames: u64) -> SceneSummary {
        SceneSummary {
            point_count: self.point_cloud.as_ref().map_or(0, PointsObject::vertex_count),
            trajectory_vertices: self.trajectory.as_ref().map_or(0, LineObject::vertex_count),
            marker_pairs: self.survivors.len(),
            active_pulses: self
                .survivors
                .iter()
                .filter(|p| !p.pulse.is_cancelled())
                .count(),
            rover: self.rover,
            rover_parts: self.rover_parts.len(),
            aspect: self.camera.aspect,
            frames,
            disposed: self.disposed,
        }
    }
}

fn aspect_ratio(width: u32, height: u32) -> f64 {
    if height == 0 {
        1.0
    } else {
        f64::from(width) / f64::from(height)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSummary {
    pub point_count: usize,
    pub trajectory_vertices: usize,
    pub marker_pairs: usize,
    pub active_pulses: usize,
    pub rover: RoverObject,
    pub rover_parts: usize,
    pub aspect: f64,
    pub frames: u64,
    pub disposed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::{Confidence, DetectionType};
    use chrono::Utc;

    fn alert(id: &str, confidence: Confidence) -> SurvivorAlert {
        SurvivorAlert {
            id: id.to_string(),
            kind: DetectionType::Thermal,
            confidence,
            location: Point::new(2.0, 0.0, -3.0),
            timestamp: Utc::now(),
            verified: false,
        }
    }

    #[test]
    fn test_point_cloud_rebuild() {
        let mut scene = Scene::mount(800, 600);
        scene.update_point_cloud(&[
            Point::new(1.0, 0.0, 2.0).with_intensity(0.9),
            Point::new(-1.0, 0.0, 0.5),
        ]);
        let cloud = scene.point_cloud().unwrap();
        assert_eq!(cloud.vertex_count(), 2);
        assert_eq!(&cloud.colors[0..3], &[0.2, 0.5, 0.9]);
        assert_eq!(cloud.colors[5], 0.5);

        scene.update_point_cloud(&[Point::new(0.0, 0.0, 0.0)]);
        assert_eq!(scene.point_cloud().unwrap().vertex_count(), 1);
    }

    #[test]
    fn test_zero_intensity_uses_default_color() {
        let cloud = PointsObject::build(&[
            Point::new(0.0, 0.0, 0.0).with_intensity(0.0),
            Point::new(1.0, 0.0, 1.0).with_intensity(0.25),
        ]);
        assert_eq!(cloud.colors[2], 0.5);
        assert_eq!(cloud.colors[5], 0.25);
    }

    #[test]
    fn test_rover_model_parts() {
        let scene = Scene::mount(800, 600);
        let parts = scene.rover_parts();
        assert_eq!(parts.len(), 7);
        assert_eq!(parts[0].name, "body");

        let wheels: Vec<_> = parts.iter().filter(|p| p.name.starts_with("wheel")).collect();
        assert_eq!(wheels.len(), 4);
        for wheel in wheels {
            assert_eq!(wheel.offset.y, -0.1);
            assert_eq!(wheel.offset.x.abs(), 0.35);
            assert_eq!(wheel.offset.z.abs(), 0.35);
            assert!((wheel.rotation.x - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        }

        let lidar = parts.iter().find(|p| p.name == "lidar").unwrap();
        assert_eq!(lidar.color, TRAJECTORY_COLOR);
        assert_eq!(lidar.offset, Vector3::new(0.0, 0.25, 0.0));
        assert!(matches!(lidar.shape, RoverShape::Cylinder { segments: 16, .. }));
        assert_eq!(scene.summary(0).rover_parts, 7);
    }

    #[test]
    fn test_trajectory_lifted_above_ground() {
        let mut scene = Scene::mount(800, 600);
        let now = Utc::now();
        scene.update_trajectory(&[TrajectoryPoint {
            x: 1.0,
            y: 0.1,
            z: 2.0,
            timestamp: now,
        }]);
        let line = scene.trajectory().unwrap();
        assert!((line.positions[1] - 0.15).abs() < 1e-6);
        assert_eq!(line.color, TRAJECTORY_COLOR);
    }

    #[test]
    fn test_rover_pose_in_radians() {
        let mut scene = Scene::mount(800, 600);
        scene.update_rover(
            Vector3::new(1.0, 2.0, 3.0),
            Orientation {
                roll: 90.0,
                pitch: -180.0,
                yaw: 45.0,
            },
        );
        let rover = scene.rover();
        assert!((rover.position.y - 2.1).abs() < 1e-12);
        assert!((rover.rotation.x + std::f64::consts::PI).abs() < 1e-12);
        assert!((rover.rotation.y - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert!((rover.rotation.z - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_survivor_markers_replaced_wholesale() {
        let mut scene = Scene::mount(800, 600);
        scene.update_survivors(&[alert("a", Confidence::Low)]);
        let stale = scene.survivors()[0].pulse.clone();

        scene.update_survivors(&[alert("b", Confidence::High), alert("c", Confidence::Medium)]);

        assert!(stale.is_cancelled());
        let ids: Vec<_> = scene.survivors().iter().map(|p| p.alert_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(scene.survivors()[0].marker.color, 0xe63946);
        assert!((scene.survivors()[0].marker.position.y - 0.3).abs() < 1e-12);
        assert_eq!(scene.summary(0).active_pulses, 2);
    }

    #[test]
    fn test_pulse_stays_within_bounds() {
        for ms in (0..10_000).step_by(37) {
            let s = pulse_scale(Duration::from_millis(ms));
            assert!((PULSE_MIN_SCALE..=PULSE_MAX_SCALE).contains(&s));
        }
        assert!((pulse_scale(Duration::ZERO) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_animate_skips_cancelled_pulses() {
        let mut scene = Scene::mount(800, 600);
        scene.update_survivors(&[alert("a", Confidence::Low), alert("b", Confidence::Low)]);
        scene.survivors()[1].pulse.cancel();

        let animated = scene.animate(Duration::from_millis(785));
        assert_eq!(animated, 1);
        assert!(scene.survivors()[0].halo.scale > 1.9);
        assert_eq!(scene.survivors()[1].halo.scale, PULSE_MIN_SCALE);
    }

    #[test]
    fn test_resize_and_dispose() {
        let mut scene = Scene::mount(800, 0);
        assert_eq!(scene.camera.aspect, 1.0);
        scene.resize(1600, 800);
        assert_eq!(scene.camera.aspect, 2.0);

        scene.update_survivors(&[alert("a", Confidence::High)]);
        let token = scene.survivors()[0].pulse.clone();
        scene.dispose();
        assert!(token.is_cancelled());
        assert!(scene.is_disposed());
        assert_eq!(scene.summary(0).marker_pairs, 0);
        assert!(scene.rover_parts().is_empty());
    }
}
