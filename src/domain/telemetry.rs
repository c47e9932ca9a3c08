// Telemetry snapshot domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryState {
    pub level: u8,
    pub charging: bool,
    /// Pack voltage, already formatted with one decimal
    pub voltage: String,
    pub temperature: i32,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorState {
    pub lidar: bool,
    pub camera: bool,
    pub imu: bool,
    pub rfid: bool,
    pub thermal: bool,
    pub ultrasonic: bool,
    pub last_updated: DateTime<Utc>,
}

impl SensorState {
    /// (label, online) pairs in panel order
    pub fn readings(&self) -> [(&'static str, bool); 6] {
        [
            ("LiDAR", self.lidar),
            ("Camera", self.camera),
            ("IMU", self.imu),
            ("RFID", self.rfid),
            ("Thermal", self.thermal),
            ("Ultrasonic", self.ultrasonic),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommState {
    pub lora: bool,
    pub wifi: bool,
    pub cellular: bool,
    pub last_transmission: DateTime<Utc>,
    pub signal_strength: u8,
    pub packet_loss: u8,
    pub last_updated: DateTime<Utc>,
}

impl CommState {
    pub fn links(&self) -> [(&'static str, bool); 3] {
        [("LoRa", self.lora), ("WiFi", self.wifi), ("4G", self.cellular)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoverStatus {
    Exploring,
    Scanning,
    #[serde(rename = "Returning to Base")]
    ReturningToBase,
    Charging,
    Idle,
}

impl RoverStatus {
    pub const ALL: [RoverStatus; 5] = [
        RoverStatus::Exploring,
        RoverStatus::Scanning,
        RoverStatus::ReturningToBase,
        RoverStatus::Charging,
        RoverStatus::Idle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RoverStatus::Exploring => "Exploring",
            RoverStatus::Scanning => "Scanning",
            RoverStatus::ReturningToBase => "Returning to Base",
            RoverStatus::Charging => "Charging",
            RoverStatus::Idle => "Idle",
        }
    }
}

impl fmt::Display for RoverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Attitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoverState {
    pub status: RoverStatus,
    /// Seconds since boot
    pub uptime: u32,
    /// Metres per second
    pub speed: f64,
    pub orientation: Orientation,
    pub position: Vector3,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            intensity: None,
        }
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = Some(intensity);
        self
    }

    /// Distance from the origin on the ground plane (y ignored)
    pub fn planar_distance(&self) -> f64 {
        self.x.hypot(self.z)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlamData {
    pub points: Vec<Point>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadReckoning {
    pub trajectory: Vec<TrajectoryPoint>,
    pub drift: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionType {
    #[serde(rename = "RFID")]
    Rfid,
    Thermal,
    Vibration,
    Ultrasonic,
}

impl DetectionType {
    pub const ALL: [DetectionType; 4] = [
        DetectionType::Rfid,
        DetectionType::Thermal,
        DetectionType::Vibration,
        DetectionType::Ultrasonic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DetectionType::Rfid => "RFID",
            DetectionType::Thermal => "Thermal",
            DetectionType::Vibration => "Vibration",
            DetectionType::Ultrasonic => "Ultrasonic",
        }
    }
}

impl fmt::Display for DetectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub const ALL: [Confidence; 3] = [Confidence::Low, Confidence::Medium, Confidence::High];
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivorAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DetectionType,
    pub confidence: Confidence,
    pub location: Point,
    pub timestamp: DateTime<Utc>,
    pub verified: bool,
}

/// One complete telemetry reading. A new one replaces the previous wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub battery: BatteryState,
    pub sensors: SensorState,
    pub communication: CommState,
    pub rover: RoverState,
    pub slam: SlamData,
    pub dr: DeadReckoning,
    pub survivors: Vec<SurvivorAlert>,
}

impl DashboardSnapshot {
    /// The alert a new snapshot notifies on
    pub fn latest_alert(&self) -> Option<&SurvivorAlert> {
        self.survivors.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance_ignores_height() {
        let p = Point::new(3.0, 100.0, 4.0);
        assert!((p.planar_distance() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_enum_labels_match_wire_names() {
        assert_eq!(
            serde_json::to_string(&RoverStatus::ReturningToBase).unwrap(),
            "\"Returning to Base\""
        );
        assert_eq!(serde_json::to_string(&DetectionType::Rfid).unwrap(), "\"RFID\"");
        assert_eq!(RoverStatus::ReturningToBase.to_string(), "Returning to Base");
        assert_eq!(Confidence::Medium.to_string(), "Medium");
    }

    #[test]
    fn test_alert_serializes_type_field() {
        let alert = SurvivorAlert {
            id: "alert-1-0".to_string(),
            kind: DetectionType::Thermal,
            confidence: Confidence::High,
            location: Point::new(1.0, 0.0, -2.0),
            timestamp: Utc::now(),
            verified: false,
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "Thermal");
        assert_eq!(json["confidence"], "High");
        assert!(json["location"].get("intensity").is_none());
    }
}
