// Dashboard view models - what each panel renders
use serde::{Deserialize, Serialize};

use super::formatting::{AlertSeverity, BatteryBand};
use super::telemetry::{Confidence, DetectionType, RoverStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub header: HeaderView,
    pub status: StatusPanelView,
    pub alerts: AlertsPanelView,
    pub controls: ControlPanelView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderView {
    pub title: String,
    pub connected: bool,
    pub status_label: String,
    pub last_update: String,
    /// Overlay in the corner of the map, e.g. "X:1.00 Y:0.20 Z:-3.50"
    pub position_label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPanelView {
    pub rover: RoverStatusView,
    pub battery: BatteryView,
    pub sensors: Vec<IndicatorView>,
    pub links: Vec<IndicatorView>,
    pub signal_label: String,
    pub last_transmission: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoverStatusView {
    pub status: String,
    pub uptime: String,
    pub speed: String,
    pub roll: String,
    pub pitch: String,
    pub yaw: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryView {
    pub level: u8,
    pub band: BatteryBand,
    pub css_class: String,
    pub charging: bool,
    pub voltage: String,
    pub temperature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorView {
    pub label: String,
    pub online: bool,
    pub state_label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsPanelView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
    pub cards: Vec<AlertCard>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCard {
    pub id: String,
    pub kind: DetectionType,
    pub icon: String,
    pub title: String,
    pub time_since: String,
    pub confidence: Confidence,
    pub severity: AlertSeverity,
    pub badge_class: String,
    pub border_class: String,
    pub x: String,
    pub y: String,
    pub z: String,
    pub verified_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Standard,
    Deep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlTab {
    Movement,
    Scan,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AffordanceKind {
    Button { selected: bool },
    Switch { on: bool },
    Slider { value: u8, max: u8 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordance {
    pub id: String,
    pub label: String,
    pub tab: ControlTab,
    #[serde(flatten)]
    pub kind: AffordanceKind,
    pub enabled: bool,
}

/// Operator-side control values. They stay in the view and are never fed to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlState {
    pub speed_percent: u8,
    pub scan_mode: ScanMode,
    pub lidar_active: bool,
    pub rfid_scanning: bool,
    pub thermal_imaging: bool,
    pub vibration_analysis: bool,
    pub power_saving: bool,
    pub autonomous: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            speed_percent: 50,
            scan_mode: ScanMode::Standard,
            lidar_active: false,
            rfid_scanning: true,
            thermal_imaging: false,
            vibration_analysis: true,
            power_saving: false,
            autonomous: true,
        }
    }
}

/// A local control change coming from the operator's panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "control", content = "value", rename_all = "camelCase")]
pub enum ControlInput {
    Speed(u8),
    ScanMode(ScanMode),
    LidarActive(bool),
    RfidScanning(bool),
    ThermalImaging(bool),
    VibrationAnalysis(bool),
    PowerSaving(bool),
    Autonomous(bool),
}

impl ControlState {
    /// Returns false and leaves the state untouched while disconnected
    pub fn apply(&mut self, input: ControlInput, connected: bool) -> bool {
        if !connected {
            return false;
        }

        match input {
            ControlInput::Speed(percent) => self.speed_percent = percent.min(100),
            ControlInput::ScanMode(mode) => self.scan_mode = mode,
            ControlInput::LidarActive(on) => self.lidar_active = on,
            ControlInput::RfidScanning(on) => self.rfid_scanning = on,
            ControlInput::ThermalImaging(on) => self.thermal_imaging = on,
            ControlInput::VibrationAnalysis(on) => self.vibration_analysis = on,
            ControlInput::PowerSaving(on) => self.power_saving = on,
            ControlInput::Autonomous(on) => self.autonomous = on,
        }
        true
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPanelView {
    pub connected: bool,
    pub connection_label: String,
    pub status_label: String,
    pub mission_label: String,
    pub state: ControlState,
    pub affordances: Vec<Affordance>,
}

impl ControlPanelView {
    /// Every affordance is enabled exactly when the link is up
    pub fn new(connected: bool, status: RoverStatus, state: &ControlState) -> Self {
        let mission_label = if status == RoverStatus::Idle {
            "Start Mission"
        } else {
            "Stop Mission"
        };

        let button = |id: &str, label: &str, tab: ControlTab| Affordance {
            id: id.to_string(),
            label: label.to_string(),
            tab,
            kind: AffordanceKind::Button { selected: false },
            enabled: connected,
        };
        let switch = |id: &str, label: &str, on: bool, tab: ControlTab| Affordance {
            id: id.to_string(),
            label: label.to_string(),
            tab,
            kind: AffordanceKind::Switch { on },
            enabled: connected,
        };
        let scan_button = |id: &str, label: &str, mode: ScanMode| Affordance {
            kind: AffordanceKind::Button {
                selected: state.scan_mode == mode,
            },
            ..button(id, label, ControlTab::Scan)
        };

        let affordances = vec![
            Affordance {
                id: "speed".to_string(),
                label: format!("Speed: {}%", state.speed_percent),
                tab: ControlTab::Movement,
                kind: AffordanceKind::Slider {
                    value: state.speed_percent,
                    max: 100,
                },
                enabled: connected,
            },
            button("forward", "Forward", ControlTab::Movement),
            button("left", "Left", ControlTab::Movement),
            button("stop", "Stop", ControlTab::Movement),
            button("right", "Right", ControlTab::Movement),
            button("backward", "Backward", ControlTab::Movement),
            button("turn-around", "Turn Around", ControlTab::Movement),
            button("return-home", "Return Home", ControlTab::Movement),
            scan_button("scan-standard", "Standard", ScanMode::Standard),
            scan_button("scan-deep", "Deep", ScanMode::Deep),
            switch("lidar", "LiDAR Active", state.lidar_active, ControlTab::Scan),
            switch("rfid", "RFID Scanning", state.rfid_scanning, ControlTab::Scan),
            switch("thermal", "Thermal Imaging", state.thermal_imaging, ControlTab::Scan),
            switch(
                "vibration",
                "Vibration Analysis",
                state.vibration_analysis,
                ControlTab::Scan,
            ),
            button("start-scan", "Start Area Scan", ControlTab::Scan),
            switch("power-saving", "Power Saving Mode", state.power_saving, ControlTab::System),
            switch("autonomous", "Autonomous Mode", state.autonomous, ControlTab::System),
            button("reboot", "Reboot", ControlTab::System),
            button("mission", mission_label, ControlTab::System),
        ];

        Self {
            connected,
            connection_label: if connected { "Connected" } else { "Disconnected" }.to_string(),
            status_label: format!("Status: {}", status),
            mission_label: mission_label.to_string(),
            state: state.clone(),
            affordances,
        }
    }
}
