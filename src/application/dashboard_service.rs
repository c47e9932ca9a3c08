// Dashboard service - Use case for building panel view models from the latest state
use crate::application::refresh_loop::DashboardState;
use crate::domain::dashboard::{
    AlertCard, AlertsPanelView, BatteryView, ControlPanelView, ControlState, DashboardView,
    HeaderView, IndicatorView, RoverStatusView, StatusPanelView,
};
use crate::domain::formatting::{
    AlertSeverity, BatteryBand, detection_icon, format_uptime, online_label, time_since,
};
use crate::domain::telemetry::{
    BatteryState, CommState, DashboardSnapshot, RoverState, SensorState, SurvivorAlert,
};
use chrono::{DateTime, Utc};

const DASHBOARD_TITLE: &str = "Autonomous Rescue Rover";
const CLOCK_FORMAT: &str = "%H:%M:%S";

#[derive(Clone, Default)]
pub struct DashboardService;

impl DashboardService {
    pub fn new() -> Self {
        Self
    }

    pub fn get_dashboard(
        &self,
        state: &DashboardState,
        controls: &ControlState,
        now: DateTime<Utc>,
    ) -> DashboardView {
        let connected = state.connection.is_connected();
        let snapshot = state.snapshot.as_ref();

        DashboardView {
            header: self.header(state, snapshot, now),
            status: self.status_panel(snapshot),
            alerts: self.alerts_panel(&snapshot.survivors, now),
            controls: ControlPanelView::new(connected, snapshot.rover.status, controls),
        }
    }

    /// "Last Update" is the render-time clock, so it keeps moving while the link is down
    fn header(
        &self,
        state: &DashboardState,
        snapshot: &DashboardSnapshot,
        now: DateTime<Utc>,
    ) -> HeaderView {
        let connected = state.connection.is_connected();
        let position = snapshot.rover.position;

        HeaderView {
            title: DASHBOARD_TITLE.to_string(),
            connected,
            status_label: if connected { "Connected" } else { "Connection Lost" }.to_string(),
            last_update: now.format(CLOCK_FORMAT).to_string(),
            position_label: format!("X:{:.2} Y:{:.2} Z:{:.2}", position.x, position.y, position.z),
        }
    }

    pub fn status_panel(&self, snapshot: &DashboardSnapshot) -> StatusPanelView {
        StatusPanelView {
            rover: rover_view(&snapshot.rover),
            battery: battery_view(&snapshot.battery),
            sensors: sensor_indicators(&snapshot.sensors),
            links: link_indicators(&snapshot.communication),
            signal_label: format!("Signal: {}%", snapshot.communication.signal_strength),
            last_transmission: snapshot
                .communication
                .last_transmission
                .format(CLOCK_FORMAT)
                .to_string(),
        }
    }

    pub fn alerts_panel(&self, survivors: &[SurvivorAlert], now: DateTime<Utc>) -> AlertsPanelView {
        if survivors.is_empty() {
            return AlertsPanelView {
                empty_message: Some("No survivor detections".to_string()),
                cards: Vec::new(),
            };
        }

        AlertsPanelView {
            empty_message: None,
            cards: survivors.iter().map(|alert| alert_card(alert, now)).collect(),
        }
    }
}

fn rover_view(rover: &RoverState) -> RoverStatusView {
    RoverStatusView {
        status: rover.status.to_string(),
        uptime: format_uptime(rover.uptime),
        speed: format!("{:.2} m/s", rover.speed),
        roll: format!("{:.1}°", rover.orientation.roll),
        pitch: format!("{:.1}°", rover.orientation.pitch),
        yaw: format!("{:.1}°", rover.orientation.yaw),
    }
}

fn battery_view(battery: &BatteryState) -> BatteryView {
    let band = BatteryBand::for_level(battery.level);

    BatteryView {
        level: battery.level,
        band,
        css_class: band.css_class().to_string(),
        charging: battery.charging,
        voltage: format!("{}V", battery.voltage),
        temperature: format!("{}°C", battery.temperature),
    }
}

fn indicator(label: &str, online: bool, state_label: &str) -> IndicatorView {
    IndicatorView {
        label: label.to_string(),
        online,
        state_label: state_label.to_string(),
    }
}

fn sensor_indicators(sensors: &SensorState) -> Vec<IndicatorView> {
    sensors
        .readings()
        .into_iter()
        .map(|(label, online)| indicator(label, online, online_label(online)))
        .collect()
}

fn link_indicators(comms: &CommState) -> Vec<IndicatorView> {
    comms
        .links()
        .into_iter()
        .map(|(label, online)| indicator(label, online, if online { "Up" } else { "Down" }))
        .collect()
}

fn alert_card(alert: &SurvivorAlert, now: DateTime<Utc>) -> AlertCard {
    let severity = AlertSeverity::from(alert.confidence);

    AlertCard {
        id: alert.id.clone(),
        kind: alert.kind,
        icon: detection_icon(alert.kind).to_string(),
        title: format!("{} Detection", alert.kind),
        time_since: time_since(alert.timestamp, now),
        confidence: alert.confidence,
        severity,
        badge_class: severity.css_class().to_string(),
        border_class: if alert.verified { "border-success" } else { "border-warning" }.to_string(),
        x: format!("{:.2}", alert.location.x),
        y: format!("{:.2}", alert.location.y),
        z: format!("{:.2}", alert.location.z),
        verified_label: if alert.verified { "Verified ✓" } else { "Unverified" }.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::refresh_loop::ConnectionState;
    use crate::application::telemetry_generator::{GeneratorConfig, MockTelemetryGenerator};
    use crate::domain::telemetry::{Confidence, DetectionType, Point};
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn state_with(snapshot: DashboardSnapshot, connection: ConnectionState) -> DashboardState {
        DashboardState {
            snapshot: Arc::new(snapshot),
            connection,
            sequence: 3,
            last_tick: Utc::now(),
        }
    }

    fn snapshot() -> DashboardSnapshot {
        let config = GeneratorConfig {
            point_count: 4,
            trajectory_len: 4,
        };
        MockTelemetryGenerator::seeded(12, config).generate_at(Utc::now(), false)
    }

    #[test]
    fn test_low_battery_selects_critical_band() {
        let mut snapshot = snapshot();
        snapshot.battery.level = 15;
        let panel = DashboardService::new().status_panel(&snapshot);
        assert_eq!(panel.battery.band, BatteryBand::Critical);
        assert_eq!(panel.battery.css_class, "text-destructive");
    }

    #[test]
    fn test_status_panel_formatting() {
        let mut snapshot = snapshot();
        snapshot.rover.uptime = 3_725;
        snapshot.rover.speed = 0.456;
        snapshot.battery.voltage = "12.4".to_string();
        snapshot.communication.signal_strength = 64;
        let panel = DashboardService::new().status_panel(&snapshot);
        assert_eq!(panel.rover.uptime, "01:02:05");
        assert_eq!(panel.rover.speed, "0.46 m/s");
        assert_eq!(panel.battery.voltage, "12.4V");
        assert_eq!(panel.signal_label, "Signal: 64%");
        assert_eq!(panel.sensors.len(), 6);
        let imu = panel.sensors.iter().find(|s| s.label == "IMU").unwrap();
        assert_eq!(imu.state_label, "Online");
    }

    #[test]
    fn test_empty_alerts_panel() {
        let panel = DashboardService::new().alerts_panel(&[], Utc::now());
        assert_eq!(panel.empty_message.as_deref(), Some("No survivor detections"));
        assert!(panel.cards.is_empty());
    }

    #[test]
    fn test_alert_cards() {
        let now = Utc::now();
        let alert = SurvivorAlert {
            id: "alert-1-0".to_string(),
            kind: DetectionType::Vibration,
            confidence: Confidence::High,
            location: Point::new(1.234, 0.0, -5.0),
            timestamp: now - Duration::seconds(125),
            verified: true,
        };
        let panel = DashboardService::new().alerts_panel(&[alert], now);
        let card = &panel.cards[0];
        assert_eq!(card.title, "Vibration Detection");
        assert_eq!(card.time_since, "2m ago");
        assert_eq!(card.severity, AlertSeverity::Critical);
        assert_eq!(card.border_class, "border-success");
        assert_eq!(card.x, "1.23");
        assert_eq!(card.z, "-5.00");
        assert_eq!(card.verified_label, "Verified ✓");
    }

    #[test]
    fn test_disconnected_dashboard() {
        let state = state_with(snapshot(), ConnectionState::Disconnected);
        let controls = ControlState::default();
        let view = DashboardService::new().get_dashboard(&state, &controls, Utc::now());
        assert_eq!(view.header.status_label, "Connection Lost");
        assert!(!view.controls.connected);
        assert!(view.controls.affordances.iter().all(|a| !a.enabled));
    }

    #[test]
    fn test_last_update_follows_render_clock() {
        let mut state = state_with(snapshot(), ConnectionState::Disconnected);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 15).unwrap();
        state.last_tick = now - Duration::minutes(3);

        let view = DashboardService::new().get_dashboard(&state, &ControlState::default(), now);
        assert_eq!(view.header.last_update, "14:30:15");
    }
}
