// Mock telemetry generator - synthetic rover readings from an injected RNG
use crate::application::telemetry_source::SnapshotSource;
use crate::domain::telemetry::{
    BatteryState, CommState, Confidence, DashboardSnapshot, DeadReckoning, DetectionType,
    Orientation, Point, RoverState, RoverStatus, SensorState, SlamData, SurvivorAlert,
    TrajectoryPoint, Vector3,
};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

const TRAJECTORY_HEIGHT: f64 = 0.1;
const MAX_ALERTS_PER_TICK: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub point_count: usize,
    pub trajectory_len: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            point_count: 1000,
            trajectory_len: 100,
        }
    }
}

/// Every call is statistically independent of the previous one; nothing
/// carries over between snapshots except the RNG stream.
pub struct MockTelemetryGenerator<R: Rng = StdRng> {
    rng: R,
    config: GeneratorConfig,
}

impl MockTelemetryGenerator<StdRng> {
    pub fn seeded(seed: u64, config: GeneratorConfig) -> Self {
        Self::new(StdRng::seed_from_u64(seed), config)
    }

    pub fn from_entropy(config: GeneratorConfig) -> Self {
        Self::new(StdRng::from_entropy(), config)
    }
}

impl<R: Rng> MockTelemetryGenerator<R> {
    pub fn new(rng: R, config: GeneratorConfig) -> Self {
        Self { rng, config }
    }

    pub fn generate_at(
        &mut self,
        now: DateTime<Utc>,
        include_survivors: bool,
    ) -> DashboardSnapshot {
        let survivors = if include_survivors {
            let count = self.rng.gen_range(0..=MAX_ALERTS_PER_TICK);
            self.survivor_alerts_at(now, count)
        } else {
            Vec::new()
        };

        DashboardSnapshot {
            battery: self.battery_at(now),
            sensors: self.sensors_at(now),
            communication: self.communication_at(now),
            rover: self.rover_at(now),
            slam: SlamData {
                points: self.point_cloud(self.config.point_count),
                last_updated: now,
            },
            dr: DeadReckoning {
                trajectory: self.trajectory_at(now, self.config.trajectory_len),
                drift: self.rng.gen_range(0.0..2.0),
                last_updated: now,
            },
            survivors,
        }
    }

    pub fn battery_at(&mut self, now: DateTime<Utc>) -> BatteryState {
        BatteryState {
            level: self.rng.gen_range(5..=80),
            charging: self.rng.gen_bool(0.3),
            voltage: format!("{:.1}", self.rng.gen_range(11.0..14.0)),
            temperature: self.rng.gen_range(22..52),
            last_updated: now,
        }
    }

    pub fn sensors_at(&mut self, now: DateTime<Utc>) -> SensorState {
        SensorState {
            lidar: self.rng.gen_bool(0.9),
            camera: self.rng.gen_bool(0.85),
            imu: true,
            rfid: self.rng.gen_bool(0.95),
            thermal: self.rng.gen_bool(0.8),
            ultrasonic: self.rng.gen_bool(0.9),
            last_updated: now,
        }
    }

    pub fn communication_at(&mut self, now: DateTime<Utc>) -> CommState {
        let since_transmission = Duration::milliseconds(self.rng.gen_range(0..300_000));

        CommState {
            lora: self.rng.gen_bool(0.7),
            wifi: self.rng.gen_bool(0.4),
            cellular: self.rng.gen_bool(0.3),
            last_transmission: now - since_transmission,
            signal_strength: self.rng.gen_range(0..100),
            packet_loss: self.rng.gen_range(0..30),
            last_updated: now,
        }
    }

    pub fn rover_at(&mut self, now: DateTime<Utc>) -> RoverState {
        let status = *RoverStatus::ALL
            .choose(&mut self.rng)
            .unwrap_or(&RoverStatus::Idle);

        RoverState {
            status,
            uptime: self.rng.gen_range(0..86_400),
            speed: self.rng.gen_range(0.0..1.2),
            orientation: Orientation {
                roll: self.centered(30.0),
                pitch: self.centered(20.0),
                yaw: self.rng.gen_range(0.0..360.0),
            },
            position: Vector3::new(self.centered(100.0), self.centered(5.0), self.centered(100.0)),
            last_updated: now,
        }
    }

    /// Ring-shaped scatter on the ground plane, radius 5..20 plus up to ±1 of noise per axis
    pub fn point_cloud(&mut self, count: usize) -> Vec<Point> {
        (0..count)
            .map(|_| {
                let angle = self.rng.gen_range(0.0..TAU);
                let radius = 5.0 + self.rng.gen_range(0.0..15.0);
                let x = angle.cos() * radius + self.centered(2.0);
                let z = angle.sin() * radius + self.centered(2.0);
                Point::new(x, 0.0, z).with_intensity(self.rng.gen_range(0.0..1.0))
            })
            .collect()
    }

    /// Random walk from the origin drifting toward +x/+z, one second per step,
    /// ending one second before `now`
    pub fn trajectory_at(&mut self, now: DateTime<Utc>, len: usize) -> Vec<TrajectoryPoint> {
        let mut x = 0.0;
        let mut z = 0.0;

        (0..len)
            .map(|i| {
                x += (self.rng.gen_range(0.0..1.0) - 0.4) * 0.5;
                z += (self.rng.gen_range(0.0..1.0) - 0.4) * 0.5;
                TrajectoryPoint {
                    x,
                    y: TRAJECTORY_HEIGHT,
                    z,
                    timestamp: now - Duration::seconds((len - i) as i64),
                }
            })
            .collect()
    }

    pub fn survivor_alerts_at(&mut self, now: DateTime<Utc>, count: usize) -> Vec<SurvivorAlert> {
        (0..count)
            .map(|i| {
                let kind = *DetectionType::ALL
                    .choose(&mut self.rng)
                    .unwrap_or(&DetectionType::Rfid);
                let confidence = *Confidence::ALL
                    .choose(&mut self.rng)
                    .unwrap_or(&Confidence::Low);
                let location = Point::new(self.centered(20.0), 0.0, self.centered(20.0));
                let age = Duration::milliseconds(self.rng.gen_range(0..600_000));

                SurvivorAlert {
                    id: format!("alert-{}-{}", now.timestamp_millis(), i),
                    kind,
                    confidence,
                    location,
                    timestamp: now - age,
                    verified: self.rng.gen_bool(0.3),
                }
            })
            .collect()
    }

    /// Uniform in [-span/2, span/2)
    fn centered(&mut self, span: f64) -> f64 {
        (self.rng.gen_range(0.0..1.0) - 0.5) * span
    }
}

impl<R: Rng + Send> SnapshotSource for MockTelemetryGenerator<R> {
    fn generate(&mut self, include_survivors: bool) -> DashboardSnapshot {
        self.generate_at(Utc::now(), include_survivors)
    }
}
