use clap::{App, Arg};
use fanctl::config::ControlConfig;
use fanctl::manager::{Manager, SpeedActuator, Stimulus};
use fanctl::sensor::{SensorMap, SensorSource, Speed};
use fanctl::trigger::TriggerKind;
use std::path::Path;
use std::time::Duration;
use tokio::time;
use tracing::{error, info};

const DEFAULT_TICK_MS: &str = "1000";
const NOMINAL_TACH_RPM: f64 = 4000.0;

/// Actuator that applies commanded speeds to the PWM driver. The
/// physical driver is out of process; this daemon logs the writes it
/// would hand off.
struct PwmActuator;

impl SpeedActuator for PwmActuator {
    fn set_commanded_speed(&mut self, zone: &str, speed: Speed) {
        info!(zone = %zone, pwm = speed, "applying zone speed");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("fanctld")
        .version("0.1.0")
        .author("Platform Firmware Team")
        .about("Fan zone control daemon - trust-gated sensor arbitration")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Path to the control configuration JSON")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::with_name("tick-ms")
                .long("tick-ms")
                .value_name("MS")
                .help("Control loop tick period in milliseconds")
                .takes_value(true)
                .default_value(DEFAULT_TICK_MS),
        )
        .get_matches();

    tracing_subscriber::fmt::init();

    let config_path = matches.value_of("config").unwrap_or_default();
    let tick_ms: u64 = matches
        .value_of("tick-ms")
        .unwrap_or(DEFAULT_TICK_MS)
        .parse()
        .unwrap_or(1000);

    // Configuration errors are fatal: the daemon never starts with a
    // partially valid configuration.
    let config = match ControlConfig::load(Path::new(config_path)) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration rejected: {e}");
            return Err(e.into());
        }
    };

    let mut manager = Manager::new(&config)?;
    let mut actuator = PwmActuator;

    // Simulated sensor bus: every configured sensor starts present and
    // reporting a nominal speed. A real deployment backs SensorSource
    // onto the management bus property cache instead.
    let mut bus = SensorMap::new();
    let mut tracked = Vec::new();
    for event in manager.events() {
        for group in &event.groups {
            for member in &group.members {
                bus.insert(member.sensor.clone(), NOMINAL_TACH_RPM);
                tracked.push(member.sensor.clone());
            }
        }
    }
    let has_signal_triggers = manager.events().iter().any(|event| {
        event
            .triggers
            .iter()
            .any(|t| matches!(t.kind, TriggerKind::Signal { .. }))
    });

    // Startup firing: zones get a first arbitrated speed before the
    // loop is considered live.
    manager.start(&bus, &mut actuator);

    let mut interval = time::interval(Duration::from_millis(tick_ms));
    interval.tick().await; // first tick completes immediately

    info!(tick_ms, sensors = tracked.len(), "control loop live");
    let mut tick_count: u64 = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                tick_count = tick_count.wrapping_add(1);
                if let Err(e) = manager.queue_stimulus(Stimulus::TimerTick {
                    dt: Duration::from_millis(tick_ms),
                }) {
                    error!("stimulus dropped: {e}");
                }

                // Exercise signal triggers against the simulated bus:
                // wiggle each tach so property-change notifications
                // keep arriving.
                if has_signal_triggers {
                    let jitter = if tick_count % 2 == 0 { 25.0 } else { -25.0 };
                    for sensor in &tracked {
                        if let Some(value) = bus.read(sensor) {
                            bus.insert(sensor.clone(), value + jitter);
                        }
                        if let Err(e) = manager.queue_stimulus(Stimulus::SignalChanged {
                            sensor: sensor.clone(),
                        }) {
                            error!("stimulus dropped: {e}");
                        }
                    }
                }

                manager.process_stimuli(&bus, &mut actuator);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }
    }

    let stats = manager.stats();
    info!(
        stimuli = stats.stimuli_processed,
        firings = stats.event_firings,
        speed_changes = stats.speed_changes,
        "fan control daemon stopped"
    );

    Ok(())
}
