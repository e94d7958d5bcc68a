use clap::{App, Arg, SubCommand};
use colored::*;
use fanctl::config::ControlConfig;
use fanctl::manager::{Manager, RecordingActuator};
use fanctl::sensor::SensorMap;
use std::path::Path;
use std::process;

fn main() {
    let matches = App::new("fanctl")
        .version("0.1.0")
        .author("Platform Firmware Team")
        .about("Fan control configuration tooling")
        .subcommand(
            SubCommand::with_name("check")
                .about("Validate a control configuration file")
                .arg(
                    Arg::with_name("config")
                        .value_name("FILE")
                        .help("Path to the control configuration JSON")
                        .required(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("simulate")
                .about("Run the startup firing against a simulated bus and print each zone's first arbitrated speed")
                .arg(
                    Arg::with_name("config")
                        .value_name("FILE")
                        .help("Path to the control configuration JSON")
                        .required(true),
                )
                .arg(
                    Arg::with_name("rpm")
                        .long("rpm")
                        .value_name("RPM")
                        .help("Simulated tach reading for every sensor")
                        .takes_value(true)
                        .default_value("4000"),
                ),
        )
        .get_matches();

    let exit_code = match matches.subcommand() {
        ("check", Some(sub)) => check(sub.value_of("config").unwrap_or_default()),
        ("simulate", Some(sub)) => simulate(
            sub.value_of("config").unwrap_or_default(),
            sub.value_of("rpm")
                .unwrap_or_default()
                .parse()
                .unwrap_or(4000.0),
        ),
        _ => {
            eprintln!("{}", "No subcommand given; try `fanctl check <FILE>`".yellow());
            2
        }
    };
    process::exit(exit_code);
}

fn load(path: &str) -> Option<ControlConfig> {
    match ControlConfig::load(Path::new(path)) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("{} {}", "configuration rejected:".red().bold(), e);
            None
        }
    }
}

fn check(path: &str) -> i32 {
    let Some(config) = load(path) else {
        return 1;
    };

    println!("{}", "configuration OK".green().bold());
    println!();
    println!("{}", "Zones".bold());
    for zone in &config.zones {
        println!(
            "  {}  default_floor={} ceiling={} full_speed={}",
            zone.id.cyan(),
            zone.default_floor,
            zone.ceiling,
            zone.full_speed
        );
    }
    println!();
    println!("{}", "Events".bold());
    if config.events.is_empty() {
        println!("  {}", "none - all zones run at full speed".yellow());
    }
    for event in &config.events {
        println!(
            "  {} -> zone {}  ({} groups, {} actions, {} triggers)",
            event.name.cyan(),
            event.zone,
            event.groups.len(),
            event.actions.len(),
            event.triggers.len()
        );
    }
    0
}

fn simulate(path: &str, rpm: f64) -> i32 {
    let Some(config) = load(path) else {
        return 1;
    };
    let mut manager = match Manager::new(&config) {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("{} {}", "configuration rejected:".red().bold(), e);
            return 1;
        }
    };

    let mut bus = SensorMap::new();
    for event in manager.events() {
        for group in &event.groups {
            for member in &group.members {
                bus.insert(member.sensor.clone(), rpm);
            }
        }
    }

    let mut actuator = RecordingActuator::default();
    manager.start(&bus, &mut actuator);

    println!("{}", "Startup arbitration".bold());
    for (zone, speed) in &actuator.commands {
        println!("  {} commanded {}", zone.cyan(), speed.to_string().green());
    }
    for zone in manager.zones() {
        let state = zone.state();
        println!(
            "  {}  floor={} target={} ceiling={}",
            state.id, state.floor, state.target, state.ceiling
        );
    }
    0
}
