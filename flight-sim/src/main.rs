use std::{
    fs,
    io::{self, Write},
    path::Path,
    sync::{mpsc, Arc},
    thread,
};

use chrono::{DateTime, Utc};
use logger::Logger;
use rand::Rng;
use simulator::types::airport::catalog;
use simulator::types::sinks::ChannelNotifier;
use simulator::{
    FileStore, FlightRecord, FlightSnapshot, FlightStatus, Notification, SimConfig, SimError,
    Simulation, SteppedClock,
};

const LOG_DIR: &str = "logs";
const SNAPSHOT_FILE: &str = "flights_snapshot.json";

fn clean_scr() {
    print!("\x1B[2J\x1B[1;1H");
    let _ = io::stdout().flush();
}

fn add_flight(sim: &Simulation) -> Result<(), SimError> {
    clean_scr();
    let flight_number = prompt_input("Enter the flight number: ");
    let origin = prompt_input("Enter the origin IATA code: ");
    let destination = prompt_input("Enter the destination IATA code: ");
    let departure_time = prompt_input("Enter the departure time (DD-MM-YYYY HH:MM:SS): ");
    let arrival_time = prompt_input("Enter the arrival time (DD-MM-YYYY HH:MM:SS): ");

    let flight = FlightRecord::new_from_console(
        &flight_number,
        &origin,
        &destination,
        &departure_time,
        &arrival_time,
    )?;

    sim.load_snapshot(vec![flight]);
    Ok(())
}

fn load_file(sim: &Simulation, path: &str) -> Result<(), SimError> {
    let contents =
        fs::read_to_string(path).map_err(|e| SimError::InvalidInput(format!("{}: {}", path, e)))?;

    // Either the store's `{"data": [...]}` shape or a bare list.
    let records = match serde_json::from_str::<FlightSnapshot>(&contents) {
        Ok(snapshot) => snapshot.data,
        Err(_) => serde_json::from_str::<Vec<FlightRecord>>(&contents)
            .map_err(|e| SimError::InvalidInput(format!("{}: {}", path, e)))?,
    };

    let summary = sim.load_snapshot(records);
    println!(
        "Loaded {} active, {} scheduled, {} landed, {} cancelled ({} skipped)",
        summary.active, summary.scheduled, summary.landed, summary.cancelled, summary.skipped
    );
    Ok(())
}

fn set_time_rate(clock: &SteppedClock) -> Result<(), SimError> {
    let minutes_input = prompt_input("Enter the time rate (in minutes): ");
    let minutes: i64 = minutes_input
        .parse()
        .map_err(|_| SimError::InvalidInput(minutes_input.clone()))?;

    clock.set_tick_advance(minutes)
}

/// Keeps the flights whose state matches `status`, as typed in the console.
fn flights_with_status(
    flights: Vec<FlightRecord>,
    status: &str,
) -> Result<Vec<FlightRecord>, SimError> {
    let status = FlightStatus::from_str(status)?;
    Ok(flights
        .into_iter()
        .filter(|flight| flight.status == status)
        .collect())
}

fn print_flights(flights: &[FlightRecord]) {
    if flights.is_empty() {
        println!("No flights available.");
        return;
    }
    println!(
        "\n{:<12} {:<10} {:<8} {:<8} {:<10} {:<10} {:<8} {:<8}",
        "Flight", "Status", "Origin", "Dest", "Latitude", "Longitude", "Alt(ft)", "Heading"
    );
    for flight in flights {
        match &flight.live {
            Some(live) => println!(
                "{:<12} {:<10} {:<8} {:<8} {:<10.4} {:<10.4} {:<8.0} {:<8.1}",
                flight.identity().unwrap_or("?"),
                flight.status.as_str(),
                flight.departure.iata,
                flight.arrival.iata,
                live.latitude,
                live.longitude,
                live.altitude,
                live.direction
            ),
            None => println!(
                "{:<12} {:<10} {:<8} {:<8} {:<10} {:<10} {:<8} {:<8}",
                flight.identity().unwrap_or("?"),
                flight.status.as_str(),
                flight.departure.iata,
                flight.arrival.iata,
                "-",
                "-",
                "-",
                "-"
            ),
        }
    }
}

/// Displays the flights in real time until Enter is pressed.
fn display_flights(sim: &Simulation) {
    let refresh = SimConfig::default().tick_interval;
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut buffer = String::new();
        if io::stdin().read_line(&mut buffer).is_ok() {
            tx.send(()).ok();
        }
    });

    loop {
        clean_scr();
        println!("Current time: {}", sim.now().format("%d-%m-%Y %H:%M:%S"));
        print_flights(&sim.list_all());
        println!("\nPress Enter to exit list-flights mode");

        if rx.recv_timeout(refresh).is_ok() {
            break;
        }
    }
}

fn print_stats(sim: &Simulation) {
    let stats = sim.stats();
    println!("Total flights:     {}", stats.total_flights);
    println!("  active:          {}", stats.active_flights);
    println!("  scheduled:       {}", stats.scheduled_flights);
    println!("  landed:          {}", stats.landed_flights);
    println!("  cancelled:       {}", stats.cancelled_flights);
    println!("Average speed:     {} km/h", stats.avg_speed);
    println!("Average altitude:  {} ft", stats.avg_altitude);
    println!(
        "Running:           {}{}",
        stats.is_running,
        if sim.is_paused() { " (paused)" } else { "" }
    );
}

fn main() -> Result<(), SimError> {
    fs::create_dir_all(LOG_DIR).map_err(|e| SimError::InvalidInput(e.to_string()))?;
    let logger = Logger::new(Path::new(LOG_DIR), "simulator", false)
        .map_err(|e| SimError::InvalidInput(e.to_string()))?;

    let clock = Arc::new(SteppedClock::new(Utc::now(), 1)?);

    let (notification_tx, notification_rx) = mpsc::channel::<Notification>();
    thread::spawn(move || {
        for notification in notification_rx {
            println!(
                "\n[{:?}] {}: {}",
                notification.kind, notification.title, notification.message
            );
        }
    });

    let sim = Simulation::builder(logger)
        .clock(clock.clone())
        .snapshot_store(Arc::new(FileStore::new(SNAPSHOT_FILE)))
        .notifier(Arc::new(ChannelNotifier::new(notification_tx)))
        .build();

    sim.start_default()?;

    loop {
        println!("Enter command (type '-h' or '--help' for options): ");
        let mut command = String::new();
        if io::stdin().read_line(&mut command).is_err() {
            break;
        }

        let args: Vec<&str> = command.split_whitespace().collect();
        if args.is_empty() {
            continue;
        }

        match args[0] {
            "add-flight" => {
                if let Err(e) = add_flight(&sim) {
                    println!("{}", e);
                }
            }

            "load" => match args.get(1) {
                Some(path) => {
                    if let Err(e) = load_file(&sim, path) {
                        println!("{}", e);
                    }
                }
                None => println!("Usage: load <file.json>"),
            },

            "test-data" => {
                clean_scr();
                let summary = sim.load_snapshot(test_dynamic_data(sim.now()));
                println!(
                    "Test data added: {} active, {} scheduled, {} landed",
                    summary.active, summary.scheduled, summary.landed
                );
            }

            "list-flights" => display_flights(&sim),

            "list-active" => print_flights(&sim.list_active()),

            "list" => match args.get(1) {
                Some(status) => match flights_with_status(sim.list_all(), status) {
                    Ok(flights) => print_flights(&flights),
                    Err(e) => println!("{}", e),
                },
                None => println!("Usage: list <scheduled|active|landed|cancelled>"),
            },

            "find" => match args.get(1).and_then(|id| sim.find_by_identity(id)) {
                Some(flight) => {
                    print_flights(std::slice::from_ref(&flight));
                    if let Some(progress) = sim.progress(args[1]) {
                        println!("Progress: {:.1}%", progress * 100.0);
                    }
                }
                None => println!("Flight not found."),
            },

            "stats" => print_stats(&sim),

            "report" => {
                for line in sim.status_report() {
                    println!("{}", line);
                }
            }

            "time-rate" => {
                clean_scr();
                if let Err(e) = set_time_rate(&clock) {
                    println!("{}", e);
                }
            }

            "start" => {
                if let Err(e) = sim.start_default() {
                    println!("{}", e);
                }
            }

            "stop" => {
                sim.stop();
                println!("Simulation stopped");
            }

            "pause" => {
                sim.pause();
                println!("Simulation paused");
            }

            "resume" => {
                sim.resume();
                println!("Simulation resumed");
            }

            "clear" => {
                sim.clear(false);
                println!("All flights removed");
            }

            "-h" | "--help" | "help" => print_help(),

            "exit" => break,

            _ => eprintln!("Invalid command. Use -h for help."),
        }
    }

    sim.dispose();
    Ok(())
}

fn prompt_input(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return String::new();
    }
    input.trim().to_string()
}

fn print_help() {
    clean_scr();
    println!("Available commands:");
    println!("  add-flight");
    println!("    Adds a new scheduled flight. You'll be prompted for each detail.");
    println!("  load <file.json>");
    println!("    Loads flights from a JSON list or a {{\"data\": [...]}} snapshot.");
    println!("  test-data");
    println!("    Adds random flights between known airports, in every state.");
    println!("  list-flights");
    println!("    Shows all flights, refreshed on every tick.");
    println!("  list-active");
    println!("    Shows the flights currently in the air.");
    println!("  list <status>");
    println!("    Shows the scheduled, active, landed or cancelled flights.");
    println!("  find <id>");
    println!("    Shows one flight and its progress.");
    println!("  stats");
    println!("    Shows counts per state and average speed and altitude.");
    println!("  report");
    println!("    Shows the progress of every active flight.");
    println!("  time-rate");
    println!("    Changes the simulation's elapsed time per tick.");
    println!("  start | stop");
    println!("    Starts or stops the automatic updates.");
    println!("  pause | resume");
    println!("    Pauses or resumes the automatic updates.");
    println!("  clear");
    println!("    Removes every flight.");
    println!("  exit");
    println!("    Closes this application.");
}

/// Random flights between catalog airports: some already in the air, some
/// about to leave and some finished, as seen at the simulation's `now`.
fn test_dynamic_data(now: DateTime<Utc>) -> Vec<FlightRecord> {
    let airports: Vec<String> = catalog().into_keys().collect();
    let mut rng = rand::thread_rng();
    let mut flights = Vec::new();

    for origin in airports.iter().take(24) {
        let destination = &airports[rng.gen_range(0..airports.len())];
        if origin == destination {
            continue;
        }

        let duration = chrono::Duration::minutes(rng.gen_range(60..=360));
        let offset = chrono::Duration::minutes(rng.gen_range(-400..=120));
        let departure_time = now + offset;
        let arrival_time = departure_time + duration;
        let flight_number = format!("{}{:04}", origin, rng.gen_range(1000..9999));

        let mut flight = FlightRecord::scheduled(
            &flight_number,
            origin,
            destination,
            departure_time,
            arrival_time,
        );
        if arrival_time <= now {
            flight.set_status(FlightStatus::Landed);
        } else if departure_time <= now {
            flight.set_status(FlightStatus::Active);
        }
        flights.push(flight);
    }

    flights
}
