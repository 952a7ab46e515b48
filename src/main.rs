// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, Level};

use tonnetz::config::{AppConfig, ConfigEvent, ConfigWatcher};
use tonnetz::midi::{print_sources, HeldNotes, MidiInput};
use tonnetz::music::{Gamme, ScaleType, Signature};
use tonnetz::{ChordDetector, ChordMatch, Lattice, NoteNamer};

fn print_usage() {
    println!("Tonnetz - scale recognition, harmonic lattice and chord detection");
    println!();
    println!("Usage: tonnetz [--config FILE] [--verbose] [--yaml] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  --chord <NOTE>...         Detect chords from note names (first note is the bass)");
    println!("  --midi <N>...             Detect chords from MIDI note numbers");
    println!("  --scale <TONIC> <SCALE>   Describe a scale; SCALE is a preset or a 12-bit signature");
    println!("  --lattice [H V]           Build the lattice and list triads in the configured scale");
    println!("  --list-sources            List available MIDI sources (inputs)");
    println!("  --monitor <N>             Detect chords live from MIDI source N");
    println!("  --watch <FILE>            Watch a configuration file and report reloads");
    println!("  --help                    Show this help message");
    println!();
    println!("Options:");
    println!("  --config <FILE>           Load settings from a YAML or TOML file");
    println!("  --verbose                 Enable debug logging");
    println!("  --yaml                    Print chord matches as YAML");
}

/// Global options pulled out ahead of the command
struct Options {
    config: Option<PathBuf>,
    verbose: bool,
    yaml: bool,
}

fn split_options(args: &[String]) -> Result<(Options, Vec<String>)> {
    let mut options = Options {
        config: None,
        verbose: false,
        yaml: false,
    };
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config = Some(PathBuf::from(path));
            }
            "--verbose" | "-v" => options.verbose = true,
            "--yaml" => options.yaml = true,
            _ => rest.push(arg.clone()),
        }
    }
    Ok((options, rest))
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {}: {}", what, value))
}

fn print_matches(matches: &[ChordMatch], yaml: bool) -> Result<()> {
    if yaml {
        print!("{}", serde_yaml::to_string(matches).context("Failed to serialize chord matches")?);
        return Ok(());
    }
    if matches.is_empty() {
        println!("No chord recognized.");
        return Ok(());
    }
    for m in matches {
        println!(
            "{:<16} root {:<3} bass {:<3} {}/{} notes",
            m.to_string(),
            m.root,
            m.bass,
            m.recognized_notes,
            m.total_notes
        );
    }
    Ok(())
}

fn describe_scale(gamme: &Gamme) {
    println!("{}", gamme);
    println!("  signature: {}", gamme.signature());
    println!("  notes:     {}", gamme.note_names().join(" "));
    println!("  degrees:   {}", gamme.degres().join(" "));
    println!("  intervals: {}", gamme.intervalles().join(" "));
}

fn scale_command(config: &AppConfig, tonic: &str, scale: &str) -> Result<()> {
    let style = config.theory.naming_style;
    let gamme = match scale.parse::<Signature>() {
        Ok(signature) => Gamme::new(signature, tonic, style)?,
        Err(_) => {
            let preset = ScaleType::from_str(scale).ok_or_else(|| anyhow!("Unknown scale: {}", scale))?;
            Gamme::from_scale_type(preset, tonic, style)?
        }
    };
    describe_scale(&gamme);
    Ok(())
}

fn lattice_command(config: &AppConfig, extents: &[String]) -> Result<()> {
    let gamme = config.build_gamme()?;
    let mut lattice_config = config.lattice_config()?;
    if let [h, v, ..] = extents {
        lattice_config.h_extent = parse_number(h, "horizontal extent")?;
        lattice_config.v_extent = parse_number(v, "vertical extent")?;
    }

    let lattice = Lattice::new(lattice_config);
    println!(
        "Lattice {}x{}: {} nodes, {} edges, {} triangles",
        lattice_config.h_extent,
        lattice_config.v_extent,
        lattice.node_count(),
        lattice.edges().len(),
        lattice.triangles().len()
    );
    println!("Triads in {}:", gamme);
    for triangle in lattice.triangles_in_scale(&gamme) {
        let Some(root) = triangle.root(&lattice) else {
            continue;
        };
        let quality = if triangle.is_major() { "" } else { "m" };
        let coords: Vec<String> = triangle.nodes.iter().map(|c| c.to_string()).collect();
        println!("  {:<4} {}", format!("{}{}", gamme.name_of(root), quality), coords.join(" "));
    }
    Ok(())
}

fn monitor_input(config: &AppConfig, source: usize) -> Result<()> {
    let gamme = config.build_gamme()?;
    let detector = ChordDetector::new(config.detector);

    println!("Connecting to MIDI source {}...", source);
    let input = MidiInput::new(source)?;
    println!("Monitoring {} (press Ctrl+C to stop)...", input.port_name());
    println!();

    let mut held = HeldNotes::new();
    while let Some(msg) = input.recv() {
        if !msg.affects_notes() || !held.apply(&msg) {
            continue;
        }
        let notes = held.notes();
        let names: Vec<String> = notes
            .iter()
            .map(|&n| gamme.name_of(tonnetz::PitchClass::from_midi(n)))
            .collect();
        match detector.detect_midi(&notes, &gamme).first() {
            Some(best) => println!("{:<24} {}", names.join(" "), best),
            None => println!("{}", names.join(" ")),
        }
    }

    println!("MIDI source disconnected.");
    Ok(())
}

fn watch_config(path: &str) -> Result<()> {
    let initial = AppConfig::load(path)?;
    describe_scale(&initial.build_gamme()?);

    let watcher = ConfigWatcher::new(path, None)?;
    println!("Watching {:?} (press Ctrl+C to stop)...", watcher.watched_path());

    while let Some(event) = watcher.recv() {
        match event {
            ConfigEvent::Reloaded(config) => match config.build_gamme() {
                Ok(gamme) => describe_scale(&gamme),
                Err(e) => eprintln!("Keeping previous scale: {:#}", e),
            },
            ConfigEvent::Error(e) => eprintln!("Keeping previous scale: {}", e),
            ConfigEvent::FileCreated(p) => info!(path = ?p, "file created"),
            ConfigEvent::FileDeleted(p) => info!(path = ?p, "file deleted"),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (options, args) = split_options(&args)?;

    tracing_subscriber::fmt()
        .with_max_level(if options.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let config = match &options.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let Some(command) = args.first() else {
        println!("Tonnetz - scale recognition, harmonic lattice and chord detection");
        println!("Run with --help for usage information");
        return Ok(());
    };
    let params = &args[1..];

    match command.as_str() {
        "--chord" => {
            if params.is_empty() {
                bail!("--chord requires at least one note name");
            }
            let gamme = config.build_gamme()?;
            let names: Vec<&str> = params.iter().map(String::as_str).collect();
            let matches = ChordDetector::new(config.detector).detect_names(&names, &gamme);
            print_matches(&matches, options.yaml)?;
        }
        "--midi" => {
            if params.is_empty() {
                bail!("--midi requires at least one note number");
            }
            let notes = params
                .iter()
                .map(|p| parse_number::<u8>(p, "MIDI note"))
                .collect::<Result<Vec<_>>>()?;
            let gamme = config.build_gamme()?;
            let matches = ChordDetector::new(config.detector).detect_midi(&notes, &gamme);
            print_matches(&matches, options.yaml)?;
        }
        "--scale" => {
            let [tonic, scale, ..] = params else {
                bail!("--scale requires a tonic and a preset name or 12-bit signature");
            };
            scale_command(&config, tonic, scale)?;
        }
        "--lattice" => lattice_command(&config, params)?,
        "--list-sources" => print_sources(),
        "--monitor" => {
            let source = params
                .first()
                .ok_or_else(|| anyhow!("--monitor requires a source number (see --list-sources)"))?;
            monitor_input(&config, parse_number(source, "source number")?)?;
        }
        "--watch" => {
            let path = params.first().ok_or_else(|| anyhow!("--watch requires a file path"))?;
            watch_config(path)?;
        }
        "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown option: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
