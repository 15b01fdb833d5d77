use std::{
    io::{self, Write},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use anyhow::{bail, Context};
use clap::ArgMatches;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing_subscriber::EnvFilter;

use morse_beacon::{
    generate_audio_file, morse_to_timing, text_to_morse, validate_text, FlashSink, MorseError,
    PlaybackEngine, SessionCallbacks, TimingConfig, TransmitCallbacks, Transmitter,
};

mod args;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let matches = args::parse_args();
    match matches.subcommand() {
        Some(("encode", m)) => cmd_encode(m),
        Some(("play", m)) => cmd_play(m),
        Some(("wav", m)) => cmd_wav(m),
        Some(("flash", m)) => cmd_flash(m),
        _ => bail!("invalid subcommand"),
    }
}

fn text_of(args: &ArgMatches) -> &str {
    args.get_one::<String>("text").unwrap()
}

fn config_of(args: &ArgMatches) -> TimingConfig {
    TimingConfig {
        time_unit_ms: *args.get_one::<u64>("dit").unwrap(),
        frequency: *args.get_one::<f32>("frequency").unwrap(),
    }
}

fn report_unsupported(text: &str) {
    let validation = validate_text(text);
    if !validation.is_valid {
        let chars = validation
            .unsupported_chars
            .iter()
            .map(|c| format!("{c:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("[-] Dropping unsupported characters: {chars}");
    }
}

fn cmd_encode(args: &ArgMatches) -> anyhow::Result<()> {
    let text = text_of(args);
    report_unsupported(text);

    let morse = text_to_morse(text);
    if morse.is_empty() {
        bail!("no supported characters in input");
    }

    println!("{morse}");
    Ok(())
}

fn cmd_play(args: &ArgMatches) -> anyhow::Result<()> {
    let text = text_of(args);
    let config = config_of(args);
    let speed = *args.get_one::<f64>("speed").unwrap();

    report_unsupported(text);
    let events = morse_to_timing(&text_to_morse(text), config.time_unit_ms);
    if events.is_empty() {
        bail!("no supported characters in input");
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no output device available")?;
    let supported_config = device
        .default_output_config()
        .context("no supported output config")?;
    let channels = supported_config.channels() as usize;

    // The engine synthesizes at a fixed rate; the stream must run at that
    // rate or every event stretches and the tone detunes.
    let stream_config = morse_beacon::audio::output_stream_config(supported_config.channels());
    println!(
        "[*] Output hooked into `{}` ({})",
        device.name().unwrap_or_else(|_| "unknown".into()),
        stream_config.sample_rate.0
    );

    let engine = Arc::new(PlaybackEngine::new(config));
    let stream = {
        let engine = engine.clone();
        device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    engine.fill_interleaved(data, channels);
                },
                |err| tracing::warn!(%err, "output stream error"),
                None,
            )
            .map_err(|e| MorseError::AudioPlaybackFailed(e.to_string()))?
    };

    engine.start(
        events,
        speed,
        SessionCallbacks {
            on_progress: Some(Box::new(|p| {
                print!("\r[*] {:3.0}%", p * 100.0);
                let _ = io::stdout().flush();
            })),
            on_complete: Some(Box::new(|| println!())),
        },
    )?;
    stream
        .play()
        .map_err(|e| MorseError::AudioPlaybackFailed(e.to_string()))?;

    while engine.is_playing() || engine.is_paused() {
        thread::sleep(Duration::from_millis(50));
    }
    engine.release_resources();
    Ok(())
}

fn cmd_wav(args: &ArgMatches) -> anyhow::Result<()> {
    let text = text_of(args);
    let config = config_of(args);
    let speed = *args.get_one::<f64>("speed").unwrap();
    let dir = args.get_one::<PathBuf>("output").unwrap();

    report_unsupported(text);
    let events = morse_to_timing(&text_to_morse(text), config.time_unit_ms);

    let path = generate_audio_file(&events, speed, &config, dir)?;
    println!("[*] Wrote `{}`", path.display());
    Ok(())
}

/// Renders the on/off signal as characters on stdout, standing in for
/// actual torch hardware.
struct ConsoleSink;

impl FlashSink for ConsoleSink {
    fn set_on(&mut self, on: bool) -> Result<(), MorseError> {
        print!("{}", if on { '#' } else { '.' });
        let _ = io::stdout().flush();
        Ok(())
    }
}

fn cmd_flash(args: &ArgMatches) -> anyhow::Result<()> {
    let text = text_of(args);
    let time_unit = *args.get_one::<u64>("dit").unwrap();

    report_unsupported(text);
    let events = morse_to_timing(&text_to_morse(text), time_unit);
    if events.is_empty() {
        bail!("no supported characters in input");
    }

    let transmitter = Transmitter::new();
    let done = Arc::new(AtomicBool::new(false));
    let failed = Arc::new(AtomicBool::new(false));

    transmitter.transmit(
        events,
        ConsoleSink,
        TransmitCallbacks {
            on_complete: Some(Box::new({
                let done = done.clone();
                move || done.store(true, Ordering::SeqCst)
            })),
            on_error: Some(Box::new({
                let done = done.clone();
                let failed = failed.clone();
                move |err| {
                    tracing::error!(%err, "flash transmission failed");
                    failed.store(true, Ordering::SeqCst);
                    done.store(true, Ordering::SeqCst);
                }
            })),
        },
    )?;

    while !done.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(10));
    }
    println!();
    transmitter.release_resources();

    if failed.load(Ordering::SeqCst) {
        bail!("transmission failed");
    }
    Ok(())
}
