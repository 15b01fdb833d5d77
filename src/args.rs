use std::path::PathBuf;

use clap::{value_parser, Arg, ArgMatches, Command};

pub fn parse_args() -> ArgMatches {
    Command::new("morse-beacon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Converts text to Morse code and sends it as tones, WAV files, or light pulses.")
        .subcommand_required(true)
        .subcommands([
            Command::new("encode")
                .alias("e")
                .about("Prints the Morse rendering of the given text.")
                .arg(text_arg()),
            Command::new("play")
                .alias("p")
                .about("Plays the Morse rendering through the default output device.")
                .args([text_arg(), dit_arg(), frequency_arg(), speed_arg()]),
            Command::new("wav")
                .alias("w")
                .about("Writes the Morse rendering to a WAV file.")
                .args([
                    text_arg(),
                    dit_arg(),
                    frequency_arg(),
                    speed_arg(),
                    output_arg(),
                ]),
            Command::new("flash")
                .alias("f")
                .about("Simulates a flashlight transmission on the console.")
                .args([text_arg(), dit_arg()]),
        ])
        .get_matches()
}

fn text_arg() -> Arg {
    Arg::new("text").help("Text to transmit").required(true)
}

fn dit_arg() -> Arg {
    Arg::new("dit")
        .short('d')
        .long("dit")
        .help("Base time unit in milliseconds")
        .value_parser(value_parser!(u64))
        .default_value("120")
}

fn frequency_arg() -> Arg {
    Arg::new("frequency")
        .short('f')
        .long("frequency")
        .help("Tone frequency in hertz")
        .value_parser(value_parser!(f32))
        .default_value("600")
}

fn speed_arg() -> Arg {
    Arg::new("speed")
        .short('s')
        .long("speed")
        .help("Playback speed multiplier, 0.5 to 2.0")
        .value_parser(value_parser!(f64))
        .default_value("1")
}

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .help("Directory the WAV file is written to")
        .value_parser(value_parser!(PathBuf))
        .default_value(".")
}
