// ppmaudio
// Copyright (c) 2024 The ppmaudio Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ppmaudio::core::audio::AudioSpec;
use ppmaudio::core::errors::Error;
use ppmaudio::ppm::Track;
use ppmaudio::wav::{read_pcm, write_pcm};
use ppmaudio::{decode_track, encode_pcm};

use clap::Parser;
use log::{error, info};

const EXAMPLES: [&str; 2] =
    ["ppmaudio -e audio.wav -o audio.adpcm", "ppmaudio -d flipnote.ppm -t bgm -o audio.wav"];

#[derive(Parser, Debug)]
#[command(name = "ppmaudio", version, about = "Extract and encode Flipnote Studio sound tracks")]
struct Args {
    /// The WAVE file to encode
    #[arg(short, long, value_name = "WAV")]
    encode: Option<PathBuf>,

    /// The Flipnote Studio animation to decode a track of
    #[arg(short, long, value_name = "PPM")]
    decode: Option<PathBuf>,

    /// The track to decode (bgm, se1, se2, se3)
    #[arg(short, long, value_name = "TRACK")]
    track: Option<String>,

    /// The file to write to
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// A validated invocation.
#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Encode { input: PathBuf, output: PathBuf },
    Decode { input: PathBuf, track: Track, output: PathBuf },
}

/// An invalid combination of arguments.
#[derive(Debug, PartialEq, Eq)]
enum UsageError {
    NothingToDo,
    TrackWhenEncoding,
    BothModes,
    MissingTrack,
    InvalidTrack(String),
    MissingOutput,
}

impl UsageError {
    fn show_examples(&self) -> bool {
        !matches!(self, UsageError::InvalidTrack(_))
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::NothingToDo => write!(
                f,
                "either a WAVE file to encode or a PPM file to decode a track of must be given, \
                along with the output file"
            ),
            UsageError::TrackWhenEncoding => {
                write!(f, "a track cannot be selected when encoding a WAVE file")
            }
            UsageError::BothModes => {
                write!(f, "cannot encode a WAVE file and decode a PPM track in the same command")
            }
            UsageError::MissingTrack => write!(f, "a track to decode must be given"),
            UsageError::InvalidTrack(msg) => write!(f, "{}", msg),
            UsageError::MissingOutput => write!(f, "an output file must be given"),
        }
    }
}

fn validate(args: Args) -> Result<Mode, UsageError> {
    let Args { encode, decode, track, output } = args;

    if encode.is_none() && (decode.is_none() || output.is_none()) {
        return Err(UsageError::NothingToDo);
    }
    if encode.is_some() && track.is_some() {
        return Err(UsageError::TrackWhenEncoding);
    }
    if encode.is_some() && decode.is_some() {
        return Err(UsageError::BothModes);
    }

    let output = output.ok_or(UsageError::MissingOutput);

    match (encode, decode) {
        (Some(input), None) => Ok(Mode::Encode { input, output: output? }),
        (None, Some(input)) => {
            let track = track
                .ok_or(UsageError::MissingTrack)?
                .parse::<Track>()
                .map_err(|err| UsageError::InvalidTrack(err.to_string()))?;

            Ok(Mode::Decode { input, track, output: output? })
        }
        _ => Err(UsageError::NothingToDo),
    }
}

/// A runtime failure, tagged with the step that failed.
struct StepError {
    step: &'static str,
    err: Error,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.step, self.err)
    }
}

trait Step<T> {
    fn step(self, step: &'static str) -> Result<T, StepError>;
}

impl<T, E: Into<Error>> Step<T> for Result<T, E> {
    fn step(self, step: &'static str) -> Result<T, StepError> {
        self.map_err(|err| StepError { step, err: err.into() })
    }
}

fn encode(input: &Path, output: &Path, spec: &AudioSpec) -> Result<(), StepError> {
    info!("opening {}", input.display());
    let file = File::open(input).step("opening the WAVE file")?;

    info!("reading samples");
    let buf = read_pcm(BufReader::new(file), spec).step("reading the WAVE file")?;

    info!("encoding {} samples", buf.samples().len());
    let data = encode_pcm(&buf).step("encoding")?;

    info!("writing {}", output.display());
    let mut file = File::create(output).step("creating the output file")?;
    file.write_all(&data).step("writing the output file")?;
    file.flush().step("writing the output file")?;

    Ok(())
}

fn decode(input: &Path, track: Track, output: &Path, spec: &AudioSpec) -> Result<(), StepError> {
    info!("opening {}", input.display());
    let file = File::open(input).step("opening the PPM file")?;

    info!("decoding {}", track);
    let buf = decode_track(BufReader::new(file), track, spec).step("decoding the track")?;

    info!("writing {}", output.display());
    let file = File::create(output).step("creating the output file")?;
    let mut writer = BufWriter::new(file);
    write_pcm(&mut writer, &buf).step("writing the output file")?;
    writer.flush().step("writing the output file")?;

    Ok(())
}

fn run(mode: &Mode) -> Result<(), StepError> {
    let spec = AudioSpec::PPM;

    match mode {
        Mode::Encode { input, output } => encode(input, output, &spec),
        Mode::Decode { input, track, output } => decode(input, *track, output, &spec),
    }
}

fn main() {
    pretty_env_logger::init();

    let mode = match validate(Args::parse()) {
        Ok(mode) => mode,
        Err(err) => {
            // Usage errors are reported, but are not a failure of the tool.
            println!("error: {}", err);
            if err.show_examples() {
                println!("examples:");
                for example in EXAMPLES {
                    println!("> {}", example);
                }
            }
            std::process::exit(0)
        }
    };

    let code = match run(&mode) {
        Ok(()) => 0,
        Err(err) => {
            error!("{}", err);
            1
        }
    };

    std::process::exit(code)
}
