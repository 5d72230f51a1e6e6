//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `emotion-dj` binary.
//!
//! ## Commands
//!
//! - `run`: Watch the camera (or replayed frames) and play matching music
//! - `catalog`: Validate the songs directory and list tracks per emotion
//! - `play`: Loop a random track for one emotion
//! - `history`: Summarize the emotion log
//! - `completion`: Generate shell completions
//!
//! ## Examples
//!
//! ```bash
//! emotion-dj run --camera 0 --classifier python3 classify_face.py
//! emotion-dj run --frames ./captures --headless --max-frames 50
//! emotion-dj catalog --songs ~/Music/moods
//! emotion-dj history
//! ```

use crate::emotion::{parse_override, Emotion};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "emotion-dj")]
#[command(about = "Emotion DJ: plays music matching the mood on your face")]
#[command(version)]
pub struct Args {
    /// Config file to use instead of the platform default
    #[arg(long, global = true, env = "EMOTION_DJ_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Songs directory option shared by several commands.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SongsArgs {
    /// Songs directory with happy/, sad/, angry/ and neutral/ sub-directories
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub songs: Option<PathBuf>,

    /// Audio extension to index (repeatable, default: mp3)
    #[arg(long = "ext")]
    pub extensions: Vec<String>,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Watch a video feed and play music that matches the detected emotion
    ///
    /// Every frame is classified, the music switches whenever the emotion
    /// changes, and every decision is appended to the emotion log.
    Run(RunArgs),

    /// Validate the songs directory and list the tracks of every emotion
    ///
    /// Fails if any emotion directory is missing or holds no audio files.
    Catalog {
        #[command(flatten)]
        songs: SongsArgs,
    },

    /// Loop a random track for one emotion
    Play {
        /// Emotion to play
        #[arg(value_parser = parse_emotion)]
        emotion: Emotion,

        #[command(flatten)]
        songs: SongsArgs,

        /// Stop after this many seconds
        #[arg(long, default_value = "30")]
        seconds: u64,
    },

    /// Summarize the emotion log
    History {
        /// Emotion log to read
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        log: Option<PathBuf>,
    },

    /// Generate shell completions
    ///
    /// Usage: emotion-dj completion bash > ~/.local/share/bash-completion/completions/emotion-dj
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Options of the `run` command.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub songs: SongsArgs,

    /// Emotion log (CSV) to append to
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub log: Option<PathBuf>,

    /// Force an emotion instead of the classifier result (none, happy, sad, angry, neutral)
    #[arg(long = "override", value_parser = parse_override_arg)]
    pub override_emotion: Option<OverrideArg>,

    /// Replay PNG/JPEG frames from a directory instead of using a camera
    #[arg(long, value_hint = clap::ValueHint::DirPath, conflicts_with = "camera")]
    pub frames: Option<PathBuf>,

    /// Camera index to capture from
    #[arg(long)]
    pub camera: Option<u32>,

    /// Classifier program and arguments, ended by ';' when more options follow
    ///
    /// The frame path is appended to the command. Every word up to a ';'
    /// belongs to the classifier, flags included:
    /// `--classifier python3 classify.py --fast ';' --headless`
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_terminator = ";")]
    pub classifier: Option<Vec<String>>,

    /// Process frames without opening a window
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many frames
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Decide and log, but do not output sound
    #[arg(long)]
    pub mute: bool,
}

/// Parsed `--override` value; `none` holds `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideArg(pub Option<Emotion>);

fn parse_emotion(value: &str) -> Result<Emotion, String> {
    value.parse().map_err(|e: crate::emotion::UnknownEmotion| e.to_string())
}

fn parse_override_arg(value: &str) -> Result<OverrideArg, String> {
    parse_override(value).map(OverrideArg).map_err(|e| e.to_string())
}
