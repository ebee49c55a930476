use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// Which sound backend plays the buzzer.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioBackend {
    /// PC speaker tone
    Beep,
    /// no sound at all
    Mute,
    /// square wave on the default audio output
    #[cfg(feature = "synth")]
    Synth,
}

#[derive(Parser, Debug)]
#[command(name = "chip8-vm", version, about = "Runs CHIP-8 programs in a terminal")]
pub struct Cli {
    /// CHIP-8 program image, loaded at 0x200
    #[arg(value_name = "ROM")]
    pub rom: PathBuf,

    /// instructions executed per second
    #[arg(long, default_value_t = 700, value_parser = clap::value_parser!(u32).range(1..))]
    pub hz: u32,

    /// terminal cells per CHIP-8 pixel along each axis
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=8))]
    pub scale: u16,

    #[arg(long, value_enum, default_value_t = AudioBackend::Beep)]
    pub audio: AudioBackend,

    /// where diagnostics go; the terminal itself is busy drawing
    #[arg(long, value_name = "PATH", default_value = "chip8-vm.log")]
    pub log: PathBuf,

    #[arg(long, default_value_t = LevelFilter::Warn)]
    pub log_level: LevelFilter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["chip8-vm", "pong.ch8"]).unwrap();
        assert_eq!(cli.rom, PathBuf::from("pong.ch8"));
        assert_eq!(cli.hz, 700);
        assert_eq!(cli.scale, 1);
        assert_eq!(cli.audio, AudioBackend::Beep);
        assert_eq!(cli.log, PathBuf::from("chip8-vm.log"));
        assert_eq!(cli.log_level, LevelFilter::Warn);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "chip8-vm",
            "--hz",
            "1200",
            "--scale",
            "2",
            "--audio",
            "mute",
            "--log-level",
            "trace",
            "ibm.ch8",
        ])
        .unwrap();
        assert_eq!(cli.hz, 1200);
        assert_eq!(cli.scale, 2);
        assert_eq!(cli.audio, AudioBackend::Mute);
        assert_eq!(cli.log_level, LevelFilter::Trace);
    }

    #[test]
    fn test_rom_is_required() {
        let err = Cli::try_parse_from(["chip8-vm"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_extra_arguments_rejected() {
        assert!(Cli::try_parse_from(["chip8-vm", "a.ch8", "b.ch8"]).is_err());
    }

    #[test]
    fn test_zero_hz_rejected() {
        assert!(Cli::try_parse_from(["chip8-vm", "--hz", "0", "a.ch8"]).is_err());
    }
}
