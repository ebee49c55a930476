use clap::Parser;
use log::{error, info};
use std::fs::File;
use std::process::ExitCode;
use std::time::Instant;

use chip8_vm::config::{AudioBackend, Cli};
use chip8_vm::environment::Environment;
use chip8_vm::input::TermInput;
use chip8_vm::render::MonoTermRenderer;
use chip8_vm::sound::{Mute, SimpleBeep, Sound};
use chip8_vm::{logger, AppError, Chip8Interpreter, VmError};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    logger::init(&cli.log, cli.log_level)?;

    // load a program before touching the terminal, so a bad ROM fails cleanly
    let mut interpreter = Chip8Interpreter::new();
    let mut f = File::open(&cli.rom).map_err(VmError::from)?;
    let size = interpreter.load_program(&mut f)?;
    info!("loaded {} ({} bytes)", cli.rom.display(), size);

    let mut sound = open_sound(cli.audio, &interpreter)?;
    let mut input = TermInput::new()?;
    let mut renderer = MonoTermRenderer::new(cli.scale as usize)?;

    let mut env = Environment::new(
        interpreter,
        &mut renderer,
        &mut input,
        sound.as_mut(),
        cli.hz,
        Instant::now(),
    );
    env.run()
}

fn open_sound(
    backend: AudioBackend,
    #[allow(unused_variables)] interpreter: &Chip8Interpreter,
) -> Result<Box<dyn Sound>, AppError> {
    let audio = |e: Box<dyn std::error::Error>| AppError::Audio(e.to_string());
    Ok(match backend {
        AudioBackend::Beep => Box::new(SimpleBeep::new().map_err(audio)?),
        AudioBackend::Mute => Box::new(Mute::new()),
        #[cfg(feature = "synth")]
        AudioBackend::Synth => Box::new(
            chip8_vm::sound::SynthSound::new(interpreter.sound_handle()).map_err(audio)?,
        ),
    })
}
