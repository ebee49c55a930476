use beep::beep;
use std::error::Error;

#[cfg(feature = "synth")]
use crate::timer::SoundTimer;

/// Makes the machine's single tone. The driver calls `beep` while the sound
/// timer is running and `stop` once it reaches zero.
pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
}

/// the buzzer pitch
pub const TONE_HZ: u16 = 440;

// beep(0) switches the speaker off
const SPEAKER_OFF: u16 = 0;

/// tone through the PC speaker, via the beep crate
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    /// fails if the speaker cannot be driven
    pub fn new() -> Result<Self, Box<dyn Error>> {
        beep(SPEAKER_OFF)?;
        Ok(SimpleBeep { is_beeping: false })
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        if !self.is_beeping {
            beep(TONE_HZ)?;
            self.is_beeping = true;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_beeping {
            beep(SPEAKER_OFF)?;
            self.is_beeping = false;
        }
        Ok(())
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

pub struct Mute {}
impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}
impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}

/// Square wave generator. Phase only advances while the tone is on, so the
/// wave picks up where it left off instead of clicking.
pub struct SquareWave {
    phase: f32,
    step: f32,
    amplitude: f32,
}

impl SquareWave {
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        SquareWave {
            phase: 0.0,
            step: frequency / sample_rate,
            amplitude: 0.3,
        }
    }

    /// next sample in [-amplitude, amplitude]; silence when `active` is false
    pub fn next_sample(&mut self, active: bool) -> f32 {
        if !active {
            return 0.0;
        }
        let sample = if self.phase < 0.5 {
            self.amplitude
        } else {
            -self.amplitude
        };
        self.phase = (self.phase + self.step).fract();
        sample
    }
}

/// Sample-accurate tone on the default output device. The device callback
/// runs on the audio thread and reads the shared sound timer for every
/// sample, so `beep`/`stop` have nothing left to do.
#[cfg(feature = "synth")]
pub struct SynthSound {
    _device: Box<dyn tinyaudio::prelude::BaseAudioOutputDevice>,
}

#[cfg(feature = "synth")]
impl SynthSound {
    pub fn new(timer: SoundTimer) -> Result<Self, Box<dyn Error>> {
        use tinyaudio::prelude::*;

        let params = OutputDeviceParameters {
            channels_count: 1,
            sample_rate: 44100,
            channel_sample_count: 512,
        };
        let channels = params.channels_count;
        let mut wave = SquareWave::new(TONE_HZ as f32, params.sample_rate as f32);
        let device = run_output_device(params, move |data| {
            for samples in data.chunks_mut(channels) {
                let value = wave.next_sample(timer.is_active());
                for sample in samples {
                    *sample = value;
                }
            }
        })?;
        Ok(SynthSound { _device: device })
    }
}

#[cfg(feature = "synth")]
impl Sound for SynthSound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}
