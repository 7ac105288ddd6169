//! Audible confirmation.
//!
//! With the `audio` feature a short tone is played through the default cpal
//! output device. Without it the terminal bell is rung instead.

use super::ScanSink;
use crate::error::Result;
use crate::models::ScanEvent;
use tracing::debug;

/// Tone frequency in Hz
#[cfg_attr(not(feature = "audio"), allow(dead_code))]
const BEEP_HZ: f32 = 2_700.0;
/// Tone length in milliseconds
#[cfg_attr(not(feature = "audio"), allow(dead_code))]
const BEEP_MS: u64 = 120;

/// Plays a notification sound once per confirmed event
pub struct BeepSink {
    muted: bool,
    player: player::Player,
}

impl BeepSink {
    /// Open the audio output. A muted sink never touches the device.
    pub fn new(muted: bool) -> Result<Self> {
        let player = if muted {
            player::Player::silent()
        } else {
            player::Player::open()?
        };
        Ok(Self { muted, player })
    }

    /// True when beeps are suppressed
    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl ScanSink for BeepSink {
    fn on_confirmed(&mut self, event: &ScanEvent) -> Result<()> {
        if self.muted {
            return Ok(());
        }
        debug!(sequence = event.sequence, "beep");
        self.player.beep()
    }
}

#[cfg(feature = "audio")]
mod player {
    use super::{BEEP_HZ, BEEP_MS};
    use crate::error::{Error, Result};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tracing::{error, info};

    pub(super) struct Player {
        remaining: Arc<AtomicU64>,
        beep_frames: u64,
        // Keeps the output stream alive
        _stream: Option<cpal::Stream>,
    }

    impl Player {
        pub(super) fn silent() -> Self {
            Self {
                remaining: Arc::new(AtomicU64::new(0)),
                beep_frames: 0,
                _stream: None,
            }
        }

        pub(super) fn open() -> Result<Self> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| Error::Audio("no audio output device available".to_string()))?;
            let supported = device
                .default_output_config()
                .map_err(|e| Error::Audio(e.to_string()))?;
            if supported.sample_format() != cpal::SampleFormat::F32 {
                return Err(Error::Audio(format!(
                    "unsupported sample format {:?}",
                    supported.sample_format()
                )));
            }
            let config: cpal::StreamConfig = supported.into();
            let sample_rate = config.sample_rate.0 as f32;
            let channels = usize::from(config.channels.max(1));
            info!(sample_rate, channels, "audio output ready");

            let remaining = Arc::new(AtomicU64::new(0));
            let remaining_cb = Arc::clone(&remaining);
            let step = BEEP_HZ * std::f32::consts::TAU / sample_rate;
            let mut phase = 0.0f32;
            let stream = device
                .build_output_stream(
                    &config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        for frame in data.chunks_mut(channels) {
                            let left = remaining_cb.load(Ordering::Relaxed);
                            let value = if left > 0 {
                                remaining_cb.store(left - 1, Ordering::Relaxed);
                                phase = (phase + step) % std::f32::consts::TAU;
                                phase.sin() * 0.3
                            } else {
                                0.0
                            };
                            for sample in frame.iter_mut() {
                                *sample = value;
                            }
                        }
                    },
                    |err| error!("audio stream error: {}", err),
                    None,
                )
                .map_err(|e| Error::Audio(e.to_string()))?;
            stream.play().map_err(|e| Error::Audio(e.to_string()))?;

            Ok(Self {
                remaining,
                beep_frames: (sample_rate as u64) * BEEP_MS / 1000,
                _stream: Some(stream),
            })
        }

        pub(super) fn beep(&mut self) -> Result<()> {
            self.remaining.store(self.beep_frames, Ordering::Relaxed);
            Ok(())
        }
    }
}

#[cfg(not(feature = "audio"))]
mod player {
    use crate::error::Result;
    use std::io::{self, Write};

    pub(super) struct Player {
        enabled: bool,
    }

    impl Player {
        pub(super) fn silent() -> Self {
            Self { enabled: false }
        }

        pub(super) fn open() -> Result<Self> {
            Ok(Self { enabled: true })
        }

        pub(super) fn beep(&mut self) -> Result<()> {
            if self.enabled {
                let mut err = io::stderr();
                err.write_all(b"\x07")?;
                err.flush()?;
            }
            Ok(())
        }
    }
}
