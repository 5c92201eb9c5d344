use std::time::Duration;

use crate::{Clip, PlaybackError};

/// Extra time the device gets after the clip's nominal length.
#[cfg(any(feature = "speaker", test))]
const DRAIN_MARGIN: Duration = Duration::from_millis(100);

/// How long to keep the stream alive once the last sample is queued, so the
/// device buffer plays out before the stream is dropped.
#[cfg(any(feature = "speaker", test))]
fn drain_time(clip_duration: Duration, elapsed: Duration) -> Duration {
    clip_duration.saturating_sub(elapsed) + DRAIN_MARGIN
}

#[cfg(not(feature = "speaker"))]
pub(crate) fn play(_clip: Clip, _timeout: Duration) -> Result<(), PlaybackError> {
    Err(PlaybackError::NoOutput)
}

/// Plays `clip` on the default output device and blocks until it has played
/// out or `timeout` elapses.
#[cfg(feature = "speaker")]
pub(crate) fn play(clip: Clip, timeout: Duration) -> Result<(), PlaybackError> {
    use cpal::traits::{DeviceTrait, HostTrait};
    use cpal::SampleFormat;

    let device = cpal::default_host()
        .default_output_device()
        .ok_or_else(|| PlaybackError::Output("no output device".to_owned()))?;
    let format = device
        .default_output_config()
        .map_err(|e| PlaybackError::Output(e.to_string()))?
        .sample_format();
    let config = cpal::StreamConfig {
        channels: clip.channels,
        sample_rate: cpal::SampleRate(clip.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };
    match format {
        SampleFormat::F32 => stream_clip::<f32>(&device, &config, clip, timeout),
        SampleFormat::I16 => stream_clip::<i16>(&device, &config, clip, timeout),
        SampleFormat::U16 => stream_clip::<u16>(&device, &config, clip, timeout),
        other => Err(PlaybackError::Output(format!(
            "unsupported sample format {other:?}"
        ))),
    }
}

#[cfg(feature = "speaker")]
fn stream_clip<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    clip: Clip,
    timeout: Duration,
) -> Result<(), PlaybackError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    use std::sync::mpsc;
    use std::time::Instant;

    use cpal::traits::{DeviceTrait, StreamTrait};
    use cpal::Sample;

    let (done_tx, done_rx) = mpsc::sync_channel::<()>(1);
    let clip_duration = clip.duration();
    let samples = clip.samples;
    let mut position = 0;
    let mut signalled = false;
    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for slot in data.iter_mut() {
                    let sample = samples.get(position).copied().unwrap_or(0.0);
                    *slot = T::from_sample(sample);
                    position += 1;
                }
                if position >= samples.len() && !signalled {
                    signalled = true;
                    let _ = done_tx.try_send(());
                }
            },
            |error| tracing::warn!(%error, "audio output stream error"),
            None,
        )
        .map_err(|e| PlaybackError::Output(e.to_string()))?;
    stream
        .play()
        .map_err(|e| PlaybackError::Output(e.to_string()))?;
    let started = Instant::now();

    match done_rx.recv_timeout(timeout) {
        Ok(()) => {
            let drain = drain_time(clip_duration, started.elapsed());
            std::thread::sleep(drain.min(timeout.saturating_sub(started.elapsed())));
            drop(stream);
            Ok(())
        }
        Err(mpsc::RecvTimeoutError::Timeout) => Err(PlaybackError::Timeout(timeout)),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(PlaybackError::Output("output stream closed early".to_owned()))
        }
    }
}
