// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Backends implementing `srcclock_core::io::{SampleSource, SampleSink}`: a raw headerless f32
//! PCM file (per §6, "there is no WAV envelope") and a live capture/playback device via `cpal`,
//! bridged through an `rb` ring buffer exactly as `symphonia-play`'s cpal output does.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};
use rb::{Producer, RbConsumer, RbProducer, SpscRb, RB};
use srcclock_core::errors::{io_error, Result};
use srcclock_core::io::{RawPcmSource, SampleSink, SampleSource};
use std::fs::File;
use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

/// Raw headerless `f32` little-endian PCM, read or written straight from/to a file.
pub struct PcmFile {
    file: File,
    channels: u16,
}

impl PcmFile {
    pub fn open_read(path: &std::path::Path, channels: u16) -> Result<Self> {
        let file = File::open(path)?;
        Ok(PcmFile { file, channels })
    }

    pub fn create_write(path: &std::path::Path, channels: u16) -> Result<Self> {
        let file = File::create(path)?;
        Ok(PcmFile { file, channels })
    }
}

impl RawPcmSource for PcmFile {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn read_raw(&mut self, buf: &mut [f32]) -> Result<usize> {
        let mut bytes = vec![0u8; buf.len() * 4];
        let mut filled = 0;
        loop {
            match self.file.read(&mut bytes[filled..]) {
                Ok(0) => break,
                Ok(n) => {
                    filled += n;
                    if filled == bytes.len() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return io_error(e),
            }
        }
        let samples = filled / 4;
        for (i, chunk) in bytes[..samples * 4].chunks_exact(4).enumerate() {
            buf[i] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(samples)
    }
}

impl SampleSink for PcmFile {
    fn write(&mut self, buf: &[f32]) -> Result<usize> {
        let mut bytes = Vec::with_capacity(buf.len() * 4);
        for sample in buf {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        match self.file.write_all(&bytes) {
            Ok(()) => Ok(buf.len()),
            Err(e) => io_error(e),
        }
    }
}

/// A live capture device, bridged to the blocking [`SampleSource`] contract through an
/// `rb::SpscRb` ring buffer fed by `cpal`'s input callback.
pub struct LiveCapture {
    _stream: Stream,
    consumer: rb::Consumer<f32>,
}

impl LiveCapture {
    pub fn open(sample_rate: u32, channels: u16) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no input device"))?;

        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let ring = SpscRb::<f32>::new(sample_rate as usize * channels as usize * 4);
        let producer = ring.producer();
        let consumer = ring.consumer();

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _| {
                    let _ = producer.write(data);
                },
                move |err| log::error!("capture stream error: {}", err),
                None,
            )
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        stream.play().map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        Ok(LiveCapture { _stream: stream, consumer })
    }
}

impl SampleSource for LiveCapture {
    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.consumer.read(&mut buf[filled..]) {
                Ok(n) => filled += n,
                Err(rb::RbError::Empty) => thread::sleep(Duration::from_millis(2)),
            }
        }
        Ok(filled)
    }
}

/// A live playback device, fed from a producer thread via an `rb::SpscRb` ring buffer; `write`
/// blocks until the buffer has room, then hands samples to `cpal`'s output callback.
pub struct LivePlayback {
    _stream: Stream,
    producer: Producer<f32>,
}

impl LivePlayback {
    pub fn open(sample_rate: u32, channels: u16) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no output device"))?;

        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let ring = SpscRb::<f32>::new(sample_rate as usize * channels as usize * 4);
        let producer = ring.producer();
        let consumer = ring.consumer();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    let got = consumer.read(data).unwrap_or(0);
                    for sample in &mut data[got..] {
                        *sample = 0.0;
                    }
                },
                move |err| log::error!("playback stream error: {}", err),
                None,
            )
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        stream.play().map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        Ok(LivePlayback { _stream: stream, producer })
    }
}

impl SampleSink for LivePlayback {
    fn write(&mut self, buf: &[f32]) -> Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            match self.producer.write(&buf[written..]) {
                Ok(n) if n > 0 => written += n,
                _ => thread::sleep(Duration::from_millis(2)),
            }
        }
        Ok(written)
    }
}
