// SRCclock
// Copyright (c) 2026 The SRCclock Contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sample stream adapters. `srcclock-core` decodes and encodes mono `f32` sample streams; it
//! never talks to a sound card or a file directly. A host crate (`srcclock-play`) implements
//! [`SampleSource`]/[`SampleSink`] over whatever backend it has — a raw PCM file, a live capture
//! device, or a test fixture — and hands the implementation to [`crate::decoder::Decoder`] or
//! [`crate::encoder::Player`].

use crate::errors::Result;

/// A mono `f32` sample source at a fixed sample rate.
pub trait SampleSource {
    /// Fills as much of `buf` as samples are available and returns the count filled. A short read
    /// (including `0`) signals end-of-stream; it is not itself an error.
    fn read(&mut self, buf: &mut [f32]) -> Result<usize>;
}

/// A mono `f32` sample sink at a fixed sample rate.
pub trait SampleSink {
    /// Writes `buf` and returns the number of samples actually accepted.
    fn write(&mut self, buf: &[f32]) -> Result<usize>;
}

/// A raw, possibly multi-channel interleaved PCM source, as read directly off a file or device.
/// Backends implement this instead of [`SampleSource`] when their underlying stream may carry more
/// than one channel; [`MonoFold`] adapts it down to the mono contract the decoder expects.
pub trait RawPcmSource {
    /// Number of interleaved channels per frame.
    fn channels(&self) -> u16;
    /// Reads up to `buf.len()` interleaved samples (not frames) and returns the count read.
    fn read_raw(&mut self, buf: &mut [f32]) -> Result<usize>;
}

/// Adapts a [`RawPcmSource`] to [`SampleSource`] by averaging all channels of each frame into one
/// mono sample. A short underlying read zero-pads the remainder of the requested window rather
/// than shrinking it, mirroring the original adapter's frame-based read contract.
pub struct MonoFold<R> {
    inner: R,
    scratch: Vec<f32>,
}

impl<R: RawPcmSource> MonoFold<R> {
    pub fn new(inner: R) -> Self {
        MonoFold { inner, scratch: Vec::new() }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: RawPcmSource> SampleSource for MonoFold<R> {
    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        let channels = self.inner.channels().max(1) as usize;
        if channels == 1 {
            return self.inner.read_raw(buf);
        }

        let wanted = buf.len() * channels;
        self.scratch.resize(wanted, 0.0);
        let got = self.inner.read_raw(&mut self.scratch[..wanted])?;
        let frames = got / channels;

        for (frame, out) in self.scratch[..frames * channels].chunks_exact(channels).zip(buf.iter_mut()) {
            *out = frame.iter().sum::<f32>() / channels as f32;
        }
        for out in &mut buf[frames..] {
            *out = 0.0;
        }

        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStereo(Vec<f32>, usize);

    impl RawPcmSource for FixedStereo {
        fn channels(&self) -> u16 {
            2
        }

        fn read_raw(&mut self, buf: &mut [f32]) -> Result<usize> {
            let n = buf.len().min(self.0.len() - self.1);
            buf[..n].copy_from_slice(&self.0[self.1..self.1 + n]);
            self.1 += n;
            Ok(n)
        }
    }

    #[test]
    fn stereo_frames_are_averaged() {
        let mut src = MonoFold::new(FixedStereo(vec![1.0, -1.0, 0.5, 0.5], 0));
        let mut buf = [0.0f32; 2];
        let got = src.read(&mut buf).unwrap();
        assert_eq!(got, 2);
        assert_eq!(buf, [0.0, 0.5]);
    }

    #[test]
    fn short_read_zero_pads_tail() {
        let mut src = MonoFold::new(FixedStereo(vec![1.0, 1.0], 0));
        let mut buf = [9.0f32; 3];
        let got = src.read(&mut buf).unwrap();
        assert_eq!(got, 1);
        assert_eq!(buf, [1.0, 0.0, 0.0]);
    }
}
