use super::buffer::{Channel, PixelBuffer, CHANNEL_COUNT};
use crate::errors::{HistogramError, Result};
use std::iter::{Copied, StepBy};
use std::slice::Iter;

/// Row-major intensities of one channel.
#[derive(Debug, Clone)]
pub struct ChannelSamples<'a> {
    inner: Copied<StepBy<Iter<'a, u8>>>,
}

impl Iterator for ChannelSamples<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ChannelSamples<'_> {}

fn check_dimensions(buffer: &PixelBuffer) -> Result<()> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(HistogramError::invalid_image(format!(
            "image has zero dimension ({}x{})",
            buffer.width(),
            buffer.height()
        )));
    }
    if buffer.is_empty() {
        return Err(HistogramError::invalid_image("image has no pixel data"));
    }
    Ok(())
}

pub fn sample(buffer: &PixelBuffer, channel: Channel) -> Result<ChannelSamples<'_>> {
    check_dimensions(buffer)?;
    Ok(channel_samples(buffer.as_raw(), channel))
}

pub fn sample_all(buffer: &PixelBuffer) -> Result<[ChannelSamples<'_>; CHANNEL_COUNT]> {
    check_dimensions(buffer)?;
    Ok(Channel::ALL.map(|channel| channel_samples(buffer.as_raw(), channel)))
}

/// Samples a packed RGB slice. Used by the tile builder on sub-ranges of a buffer.
pub(crate) fn channel_samples(data: &[u8], channel: Channel) -> ChannelSamples<'_> {
    let start = channel.index().min(data.len());
    ChannelSamples {
        inner: data[start..].iter().step_by(CHANNEL_COUNT).copied(),
    }
}
