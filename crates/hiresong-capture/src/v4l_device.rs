//! Video4Linux webcam backend.

use image::ImageFormat;
use tracing::{debug, info};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use crate::{CaptureDevice, CaptureError, Resolution, VideoFrame};

/// Frames discarded after stream start; many UVC cameras deliver dark or
/// truncated first frames while auto-exposure settles.
const WARMUP_FRAMES: usize = 3;

const STREAM_BUFFERS: u32 = 4;

/// Webcam accessed through `/dev/videoN` with MJPEG frames.
pub struct V4lCaptureDevice {
    index: usize,
    device: Option<Device>,
}

impl V4lCaptureDevice {
    /// Creates a backend for `/dev/video{index}`. Nothing is opened yet.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            device: None,
        }
    }
}

impl CaptureDevice for V4lCaptureDevice {
    fn open(&mut self, resolution: Resolution) -> Result<(), CaptureError> {
        let device = Device::new(self.index).map_err(|error| match error.kind() {
            std::io::ErrorKind::PermissionDenied => CaptureError::PermissionDenied,
            _ => CaptureError::Device(format!("open /dev/video{}: {error}", self.index)),
        })?;

        let mut format = device
            .format()
            .map_err(|error| CaptureError::Device(format!("query format: {error}")))?;
        format.width = resolution.width;
        format.height = resolution.height;
        format.fourcc = FourCC::new(b"MJPG");
        let applied = device
            .set_format(&format)
            .map_err(|error| CaptureError::Device(format!("set format: {error}")))?;

        if applied.fourcc != FourCC::new(b"MJPG") {
            return Err(CaptureError::Device(format!(
                "camera does not offer MJPG (got {})",
                applied.fourcc
            )));
        }

        info!(
            index = self.index,
            width = applied.width,
            height = applied.height,
            "v4l camera opened"
        );
        self.device = Some(device);
        Ok(())
    }

    fn grab_frame(&mut self) -> Result<VideoFrame, CaptureError> {
        let device = self.device.as_ref().ok_or(CaptureError::NotOpen)?;
        let mut stream = Stream::with_buffers(device, Type::VideoCapture, STREAM_BUFFERS)
            .map_err(|error| CaptureError::Device(format!("start stream: {error}")))?;

        let mut jpeg = Vec::new();
        for _ in 0..=WARMUP_FRAMES {
            let (buffer, meta) = stream
                .next()
                .map_err(|error| CaptureError::Device(format!("read frame: {error}")))?;
            let used = (meta.bytesused as usize).min(buffer.len());
            jpeg.clear();
            jpeg.extend_from_slice(&buffer[..used]);
        }
        drop(stream);

        let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)
            .map_err(|error| CaptureError::Device(format!("decode MJPG frame: {error}")))?
            .to_rgb8();
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            "v4l frame decoded"
        );

        let (width, height) = decoded.dimensions();
        VideoFrame::new(width, height, decoded.into_raw())
    }

    fn stop_all_tracks(&mut self) {
        if self.device.take().is_some() {
            debug!(index = self.index, "v4l camera closed");
        }
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.device.is_some())
    }
}
