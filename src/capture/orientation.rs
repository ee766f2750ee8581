use clap::ValueEnum;
use image::{imageops, RgbaImage};

/// Physical orientation reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
    Unknown,
}

/// Orientation of the video stream, relative to a landscape-native sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeRight,
    LandscapeLeft,
}

impl VideoOrientation {
    /// Video orientation for a device orientation.
    ///
    /// Landscape sides are swapped: the device reports rotation of the body,
    /// video reports where the home edge points. Flat or unknown falls back
    /// to portrait.
    pub fn from_device(device: DeviceOrientation) -> Self {
        match device {
            DeviceOrientation::Portrait => VideoOrientation::Portrait,
            DeviceOrientation::PortraitUpsideDown => VideoOrientation::PortraitUpsideDown,
            DeviceOrientation::LandscapeLeft => VideoOrientation::LandscapeRight,
            DeviceOrientation::LandscapeRight => VideoOrientation::LandscapeLeft,
            DeviceOrientation::FaceUp | DeviceOrientation::FaceDown | DeviceOrientation::Unknown => {
                VideoOrientation::Portrait
            }
        }
    }

    /// Clockwise quarter turns from sensor space to upright
    pub fn quarter_turns(self) -> u8 {
        match self {
            VideoOrientation::LandscapeRight => 0,
            VideoOrientation::Portrait => 1,
            VideoOrientation::LandscapeLeft => 2,
            VideoOrientation::PortraitUpsideDown => 3,
        }
    }

    /// Rotate a sensor-space frame upright
    pub fn upright(self, frame: RgbaImage) -> RgbaImage {
        match self.quarter_turns() {
            1 => imageops::rotate90(&frame),
            2 => imageops::rotate180(&frame),
            3 => imageops::rotate270(&frame),
            _ => frame,
        }
    }
}

impl From<DeviceOrientation> for VideoOrientation {
    fn from(device: DeviceOrientation) -> Self {
        Self::from_device(device)
    }
}
