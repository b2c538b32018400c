use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Where the active image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Upload,
    Camera,
}

impl ImageSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upload => "Uploaded Image",
            Self::Camera => "Captured Image",
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("upload"),
            Self::Camera => f.write_str("camera"),
        }
    }
}

impl FromStr for ImageSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upload" => Ok(Self::Upload),
            "camera" => Ok(Self::Camera),
            other => Err(format!("Unknown image source '{}' (expected upload or camera)", other)),
        }
    }
}

/// Identity of one supplied image: its source plus a fingerprint of the raw bytes.
///
/// Two submissions are the same image only if both parts match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId {
    pub source: ImageSource,
    pub fingerprint: String,
}

impl ImageId {
    pub fn from_bytes(source: ImageSource, bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);

        Self {
            source,
            fingerprint: format!("{:016x}", hasher.finish()),
        }
    }
}
