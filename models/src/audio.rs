use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDevice {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDevices {
    #[serde(default)]
    pub input: Vec<AudioDevice>,
    #[serde(default)]
    pub output: Vec<AudioDevice>,
}

/// Selected sound devices; `None` means the backend default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSettings {
    #[serde(default)]
    pub input_device: Option<i64>,
    #[serde(default)]
    pub output_device: Option<i64>,
}
