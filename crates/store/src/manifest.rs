use serde::{Deserialize, Serialize};

use crate::identity::ExtensionIdentity;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionManifest {
    pub publisher: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExtensionManifest {
    pub fn new(
        publisher: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            publisher: publisher.into(),
            name: name.into(),
            version: version.into(),
            display_name: None,
            description: None,
        }
    }

    pub fn identity(&self) -> ExtensionIdentity {
        ExtensionIdentity::new(&self.publisher, &self.name)
    }
}

// Re-export checksum types for convenience
pub use checksum::{Checksum, ChecksumAlgorithm};

pub mod checksum {
    use std::{fmt::Display, str::FromStr};

    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Checksum {
        pub algorithm: ChecksumAlgorithm,
        pub value: String,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ChecksumAlgorithm {
        Sha256,
        Blake3,
    }

    impl Checksum {
        /// Verify the checksum against the provided data
        pub fn verify(&self, data: &[u8]) -> bool {
            self.algorithm.calculate(data) == self.value
        }

        pub fn from_data(algorithm: ChecksumAlgorithm, data: &[u8]) -> Self {
            Self {
                value: algorithm.calculate(data),
                algorithm,
            }
        }
    }

    impl ChecksumAlgorithm {
        pub fn calculate(&self, data: &[u8]) -> String {
            use sha2::{Digest, Sha256};

            match self {
                ChecksumAlgorithm::Sha256 => format!("{:x}", Sha256::digest(data)),
                ChecksumAlgorithm::Blake3 => blake3::hash(data).to_hex().to_string(),
            }
        }

        pub fn preferred() -> Self {
            ChecksumAlgorithm::Blake3
        }
    }

    impl Display for Checksum {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}:{}", self.algorithm, self.value)
        }
    }

    impl FromStr for ChecksumAlgorithm {
        type Err = &'static str;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_lowercase().as_str() {
                "sha256" => Ok(ChecksumAlgorithm::Sha256),
                "blake3" => Ok(ChecksumAlgorithm::Blake3),
                _ => Err("Unsupported checksum algorithm"),
            }
        }
    }

    impl Display for ChecksumAlgorithm {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                ChecksumAlgorithm::Sha256 => write!(f, "sha256"),
                ChecksumAlgorithm::Blake3 => write!(f, "blake3"),
            }
        }
    }

    impl<'de> Deserialize<'de> for Checksum {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let string = String::deserialize(deserializer)?;
            if let Some((algorithm, checksum)) = string.split_once(':') {
                Ok(Checksum {
                    algorithm: algorithm.parse().map_err(serde::de::Error::custom)?,
                    value: checksum.to_string(),
                })
            } else {
                Err(serde::de::Error::custom(
                    "Invalid checksum format, expected 'algorithm:checksum'",
                ))
            }
        }
    }

    impl Serialize for Checksum {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(&self.to_string())
        }
    }
}
