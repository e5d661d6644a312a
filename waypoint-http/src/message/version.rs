use std::fmt;
use std::str::FromStr;

use http::Version;
use serde::{Deserialize, Serialize};

use crate::error::MessageError;

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[serde(rename = "1.0")]
    Http10,
    #[serde(rename = "1.1")]
    Http11,
    #[serde(rename = "2")]
    Http2,
    #[serde(rename = "3")]
    Http3,
}

impl ProtocolVersion {
    /// 所有支持的版本字符串
    pub const SUPPORTED: [&'static str; 4] = ["1.0", "1.1", "2", "3"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::Http10 => "1.0",
            ProtocolVersion::Http11 => "1.1",
            ProtocolVersion::Http2 => "2",
            ProtocolVersion::Http3 => "3",
        }
    }
}

impl FromStr for ProtocolVersion {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" => Ok(ProtocolVersion::Http10),
            "1.1" => Ok(ProtocolVersion::Http11),
            "2" => Ok(ProtocolVersion::Http2),
            "3" => Ok(ProtocolVersion::Http3),
            other => Err(MessageError::UnknownProtocolVersion {
                version: other.to_string(),
                supported: Self::SUPPORTED.join(", "),
            }),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ProtocolVersion> for Version {
    fn from(version: ProtocolVersion) -> Self {
        match version {
            ProtocolVersion::Http10 => Version::HTTP_10,
            ProtocolVersion::Http11 => Version::HTTP_11,
            ProtocolVersion::Http2 => Version::HTTP_2,
            ProtocolVersion::Http3 => Version::HTTP_3,
        }
    }
}

impl TryFrom<Version> for ProtocolVersion {
    type Error = MessageError;

    fn try_from(version: Version) -> Result<Self, Self::Error> {
        if version == Version::HTTP_10 {
            Ok(ProtocolVersion::Http10)
        } else if version == Version::HTTP_11 {
            Ok(ProtocolVersion::Http11)
        } else if version == Version::HTTP_2 {
            Ok(ProtocolVersion::Http2)
        } else if version == Version::HTTP_3 {
            Ok(ProtocolVersion::Http3)
        } else {
            Err(MessageError::UnknownProtocolVersion {
                version: format!("{:?}", version),
                supported: Self::SUPPORTED.join(", "),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_versions() {
        for text in ProtocolVersion::SUPPORTED {
            let version: ProtocolVersion = text.parse().unwrap();
            assert_eq!(version.as_str(), text);
        }
    }

    #[test]
    fn test_unknown_version_lists_supported_values() {
        let err = "1.2".parse::<ProtocolVersion>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown HTTP version \"1.2\". Supported values: 1.0, 1.1, 2, 3."
        );
    }

    #[test]
    fn test_http_version_conversion() {
        assert_eq!(Version::from(ProtocolVersion::Http2), Version::HTTP_2);
        assert_eq!(
            ProtocolVersion::try_from(Version::HTTP_11).unwrap(),
            ProtocolVersion::Http11
        );
        assert!(ProtocolVersion::try_from(Version::HTTP_09).is_err());
    }

    #[test]
    fn test_serde_uses_version_strings() {
        let json = serde_json::to_string(&ProtocolVersion::Http11).unwrap();
        assert_eq!(json, "\"1.1\"");
        let back: ProtocolVersion = serde_json::from_str("\"3\"").unwrap();
        assert_eq!(back, ProtocolVersion::Http3);
    }
}
