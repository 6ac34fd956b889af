#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use gridtown_core::CellPlacement;
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "city";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "city:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of a generated layout and the grid it was derived from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct CityLayoutSnapshot {
    /// Number of cells along the x axis.
    pub width: u32,
    /// Number of cells along the z axis.
    pub length: u32,
    /// World units between neighbouring cells along the x axis.
    pub spacing_x: f32,
    /// World units between neighbouring cells along the z axis.
    pub spacing_z: f32,
    /// Placements composing the layout captured by the snapshot.
    pub placements: Vec<CellPlacement>,
}

impl CityLayoutSnapshot {
    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableSnapshot {
            spacing_x: self.spacing_x,
            spacing_z: self.spacing_z,
            placements: self.placements.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("layout snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SNAPSHOT_HEADER}:{}x{}:{encoded}", self.width, self.length)
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, CityTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CityTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(CityTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(CityTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(CityTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(CityTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(CityTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(CityTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (width, length) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(CityTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(CityTransferError::InvalidPayload)?;

        Ok(Self {
            width,
            length,
            spacing_x: decoded.spacing_x,
            spacing_z: decoded.spacing_z,
            placements: decoded.placements,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    spacing_x: f32,
    spacing_z: f32,
    placements: Vec<CellPlacement>,
}

/// Errors that can occur while decoding layout transfer strings.
#[derive(Debug)]
pub(crate) enum CityTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for CityTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "layout payload was empty"),
            Self::MissingPrefix => write!(f, "layout string is missing the prefix"),
            Self::MissingVersion => write!(f, "layout string is missing the version"),
            Self::MissingDimensions => write!(f, "layout string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "layout string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "layout prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "layout version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode layout payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse layout payload: {error}")
            }
        }
    }
}

impl Error for CityTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), CityTransferError> {
    let (width, length) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| CityTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| CityTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let length = length
        .trim()
        .parse::<u32>()
        .map_err(|_| CityTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if width == 0 || length == 0 {
        return Err(CityTransferError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((width, length))
}
