use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Barcode symbology reported by the decoder
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbology {
    /// EAN-13
    Ean13,
    /// EAN-8
    Ean8,
    /// EAN-5 add-on
    Ean5,
    /// EAN-2 add-on
    Ean2,
    /// UPC-A
    UpcA,
    /// UPC-E
    UpcE,
    /// ISBN-10
    Isbn10,
    /// ISBN-13
    Isbn13,
    /// Interleaved 2 of 5
    I25,
    /// Codabar
    Codabar,
    /// Code 39
    Code39,
    /// Code 93
    Code93,
    /// Code 128
    Code128,
    /// GS1 DataBar
    DataBar,
    /// GS1 DataBar Expanded
    DataBarExpanded,
    /// PDF417
    Pdf417,
    /// QR Code
    QrCode,
    /// Any tag not listed above, kept verbatim
    Other(String),
}

impl Symbology {
    /// Canonical tag name as written in logs
    pub fn as_str(&self) -> &str {
        match self {
            Symbology::Ean13 => "EAN13",
            Symbology::Ean8 => "EAN8",
            Symbology::Ean5 => "EAN5",
            Symbology::Ean2 => "EAN2",
            Symbology::UpcA => "UPCA",
            Symbology::UpcE => "UPCE",
            Symbology::Isbn10 => "ISBN10",
            Symbology::Isbn13 => "ISBN13",
            Symbology::I25 => "I25",
            Symbology::Codabar => "CODABAR",
            Symbology::Code39 => "CODE39",
            Symbology::Code93 => "CODE93",
            Symbology::Code128 => "CODE128",
            Symbology::DataBar => "DATABAR",
            Symbology::DataBarExpanded => "DATABAR_EXP",
            Symbology::Pdf417 => "PDF417",
            Symbology::QrCode => "QRCODE",
            Symbology::Other(tag) => tag,
        }
    }

    /// Parse a tag name; unknown tags become [`Symbology::Other`]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "EAN13" => Symbology::Ean13,
            "EAN8" => Symbology::Ean8,
            "EAN5" => Symbology::Ean5,
            "EAN2" => Symbology::Ean2,
            "UPCA" => Symbology::UpcA,
            "UPCE" => Symbology::UpcE,
            "ISBN10" => Symbology::Isbn10,
            "ISBN13" => Symbology::Isbn13,
            "I25" => Symbology::I25,
            "CODABAR" => Symbology::Codabar,
            "CODE39" => Symbology::Code39,
            "CODE93" => Symbology::Code93,
            "CODE128" => Symbology::Code128,
            "DATABAR" => Symbology::DataBar,
            "DATABAR_EXP" => Symbology::DataBarExpanded,
            "PDF417" => Symbology::Pdf417,
            "QRCODE" => Symbology::QrCode,
            _ => Symbology::Other(tag.trim().to_string()),
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbology {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Symbology::from_tag(s))
    }
}

impl Serialize for Symbology {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Symbology {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Symbology::from_tag(&tag))
    }
}

/// A decoded value proposed for one frame.
///
/// Equality covers both fields: the same payload under two symbologies is
/// two different candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Decoded payload text
    #[serde(rename = "data")]
    pub payload: String,
    /// Symbology tag
    #[serde(rename = "type")]
    pub symbology: Symbology,
}

impl Candidate {
    /// Create a candidate from a payload string and symbology
    pub fn new(payload: impl Into<String>, symbology: Symbology) -> Self {
        Self {
            payload: payload.into(),
            symbology,
        }
    }

    /// Create a candidate from raw decoder bytes (UTF-8, lossy)
    pub fn from_bytes(bytes: &[u8], symbology: Symbology) -> Self {
        Self::new(String::from_utf8_lossy(bytes).into_owned(), symbology)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.payload, self.symbology)
    }
}
