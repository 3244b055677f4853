use crate::asn1_error;
use crate::ber::{BerDecodable, BerImplicitlyTaggable};
use crate::der::{DerDecodable, DerEncodable, DerImplicitlyTaggable};
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::Node;
use crate::serializer::Serializer;
use crate::values::primitive_content;
use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Utc};

/// GeneralizedTime in the DER-required `YYYYMMDDHHMMSSZ` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneralizedTime(pub DateTime<Utc>);

/// UTCTime in the DER-required `YYMMDDHHMMSSZ` form, with the ASN.1
/// fifty-year window (00-49 means 20xx, 50-99 means 19xx).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UtcTime(pub DateTime<Utc>);

impl From<DateTime<Utc>> for GeneralizedTime {
    fn from(value: DateTime<Utc>) -> Self {
        GeneralizedTime(value)
    }
}

impl From<DateTime<Utc>> for UtcTime {
    fn from(value: DateTime<Utc>) -> Self {
        UtcTime(value)
    }
}

fn decode_timestamp(bytes: &[u8], format: &str, what: &str) -> Result<DateTime<Utc>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| asn1_error!(ErrorKind::InvalidASN1Object, "{} is not valid UTF-8", what))?;
    if !text.ends_with('Z') {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "{} must end with Z in DER",
            what
        ));
    }
    let naive = NaiveDateTime::parse_from_str(text, format).map_err(|_| {
        asn1_error!(ErrorKind::InvalidASN1Object, "{} is malformed: {:?}", what, text)
    })?;
    Ok(Utc.from_utc_datetime(&naive))
}

impl DerDecodable for GeneralizedTime {
    fn from_der_node(node: Node) -> Result<Self> {
        Self::from_der_node_with_identifier(node, Self::default_identifier())
    }
}

impl DerEncodable for GeneralizedTime {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        self.encode_with_identifier(out, Self::default_identifier())
    }
}

impl DerImplicitlyTaggable for GeneralizedTime {
    fn default_identifier() -> Identifier {
        Identifier::GENERALIZED_TIME
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        let bytes = primitive_content(node, identifier)?;
        decode_timestamp(&bytes, "%Y%m%d%H%M%SZ", "GeneralizedTime").map(GeneralizedTime)
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        let text = self.0.format("%Y%m%d%H%M%SZ").to_string();
        out.append_primitive(identifier, |buf| {
            buf.extend_from_slice(text.as_bytes());
            Ok(())
        })
    }
}

impl BerDecodable for GeneralizedTime {}
impl BerImplicitlyTaggable for GeneralizedTime {}

impl DerDecodable for UtcTime {
    fn from_der_node(node: Node) -> Result<Self> {
        Self::from_der_node_with_identifier(node, Self::default_identifier())
    }
}

impl DerEncodable for UtcTime {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        self.encode_with_identifier(out, Self::default_identifier())
    }
}

impl DerImplicitlyTaggable for UtcTime {
    fn default_identifier() -> Identifier {
        Identifier::UTC_TIME
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        let bytes = primitive_content(node, identifier)?;
        let parsed = decode_timestamp(&bytes, "%y%m%d%H%M%SZ", "UTCTime")?;

        // chrono's %y windows at 69; ASN.1 windows at 50. Reapply the year
        // from the first two digits.
        let window_year: i32 = std::str::from_utf8(&bytes[..2])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| {
                asn1_error!(ErrorKind::InvalidASN1Object, "UTCTime year digits are malformed")
            })?;
        let century = if window_year >= 50 { 1900 } else { 2000 };
        let corrected = parsed
            .with_year(century + window_year)
            .ok_or_else(|| asn1_error!(ErrorKind::InvalidASN1Object, "UTCTime year is invalid"))?;
        Ok(UtcTime(corrected))
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        let text = self.0.format("%y%m%d%H%M%SZ").to_string();
        out.append_primitive(identifier, |buf| {
            buf.extend_from_slice(text.as_bytes());
            Ok(())
        })
    }
}

impl BerDecodable for UtcTime {}
impl BerImplicitlyTaggable for UtcTime {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generalized_time_round_trips() {
        let instant = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap();
        let mut out = Serializer::new();
        GeneralizedTime(instant).encode(&mut out).unwrap();
        let bytes = out.serialized_bytes();
        assert_eq!(bytes.as_ref(), b"\x18\x0F20230101120000Z");

        let value = GeneralizedTime::from_der_bytes(&bytes).unwrap();
        assert_eq!(value.0, instant);
    }

    #[test]
    fn utc_time_round_trips_with_the_fifty_year_window() {
        let recent = Utc.with_ymd_and_hms(2023, 6, 15, 8, 30, 0).unwrap();
        let mut out = Serializer::new();
        UtcTime(recent).encode(&mut out).unwrap();
        let value = UtcTime::from_der_bytes(&out.serialized_bytes()).unwrap();
        assert_eq!(value.0, recent);

        // 97 falls on the 19xx side of the window
        let value = UtcTime::from_der_bytes(b"\x17\x0D970615083000Z").unwrap();
        assert_eq!(value.0, Utc.with_ymd_and_hms(1997, 6, 15, 8, 30, 0).unwrap());

        // 49 is the last year mapped into 20xx
        let value = UtcTime::from_der_bytes(b"\x17\x0D490101000000Z").unwrap();
        assert_eq!(value.0.year(), 2049);
    }

    #[test]
    fn missing_zulu_suffix_is_rejected() {
        let err = GeneralizedTime::from_der_bytes(b"\x18\x0E20230101120000").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidASN1Object);
    }

    #[test]
    fn malformed_timestamps_are_rejected() {
        let err = GeneralizedTime::from_der_bytes(b"\x18\x142023-01-01 12:00:00Z").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidASN1Object);

        let err = UtcTime::from_der_bytes(b"\x17\x0323Z").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidASN1Object);
    }
}
