use crate::asn1_error;
use crate::ber::{BerDecodable, BerImplicitlyTaggable};
use crate::der::{DerDecodable, DerEncodable, DerImplicitlyTaggable};
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::Node;
use crate::serializer::Serializer;
use crate::values::primitive_content;

/// REAL backed by an IEEE-754 double.
///
/// The decoder accepts every binary form (bases 2, 8, and 16, scale factors,
/// all exponent-length indicators); the encoder always emits the minimal
/// base-2 scale-0 form. Decimal encodings are not supported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Real(pub f64);

impl From<f64> for Real {
    fn from(value: f64) -> Self {
        Real(value)
    }
}

impl From<Real> for f64 {
    fn from(value: Real) -> Self {
        value.0
    }
}

const PLUS_INFINITY: u8 = 0x40;
const MINUS_INFINITY: u8 = 0x41;

impl DerDecodable for Real {
    fn from_der_node(node: Node) -> Result<Self> {
        Self::from_der_node_with_identifier(node, Self::default_identifier())
    }
}

impl DerEncodable for Real {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        self.encode_with_identifier(out, Self::default_identifier())
    }
}

impl DerImplicitlyTaggable for Real {
    fn default_identifier() -> Identifier {
        Identifier::REAL
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        decode_real(&primitive_content(node, identifier)?).map(Real)
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        let value = self.0;
        out.append_primitive(identifier, move |buf| encode_real(value, buf))
    }
}

impl BerDecodable for Real {}
impl BerImplicitlyTaggable for Real {}

fn decode_real(bytes: &[u8]) -> Result<f64> {
    let Some(&leading) = bytes.first() else {
        return Ok(0.0);
    };
    match leading {
        PLUS_INFINITY => return Ok(f64::INFINITY),
        MINUS_INFINITY => return Ok(f64::NEG_INFINITY),
        _ => {}
    }
    if leading & 0x80 == 0 {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "Decimal REAL encodings are not supported"
        ));
    }

    let sign = if leading & 0x40 != 0 { -1.0 } else { 1.0 };
    let base: f64 = match (leading >> 4) & 0x03 {
        0 => 2.0,
        1 => 8.0,
        2 => 16.0,
        _ => {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "Reserved REAL base bits"
            ));
        }
    };
    let scale = ((leading >> 2) & 0x03) as i32;

    let mut rest = &bytes[1..];
    let exponent_len = match leading & 0x03 {
        0 => 1,
        1 => 2,
        2 => 3,
        _ => {
            let (&len, tail) = rest.split_first().ok_or_else(|| {
                asn1_error!(
                    ErrorKind::InvalidASN1Object,
                    "REAL encoding ended before its exponent length octet"
                )
            })?;
            rest = tail;
            if len == 0 {
                return Err(asn1_error!(
                    ErrorKind::InvalidASN1Object,
                    "REAL exponent length must not be zero"
                ));
            }
            len as usize
        }
    };
    if rest.len() < exponent_len {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "REAL encoding ended inside its exponent"
        ));
    }
    if exponent_len > 8 {
        return Err(asn1_error!(
            ErrorKind::ValueOutOfRange,
            "REAL exponent wider than 8 octets is not supported"
        ));
    }

    let (exponent_bytes, mantissa_bytes) = rest.split_at(exponent_len);
    let mut exponent: i64 = 0;
    for &octet in exponent_bytes {
        exponent = (exponent << 8) | octet as i64;
    }
    if exponent_len < 8 && exponent_bytes[0] & 0x80 != 0 {
        // sign-extend
        exponent |= !0i64 << (8 * exponent_len);
    }

    let mantissa_bytes =
        &mantissa_bytes[mantissa_bytes.iter().take_while(|&&b| b == 0).count()..];
    if mantissa_bytes.len() > 8 {
        return Err(asn1_error!(
            ErrorKind::ValueOutOfRange,
            "REAL mantissa wider than 8 octets is not supported"
        ));
    }
    let mut mantissa: u64 = 0;
    for &octet in mantissa_bytes {
        mantissa = (mantissa << 8) | octet as u64;
    }

    // The exponentiation is split so that representable results never go
    // through an overflowed or fully-underflowed intermediate (2^-1074
    // cannot be reached through a single powi).
    let exponent = exponent.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    let half = exponent / 2;
    let magnitude =
        mantissa as f64 * base.powi(half) * base.powi(exponent - half) * 2f64.powi(scale);
    Ok(sign * magnitude)
}

fn encode_real(value: f64, buf: &mut Vec<u8>) -> Result<()> {
    if value.is_nan() {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "NaN has no REAL encoding"
        ));
    }
    if value == 0.0 {
        return Ok(());
    }
    if value.is_infinite() {
        buf.push(if value.is_sign_positive() {
            PLUS_INFINITY
        } else {
            MINUS_INFINITY
        });
        return Ok(());
    }

    let bits = value.to_bits();
    let sign_bit = ((bits >> 63) as u8) & 1;
    let biased_exponent = ((bits >> 52) & 0x7FF) as i64;
    let fraction = bits & ((1u64 << 52) - 1);

    // Treat the mantissa as an integer, so the exponent drops by the 52
    // fractional places. Denormals carry no implicit leading one and sit at
    // the minimum exponent.
    let (mut mantissa, mut exponent) = if biased_exponent == 0 {
        (fraction, -1022 - 52)
    } else {
        (fraction | 1 << 52, biased_exponent - 1023 - 52)
    };

    // minimal mantissa: shift out trailing zero bits, compensating the
    // exponent (the value is non-zero, so the loop terminates)
    while mantissa & 1 == 0 {
        mantissa >>= 1;
        exponent += 1;
    }

    let exponent_bytes = minimal_signed_bytes(exponent);
    let mut leading = 0x80 | sign_bit << 6; // base 2, scale factor 0
    match exponent_bytes.len() {
        1 => {}
        2 => leading |= 0x01,
        3 => leading |= 0x02,
        _ => leading |= 0x03,
    }
    buf.push(leading);
    if exponent_bytes.len() > 3 {
        buf.push(exponent_bytes.len() as u8);
    }
    buf.extend_from_slice(&exponent_bytes);

    let mantissa_bytes = mantissa.to_be_bytes();
    let skip = mantissa_bytes.iter().take_while(|&&b| b == 0).count();
    buf.extend_from_slice(&mantissa_bytes[skip..]);
    Ok(())
}

/// Minimal big-endian two's complement: sign bytes are trimmed while the
/// following byte still carries the same sign bit.
fn minimal_signed_bytes(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start + 1 < bytes.len() {
        let redundant = match (bytes[start], bytes[start + 1] & 0x80) {
            (0x00, 0x00) => true,
            (0xFF, 0x80) => true,
            _ => false,
        };
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}
