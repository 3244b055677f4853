use crate::asn1_error;
use crate::ber::{BerDecodable, BerImplicitlyTaggable};
use crate::der::{DerDecodable, DerEncodable, DerImplicitlyTaggable};
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::Node;
use crate::serializer::Serializer;
use crate::values::primitive_content;
use bytes::Bytes;
use num_bigint::BigInt;

/// Arbitrary-precision INTEGER.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Integer(pub BigInt);

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer(BigInt::from(value))
    }
}

impl From<BigInt> for Integer {
    fn from(value: BigInt) -> Self {
        Integer(value)
    }
}

/// The content bytes of a well-formed INTEGER: minimal two's complement.
/// Only the first two bytes need checking; anything longer that starts with
/// a full sign byte followed by a matching sign bit carries no information.
fn check_minimal_encoding(bytes: &Bytes) -> Result<()> {
    if bytes.len() > 1 {
        match (bytes[0], bytes[1] & 0x80) {
            (0x00, 0x00) => {
                return Err(asn1_error!(
                    ErrorKind::InvalidASN1IntegerEncoding,
                    "INTEGER encoded with a redundant leading zero"
                ));
            }
            (0xFF, 0x80) => {
                return Err(asn1_error!(
                    ErrorKind::InvalidASN1IntegerEncoding,
                    "INTEGER encoded with a redundant leading 0xFF"
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

fn content_bytes(node: Node, identifier: Identifier) -> Result<Bytes> {
    let bytes = primitive_content(node, identifier)?;
    if bytes.is_empty() {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "INTEGER content must not be empty"
        ));
    }
    Ok(bytes)
}

impl DerDecodable for Integer {
    fn from_der_node(node: Node) -> Result<Self> {
        Self::from_der_node_with_identifier(node, Self::default_identifier())
    }
}

impl DerEncodable for Integer {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        self.encode_with_identifier(out, Self::default_identifier())
    }
}

impl DerImplicitlyTaggable for Integer {
    fn default_identifier() -> Identifier {
        Identifier::INTEGER
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        let bytes = content_bytes(node, identifier)?;
        check_minimal_encoding(&bytes)?;
        Ok(Integer(BigInt::from_signed_bytes_be(&bytes)))
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        out.append_primitive(identifier, |buf| {
            buf.extend_from_slice(&self.0.to_signed_bytes_be());
            Ok(())
        })
    }
}

impl BerDecodable for Integer {
    fn from_ber_node(node: Node) -> Result<Self> {
        <Self as BerImplicitlyTaggable>::from_ber_node_with_identifier(
            node,
            Self::default_identifier(),
        )
    }
}

impl BerImplicitlyTaggable for Integer {
    // BER tolerates redundant sign bytes.
    fn from_ber_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        let bytes = content_bytes(node, identifier)?;
        Ok(Integer(BigInt::from_signed_bytes_be(&bytes)))
    }
}
