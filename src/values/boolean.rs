use crate::asn1_error;
use crate::ber::{BerDecodable, BerImplicitlyTaggable};
use crate::der::{DerDecodable, DerEncodable, DerImplicitlyTaggable};
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::Node;
use crate::serializer::Serializer;
use crate::values::primitive_content;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boolean(pub bool);

impl From<bool> for Boolean {
    fn from(value: bool) -> Self {
        Boolean(value)
    }
}

impl From<Boolean> for bool {
    fn from(value: Boolean) -> Self {
        value.0
    }
}

impl DerDecodable for Boolean {
    fn from_der_node(node: Node) -> Result<Self> {
        Self::from_der_node_with_identifier(node, Self::default_identifier())
    }
}

impl DerEncodable for Boolean {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        self.encode_with_identifier(out, Self::default_identifier())
    }
}

impl DerImplicitlyTaggable for Boolean {
    fn default_identifier() -> Identifier {
        Identifier::BOOLEAN
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        let bytes = primitive_content(node, identifier)?;
        if bytes.len() != 1 {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "BOOLEAN content must be exactly one byte, got {}",
                bytes.len()
            ));
        }
        match bytes[0] {
            0x00 => Ok(Boolean(false)),
            0xFF => Ok(Boolean(true)),
            other => Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "BOOLEAN must be 0x00 or 0xFF in DER, got 0x{:02X}",
                other
            )),
        }
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        out.append_primitive(identifier, |buf| {
            buf.push(if self.0 { 0xFF } else { 0x00 });
            Ok(())
        })
    }
}

impl BerDecodable for Boolean {
    fn from_ber_node(node: Node) -> Result<Self> {
        <Self as BerImplicitlyTaggable>::from_ber_node_with_identifier(
            node,
            Self::default_identifier(),
        )
    }
}

impl BerImplicitlyTaggable for Boolean {
    // BER treats any non-zero content byte as true.
    fn from_ber_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        let bytes = primitive_content(node, identifier)?;
        if bytes.len() != 1 {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "BOOLEAN content must be exactly one byte, got {}",
                bytes.len()
            ));
        }
        Ok(Boolean(bytes[0] != 0x00))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::der;

    #[test]
    fn der_accepts_only_canonical_bytes() {
        assert_eq!(Boolean::from_der_bytes(&[0x01, 0x01, 0xFF]).unwrap(), Boolean(true));
        assert_eq!(Boolean::from_der_bytes(&[0x01, 0x01, 0x00]).unwrap(), Boolean(false));

        let err = Boolean::from_der_bytes(&[0x01, 0x01, 0x01]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidASN1Object);
    }

    #[test]
    fn content_must_be_one_byte() {
        let err = Boolean::from_der_bytes(&[0x01, 0x00]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidASN1Object);

        let err = Boolean::from_der_bytes(&[0x01, 0x02, 0xFF, 0xFF]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidASN1Object);
    }

    #[test]
    fn ber_is_lax_about_true() {
        let node = crate::ber::parse(&[0x01, 0x01, 0x01]).unwrap();
        assert_eq!(Boolean::from_ber_node(node).unwrap(), Boolean(true));
    }

    #[test]
    fn implicit_tag_round_trip() {
        let mut out = Serializer::new();
        Boolean(true)
            .encode_with_identifier(&mut out, Identifier::context_specific(0))
            .unwrap();
        let bytes = out.serialized_bytes();
        assert_eq!(bytes.as_ref(), [0x80, 0x01, 0xFF]);

        let node = der::parse(&bytes).unwrap();
        let value =
            Boolean::from_der_node_with_identifier(node, Identifier::context_specific(0)).unwrap();
        assert_eq!(value, Boolean(true));
    }
}
