use crate::asn1_error;
use crate::ber::{BerDecodable, BerImplicitlyTaggable};
use crate::der::{DerDecodable, DerEncodable, DerImplicitlyTaggable};
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::{Content, Node};
use crate::serializer::Serializer;
use crate::values::{expect_identifier, primitive_content};
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OctetString(pub Bytes);

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> Self {
        OctetString(Bytes::from(value))
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString(Bytes::copy_from_slice(value))
    }
}

impl DerDecodable for OctetString {
    fn from_der_node(node: Node) -> Result<Self> {
        Self::from_der_node_with_identifier(node, Self::default_identifier())
    }
}

impl DerEncodable for OctetString {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        self.encode_with_identifier(out, Self::default_identifier())
    }
}

impl DerImplicitlyTaggable for OctetString {
    fn default_identifier() -> Identifier {
        Identifier::OCTET_STRING
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        primitive_content(node, identifier).map(OctetString)
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        out.append_primitive(identifier, |buf| {
            buf.extend_from_slice(&self.0);
            Ok(())
        })
    }
}

impl BerDecodable for OctetString {
    fn from_ber_node(node: Node) -> Result<Self> {
        <Self as BerImplicitlyTaggable>::from_ber_node_with_identifier(
            node,
            Self::default_identifier(),
        )
    }
}

impl BerImplicitlyTaggable for OctetString {
    // BER permits the segmented constructed form; the value is the
    // concatenation of the segments.
    fn from_ber_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        expect_identifier(&node, identifier)?;
        match node.content {
            Content::Primitive(bytes) => Ok(OctetString(bytes)),
            Content::Constructed(children) => {
                let mut combined = Vec::new();
                for segment in children {
                    combined.extend_from_slice(&OctetString::from_ber_node(segment)?.0);
                }
                Ok(OctetString(Bytes::from(combined)))
            }
        }
    }
}
