use crate::asn1_error;
use crate::ber::{BerDecodable, BerImplicitlyTaggable};
use crate::der::{DerDecodable, DerEncodable, DerImplicitlyTaggable};
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::{Content, Node};
use crate::serializer::Serializer;
use crate::values::{expect_identifier, primitive_content};
use bytes::Bytes;

/// BIT STRING: bit data plus the count of unused low bits in the final byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitString {
    pub bytes: Bytes,
    pub padding_bits: u8,
}

impl BitString {
    pub fn new(bytes: Bytes, padding_bits: u8) -> Result<Self> {
        if padding_bits > 7 {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "BIT STRING padding bits must be 0-7, got {}",
                padding_bits
            ));
        }
        if bytes.is_empty() && padding_bits != 0 {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "Empty BIT STRING must have zero padding bits"
            ));
        }
        Ok(BitString {
            bytes,
            padding_bits,
        })
    }
}

fn split_padding(content: Bytes, strict_unused_bits: bool) -> Result<BitString> {
    let Some(&padding_bits) = content.first() else {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "BIT STRING content is missing its padding byte"
        ));
    };
    if padding_bits > 7 {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "BIT STRING padding bits must be 0-7, got {}",
            padding_bits
        ));
    }

    let data = content.slice(1..);
    if data.is_empty() && padding_bits != 0 {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "Empty BIT STRING must have zero padding bits"
        ));
    }
    if strict_unused_bits {
        if let Some(&last) = data.last() {
            let mask = (1u8 << padding_bits) - 1;
            if last & mask != 0 {
                return Err(asn1_error!(
                    ErrorKind::InvalidASN1Object,
                    "BIT STRING unused bits must be zero"
                ));
            }
        }
    }

    Ok(BitString {
        bytes: data,
        padding_bits,
    })
}

impl DerDecodable for BitString {
    fn from_der_node(node: Node) -> Result<Self> {
        Self::from_der_node_with_identifier(node, Self::default_identifier())
    }
}

impl DerEncodable for BitString {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        self.encode_with_identifier(out, Self::default_identifier())
    }
}

impl DerImplicitlyTaggable for BitString {
    fn default_identifier() -> Identifier {
        Identifier::BIT_STRING
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        split_padding(primitive_content(node, identifier)?, true)
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        out.append_primitive(identifier, |buf| {
            buf.push(self.padding_bits);
            buf.extend_from_slice(&self.bytes);
            Ok(())
        })
    }
}

impl BerDecodable for BitString {
    fn from_ber_node(node: Node) -> Result<Self> {
        <Self as BerImplicitlyTaggable>::from_ber_node_with_identifier(
            node,
            Self::default_identifier(),
        )
    }
}

impl BerImplicitlyTaggable for BitString {
    /// BER permits the segmented constructed form. Segments are bitwise
    /// concatenation, so every segment but the last must end on a byte
    /// boundary; the final segment's padding becomes the whole value's.
    fn from_ber_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        expect_identifier(&node, identifier)?;
        match node.content {
            Content::Primitive(bytes) => split_padding(bytes, false),
            Content::Constructed(children) => {
                let mut combined = Vec::new();
                let mut padding_bits = 0u8;
                for segment in children {
                    if padding_bits != 0 {
                        return Err(asn1_error!(
                            ErrorKind::InvalidASN1Object,
                            "Only the final BIT STRING segment may have padding bits"
                        ));
                    }
                    let part = BitString::from_ber_node(segment)?;
                    padding_bits = part.padding_bits;
                    combined.extend_from_slice(&part.bytes);
                }
                BitString::new(Bytes::from(combined), padding_bits)
            }
        }
    }
}
