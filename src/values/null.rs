use crate::asn1_error;
use crate::ber::{BerDecodable, BerImplicitlyTaggable};
use crate::der::{DerDecodable, DerEncodable, DerImplicitlyTaggable};
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::Node;
use crate::serializer::Serializer;
use crate::values::primitive_content;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Null;

impl DerDecodable for Null {
    fn from_der_node(node: Node) -> Result<Self> {
        Self::from_der_node_with_identifier(node, Self::default_identifier())
    }
}

impl DerEncodable for Null {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        self.encode_with_identifier(out, Self::default_identifier())
    }
}

impl DerImplicitlyTaggable for Null {
    fn default_identifier() -> Identifier {
        Identifier::NULL
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        let bytes = primitive_content(node, identifier)?;
        if !bytes.is_empty() {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "NULL content must be empty, got {} bytes",
                bytes.len()
            ));
        }
        Ok(Null)
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        out.append_primitive(identifier, |_buf| Ok(()))
    }
}

impl BerDecodable for Null {}
impl BerImplicitlyTaggable for Null {}
