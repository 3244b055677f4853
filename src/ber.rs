use crate::asn1_error;
use crate::der::{DerDecodable, DerImplicitlyTaggable};
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::{self, ChildrenIter, Node};
use crate::tree::{EncodingRules, parse_tree};
use bytes::Bytes;

/// Types decodable under the Basic rules. The defaults delegate to DER;
/// types with BER-specific relaxations override them.
pub trait BerDecodable: DerDecodable {
    fn from_ber_node(node: Node) -> Result<Self> {
        Self::from_der_node(node)
    }

    fn from_ber_iter(iter: &mut ChildrenIter) -> Result<Self> {
        let node = iter.next().ok_or_else(|| {
            asn1_error!(
                ErrorKind::InvalidASN1Object,
                "Ran out of nodes while decoding {}",
                std::any::type_name::<Self>()
            )
        })?;
        Self::from_ber_node(node)
    }

    fn from_ber_bytes(data: &[u8]) -> Result<Self> {
        Self::from_ber_node(parse(data)?)
    }
}

pub trait BerImplicitlyTaggable: BerDecodable + DerImplicitlyTaggable {
    fn from_ber_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        Self::from_der_node_with_identifier(node, identifier)
    }
}

/// Parses a BER buffer (indefinite lengths and non-minimal length octets
/// permitted) into its single root node.
pub fn parse(data: &[u8]) -> Result<Node> {
    let nodes = parse_tree(Bytes::copy_from_slice(data), EncodingRules::Basic)?;
    node::root_node(nodes)
}

pub fn sequence<T, F>(node: Node, identifier: Identifier, builder: F) -> Result<T>
where
    F: FnOnce(&mut ChildrenIter) -> Result<T>,
{
    crate::der::sequence(node, identifier, builder)
}
