use crate::asn1_error;
use crate::ber::{BerDecodable, BerImplicitlyTaggable};
use crate::der::{DerDecodable, DerEncodable, DerImplicitlyTaggable};
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::Node;
use crate::serializer::{Serializer, write_base128};
use crate::values::primitive_content;
use bytes::Bytes;

/// OBJECT IDENTIFIER, stored in its encoded sub-identifier form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    bytes: Bytes,
}

impl ObjectIdentifier {
    pub fn new(components: &[u64]) -> Result<Self> {
        if components.len() < 2 {
            return Err(asn1_error!(
                ErrorKind::TooFewOIDComponents,
                "OBJECT IDENTIFIER needs at least two components, got {}",
                components.len()
            ));
        }
        let first = components[0];
        let second = components[1];
        if first > 2 {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "First OID component must be 0, 1, or 2, got {}",
                first
            ));
        }
        if first < 2 && second > 39 {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "Second OID component must be at most 39 when the first is {}",
                first
            ));
        }
        let leading_pair = (first * 40).checked_add(second).ok_or_else(|| {
            asn1_error!(
                ErrorKind::ValueOutOfRange,
                "Leading OID component pair does not fit a sub-identifier"
            )
        })?;

        let mut encoded = Vec::with_capacity(components.len() + 1);
        write_base128(&mut encoded, leading_pair);
        for &component in &components[2..] {
            write_base128(&mut encoded, component);
        }
        Ok(ObjectIdentifier {
            bytes: Bytes::from(encoded),
        })
    }

    /// Splits the encoding back into numeric components. The first encoded
    /// sub-identifier is taken apart by plain division by 40.
    pub fn components(&self) -> Result<Vec<u64>> {
        let mut data = self.bytes.clone();
        if data.is_empty() {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "OBJECT IDENTIFIER content must not be empty"
            ));
        }
        let leading_pair = read_subidentifier(&mut data)?;
        let mut components = vec![leading_pair / 40, leading_pair % 40];
        while !data.is_empty() {
            components.push(read_subidentifier(&mut data)?);
        }
        Ok(components)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn read_subidentifier(data: &mut Bytes) -> Result<u64> {
    let mut value: u64 = 0;
    let mut leading = true;
    loop {
        if data.is_empty() {
            return Err(asn1_error!(
                ErrorKind::TruncatedASN1Field,
                "OID sub-identifier ended without a terminating octet"
            ));
        }
        let octet = data.split_to(1)[0];
        if leading && octet == 0x80 {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "OID sub-identifier has a redundant leading zero octet"
            ));
        }
        leading = false;
        value = value
            .checked_mul(128)
            .and_then(|v| v.checked_add((octet & 0x7F) as u64))
            .ok_or_else(|| {
                asn1_error!(
                    ErrorKind::InvalidASN1Object,
                    "OID sub-identifier exceeds the supported range"
                )
            })?;
        if octet & 0x80 == 0 {
            return Ok(value);
        }
    }
}

impl DerDecodable for ObjectIdentifier {
    fn from_der_node(node: Node) -> Result<Self> {
        Self::from_der_node_with_identifier(node, Self::default_identifier())
    }
}

impl DerEncodable for ObjectIdentifier {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        self.encode_with_identifier(out, Self::default_identifier())
    }
}

impl DerImplicitlyTaggable for ObjectIdentifier {
    fn default_identifier() -> Identifier {
        Identifier::OBJECT_IDENTIFIER
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        let bytes = primitive_content(node, identifier)?;
        if bytes.is_empty() {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "OBJECT IDENTIFIER content must not be empty"
            ));
        }
        // every sub-identifier must be well formed, leading pair included
        let mut remaining = bytes.clone();
        while !remaining.is_empty() {
            read_subidentifier(&mut remaining)?;
        }
        Ok(ObjectIdentifier { bytes })
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        out.append_primitive(identifier, |buf| {
            buf.extend_from_slice(&self.bytes);
            Ok(())
        })
    }
}

impl BerDecodable for ObjectIdentifier {}
impl BerImplicitlyTaggable for ObjectIdentifier {}
