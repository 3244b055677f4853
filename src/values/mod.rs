//! The universal ASN.1 value types and their codecs.

mod bit_string;
mod boolean;
mod integer;
mod null;
mod object_identifier;
mod octet_string;
mod real;
mod strings;
mod time;

pub use bit_string::BitString;
pub use boolean::Boolean;
pub use integer::Integer;
pub use null::Null;
pub use object_identifier::ObjectIdentifier;
pub use octet_string::OctetString;
pub use real::Real;
pub use strings::{Ia5String, NumericString, PrintableString, Utf8String};
pub use time::{GeneralizedTime, UtcTime};

use crate::asn1_error;
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::{Content, Node};
use bytes::Bytes;

pub(crate) fn expect_identifier(node: &Node, identifier: Identifier) -> Result<()> {
    if node.identifier != identifier {
        return Err(asn1_error!(
            ErrorKind::UnexpectedFieldType,
            "Expected {}, got {}",
            identifier,
            node.identifier
        ));
    }
    Ok(())
}

pub(crate) fn primitive_content(node: Node, identifier: Identifier) -> Result<Bytes> {
    expect_identifier(&node, identifier)?;
    match node.content {
        Content::Primitive(bytes) => Ok(bytes),
        Content::Constructed(_) => Err(asn1_error!(
            ErrorKind::UnexpectedFieldType,
            "{} content must be primitive",
            node.identifier
        )),
    }
}
