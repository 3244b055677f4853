use crate::asn1_error;
use crate::ber::{BerDecodable, BerImplicitlyTaggable};
use crate::der::{DerDecodable, DerEncodable, DerImplicitlyTaggable};
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::{Content, Node};
use crate::serializer::Serializer;
use crate::values::{expect_identifier, primitive_content};

// The restricted string types share one codec and differ only by identifier.
// Character-set restrictions (IA5, PrintableString, ...) are not enforced
// here; callers that need them validate above this layer.
macro_rules! string_type {
    ($(#[$meta:meta])* $name:ident => $identifier:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl DerDecodable for $name {
            fn from_der_node(node: Node) -> Result<Self> {
                Self::from_der_node_with_identifier(node, Self::default_identifier())
            }
        }

        impl DerEncodable for $name {
            fn encode(&self, out: &mut Serializer) -> Result<()> {
                self.encode_with_identifier(out, Self::default_identifier())
            }
        }

        impl DerImplicitlyTaggable for $name {
            fn default_identifier() -> Identifier {
                $identifier
            }

            fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
                let bytes = primitive_content(node, identifier)?;
                decode_utf8(&bytes).map($name)
            }

            fn encode_with_identifier(
                &self,
                out: &mut Serializer,
                identifier: Identifier,
            ) -> Result<()> {
                out.append_primitive(identifier, |buf| {
                    buf.extend_from_slice(self.0.as_bytes());
                    Ok(())
                })
            }
        }

        impl BerDecodable for $name {
            fn from_ber_node(node: Node) -> Result<Self> {
                <Self as BerImplicitlyTaggable>::from_ber_node_with_identifier(
                    node,
                    Self::default_identifier(),
                )
            }
        }

        impl BerImplicitlyTaggable for $name {
            // BER permits the segmented constructed form.
            fn from_ber_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
                expect_identifier(&node, identifier)?;
                match node.content {
                    Content::Primitive(bytes) => decode_utf8(&bytes).map($name),
                    Content::Constructed(children) => {
                        let mut combined = String::new();
                        for segment in children {
                            combined.push_str(&Self::from_ber_node(segment)?.0);
                        }
                        Ok($name(combined))
                    }
                }
            }
        }
    };
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| asn1_error!(ErrorKind::InvalidASN1Object, "String content is not valid UTF-8"))
}

string_type! {
    /// UTF8String, Universal tag 12.
    Utf8String => Identifier::UTF8_STRING
}

string_type! {
    /// PrintableString, Universal tag 19.
    PrintableString => Identifier::PRINTABLE_STRING
}

string_type! {
    /// IA5String, Universal tag 22.
    Ia5String => Identifier::IA5_STRING
}

string_type! {
    /// NumericString, Universal tag 18.
    NumericString => Identifier::NUMERIC_STRING
}
