use crate::asn1_error;
use crate::error::{ErrorKind, Result};
use crate::identifier::Identifier;
use crate::node::{self, ChildrenIter, Content, Node};
use crate::serializer::Serializer;
use crate::tree::{EncodingRules, parse_tree};
use crate::values::{Boolean, Integer, Real, Utf8String};
use bytes::Bytes;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// Types decodable from a DER node.
pub trait DerDecodable: Sized {
    fn from_der_node(node: Node) -> Result<Self>;

    fn from_der_iter(iter: &mut ChildrenIter) -> Result<Self> {
        let node = iter.next().ok_or_else(|| {
            asn1_error!(
                ErrorKind::InvalidASN1Object,
                "Ran out of nodes while decoding {}",
                std::any::type_name::<Self>()
            )
        })?;
        Self::from_der_node(node)
    }

    fn from_der_bytes(data: &[u8]) -> Result<Self> {
        Self::from_der_node(parse(data)?)
    }
}

/// Types encodable through a [`Serializer`].
pub trait DerEncodable {
    fn encode(&self, out: &mut Serializer) -> Result<()>;
}

/// Types whose outer identifier can be overridden (IMPLICIT tagging) while
/// the content rules stay their own.
pub trait DerImplicitlyTaggable: DerDecodable + DerEncodable {
    fn default_identifier() -> Identifier;

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self>;

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()>;
}

/// Parses a DER buffer into its single root node.
pub fn parse(data: &[u8]) -> Result<Node> {
    let nodes = parse_tree(Bytes::copy_from_slice(data), EncodingRules::Distinguished)?;
    node::root_node(nodes)
}

/// Runs `builder` over the children of a constructed node, requiring every
/// child to be consumed. A forgotten optional field is a loud error, not
/// silent data loss.
pub fn sequence<T, F>(node: Node, identifier: Identifier, builder: F) -> Result<T>
where
    F: FnOnce(&mut ChildrenIter) -> Result<T>,
{
    if node.identifier != identifier {
        return Err(asn1_error!(
            ErrorKind::UnexpectedFieldType,
            "Expected {}, got {}",
            identifier,
            node.identifier
        ));
    }
    match node.content {
        Content::Constructed(children) => {
            let mut iter = children.into_iter();
            let result = builder(&mut iter)?;
            if iter.next().is_some() {
                return Err(asn1_error!(
                    ErrorKind::InvalidASN1Object,
                    "Sequence has unconsumed child nodes"
                ));
            }
            Ok(result)
        }
        Content::Primitive(_) => Err(asn1_error!(
            ErrorKind::UnexpectedFieldType,
            "{} content must be constructed",
            node.identifier
        )),
    }
}

/// Decodes every child of a constructed node as a `T`.
pub fn sequence_of<T: DerDecodable>(node: Node, identifier: Identifier) -> Result<Vec<T>> {
    if node.identifier != identifier {
        return Err(asn1_error!(
            ErrorKind::UnexpectedFieldType,
            "Expected {}, got {}",
            identifier,
            node.identifier
        ));
    }
    match node.content {
        Content::Constructed(children) => children.into_iter().map(T::from_der_node).collect(),
        Content::Primitive(_) => Err(asn1_error!(
            ErrorKind::UnexpectedFieldType,
            "{} content must be constructed",
            node.identifier
        )),
    }
}

impl DerDecodable for bool {
    fn from_der_node(node: Node) -> Result<Self> {
        Boolean::from_der_node(node).map(bool::from)
    }
}

impl DerEncodable for bool {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        Boolean::from(*self).encode(out)
    }
}

impl DerImplicitlyTaggable for bool {
    fn default_identifier() -> Identifier {
        Identifier::BOOLEAN
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        Boolean::from_der_node_with_identifier(node, identifier).map(bool::from)
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        Boolean::from(*self).encode_with_identifier(out, identifier)
    }
}

impl DerDecodable for String {
    fn from_der_node(node: Node) -> Result<Self> {
        Utf8String::from_der_node(node).map(String::from)
    }
}

impl DerEncodable for String {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        Utf8String(self.clone()).encode(out)
    }
}

impl DerImplicitlyTaggable for String {
    fn default_identifier() -> Identifier {
        Identifier::UTF8_STRING
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        Utf8String::from_der_node_with_identifier(node, identifier).map(String::from)
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        Utf8String(self.clone()).encode_with_identifier(out, identifier)
    }
}

impl DerDecodable for f64 {
    fn from_der_node(node: Node) -> Result<Self> {
        Real::from_der_node(node).map(f64::from)
    }
}

impl DerEncodable for f64 {
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        Real::from(*self).encode(out)
    }
}

impl DerImplicitlyTaggable for f64 {
    fn default_identifier() -> Identifier {
        Identifier::REAL
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        Real::from_der_node_with_identifier(node, identifier).map(f64::from)
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        Real::from(*self).encode_with_identifier(out, identifier)
    }
}

macro_rules! impl_der_for_int {
    ($($ty:ty => $to_method:ident),+ $(,)?) => {
        $(
            impl DerDecodable for $ty {
                fn from_der_node(node: Node) -> Result<Self> {
                    <Self as DerImplicitlyTaggable>::from_der_node_with_identifier(
                        node,
                        Identifier::INTEGER,
                    )
                }
            }

            impl DerEncodable for $ty {
                fn encode(&self, out: &mut Serializer) -> Result<()> {
                    Integer::from(BigInt::from(*self)).encode(out)
                }
            }

            impl DerImplicitlyTaggable for $ty {
                fn default_identifier() -> Identifier {
                    Identifier::INTEGER
                }

                fn from_der_node_with_identifier(
                    node: Node,
                    identifier: Identifier,
                ) -> Result<Self> {
                    let value = Integer::from_der_node_with_identifier(node, identifier)?;
                    value.0.$to_method().ok_or_else(|| {
                        asn1_error!(
                            ErrorKind::ValueOutOfRange,
                            concat!("INTEGER does not fit into ", stringify!($ty))
                        )
                    })
                }

                fn encode_with_identifier(
                    &self,
                    out: &mut Serializer,
                    identifier: Identifier,
                ) -> Result<()> {
                    Integer::from(BigInt::from(*self)).encode_with_identifier(out, identifier)
                }
            }
        )+
    };
}

impl_der_for_int!(
    i8 => to_i8,
    i16 => to_i16,
    i32 => to_i32,
    i64 => to_i64,
    i128 => to_i128,
    isize => to_isize,
    u8 => to_u8,
    u16 => to_u16,
    u32 => to_u32,
    u64 => to_u64,
    u128 => to_u128,
    usize => to_usize,
);

impl<T> DerDecodable for Vec<T>
where
    T: DerDecodable + DerEncodable,
{
    fn from_der_node(node: Node) -> Result<Self> {
        sequence_of(node, Identifier::SEQUENCE)
    }
}

impl<T> DerEncodable for Vec<T>
where
    T: DerEncodable,
{
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        out.write_sequence(|seq| {
            for item in self {
                seq.serialize(item)?;
            }
            Ok(())
        })
    }
}

impl<T> DerImplicitlyTaggable for Vec<T>
where
    T: DerDecodable + DerEncodable,
{
    fn default_identifier() -> Identifier {
        Identifier::SEQUENCE
    }

    fn from_der_node_with_identifier(node: Node, identifier: Identifier) -> Result<Self> {
        sequence_of(node, identifier)
    }

    fn encode_with_identifier(&self, out: &mut Serializer, identifier: Identifier) -> Result<()> {
        out.append_constructed(identifier, |seq| {
            for item in self {
                seq.serialize(item)?;
            }
            Ok(())
        })
    }
}

impl<T> DerDecodable for Option<T>
where
    T: DerImplicitlyTaggable,
{
    fn from_der_node(node: Node) -> Result<Self> {
        T::from_der_node(node).map(Some)
    }

    /// Decodes the next child iff its identifier matches `T`'s default; an
    /// absent optional field leaves the iterator untouched.
    fn from_der_iter(iter: &mut ChildrenIter) -> Result<Self> {
        match iter.peek() {
            Some(node) if node.identifier == T::default_identifier() => {
                let node = iter.next().expect("peeked node must exist");
                T::from_der_node(node).map(Some)
            }
            _ => Ok(None),
        }
    }
}

impl<T> DerEncodable for Option<T>
where
    T: DerEncodable,
{
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        if let Some(value) = self {
            out.serialize(value)?;
        }
        Ok(())
    }
}

impl<T> DerDecodable for Box<T>
where
    T: DerDecodable,
{
    fn from_der_node(node: Node) -> Result<Self> {
        T::from_der_node(node).map(Box::new)
    }
}

impl<T> DerEncodable for Box<T>
where
    T: DerEncodable,
{
    fn encode(&self, out: &mut Serializer) -> Result<()> {
        (**self).encode(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_promotes_the_single_root() {
        let node = parse(&[0x30, 0x03, 0x02, 0x01, 0x01]).unwrap();
        assert!(node.is_constructed());
        assert_eq!(node.identifier, Identifier::SEQUENCE);
    }

    #[test]
    fn sequence_requires_all_children_consumed() {
        let node = parse(&[0x30, 0x03, 0x02, 0x01, 0x01]).unwrap();
        let result: Result<()> = sequence(node, Identifier::SEQUENCE, |_iter| Ok(()));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidASN1Object);
    }

    #[test]
    fn sequence_checks_the_identifier() {
        let node = parse(&[0x30, 0x00]).unwrap();
        let result: Result<()> = sequence(node, Identifier::SET, |_iter| Ok(()));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::UnexpectedFieldType);
    }

    #[test]
    fn sequence_rejects_primitive_content() {
        let node = parse(&[0x04, 0x00]).unwrap();
        let result: Result<()> = sequence(node, Identifier::OCTET_STRING, |_iter| Ok(()));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::UnexpectedFieldType);
    }

    #[test]
    fn sequence_of_decodes_every_child() {
        let node = parse(&[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]).unwrap();
        let values: Vec<i64> = sequence_of(node, Identifier::SEQUENCE).unwrap();
        assert_eq!(values, [1, 2]);
    }

    #[test]
    fn from_der_iter_fails_on_exhaustion() {
        let node = parse(&[0x30, 0x00]).unwrap();
        let result: Result<()> = sequence(node, Identifier::SEQUENCE, |iter| {
            let _: i64 = i64::from_der_iter(iter)?;
            Ok(())
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidASN1Object);
    }

    #[test]
    fn bool_round_trips() {
        let bytes = [0x01, 0x01, 0xFF];
        let value = bool::from_der_bytes(&bytes).unwrap();
        assert!(value);

        let mut out = Serializer::new();
        out.serialize(&value).unwrap();
        assert_eq!(out.serialized_bytes().as_ref(), bytes);
    }

    #[test]
    fn string_round_trips() {
        let bytes = [0x0C, 0x02, b'H', b'I'];
        let value = String::from_der_bytes(&bytes).unwrap();
        assert_eq!(value, "HI");

        let mut out = Serializer::new();
        out.serialize(&value).unwrap();
        assert_eq!(out.serialized_bytes().as_ref(), bytes);
    }

    #[test]
    fn signed_ints_narrow_with_range_checks() {
        assert_eq!(i32::from_der_bytes(&[0x02, 0x01, 0x7F]).unwrap(), 127);
        assert_eq!(i32::from_der_bytes(&[0x02, 0x01, 0x80]).unwrap(), -128);

        let err = i8::from_der_bytes(&[0x02, 0x02, 0x01, 0x00]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueOutOfRange);
    }

    #[test]
    fn unsigned_ints_reject_negatives() {
        let err = u16::from_der_bytes(&[0x02, 0x01, 0xFF]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueOutOfRange);

        assert_eq!(u16::from_der_bytes(&[0x02, 0x02, 0x00, 0x80]).unwrap(), 128);
    }

    #[test]
    fn vec_round_trips_as_sequence() {
        let bytes = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let values = Vec::<i64>::from_der_bytes(&bytes).unwrap();
        assert_eq!(values, [1, 2]);

        let mut out = Serializer::new();
        out.serialize(&values).unwrap();
        assert_eq!(out.serialized_bytes().as_ref(), bytes);
    }

    #[test]
    fn optional_fields_peek_instead_of_consuming() {
        fn decode_pair(bytes: &[u8]) -> Result<(i64, Option<bool>)> {
            sequence(parse(bytes)?, Identifier::SEQUENCE, |iter| {
                let count = i64::from_der_iter(iter)?;
                let flag = Option::<bool>::from_der_iter(iter)?;
                Ok((count, flag))
            })
        }

        let absent = [0x30, 0x03, 0x02, 0x01, 0x01];
        assert_eq!(decode_pair(&absent).unwrap(), (1, None));

        let present = [0x30, 0x06, 0x02, 0x01, 0x01, 0x01, 0x01, 0xFF];
        assert_eq!(decode_pair(&present).unwrap(), (1, Some(true)));
    }
}
