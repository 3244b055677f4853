//! End-to-end DER scenarios: known byte vectors in, decoded values and
//! bit-exact re-encodings out.

use derkit::der::{self, DerDecodable, DerEncodable, DerImplicitlyTaggable};
use derkit::error::ErrorKind;
use derkit::identifier::Identifier;
use derkit::node::Content;
use derkit::serializer::Serializer;
use derkit::values::{BitString, Boolean, Integer, Null, ObjectIdentifier, OctetString, Real, Utf8String};
use hex_literal::hex;

fn reencoded(data: &[u8]) -> Vec<u8> {
    let node = der::parse(data).expect("parse failed");
    let mut out = Serializer::new();
    out.write_node(&node).expect("write_node failed");
    out.serialized_bytes().to_vec()
}

fn encoded<T: DerEncodable>(value: &T) -> Vec<u8> {
    let mut out = Serializer::new();
    out.serialize(value).expect("serialize failed");
    out.serialized_bytes().to_vec()
}

#[test]
fn sequence_of_two_integers() {
    let data = hex!("30 06 02 01 01 02 01 02");
    let values = Vec::<i64>::from_der_bytes(&data).unwrap();
    assert_eq!(values, [1, 2]);
    assert_eq!(encoded(&values), data);
    assert_eq!(reencoded(&data), data);
}

#[test]
fn boolean_bytes_are_canonical() {
    assert_eq!(Boolean::from_der_bytes(&hex!("01 01 FF")).unwrap(), Boolean(true));
    assert_eq!(Boolean::from_der_bytes(&hex!("01 01 00")).unwrap(), Boolean(false));
    assert_eq!(encoded(&Boolean(true)), hex!("01 01 FF"));
    assert_eq!(encoded(&Boolean(false)), hex!("01 01 00"));

    let err = Boolean::from_der_bytes(&hex!("01 01 01")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidASN1Object);
}

#[test]
fn integer_minimality() {
    assert_eq!(
        Integer::from_der_bytes(&hex!("02 01 7F")).unwrap(),
        Integer::from(127)
    );
    assert_eq!(
        Integer::from_der_bytes(&hex!("02 01 80")).unwrap(),
        Integer::from(-128)
    );

    let err = Integer::from_der_bytes(&hex!("02 02 00 7F")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidASN1IntegerEncoding);
}

#[test]
fn utf8_string_hi() {
    let data = hex!("0C 02 48 49");
    let value = Utf8String::from_der_bytes(&data).unwrap();
    assert_eq!(value.0, "HI");
    assert_eq!(encoded(&value), data);
}

#[test]
fn long_form_length_boundary() {
    let mut data = hex!("04 81 C8").to_vec();
    data.extend_from_slice(&[0x61; 200]);

    let value = OctetString::from_der_bytes(&data).unwrap();
    assert_eq!(value.0.len(), 200);
    assert!(value.0.iter().all(|&b| b == 0x61));
    assert_eq!(encoded(&value), data);
    assert_eq!(reencoded(&data), data);

    // same length with a padded length field must be rejected
    let mut padded = hex!("04 82 00 C8").to_vec();
    padded.extend_from_slice(&[0x61; 200]);
    let err = der::parse(&padded).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFieldLength);
}

#[test]
fn rsa_object_identifier() {
    let data = hex!("06 06 2A 86 48 86 F7 0D");
    let oid = ObjectIdentifier::from_der_bytes(&data).unwrap();
    assert_eq!(oid.components().unwrap(), [1, 2, 840, 113549]);
    assert_eq!(encoded(&oid), data);
    assert_eq!(reencoded(&data), data);
}

#[test]
fn bit_string_padding() {
    let data = hex!("03 02 03 A0");
    let value = BitString::from_der_bytes(&data).unwrap();
    assert_eq!(value.padding_bits, 3);
    assert_eq!(value.bytes.as_ref(), [0xA0]);
    assert_eq!(encoded(&value), data);

    let err = BitString::from_der_bytes(&hex!("03 02 03 A1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidASN1Object);
}

#[test]
fn null_must_be_empty() {
    assert_eq!(Null::from_der_bytes(&hex!("05 00")).unwrap(), Null);
    assert_eq!(encoded(&Null), hex!("05 00"));

    let err = Null::from_der_bytes(&hex!("05 01 00")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidASN1Object);
}

#[test]
fn high_tag_number_implicit_tag() {
    // ContextSpecific tag 100 takes the long identifier form: 9F 64
    let tag = Identifier::context_specific(100);
    let mut out = Serializer::new();
    Integer::from(5).encode_with_identifier(&mut out, tag).unwrap();
    let bytes = out.serialized_bytes();
    assert_eq!(bytes.as_ref(), hex!("9F 64 01 05"));

    let node = der::parse(&bytes).unwrap();
    assert_eq!(node.identifier, tag);
    let value = Integer::from_der_node_with_identifier(node, tag).unwrap();
    assert_eq!(value, Integer::from(5));
    assert_eq!(reencoded(&bytes), bytes.to_vec());
}

#[test]
fn reals_round_trip_through_their_encodings() {
    for value in [3.14, -0.5, 2.0, f64::INFINITY, f64::NEG_INFINITY] {
        let bytes = encoded(&Real(value));
        let decoded = Real::from_der_bytes(&bytes).unwrap();
        assert_eq!(decoded.0, value, "REAL {value} did not survive");
    }
}

#[test]
fn write_node_reconstructs_nested_structures() {
    // SEQUENCE { INTEGER 42, SEQUENCE { UTF8String, NULL, OCTET STRING }, BIT STRING }
    let mut out = Serializer::new();
    out.write_sequence(|seq| {
        seq.serialize(&Integer::from(42))?;
        seq.write_sequence(|inner| {
            inner.serialize(&Utf8String::from("hello"))?;
            inner.serialize(&Null)?;
            inner.serialize(&OctetString::from(&[0xFF][..]))
        })?;
        seq.serialize(&BitString::new(bytes::Bytes::from_static(&[0xA0]), 3).unwrap())
    })
    .unwrap();
    let built = out.serialized_bytes();
    assert_eq!(
        built.as_ref(),
        hex!("30 15 02 01 2A 30 0C 0C 05 68 65 6C 6C 6F 05 00 04 01 FF 03 02 03 A0")
    );
    assert_eq!(reencoded(&built), built.to_vec());
}

#[test]
fn subtree_spans_partition_the_root_span() {
    let data = hex!("30 0F 02 01 01 30 08 02 01 02 30 03 02 01 03 05 00");
    let node = der::parse(&data).unwrap();
    let Content::Constructed(children) = &node.content else {
        panic!("root must be constructed");
    };
    let total: usize = children.iter().map(|child| child.encoded_bytes.len()).sum();
    // children fill the root's content exactly: whole TLV minus the header
    assert_eq!(total, node.encoded_bytes.len() - 2);
}

#[test]
fn depth_is_bounded_on_adversarial_input() {
    // 60 nested definite-length sequences overshoot the depth cap
    let mut data = Vec::new();
    for _ in 0..60 {
        let mut wrapped = vec![0x30, data.len() as u8];
        wrapped.append(&mut data);
        data = wrapped;
    }
    let err = der::parse(&data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidASN1Object);
}
