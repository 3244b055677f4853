use crate::asn1_error;
use crate::error::{ErrorKind, Result};
use crate::identifier::{Identifier, TagClass};
use bytes::Bytes;

/// The rule set a parse runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingRules {
    Basic,
    Distinguished,
}

impl EncodingRules {
    pub fn allows_indefinite_lengths(self) -> bool {
        matches!(self, EncodingRules::Basic)
    }

    pub fn allows_non_minimal_lengths(self) -> bool {
        matches!(self, EncodingRules::Basic)
    }
}

/// Nesting deeper than this fails the parse.
pub const MAX_NODE_DEPTH: usize = 50;

/// Inputs producing more than this many nodes fail the parse.
pub const MAX_NODE_COUNT: usize = 100_000;

/// One TLV as the parser emits it: pre-order position in the shared vector,
/// with its whole encoding and, for primitives, the content payload.
#[derive(Debug, Clone)]
pub(crate) struct FlatNode {
    pub identifier: Identifier,
    pub depth: usize,
    pub is_constructed: bool,
    pub encoded_bytes: Bytes,
    pub data_bytes: Option<Bytes>,
}

impl FlatNode {
    /// The end-of-contents sentinel: Universal tag 0, primitive, encoded as
    /// exactly `00 00`.
    pub fn is_end_of_contents(&self) -> bool {
        self.identifier.tag_class == TagClass::Universal
            && self.identifier.tag_number == 0
            && !self.is_constructed
            && self.encoded_bytes.as_ref() == [0x00, 0x00]
    }
}

/// Parses `data` into the pre-order flat node vector, consuming the whole
/// buffer.
pub(crate) fn parse_tree(data: Bytes, rules: EncodingRules) -> Result<Vec<FlatNode>> {
    let mut parser = TreeParser {
        rules,
        nodes: Vec::with_capacity(16),
    };
    let mut remaining = data;
    parser.parse_node(&mut remaining, 1)?;

    if !remaining.is_empty() {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "{} trailing bytes after the root node",
            remaining.len()
        ));
    }
    if parser.nodes.first().is_some_and(FlatNode::is_end_of_contents) {
        return Err(asn1_error!(
            ErrorKind::InvalidASN1Object,
            "End-of-contents marker outside an indefinite-length field"
        ));
    }

    Ok(parser.nodes)
}

struct TreeParser {
    rules: EncodingRules,
    nodes: Vec<FlatNode>,
}

impl TreeParser {
    fn push_node(&mut self, node: FlatNode) -> Result<usize> {
        if self.nodes.len() >= MAX_NODE_COUNT {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "Excessive number of ASN.1 nodes"
            ));
        }
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    fn parse_node(&mut self, data: &mut Bytes, depth: usize) -> Result<()> {
        if depth > MAX_NODE_DEPTH {
            return Err(asn1_error!(
                ErrorKind::InvalidASN1Object,
                "Excessive stack depth was reached"
            ));
        }
        if data.is_empty() {
            return Err(asn1_error!(
                ErrorKind::TruncatedASN1Field,
                "Input ended before an identifier octet"
            ));
        }

        let original = data.clone();
        let identifier_octet = data.split_to(1)[0];
        let is_constructed = identifier_octet & 0x20 != 0;

        let identifier = if identifier_octet & 0x1F == 0x1F {
            let tag_class = TagClass::from_identifier_octet(identifier_octet);
            let tag_number = read_long_form_tag_number(data)?;
            if tag_number < 0x1F {
                return Err(asn1_error!(
                    ErrorKind::MalformedASN1Identifier,
                    "Tag number {} must use the short identifier form",
                    tag_number
                ));
            }
            Identifier::new(tag_number, tag_class)
        } else {
            Identifier::from_short_form(identifier_octet)
        };

        match read_length(data, self.rules)? {
            Length::Definite(length) => {
                if (data.len() as u64) < length {
                    return Err(asn1_error!(
                        ErrorKind::TruncatedASN1Field,
                        "Field length {} exceeds the {} remaining bytes",
                        length,
                        data.len()
                    ));
                }
                let mut content = data.split_to(length as usize);
                let encoded_bytes = original.slice(0..original.len() - data.len());

                if is_constructed {
                    self.push_node(FlatNode {
                        identifier,
                        depth,
                        is_constructed: true,
                        encoded_bytes,
                        data_bytes: None,
                    })?;
                    while !content.is_empty() {
                        let child_index = self.nodes.len();
                        self.parse_node(&mut content, depth + 1)?;
                        if self.nodes[child_index].is_end_of_contents() {
                            return Err(asn1_error!(
                                ErrorKind::InvalidASN1Object,
                                "End-of-contents marker inside a definite-length field"
                            ));
                        }
                    }
                } else {
                    self.push_node(FlatNode {
                        identifier,
                        depth,
                        is_constructed: false,
                        encoded_bytes,
                        data_bytes: Some(content),
                    })?;
                }
            }
            Length::Indefinite => {
                if !self.rules.allows_indefinite_lengths() {
                    return Err(asn1_error!(
                        ErrorKind::UnsupportedFieldLength,
                        "Indefinite field lengths are not permitted in DER"
                    ));
                }
                if !is_constructed {
                    return Err(asn1_error!(
                        ErrorKind::UnsupportedFieldLength,
                        "Indefinite-length fields must be constructed"
                    ));
                }

                let placeholder = self.push_node(FlatNode {
                    identifier,
                    depth,
                    is_constructed: true,
                    encoded_bytes: Bytes::new(),
                    data_bytes: None,
                })?;

                loop {
                    if data.is_empty() {
                        return Err(asn1_error!(
                            ErrorKind::TruncatedASN1Field,
                            "Indefinite-length field is missing its end-of-contents marker"
                        ));
                    }
                    let child_index = self.nodes.len();
                    self.parse_node(data, depth + 1)?;
                    if self.nodes[child_index].is_end_of_contents() {
                        self.nodes.pop();
                        break;
                    }
                }

                let consumed = original.len() - data.len();
                self.nodes[placeholder].encoded_bytes = original.slice(0..consumed);
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Length {
    Definite(u64),
    Indefinite,
}

fn read_length(data: &mut Bytes, rules: EncodingRules) -> Result<Length> {
    if data.is_empty() {
        return Err(asn1_error!(
            ErrorKind::TruncatedASN1Field,
            "Input ended before a length octet"
        ));
    }
    let first = data.split_to(1)[0];

    if first == 0x80 {
        return Ok(Length::Indefinite);
    }
    if first & 0x80 == 0 {
        return Ok(Length::Definite(first as u64));
    }
    if first == 0xFF {
        return Err(asn1_error!(
            ErrorKind::UnsupportedFieldLength,
            "Reserved length octet 0xFF"
        ));
    }

    let octet_count = (first & 0x7F) as usize;
    if data.len() < octet_count {
        return Err(asn1_error!(
            ErrorKind::TruncatedASN1Field,
            "Input ended inside a long-form length"
        ));
    }
    let mut length: u64 = 0;
    for &octet in data.split_to(octet_count).iter() {
        length = length
            .checked_mul(256)
            .ok_or_else(|| {
                asn1_error!(
                    ErrorKind::InvalidASN1Object,
                    "Field length exceeds the supported range"
                )
            })?
            + octet as u64;
    }

    if !rules.allows_non_minimal_lengths() {
        if length < 0x80 {
            return Err(asn1_error!(
                ErrorKind::UnsupportedFieldLength,
                "Length {} must use the short form",
                length
            ));
        }
        if octet_count > minimal_length_octets(length) {
            return Err(asn1_error!(
                ErrorKind::UnsupportedFieldLength,
                "Length encoded with excess octets"
            ));
        }
    }

    Ok(Length::Definite(length))
}

fn minimal_length_octets(length: u64) -> usize {
    let significant_bits = (64 - length.leading_zeros()) as usize;
    significant_bits.div_ceil(8).max(1)
}

fn read_long_form_tag_number(data: &mut Bytes) -> Result<u64> {
    let mut value: u64 = 0;
    let mut leading = true;
    loop {
        if data.is_empty() {
            return Err(asn1_error!(
                ErrorKind::TruncatedASN1Field,
                "Input ended inside a long-form tag number"
            ));
        }
        let octet = data.split_to(1)[0];
        if leading && octet == 0x80 {
            return Err(asn1_error!(
                ErrorKind::MalformedASN1Identifier,
                "Long-form tag number has a redundant leading zero octet"
            ));
        }
        leading = false;
        value = value
            .checked_mul(128)
            .and_then(|v| v.checked_add((octet & 0x7F) as u64))
            .ok_or_else(|| {
                asn1_error!(
                    ErrorKind::MalformedASN1Identifier,
                    "Tag number exceeds the supported range"
                )
            })?;
        if octet & 0x80 == 0 {
            return Ok(value);
        }
    }
}
