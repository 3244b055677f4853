use crate::der::DerEncodable;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::node::{Content, Node};
use bytes::{BufMut, Bytes, BytesMut};

/// Composable DER emitter.
///
/// Content writers run against a scratch buffer (or a nested serializer for
/// constructed fields) so the length octets can be emitted before the
/// content; indefinite lengths are never produced.
pub struct Serializer {
    buffer: BytesMut,
}

impl Serializer {
    pub fn new() -> Self {
        Serializer {
            buffer: BytesMut::with_capacity(1024),
        }
    }

    /// Everything emitted so far.
    pub fn serialized_bytes(&self) -> Bytes {
        self.buffer.clone().freeze()
    }

    pub fn append_primitive<F>(&mut self, identifier: Identifier, content_writer: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut content = Vec::new();
        content_writer(&mut content)?;
        self.append_tlv(identifier, false, &content);
        Ok(())
    }

    pub fn append_constructed<F>(&mut self, identifier: Identifier, writer: F) -> Result<()>
    where
        F: FnOnce(&mut Serializer) -> Result<()>,
    {
        let mut nested = Serializer::new();
        writer(&mut nested)?;
        self.append_tlv(identifier, true, &nested.buffer);
        Ok(())
    }

    pub fn write_sequence<F>(&mut self, writer: F) -> Result<()>
    where
        F: FnOnce(&mut Serializer) -> Result<()>,
    {
        self.append_constructed(Identifier::SEQUENCE, writer)
    }

    pub fn write_set<F>(&mut self, writer: F) -> Result<()>
    where
        F: FnOnce(&mut Serializer) -> Result<()>,
    {
        self.append_constructed(Identifier::SET, writer)
    }

    /// Re-emits a parsed node, recursing through constructed content. For
    /// DER input this reconstructs the original bytes exactly.
    pub fn write_node(&mut self, node: &Node) -> Result<()> {
        match &node.content {
            Content::Primitive(data) => {
                let data = data.clone();
                self.append_primitive(node.identifier, move |buf| {
                    buf.extend_from_slice(&data);
                    Ok(())
                })
            }
            Content::Constructed(children) => {
                let children = children.clone();
                self.append_constructed(node.identifier, move |nested| {
                    for child in children {
                        nested.write_node(&child)?;
                    }
                    Ok(())
                })
            }
        }
    }

    /// Dispatches to the value's encoder.
    pub fn serialize<T: DerEncodable + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.encode(self)
    }

    fn append_tlv(&mut self, identifier: Identifier, constructed: bool, content: &[u8]) {
        let mut header = Vec::with_capacity(12);
        write_identifier(&mut header, identifier, constructed);
        write_length(&mut header, content.len());
        self.buffer.put_slice(&header);
        self.buffer.put_slice(content);
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Serializer::new()
    }
}

pub(crate) fn write_identifier(buf: &mut Vec<u8>, identifier: Identifier, constructed: bool) {
    let constructed_bit = if constructed { 0x20 } else { 0x00 };
    match identifier.short_form() {
        Some(short) => buf.push(short | constructed_bit),
        None => {
            buf.push(identifier.tag_class.class_bits() | constructed_bit | 0x1F);
            write_base128(buf, identifier.tag_number);
        }
    }
}

/// Big-endian base-128 with the high bit set on every octet but the last.
/// Also the encoding of OID sub-identifiers.
pub(crate) fn write_base128(buf: &mut Vec<u8>, mut value: u64) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    loop {
        groups[count] = (value & 0x7F) as u8;
        count += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for index in (0..count).rev() {
        let continuation = if index == 0 { 0x00 } else { 0x80 };
        buf.push(groups[index] | continuation);
    }
}

fn write_length(buf: &mut Vec<u8>, length: usize) {
    if length <= 0x7F {
        buf.push(length as u8);
        return;
    }
    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    buf.push(0x80 | (bytes.len() - skip) as u8);
    buf.extend_from_slice(&bytes[skip..]);
}
