use std::fmt;

/// Tag class bits 7-6 of the identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl TagClass {
    pub(crate) fn from_identifier_octet(octet: u8) -> Self {
        match octet >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    pub(crate) fn class_bits(self) -> u8 {
        match self {
            TagClass::Universal => 0x00,
            TagClass::Application => 0x40,
            TagClass::ContextSpecific => 0x80,
            TagClass::Private => 0xC0,
        }
    }
}

/// An ASN.1 identifier: tag number plus tag class.
///
/// The constructed bit is not part of the identifier; it belongs to the
/// node's content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub tag_number: u64,
    pub tag_class: TagClass,
}

impl Identifier {
    pub const fn new(tag_number: u64, tag_class: TagClass) -> Self {
        Identifier {
            tag_number,
            tag_class,
        }
    }

    /// Context-specific tag, the common case for tagged fields.
    pub const fn context_specific(tag_number: u64) -> Self {
        Identifier::new(tag_number, TagClass::ContextSpecific)
    }

    pub(crate) fn from_short_form(octet: u8) -> Self {
        debug_assert!(octet & 0x1F != 0x1F);
        Identifier {
            tag_class: TagClass::from_identifier_octet(octet),
            tag_number: (octet & 0x1F) as u64,
        }
    }

    /// The single-octet form, available iff the tag number fits 5 bits.
    pub(crate) fn short_form(&self) -> Option<u8> {
        if self.tag_number < 0x1F {
            Some(self.tag_number as u8 | self.tag_class.class_bits())
        } else {
            None
        }
    }

    pub const BOOLEAN: Identifier = Identifier::new(0x01, TagClass::Universal);
    pub const INTEGER: Identifier = Identifier::new(0x02, TagClass::Universal);
    pub const BIT_STRING: Identifier = Identifier::new(0x03, TagClass::Universal);
    pub const OCTET_STRING: Identifier = Identifier::new(0x04, TagClass::Universal);
    pub const NULL: Identifier = Identifier::new(0x05, TagClass::Universal);
    pub const OBJECT_IDENTIFIER: Identifier = Identifier::new(0x06, TagClass::Universal);
    pub const REAL: Identifier = Identifier::new(0x09, TagClass::Universal);
    pub const ENUMERATED: Identifier = Identifier::new(0x0A, TagClass::Universal);
    pub const UTF8_STRING: Identifier = Identifier::new(0x0C, TagClass::Universal);
    pub const SEQUENCE: Identifier = Identifier::new(0x10, TagClass::Universal);
    pub const SET: Identifier = Identifier::new(0x11, TagClass::Universal);
    pub const NUMERIC_STRING: Identifier = Identifier::new(0x12, TagClass::Universal);
    pub const PRINTABLE_STRING: Identifier = Identifier::new(0x13, TagClass::Universal);
    pub const TELETEX_STRING: Identifier = Identifier::new(0x14, TagClass::Universal);
    pub const VIDEOTEX_STRING: Identifier = Identifier::new(0x15, TagClass::Universal);
    pub const IA5_STRING: Identifier = Identifier::new(0x16, TagClass::Universal);
    pub const UTC_TIME: Identifier = Identifier::new(0x17, TagClass::Universal);
    pub const GENERALIZED_TIME: Identifier = Identifier::new(0x18, TagClass::Universal);
    pub const GRAPHIC_STRING: Identifier = Identifier::new(0x19, TagClass::Universal);
    pub const VISIBLE_STRING: Identifier = Identifier::new(0x1A, TagClass::Universal);
    pub const GENERAL_STRING: Identifier = Identifier::new(0x1B, TagClass::Universal);
    pub const UNIVERSAL_STRING: Identifier = Identifier::new(0x1C, TagClass::Universal);
    pub const BMP_STRING: Identifier = Identifier::new(0x1E, TagClass::Universal);
}

#[mutants::skip]
impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.short_form() {
            Some(short) => write!(
                f,
                "Identifier(tag: {}, class: {:?}, short form: 0x{:02X})",
                self.tag_number, self.tag_class, short
            ),
            None => write!(
                f,
                "Identifier(tag: {}, class: {:?}, long form)",
                self.tag_number, self.tag_class
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_round_trips_through_identifier_octet() {
        for class in [
            TagClass::Universal,
            TagClass::Application,
            TagClass::ContextSpecific,
            TagClass::Private,
        ] {
            assert_eq!(TagClass::from_identifier_octet(class.class_bits()), class);
        }
    }

    #[test]
    fn short_form_packs_class_and_number() {
        assert_eq!(Identifier::INTEGER.short_form(), Some(0x02));
        assert_eq!(Identifier::context_specific(3).short_form(), Some(0x83));
        assert_eq!(
            Identifier::new(7, TagClass::Application).short_form(),
            Some(0x47)
        );
    }

    #[test]
    fn tag_numbers_above_thirty_have_no_short_form() {
        assert_eq!(Identifier::new(31, TagClass::Universal).short_form(), None);
        assert_eq!(Identifier::context_specific(100).short_form(), None);
    }

    #[test]
    fn display_names_the_form() {
        let short = format!("{}", Identifier::SEQUENCE);
        assert!(short.contains("short form"));
        let long = format!("{}", Identifier::context_specific(100));
        assert!(long.contains("long form"));
        assert!(long.contains("tag: 100"));
    }
}
