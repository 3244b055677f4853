//! An ASN.1 BER/DER codec.
//!
//! Bytes go in through [`der::parse`] (or [`ber::parse`] for the permissive
//! rule set) and come out as a [`node::Node`] tree backed by a single flat
//! vector; value types in [`values`] decode from and encode to that tree;
//! [`serializer::Serializer`] turns trees and values back into bit-exact DER.

pub mod ber;
pub mod der;
pub mod error;
pub mod identifier;
pub mod node;
pub mod serializer;
pub mod tree;
pub mod values;

pub use error::{Error, ErrorKind, Result};
