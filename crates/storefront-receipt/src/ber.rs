//! A small BER reader
//!
//! Receipts are BER, not DER: containers may use indefinite lengths and
//! OCTET STRINGs may be split into constructed segments. The reader is
//! forgiving in the sense that it never panics; anything it cannot make sense
//! of reads as `None`.

use std::borrow::Cow;

/// Nesting limit for constructed values
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub class: Class,
    pub constructed: bool,
    pub number: u32,
}

impl Tag {
    pub const INTEGER: Tag = Tag::universal(false, 2);
    pub const OCTET_STRING: Tag = Tag::universal(false, 4);
    pub const OBJECT_IDENTIFIER: Tag = Tag::universal(false, 6);
    pub const SEQUENCE: Tag = Tag::universal(true, 16);
    pub const SET: Tag = Tag::universal(true, 17);

    const fn universal(constructed: bool, number: u32) -> Self {
        Tag {
            class: Class::Universal,
            constructed,
            number,
        }
    }

    /// `[n]` with constructed encoding, as used for explicit tagging
    pub const fn context(number: u32) -> Self {
        Tag {
            class: Class::ContextSpecific,
            constructed: true,
            number,
        }
    }
}

/// One decoded tag-length-value
#[derive(Debug, Clone, Copy)]
pub struct Tlv<'a> {
    pub tag: Tag,
    /// Contents octets, without the end-of-contents marker for indefinite lengths
    pub value: &'a [u8],
    depth: usize,
}

impl<'a> Tlv<'a> {
    /// Reader over the elements of a constructed value
    pub fn children(&self) -> Option<Reader<'a>> {
        if !self.tag.constructed || self.depth >= MAX_DEPTH {
            return None;
        }
        Some(Reader {
            data: self.value,
            pos: 0,
            depth: self.depth + 1,
        })
    }

    /// The value of an INTEGER that fits in an `i64`
    pub fn integer(&self) -> Option<i64> {
        if self.tag != Tag::INTEGER || self.value.is_empty() || self.value.len() > 8 {
            return None;
        }
        let negative = self.value[0] & 0x80 != 0;
        let init: i64 = if negative { -1 } else { 0 };
        Some(
            self.value
                .iter()
                .fold(init, |acc, &byte| (acc << 8) | i64::from(byte)),
        )
    }

    /// The contents of an OCTET STRING, joining constructed segments
    pub fn octets(&self) -> Option<Cow<'a, [u8]>> {
        if self.tag.class != Class::Universal || self.tag.number != Tag::OCTET_STRING.number {
            return None;
        }
        if !self.tag.constructed {
            return Some(Cow::Borrowed(self.value));
        }

        let mut joined = Vec::new();
        let mut segments = self.children()?;
        while !segments.is_empty() {
            joined.extend_from_slice(&segments.read()?.octets()?);
        }
        Some(Cow::Owned(joined))
    }
}

/// Sequential reader over concatenated TLVs
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader {
            data,
            pos: 0,
            depth: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Read the next element, or `None` at the end or on malformed input
    pub fn read(&mut self) -> Option<Tlv<'a>> {
        let mut pos = self.pos;
        let tag = self.read_tag(&mut pos)?;
        let length = self.read_length(&mut pos)?;

        let value = match length {
            Some(len) => {
                let end = pos.checked_add(len)?;
                let value = self.data.get(pos..end)?;
                self.pos = end;
                value
            }
            None => {
                if !tag.constructed || self.depth >= MAX_DEPTH {
                    return None;
                }
                let mut contents = Reader {
                    data: self.data.get(pos..)?,
                    pos: 0,
                    depth: self.depth + 1,
                };
                while !contents.at_end_of_contents() {
                    contents.read()?;
                }
                let value = self.data.get(pos..pos + contents.pos)?;
                self.pos = pos + contents.pos + 2;
                value
            }
        };

        Some(Tlv {
            tag,
            value,
            depth: self.depth,
        })
    }

    fn at_end_of_contents(&self) -> bool {
        self.data.get(self.pos..self.pos + 2) == Some(&[0x00, 0x00][..])
    }

    fn next_byte(&self, pos: &mut usize) -> Option<u8> {
        let byte = *self.data.get(*pos)?;
        *pos += 1;
        Some(byte)
    }

    fn read_tag(&self, pos: &mut usize) -> Option<Tag> {
        let first = self.next_byte(pos)?;
        let class = match first >> 6 {
            0 => Class::Universal,
            1 => Class::Application,
            2 => Class::ContextSpecific,
            _ => Class::Private,
        };
        let constructed = first & 0x20 != 0;

        let mut number = u32::from(first & 0x1f);
        if number == 0x1f {
            number = 0;
            loop {
                let byte = self.next_byte(pos)?;
                number = number.checked_mul(128)? | u32::from(byte & 0x7f);
                if byte & 0x80 == 0 {
                    break;
                }
            }
        }

        Some(Tag {
            class,
            constructed,
            number,
        })
    }

    /// `Some(None)` is an indefinite length
    fn read_length(&self, pos: &mut usize) -> Option<Option<usize>> {
        let first = self.next_byte(pos)?;
        match first {
            0x00..=0x7f => Some(Some(usize::from(first))),
            0x80 => Some(None),
            0xff => None,
            _ => {
                let count = usize::from(first & 0x7f);
                if count > std::mem::size_of::<usize>() {
                    return None;
                }
                let mut len = 0usize;
                for _ in 0..count {
                    len = (len << 8) | usize::from(self.next_byte(pos)?);
                }
                Some(Some(len))
            }
        }
    }
}

impl<'a> Iterator for Reader<'a> {
    type Item = Tlv<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_empty() {
            None
        } else {
            self.read()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_definite_sequence() {
        let data = [0x30, 0x06, 0x02, 0x01, 0x05, 0x04, 0x01, 0xaa];
        let seq = Reader::new(&data).read().unwrap();
        assert_eq!(seq.tag, Tag::SEQUENCE);

        let mut children = seq.children().unwrap();
        assert_eq!(children.read().unwrap().integer(), Some(5));
        assert_eq!(children.read().unwrap().octets().unwrap().as_ref(), &[0xaa]);
        assert!(children.is_empty());
    }

    #[test]
    fn test_indefinite_length() {
        let data = [
            0x30, 0x80, 0x02, 0x01, 0x07, 0x31, 0x80, 0x02, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00,
            0x02, 0x01, 0x09,
        ];
        let mut reader = Reader::new(&data);
        let seq = reader.read().unwrap();
        assert_eq!(seq.value.len(), 10);

        let children: Vec<_> = seq.children().unwrap().collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].integer(), Some(7));
        assert_eq!(children[1].tag, Tag::SET);

        assert_eq!(reader.read().unwrap().integer(), Some(9));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_constructed_octet_string() {
        let data = [
            0x24, 0x80, 0x04, 0x02, 0x61, 0x62, 0x04, 0x01, 0x63, 0x00, 0x00,
        ];
        let tlv = Reader::new(&data).read().unwrap();
        assert_eq!(tlv.octets().unwrap().as_ref(), b"abc");
    }

    #[test]
    fn test_long_form_length_and_high_tag() {
        let mut data = vec![0x04, 0x81, 0x80];
        data.extend([0x11; 128]);
        let tlv = Reader::new(&data).read().unwrap();
        assert_eq!(tlv.value.len(), 128);

        let data = [0xbf, 0x81, 0x00, 0x00];
        let tlv = Reader::new(&data).read().unwrap();
        assert_eq!(tlv.tag.class, Class::ContextSpecific);
        assert_eq!(tlv.tag.number, 128);
    }

    #[rstest]
    #[case(&[0x02, 0x01, 0xff], -1)]
    #[case(&[0x02, 0x02, 0x06, 0xa7], 1703)]
    #[case(&[0x02, 0x02, 0x00, 0x80], 128)]
    fn test_integer(#[case] data: &[u8], #[case] expected: i64) {
        assert_eq!(Reader::new(data).read().unwrap().integer(), Some(expected));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0x30])]
    #[case(&[0x30, 0x05, 0x02])]
    #[case(&[0x30, 0x80, 0x02, 0x01, 0x01])]
    #[case(&[0x02, 0x80, 0x00, 0x00])]
    #[case(&[0x04, 0xff])]
    fn test_malformed(#[case] data: &[u8]) {
        assert!(Reader::new(data).read().is_none());
    }

    #[test]
    fn test_depth_limit() {
        let mut data = Vec::new();
        for _ in 0..(MAX_DEPTH + 2) {
            data.extend([0x30, 0x80]);
        }
        for _ in 0..(MAX_DEPTH + 2) {
            data.extend([0x00, 0x00]);
        }
        assert!(Reader::new(&data).read().is_none());
    }
}
