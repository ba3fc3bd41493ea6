//! Command argument slicing

use heapless::Vec;

use crate::registry::MAX_COMMAND_FIELDS;

/// Payload of one command, cut into its fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs<'a> {
    fields: Vec<&'a [u8], MAX_COMMAND_FIELDS>,
}

impl<'a> CommandArgs<'a> {
    /// Cut `payload` into consecutive fields of `widths` bytes
    ///
    /// Returns `None` if the widths do not cover the payload exactly.
    pub fn split(payload: &'a [u8], widths: &[u8]) -> Option<Self> {
        let mut fields = Vec::new();
        let mut rest = payload;
        for &width in widths {
            if rest.len() < width as usize {
                return None;
            }
            let (field, tail) = rest.split_at(width as usize);
            fields.push(field).ok()?;
            rest = tail;
        }
        rest.is_empty().then_some(Self { fields })
    }

    /// Field `index`
    pub fn field(&self, index: usize) -> Option<&'a [u8]> {
        self.fields.get(index).copied()
    }

    /// First byte of field `index`
    pub fn u8_at(&self, index: usize) -> Option<u8> {
        self.field(index).and_then(|field| field.first().copied())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields() {
        let args = CommandArgs::split(&[0x11, 0x03, 0x07], &[1, 2]).unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args.field(0), Some(&[0x11][..]));
        assert_eq!(args.field(1), Some(&[0x03, 0x07][..]));
        assert_eq!(args.u8_at(1), Some(0x03));
        assert_eq!(args.u8_at(2), None);
    }

    #[test]
    fn test_no_fields() {
        let args = CommandArgs::split(&[], &[]).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(CommandArgs::split(&[1, 2, 3], &[1, 1]).is_none());
        assert!(CommandArgs::split(&[1], &[1, 1]).is_none());
    }
}
