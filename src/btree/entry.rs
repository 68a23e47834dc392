use bincode::{
    config::{Configuration, Fixint, LittleEndian},
    Decode,
    Encode,
};
use super::{
    constants::{NODE_HEADER_SIZE, RECORD_HEADER_SIZE},
    error::NodeError,
};

/// Every integer on a page is a fixed width little endian field
pub const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

#[derive(Decode, Encode, Debug, Clone, Copy, PartialEq)]
pub struct NodeHeader {
    pub btype: u16,
    pub nkeys: u16,
}

impl NodeHeader {
    pub fn decode(page_buffer: &[u8]) -> Result<Self, NodeError> {
        if page_buffer.len() < NODE_HEADER_SIZE {
            return Err(NodeError::TooSmall { len: page_buffer.len(), needed: NODE_HEADER_SIZE });
        }
        let (header, _) = bincode::decode_from_slice(&page_buffer[..NODE_HEADER_SIZE], BINCODE_CONFIG)?;
        Ok(header)
    }

    pub fn encode(&self, page_buffer: &mut [u8]) -> Result<(), NodeError> {
        bincode::encode_into_slice(self, &mut page_buffer[..NODE_HEADER_SIZE], BINCODE_CONFIG)?;
        Ok(())
    }
}

/// Length prefix in front of every record
#[derive(Decode, Encode, Debug, Clone, Copy, PartialEq)]
pub struct RecordHeader {
    pub key_len: u16,
    pub val_len: u16,
}

impl RecordHeader {
    pub fn decode(entry_slice: &[u8]) -> Result<Self, NodeError> {
        let (header, _) = bincode::decode_from_slice(&entry_slice[..RECORD_HEADER_SIZE], BINCODE_CONFIG)?;
        Ok(header)
    }

    pub fn encode(&self, entry_slice: &mut [u8]) -> Result<(), NodeError> {
        bincode::encode_into_slice(self, &mut entry_slice[..RECORD_HEADER_SIZE], BINCODE_CONFIG)?;
        Ok(())
    }

    /// Bytes the whole record occupies in the record blob
    pub fn record_size(&self) -> usize {
        RECORD_HEADER_SIZE + self.key_len as usize + self.val_len as usize
    }
}

/// A record borrowed from a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a> {
    pub ptr: u64,
    pub key: &'a [u8],
    pub val: &'a [u8],
}

impl Record<'_> {
    pub fn size(&self) -> usize {
        RECORD_HEADER_SIZE + self.key.len() + self.val.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_little_endian() -> Result<(), NodeError> {
        let mut buf = [0u8; 4];
        NodeHeader { btype: 2, nkeys: 0x0102 }.encode(&mut buf)?;
        assert_eq!(buf, [2, 0, 2, 1]);
        assert_eq!(NodeHeader::decode(&buf)?, NodeHeader { btype: 2, nkeys: 0x0102 });

        RecordHeader { key_len: 1000, val_len: 3000 }.encode(&mut buf)?;
        assert_eq!(buf, [0xe8, 0x03, 0xb8, 0x0b]);
        assert_eq!(RecordHeader::decode(&buf)?.record_size(), 4004);
        Ok(())
    }

    #[test]
    fn short_header_buffer_is_rejected() {
        assert!(matches!(
            NodeHeader::decode(&[2, 0, 1]),
            Err(NodeError::TooSmall { len: 3, needed: 4 })
        ));
    }
}
