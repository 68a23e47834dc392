use std::fmt;
use log::{debug, warn};
use super::{
    constants::{
        BNODE_LEAF,
        BNODE_NODE,
        NODE_HEADER_SIZE,
        OFFSET_SIZE,
        POINTER_SIZE,
        RECORD_HEADER_SIZE,
    },
    entry::{NodeHeader, Record, RecordHeader},
    error::NodeError,
};
use crate::constants::{MAX_KEY_SIZE, MAX_VAL_SIZE, PAGE_SIZE};

/// Room for a mutation result that has not been checked against the page capacity yet
pub const SCRATCH_SIZE: usize = 2 * PAGE_SIZE;

const _: () = assert!(SCRATCH_SIZE <= u16::MAX as usize, "offsets must address a scratch node in 16 bits");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Internal,
    Leaf,
}

impl NodeType {
    pub fn tag(self) -> u16 {
        match self {
            NodeType::Internal => BNODE_NODE,
            NodeType::Leaf => BNODE_LEAF,
        }
    }
}

impl TryFrom<u16> for NodeType {
    type Error = NodeError;

    fn try_from(tag: u16) -> Result<Self, Self::Error> {
        match tag {
            BNODE_NODE => Ok(NodeType::Internal),
            BNODE_LEAF => Ok(NodeType::Leaf),
            other => Err(NodeError::UnknownType(other)),
        }
    }
}

/// One tree node laid out in a fixed size page buffer
///
/// ```text
/// | type | nkeys | pointers   | offsets    | records | unused |
/// | 2B   | 2B    | nkeys * 8B | nkeys * 2B | ...     |        |
/// ```
///
/// `offsets[i]` holds where record `i` ends relative to the start of the
/// record blob, so record `i` starts at `get_offset(i)` and the first offset
/// (always 0) is never stored.
///
/// The header has to be set before anything else is written since the
/// positions of the pointer and offset arrays depend on the key count.
/// Index violations are caller bugs and panic.
#[derive(Clone, PartialEq, Eq)]
pub struct Node {
    page_buffer: Vec<u8>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("btype", &self.btype())
            .field("nkeys", &self.nkeys())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl Node {
    /// Zeroed page sized buffer, header not set yet
    pub fn new() -> Self {
        Self::with_capacity(PAGE_SIZE)
    }

    fn with_capacity(len: usize) -> Self {
        Self {
            page_buffer: vec![0u8; len],
        }
    }

    pub fn with_header(node_type: NodeType, nkeys: u16) -> Self {
        let mut node = Self::new();
        node.set_header(node_type, nkeys);
        node
    }

    /// A node that can temporarily hold more than a page worth of records.
    /// Check it with `check_capacity` or `into_page` before treating it as a page.
    pub fn scratch(node_type: NodeType, nkeys: u16) -> Self {
        let mut node = Self::with_capacity(SCRATCH_SIZE);
        node.set_header(node_type, nkeys);
        node
    }

    /// Validates a page that came from outside (disk, network) before exposing it
    pub fn from_page(page_buffer: Vec<u8>) -> Result<Self, NodeError> {
        match Self::validate(page_buffer) {
            Ok(node) => {
                debug!("Decoded {:?} node with {} keys", node.node_type(), node.nkeys());
                Ok(node)
            },
            Err(e) => {
                warn!("Rejected page: {}", e);
                Err(e)
            }
        }
    }

    fn validate(page_buffer: Vec<u8>) -> Result<Self, NodeError> {
        let len = page_buffer.len();
        if len < PAGE_SIZE {
            return Err(NodeError::TooSmall { len, needed: PAGE_SIZE });
        }
        if len > PAGE_SIZE {
            return Err(NodeError::Overflow { size: len, capacity: PAGE_SIZE });
        }

        let header = NodeHeader::decode(&page_buffer)?;
        NodeType::try_from(header.btype)?;

        let node = Node { page_buffer };
        let records_start = node.records_start();
        if records_start > len {
            return Err(NodeError::TooSmall { len, needed: records_start });
        }

        let mut start = 0usize;
        for i in 0..header.nkeys {
            let end = node.get_offset(i + 1) as usize;
            if end <= start {
                return Err(NodeError::CorruptOffsets { index: i + 1 });
            }
            if records_start + end > len {
                return Err(NodeError::Overflow { size: records_start + end, capacity: len });
            }
            if end - start < RECORD_HEADER_SIZE {
                return Err(NodeError::CorruptRecord { index: i });
            }

            let record = node.read_record_header(records_start + start)?;
            if record.key_len as usize > MAX_KEY_SIZE || record.val_len as usize > MAX_VAL_SIZE {
                return Err(NodeError::RecordTooLarge {
                    index: i,
                    key_len: record.key_len as usize,
                    val_len: record.val_len as usize,
                });
            }
            if record.record_size() != end - start {
                return Err(NodeError::CorruptRecord { index: i });
            }

            start = end;
        }

        Ok(node)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.page_buffer.as_slice()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.page_buffer
    }

    /// Size of the underlying buffer, not the bytes in use
    pub fn capacity(&self) -> usize {
        self.page_buffer.len()
    }

    pub fn btype(&self) -> u16 {
        self.get_u16(0)
    }

    pub fn node_type(&self) -> Result<NodeType, NodeError> {
        NodeType::try_from(self.btype())
    }

    pub fn nkeys(&self) -> u16 {
        self.get_u16(2)
    }

    pub fn set_header(&mut self, node_type: NodeType, nkeys: u16) {
        if self.page_buffer.len() < NODE_HEADER_SIZE {
            panic!("node too small");
        }
        let header = NodeHeader { btype: node_type.tag(), nkeys };
        if let Err(e) = header.encode(&mut self.page_buffer) {
            panic!("failed to write node header: {}", e);
        }
    }

    pub fn get_ptr(&self, idx: u16) -> u64 {
        assert!(idx < self.nkeys(), "pointer index {} out of range ({} keys)", idx, self.nkeys());
        self.get_u64(NODE_HEADER_SIZE + POINTER_SIZE * idx as usize)
    }

    pub fn set_ptr(&mut self, idx: u16, ptr: u64) {
        assert!(idx < self.nkeys(), "pointer index {} out of range ({} keys)", idx, self.nkeys());
        self.set_u64(NODE_HEADER_SIZE + POINTER_SIZE * idx as usize, ptr);
    }

    fn offset_pos(&self, idx: u16) -> usize {
        NODE_HEADER_SIZE + POINTER_SIZE * self.nkeys() as usize + OFFSET_SIZE * (idx as usize - 1)
    }

    pub fn get_offset(&self, idx: u16) -> u16 {
        if idx == 0 {
            return 0;
        }
        assert!(idx <= self.nkeys(), "offset index {} out of range ({} keys)", idx, self.nkeys());
        self.get_u16(self.offset_pos(idx))
    }

    pub fn set_offset(&mut self, idx: u16, offset: u16) {
        assert!(idx <= self.nkeys(), "offset index {} out of range ({} keys)", idx, self.nkeys());
        if idx == 0 {
            assert_eq!(offset, 0, "first record always starts at offset 0");
            return;
        }
        self.set_u16(self.offset_pos(idx), offset);
    }

    fn records_start(&self) -> usize {
        NODE_HEADER_SIZE + (POINTER_SIZE + OFFSET_SIZE) * self.nkeys() as usize
    }

    /// Position of record `idx` in the buffer, `idx == nkeys` is the end of the last record
    pub fn record_pos(&self, idx: u16) -> usize {
        assert!(idx <= self.nkeys(), "record index {} out of range ({} keys)", idx, self.nkeys());
        self.records_start() + self.get_offset(idx) as usize
    }

    /// Single read path for the length prefix of the record at byte `pos`
    fn read_record_header(&self, pos: usize) -> Result<RecordHeader, NodeError> {
        RecordHeader::decode(&self.page_buffer[pos..pos + RECORD_HEADER_SIZE])
    }

    fn record_header(&self, idx: u16) -> (usize, RecordHeader) {
        assert!(idx < self.nkeys(), "record index {} out of range ({} keys)", idx, self.nkeys());
        let pos = self.record_pos(idx);
        let header = match self.read_record_header(pos) {
            Ok(header) => header,
            Err(e) => panic!("failed to read record {} header: {}", idx, e),
        };
        (pos + RECORD_HEADER_SIZE, header)
    }

    pub fn get_key(&self, idx: u16) -> &[u8] {
        let (start, header) = self.record_header(idx);
        &self.page_buffer[start..start + header.key_len as usize]
    }

    pub fn get_val(&self, idx: u16) -> &[u8] {
        let (start, header) = self.record_header(idx);
        let start = start + header.key_len as usize;
        &self.page_buffer[start..start + header.val_len as usize]
    }

    pub fn get_record(&self, idx: u16) -> Record<'_> {
        Record {
            ptr: self.get_ptr(idx),
            key: self.get_key(idx),
            val: self.get_val(idx),
        }
    }

    /// Length of the record blob
    pub fn encoded_size(&self) -> usize {
        self.get_offset(self.nkeys()) as usize
    }

    /// Everything in use: header, pointers, offsets and records
    pub fn used_bytes(&self) -> usize {
        self.record_pos(self.nkeys())
    }

    pub fn fits_page(&self) -> bool {
        self.used_bytes() <= PAGE_SIZE
    }

    pub fn check_capacity(&self) -> Result<(), NodeError> {
        let size = self.used_bytes();
        if size > PAGE_SIZE {
            return Err(NodeError::Overflow { size, capacity: PAGE_SIZE });
        }
        Ok(())
    }

    /// Turns a (scratch) node into exactly one page once it is known to fit
    pub fn into_page(mut self) -> Result<Node, NodeError> {
        self.check_capacity()?;
        self.page_buffer.resize(PAGE_SIZE, 0);
        Ok(self)
    }

    /// Writes a record at `idx` and the offset where the next one starts.
    /// Records must be appended in index order, lower offsets are never revisited.
    pub fn append_record(&mut self, idx: u16, ptr: u64, key: &[u8], val: &[u8]) {
        assert!(idx < self.nkeys(), "record index {} out of range ({} keys)", idx, self.nkeys());
        assert!(key.len() <= MAX_KEY_SIZE, "key of {} bytes exceeds {}", key.len(), MAX_KEY_SIZE);
        assert!(val.len() <= MAX_VAL_SIZE, "value of {} bytes exceeds {}", val.len(), MAX_VAL_SIZE);

        self.set_ptr(idx, ptr);

        let pos = self.record_pos(idx);
        let header = RecordHeader {
            key_len: key.len() as u16,
            val_len: val.len() as u16,
        };
        let end = pos + header.record_size();
        assert!(
            end <= self.page_buffer.len(),
            "record {} ends at byte {} past the {} byte node buffer", idx, end, self.page_buffer.len()
        );

        if let Err(e) = header.encode(&mut self.page_buffer[pos..]) {
            panic!("failed to write record {} header: {}", idx, e);
        }
        let key_start = pos + RECORD_HEADER_SIZE;
        self.page_buffer[key_start..key_start + key.len()].copy_from_slice(key);
        self.page_buffer[key_start + key.len()..end].copy_from_slice(val);

        let next_offset = self.get_offset(idx) + header.record_size() as u16;
        self.set_offset(idx + 1, next_offset);
    }

    /// Appends records `src[src_start..src_start + n]` to `self` starting at `dst_start`
    pub fn append_range(&mut self, src: &Node, dst_start: u16, src_start: u16, n: u16) {
        for i in 0..n {
            let record = src.get_record(src_start + i);
            self.append_record(dst_start + i, record.ptr, record.key, record.val);
        }
    }

    pub fn records(&self) -> RecordIter<'_> {
        RecordIter {
            node: self,
            next: 0,
        }
    }

    /// Index of the first key that is not less than `key`, or `nkeys` if every key is smaller
    pub fn find_place(&self, key: &[u8]) -> u16 {
        let n = self.nkeys();
        for i in 0..n {
            if self.get_key(i) >= key {
                return i;
            }
        }

        n
    }

    fn get_u16(&self, pos: usize) -> u16 {
        u16::from_le_bytes([self.page_buffer[pos], self.page_buffer[pos + 1]])
    }

    fn set_u16(&mut self, pos: usize, data: u16) {
        self.page_buffer[pos..pos + 2].copy_from_slice(&data.to_le_bytes());
    }

    fn get_u64(&self, pos: usize) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.page_buffer[pos..pos + 8]);
        u64::from_le_bytes(bytes)
    }

    fn set_u64(&mut self, pos: usize, data: u64) {
        self.page_buffer[pos..pos + 8].copy_from_slice(&data.to_le_bytes());
    }
}

pub struct RecordIter<'a> {
    node: &'a Node,
    next: u16,
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.node.nkeys() {
            return None;
        }
        let record = self.node.get_record(self.next);
        self.next += 1;

        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.node.nkeys().saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for RecordIter<'_> {}
