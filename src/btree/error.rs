use std::fmt;

#[derive(Debug)]
pub enum NodeError {
    Decoding(bincode::error::DecodeError),
    Encoding(bincode::error::EncodeError),
    /// Buffer cannot even hold the node header and its pointer/offset arrays
    TooSmall { len: usize, needed: usize },
    UnknownType(u16),
    /// Node uses more bytes than a page can hold
    Overflow { size: usize, capacity: usize },
    CorruptOffsets { index: u16 },
    CorruptRecord { index: u16 },
    RecordTooLarge { index: u16, key_len: usize, val_len: usize },
}

impl From<bincode::error::DecodeError> for NodeError {
    fn from(error: bincode::error::DecodeError) -> Self {
        NodeError::Decoding(error)
    }
}

impl From<bincode::error::EncodeError> for NodeError {
    fn from(error: bincode::error::EncodeError) -> Self {
        NodeError::Encoding(error)
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::Decoding(e) => write!(f, "Bincode decoding error: {}", e),
            NodeError::Encoding(e) => write!(f, "Bincode encoding error: {}", e),
            NodeError::TooSmall { len, needed } =>
                write!(f, "Node buffer of {} bytes is too small, need at least {}", len, needed),
            NodeError::UnknownType(t) => write!(f, "Unknown node type tag: {}", t),
            NodeError::Overflow { size, capacity } =>
                write!(f, "Node uses {} bytes but page capacity is {}", size, capacity),
            NodeError::CorruptOffsets { index } =>
                write!(f, "Offset table is not strictly increasing at index {}", index),
            NodeError::CorruptRecord { index } =>
                write!(f, "Record {} does not match its offset table entry", index),
            NodeError::RecordTooLarge { index, key_len, val_len } =>
                write!(f, "Record {} exceeds size limits (key {} bytes, value {} bytes)", index, key_len, val_len),
        }
    }
}

impl std::error::Error for NodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NodeError::Decoding(e) => Some(e),
            NodeError::Encoding(e) => Some(e),
            _ => None,
        }
    }
}
