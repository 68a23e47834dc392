// | type | nkeys | pointers   | offsets    | records |
// | 2B   | 2B    | nkeys * 8B | nkeys * 2B | ...     |
pub const NODE_HEADER_SIZE : usize = 4;
pub const POINTER_SIZE : usize = 8;
pub const OFFSET_SIZE : usize = 2;

// | key len | value len | key | value |
// | 2B      | 2B        | ... | ...   |
pub const RECORD_HEADER_SIZE : usize = 4;

pub const BNODE_NODE : u16 = 1; // internal nodes with pointers
pub const BNODE_LEAF : u16 = 2; // leaf nodes with values
