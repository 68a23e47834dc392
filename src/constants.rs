pub const PAGE_SIZE : usize = 4096;

/// The maximum allowed key size in a node.
pub const MAX_KEY_SIZE : usize = 1000;
/// The maximum allowed value size in a leaf node.
pub const MAX_VAL_SIZE : usize = 3000;

const _: () = {
    assert!(PAGE_SIZE <= u16::MAX as usize, "offsets must address the whole page in 16 bits");
    assert!(
        PAGE_SIZE
            >= 4 // type + nkeys
            + 8 // one pointer
            + 2 // one offset
            + 4 // key len + value len
            + MAX_KEY_SIZE
            + MAX_VAL_SIZE,
        "a single key-value pair of max size must fit into a leaf node page"
    );
};
