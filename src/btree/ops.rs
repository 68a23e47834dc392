use log::debug;
use super::node::Node;

/// Builds `new` as `old` with `(key, val)` inserted in front of record `idx`.
///
/// `new` must already carry the header for `old.nkeys() + 1` records. Only
/// positions in front of an existing record are accepted, so `idx ==
/// old.nkeys()` (appending after the last record) panics.
pub fn leaf_insert(new: &mut Node, old: &Node, idx: u16, key: &[u8], val: &[u8]) {
    assert!(idx < old.nkeys(), "insert index {} out of range ({} keys)", idx, old.nkeys());

    new.append_range(old, 0, 0, idx);
    new.append_record(idx, 0, key, val);
    new.append_range(old, idx + 1, idx, old.nkeys() - idx);

    debug!("Inserted record at {}, leaf now holds {} bytes of records", idx, new.encoded_size());
}

/// Builds `new` as `old` with record `idx` replaced by `(key, val)`.
/// `new` must already carry the header for `old.nkeys()` records.
pub fn leaf_update(new: &mut Node, old: &Node, idx: u16, key: &[u8], val: &[u8]) {
    assert!(idx < old.nkeys(), "update index {} out of range ({} keys)", idx, old.nkeys());

    new.append_range(old, 0, 0, idx);
    new.append_record(idx, 0, key, val);
    new.append_range(old, idx + 1, idx + 1, old.nkeys() - idx - 1);

    debug!("Updated record at {}, leaf now holds {} bytes of records", idx, new.encoded_size());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::node::NodeType;

    fn leaf(entries: &[(&str, &str)]) -> Node {
        let mut node = Node::with_header(NodeType::Leaf, entries.len() as u16);
        for (i, (key, val)) in entries.iter().enumerate() {
            node.append_record(i as u16, 0, key.as_bytes(), val.as_bytes());
        }
        node
    }

    fn pairs(node: &Node) -> Vec<(&[u8], &[u8])> {
        node.records().map(|r| (r.key, r.val)).collect()
    }

    #[test]
    fn leaf_insert_keeps_order() {
        let old = leaf(&[("k1", "hi"), ("k2", r#"{"name":"joe"}"#)]);

        let mut new = Node::with_header(NodeType::Leaf, 3);
        leaf_insert(&mut new, &old, 1, b"k3", b"hello");

        assert_eq!(new.get_key(0), b"k1");
        assert_eq!(new.get_val(0), b"hi");
        assert_eq!(new.get_key(1), b"k3");
        assert_eq!(new.get_val(1), b"hello");
        assert_eq!(new.get_key(2), b"k2");
        assert_eq!(new.get_val(2), br#"{"name":"joe"}"#);
        assert_eq!(new.encoded_size(), old.encoded_size() + 4 + 2 + 5);

        let mut new_update = Node::with_header(NodeType::Leaf, 3);
        leaf_update(&mut new_update, &new, 2, b"k3", b"hello world");
        assert_eq!(new_update.get_key(2), b"k3");
        assert_eq!(new_update.get_val(2), b"hello world");
        assert_eq!(new_update.get_key(1), b"k3");
    }

    #[test]
    fn leaf_insert_at_front() {
        let old = leaf(&[("b", "2"), ("c", "3")]);

        let mut new = Node::with_header(NodeType::Leaf, 3);
        leaf_insert(&mut new, &old, 0, b"a", b"1");

        assert_eq!(pairs(&new), vec![
            ("a".as_bytes(), "1".as_bytes()),
            ("b".as_bytes(), "2".as_bytes()),
            ("c".as_bytes(), "3".as_bytes()),
        ]);
    }

    #[test]
    fn leaf_update_shrinks_and_grows() {
        let old = leaf(&[("a", "1"), ("b", "two"), ("c", "3")]);

        let mut shorter = Node::with_header(NodeType::Leaf, 3);
        leaf_update(&mut shorter, &old, 1, b"b", b"");
        assert_eq!(shorter.get_val(1), b"");
        assert_eq!(shorter.get_val(2), b"3");
        assert_eq!(shorter.encoded_size(), old.encoded_size() - 3);

        let mut longer = Node::with_header(NodeType::Leaf, 3);
        leaf_update(&mut longer, &old, 1, b"b", b"a much longer value");
        assert_eq!(longer.get_val(1), b"a much longer value");
        assert_eq!(longer.get_key(2), b"c");
        assert_eq!(longer.get_val(2), b"3");
    }

    #[test]
    fn leaf_update_is_idempotent() {
        let old = leaf(&[("a", "1"), ("b", "2")]);

        let mut first = Node::with_header(NodeType::Leaf, 2);
        let mut second = Node::with_header(NodeType::Leaf, 2);
        leaf_update(&mut first, &old, 0, b"a", b"updated");
        leaf_update(&mut second, &old, 0, b"a", b"updated");

        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn old_node_is_untouched() {
        let old = leaf(&[("k1", "hi"), ("k2", "there")]);
        let snapshot = old.as_bytes().to_vec();

        let mut inserted = Node::with_header(NodeType::Leaf, 3);
        leaf_insert(&mut inserted, &old, 1, b"k15", b"between");
        let mut updated = Node::with_header(NodeType::Leaf, 2);
        leaf_update(&mut updated, &old, 1, b"k2", b"changed");

        assert_eq!(old.as_bytes(), snapshot.as_slice());
    }

    #[test]
    #[should_panic(expected = "insert index 2 out of range")]
    fn leaf_insert_rejects_append_at_end() {
        let old = leaf(&[("a", "1"), ("b", "2")]);
        let mut new = Node::with_header(NodeType::Leaf, 3);
        leaf_insert(&mut new, &old, 2, b"c", b"3");
    }

    #[test]
    #[should_panic(expected = "update index 2 out of range")]
    fn leaf_update_out_of_range() {
        let old = leaf(&[("a", "1"), ("b", "2")]);
        let mut new = Node::with_header(NodeType::Leaf, 2);
        leaf_update(&mut new, &old, 2, b"b", b"3");
    }

    #[test]
    #[should_panic]
    fn leaf_insert_needs_room_for_the_new_record() {
        let old = leaf(&[("a", "1"), ("b", "2")]);
        // header still sized for the old key count
        let mut new = Node::with_header(NodeType::Leaf, 2);
        leaf_insert(&mut new, &old, 0, b"0", b"0");
    }
}
