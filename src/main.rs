use anyhow::Result;
use log::info;
use rand::distr::{Alphanumeric, SampleString};
use std::collections::BTreeMap;
use cowpage::btree::{leaf_insert, leaf_update, Node, NodeType};


fn random_string(n : usize) -> Vec<u8> {
    Alphanumeric.sample_string(&mut rand::rng(), n).into_bytes()
}

fn main() -> Result<()> {
    env_logger::init();
    let n : usize = 50;
    let mut entries : BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();

    // Generate random sorted entries
    while entries.len() < n {
        entries.insert(random_string(10), random_string(20));
    }

    let mut leaf = Node::with_header(NodeType::Leaf, n as u16);
    for (i, (key, value)) in entries.iter().enumerate() {
        leaf.append_record(i as u16, 0, key, value);
    }
    leaf.check_capacity()?;
    info!("Built leaf with {} records, {} bytes used", leaf.nkeys(), leaf.used_bytes());

    // Insert a new key in order, only in front of an existing record
    let (key, idx) = loop {
        let key = random_string(10);
        let idx = leaf.find_place(&key);
        if idx < leaf.nkeys() {
            break (key, idx);
        }
    };
    let mut inserted = Node::scratch(NodeType::Leaf, leaf.nkeys() + 1);
    leaf_insert(&mut inserted, &leaf, idx, &key, b"inserted");
    let inserted = inserted.into_page()?;
    info!("Inserted key at {}, {} bytes used", idx, inserted.used_bytes());

    // Update it with a bigger value
    let mut updated = Node::scratch(NodeType::Leaf, inserted.nkeys());
    leaf_update(&mut updated, &inserted, idx, &key, &random_string(100));
    let updated = Node::from_page(updated.into_page()?.into_bytes())?;
    info!("Updated key at {}, {} bytes used", idx, updated.used_bytes());

    // Verify values
    for (i, (key, value)) in entries.iter().enumerate() {
        let i = (if i < idx as usize { i } else { i + 1 }) as u16;
        assert_eq!(updated.get_key(i), key.as_slice());
        assert_eq!(updated.get_val(i), value.as_slice());
    }
    assert_eq!(leaf.nkeys() as usize, n);

    Ok(())
}
