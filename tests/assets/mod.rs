#![allow(dead_code)]

use ember_nbt::{io::Flavor, NbtCompound, NbtFile, NbtList, NbtTree, TagId, TagType, TagValue};
use flate2::Compression;
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};

/// A root compound named "root" holding `hp: 100` and `tags: ["a", "b"]`.
pub const HP_TAGS: &[u8] = &[
    0x0A, 0x00, 0x04, b'r', b'o', b'o', b't', // root
    0x03, 0x00, 0x02, b'h', b'p', 0x00, 0x00, 0x00, 0x64, // hp
    0x09, 0x00, 0x04, b't', b'a', b'g', b's', 0x08, 0x00, 0x00, 0x00, 0x02, // tags
    0x00, 0x01, b'a', 0x00, 0x01, b'b', // elements
    0x00,
];

pub fn hp_tags() -> NbtFile {
    let mut file = NbtFile::with_root_name("root");
    let root = file.root();
    let tree = file.tree_mut();

    let hp = tree.create_named("hp", 100i32);
    tree.add(root, hp).unwrap();

    let tags = tree.create_named("tags", NbtList::new());
    tree.add(root, tags).unwrap();
    for value in ["a", "b"] {
        let element = tree.create(value);
        tree.push(tags, element).unwrap();
    }

    file
}

pub fn all_flavors() -> [Flavor; 6] {
    [
        Flavor::Uncompressed,
        Flavor::GzCompressed,
        Flavor::ZlibCompressed,
        Flavor::GzCompressedWith(Compression::fast()),
        Flavor::ZlibCompressedWith(Compression::best()),
        Flavor::ZlibCompressedWith(Compression::none()),
    ]
}

/// A document exercising every tag type, modelled on the classic `bigtest.nbt`.
pub static BIG_TEST: Lazy<NbtFile> = Lazy::new(|| {
    let mut file = NbtFile::with_root_name("Level");
    let level = file.root();
    let tree = file.tree_mut();

    let nested = add_named(tree, level, "nested compound test", NbtCompound::new());
    for (name, item, value) in [("egg", "Eggbert", 0.5f32), ("ham", "Hampus", 0.75f32)] {
        let entry = add_named(tree, nested, name, NbtCompound::new());
        add_named(tree, entry, "name", item);
        add_named(tree, entry, "value", value);
    }

    add_named(tree, level, "intTest", 2147483647i32);
    add_named(tree, level, "byteTest", 127u8);
    add_named(
        tree,
        level,
        "stringTest",
        "HELLO WORLD THIS IS A TEST STRING \u{C5}\u{C4}\u{D6}!",
    );

    let longs = add_named(tree, level, "listTest (long)", NbtList::new());
    for value in 11i64 ..= 15 {
        let element = tree.create(value);
        tree.push(longs, element).unwrap();
    }

    add_named(tree, level, "doubleTest", 0.49312871321823148f64);
    add_named(tree, level, "floatTest", 0.49823147058486938f32);
    add_named(tree, level, "longTest", 9223372036854775807i64);

    let compounds = add_named(tree, level, "listTest (compound)", NbtList::new());
    for index in 0 .. 2 {
        let element = tree.create(NbtCompound::new());
        tree.push(compounds, element).unwrap();
        add_named(tree, element, "created-on", 1264099775885i64);
        add_named(tree, element, "name", format!("Compound tag #{}", index));
    }

    let bytes: Vec<u8> = (0 .. 1000u32)
        .map(|n| ((n * n * 255 + n * 7) % 100) as u8)
        .collect();
    add_named(
        tree,
        level,
        "byteArrayTest (the first 1000 values of (n*n*255+n*7)%100, starting with n=0 (0, 62, 34, \
         16, 8, ...))",
        bytes,
    );

    add_named(tree, level, "shortTest", 32767i16);
    add_named(tree, level, "intArrayTest", vec![i32::MIN, -1, 0, 1, i32::MAX]);

    let empty = add_named(tree, level, "emptyList", NbtList::new());
    tree.set_list_type(empty, TagType::End).unwrap();

    file
});

pub static BIG_TEST_UNCOMPRESSED: Lazy<Vec<u8>> =
    Lazy::new(|| BIG_TEST.save_to_bytes(Flavor::Uncompressed).unwrap());

/// Creates a named tag and adds it to the given compound.
pub fn add_named<T: Into<TagValue>>(
    tree: &mut NbtTree,
    compound: TagId,
    name: &str,
    value: T,
) -> TagId {
    let tag = tree.create_named(name, value);
    tree.add(compound, tag).unwrap();
    tag
}

/// Asserts that two subtrees are structurally equal, printing both on failure.
#[track_caller]
pub fn assert_tree_eq(left: &NbtTree, left_id: TagId, right: &NbtTree, right_id: TagId) {
    assert!(
        left.structurally_eq(left_id, right, right_id),
        "trees differ\nleft:\n{}\nright:\n{}",
        left.display(left_id),
        right.display(right_id)
    );
}

#[track_caller]
pub fn assert_file_eq(left: &NbtFile, right: &NbtFile) {
    assert_tree_eq(left.tree(), left.root(), right.tree(), right.root());
}

/// Builds a random document whose containers nest at most `depth` levels below the root.
pub fn random_file<R: Rng>(rng: &mut R, depth: usize) -> NbtFile {
    let name = random_name(rng);
    let mut file = NbtFile::with_root_name(name);
    let root = file.root();
    fill_compound(rng, file.tree_mut(), root, depth);
    file
}

fn fill_compound<R: Rng>(rng: &mut R, tree: &mut NbtTree, compound: TagId, depth: usize) {
    for _ in 0 .. rng.gen_range(0 ..= 6) {
        let name = random_name(rng);
        if tree.compound(compound).unwrap().contains_key(&name) {
            continue;
        }

        let tag_type = random_type(rng, depth);
        let tag = random_tag(rng, tree, tag_type, depth);
        tree.set_name(tag, name).unwrap();
        tree.add(compound, tag).unwrap();
    }
}

fn random_tag<R: Rng>(rng: &mut R, tree: &mut NbtTree, tag_type: TagType, depth: usize) -> TagId {
    let value = match tag_type {
        TagType::Byte => TagValue::Byte(rng.gen()),
        TagType::Short => TagValue::Short(rng.gen()),
        TagType::Int => TagValue::Int(rng.gen()),
        TagType::Long => TagValue::Long(rng.gen()),
        TagType::Float => TagValue::Float(rng.gen()),
        TagType::Double => TagValue::Double(rng.gen()),
        TagType::ByteArray => {
            let len = rng.gen_range(0 .. 64);
            TagValue::ByteArray((0 .. len).map(|_| rng.gen()).collect())
        }
        TagType::String => TagValue::String(random_name(rng)),
        TagType::IntArray => {
            let len = rng.gen_range(0 .. 16);
            TagValue::IntArray((0 .. len).map(|_| rng.gen()).collect())
        }
        TagType::List => {
            let list = tree.create(NbtList::new());
            let element_type = random_type(rng, depth - 1);
            tree.set_list_type(list, element_type).unwrap();
            for _ in 0 .. rng.gen_range(0 .. 5) {
                let element = random_tag(rng, tree, element_type, depth - 1);
                tree.push(list, element).unwrap();
            }
            return list;
        }
        TagType::Compound => {
            let compound = tree.create(NbtCompound::new());
            fill_compound(rng, tree, compound, depth - 1);
            return compound;
        }
        TagType::End | TagType::Unknown => unreachable!(),
    };

    tree.create(value)
}

fn random_type<R: Rng>(rng: &mut R, depth: usize) -> TagType {
    let max = if depth == 0 { 0x08 } else { 0x0B };
    loop {
        let id = rng.gen_range(0x01 ..= max);
        match TagType::from_id(id) {
            Some(TagType::List | TagType::Compound) if depth == 0 => continue,
            Some(tag_type) => return tag_type,
            None => continue,
        }
    }
}

fn random_name<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(0 .. 12);
    rng.sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}
