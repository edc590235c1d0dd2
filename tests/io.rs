mod assets;
use assets::*;
use ember_nbt::{
    io::{
        self,
        read_nbt,
        read_nbt_with,
        write_nbt,
        Adler32,
        Flavor,
        NbtIoError,
        Streaming,
        TagProbe,
    },
    NbtCompound,
    NbtFile,
    NbtList,
    NbtTree,
    TagType,
    TagValue,
};
use flate2::{
    read::{GzDecoder, ZlibDecoder},
    write::{GzEncoder, ZlibEncoder},
    Compression,
};
use rand::{rngs::StdRng, SeedableRng};
use std::io::{Cursor, ErrorKind, Read, Write};

#[test]
fn hp_tags_bytes() {
    let file = hp_tags();
    assert_eq!(file.save_to_bytes(Flavor::Uncompressed).unwrap(), HP_TAGS);

    let (tree, root) = read_nbt(&mut Cursor::new(HP_TAGS), Flavor::Uncompressed).unwrap();
    assert_tree_eq(&tree, root, file.tree(), file.root());

    let tags = tree.get(root, "tags").unwrap().unwrap();
    let list = tree.list(tags).unwrap();
    assert_eq!(list.element_type(), TagType::String);
    let values: Vec<_> = list
        .iter()
        .map(|id| tree.tag(id).unwrap().value().as_string().unwrap())
        .collect();
    assert_eq!(values, ["a", "b"]);
}

#[test]
fn big_test() {
    for flavor in all_flavors() {
        let bytes = BIG_TEST.save_to_bytes(flavor).unwrap();
        let (tree, root) = read_nbt(&mut Cursor::new(bytes), flavor).unwrap();

        assert_eq!(tree.tag(root).unwrap().name(), Some("Level"));
        assert_tree_eq(&tree, root, BIG_TEST.tree(), BIG_TEST.root());
    }
}

#[test]
fn member_order_is_preserved() {
    let (tree, root) = read_nbt(
        &mut Cursor::new(BIG_TEST_UNCOMPRESSED.as_slice()),
        Flavor::Uncompressed,
    )
    .unwrap();

    let read: Vec<_> = tree.compound(root).unwrap().names().collect();
    let original: Vec<_> = BIG_TEST
        .tree()
        .compound(BIG_TEST.root())
        .unwrap()
        .names()
        .collect();
    assert_eq!(read, original);
}

#[test]
fn auto_detect() {
    let mut trees = Vec::new();
    for flavor in [
        Flavor::Uncompressed,
        Flavor::GzCompressed,
        Flavor::ZlibCompressed,
    ] {
        let bytes = BIG_TEST.save_to_bytes(flavor).unwrap();
        trees.push(read_nbt(&mut Cursor::new(bytes), Flavor::AutoDetect).unwrap());
    }

    for (tree, root) in &trees {
        assert_tree_eq(tree, *root, &trees[0].0, trees[0].1);
    }
}

#[test]
fn auto_detect_errors() {
    let bytes = BIG_TEST.save_to_bytes(Flavor::GzCompressed).unwrap();
    let result = read_nbt(&mut Streaming::new(bytes.as_slice()), Flavor::AutoDetect);
    assert!(matches!(result, Err(NbtIoError::UnseekableSource)));

    let result = read_nbt(&mut Cursor::new([0x42u8, 0x00]), Flavor::AutoDetect);
    assert!(matches!(
        result,
        Err(NbtIoError::UnrecognizedCompression(Some(0x42)))
    ));

    let result = read_nbt(&mut Cursor::new(Vec::<u8>::new()), Flavor::AutoDetect);
    assert!(matches!(
        result,
        Err(NbtIoError::UnrecognizedCompression(None))
    ));

    let result = write_nbt(
        &mut Vec::<u8>::new(),
        BIG_TEST.tree(),
        BIG_TEST.root(),
        Flavor::AutoDetect,
    );
    assert!(matches!(result, Err(NbtIoError::AutoDetectOnWrite)));
}

#[test]
fn zlib_framing() {
    let raw = BIG_TEST_UNCOMPRESSED.as_slice();

    for (compression, flag) in [
        (Compression::none(), 0x01u8),
        (Compression::fast(), 0x01),
        (Compression::new(4), 0x5E),
        (Compression::default(), 0x9C),
        (Compression::best(), 0xDA),
    ] {
        let bytes = BIG_TEST
            .save_to_bytes(Flavor::ZlibCompressedWith(compression))
            .unwrap();
        assert_eq!(bytes[.. 2], [0x78, flag]);

        let mut adler = Adler32::new();
        adler.update(raw);
        assert_eq!(bytes[bytes.len() - 4 ..], adler.checksum().to_be_bytes());

        let mut inflated = Vec::new();
        ZlibDecoder::new(bytes.as_slice())
            .read_to_end(&mut inflated)
            .unwrap();
        assert_eq!(inflated, raw);
    }
}

#[test]
fn reads_foreign_compression() {
    let raw = BIG_TEST_UNCOMPRESSED.as_slice();

    let mut zlib = ZlibEncoder::new(Vec::new(), Compression::best());
    zlib.write_all(raw).unwrap();
    let zlib = zlib.finish().unwrap();

    let mut gz = GzEncoder::new(Vec::new(), Compression::fast());
    gz.write_all(raw).unwrap();
    let gz = gz.finish().unwrap();

    for bytes in [zlib, gz] {
        let file = NbtFile::from_reader(&mut Cursor::new(bytes), Flavor::AutoDetect).unwrap();
        assert_file_eq(&file, &BIG_TEST);
    }

    let bytes = BIG_TEST.save_to_bytes(Flavor::GzCompressed).unwrap();
    let mut inflated = Vec::new();
    GzDecoder::new(bytes.as_slice())
        .read_to_end(&mut inflated)
        .unwrap();
    assert_eq!(inflated, raw);
}

#[test]
fn zlib_checksum_is_verified() {
    let mut bytes = BIG_TEST.save_to_bytes(Flavor::ZlibCompressed).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    let result = read_nbt(&mut Cursor::new(bytes), Flavor::ZlibCompressed);
    assert!(matches!(result, Err(NbtIoError::ChecksumMismatch { .. })));
}

#[test]
fn gz_trailer_is_verified() {
    let bytes = BIG_TEST.save_to_bytes(Flavor::GzCompressed).unwrap();

    // First byte of the CRC-32
    let mut corrupt = bytes.clone();
    let crc = corrupt.len() - 8;
    corrupt[crc] ^= 0xFF;
    let result = read_nbt(&mut Cursor::new(corrupt), Flavor::GzCompressed);
    assert!(matches!(result, Err(NbtIoError::StdIo(_))));

    let truncated = &bytes[.. bytes.len() - 8];
    let result = read_nbt(&mut Cursor::new(truncated), Flavor::AutoDetect);
    assert!(matches!(result, Err(NbtIoError::StdIo(_))));

    let mut file = hp_tags();
    assert!(file.load_from_bytes(truncated, Flavor::GzCompressed).is_err());
    assert_file_eq(&file, &hp_tags());
}

#[test]
fn zlib_header_is_verified() {
    let mut bytes = BIG_TEST.save_to_bytes(Flavor::ZlibCompressed).unwrap();
    bytes[1] = 0x9D;

    let result = read_nbt(&mut Cursor::new(bytes), Flavor::ZlibCompressed);
    assert!(matches!(
        result,
        Err(NbtIoError::InvalidZlibHeader(0x78, 0x9D))
    ));
}

fn skip_document() -> NbtFile {
    let mut file = NbtFile::with_root_name("doc");
    let root = file.root();
    let tree = file.tree_mut();

    add_named(tree, root, "before", 1i32);

    let skipped = add_named(tree, root, "skipped", NbtCompound::new());
    add_named(tree, skipped, "bytes", vec![7u8; 20_000]);
    add_named(tree, skipped, "ints", vec![-1i32; 300]);
    add_named(tree, skipped, "text", "x".repeat(500));
    let nested = add_named(tree, skipped, "nested", NbtList::new());
    for _ in 0 .. 3 {
        let element = tree.create(NbtList::new());
        tree.push(nested, element).unwrap();
        for value in [1.5f64, 2.5] {
            let double = tree.create(value);
            tree.push(element, double).unwrap();
        }
    }
    let strings = add_named(tree, skipped, "strings", NbtList::new());
    for value in ["p", "q"] {
        let string = tree.create(value);
        tree.push(strings, string).unwrap();
    }

    add_named(tree, root, "after", "still here");
    file
}

fn reject_skipped(probe: &TagProbe<'_>) -> bool {
    probe.name() != Some("skipped")
}

#[test]
fn selector_skips_rejected_tags() {
    let file = skip_document();
    let mut expected = skip_document();
    let root = expected.root();
    let skipped = expected.lookup("skipped").unwrap();
    expected.tree_mut().remove(root, skipped).unwrap();

    for flavor in all_flavors() {
        let bytes = file.save_to_bytes(flavor).unwrap();
        let (tree, root) =
            read_nbt_with(&mut Cursor::new(bytes.as_slice()), flavor, reject_skipped).unwrap();
        assert_tree_eq(&tree, root, expected.tree(), expected.root());

        let mut streaming = Streaming::new(bytes.as_slice());
        let (tree, root) = read_nbt_with(&mut streaming, flavor, reject_skipped).unwrap();
        assert_tree_eq(&tree, root, expected.tree(), expected.root());

        let after = tree.get(root, "after").unwrap().unwrap();
        assert_eq!(tree.tag(after).unwrap().value(), &TagValue::from("still here"));
    }
}

#[test]
fn selector_applies_to_list_elements() {
    let bytes = BIG_TEST.save_to_bytes(Flavor::Uncompressed).unwrap();
    let (tree, root) = read_nbt_with(&mut Cursor::new(bytes), Flavor::Uncompressed, |probe| {
        probe.index() != Some(1)
    })
    .unwrap();

    let longs = tree.get(root, "listTest (long)").unwrap().unwrap();
    let values: Vec<_> = tree
        .list(longs)
        .unwrap()
        .iter()
        .map(|id| tree.tag(id).unwrap().value().as_long().unwrap())
        .collect();
    assert_eq!(values, [11, 13, 14, 15]);

    let compounds = tree.get(root, "listTest (compound)").unwrap().unwrap();
    assert_eq!(tree.list(compounds).unwrap().len(), 1);
}

#[test]
fn selector_sees_names_types_and_paths() {
    let mut seen = Vec::new();
    read_nbt_with(&mut Cursor::new(HP_TAGS), Flavor::Uncompressed, |probe| {
        seen.push((probe.path(), probe.tag_type()));
        true
    })
    .unwrap();

    assert_eq!(seen, [
        ("root.hp".to_owned(), TagType::Int),
        ("root.tags".to_owned(), TagType::List),
        ("root.tags[0]".to_owned(), TagType::String),
        ("root.tags[1]".to_owned(), TagType::String),
    ]);
}

#[test]
fn root_is_exempt_from_selector() {
    let (tree, root) =
        read_nbt_with(&mut Cursor::new(HP_TAGS), Flavor::Uncompressed, |_| false).unwrap();

    assert_eq!(tree.len(), 1);
    assert_eq!(tree.tag(root).unwrap().name(), Some("root"));
    assert!(tree.compound(root).unwrap().is_empty());
}

#[test]
fn negative_lengths() {
    let documents: [&[u8]; 4] = [
        // String name length
        &[0x0A, 0xFF, 0xFF],
        // Byte array
        &[0x0A, 0x00, 0x00, 0x07, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xF0],
        // Int array
        &[0x0A, 0x00, 0x00, 0x0B, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00],
        // List
        &[0x0A, 0x00, 0x00, 0x09, 0x00, 0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFF],
    ];

    for document in documents {
        let result = read_nbt(&mut Cursor::new(document), Flavor::Uncompressed);
        assert!(
            matches!(result, Err(NbtIoError::NegativeLength(_))),
            "{:?}",
            result
        );
    }
}

#[test]
fn malformed_documents() {
    let result = read_nbt(&mut Cursor::new([0x08u8, 0x00, 0x00]), Flavor::Uncompressed);
    assert!(matches!(result, Err(NbtIoError::TagTypeMismatch(0x0A, 0x08))));

    // Long arrays are not part of this format
    let result = read_nbt(
        &mut Cursor::new([0x0Au8, 0x00, 0x00, 0x0C, 0x00, 0x00]),
        Flavor::Uncompressed,
    );
    assert!(matches!(result, Err(NbtIoError::InvalidTagId(0x0C))));

    let result = read_nbt(
        &mut Cursor::new([0x0Au8, 0x00, 0x00, 0x09, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0x00]),
        Flavor::Uncompressed,
    );
    assert!(matches!(result, Err(NbtIoError::InvalidTagId(0xFF))));

    // A list of End tags must be empty
    let result = read_nbt(
        &mut Cursor::new([0x0Au8, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]),
        Flavor::Uncompressed,
    );
    assert!(matches!(result, Err(NbtIoError::InvalidTagId(0x00))));

    let result = read_nbt(
        &mut Cursor::new([
            0x0Au8, 0x00, 0x00, // root
            0x01, 0x00, 0x01, b'x', 0x01, // x
            0x01, 0x00, 0x01, b'x', 0x02, // x again
            0x00,
        ]),
        Flavor::Uncompressed,
    );
    assert!(matches!(result, Err(NbtIoError::DuplicateName(name)) if name == "x"));

    let result = read_nbt(&mut Cursor::new(&HP_TAGS[.. 20]), Flavor::Uncompressed);
    assert!(matches!(result, Err(NbtIoError::StdIo(error)) if error.kind() == ErrorKind::UnexpectedEof));
}

#[test]
fn duplicate_names_are_found_in_skipped_members() {
    let document = [
        0x0Au8, 0x00, 0x00, // root
        0x01, 0x00, 0x01, b'x', 0x01, // byte x
        0x03, 0x00, 0x01, b'x', 0x00, 0x00, 0x00, 0x02, // int x
        0x00,
    ];

    for keep in [TagType::Byte, TagType::Int] {
        let result = read_nbt_with(&mut Cursor::new(document), Flavor::Uncompressed, |probe| {
            probe.tag_type() == keep
        });
        assert!(
            matches!(&result, Err(NbtIoError::DuplicateName(name)) if name == "x"),
            "keeping {:?}",
            keep
        );
    }
}

#[test]
fn huge_declared_length_does_not_allocate() {
    let document = [
        0x0Au8, 0x00, 0x00, 0x07, 0x00, 0x00, 0x7F, 0xFF, 0xFF, 0xFF, 0x01, 0x02,
    ];
    let result = read_nbt(&mut Cursor::new(document), Flavor::Uncompressed);
    assert!(matches!(result, Err(NbtIoError::StdIo(_))));
}

#[test]
fn list_types_on_write() {
    let mut file = NbtFile::new();
    let root = file.root();
    add_named(file.tree_mut(), root, "empty", NbtList::new());

    let result = file.save_to_bytes(Flavor::Uncompressed);
    assert!(matches!(result, Err(NbtIoError::UnknownListType)));

    let empty = file.lookup("empty").unwrap();
    file.tree_mut().set_list_type(empty, TagType::End).unwrap();
    let bytes = file.save_to_bytes(Flavor::Uncompressed).unwrap();
    assert_eq!(bytes, [
        0x0A, 0x00, 0x00, // root
        0x09, 0x00, 0x05, b'e', b'm', b'p', b't', b'y', 0x00, 0x00, 0x00, 0x00, 0x00, // empty
        0x00,
    ]);

    let read = NbtFile::from_reader(&mut Cursor::new(bytes), Flavor::Uncompressed).unwrap();
    let empty = read.lookup("empty").unwrap();
    assert_eq!(read.tree().list(empty).unwrap().element_type(), TagType::End);
}

#[test]
fn unnamed_root() {
    let mut tree = NbtTree::new();
    let root = tree.create(NbtCompound::new());
    let result = write_nbt(&mut Vec::<u8>::new(), &tree, root, Flavor::Uncompressed);
    assert!(matches!(result, Err(NbtIoError::UnnamedRoot)));

    let not_compound = tree.create_named("x", 1i32);
    let result = write_nbt(&mut Vec::<u8>::new(), &tree, not_compound, Flavor::Uncompressed);
    assert!(matches!(result, Err(NbtIoError::TagTypeMismatch(0x0A, 0x03))));
}

#[test]
fn special_values_survive() {
    let mut file = NbtFile::with_root_name("");
    let root = file.root();
    let tree = file.tree_mut();
    add_named(tree, root, "nan", f64::NAN);
    add_named(tree, root, "negative zero", -0.0f32);
    add_named(tree, root, "unicode", "a\u{E9}\u{65E5}\u{10401}");
    add_named(tree, root, "", 0xFFu8);

    let bytes = file.save_to_bytes(Flavor::GzCompressed).unwrap();
    let read = NbtFile::from_reader(&mut Cursor::new(bytes), Flavor::GzCompressed).unwrap();
    assert_file_eq(&read, &file);

    let nan = read.lookup("nan").unwrap();
    assert!(read.tree().tag(nan).unwrap().value().as_double().unwrap().is_nan());
}

#[test]
fn random_round_trips() {
    let mut rng = StdRng::seed_from_u64(0x4E42_5421);

    for _ in 0 .. 25 {
        let file = random_file(&mut rng, 4);
        for flavor in all_flavors() {
            let bytes = file.save_to_bytes(flavor).unwrap();
            let read = NbtFile::from_reader(&mut Cursor::new(bytes), flavor).unwrap();
            assert_file_eq(&read, &file);
        }
    }
}

#[test]
fn root_name_only() {
    for flavor in all_flavors() {
        let bytes = BIG_TEST.save_to_bytes(flavor).unwrap();
        let name = NbtFile::read_root_tag_name(&mut Cursor::new(bytes.as_slice()), flavor).unwrap();
        assert_eq!(name, "Level");

        let name = io::read_root_name(&mut Streaming::new(bytes.as_slice()), flavor).unwrap();
        assert_eq!(name, "Level");
    }
}

#[test]
fn files() {
    let path = std::env::temp_dir().join(format!("ember_nbt_files_{}.dat", std::process::id()));

    BIG_TEST.save_to_file(&path, Flavor::GzCompressed).unwrap();
    assert_eq!(
        NbtFile::read_root_tag_name_from_file(&path, Flavor::AutoDetect).unwrap(),
        "Level"
    );

    let mut file = NbtFile::new();
    file.load_from_file(&path, Flavor::AutoDetect).unwrap();
    assert_file_eq(&file, &BIG_TEST);

    file.load_with_selector(
        &mut std::io::BufReader::new(std::fs::File::open(&path).unwrap()),
        Flavor::AutoDetect,
        |probe| probe.tag_type() != TagType::Compound,
    )
    .unwrap();
    assert!(file.lookup("nested compound test").is_err());
    assert!(file.lookup("intTest").is_ok());

    std::fs::remove_file(&path).unwrap();
    assert!(matches!(
        file.load_from_file(&path, Flavor::AutoDetect),
        Err(NbtIoError::StdIo(_))
    ));
}

#[test]
fn failed_load_keeps_document() {
    let mut file = hp_tags();
    let result = file.load_from_bytes(&HP_TAGS[.. HP_TAGS.len() - 1], Flavor::Uncompressed);
    assert!(result.is_err());
    assert_file_eq(&file, &hp_tags());
}

#[test]
fn rename_root() {
    let mut file = hp_tags();
    file.rename_root_tag("renamed").unwrap();
    assert_eq!(file.root_name(), "renamed");

    let bytes = file.save_to_bytes(Flavor::Uncompressed).unwrap();
    assert_eq!(bytes[1 .. 10], [0x00, 0x07, b'r', b'e', b'n', b'a', b'm', b'e', b'd']);
}
