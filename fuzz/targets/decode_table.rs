#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use biffkit::{
    biff::{ByteCursor, FieldOptions, HashAlgorithm, WireKind},
    read_table, write_table, GameItem, RecoveryPolicy, Vertex3D,
};

#[derive(Debug, Arbitrary)]
enum FuzzKind {
    Int,
    Float,
    Bool,
    StringNarrow,
    StringWide,
    Vertex2D,
    Vertex3D { padded: bool },
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    data: Vec<u8>,
    kind: FuzzKind,
    skip_errors: bool,
    /// Позиция мишени, которая пишется перед произвольными данными.
    prefix: Option<Vertex3D>,
}

fn encode(items: &[GameItem]) -> Vec<u8> {
    let mut out = Vec::new();
    write_table(items, &mut out, HashAlgorithm::Crc32).expect("encoding loaded items failed");
    out
}

fuzz_target!(|input: FuzzInput| {
    // Одиночное значение: декодер не должен паниковать ни на каких данных.
    let (kind, options) = match input.kind {
        FuzzKind::Int => (WireKind::Int, FieldOptions::default()),
        FuzzKind::Float => (WireKind::Float, FieldOptions::default()),
        FuzzKind::Bool => (WireKind::Bool, FieldOptions::default()),
        FuzzKind::StringNarrow => (WireKind::StringNarrow, FieldOptions::default()),
        FuzzKind::StringWide => (WireKind::StringWide, FieldOptions::default()),
        FuzzKind::Vertex2D => (WireKind::Vertex2D, FieldOptions::default()),
        FuzzKind::Vertex3D { padded } => (WireKind::Vertex3D, FieldOptions { padded }),
    };
    let _ = kind.decode_value(options, &mut ByteCursor::new(&input.data));

    let mut bytes = Vec::new();
    if let Some(position) = input.prefix {
        let mut target = biffkit::HitTargetData::new("fuzz", 0.0, 0.0);
        target.position = position;
        bytes = encode(&[target.into()]);
    }
    bytes.extend_from_slice(&input.data);

    let policy = if input.skip_errors {
        RecoveryPolicy::Skip
    } else {
        RecoveryPolicy::Abort
    };

    // Загруженные объекты после перезаписи и повторной загрузки дают те же
    // байты. Сравнение по байтам: NaN в полях ломает PartialEq.
    if let Ok((items, _)) = read_table(&bytes, policy) {
        let first = encode(&items);
        let (reloaded, _) = read_table(&first, RecoveryPolicy::Abort).expect("re-read failed");
        assert_eq!(encode(&reloaded), first);
    }
});
