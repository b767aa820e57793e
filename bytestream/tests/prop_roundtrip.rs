use bytestream::{ByteError, ByteReader, ByteWriter};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    U8(u8),
    Bool(bool),
    I16(i16),
    I32(i32),
    F32(f32),
    VarU32(u32),
    Str(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::U8),
        any::<bool>().prop_map(Op::Bool),
        any::<i16>().prop_map(Op::I16),
        any::<i32>().prop_map(Op::I32),
        any::<f32>()
            .prop_filter("NaN never compares equal", |v| !v.is_nan())
            .prop_map(Op::F32),
        any::<u32>().prop_map(Op::VarU32),
        ".{0,64}".prop_map(Op::Str),
    ]
}

fn write_ops(ops: &[Op]) -> Vec<u8> {
    let mut writer = ByteWriter::new();
    for op in ops {
        match op {
            Op::U8(v) => writer.write_u8(*v),
            Op::Bool(v) => writer.write_bool(*v),
            Op::I16(v) => writer.write_i16(*v),
            Op::I32(v) => writer.write_i32(*v),
            Op::F32(v) => writer.write_f32(*v),
            Op::VarU32(v) => writer.write_var_u32(*v),
            Op::Str(v) => writer.write_string(v).unwrap(),
        }
    }
    writer.finish()
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let bytes = write_ops(&ops);
        let mut reader = ByteReader::new(&bytes);

        for op in &ops {
            match op {
                Op::U8(v) => prop_assert_eq!(reader.read_u8().unwrap(), *v),
                Op::Bool(v) => prop_assert_eq!(reader.read_bool().unwrap(), *v),
                Op::I16(v) => prop_assert_eq!(reader.read_i16().unwrap(), *v),
                Op::I32(v) => prop_assert_eq!(reader.read_i32().unwrap(), *v),
                Op::F32(v) => prop_assert_eq!(reader.read_f32().unwrap().to_bits(), v.to_bits()),
                Op::VarU32(v) => prop_assert_eq!(reader.read_var_u32().unwrap(), *v),
                Op::Str(v) => prop_assert_eq!(&reader.read_string(usize::MAX).unwrap(), v),
            }
        }
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn prop_truncation_is_an_error_not_a_panic(
        ops in prop::collection::vec(op_strategy(), 1..16),
        cut in any::<prop::sample::Index>(),
    ) {
        let bytes = write_ops(&ops);
        let cut = cut.index(bytes.len());
        let mut reader = ByteReader::new(&bytes[..cut]);

        let mut failed = false;
        for op in &ops {
            let result = match op {
                Op::U8(_) => reader.read_u8().map(drop),
                Op::Bool(_) => reader.read_bool().map(drop),
                Op::I16(_) => reader.read_i16().map(drop),
                Op::I32(_) => reader.read_i32().map(drop),
                Op::F32(_) => reader.read_f32().map(drop),
                Op::VarU32(_) => reader.read_var_u32().map(drop),
                Op::Str(_) => reader.read_string(usize::MAX).map(drop),
            };
            if let Err(err) = result {
                prop_assert!(matches!(err, ByteError::UnexpectedEof { .. }), "expected UnexpectedEof, got {:?}", err);
                failed = true;
                break;
            }
        }
        prop_assert!(failed, "reading a strict prefix must fail somewhere");
    }
}
