//! Integration tests for the data type layer
//!
//! Exercises the public API across integers, fixed point, floating point,
//! conversion and masks.

use isasim_types::{
    bfloat16, convert, half, sint8, to_f64, to_i128, uint8, BitMask, DataType, DataTypeError,
    Fixed, FloatFormat, Floating, Format, Native, SInt, Scalar, UInt,
};

// ============================================================================
// Integer Tests
// ============================================================================

#[test]
fn test_uint8_operator_table() {
    let a = UInt::with_value(8, 8).unwrap();
    let b = UInt::with_value(8, 10).unwrap();

    assert!((a.clone() + b.clone()) == 18);
    assert!((a.clone() - b.clone()) == 254);
    assert!((a.clone() * b.clone()) == 80);
    assert!((a.clone() / b.clone()) == 0);
    assert!((a.clone() % b.clone()) == 8);
    assert_eq!(a.to_hex(), "0x8");
}

#[test]
fn test_signed_wraparound() {
    let a = SInt::with_value(8, -5).unwrap();
    let b = SInt::with_value(8, 4).unwrap();
    let c = a + b;
    assert_eq!(c.to_native().unwrap(), Native::Int(-1));
    assert_eq!(c.raw().unwrap().to_u64(), 0xFF);
    assert_eq!(format!("{:?}", c), "SInt(-1)");
}

#[test]
fn test_generic_over_data_type() {
    fn low_nibble<T: DataType>(v: &T) -> UInt {
        v.field(3, 0).unwrap()
    }

    assert!(low_nibble(&uint8(0xAB)) == 0xB);
    assert!(low_nibble(&sint8(-1)) == 0xF);
    assert!(low_nibble(&half(1.0)) == 0);
    assert!(low_nibble(&UInt::new(8).unwrap()).is_x());
}

#[test]
fn test_wide_integers() {
    let a = UInt::with_value(200, 1).unwrap();
    let shifted = a << 199;
    assert!(shifted.msb().unwrap());
    let back = shifted >> 199;
    assert!(back == 1);

    let big = UInt::with_value(256, i128::MAX).unwrap();
    let sum = big.clone() + big.clone();
    // 2^128 - 2 fits the width but not the host integer
    assert!(matches!(
        sum.to_native(),
        Err(DataTypeError::NotRepresentable { target: "i128", .. })
    ));
    assert_eq!(sum.raw().unwrap().count_ones(), 127);
}

// ============================================================================
// Conversion Tests
// ============================================================================

#[test]
fn test_convert_examples() {
    assert_eq!(to_f64(&UInt::with_value(8, 8).unwrap()).unwrap(), 8.0);
    assert_eq!(to_i128(&bfloat16(1.5)).unwrap(), 1);

    let f = convert(Floating::from_format(FloatFormat::SINGLE), &sint8(-7)).unwrap();
    assert!(f == -7.0);

    let q = convert(Fixed::new(16, 8, true).unwrap(), &f).unwrap();
    assert_eq!(q.to_native().unwrap(), Native::Float(-7.0));
}

#[test]
fn test_x_state_rules() {
    let x = UInt::new(16).unwrap();
    assert!((x.clone() + uint8(1).resize(16).unwrap()).is_x());
    assert!(x.try_cmp(&x).unwrap_err().is_unknown());
    assert!(matches!(
        x.to_native(),
        Err(DataTypeError::UnknownValue { .. })
    ));

    let mut target = UInt::new(16).unwrap();
    target.set_field(15, 8, &uint8(0x12)).unwrap();
    assert!(target == 0x1200);
    target.set_field(7, 0, &UInt::new(8).unwrap()).unwrap();
    assert!(target == 0x1200);
}

// ============================================================================
// Scalar and Mask Tests
// ============================================================================

#[test]
fn test_runtime_formats() {
    let formats = [
        Format::UInt(8),
        Format::SInt(8),
        Format::Fixed(isasim_types::FixedFormat::new(8, 4, true).unwrap()),
        Format::Floating(FloatFormat::FP8_E4M3),
    ];
    for format in formats {
        let v: Scalar = format.value(-2).unwrap();
        assert_eq!(v.kind(), format);
        assert_eq!(v.width(), 8);
    }
    assert_eq!(
        Format::SInt(8).value(-2).unwrap().to_native().unwrap(),
        Native::Int(-2)
    );
    assert_eq!(
        Format::Floating(FloatFormat::FP8_E4M3).value(-2).unwrap().to_native().unwrap(),
        Native::Float(-2.0)
    );
}

#[test]
fn test_decode_table() {
    // ADD (immediate), 64-bit: sf=1 op=0 S=0 100010
    let add_imm: BitMask = "1001_0001_0xxx_xxxx_xxxx_xxxx_xxxx_xxxx".parse().unwrap();
    let insn = UInt::with_value(32, 0x9100_0420u32 as i64).unwrap();
    assert!(add_imm.matches(&insn));
    let sub = UInt::with_value(32, 0xD100_0420u32 as i64).unwrap();
    assert!(!add_imm.matches(&sub));
}
