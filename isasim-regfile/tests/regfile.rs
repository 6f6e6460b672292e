//! Integration tests for the AArch64 register file

use isasim_regfile::{
    ArmRegFile, InitStrategy, RegFileConfig, RegFileError, RegFileImage, GPR_COUNT,
    PREDICATE_COUNT, VECTOR_COUNT, ZERO_REGISTER,
};
use isasim_types::{half, uint32, uint64, DataType, Native, SInt, UInt};

fn native(v: &UInt) -> i128 {
    v.to_native().unwrap().as_i128().unwrap()
}

#[test]
fn test_all_registers_addressable() {
    let mut rf = ArmRegFile::new(RegFileConfig::DEFAULT).unwrap();
    for n in 0..GPR_COUNT {
        rf.write_r(n, 64, &uint64(n as i128)).unwrap();
    }
    for n in 0..GPR_COUNT {
        assert_eq!(native(&rf.read_r(n, 64).unwrap()), n as i128);
    }
    for n in 0..VECTOR_COUNT {
        rf.write_v(n, 32, &uint32(n as i128)).unwrap();
        assert_eq!(native(&rf.read_z(n, 32).unwrap()), n as i128);
    }
    for n in 0..PREDICATE_COUNT {
        assert!(rf.read_p(n, 32).unwrap() == 0xFFFF_FFFF);
    }
    assert!(rf.read_p(PREDICATE_COUNT, 8).is_err());
    assert!(rf.read_z(VECTOR_COUNT, 8).is_err());
}

#[test]
fn test_zero_register_ignores_writes() {
    let mut rf = ArmRegFile::new(RegFileConfig::DEFAULT).unwrap();
    rf.write_r(ZERO_REGISTER, 64, &uint64(-1)).unwrap();
    assert_eq!(rf.read_r(ZERO_REGISTER, 64).unwrap().to_native().unwrap(), Native::Int(0));
}

#[test]
fn test_write_any_data_type() {
    let mut rf = ArmRegFile::new(RegFileConfig::DEFAULT).unwrap();
    // FP scalar in the low half of V0
    rf.write_v(0, 16, &half(1.0)).unwrap();
    assert!(rf.read_v(0, 16).unwrap() == 0x3C00);

    // Signed value into a W register, then read back as X
    rf.write_r(4, 32, &SInt::with_value(32, -1).unwrap()).unwrap();
    assert!(rf.read_r(4, 64).unwrap() == 0xFFFF_FFFF);
}

#[test]
fn test_predicate_configurations() {
    let cases = [
        (InitStrategy::AllTrue, Some(0xFFFF_FFFF)),
        (InitStrategy::AllFalse, Some(0)),
        (InitStrategy::Unknown, None),
    ];
    for (strategy, expected) in cases {
        let config = RegFileConfig::DEFAULT.with_predicate_init(strategy);
        let rf = ArmRegFile::new(config).unwrap();
        let p = rf.read_p(0, 32).unwrap();
        match expected {
            Some(v) => assert!(p == v, "{}: {:?}", strategy, p),
            None => assert!(p.is_x()),
        }
    }
}

#[test]
fn test_vector_lengths() {
    for vl in (128..=2048).step_by(128) {
        let mut rf = ArmRegFile::with_vector_length(vl).unwrap();
        assert_eq!(rf.lane_count(8).unwrap(), (vl / 8) as usize);
        let last = rf.lane_count(64).unwrap() - 1;
        rf.write_z_lane(0, 64, last, &uint64(7)).unwrap();
        assert!(rf.read_z(0, vl).unwrap().msb().is_ok());
        assert!(rf.predicate_active(0, 64, last).unwrap());
    }
    assert!(matches!(
        ArmRegFile::with_vector_length(2176),
        Err(RegFileError::InvalidVectorLength(2176))
    ));
}

#[test]
fn test_image_round_trip_preserves_x() {
    let config = RegFileConfig::DEFAULT
        .with_vector_length(512)
        .with_predicate_init(InitStrategy::Random)
        .with_seed(77);
    let mut rf = ArmRegFile::new(config).unwrap();
    rf.write_r(7, 64, &uint64(0x7777)).unwrap();
    rf.write_z_lane(3, 32, 15, &uint32(0xABCD)).unwrap();

    let bytes = rf.snapshot().to_bytes().unwrap();
    let image = RegFileImage::from_bytes(&bytes).unwrap();

    let mut restored = ArmRegFile::with_vector_length(512).unwrap();
    restored.restore(&image).unwrap();
    assert!(restored.read_r(7, 64).unwrap() == 0x7777);
    assert!(restored.read_r(8, 64).unwrap().is_x());
    assert!(restored.read_z_lane(3, 32, 15).unwrap() == 0xABCD);
    for p in 0..PREDICATE_COUNT {
        assert_eq!(
            restored.predicate(p).unwrap().value().bits(),
            rf.predicate(p).unwrap().value().bits()
        );
    }
}
