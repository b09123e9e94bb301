use crate::{ArithmeticOp, ComparisonOp, Constant, ConstantError, DataType};

#[test]
fn modulo_compare_folds_to_false() {
    let rem = Constant::Integer(5999)
        .operate(ArithmeticOp::Modulo, &Constant::Integer(34))
        .unwrap();
    assert_eq!(rem, Constant::Long(15));
    assert!(!rem.compare(ComparisonOp::Eq, &Constant::Integer(0)).unwrap());
}

#[test]
fn integral_addition_promotes_to_long() {
    let sum = Constant::Integer(12345)
        .operate(ArithmeticOp::Add, &Constant::Integer(1))
        .unwrap();
    assert_eq!(sum, Constant::Long(12346));
}

#[test]
fn double_operand_yields_double() {
    let product = Constant::Integer(3)
        .operate(ArithmeticOp::Multiply, &Constant::Double(0.5))
        .unwrap();
    assert_eq!(product, Constant::Double(1.5));
}

#[test]
fn division_by_zero_is_a_fault() {
    let err = Constant::Long(1)
        .operate(ArithmeticOp::Divide, &Constant::Integer(0))
        .unwrap_err();
    assert_eq!(err, ConstantError::ArithmeticFault("division by zero".into()));
    assert!(err.is_arithmetic());

    let err = Constant::Double(1.0)
        .operate(ArithmeticOp::Modulo, &Constant::Double(0.0))
        .unwrap_err();
    assert!(matches!(err, ConstantError::ArithmeticFault(_)));
}

#[test]
fn long_overflow_is_reported() {
    let err = Constant::Long(i64::MAX)
        .operate(ArithmeticOp::Add, &Constant::Integer(1))
        .unwrap_err();
    assert_eq!(err, ConstantError::Overflow(DataType::Long));

    let err = Constant::Long(i64::MIN)
        .operate(ArithmeticOp::Divide, &Constant::Long(-1))
        .unwrap_err();
    assert_eq!(err, ConstantError::Overflow(DataType::Long));
}

#[test]
fn null_operand_yields_null() {
    let result = Constant::Null
        .operate(ArithmeticOp::Add, &Constant::Integer(1))
        .unwrap();
    assert_eq!(result, Constant::Null);
}

#[test]
fn datetime_arithmetic() {
    let shifted = Constant::Datetime(1_000)
        .operate(ArithmeticOp::Add, &Constant::Integer(500))
        .unwrap();
    assert_eq!(shifted, Constant::Datetime(1_500));

    let elapsed = Constant::Datetime(5_000)
        .operate(ArithmeticOp::Subtract, &Constant::Datetime(2_000))
        .unwrap();
    assert_eq!(elapsed, Constant::Long(3_000));
}

#[test]
fn string_arithmetic_is_a_type_error() {
    let err = Constant::from("a")
        .operate(ArithmeticOp::Add, &Constant::from("b"))
        .unwrap_err();
    assert!(matches!(err, ConstantError::TypeMismatch { .. }));
    assert_eq!(err.to_string(), "incompatible types STRING and STRING for `+`");
}

#[test]
fn compare_widens_numerics() {
    assert!(Constant::Byte(3)
        .compare(ComparisonOp::Lt, &Constant::Double(3.5))
        .unwrap());
    assert!(Constant::Long(7)
        .compare(ComparisonOp::Eq, &Constant::Short(7))
        .unwrap());
    assert!(Constant::Datetime(10)
        .compare(ComparisonOp::Gte, &Constant::Integer(10))
        .unwrap());
}

#[test]
fn compare_null_semantics() {
    let null = Constant::Null;
    assert!(null.compare(ComparisonOp::Eq, &Constant::Null).unwrap());
    assert!(!null.compare(ComparisonOp::Neq, &Constant::Null).unwrap());
    assert!(!null.compare(ComparisonOp::Eq, &Constant::Integer(1)).unwrap());
    assert!(null.compare(ComparisonOp::Neq, &Constant::Integer(1)).unwrap());
    assert!(!null.compare(ComparisonOp::Lt, &Constant::Integer(1)).unwrap());
    assert!(!Constant::Integer(1)
        .compare(ComparisonOp::Gte, &Constant::Null)
        .unwrap());
}

#[test]
fn compare_booleans_only_for_equality() {
    let t = Constant::Boolean(true);
    assert!(t.compare(ComparisonOp::Neq, &Constant::Boolean(false)).unwrap());
    let err = t
        .compare(ComparisonOp::Lt, &Constant::Boolean(false))
        .unwrap_err();
    assert!(matches!(err, ConstantError::TypeMismatch { .. }));
}

#[test]
fn compare_strings_lexicographically() {
    assert!(Constant::from("apple")
        .compare(ComparisonOp::Lt, &Constant::from("banana"))
        .unwrap());
    assert!(Constant::from("b")
        .compare(ComparisonOp::Gt, &Constant::from("abc"))
        .unwrap());
}

#[test]
fn compare_incompatible_lanes_fails() {
    let err = Constant::from("1")
        .compare(ComparisonOp::Eq, &Constant::Integer(1))
        .unwrap_err();
    assert!(matches!(err, ConstantError::TypeMismatch { .. }));
}

#[test]
fn nan_only_satisfies_not_equal() {
    let nan = Constant::Double(f64::NAN);
    assert!(!nan.compare(ComparisonOp::Eq, &nan).unwrap());
    assert!(nan.compare(ComparisonOp::Neq, &nan).unwrap());
    assert!(!nan.compare(ComparisonOp::Lt, &Constant::Double(1.0)).unwrap());
}

#[test]
fn negate_checks_range() {
    assert_eq!(Constant::Integer(5).negate().unwrap(), Constant::Integer(-5));
    assert_eq!(
        Constant::Byte(i8::MIN).negate().unwrap_err(),
        ConstantError::Overflow(DataType::Byte)
    );
    assert_eq!(Constant::Null.negate().unwrap(), Constant::Null);
    assert!(Constant::from("x").negate().is_err());
}

#[test]
fn string_literal_strips_and_collapses_quotes() {
    assert_eq!(
        Constant::string_literal("'it''s'"),
        Constant::String("it's".into())
    );
    assert_eq!(
        Constant::string_literal("\"plain\""),
        Constant::String("plain".into())
    );
}

#[test]
fn integer_literal_picks_width() {
    assert_eq!(Constant::integer_literal(42), Constant::Integer(42));
    assert_eq!(
        Constant::integer_literal(i64::from(i32::MAX) + 1),
        Constant::Long(2_147_483_648)
    );
}

#[test]
fn cast_to_null_is_illegal() {
    let err = Constant::Integer(1).cast(DataType::Null).unwrap_err();
    assert_eq!(
        err,
        ConstantError::IllegalCast {
            from: DataType::Integer,
            to: DataType::Null
        }
    );
}

#[test]
fn cast_null_stays_null() {
    assert_eq!(Constant::Null.cast(DataType::Long).unwrap(), Constant::Null);
}

#[test]
fn cast_parses_strings() {
    assert_eq!(
        Constant::from(" 42 ").cast(DataType::Integer).unwrap(),
        Constant::Integer(42)
    );
    assert_eq!(
        Constant::from("TRUE").cast(DataType::Boolean).unwrap(),
        Constant::Boolean(true)
    );
    assert_eq!(
        Constant::from("2.5e1").cast(DataType::Double).unwrap(),
        Constant::Double(25.0)
    );
    assert_eq!(
        Constant::from("1970-01-02").cast(DataType::Datetime).unwrap(),
        Constant::Datetime(86_400_000)
    );
    assert_eq!(
        Constant::from("1970-01-01T00:00:01.500Z")
            .cast(DataType::Datetime)
            .unwrap(),
        Constant::Datetime(1_500)
    );
    assert_eq!(
        Constant::from("1970-01-01 00:01:00")
            .cast(DataType::Datetime)
            .unwrap(),
        Constant::Datetime(60_000)
    );
}

#[test]
fn cast_malformed_string() {
    let err = Constant::from("12x").cast(DataType::Long).unwrap_err();
    assert_eq!(err.to_string(), "cannot parse '12x' as LONG");
    assert!(Constant::from("yes").cast(DataType::Boolean).is_err());
    assert!(Constant::from("soon").cast(DataType::Datetime).is_err());
}

#[test]
fn cast_narrowing_is_range_checked() {
    assert_eq!(
        Constant::Long(300).cast(DataType::Byte).unwrap_err(),
        ConstantError::Overflow(DataType::Byte)
    );
    assert_eq!(
        Constant::Long(-300).cast(DataType::Short).unwrap(),
        Constant::Short(-300)
    );
}

#[test]
fn cast_double_truncates_toward_zero() {
    assert_eq!(
        Constant::Double(-2.9).cast(DataType::Integer).unwrap(),
        Constant::Integer(-2)
    );
    assert_eq!(
        Constant::Double(f64::INFINITY)
            .cast(DataType::Long)
            .unwrap_err(),
        ConstantError::Overflow(DataType::Long)
    );
    assert!(Constant::Double(1e19).cast(DataType::Long).is_err());
}

#[test]
fn cast_boolean_numeric() {
    assert_eq!(
        Constant::Boolean(true).cast(DataType::Long).unwrap(),
        Constant::Long(1)
    );
    assert_eq!(
        Constant::Integer(0).cast(DataType::Boolean).unwrap(),
        Constant::Boolean(false)
    );
    assert_eq!(
        Constant::Double(0.1).cast(DataType::Boolean).unwrap(),
        Constant::Boolean(true)
    );
}

#[test]
fn cast_boolean_datetime_is_illegal() {
    assert!(matches!(
        Constant::Boolean(true).cast(DataType::Datetime),
        Err(ConstantError::IllegalCast { .. })
    ));
    assert!(matches!(
        Constant::Datetime(0).cast(DataType::Boolean),
        Err(ConstantError::IllegalCast { .. })
    ));
}

#[test]
fn cast_to_string() {
    assert_eq!(
        Constant::Datetime(1_500).cast(DataType::String).unwrap(),
        Constant::from("1970-01-01T00:00:01.500Z")
    );
    assert_eq!(
        Constant::Integer(-7).cast(DataType::String).unwrap(),
        Constant::from("-7")
    );
    assert_eq!(
        Constant::Boolean(false).cast(DataType::String).unwrap(),
        Constant::from("false")
    );
}

#[test]
fn cast_datetime_integral() {
    assert_eq!(
        Constant::Long(86_400_000).cast(DataType::Datetime).unwrap(),
        Constant::Datetime(86_400_000)
    );
    assert_eq!(
        Constant::Datetime(42).cast(DataType::Long).unwrap(),
        Constant::Long(42)
    );
}

#[test]
fn truthiness() {
    assert!(Constant::Boolean(true).is_truthy());
    assert!(!Constant::Integer(0).is_truthy());
    assert!(Constant::Double(0.5).is_truthy());
    assert!(!Constant::Null.is_truthy());
}

#[test]
fn serializes_adjacently_tagged() {
    let json = serde_json::to_string(&Constant::Long(5)).unwrap();
    assert_eq!(json, r#"{"type":"LONG","value":5}"#);
    let back: Constant = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Constant::Long(5));
    assert_eq!(
        serde_json::to_string(&Constant::Null).unwrap(),
        r#"{"type":"NULL"}"#
    );
}

#[test]
fn non_finite_doubles_serialize_as_names() {
    let json = serde_json::to_string(&Constant::Double(f64::NEG_INFINITY)).unwrap();
    assert_eq!(json, r#"{"type":"DOUBLE","value":"-Infinity"}"#);

    let back: Constant = serde_json::from_str(r#"{"type":"DOUBLE","value":"NaN"}"#).unwrap();
    assert!(matches!(back, Constant::Double(v) if v.is_nan()));
    let back: Constant = serde_json::from_str(r#"{"type":"DOUBLE","value":2}"#).unwrap();
    assert_eq!(back, Constant::Double(2.0));

    let err = serde_json::from_str::<Constant>(r#"{"type":"DOUBLE","value":"lots"}"#);
    assert!(err.is_err());
}
