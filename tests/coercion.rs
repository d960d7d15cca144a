use indoc::indoc;
use saphyr_unity::parse_scalars::{coerce, parse_bool, parse_float, parse_int, ScalarKind};
use saphyr_unity::{decodable, from_str, Catalogue, Error, Value};

decodable! {
    pub struct Gauge as "Gauge" {
        pub enabled: bool => "m_Enabled": Bool,
        pub count: i32 => "m_Count": Int32,
        pub weight: f32 => "m_Weight": Float32,
        pub label: String => "m_Label": Str,
        pub legacy: i32 => "m_Legacy": Int,
    }
}

fn catalogue() -> Catalogue {
    Catalogue::new().with::<Gauge>("!gauge").unwrap()
}

#[test]
fn integers_convert_to_booleans_by_nonzero_test() {
    assert!(parse_bool("1").unwrap());
    assert!(!parse_bool("0").unwrap());
    assert!(parse_bool("2").unwrap());
    assert!(parse_bool("-1").unwrap());
    assert!(!parse_bool("-0").unwrap());
}

#[test]
fn boolean_literals_are_accepted_verbatim() {
    assert!(parse_bool("true").unwrap());
    assert!(!parse_bool("false").unwrap());
    for raw in ["yes", "no", "on", "True", "1.0", ""] {
        assert!(
            matches!(parse_bool(raw), Err(Error::UnsupportedScalarCoercion { .. })),
            "{raw:?} should not be a boolean"
        );
    }
}

#[test]
fn integer_forms() {
    assert_eq!(parse_int("42").unwrap(), 42);
    assert_eq!(parse_int("-7").unwrap(), -7);
    assert_eq!(parse_int("0x10").unwrap(), 16);
    assert_eq!(parse_int("0b101").unwrap(), 5);
    assert!(parse_int("4.5").is_err());
    assert!(parse_int("twelve").is_err());
}

#[test]
fn float_forms() {
    assert_eq!(parse_float("0.5").unwrap(), 0.5);
    assert_eq!(parse_float("1").unwrap(), 1.0);
    assert_eq!(parse_float("1e3").unwrap(), 1000.0);
    assert!(parse_float(".nan").unwrap().is_nan());
    assert_eq!(parse_float("-.inf").unwrap(), f64::NEG_INFINITY);
    assert!(parse_float("bright").is_err());
}

#[test]
fn strings_take_the_raw_text() {
    match coerce("0012", ScalarKind::Str).unwrap() {
        Value::Str(s) => assert_eq!(s, "0012"),
        other => panic!("unexpected value: {other:?}"),
    }
}

#[test]
fn scalar_properties_are_coerced_on_load() {
    let yaml = indoc! {"
        --- !gauge &1
        Gauge:
          m_Enabled: 1
          m_Count: 12
          m_Weight: 2
          m_Label: 0012
    "};
    let scene = from_str(yaml, &catalogue()).unwrap();
    let gauge = scene.of_type::<Gauge>().next().unwrap();
    assert!(gauge.enabled);
    assert_eq!(gauge.count, 12);
    assert_eq!(gauge.weight, 2.0);
    assert_eq!(gauge.label, "0012");
}

#[test]
fn failed_coercion_aborts_with_location() {
    let yaml = indoc! {"
        --- !gauge &1
        Gauge:
          m_Enabled: maybe
    "};
    let err = from_str(yaml, &catalogue()).unwrap_err();
    match err.root_cause() {
        Error::UnsupportedScalarCoercion { value, target, .. } => {
            assert_eq!(value, "maybe");
            assert_eq!(*target, "bool");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let location = err.location().expect("location of the bad scalar");
    assert_eq!(location.line(), 3);
}

#[test]
fn out_of_range_integer_is_a_coercion_error() {
    let yaml = indoc! {"
        --- !gauge &1
        Gauge:
          m_Count: 9999999999
    "};
    let err = from_str(yaml, &catalogue()).unwrap_err();
    match err.root_cause() {
        Error::UnsupportedScalarCoercion { value, target, .. } => {
            assert_eq!(value, "9999999999");
            assert_eq!(*target, "i32");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.location().map(|l| l.line()), Some(3));
}

#[test]
fn finite_float_beyond_single_precision_is_a_coercion_error() {
    let yaml = indoc! {"
        --- !gauge &1
        Gauge:
          m_Weight: 1e300
    "};
    let err = from_str(yaml, &catalogue()).unwrap_err();
    assert!(
        matches!(
            err.root_cause(),
            Error::UnsupportedScalarCoercion { target: "f32", .. }
        ),
        "unexpected error: {err:?}"
    );

    let scene = from_str("--- !gauge &1\nGauge:\n  m_Weight: .inf\n", &catalogue()).unwrap();
    assert_eq!(scene.of_type::<Gauge>().next().unwrap().weight, f32::INFINITY);
}

#[test]
fn narrow_field_declared_wide_is_a_property_type_error() {
    let yaml = indoc! {"
        --- !gauge &1
        Gauge:
          m_Legacy: 9999999999
    "};
    let err = from_str(yaml, &catalogue()).unwrap_err();
    assert!(
        matches!(
            err.root_cause(),
            Error::PropertyType {
                class: "Gauge",
                property: "m_Legacy",
                ..
            }
        ),
        "unexpected error: {err:?}"
    );
}
