use quotefeed_rs::FieldValue;
use quotefeed_rs::fields::Coercer;

#[test]
fn float_tolerates_sign_percent_and_separators() {
    assert_eq!(Coercer::Float.coerce("-0.38%"), FieldValue::Float(-0.38));
    assert_eq!(Coercer::Float.coerce("+0.45%"), FieldValue::Float(0.45));
    assert_eq!(Coercer::Float.coerce("1,234.5"), FieldValue::Float(1234.5));
    assert_eq!(Coercer::Float.coerce(" 449.73 "), FieldValue::Float(449.73));
}

#[test]
fn int_strips_thousands_separators() {
    assert_eq!(Coercer::Int.coerce("11,874,862"), FieldValue::Int(11_874_862));
    assert_eq!(Coercer::Int.coerce("+7"), FieldValue::Int(7));
}

#[test]
fn placeholders_are_missing() {
    for c in [Coercer::Text, Coercer::Float, Coercer::Int] {
        assert!(c.coerce("N/A").is_missing(), "{c:?}");
    }
    assert!(Coercer::Float.coerce("").is_missing());
    assert!(Coercer::Float.coerce("-").is_missing());
    assert!(Coercer::Int.coerce("  ").is_missing());
}

#[test]
fn unparseable_numbers_keep_their_raw_text() {
    let v = Coercer::Float.coerce("abc");
    assert!(v.is_invalid());
    assert_eq!(
        v,
        FieldValue::Invalid {
            raw: "abc".to_string()
        }
    );
    assert!(Coercer::Int.coerce("12.5").is_invalid());
}

#[test]
fn raw_is_untouched_and_text_is_trimmed() {
    assert_eq!(
        Coercer::Raw.coerce(" $449.73 "),
        FieldValue::Text(" $449.73 ".to_string())
    );
    assert_eq!(
        Coercer::Raw.coerce("N/A"),
        FieldValue::Text("N/A".to_string())
    );
    assert_eq!(
        Coercer::Text.coerce("  AAPL "),
        FieldValue::Text("AAPL".to_string())
    );
}
