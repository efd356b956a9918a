//! Decoded scalar values seen through the typed AST.

use kiln_cst::{DateTimeKind, Document, ValueKind, parse};

/// The first top-level value in a parsed document.
fn first_value(doc: &Document) -> kiln_cst::ValueNode<'_> {
    doc.root()
        .key_values()
        .next()
        .and_then(|kv| kv.value())
        .expect("document has a top-level value")
}

fn messages(doc: &Document) -> Vec<String> {
    doc.diagnostics().iter().map(|d| d.message.clone()).collect()
}

#[test]
fn test_integers() {
    for (source, expected) in [
        ("x = 0\n", 0),
        ("x = +17\n", 17),
        ("x = -17\n", -17),
        ("x = 1_000\n", 1000),
        ("x = 0xDEAD_beef\n", 0xdead_beef),
        ("x = 0o755\n", 0o755),
        ("x = 0b1101\n", 0b1101),
        ("x = 9223372036854775807\n", i64::MAX),
        ("x = -9223372036854775808\n", i64::MIN),
    ] {
        let doc = parse(source);
        assert!(!doc.has_errors(), "{source:?}: {}", doc.diagnostics());
        assert_eq!(first_value(&doc).as_integer(), Some(expected), "{source:?}");
        assert_eq!(first_value(&doc).kind(), ValueKind::Integer);
    }
}

#[test]
fn test_hex_keeps_bit_pattern() {
    let doc = parse("x = 0xffff_ffff_ffff_ffff\n");
    assert!(!doc.has_errors(), "{}", doc.diagnostics());
    assert_eq!(first_value(&doc).as_integer(), Some(-1));
}

#[test]
fn test_integer_overflow() {
    for source in [
        "x = 9223372036854775808\n",
        "x = 0x1_0000_0000_0000_0000\n",
    ] {
        let doc = parse(source);
        assert!(
            messages(&doc).iter().any(|m| m == "integer does not fit in 64 bits"),
            "{source:?}: {:?}",
            messages(&doc)
        );
        assert_eq!(doc.to_string(), source);
    }
}

#[test]
fn test_underscore_placement() {
    assert!(!parse("x = 1_0\n").has_errors());
    for source in ["x = 1__0\n", "x = 10_\n", "x = 1_.5\n", "x = 0x_1\n"] {
        let doc = parse(source);
        assert!(
            messages(&doc)
                .iter()
                .any(|m| m == "underscores in numbers must be surrounded by digits"),
            "{source:?}: {:?}",
            messages(&doc)
        );
        assert_eq!(doc.to_string(), source);
    }
}

#[test]
fn test_leading_zeros() {
    let doc = parse("x = 007\n");
    assert_eq!(messages(&doc), vec!["leading zeros are not allowed in numbers"]);
}

#[test]
fn test_special_floats() {
    for (source, expected) in [
        ("x = inf\n", f64::INFINITY),
        ("x = +inf\n", f64::INFINITY),
        ("x = -inf\n", f64::NEG_INFINITY),
    ] {
        let doc = parse(source);
        assert!(!doc.has_errors(), "{source:?}: {}", doc.diagnostics());
        assert_eq!(first_value(&doc).as_float(), Some(expected));
        assert_eq!(doc.to_string(), source);
    }
    for source in ["x = nan\n", "x = +nan\n", "x = -nan\n"] {
        let doc = parse(source);
        assert!(!doc.has_errors(), "{source:?}: {}", doc.diagnostics());
        assert!(first_value(&doc).as_float().is_some_and(f64::is_nan));
        assert_eq!(first_value(&doc).kind(), ValueKind::Float);
    }
}

#[test]
fn test_floats() {
    for (source, expected) in [
        ("x = 3.1415\n", 3.1415),
        ("x = -0.01\n", -0.01),
        ("x = 5e+22\n", 5e22),
        ("x = 6.626e-34\n", 6.626e-34),
        ("x = 224_617.445_991\n", 224_617.445_991),
    ] {
        let doc = parse(source);
        assert!(!doc.has_errors(), "{source:?}: {}", doc.diagnostics());
        assert_eq!(first_value(&doc).as_float(), Some(expected), "{source:?}");
    }
}

#[test]
fn test_strings() {
    for (source, expected) in [
        ("x = \"tab\\there\"\n", "tab\there"),
        ("x = \"\\u00e9\\U0001F600\"\n", "é😀"),
        ("x = 'C:\\Users\\nodejs'\n", "C:\\Users\\nodejs"),
        ("x = \"\"\"\nRoses\nViolets\"\"\"\n", "Roses\nViolets"),
        ("x = \"\"\"\nThe quick \\\n    brown fox\"\"\"\n", "The quick brown fox"),
        ("x = '''\n raw\\n '''\n", " raw\\n "),
    ] {
        let doc = parse(source);
        assert!(!doc.has_errors(), "{source:?}: {}", doc.diagnostics());
        assert_eq!(first_value(&doc).as_str(), Some(expected), "{source:?}");
    }
}

#[test]
fn test_booleans() {
    let doc = parse("x = false\n");
    assert_eq!(first_value(&doc).as_bool(), Some(false));
    assert_eq!(first_value(&doc).kind(), ValueKind::Boolean);
}

#[test]
fn test_datetimes() {
    for (source, kind) in [
        ("x = 1979-05-27T07:32:00Z\n", DateTimeKind::OffsetDateTimeByZ),
        ("x = 1979-05-27T00:32:00.999999-07:00\n", DateTimeKind::OffsetDateTimeByNumber),
        ("x = 1979-05-27 07:32:00\n", DateTimeKind::LocalDateTime),
        ("x = 1979-05-27\n", DateTimeKind::LocalDate),
        ("x = 00:32:00.5\n", DateTimeKind::LocalTime),
    ] {
        let doc = parse(source);
        assert!(!doc.has_errors(), "{source:?}: {}", doc.diagnostics());
        let value = first_value(&doc);
        assert_eq!(value.kind(), ValueKind::DateTime(kind), "{source:?}");
        assert_eq!(value.as_datetime().map(|dt| dt.kind), Some(kind));
    }

    let doc = parse("x = 1979-05-27T07:32:00Z\n");
    let dt = first_value(&doc).as_datetime().copied().unwrap();
    let date = dt.date.unwrap();
    assert_eq!((date.year, date.month, date.day), (1979, 5, 27));
    let time = dt.time.unwrap();
    assert_eq!((time.hour, time.minute, time.second), (7, 32, 0));
}

#[test]
fn test_invalid_dates() {
    for source in ["x = 1979-13-01\n", "x = 1979-02-30\n", "x = 07:32\n"] {
        let doc = parse(source);
        assert!(doc.has_errors(), "{source:?}");
        assert_eq!(doc.to_string(), source);
    }
}

#[test]
fn test_bad_keyword() {
    let doc = parse("x = yes\n");
    assert_eq!(messages(&doc), vec!["invalid value `yes`"]);
}

#[test]
fn test_nested_values() {
    let doc = parse("x = [[1, 2], { a = 'b' }, []]\n");
    assert!(!doc.has_errors(), "{}", doc.diagnostics());
    let array = first_value(&doc).as_array().unwrap();
    assert_eq!(array.len(), 3);
    let items: Vec<ValueKind> = array.items().map(|item| item.kind()).collect();
    assert_eq!(
        items,
        vec![ValueKind::Array, ValueKind::InlineTable, ValueKind::Array]
    );

    let inline = array.items().nth(1).and_then(|v| v.as_inline_table()).unwrap();
    let kv = inline.key_values().next().unwrap();
    assert_eq!(kv.key().unwrap().segments(), vec!["a"]);
    assert_eq!(kv.value().unwrap().as_str(), Some("b"));
}
