//! Round-trip properties of the text and binary forms.

use configfile::{
    Config, Error, FormatOptions, LengthWidth, MAX_DEPTH, ParseErrorKind, ScalarKind, from_bytes,
    parse, parse_into, read_bin, scalar, to_bytes, to_text, to_text_with_options, write_bin,
};
use proptest::prelude::*;

const VALUE_CHARS: &[char] = &[
    'a', 'b', 'Z', '0', '7', '_', '.', '-', 'é', '✓', ' ', '#', '}', '{', '=', '\t', '\n', '\r',
    '\0',
];

/// A name matching `[A-Za-z_][A-Za-z0-9_]*`.
fn name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z_][A-Za-z0-9_]{0,7}").unwrap()
}

/// A value the text form preserves: no backslashes and no surrounding spaces.
fn value() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VALUE_CHARS), 0..12).prop_map(|chars| {
        let s: String = chars.into_iter().collect();
        s.trim_matches(' ').to_string()
    })
}

fn variables() -> impl Strategy<Value = Config> {
    prop::collection::btree_map(name(), value(), 0..5).prop_map(|vars| {
        let mut cfg = Config::new();
        for (name, value) in &vars {
            cfg.insert_str(name, value).unwrap();
        }
        cfg
    })
}

fn tree() -> impl Strategy<Value = Config> {
    variables().prop_recursive(4, 32, 3, |inner| {
        (variables(), prop::collection::btree_map(name(), inner, 0..3)).prop_map(
            |(mut cfg, sections)| {
                for (name, section) in &sections {
                    cfg.insert_config(name, section).unwrap();
                }
                cfg
            },
        )
    })
}

proptest! {
    #[test]
    fn text_roundtrip(cfg in tree()) {
        let text = to_text(&cfg);
        let back = parse(&text);
        prop_assert!(back.is_ok(), "output does not parse: {:?}\n{}", back, text);
        prop_assert_eq!(back.unwrap(), cfg);
    }

    #[test]
    fn unix_text_roundtrip(cfg in tree()) {
        let text = to_text_with_options(&cfg, FormatOptions::new().unix().indent("    "));
        prop_assert_eq!(parse(&text).unwrap(), cfg);
    }

    #[test]
    fn binary_roundtrip(cfg in tree()) {
        prop_assert_eq!(from_bytes(&to_bytes(&cfg)).unwrap(), cfg.clone());

        let mut out = Vec::new();
        write_bin(&mut out, &cfg, LengthWidth::Fixed64).unwrap();
        let mut back = Config::new();
        read_bin(&mut out.as_slice(), &mut back, LengthWidth::Fixed64).unwrap();
        prop_assert_eq!(back, cfg);
    }

    #[test]
    fn reload_is_idempotent(cfg in tree()) {
        let text = to_text(&cfg);
        let mut once = Config::new();
        parse_into(&text, &mut once).unwrap();
        let mut twice = once.clone();
        parse_into(&text, &mut twice).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn string_escape_roundtrip(s in "[^\\\\]{0,24}") {
        let encoded = scalar::encode_str(&s);
        prop_assert_eq!(scalar::decode_str(&encoded), s.as_str());
    }

    #[test]
    fn insert_then_get_str(n in name(), s in "[^\\\\]{0,24}") {
        let mut cfg = Config::new();
        cfg.insert_str(&n, &s).unwrap();
        prop_assert_eq!(cfg.get_str(&n).unwrap(), s);
    }

    #[test]
    fn int_roundtrip(n in any::<i64>()) {
        let mut cfg = Config::new();
        cfg.insert_int("n", n).unwrap();
        prop_assert_eq!(cfg.get_int("n").unwrap(), n);
    }

    #[test]
    fn real_roundtrip(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
        let mut cfg = Config::new();
        cfg.insert_real("x", x).unwrap();
        prop_assert_eq!(cfg.get_real("x").unwrap(), x);
    }

    #[test]
    fn char_roundtrip(c in any::<char>()) {
        let mut cfg = Config::new();
        cfg.insert_char("c", c).unwrap();
        prop_assert_eq!(cfg.get_char("c").unwrap(), c);
    }
}

#[test]
fn literal_backslash_value_survives_text() {
    let source = "w = 800\nh = 600\ntitle = My\\ Title\nnested\n{\n\ta = 1\n}\n";
    let cfg = parse(source).unwrap();
    assert_eq!(cfg.get_str("title").unwrap(), "My\\ Title");

    let again = parse(&to_text(&cfg)).unwrap();
    assert_eq!(again, cfg);
    assert_eq!(again.get_path("nested.a").unwrap(), "1");
}

#[test]
fn empty_file_is_empty_tree() {
    assert_eq!(parse("").unwrap(), Config::new());
    assert_eq!(to_text(&Config::new()), "");
}

#[test]
fn omitted_value_is_empty_string() {
    let cfg = parse("name = ").unwrap();
    assert_eq!(cfg.get_str("name").unwrap(), "");
    let cfg = parse("name =\nother = 1").unwrap();
    assert_eq!(cfg.get_str("name").unwrap(), "");
}

#[test]
fn digit_leading_name_is_rejected() {
    let err = parse("1abc = 5").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidNameToken);
    assert_eq!(err.line, 1);
}

#[test]
fn unclosed_block_reports_final_line() {
    let err = parse("foo\n{\nbar = 1\n").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::ClosingBraceMissing { .. }));
    assert_eq!(err.line, 4);
}

#[test]
fn trailing_garbage_is_not_an_int() {
    let cfg = parse("x = 12abc").unwrap();
    match cfg.get_int("x") {
        Err(Error::Conversion(e)) => {
            assert_eq!(e.kind, ScalarKind::Int);
            assert_eq!(e.raw, "12abc");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn deep_nesting_roundtrips() {
    let source = "a\n{\n\tb\n\t{\n\t\tc\n\t\t{\n\t\t\td\n\t\t\t{\n\t\t\t\tv = 4\n\t\t\t}\n\t\t}\n\t}\n}\n";
    let cfg = parse(source).unwrap();
    assert_eq!(cfg.get_path("a.b.c.d.v").unwrap(), "4");
    assert_eq!(parse(&to_text(&cfg)).unwrap(), cfg);
    assert_eq!(from_bytes(&to_bytes(&cfg)).unwrap(), cfg);
}

#[test]
fn insert_collides_but_reload_overwrites() {
    let mut cfg = parse("w = 800").unwrap();
    assert!(matches!(
        cfg.insert_int("w", 1),
        Err(Error::AlreadyExists { name }) if name == "w"
    ));
    parse_into("w = 1024", &mut cfg).unwrap();
    assert_eq!(cfg.get_int("w").unwrap(), 1024);
}

/// A chain of `levels` blocks, built programmatically; `None` once refused.
fn chain(levels: usize) -> Option<Config> {
    let mut cfg = Config::new();
    cfg.insert_str("leaf", "bottom").unwrap();
    for _ in 0..levels {
        let mut outer = Config::new();
        outer.insert_config("level", &cfg).ok()?;
        cfg = outer;
    }
    Some(cfg)
}

#[test]
fn deepest_tree_roundtrips_through_both_formats() {
    let cfg = chain(MAX_DEPTH).unwrap();
    assert_eq!(cfg.depth(), MAX_DEPTH);
    assert_eq!(parse(&to_text(&cfg)).unwrap(), cfg);
    assert_eq!(from_bytes(&to_bytes(&cfg)).unwrap(), cfg);

    let mut out = Vec::new();
    write_bin(&mut out, &cfg, LengthWidth::Fixed64).unwrap();
    let mut back = Config::new();
    read_bin(&mut out.as_slice(), &mut back, LengthWidth::Fixed64).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn every_reader_refuses_the_same_depth() {
    // Building past the limit fails, so no writer can emit such a tree.
    assert!(chain(300).is_none());

    let text = "level {\n".repeat(300) + &"}\n".repeat(300);
    let err = parse(&text).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::NestingTooDeep);
    assert_eq!(err.line, MAX_DEPTH as u32 + 1);

    let mut bytes = Vec::new();
    for _ in 0..300 {
        bytes.extend(1usize.to_ne_bytes());
        bytes.extend(5usize.to_ne_bytes());
        bytes.extend(b"level");
    }
    assert!(matches!(
        from_bytes(&bytes),
        Err(Error::TooDeep { name }) if name == "level"
    ));
}
