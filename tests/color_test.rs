use wf_board::color::{Color, ColorDepth};

#[test]
fn parse_hex_6_digit() {
    let c = Color::parse("#c0caf5", "test_field").unwrap();
    assert_eq!(
        c,
        Color::Hex {
            r: 0xc0,
            g: 0xca,
            b: 0xf5
        }
    );
}

#[test]
fn parse_hex_3_digit() {
    let c = Color::parse("#f0a", "test_field").unwrap();
    assert_eq!(
        c,
        Color::Hex {
            r: 0xff,
            g: 0x00,
            b: 0xaa
        }
    );
}

#[test]
fn parse_ansi256_bounds() {
    assert_eq!(Color::parse("0", "f").unwrap(), Color::Ansi256(0));
    assert_eq!(Color::parse("255", "f").unwrap(), Color::Ansi256(255));
    assert_eq!(Color::parse("007", "f").unwrap(), Color::Ansi256(7));
}

#[test]
fn parse_errors_name_field_and_value() {
    let err = Color::parse("256", "status.running").unwrap_err();
    assert!(err.to_string().contains("status.running"));
    assert!(err.to_string().contains("256"));

    let err = Color::parse("#ab", "border.faint").unwrap_err();
    assert!(err.to_string().contains("border.faint"));

    assert!(Color::parse("#gggggg", "f").is_err());
    assert!(Color::parse("green", "f").is_err());
}

#[test]
fn from_str_matches_parse() {
    let c: Color = "#102030".parse().unwrap();
    assert_eq!(
        c,
        Color::Hex {
            r: 0x10,
            g: 0x20,
            b: 0x30
        }
    );
}

#[test]
fn display_round_trips_through_parse() {
    for text in ["42", "#c0caf5"] {
        let c = Color::parse(text, "f").unwrap();
        assert_eq!(c.to_string(), text);
    }
}

#[test]
fn truecolor_keeps_hex() {
    let c = Color::Hex {
        r: 0xc0,
        g: 0xca,
        b: 0xf5,
    };
    assert_eq!(
        c.to_crossterm_color(ColorDepth::TrueColor),
        crossterm::style::Color::Rgb {
            r: 0xc0,
            g: 0xca,
            b: 0xf5
        }
    );
}

#[test]
fn color256_passes_indices_through() {
    assert_eq!(
        Color::Ansi256(100).to_crossterm_color(ColorDepth::Color256),
        crossterm::style::Color::AnsiValue(100)
    );
    assert!(matches!(
        Color::Hex { r: 10, g: 200, b: 30 }.to_crossterm_color(ColorDepth::Color256),
        crossterm::style::Color::AnsiValue(_)
    ));
}

#[test]
fn color16_degrades_to_named_colors() {
    for color in [
        Color::Ansi256(196),
        Color::Ansi256(245),
        Color::Hex { r: 0, g: 0, b: 250 },
    ] {
        let ct = color.to_crossterm_color(ColorDepth::Color16);
        assert!(
            !matches!(
                ct,
                crossterm::style::Color::AnsiValue(_) | crossterm::style::Color::Rgb { .. }
            ),
            "expected a named color for {color}, got {ct:?}"
        );
    }
}
