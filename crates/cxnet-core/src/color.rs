//! Hex color parsing and per-channel interpolation.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    /// `None` for colors written without an alpha channel.
    pub a: Option<f64>,
}

fn channel(hex: &str) -> Option<f64> {
    u8::from_str_radix(hex, 16).ok().map(f64::from)
}

/// Parses `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa` (case-insensitive).
pub fn parse_hex(s: &str) -> Option<Rgba> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let short = |i: usize| channel(&hex[i..i + 1].repeat(2));
    let long = |i: usize| channel(&hex[i..i + 2]);
    match hex.len() {
        3 => Some(Rgba {
            r: short(0)?,
            g: short(1)?,
            b: short(2)?,
            a: None,
        }),
        4 => Some(Rgba {
            r: short(0)?,
            g: short(1)?,
            b: short(2)?,
            a: Some(short(3)?),
        }),
        6 => Some(Rgba {
            r: long(0)?,
            g: long(2)?,
            b: long(4)?,
            a: None,
        }),
        8 => Some(Rgba {
            r: long(0)?,
            g: long(2)?,
            b: long(4)?,
            a: Some(long(6)?),
        }),
        _ => None,
    }
}

fn fmt_channel(v: f64) -> String {
    format!("{:02X}", v.round().clamp(0.0, 255.0) as u8)
}

/// Formats as uppercase `#RRGGBB`, or `#RRGGBBAA` when an alpha channel is present.
pub fn to_hex(c: Rgba) -> String {
    let mut out = format!("#{}{}{}", fmt_channel(c.r), fmt_channel(c.g), fmt_channel(c.b));
    if let Some(a) = c.a {
        out.push_str(&fmt_channel(a));
    }
    out
}

/// Interpolates each channel independently; `t` is clamped to `[0, 1]`.
///
/// Alpha is kept when either endpoint carries one (a missing alpha counts as opaque).
pub fn interpolate(from: Rgba, to: Rgba, t: f64) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: f64, b: f64| a + (b - a) * t;
    let a = match (from.a, to.a) {
        (None, None) => None,
        (a0, a1) => Some(lerp(a0.unwrap_or(255.0), a1.unwrap_or(255.0))),
    };
    Rgba {
        r: lerp(from.r, to.r),
        g: lerp(from.g, to.g),
        b: lerp(from.b, to.b),
        a,
    }
}

/// Interpolates two hex strings; `None` if either does not parse.
pub fn interpolate_hex(from: &str, to: &str, t: f64) -> Option<String> {
    Some(to_hex(interpolate(parse_hex(from)?, parse_hex(to)?, t)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        let short = parse_hex("#f0a").unwrap();
        assert_eq!((short.r, short.g, short.b, short.a), (255.0, 0.0, 170.0, None));
        let long = parse_hex("#FF00AA80").unwrap();
        assert_eq!(long.a, Some(128.0));
        assert!(parse_hex("FF00AA").is_none());
        assert!(parse_hex("#GG0000").is_none());
        assert!(parse_hex("#12345").is_none());
    }

    #[test]
    fn interpolates_each_channel() {
        assert_eq!(
            interpolate_hex("#000000", "#FF8040", 0.5).as_deref(),
            Some("#804020")
        );
        assert_eq!(
            interpolate_hex("#000", "#FFF", 0.0).as_deref(),
            Some("#000000")
        );
        assert_eq!(
            interpolate_hex("#00000000", "#FFFFFFFF", 1.0).as_deref(),
            Some("#FFFFFFFF")
        );
    }
}
