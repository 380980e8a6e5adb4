//! A minimal extractor for the linear units embedded in an OGC WKT coordinate system string.
//!
//! A full WKT grammar is out of scope here; coordinate system strings written by common LAS
//! producers carry their linear units as `+units=<name>` (horizontal) and `+vunits=<name>`
//! (vertical) tokens inside a `PARAMETER`/`AUTHORITY` string or an embedded PROJ string. This
//! module looks for exactly those tokens and returns `None` when it can't find them, rather than
//! attempting to parse the surrounding WKT structure.

/// Extracts the horizontal and vertical linear unit names from a WKT string, if present.
///
/// ```
/// use lastable::crs::parse_units;
/// let (h, v) = parse_units("...+units=us-ft +vunits=m...");
/// assert_eq!(Some("us-ft".to_string()), h);
/// assert_eq!(Some("m".to_string()), v);
/// assert_eq!((None, None), parse_units("PROJCS[\"nothing interesting here\"]"));
/// ```
pub fn parse_units(wkt: &str) -> (Option<String>, Option<String>) {
    (extract_tag(wkt, "+units="), extract_tag(wkt, "+vunits="))
}

fn extract_tag(haystack: &str, tag: &str) -> Option<String> {
    let start = haystack.find(tag)? + tag.len();
    let rest = &haystack[start..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '"' || c == ']')
        .unwrap_or(rest.len());
    if end == 0 {
        None
    } else {
        Some(rest[..end].to_string())
    }
}

/// Returns the multiplicative factor, in metres, for a unit name recognized by [`parse_units`].
///
/// Returns `None` for unrecognized unit names, in which case callers should leave coordinates
/// unconverted rather than guess.
pub fn unit_to_metres(unit: &str) -> Option<f64> {
    match unit {
        "m" | "metre" | "meter" | "metres" | "meters" => Some(1.0),
        "ft" | "foot" | "us-ft" | "us-foot" => Some(0.304_800_609_601_219_2),
        "international-ft" | "international-foot" => Some(0.3048),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_horizontal_and_vertical_units() {
        let wkt = "COMPD_CS[...+units=us-ft...+vunits=m...]";
        let (h, v) = parse_units(wkt);
        assert_eq!(Some("us-ft".to_string()), h);
        assert_eq!(Some("m".to_string()), v);
    }

    #[test]
    fn missing_tags_return_none() {
        let (h, v) = parse_units("PROJCS[\"nothing interesting here\"]");
        assert_eq!(None, h);
        assert_eq!(None, v);
    }

    #[test]
    fn known_units_convert_to_metres() {
        assert_eq!(Some(1.0), unit_to_metres("metre"));
        assert!(unit_to_metres("us-ft").unwrap() > 0.3047 && unit_to_metres("us-ft").unwrap() < 0.3049);
        assert_eq!(None, unit_to_metres("furlong"));
    }
}
