/// Tolerant ASCII STL extraction
///
/// The text is reduced to a flat run of numbers: line breaks and indentation
/// are ignored, the `solid`/`endsolid` lines are dropped together with their
/// names, and the structural keywords are discarded. Every twelve numbers make
/// one facet (normal, then three vertices).
use nom::{
    bytes::complete::take_till1,
    character::complete::multispace0,
    combinator::all_consuming,
    multi::many0,
    number::complete::recognize_float,
    sequence::{preceded, terminated},
    IResult,
};
use tracing::{debug, warn};

use crate::decoder::DecodeOptions;
use crate::error::{DecodeError, DecodeResult};
use crate::geometry::{Facet, Mesh};
use crate::notify::{NotificationSink, ProgressTicker};

/// Numbers per facet: normal plus three vertices
pub const NUMBERS_PER_FACET: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Facet,
    Normal,
    Outer,
    Loop,
    Vertex,
    EndLoop,
    EndFacet,
}

/// A word of an STL body after the solid header and trailer are removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Word<'a> {
    Keyword(Keyword),
    Value(&'a str),
}

fn keyword(word: &str) -> Option<Keyword> {
    const KEYWORDS: [(&str, Keyword); 7] = [
        ("facet", Keyword::Facet),
        ("normal", Keyword::Normal),
        ("outer", Keyword::Outer),
        ("loop", Keyword::Loop),
        ("vertex", Keyword::Vertex),
        ("endloop", Keyword::EndLoop),
        ("endfacet", Keyword::EndFacet),
    ];
    KEYWORDS
        .iter()
        .find(|(name, _)| word.eq_ignore_ascii_case(name))
        .map(|(_, kw)| *kw)
}

fn line_words(line: &str) -> IResult<&str, Vec<&str>> {
    terminated(
        many0(preceded(multispace0, take_till1(char::is_whitespace))),
        multispace0,
    )(line)
}

/// Split STL text into keywords and value words.
///
/// `solid` drops the rest of its line. When nothing but blank lines follows,
/// the file is a one-liner and only the words before the first `facet normal`
/// pair are dropped. `endsolid` drops the rest of its line.
pub(crate) fn lex(text: &str) -> Vec<Word<'_>> {
    let lines: Vec<&str> = text.split(|c| c == '\r' || c == '\n').collect();
    let last_content = lines.iter().rposition(|line| !line.trim().is_empty());
    let mut out = Vec::new();

    for (n, &line) in lines.iter().enumerate() {
        let words = line_words(line).map(|(_, words)| words).unwrap_or_default();
        let one_liner = last_content.map_or(true, |last| n >= last);

        let mut i = 0;
        while i < words.len() {
            let word = words[i];
            i += 1;

            if word.eq_ignore_ascii_case("endsolid") {
                break;
            }
            if word.eq_ignore_ascii_case("solid") {
                if !one_liner {
                    break;
                }
                while i < words.len() && !starts_facet(&words[i..]) {
                    i += 1;
                }
                continue;
            }
            out.push(match keyword(word) {
                Some(kw) => Word::Keyword(kw),
                None => Word::Value(word),
            });
        }
    }

    out
}

fn starts_facet(words: &[&str]) -> bool {
    matches!(
        words,
        [first, second, ..]
            if keyword(first) == Some(Keyword::Facet) && keyword(second) == Some(Keyword::Normal)
    )
}

/// The value words of `text`, in order.
pub fn numeric_tokens(text: &str) -> Vec<&str> {
    lex(text)
        .into_iter()
        .filter_map(|word| match word {
            Word::Value(value) => Some(value),
            Word::Keyword(_) => None,
        })
        .collect()
}

/// Parse one numeric token: optional sign, digits with an optional fraction,
/// optional exponent (`-2`, `+0.001`, `.5`, `1.5e-3`).
pub fn parse_number(token: &str) -> Option<f32> {
    let recognized: IResult<&str, &str> = all_consuming(recognize_float)(token);
    recognized.ok().and_then(|(_, text)| text.parse().ok())
}

/// Parse `token` as the `index`-th number of the body.
pub(crate) fn number_at(token: &str, index: usize) -> DecodeResult<f32> {
    parse_number(token).ok_or_else(|| DecodeError::MalformedNumber {
        token: token.to_string(),
        index,
    })
}

/// Extract every facet of an ASCII STL into flat buffers.
///
/// The facet count is `tokens / 12`, rounded down; trailing tokens that do not
/// fill a facet are ignored.
pub fn parse_ascii(
    text: &str,
    options: &DecodeOptions,
    sink: &mut dyn NotificationSink,
) -> DecodeResult<Mesh> {
    let tokens = numeric_tokens(text);
    let facet_count = tokens.len() / NUMBERS_PER_FACET;
    let leftover = tokens.len() % NUMBERS_PER_FACET;
    if leftover != 0 {
        warn!(leftover, "ignoring trailing tokens that do not fill a facet");
    }

    let total = u32::try_from(facet_count)
        .map_err(|_| DecodeError::TooManyFacets { count: facet_count })?;
    let ticker = ProgressTicker::new(total, options.progress_interval);
    let mut mesh = Mesh::with_capacity(facet_count);

    for (i, chunk) in tokens.chunks_exact(NUMBERS_PER_FACET).enumerate() {
        ticker.tick(i as u32, sink);

        let mut values = [0f32; NUMBERS_PER_FACET];
        for (j, (value, token)) in values.iter_mut().zip(chunk).enumerate() {
            *value = number_at(token, i * NUMBERS_PER_FACET + j)?;
        }
        mesh.push_facet(&Facet::from_floats(&values), None);
    }

    debug!(facets = facet_count, tokens = tokens.len(), "parsed ASCII STL");
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NullSink, Notification};

    const TRIANGLE: &str = "solid triangle
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid triangle
";

    fn parse(text: &str) -> DecodeResult<Mesh> {
        parse_ascii(text, &DecodeOptions::default(), &mut NullSink)
    }

    #[test]
    fn test_single_facet() {
        let mesh = parse(TRIANGLE).unwrap();
        assert_eq!(mesh.vertices, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(mesh.normals, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert!(mesh.colors.is_none());
    }

    #[test]
    fn test_layout_variations_agree() {
        let crlf = TRIANGLE.replace('\n', "\r\n");
        let tabs = TRIANGLE.replace("  ", "\t");
        let one_line = TRIANGLE.replace('\n', " ");
        let old_mac = TRIANGLE.replace('\n', "\r");

        let expected = parse(TRIANGLE).unwrap();
        for text in [crlf, tabs, one_line, old_mac] {
            assert_eq!(parse(&text).unwrap(), expected, "text: {:?}", text);
        }
    }

    #[test]
    fn test_solid_names_are_dropped() {
        let text = TRIANGLE
            .replace("solid triangle", "solid part 42 rev 7")
            .replace("endsolid triangle", "endsolid part 42 rev 7");
        assert_eq!(parse(&text).unwrap(), parse(TRIANGLE).unwrap());

        let unnamed = TRIANGLE
            .replace("solid triangle", "solid")
            .replace("endsolid triangle", "endsolid");
        assert_eq!(parse(&unnamed).unwrap(), parse(TRIANGLE).unwrap());
    }

    #[test]
    fn test_solid_name_containing_keywords() {
        let text = TRIANGLE
            .replace("solid triangle", "solid mesh facet export")
            .replace("endsolid triangle", "endsolid mesh facet export");
        assert_eq!(parse(&text).unwrap(), parse(TRIANGLE).unwrap());

        let numbered = TRIANGLE.replace("solid triangle", "solid facet normal 1 2 3");
        assert_eq!(parse(&numbered).unwrap(), parse(TRIANGLE).unwrap());
    }

    #[test]
    fn test_one_line_file_with_keyword_in_name() {
        let one_line = TRIANGLE
            .replace("solid triangle", "solid mesh facet export")
            .replace('\n', " ");
        assert_eq!(parse(&one_line).unwrap(), parse(TRIANGLE).unwrap());
        assert_eq!(parse(&format!("{}\n\n", one_line)).unwrap(), parse(TRIANGLE).unwrap());
    }

    #[test]
    fn test_uppercase_keywords() {
        let text = TRIANGLE.to_uppercase();
        assert_eq!(parse(&text).unwrap(), parse(TRIANGLE).unwrap());
    }

    #[test]
    fn test_number_notations() {
        assert_eq!(parse_number("1.5e-3"), Some(1.5e-3));
        assert_eq!(parse_number("-2"), Some(-2.0));
        assert_eq!(parse_number("+0.001"), Some(0.001));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("3."), Some(3.0));
        assert_eq!(parse_number("2E+2"), Some(200.0));
        assert_eq!(parse_number("1e"), None);
        assert_eq!(parse_number("0x10"), None);
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_scientific_values() {
        let text = TRIANGLE
            .replace("vertex 1 0 0", "vertex 1.5e+1 -2.5E-1 +3")
            .replace("facet normal 0 0 1", "facet normal 0.0e0 -0 1.0");
        let mesh = parse(&text).unwrap();
        assert_eq!(&mesh.vertices[3..6], &[15.0, -0.25, 3.0]);
        assert_eq!(&mesh.normals[..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_malformed_number() {
        let text = TRIANGLE.replace("vertex 1 0 0", "vertex 1 zero 0");
        let err = parse(&text).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedNumber {
                token: "zero".to_string(),
                index: 7,
            }
        );
    }

    #[test]
    fn test_leftover_tokens_are_ignored() {
        let text = TRIANGLE.replace("endsolid", "1 2 3\nendsolid");
        let mesh = parse(&text).unwrap();
        assert_eq!(mesh.facet_count(), 1);

        let short = TRIANGLE.replace("vertex 0 1 0", "vertex 0 1");
        assert_eq!(parse(&short).unwrap().facet_count(), 0);
    }

    #[test]
    fn test_empty_solid() {
        let mesh = parse("solid empty\nendsolid empty\n").unwrap();
        assert_eq!(mesh.facet_count(), 0);
    }

    #[test]
    fn test_lex_keeps_structure() {
        let words = lex("solid a\nfacet normal 1 2 3\nendfacet\nendsolid a");
        assert_eq!(
            words,
            vec![
                Word::Keyword(Keyword::Facet),
                Word::Keyword(Keyword::Normal),
                Word::Value("1"),
                Word::Value("2"),
                Word::Value("3"),
                Word::Keyword(Keyword::EndFacet),
            ]
        );
    }

    #[test]
    fn test_progress_matches_binary_cadence() {
        let body: String = (0..150)
            .map(|_| "facet normal 0 0 1 outer loop vertex 0 0 0 vertex 1 0 0 vertex 0 1 0 endloop endfacet\n")
            .collect();
        let text = format!("solid many\n{}endsolid many\n", body);

        let mut seen = Vec::new();
        let mesh = parse_ascii(&text, &DecodeOptions::default(), &mut seen).unwrap();
        assert_eq!(mesh.facet_count(), 150);
        assert_eq!(
            seen,
            vec![
                Notification::Progress { percent: 0 },
                Notification::Progress { percent: 67 },
            ]
        );
    }
}
