use std::sync::LazyLock;

use regex::{Captures, Regex};

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static AROUND_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([{};,])\s*").unwrap());
static LEADING_ZERO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\s:,(])0\.(\d+)").unwrap());
static RGB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rgb\s*\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)").unwrap()
});
static LONG_HEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#([0-9a-fA-F]{6})\b").unwrap());
static ZERO_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\s:,])0(?:px|pt|rem|em|vh|vw|%)").unwrap());
static MATH_FN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:calc|clamp|min|max)\(").unwrap());

/// Pattern-based CSS minifier. Keeps `/*! ... */` license comments.
pub fn minify_css(src: &str) -> String {
    let out = COMMENT.replace_all(src, |caps: &Captures<'_>| {
        let comment = &caps[0];
        if comment.starts_with("/*!") {
            comment.to_string()
        } else {
            String::new()
        }
    });
    let out = WHITESPACE.replace_all(&out, " ");
    let out = AROUND_PUNCT.replace_all(&out, "$1");
    let out = tighten_declaration_colons(&out);
    let out = out.replace(";}", "}");
    let out = LEADING_ZERO.replace_all(&out, "$1.$2");
    let out = RGB.replace_all(&out, |caps: &Captures<'_>| {
        let channel = |i: usize| caps[i].parse::<u16>().ok().filter(|v| *v <= 255);
        match (channel(1), channel(2), channel(3)) {
            (Some(r), Some(g), Some(b)) => format!("#{r:02x}{g:02x}{b:02x}"),
            _ => caps[0].to_string(),
        }
    });
    let out = LONG_HEX.replace_all(&out, |caps: &Captures<'_>| {
        let hex = caps[1].as_bytes();
        let pairs_repeat = hex.chunks(2).all(|pair| pair[0].eq_ignore_ascii_case(&pair[1]));
        if pairs_repeat {
            format!("#{}{}{}", hex[0] as char, hex[2] as char, hex[4] as char)
        } else {
            caps[0].to_string()
        }
    });
    let out = outside_math(&out, |segment| ZERO_UNIT.replace_all(segment, "${1}0").into_owned());
    out.trim().to_string()
}

/// Drops the spaces around `:` in declarations. A colon that reaches `{`
/// before any `;` or `}` is part of a selector or an at-rule prelude
/// (`.nav :hover`, `(min-width: 600px)`) and keeps its spacing.
fn tighten_declaration_colons(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut skip_space = false;
    for (i, c) in src.char_indices() {
        if skip_space && c == ' ' {
            continue;
        }
        skip_space = false;
        if c == ':' && in_declaration(&src[i + 1..]) {
            while out.ends_with(' ') {
                out.pop();
            }
            skip_space = true;
        }
        out.push(c);
    }
    out
}

fn in_declaration(rest: &str) -> bool {
    rest.find(['{', ';', '}'])
        .is_none_or(|at| rest.as_bytes()[at] != b'{')
}

/// Applies `f` to everything outside `calc()`-style bodies, where a
/// unitless zero is not a valid length.
fn outside_math(src: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(m) = MATH_FN.find(rest) {
        out.push_str(&f(&rest[..m.start()]));
        let end = closing_paren(rest, m.end());
        out.push_str(&rest[m.start()..end]);
        rest = &rest[end..];
    }
    out.push_str(&f(rest));
    out
}

fn closing_paren(src: &str, body_start: usize) -> usize {
    let mut depth = 1;
    for (i, c) in src[body_start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return body_start + i + 1;
                }
            }
            _ => {}
        }
    }
    src.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_but_keeps_license() {
        let css = "/*! keep */\n/* drop */\nbody { margin : 0 ; }\n";
        assert_eq!(minify_css(css), "/*! keep */ body{margin:0}");
    }

    #[test]
    fn collapses_whitespace_and_trailing_semicolon() {
        let css = ".a ,\n.b {\n  color: red;\n  padding: 1px 2px;\n}\n";
        assert_eq!(minify_css(css), ".a,.b{color:red;padding:1px 2px}");
    }

    #[test]
    fn shortens_colors() {
        assert_eq!(minify_css("a{color:#AABBCC}"), "a{color:#ABC}");
        assert_eq!(minify_css("a{color:#aabbcd}"), "a{color:#aabbcd}");
        assert_eq!(minify_css("a{color:rgb(255, 0, 0)}"), "a{color:#f00}");
        assert_eq!(minify_css("a{color:rgb(300,0,0)}"), "a{color:rgb(300,0,0)}");
    }

    #[test]
    fn drops_zero_units_and_leading_zeros() {
        assert_eq!(
            minify_css("a{margin: 0px 10px; opacity: 0.5; top:0%}"),
            "a{margin:0 10px;opacity:.5;top:0}"
        );
    }

    #[test]
    fn leaves_math_functions_alone() {
        assert_eq!(
            minify_css("a{width:calc(0px + 10px)}"),
            "a{width:calc(0px + 10px)}"
        );
        assert_eq!(
            minify_css("a{margin: 0px calc(100% - 0px) 0em}"),
            "a{margin:0 calc(100% - 0px) 0}"
        );
    }

    #[test]
    fn keeps_space_before_selector_colons() {
        assert_eq!(minify_css(".nav :hover{color:red}"), ".nav :hover{color:red}");
        assert_eq!(
            minify_css("@media (min-width: 600px) {\n  a { color : red; }\n}\n"),
            "@media (min-width: 600px){a{color:red}}"
        );
    }
}
