/// Conservative JavaScript minifier: drops comments and redundant
/// whitespace, never renames or rewrites code. String, template and regex
/// literals are copied verbatim. Newlines are kept where automatic semicolon
/// insertion could depend on them.
pub fn minify_js(src: &str) -> String {
    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match c {
            '"' | '\'' | '`' => {
                i = copy_quoted(&chars, i, &mut out);
            }
            '/' if next == Some('/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if next == Some('*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
                // A removed block comment still separates tokens.
                push_space(&mut out, ' ');
            }
            '/' if regex_allowed(&out) => {
                i = copy_regex(&chars, i, &mut out);
            }
            c if c.is_whitespace() => {
                let mut saw_newline = false;
                while i < chars.len() && chars[i].is_whitespace() {
                    saw_newline |= chars[i] == '\n';
                    i += 1;
                }
                push_space(&mut out, if saw_newline { '\n' } else { ' ' });
            }
            c => {
                if is_tight(c) {
                    trim_trailing_space(&mut out, c);
                }
                out.push(c);
                i += 1;
            }
        }
    }

    trim_trailing_space(&mut out, '}');
    out.trim().to_string()
}

/// Punctuation that never needs a separating space on either side.
fn is_tight(c: char) -> bool {
    matches!(c, '{' | '}' | '(' | ')' | '[' | ']' | ';' | ',' | ':' | '=')
}

/// After these a newline cannot end a statement early.
fn newline_droppable_after(c: char) -> bool {
    matches!(c, '{' | '(' | '[' | ';' | ',' | ':' | '=')
}

fn push_space(out: &mut String, space: char) {
    match out.chars().last() {
        None => {}
        Some(last) if last == '\n' => {}
        Some(last) if last == ' ' => {
            if space == '\n' {
                out.pop();
                push_space(out, '\n');
            }
        }
        Some(last) if is_tight(last) && (space == ' ' || newline_droppable_after(last)) => {}
        Some(_) => out.push(space),
    }
}

fn trim_trailing_space(out: &mut String, next: char) {
    while let Some(last) = out.chars().last() {
        let removable = last == ' ' || (last == '\n' && matches!(next, '}' | ')' | ']' | ',' | ';' | ':' | '='));
        if removable {
            out.pop();
        } else {
            break;
        }
    }
}

/// Keywords after which a `/` starts a regex literal rather than a division.
const REGEX_KEYWORDS: [&str; 14] = [
    "return", "typeof", "case", "in", "of", "delete", "void", "throw", "yield", "await",
    "instanceof", "new", "else", "do",
];

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn regex_allowed(out: &str) -> bool {
    let code = out.trim_end();
    let Some(prev) = code.chars().last() else {
        return true;
    };
    if is_ident_char(prev) {
        let before = code.trim_end_matches(is_ident_char);
        let word = &code[before.len()..];
        // `a.return / 2` is a property access, not the keyword.
        return !before.ends_with('.') && REGEX_KEYWORDS.contains(&word);
    }
    matches!(
        prev,
        '(' | ',' | '=' | ':' | '[' | '!' | '&' | '|' | '?' | '{' | '}' | ';' | '+' | '-' | '*' | '%' | '<' | '>' | '~' | '^'
    )
}

fn copy_quoted(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    out.push(quote);
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;
        if c == '\\' {
            if let Some(&escaped) = chars.get(i) {
                out.push(escaped);
                i += 1;
            }
        } else if c == quote {
            break;
        }
    }
    i
}

fn copy_regex(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('/');
    let mut i = start + 1;
    let mut in_class = false;
    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            // Not a regex after all; leave the rest to the main loop.
            return i;
        }
        out.push(c);
        i += 1;
        match c {
            '\\' => {
                if let Some(&escaped) = chars.get(i) {
                    out.push(escaped);
                    i += 1;
                }
            }
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => break,
            _ => {}
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_comments_and_blank_space() {
        let js = "// header\nfunction add(a, b) {\n  /* sum */\n  return a + b;\n}\n";
        assert_eq!(minify_js(js), "function add(a,b){return a + b;}");
    }

    #[test]
    fn preserves_literals() {
        let js = "const s = \"a  // not a comment\";\nconst t = `x /* y */ ${s}`;\nconst r = /\\/+ [/]/g;";
        assert_eq!(
            minify_js(js),
            "const s=\"a  // not a comment\";const t=`x /* y */ ${s}`;const r=/\\/+ [/]/g;"
        );
    }

    #[test]
    fn keeps_newlines_that_may_end_statements() {
        let js = "let a = 1\nlet b = a\n++b\n";
        assert_eq!(minify_js(js), "let a=1\nlet b=a\n++b");
    }

    #[test]
    fn division_is_not_a_regex() {
        assert_eq!(minify_js("x = a / b / c;"), "x=a / b / c;");
    }

    #[test]
    fn regex_after_keyword_is_copied_verbatim() {
        let js = "function f(s) {\n  return /a  b/.test(s);\n}\n";
        assert_eq!(minify_js(js), "function f(s){return /a  b/.test(s);}");

        let js = "function f(s) {\n  return /'/.test(s);\n}\n// don't\n";
        assert_eq!(minify_js(js), "function f(s){return /'/.test(s);}");
    }

    #[test]
    fn keyword_named_property_still_divides() {
        assert_eq!(minify_js("x = obj.in / 2 / 1;"), "x=obj.in / 2 / 1;");
    }
}
