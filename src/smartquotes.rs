//! Typographic punctuation for frame captions.
//!
//! Straight quotes, double hyphens and triple dots become their typographic
//! counterparts. The output never contains the ASCII sequences that trigger a
//! substitution, so applying `educate` twice is the same as applying it once.

const LEFT_DOUBLE: char = '\u{201C}';
const RIGHT_DOUBLE: char = '\u{201D}';
const LEFT_SINGLE: char = '\u{2018}';
const RIGHT_SINGLE: char = '\u{2019}';
const EM_DASH: char = '\u{2014}';
const ELLIPSIS: char = '\u{2026}';

pub fn educate(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0usize;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();
        match (ch, next) {
            ('`', Some('`')) => {
                out.push(LEFT_DOUBLE);
                i += 2;
            }
            ('\'', Some('\'')) => {
                out.push(RIGHT_DOUBLE);
                i += 2;
            }
            ('-', Some('-')) => {
                out.push(EM_DASH);
                i += 2;
            }
            ('.', Some('.')) if chars.get(i + 2) == Some(&'.') => {
                out.push(ELLIPSIS);
                i += 3;
            }
            ('`', _) => {
                out.push(LEFT_SINGLE);
                i += 1;
            }
            ('"', _) => {
                out.push(if opens_quote(out.chars().last()) {
                    LEFT_DOUBLE
                } else {
                    RIGHT_DOUBLE
                });
                i += 1;
            }
            ('\'', _) => {
                out.push(if opens_quote(out.chars().last()) {
                    LEFT_SINGLE
                } else {
                    RIGHT_SINGLE
                });
                i += 1;
            }
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }

    out
}

fn opens_quote(previous: Option<char>) -> bool {
    match previous {
        None => true,
        Some(ch) => {
            ch.is_whitespace()
                || matches!(
                    ch,
                    '(' | '[' | '{' | '-' | EM_DASH | '\u{2013}' | LEFT_DOUBLE | LEFT_SINGLE
                )
        }
    }
}
