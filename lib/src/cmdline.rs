//! Windows command-line quoting.
//!
//! Windows hands a program one command-line string and the C runtime splits
//! it back into words (`CommandLineToArgvW` rules). Backslashes are literal
//! unless they precede a double quote.

use std::iter;

pub fn quote_arg(arg: &str) -> String {
    let quote = arg.is_empty() || arg.contains([' ', '\t', '\n', '\x0b']);
    let mut out = String::with_capacity(arg.len() + 2);
    if quote {
        out.push('"');
    }
    let mut backslashes = 0;
    for c in arg.chars() {
        if c == '\\' {
            backslashes += 1;
        } else {
            if c == '"' {
                // Double the run of backslashes and escape the quote itself.
                out.extend(iter::repeat('\\').take(backslashes + 1));
            }
            backslashes = 0;
        }
        out.push(c);
    }
    if quote {
        out.extend(iter::repeat('\\').take(backslashes));
        out.push('"');
    }
    out
}

/// Quote each argument and join them with spaces.
pub fn join_args(arguments: &[String]) -> String {
    arguments
        .iter()
        .map(|arg| quote_arg(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split an argument string (everything after the program name) into words.
pub fn split_args(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| matches!(c, ' ' | '\t')) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut word = String::new();
        let mut in_quotes = false;
        loop {
            let mut backslashes = 0;
            while chars.peek() == Some(&'\\') {
                chars.next();
                backslashes += 1;
            }
            match chars.peek().copied() {
                Some('"') => {
                    word.extend(iter::repeat('\\').take(backslashes / 2));
                    chars.next();
                    if backslashes % 2 == 1 {
                        word.push('"');
                    } else if in_quotes && chars.peek() == Some(&'"') {
                        chars.next();
                        word.push('"');
                    } else {
                        in_quotes = !in_quotes;
                    }
                }
                Some(c) => {
                    word.extend(iter::repeat('\\').take(backslashes));
                    if !in_quotes && matches!(c, ' ' | '\t') {
                        break;
                    }
                    chars.next();
                    word.push(c);
                }
                None => {
                    word.extend(iter::repeat('\\').take(backslashes));
                    break;
                }
            }
        }
        words.push(word);
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("--quiet", "--quiet")]
    #[case("", "\"\"")]
    #[case("a b", "\"a b\"")]
    #[case("C:\\Program Files\\", "\"C:\\Program Files\\\\\"")]
    #[case("say \"hi\"", "\"say \\\"hi\\\"\"")]
    #[case("C:\\dir\\file", "C:\\dir\\file")]
    fn quotes_like_the_c_runtime_expects(#[case] arg: &str, #[case] expected: &str) {
        assert_eq!(quote_arg(arg), expected);
    }

    #[test]
    fn joined_arguments_split_back() {
        let arguments: Vec<String> = [
            "--quiet",
            "--config=C:\\acme & co\\sync.conf",
            "",
            "quote\"inside",
            "trailing\\",
            "tab\there",
            "<angle>",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(split_args(&join_args(&arguments)), arguments);
    }

    #[test]
    fn empty_argument_list_joins_to_empty_string() {
        assert_eq!(join_args(&[]), "");
        assert!(split_args("").is_empty());
    }
}
