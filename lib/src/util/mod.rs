mod macros;

pub use macros::*;

/// Quotes `string` the way a repr conversion (`{key!r}`) displays it: wrapped
/// in single quotes, switching to double quotes when the string contains a
/// single quote but no double quote. Backslashes, the chosen quote, and
/// control characters are escaped.
pub fn quote(string: &str) -> String {
    let delim = match string.contains('\'') && !string.contains('"') {
        true => '"',
        false => '\'',
    };

    let mut output = String::with_capacity(string.len() + 2);
    output.push(delim);
    for ch in string.chars() {
        match ch {
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c == delim => {
                output.push('\\');
                output.push(c);
            }
            c if c.is_control() => output.extend(c.escape_unicode()),
            c => output.push(c),
        }
    }

    output.push(delim);
    output
}

#[cfg(test)]
mod quote_tests {
    #[test]
    fn test_quote() {
        use crate::util::quote;

        assert_eq!(quote("Druzhok"), "'Druzhok'");
        assert_eq!(quote("it's"), "\"it's\"");
        assert_eq!(quote("say \"it's\""), "'say \"it\\'s\"'");
        assert_eq!(quote("a\\b\nc"), "'a\\\\b\\nc'");
        assert_eq!(quote(""), "''");
    }
}
