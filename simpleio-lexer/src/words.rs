//! A tokenizer for splitting a line into shell-like words.
//!
//! Words are separated by runs of unquoted, unescaped whitespace. Quote characters and
//! backslashes are structural: they control the splitting and are removed from the output,
//! unless escaped with a backslash.

use alloc::string::String;
use alloc::vec::Vec;
use core::str::Chars;

use crate::quote::QuoteState;

/// An iterator over the words of a single line.
///
/// The iterator yields owned words since removing structural characters means a word is
/// generally not a contiguous slice of the input.
#[derive(Clone, Debug)]
pub struct Words<'a> {
    chars: Chars<'a>,
    quote: QuoteState,
    done: bool,
}

impl<'a> Words<'a> {
    /// Create a word iterator over the given line.
    pub fn new(line: &'a str) -> Self {
        Words {
            chars: line.chars(),
            quote: QuoteState::Unquoted,
            done: false,
        }
    }

    /// Retrieve the quoting state at the current position. Once the iterator is exhausted, this
    /// is the state at the end of the line.
    #[inline(always)]
    pub fn quote_state(&self) -> QuoteState {
        self.quote
    }

    /// Evaluate if the line ended inside a quoted region. The last word then holds everything
    /// from the opening quote to the end of the line.
    #[inline(always)]
    pub fn is_unterminated(&self) -> bool {
        self.done && self.quote.is_quoted()
    }
}

impl Iterator for Words<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut word = String::new();
        let mut open = false;
        let mut escaped = false;

        for c in self.chars.by_ref() {
            if escaped {
                word.push(c);
                escaped = false;
                continue;
            }

            // Unescaped backslashes escape the next character, even inside quotes.
            if c == '\\' {
                escaped = true;
                open = true;
                continue;
            }

            if let Some(next) = self.quote.transition(c) {
                self.quote = next;
                open = true;
                continue;
            }

            if self.quote.is_quoted() {
                word.push(c);
            } else if c.is_whitespace() {
                if open {
                    return Some(word);
                }
            } else {
                open = true;
                word.push(c);
            }
        }

        self.done = true;

        if self.quote.is_quoted() {
            log::debug!("line ends inside a {:?} region", self.quote);
        }

        // A dangling backslash at the end of the line escapes nothing and is dropped.
        open.then_some(word)
    }
}

/// Count the maximum number of words in the line, i.e. the number of whitespace-separated runs.
/// Quotes and escapes can only merge runs, so the actual number of words may be less.
pub fn max_words(line: &str) -> usize {
    let mut count = 0;
    let mut was_space = true;

    for c in line.chars() {
        let space = c.is_whitespace();
        if was_space && !space {
            count += 1;
        }
        was_space = space;
    }

    count
}

/// Split the line into words.
pub fn split(line: &str) -> Vec<String> {
    let mut words = Vec::with_capacity(max_words(line));
    words.extend(Words::new(line));
    words
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use googletest::prelude::*;

    use super::*;

    #[test]
    fn it_should_yield_nothing_for_blank_lines() {
        assert_that!(split("").is_empty(), eq(true));
        assert_that!(split(" \t  ").is_empty(), eq(true));
        assert_that!(split("\n").is_empty(), eq(true));
    }

    #[test]
    fn it_should_split_on_whitespace_runs() {
        let lines = ["one two 3 4 5", "  lead", "trail\t\t", "a\u{a0}b\u{2003} c"];

        for line in lines {
            let expected: Vec<&str> = line.split_whitespace().collect();
            assert_that!(split(line), eq(&expected));
        }
    }

    #[test]
    fn it_should_keep_escaped_whitespace() {
        assert_that!(split("a\\ b"), eq(&vec!["a b"]));
        assert_that!(split("\\a\\b\\c\\ 1 \\  \\ ' '\\\\"), eq(&vec!["abc 1", " ", "  \\"]));
    }

    #[test]
    fn it_should_strip_quotes() {
        assert_that!(split("'a b'"), eq(&vec!["a b"]));
        assert_that!(split("a'b c'd"), eq(&vec!["ab cd"]));
        assert_that!(split("\"a 'b\""), eq(&vec!["a 'b"]));
    }

    #[test]
    fn it_should_copy_the_other_quote_literally() {
        assert_that!(
            split("'\"''\"' \"'\"\\ abcxyz\\ \"'\"   '  ' \\\\"),
            eq(&vec!["\"\"", "' abcxyz '", "  ", "\\"])
        );
    }

    #[test]
    fn it_should_collapse_escaped_backslash() {
        assert_that!(split("a\\\\b"), eq(&vec!["a\\b"]));
        assert_that!(split("\\\\\\\\"), eq(&vec!["\\\\"]));
    }

    #[test]
    fn it_should_yield_empty_word_for_empty_quotes() {
        assert_that!(split("''"), eq(&vec![""]));
        assert_that!(split("\"\" x"), eq(&vec!["", "x"]));
        assert_that!(split("x''y"), eq(&vec!["xy"]));
    }

    #[test]
    fn it_should_treat_line_breaks_as_whitespace() {
        assert_that!(
            split("\ta\nb\rc\\ c\\ c '' \"d \\\"d d\""),
            eq(&vec!["a", "b", "c c c", "", "d \"d d"])
        );
    }

    #[test]
    fn it_should_consume_unterminated_quote_to_end_of_line() {
        assert_that!(
            split("' \t \" ab z1 \\'"),
            eq(&vec![" \t \" ab z1 '"])
        );
        assert_that!(split("' ab1 [z] \\'\\' 4"), eq(&vec![" ab1 [z] '' 4"]));

        let mut words = Words::new("a \"b c");
        assert_that!(words.next(), eq(&Some(String::from("a"))));
        assert_that!(words.is_unterminated(), eq(false));
        assert_that!(words.next(), eq(&Some(String::from("b c"))));
        assert_that!(words.next().is_none(), eq(true));
        assert_that!(words.is_unterminated(), eq(true));
        assert_that!(words.quote_state(), eq(QuoteState::DoubleQuoted));
    }

    #[test]
    fn it_should_drop_dangling_backslash() {
        assert_that!(split("abc\\"), eq(&vec!["abc"]));
        assert_that!(split("\\"), eq(&vec![""]));
    }

    #[test]
    fn it_should_round_trip_plain_words() {
        let words = vec!["one", "2", "-three", "f0ur.5"];
        let line = words.join(" ");

        assert_that!(split(&line), eq(&words));
    }

    #[test]
    fn it_should_bound_word_count() {
        let lines = ["", "a b c", "'a b' c", "x''y", "a\\ b c"];

        for line in lines {
            assert_that!(split(line).len() <= max_words(line), eq(true));
        }

        assert_that!(max_words("  a  b\tc "), eq(3));
    }
}
