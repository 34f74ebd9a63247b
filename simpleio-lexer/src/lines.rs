//! An assembler for reading logical lines from a byte stream.
//!
//! A logical line ends at the first newline that is neither escaped nor inside a quoted region.
//! An unquoted backslash-newline pair is a continuation: both characters are removed and the
//! next physical line is appended to the current one. Every other character, including quotes
//! and backslashes, is kept verbatim for the word tokenizer.

use std::fmt;
use std::io::{self, BufRead, ErrorKind};
use std::ops::Deref;
use std::string::String;
use std::vec::Vec;

use crate::Error;
use crate::quote::QuoteState;
use crate::words::Words;

/// A logical line read from a stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogicalLine {
    text: String,
    quote: QuoteState,
}

impl LogicalLine {
    /// Get the line content.
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Take the line content.
    #[inline(always)]
    pub fn into_string(self) -> String {
        self.text
    }

    /// Get the quoting state at the end of the line.
    #[inline(always)]
    pub fn quote_state(&self) -> QuoteState {
        self.quote
    }

    /// Evaluate if the stream ended inside a quoted region. Only the last line of a stream can
    /// be unterminated.
    #[inline(always)]
    pub fn is_unterminated(&self) -> bool {
        self.quote.is_quoted()
    }

    /// Split the line into words.
    #[inline(always)]
    pub fn words(&self) -> Words<'_> {
        Words::new(&self.text)
    }
}

impl Deref for LogicalLine {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for LogicalLine {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for LogicalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<str> for LogicalLine {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for LogicalLine {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl From<LogicalLine> for String {
    fn from(line: LogicalLine) -> Self {
        line.text
    }
}

/// The scanning state carried from one buffer refill to the next.
#[derive(Debug, Default)]
struct Scanner {
    quote: QuoteState,
    escaped: bool,
    newlines: usize,
}

impl Scanner {
    /// Append the bytes of `input` to `line` until the end of a logical line. Returns how many
    /// bytes were consumed and whether the line is complete.
    fn scan(&mut self, input: &[u8], line: &mut Vec<u8>) -> (usize, bool) {
        for (i, &b) in input.iter().enumerate() {
            if b == b'\n' {
                self.newlines += 1;
            }

            if self.escaped {
                self.escaped = false;

                // Continuation: remove the backslash already copied and skip the newline.
                if b == b'\n' && !self.quote.is_quoted() {
                    line.pop();
                } else {
                    line.push(b);
                }

                continue;
            }

            match b {
                b'\\' => {
                    self.escaped = true;
                    line.push(b);
                }

                b'\n' if !self.quote.is_quoted() => {
                    drop_cr(line);
                    return (i + 1, true);
                }

                _ => {
                    if let Some(next) = self.quote.transition(char::from(b)) {
                        self.quote = next;
                    }
                    line.push(b);
                }
            }
        }

        (input.len(), false)
    }
}

/// Drop a terminal carriage return from the line.
#[inline(always)]
fn drop_cr(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
}

/// Give an emptied buffer back to its owner, keeping its allocation.
#[inline(always)]
fn restore(line: &mut String, mut bytes: Vec<u8>) {
    bytes.clear();
    *line = String::from_utf8(bytes).unwrap_or_default();
}

/// A lazy, single-pass iterator over the logical lines of a stream.
#[derive(Debug)]
pub struct Lines<R> {
    reader: R,
    scanner: Scanner,
    done: bool,
}

impl<R: BufRead> Lines<R> {
    /// Create a line assembler reading from the given stream.
    pub fn new(reader: R) -> Self {
        Lines {
            reader,
            scanner: Scanner::default(),
            done: false,
        }
    }

    /// Get the number of physical lines consumed so far.
    #[inline(always)]
    pub fn line_number(&self) -> usize {
        self.scanner.newlines
    }

    /// Get back the underlying stream. Bytes buffered by the stream but not scanned yet are still
    /// available from it.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read the next logical line into `line`, replacing its content but reusing its
    /// allocation. Returns the quoting state at the end of the line, or `None` at the end of the
    /// stream.
    pub fn read_line(&mut self, line: &mut String) -> Result<Option<QuoteState>, Error> {
        let mut bytes = core::mem::take(line).into_bytes();
        bytes.clear();

        match self.read_bytes(&mut bytes) {
            Ok(true) => match String::from_utf8(bytes) {
                Ok(text) => *line = text,
                Err(err) => {
                    restore(line, err.into_bytes());
                    let err = io::Error::new(
                        ErrorKind::InvalidData,
                        "stream did not contain valid UTF-8",
                    );
                    return Err(self.fail(err));
                }
            },
            Ok(false) => {
                restore(line, bytes);
                return Ok(None);
            }
            Err(err) => {
                restore(line, bytes);
                return Err(self.fail(err));
            }
        }

        if self.scanner.quote.is_quoted() {
            log::debug!("stream ends inside a {:?} region", self.scanner.quote);
        }

        Ok(Some(self.scanner.quote))
    }

    /// End the sequence on a stream failure.
    fn fail(&mut self, err: io::Error) -> Error {
        self.done = true;
        log::warn!(
            "stream failed after {} physical lines: {}",
            self.scanner.newlines,
            err
        );
        err.into()
    }

    fn read_bytes(&mut self, line: &mut Vec<u8>) -> io::Result<bool> {
        if self.done {
            return Ok(false);
        }

        loop {
            let (consumed, complete) = {
                let available = match self.reader.fill_buf() {
                    Ok(available) => available,
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => return Err(err),
                };

                if available.is_empty() {
                    // End of stream: flush what remains as a final, unterminated line.
                    self.done = true;
                    let pending = !line.is_empty();
                    drop_cr(line);
                    return Ok(pending);
                }

                self.scanner.scan(available, line)
            };

            self.reader.consume(consumed);

            if complete {
                return Ok(true);
            }
        }
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = Result<LogicalLine, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut text = String::new();

        match self.read_line(&mut text) {
            Ok(Some(quote)) => Some(Ok(LogicalLine { text, quote })),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Create a line assembler reading from the given stream.
#[inline(always)]
pub fn lines<R: BufRead>(reader: R) -> Lines<R> {
    Lines::new(reader)
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Read};
    use std::vec;

    use googletest::prelude::*;

    use super::*;

    // Pairs of input stream and expected logical lines.
    const CASES: &[(&str, &[&str])] = &[
        ("", &[]),
        ("\n", &[""]),
        ("\n\n ", &["", "", " "]),
        ("abcxyz\n", &["abcxyz"]),
        ("x\n\ny\n", &["x", "", "y"]),
        ("a\\\nb\n", &["ab"]),
        ("AbC123\\\n...", &["AbC123..."]),
        ("!@#$;\\\\\ntest", &["!@#$;\\\\", "test"]),
        ("TEST\\\\\\\n123", &["TEST\\\\123"]),
        ("'a\nb'\n", &["'a\nb'"]),
        (
            "he'llo\nhello'1\nabc\\'\n \n",
            &["he'llo\nhello'1", "abc\\'", " "],
        ),
        ("a\"\n\"'a", &["a\"\n\"'a"]),
        ("crlf\r\nkeep\rcr\r\n", &["crlf", "keep\rcr"]),
        ("last\r", &["last"]),
        ("\r", &[""]),
        ("a\\\r\n", &["a\\"]),
        ("trailing\\", &["trailing\\"]),
        ("\\\n", &[]),
    ];

    fn assemble<R: BufRead>(reader: R) -> Vec<String> {
        lines(reader)
            .map(|line| line.map(LogicalLine::into_string))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn it_should_assemble_logical_lines() {
        for (input, expected) in CASES {
            assert_that!(assemble(input.as_bytes()), eq(&expected.to_vec()));
        }
    }

    #[test]
    fn it_should_not_depend_on_buffer_boundaries() {
        for (input, expected) in CASES {
            let reader = BufReader::with_capacity(1, input.as_bytes());
            assert_that!(assemble(reader), eq(&expected.to_vec()));
        }
    }

    #[test]
    fn it_should_keep_continuation_inside_quotes() {
        assert_that!(assemble("'a\\\nb'\n".as_bytes()), eq(&vec!["'a\\\nb'"]));
    }

    #[test]
    fn it_should_flag_unterminated_quote_at_end_of_stream() {
        let mut lines = lines("ok\n'open\nstill open".as_bytes());

        let line = lines.next().unwrap().unwrap();
        assert_that!(line.as_str(), eq("ok"));
        assert_that!(line.is_unterminated(), eq(false));

        let line = lines.next().unwrap().unwrap();
        assert_that!(line.as_str(), eq("'open\nstill open"));
        assert_that!(line.is_unterminated(), eq(true));
        assert_that!(line.quote_state(), eq(QuoteState::SingleQuoted));

        assert_that!(lines.next().is_none(), eq(true));
    }

    #[test]
    fn it_should_reuse_line_buffer() {
        let mut lines = lines("first line\nsecond\n".as_bytes());
        let mut line = String::with_capacity(64);

        assert_that!(
            lines.read_line(&mut line).unwrap(),
            eq(Some(QuoteState::Unquoted))
        );
        assert_that!(line, eq("first line"));
        assert_that!(line.capacity() >= 64, eq(true));

        assert_that!(
            lines.read_line(&mut line).unwrap(),
            eq(Some(QuoteState::Unquoted))
        );
        assert_that!(line, eq("second"));

        assert_that!(lines.read_line(&mut line).unwrap(), eq(None));
        assert_that!(line.is_empty(), eq(true));
        assert_that!(line.capacity() >= 64, eq(true));
        assert_that!(lines.line_number(), eq(2));
    }

    #[test]
    fn it_should_keep_line_buffer_on_errors() {
        let mut lines = lines(&b"\xff\n"[..]);
        let mut line = String::with_capacity(64);

        assert_that!(lines.read_line(&mut line).is_err(), eq(true));
        assert_that!(line.is_empty(), eq(true));
        assert_that!(line.capacity() >= 64, eq(true));

        assert_that!(lines.read_line(&mut line).unwrap(), eq(None));
        assert_that!(line.capacity() >= 64, eq(true));
    }

    #[test]
    fn it_should_give_back_unscanned_input() {
        let mut lines = lines("first\nrest".as_bytes());
        assert_that!(lines.next().unwrap().unwrap(), eq("first"));

        let mut rest = String::new();
        lines.into_inner().read_to_string(&mut rest).unwrap();
        assert_that!(rest, eq("rest"));
    }

    #[test]
    fn it_should_split_assembled_lines_into_words() {
        let mut lines = lines("1 2 3\n".as_bytes());

        let line = lines.next().unwrap().unwrap();
        assert_that!(line, eq("1 2 3"));
        assert_that!(line.words().collect::<Vec<_>>(), eq(&vec!["1", "2", "3"]));
        assert_that!(lines.next().is_none(), eq(true));
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn it_should_report_stream_errors_and_stop() {
        let reader = BufReader::new("a\nb".as_bytes().chain(Failing));
        let mut lines = lines(reader);

        assert_that!(lines.next().unwrap().unwrap().as_str(), eq("a"));

        let err = lines.next().unwrap().unwrap_err();
        assert_that!(
            matches!(err, Error::Stream(ref e) if e.kind() == ErrorKind::BrokenPipe),
            eq(true)
        );

        assert_that!(lines.next().is_none(), eq(true));
    }

    struct Interrupting<'a> {
        interrupted: bool,
        inner: &'a [u8],
    }

    impl Read for Interrupting<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn it_should_retry_interrupted_reads() {
        let reader = BufReader::new(Interrupting {
            interrupted: false,
            inner: b"a b\n",
        });

        assert_that!(assemble(reader), eq(&vec!["a b"]));
    }

    #[test]
    fn it_should_reject_invalid_utf8() {
        let mut lines = lines(&b"ok\n\xff\xfe\nnext\n"[..]);

        assert_that!(lines.next().unwrap().unwrap().as_str(), eq("ok"));

        let err = lines.next().unwrap().unwrap_err();
        assert_that!(
            matches!(err, Error::Stream(ref e) if e.kind() == ErrorKind::InvalidData),
            eq(true)
        );

        assert_that!(lines.next().is_none(), eq(true));
    }
}
