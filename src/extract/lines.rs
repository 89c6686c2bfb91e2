/// A span of one line in some text, excluding its trailing newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange<'t> {
    text: &'t str,
    pub start: usize,
    pub end: usize,
}

impl<'t> LineRange<'t> {
    pub fn value(&self) -> &'t str {
        &self.text[self.start..self.end]
    }
}

/// Lines of `text` starting in `[start, end)`, first to last.
pub fn walk_lines_forward(text: &str, start: usize, end: usize) -> LinesForward<'_> {
    LinesForward {
        text,
        pos: start,
        end: end.min(text.len()),
    }
}

/// Lines of `text` that precede the line starting at `before`, nearest first.
pub fn walk_lines_backward(text: &str, before: usize) -> LinesBackward<'_> {
    LinesBackward {
        text,
        pos: before.min(text.len()),
    }
}

pub struct LinesForward<'t> {
    text: &'t str,
    pos: usize,
    end: usize,
}

impl<'t> Iterator for LinesForward<'t> {
    type Item = LineRange<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.end {
            return None;
        }
        let start = self.pos;
        let end = self.text[start..]
            .find('\n')
            .map_or(self.text.len(), |i| start + i);
        self.pos = end + 1;
        Some(LineRange {
            text: self.text,
            start,
            end,
        })
    }
}

pub struct LinesBackward<'t> {
    text: &'t str,
    pos: usize,
}

impl<'t> Iterator for LinesBackward<'t> {
    type Item = LineRange<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos == 0 {
            return None;
        }
        let end = if self.text.as_bytes()[self.pos - 1] == b'\n' {
            self.pos - 1
        } else {
            self.pos
        };
        let start = self.text[..end].rfind('\n').map_or(0, |i| i + 1);
        self.pos = start;
        Some(LineRange {
            text: self.text,
            start,
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward() {
        let text = "one\ntwo\n\nfour\n";
        let lines: Vec<&str> = walk_lines_forward(text, 0, text.len())
            .map(|l| l.value())
            .collect();
        assert_eq!(lines, vec!["one", "two", "", "four"]);
    }

    #[test]
    fn test_forward_bounded() {
        let text = "one\ntwo\nthree";
        let lines: Vec<&str> = walk_lines_forward(text, 4, 8).map(|l| l.value()).collect();
        assert_eq!(lines, vec!["two"]);
        let tail: Vec<&str> = walk_lines_forward(text, 8, text.len())
            .map(|l| l.value())
            .collect();
        assert_eq!(tail, vec!["three"]);
    }

    #[test]
    fn test_backward() {
        let text = "one\ntwo\n\nfour\n";
        let lines: Vec<(usize, &str)> = walk_lines_backward(text, 9)
            .map(|l| (l.start, l.value()))
            .collect();
        assert_eq!(lines, vec![(8, ""), (4, "two"), (0, "one")]);
    }

    #[test]
    fn test_backward_from_start_is_empty() {
        assert_eq!(walk_lines_backward("abc", 0).count(), 0);
    }

    #[test]
    fn test_backward_stops_early() {
        let text = "a\nb\nc\nd\n";
        let mut lines = walk_lines_backward(text, 6);
        assert_eq!(lines.next().map(|l| l.value()), Some("c"));
        assert_eq!(lines.next().map(|l| l.value()), Some("b"));
    }
}
