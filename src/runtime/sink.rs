/// The single capability handed to a running script: somewhere to put the
/// lines it prints.
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink {
    fn capture(&mut self, line: String);
}

impl OutputSink for Vec<String> {
    fn capture(&mut self, line: String) {
        self.push(line);
    }
}

/// Forwards every captured line to a callback as it is produced.
pub struct StreamingSink<F: FnMut(&str)> {
    on_line: F,
    captured: usize,
}

impl<F: FnMut(&str)> StreamingSink<F> {
    pub fn new(on_line: F) -> Self {
        Self {
            on_line,
            captured: 0,
        }
    }

    pub fn captured(&self) -> usize {
        self.captured
    }
}

impl<F: FnMut(&str)> OutputSink for StreamingSink<F> {
    fn capture(&mut self, line: String) {
        self.captured += 1;
        (self.on_line)(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_appends_in_order() {
        let mut log: Vec<String> = Vec::new();
        log.capture("a".to_string());
        log.capture("b".to_string());

        assert_eq!(log, vec!["a", "b"]);
    }

    #[test]
    fn test_streaming_sink_forwards_and_counts() {
        let mut seen = Vec::new();
        {
            let mut sink = StreamingSink::new(|line: &str| seen.push(line.to_uppercase()));
            sink.capture("hi".to_string());
            sink.capture("there".to_string());
            assert_eq!(sink.captured(), 2);
        }

        assert_eq!(seen, vec!["HI", "THERE"]);
    }
}
