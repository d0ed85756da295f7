use super::{Aggregate, ParseOutcome, RunStats, UrlStats};
use crate::Result;
use crate::log::{LogReader, ParsedRecord, parse_line};
use std::path::Path;

/// Number of lines between two progress messages
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Accumulates parsed records into per-URL durations and run totals
#[derive(Debug, Default)]
pub struct Aggregator {
    url_stats: UrlStats,
    stats: RunStats,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one line; `None` marks a line that failed to parse
    pub fn record(&mut self, record: Option<ParsedRecord>) {
        self.stats.total_lines += 1;

        if let Some(ParsedRecord { url, duration }) = record {
            self.stats.succeeded_lines += 1;
            self.stats.total_duration += duration;
            self.url_stats.entry(url).or_default().push(duration);
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn finish(self) -> Aggregate {
        Aggregate {
            url_stats: self.url_stats,
            stats: self.stats,
        }
    }
}

/// Streams a log file through the record parser and applies the error rate check
#[derive(Debug, Clone, Copy)]
pub struct LogParser {
    error_rate: f64,
}

impl LogParser {
    pub fn new(error_rate: f64) -> Self {
        Self { error_rate }
    }

    /// Parse the log file at `path`, gzip or plain
    pub fn parse(&self, path: &Path) -> Result<ParseOutcome> {
        let reader = LogReader::open(path)?;
        self.parse_reader(reader, &path.display().to_string())
    }

    /// Parse every line from `reader`; `source` only labels diagnostics
    pub fn parse_reader(&self, reader: LogReader, source: &str) -> Result<ParseOutcome> {
        tracing::info!("{} log parsing started", source);

        let mut aggregator = Aggregator::new();
        for line in reader.lines() {
            let line = line?;
            let record = match std::str::from_utf8(&line) {
                Ok(text) => {
                    let record = parse_line(text);
                    if record.is_none() {
                        tracing::info!("Cannot parse line: {}", text);
                    }
                    record
                }
                Err(e) => {
                    tracing::info!(
                        "Cannot parse line ({}): {}",
                        e,
                        String::from_utf8_lossy(&line)
                    );
                    None
                }
            };
            aggregator.record(record);

            let stats = aggregator.stats();
            if stats.total_lines % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "{} rows processed, {} succeeded",
                    stats.total_lines,
                    stats.succeeded_lines
                );
            }
        }

        let aggregate = aggregator.finish();
        let stats = aggregate.stats;
        tracing::info!(
            "{} log parsing finished: {} of {} lines parsed",
            source,
            stats.succeeded_lines,
            stats.total_lines
        );

        let error_fraction = stats.error_fraction();
        if error_fraction > self.error_rate {
            tracing::error!(
                "{:.3}% errors occurred during parsing {}, threshold is {:.3}%",
                error_fraction * 100.0,
                source,
                self.error_rate * 100.0
            );
            return Ok(ParseOutcome::Rejected {
                stats,
                error_fraction,
            });
        }

        Ok(ParseOutcome::Accepted(aggregate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"1.196.116.32 -  - [29/Jun/2017:03:50:22 +0300] "GET /api/v2/banner/25019354 HTTP/1.1" 200 927 "-" "Lynx/2.8.8dev.9 libwww-FM/2.14 SSL-MM/1.4.1 GNUTLS/2.10.5" "-" "1498697422-2190034393-4708-9752759" "dc7161be3" 0.390"#;
    const BAD: &str = r#"1.202.56.176 -  - [29/Jun/2017:09:48:16 +0300] "0" 400 166 "-" "-" "-" "-" "-" 0.005"#;

    fn parse(content: String, error_rate: f64) -> ParseOutcome {
        let reader = LogReader::from_reader(std::io::Cursor::new(content.into_bytes()));
        LogParser::new(error_rate)
            .parse_reader(reader, "test.log")
            .unwrap()
    }

    fn lines(good: usize, bad: usize) -> String {
        let mut content: Vec<&str> = std::iter::repeat_n(GOOD, good).collect();
        content.extend(std::iter::repeat_n(BAD, bad));
        content.join("\n")
    }

    #[test]
    fn test_aggregator_groups_by_url_in_encounter_order() {
        let mut aggregator = Aggregator::new();
        aggregator.record(Some(ParsedRecord {
            url: "/a".to_string(),
            duration: 0.5,
        }));
        aggregator.record(None);
        aggregator.record(Some(ParsedRecord {
            url: "/b".to_string(),
            duration: 0.25,
        }));
        aggregator.record(Some(ParsedRecord {
            url: "/a".to_string(),
            duration: 0.125,
        }));

        let aggregate = aggregator.finish();
        assert_eq!(aggregate.stats.total_lines, 4);
        assert_eq!(aggregate.stats.succeeded_lines, 3);
        assert_eq!(aggregate.stats.total_duration, 0.875);
        assert_eq!(aggregate.url_stats["/a"], vec![0.5, 0.125]);
        assert_eq!(aggregate.url_stats["/b"], vec![0.25]);
    }

    #[test]
    fn test_exactly_threshold_success_ratio_is_accepted() {
        match parse(lines(9, 1), 0.1) {
            ParseOutcome::Accepted(aggregate) => {
                assert_eq!(aggregate.stats.total_lines, 10);
                assert_eq!(aggregate.stats.succeeded_lines, 9);
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_below_threshold_success_ratio_is_rejected() {
        match parse(lines(8, 2), 0.1) {
            ParseOutcome::Rejected {
                stats,
                error_fraction,
            } => {
                assert_eq!(stats.total_lines, 10);
                assert_eq!(stats.succeeded_lines, 8);
                assert!((error_fraction - 0.2).abs() < 1e-12);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_single_malformed_line_is_rejected() {
        assert!(matches!(
            parse(BAD.to_string(), 0.1),
            ParseOutcome::Rejected { .. }
        ));
    }

    #[test]
    fn test_empty_input_is_accepted_with_zero_totals() {
        match parse(String::new(), 0.1) {
            ParseOutcome::Accepted(aggregate) => {
                assert_eq!(aggregate.stats, RunStats::default());
                assert!(aggregate.url_stats.is_empty());
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_counts_as_failed_line() {
        let mut bytes = format!("{}\n", GOOD).into_bytes();
        bytes.extend_from_slice(b"\xff\xfe broken\n");
        let reader = LogReader::from_reader(std::io::Cursor::new(bytes));

        match LogParser::new(1.0).parse_reader(reader, "test.log").unwrap() {
            ParseOutcome::Accepted(aggregate) => {
                assert_eq!(aggregate.stats.total_lines, 2);
                assert_eq!(aggregate.stats.succeeded_lines, 1);
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_total_duration_is_sum_of_parsed_lines() {
        match parse(lines(3, 0), 0.0) {
            ParseOutcome::Accepted(aggregate) => {
                assert_eq!(aggregate.stats.total_duration, 0.390 + 0.390 + 0.390);
                assert_eq!(aggregate.url_stats["/api/v2/banner/25019354"].len(), 3);
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }
}
