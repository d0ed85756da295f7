use lazy_static::lazy_static;
use regex::Regex;

// log_format ui_short '$remote_addr  $remote_user $http_x_real_ip [$time_local] "$request" '
//                     '$status $body_bytes_sent "$http_referer" '
//                     '"$http_user_agent" "$http_x_forwarded_for" "$http_X_REQUEST_ID" "$http_X_RB_USER" '
//                     '$request_time';
lazy_static! {
    static ref UI_SHORT_RECORD: Regex = Regex::new(concat!(
        r"^(?P<remote_addr>.+)\s+(?P<remote_user>.+)\s+(?P<http_x_real_ip>.+)\s+\[(?P<time_local>.+)\]\s+",
        r#""[A-Z]{1,} (?P<request>.+) .*"\s+(?P<status>.+)\s+(?P<body_bytes_send>.+)\s+"#,
        r#""(?P<http_referer>.+)"\s+"(?P<http_user_agent>.+)"\s+"(?P<http_x_forwarded_for>.+)"\s+"#,
        r#""(?P<http_X_REQUEST_ID>.+)"\s+"(?P<http_X_RB_USER>.+)"\s+(?P<request_time>.+)"#,
    ))
    .unwrap();
}

/// The two fields of an access log record that feed the report
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub url: String,
    pub duration: f64,
}

/// Parse one `ui_short` access log line
///
/// Returns `None` when the line does not match the record pattern or its
/// request time is not a non-negative decimal.
pub fn parse_line(line: &str) -> Option<ParsedRecord> {
    let captures = UI_SHORT_RECORD.captures(line)?;

    let duration: f64 = captures.name("request_time")?.as_str().trim().parse().ok()?;
    if !duration.is_finite() || duration < 0.0 {
        return None;
    }

    Some(ParsedRecord {
        url: captures.name("request")?.as_str().to_string(),
        duration,
    })
}
