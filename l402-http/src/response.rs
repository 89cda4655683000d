//! Detection and extraction of L402 challenges from HTTP responses.
//!
//! Works on raw text as produced by `curl -i` (status line and headers
//! verbatim, then the body) or `curl -v` (response lines prefixed with `< `,
//! mixed with request, informational and body output), and on headers
//! already split into name/value pairs.

use l402::{Credential, L402Error, MalformedChallengeError, MalformedReason};

use crate::constants::{HTTP_STATUS_PAYMENT_REQUIRED, WWW_AUTHENTICATE_HEADER};
use crate::headers::{challenge_scheme, header_value, is_l402_scheme, parse_www_authenticate};

/// Result of inspecting a response for an L402 challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// The response is a 402 carrying a well-formed L402 challenge.
    Challenge(Credential),
    /// The response is not a 402; it should be passed through unchanged.
    NotAChallenge,
}

impl ChallengeOutcome {
    /// Returns `true` if the response carried a challenge.
    #[must_use]
    pub const fn is_challenge(&self) -> bool {
        matches!(self, Self::Challenge(_))
    }

    /// Returns the credential, if any.
    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        match self {
            Self::Challenge(credential) => Some(credential),
            Self::NotAChallenge => None,
        }
    }

    /// Converts the outcome into a credential for callers that require one.
    ///
    /// # Errors
    ///
    /// Returns [`L402Error::NotAChallenge`] for [`ChallengeOutcome::NotAChallenge`].
    pub fn into_credential(self) -> Result<Credential, L402Error> {
        match self {
            Self::Challenge(credential) => Ok(credential),
            Self::NotAChallenge => Err(L402Error::NotAChallenge),
        }
    }
}

/// Returns the content of a `<`-prefixed response line of a verbose
/// transcript.
fn verbose_line(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('<')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Returns the lines that belong to the response.
///
/// A transcript with a `<`-prefixed status line is verbose output: only its
/// `<` lines are response lines, everything else is request, informational
/// or body text. Otherwise every line is taken as is.
fn response_lines(raw: &str) -> Vec<&str> {
    let lines: Vec<&str> = raw.lines().map(|line| line.trim_end_matches('\r')).collect();
    let verbose = lines
        .iter()
        .any(|line| verbose_line(line).and_then(status_code).is_some());
    if verbose {
        lines.into_iter().filter_map(verbose_line).collect()
    } else {
        lines
    }
}

/// Parses an HTTP status line such as `HTTP/1.1 402 Payment Required` or
/// `HTTP/2 402`, returning the status code.
fn status_code(line: &str) -> Option<u16> {
    let mut parts = line.split_ascii_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

/// Returns the status code and header lines of the final response.
///
/// A message starts at its first non-empty line, which must be a status line.
/// Its headers end at the next blank line. An interim (1xx) or redirect (3xx)
/// response is skipped when another status line follows it. Body lines are
/// never read.
fn final_response<'s>(lines: &'s [&'s str]) -> Option<(u16, &'s [&'s str])> {
    let mut rest = lines;
    loop {
        let start = rest.iter().position(|line| !line.trim().is_empty())?;
        let status = status_code(rest[start])?;
        let block = &rest[start + 1..];
        let end = block
            .iter()
            .position(|line| line.trim().is_empty())
            .unwrap_or(block.len());
        let (headers, after) = block.split_at(end);
        let next_is_status = after
            .iter()
            .find(|line| !line.trim().is_empty())
            .is_some_and(|line| status_code(line).is_some());
        if matches!(status, 100..=199 | 300..=399) && next_is_status {
            rest = after;
            continue;
        }
        return Some((status, headers));
    }
}

/// Inspects a raw response transcript for an L402 challenge.
///
/// The transcript must start with a status line. Interim and redirect
/// responses are skipped; if the final response is not a `402` the result is
/// [`ChallengeOutcome::NotAChallenge`] and its headers are never looked at.
/// Otherwise the headers of the 402 response (up to the blank line that ends
/// them) are searched for an L402 `WWW-Authenticate` line; the first one
/// found is parsed. The body is never inspected.
///
/// # Errors
///
/// Returns [`L402Error::MalformedChallenge`] when the response is a 402 but
/// has no `WWW-Authenticate` header, none using the L402 scheme, or an L402
/// header that does not parse.
///
/// # Example
///
/// ```rust
/// use l402_http::response::{ChallengeOutcome, parse_response};
///
/// let raw = "HTTP/1.1 402 Payment Required\r\n\
///            content-length: 0\r\n\
///            www-authenticate: L402 token=\"abc\", invoice=\"lnbc1\"\r\n\r\n";
/// let credential = parse_response(raw).unwrap().into_credential().unwrap();
/// assert_eq!(credential.token(), "abc");
///
/// assert_eq!(
///     parse_response("HTTP/1.1 200 OK\r\n\r\nhello").unwrap(),
///     ChallengeOutcome::NotAChallenge
/// );
/// ```
#[cfg_attr(
    feature = "telemetry",
    tracing::instrument(name = "l402.parse_response", skip_all, err)
)]
pub fn parse_response(raw: &str) -> Result<ChallengeOutcome, L402Error> {
    let lines = response_lines(raw);
    let Some((HTTP_STATUS_PAYMENT_REQUIRED, headers)) = final_response(&lines) else {
        #[cfg(feature = "telemetry")]
        tracing::debug!("Final response is not a 402; passing it through");
        return Ok(ChallengeOutcome::NotAChallenge);
    };

    let candidates = headers
        .iter()
        .copied()
        .filter(|line| header_value(line, WWW_AUTHENTICATE_HEADER).is_some());
    select_challenge(candidates).map(ChallengeOutcome::Challenge)
}

/// Inspects a response that was already split into a status code and header
/// name/value pairs.
///
/// # Errors
///
/// Same as [`parse_response`].
pub fn parse_challenge_headers<'a, I>(
    status: u16,
    headers: I,
) -> Result<ChallengeOutcome, L402Error>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    if status != HTTP_STATUS_PAYMENT_REQUIRED {
        return Ok(ChallengeOutcome::NotAChallenge);
    }
    let candidates = headers
        .into_iter()
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(WWW_AUTHENTICATE_HEADER))
        .map(|(_, value)| value);
    select_challenge(candidates).map(ChallengeOutcome::Challenge)
}

/// Picks the first L402 challenge among `WWW-Authenticate` candidates.
///
/// A server may offer several schemes, one header each. When none is L402 the
/// first candidate is parsed anyway so the error names the scheme it found.
fn select_challenge<'a, I>(candidates: I) -> Result<Credential, L402Error>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut first = None;
    for candidate in candidates {
        if is_l402_scheme(challenge_scheme(candidate)) {
            return parse_www_authenticate(candidate);
        }
        first.get_or_insert(candidate);
    }
    match first {
        Some(candidate) => parse_www_authenticate(candidate),
        None => Err(MalformedChallengeError::new(MalformedReason::MissingHeader).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURL_INCLUDE: &str = "HTTP/1.1 402 Payment Required\r\n\
        date: Tue, 14 Oct 2025 10:00:00 GMT\r\n\
        content-type: text/plain\r\n\
        www-authenticate: L402 token=\"AgEIbG9j\", invoice=\"lnbc100n1p\"\r\n\
        content-length: 16\r\n\
        \r\n\
        payment required";

    const CURL_VERBOSE: &str = "*   Trying 127.0.0.1:8080...\n\
        * Connected to localhost (127.0.0.1) port 8080\n\
        > GET /v1/chat HTTP/1.1\n\
        > Host: localhost:8080\n\
        > User-Agent: curl/8.4.0\n\
        >\n\
        < HTTP/1.1 402 Payment Required\n\
        < content-length: 0\n\
        < www-authenticate: L402 token=\"abc123\", invoice=\"lnbc1...\"\n\
        < date: Tue, 14 Oct 2025 10:00:00 GMT\n\
        <\n\
        * Connection #0 to host localhost left intact\n";

    fn credential(raw: &str) -> Credential {
        parse_response(raw).unwrap().into_credential().unwrap()
    }

    fn reason(err: L402Error) -> MalformedReason {
        match err {
            L402Error::MalformedChallenge(err) => err.reason,
            other => panic!("expected malformed challenge, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_curl_include_output() {
        let credential = credential(CURL_INCLUDE);
        assert_eq!(credential.token(), "AgEIbG9j");
        assert_eq!(credential.invoice(), "lnbc100n1p");
    }

    #[test]
    fn test_parse_curl_verbose_transcript() {
        let credential = credential(CURL_VERBOSE);
        assert_eq!(credential.token(), "abc123");
        assert_eq!(credential.invoice(), "lnbc1...");
    }

    #[test]
    fn test_parse_http2_status_without_reason() {
        let raw = "HTTP/2 402\nwww-authenticate: L402 token=\"t\", invoice=\"i\"\n\n";
        assert_eq!(credential(raw).token(), "t");
    }

    #[test]
    fn test_unrelated_headers_do_not_matter() {
        let raw = "HTTP/1.1 402 Payment Required\n\
            x-www-authenticate-hint: nope\n\
            www-authenticate: Bearer realm=\"api\"\n\
            WWW-Authenticate: L402 invoice=\"i\", token=\"t\"\n\
            set-cookie: a=b\n\n";
        let credential = credential(raw);
        assert_eq!(credential.token(), "t");
        assert_eq!(credential.invoice(), "i");
    }

    #[test]
    fn test_not_a_challenge_ignores_headers() {
        let raw = "HTTP/1.1 200 OK\n\
            www-authenticate: garbage that would not parse\n\n\
            body";
        assert_eq!(parse_response(raw).unwrap(), ChallengeOutcome::NotAChallenge);
        assert_eq!(parse_response("").unwrap(), ChallengeOutcome::NotAChallenge);
        assert!(matches!(
            parse_response(raw).unwrap().into_credential(),
            Err(L402Error::NotAChallenge)
        ));
    }

    #[test]
    fn test_missing_header() {
        let raw = "HTTP/1.1 402 Payment Required\ncontent-length: 0\n\n";
        assert_eq!(
            reason(parse_response(raw).unwrap_err()),
            MalformedReason::MissingHeader
        );
    }

    #[test]
    fn test_header_in_body_is_not_used() {
        let raw = "HTTP/1.1 402 Payment Required\ncontent-length: 60\n\n\
            www-authenticate: L402 token=\"t\", invoice=\"i\"";
        assert_eq!(
            reason(parse_response(raw).unwrap_err()),
            MalformedReason::MissingHeader
        );
    }

    #[test]
    fn test_only_402_block_headers_are_used() {
        let raw = "HTTP/1.1 301 Moved Permanently\n\
            www-authenticate: L402 token=\"stale\", invoice=\"old\"\n\
            location: /paid\n\
            \n\
            HTTP/1.1 402 Payment Required\n\
            www-authenticate: L402 token=\"fresh\", invoice=\"new\"\n\n";
        assert_eq!(credential(raw).token(), "fresh");
    }

    #[test]
    fn test_transcript_in_body_of_ok_response() {
        let raw = "HTTP/1.1 200 OK\n\
            content-type: text/plain\n\
            \n\
            Example transcript:\n\
            HTTP/1.1 402 Payment Required\n\
            www-authenticate: L402 token=\"fromBody\", invoice=\"lnbcBODY\"\n";
        assert_eq!(parse_response(raw).unwrap(), ChallengeOutcome::NotAChallenge);
    }

    #[test]
    fn test_402_text_in_body_is_not_a_status_line() {
        let raw = "HTTP/1.1 200 OK\n\nHTTP/1.1 402 Payment Required\n\
            www-authenticate: L402 token=\"fromBody\", invoice=\"lnbcBODY\"\n";
        assert_eq!(parse_response(raw).unwrap(), ChallengeOutcome::NotAChallenge);
    }

    #[test]
    fn test_verbose_body_before_response_lines() {
        let raw = "HTTP/1.1 402 Payment Required\n\
            www-authenticate: L402 token=\"fromBody\", invoice=\"lnbcBODY\"\n\
            \n\
            * Connected to localhost (127.0.0.1) port 8080\n\
            > GET /docs HTTP/1.1\n\
            >\n\
            < HTTP/1.1 200 OK\n\
            < content-type: text/plain\n\
            <\n";
        assert_eq!(parse_response(raw).unwrap(), ChallengeOutcome::NotAChallenge);
    }

    #[test]
    fn test_verbose_challenge_after_body() {
        let raw = "payment required\n\
            * Connected to localhost (127.0.0.1) port 8080\n\
            < HTTP/1.1 402 Payment Required\n\
            < www-authenticate: L402 token=\"abc123\", invoice=\"lnbc1...\"\n\
            <\n";
        assert_eq!(credential(raw).token(), "abc123");
    }

    #[test]
    fn test_interim_response_is_skipped() {
        let raw = "HTTP/1.1 100 Continue\r\n\
            \r\n\
            HTTP/1.1 402 Payment Required\r\n\
            www-authenticate: L402 token=\"t\", invoice=\"i\"\r\n\
            \r\n";
        assert_eq!(credential(raw).token(), "t");
    }

    #[test]
    fn test_final_redirect_is_not_a_challenge() {
        let raw = "HTTP/1.1 302 Found\n\
            location: /elsewhere\n\
            \n\
            see HTTP/1.1 402 Payment Required\n";
        assert_eq!(parse_response(raw).unwrap(), ChallengeOutcome::NotAChallenge);
    }

    #[test]
    fn test_leading_text_is_not_a_response() {
        let raw = "Example transcript:\n\
            HTTP/1.1 402 Payment Required\n\
            www-authenticate: L402 token=\"t\", invoice=\"i\"\n\n";
        assert_eq!(parse_response(raw).unwrap(), ChallengeOutcome::NotAChallenge);
    }

    #[test]
    fn test_wrong_scheme_only() {
        let raw = "HTTP/1.1 402 Payment Required\nwww-authenticate: Bearer realm=\"x\"\n\n";
        assert_eq!(
            reason(parse_response(raw).unwrap_err()),
            MalformedReason::WrongScheme("Bearer".into())
        );
    }

    #[test]
    fn test_malformed_l402_header_reports_group() {
        let raw = "HTTP/1.1 402 Payment Required\nwww-authenticate: L402 token=\"abc\"\n\n";
        let err = parse_response(raw).unwrap_err();
        match err {
            L402Error::MalformedChallenge(err) => {
                assert_eq!(err.reason, MalformedReason::MissingParameter("invoice"));
                assert_eq!(
                    err.header.as_deref(),
                    Some("www-authenticate: L402 token=\"abc\"")
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_status_code() {
        assert_eq!(status_code("HTTP/1.1 402 Payment Required"), Some(402));
        assert_eq!(status_code("HTTP/2 402"), Some(402));
        assert_eq!(status_code("HTTP/1.1 200 OK"), Some(200));
        assert_eq!(status_code("GET / HTTP/1.1"), None);
        assert_eq!(status_code("the HTTP/1.1 402 in prose"), None);
    }

    #[test]
    fn test_parse_challenge_headers() {
        let headers = [
            ("Content-Type", "text/plain"),
            ("WWW-Authenticate", r#"L402 token="t", invoice="i""#),
        ];
        let outcome = parse_challenge_headers(402, headers).unwrap();
        assert_eq!(outcome.credential().map(Credential::token), Some("t"));

        let outcome = parse_challenge_headers(200, headers).unwrap();
        assert!(!outcome.is_challenge());

        let err = parse_challenge_headers(402, [("Content-Type", "text/plain")]).unwrap_err();
        assert_eq!(reason(err), MalformedReason::MissingHeader);
    }
}
