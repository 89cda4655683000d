//! `WWW-Authenticate` and `Authorization` header handling for L402.
//!
//! The challenge header is parsed with a small explicit grammar rather than
//! pattern matching, so that every failure names the part that did not match:
//!
//! ```text
//! challenge  = scheme 1*SP auth-param *( "," auth-param )
//! auth-param = name "=" ( quoted-string / token )
//! ```
//!
//! Parameters may appear in any order and unknown parameters are ignored.

use std::fmt;

use l402::{Credential, L402Error, MalformedChallengeError, MalformedReason};

use crate::constants::{
    AUTHORIZATION_HEADER, INVOICE_PARAM, L402_SCHEME, LSAT_SCHEME, MACAROON_PARAM, TOKEN_PARAM,
    WWW_AUTHENTICATE_HEADER,
};

/// Returns `true` if `scheme` names L402 (or its former name LSAT).
#[must_use]
pub fn is_l402_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case(L402_SCHEME) || scheme.eq_ignore_ascii_case(LSAT_SCHEME)
}

/// Returns the value of a `Name: value` header line if its name matches
/// `name` case-insensitively.
#[must_use]
pub fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (found, value) = line.split_once(':')?;
    found.trim().eq_ignore_ascii_case(name).then_some(value.trim())
}

/// Strips a leading `Name:` if present; otherwise returns the input trimmed.
fn strip_header_name<'a>(header: &'a str, name: &str) -> &'a str {
    header_value(header, name).unwrap_or_else(|| header.trim())
}

/// Returns the authentication scheme of a `WWW-Authenticate` value or line.
#[must_use]
pub fn challenge_scheme(header: &str) -> &str {
    let value = strip_header_name(header, WWW_AUTHENTICATE_HEADER);
    value
        .split_once(|c: char| c.is_ascii_whitespace())
        .map_or(value, |(scheme, _)| scheme)
}

/// Parses an L402 `WWW-Authenticate` challenge into a [`Credential`].
///
/// Accepts either the full header line (`www-authenticate: L402 ...`) or only
/// its value. The macaroon may be named `token` or `macaroon`.
///
/// # Errors
///
/// Returns [`L402Error::MalformedChallenge`] carrying the header text and a
/// [`MalformedReason`] naming the part that failed to match.
///
/// # Example
///
/// ```rust
/// use l402_http::headers::parse_www_authenticate;
///
/// let credential =
///     parse_www_authenticate(r#"www-authenticate: L402 token="abc123", invoice="lnbc1...""#)
///         .unwrap();
/// assert_eq!(credential.token(), "abc123");
/// assert_eq!(credential.invoice(), "lnbc1...");
/// ```
pub fn parse_www_authenticate(header: &str) -> Result<Credential, L402Error> {
    let malformed =
        |reason| L402Error::from(MalformedChallengeError::new(reason).with_header(header.trim()));

    let value = strip_header_name(header, WWW_AUTHENTICATE_HEADER);
    let (scheme, params) = value
        .split_once(|c: char| c.is_ascii_whitespace())
        .unwrap_or((value, ""));
    if !is_l402_scheme(scheme) {
        return Err(malformed(MalformedReason::WrongScheme(scheme.to_owned())));
    }

    let mut token = None;
    let mut invoice = None;
    for (name, value) in parse_auth_params(params).map_err(malformed)? {
        if name.eq_ignore_ascii_case(TOKEN_PARAM) || name.eq_ignore_ascii_case(MACAROON_PARAM) {
            token.get_or_insert(value);
        } else if name.eq_ignore_ascii_case(INVOICE_PARAM) {
            invoice.get_or_insert(value);
        }
    }

    let token = token.ok_or_else(|| malformed(MalformedReason::MissingParameter(TOKEN_PARAM)))?;
    let invoice =
        invoice.ok_or_else(|| malformed(MalformedReason::MissingParameter(INVOICE_PARAM)))?;
    if token.is_empty() {
        return Err(malformed(MalformedReason::EmptyParameter(TOKEN_PARAM)));
    }
    if invoice.is_empty() {
        return Err(malformed(MalformedReason::EmptyParameter(INVOICE_PARAM)));
    }
    Credential::new(token, invoice)
}

/// Splits the auth-param list of a challenge into `(name, value)` pairs.
fn parse_auth_params(input: &str) -> Result<Vec<(String, String)>, MalformedReason> {
    let is_separator = |c: char| c == ',' || c.is_ascii_whitespace();
    let mut params = Vec::new();
    let mut rest = input.trim_start_matches(is_separator);

    while !rest.is_empty() {
        let (name, after_name) = rest
            .split_once('=')
            .ok_or_else(|| MalformedReason::InvalidParameter(rest.trim_end().to_owned()))?;
        let name = name.trim();
        if name.is_empty() || name.contains(|c: char| is_separator(c) || c == '"') {
            return Err(MalformedReason::InvalidParameter(rest.trim_end().to_owned()));
        }

        let after_name = after_name.trim_start();
        let (value, after_value) = match after_name.strip_prefix('"') {
            Some(quoted) => read_quoted(quoted)
                .ok_or_else(|| MalformedReason::UnterminatedQuote(name.to_owned()))?,
            None => {
                let end = after_name.find(',').unwrap_or(after_name.len());
                (after_name[..end].trim_end().to_owned(), &after_name[end..])
            }
        };
        params.push((name.to_owned(), value));

        let after_value = after_value.trim_start();
        if !after_value.is_empty() && !after_value.starts_with(',') {
            return Err(MalformedReason::InvalidParameter(after_value.trim_end().to_owned()));
        }
        rest = after_value.trim_start_matches(is_separator);
    }
    Ok(params)
}

/// Reads a quoted-string body (after the opening quote), resolving
/// backslash escapes. Returns the value and the text after the closing quote.
fn read_quoted(input: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut chars = input.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            '"' => return Some((value, &input[index + 1..])),
            '\\' => value.push(chars.next()?.1),
            other => value.push(other),
        }
    }
    None
}

/// Returns the `Authorization` header value `L402 <token>:<preimage>`.
#[must_use]
pub fn authorization_value(token: &str, preimage: &str) -> String {
    format!("{L402_SCHEME} {token}:{preimage}")
}

/// Composes the resend header `Authorization: L402 <token>:<preimage>`.
///
/// The preimage is inserted verbatim: it is neither validated nor encoded, so
/// a preimage containing `:` or whitespace yields a header that is
/// well-formed text but will be rejected by the server.
///
/// # Example
///
/// ```rust
/// use l402::Credential;
/// use l402_http::headers::compose_authorization_header;
///
/// let credential = Credential::new("abc123", "lnbc1...").unwrap();
/// assert_eq!(
///     compose_authorization_header(&credential, "deadbeef"),
///     "Authorization: L402 abc123:deadbeef"
/// );
/// ```
#[must_use]
pub fn compose_authorization_header(credential: &Credential, preimage: &str) -> String {
    format!(
        "{AUTHORIZATION_HEADER}: {}",
        authorization_value(credential.token(), preimage)
    )
}

/// A parsed `Authorization: L402 <token>:<preimage>` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// The macaroon token from the original challenge.
    pub token: String,
    /// The payment preimage, as supplied by the client.
    pub preimage: String,
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&authorization_value(&self.token, &self.preimage))
    }
}

/// Parses an L402 `Authorization` header, with or without the header name.
///
/// # Errors
///
/// Returns [`L402Error::MalformedAuthorization`] if the scheme is not L402 or
/// the credentials are not exactly one non-empty token and one non-empty
/// preimage separated by `:`.
pub fn parse_authorization(header: &str) -> Result<Authorization, L402Error> {
    let malformed = || L402Error::MalformedAuthorization(header.trim().to_owned());

    let value = strip_header_name(header, AUTHORIZATION_HEADER);
    let (scheme, credentials) = value
        .split_once(|c: char| c.is_ascii_whitespace())
        .ok_or_else(malformed)?;
    if !is_l402_scheme(scheme) {
        return Err(malformed());
    }
    let credentials = credentials.trim();
    let (token, preimage) = credentials.split_once(':').ok_or_else(malformed)?;
    if token.is_empty()
        || preimage.is_empty()
        || preimage.contains(':')
        || credentials.contains(|c: char| c.is_ascii_whitespace())
    {
        return Err(malformed());
    }
    Ok(Authorization {
        token: token.to_owned(),
        preimage: preimage.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(err: L402Error) -> MalformedReason {
        match err {
            L402Error::MalformedChallenge(err) => err.reason,
            other => panic!("expected malformed challenge, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_reference_order() {
        let credential =
            parse_www_authenticate(r#"www-authenticate: L402 token="abc123", invoice="lnbc1...""#)
                .unwrap();
        assert_eq!(credential.token(), "abc123");
        assert_eq!(credential.invoice(), "lnbc1...");
    }

    #[test]
    fn test_parse_value_only() {
        let credential = parse_www_authenticate(r#"L402 token="abc", invoice="lnbc""#).unwrap();
        assert_eq!(credential.token(), "abc");
    }

    #[test]
    fn test_parse_reversed_order() {
        let credential =
            parse_www_authenticate(r#"L402 invoice="lnbc10n1pj", token="abc123""#).unwrap();
        assert_eq!(credential.token(), "abc123");
        assert_eq!(credential.invoice(), "lnbc10n1pj");
    }

    #[test]
    fn test_parse_macaroon_alias_and_lsat_scheme() {
        let credential =
            parse_www_authenticate(r#"LSAT macaroon="mac", invoice="inv""#).unwrap();
        assert_eq!(credential.token(), "mac");
        assert_eq!(credential.invoice(), "inv");
    }

    #[test]
    fn test_parse_case_insensitive_names() {
        let credential =
            parse_www_authenticate(r#"WWW-Authenticate: l402 Token="t", INVOICE="i""#).unwrap();
        assert_eq!(credential.token(), "t");
        assert_eq!(credential.invoice(), "i");
    }

    #[test]
    fn test_parse_ignores_unknown_params_and_extra_whitespace() {
        let credential = parse_www_authenticate(
            r#"L402   realm="api" ,token="t",  version=0 , invoice="i",,"#,
        )
        .unwrap();
        assert_eq!(credential.token(), "t");
        assert_eq!(credential.invoice(), "i");
    }

    #[test]
    fn test_parse_unquoted_and_escaped_values() {
        let credential =
            parse_www_authenticate(r#"L402 token=abc, invoice="ln\"bc""#).unwrap();
        assert_eq!(credential.token(), "abc");
        assert_eq!(credential.invoice(), "ln\"bc");
    }

    #[test]
    fn test_parse_first_occurrence_wins() {
        let credential =
            parse_www_authenticate(r#"L402 token="first", token="second", invoice="i""#).unwrap();
        assert_eq!(credential.token(), "first");
    }

    #[test]
    fn test_parse_wrong_scheme() {
        let err = parse_www_authenticate(r#"Bearer realm="api""#).unwrap_err();
        assert_eq!(reason(err), MalformedReason::WrongScheme("Bearer".into()));
    }

    #[test]
    fn test_parse_missing_params() {
        let err = parse_www_authenticate(r#"L402 invoice="lnbc""#).unwrap_err();
        assert_eq!(reason(err), MalformedReason::MissingParameter("token"));

        let err = parse_www_authenticate(r#"L402 token="abc""#).unwrap_err();
        assert_eq!(reason(err), MalformedReason::MissingParameter("invoice"));

        let err = parse_www_authenticate("L402").unwrap_err();
        assert_eq!(reason(err), MalformedReason::MissingParameter("token"));
    }

    #[test]
    fn test_parse_empty_params() {
        let err = parse_www_authenticate(r#"L402 token="", invoice="lnbc""#).unwrap_err();
        assert_eq!(reason(err), MalformedReason::EmptyParameter("token"));

        let err = parse_www_authenticate(r#"L402 token="abc", invoice="""#).unwrap_err();
        assert_eq!(reason(err), MalformedReason::EmptyParameter("invoice"));
    }

    #[test]
    fn test_parse_unterminated_quote() {
        let err = parse_www_authenticate(r#"L402 token="abc, invoice="lnbc"#).unwrap_err();
        assert_eq!(
            reason(err),
            MalformedReason::InvalidParameter(r#"lnbc"#.into())
        );

        let err = parse_www_authenticate(r#"L402 token="abc", invoice="lnbc"#).unwrap_err();
        assert_eq!(reason(err), MalformedReason::UnterminatedQuote("invoice".into()));
    }

    #[test]
    fn test_parse_missing_comma() {
        let err = parse_www_authenticate(r#"L402 token="abc" invoice="lnbc""#).unwrap_err();
        assert_eq!(
            reason(err),
            MalformedReason::InvalidParameter(r#"invoice="lnbc""#.into())
        );
    }

    #[test]
    fn test_parse_error_carries_header_text() {
        let header = r#"www-authenticate: L402 token="abc""#;
        match parse_www_authenticate(header).unwrap_err() {
            L402Error::MalformedChallenge(err) => assert_eq!(err.header.as_deref(), Some(header)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_challenge_scheme() {
        assert_eq!(challenge_scheme(r#"www-authenticate: L402 token="a""#), "L402");
        assert_eq!(challenge_scheme(r#"Bearer realm="x""#), "Bearer");
        assert_eq!(challenge_scheme("Negotiate"), "Negotiate");
    }

    #[test]
    fn test_compose_reference_scenario() {
        let credential =
            parse_www_authenticate(r#"www-authenticate: L402 token="abc123", invoice="lnbc1...""#)
                .unwrap();
        assert_eq!(
            compose_authorization_header(&credential, "deadbeef"),
            "Authorization: L402 abc123:deadbeef"
        );
    }

    #[test]
    fn test_compose_inserts_preimage_verbatim() {
        let credential = Credential::new("T", "I").unwrap();
        for preimage in ["", "a:b", " spaced out ", "deadbeef"] {
            assert_eq!(
                compose_authorization_header(&credential, preimage),
                format!("Authorization: L402 T:{preimage}")
            );
        }
    }

    #[test]
    fn test_authorization_value() {
        assert_eq!(authorization_value("mac", "pre"), "L402 mac:pre");
    }

    #[test]
    fn test_parse_authorization() {
        let auth = parse_authorization("Authorization: L402 abc123:deadbeef").unwrap();
        assert_eq!(auth.token, "abc123");
        assert_eq!(auth.preimage, "deadbeef");
        assert_eq!(auth.to_string(), "L402 abc123:deadbeef");

        let auth = parse_authorization("LSAT mac:pre").unwrap();
        assert_eq!(auth.token, "mac");
    }

    #[test]
    fn test_parse_authorization_rejects_malformed() {
        for header in [
            "Authorization: Bearer abc",
            "L402 abc123",
            "L402 :deadbeef",
            "L402 abc123:",
            "L402 abc:def:ghi",
            "L402 abc: def",
            "L402",
        ] {
            assert!(
                matches!(
                    parse_authorization(header),
                    Err(L402Error::MalformedAuthorization(_))
                ),
                "{header} should be rejected"
            );
        }
    }

    #[test]
    fn test_compose_then_parse_authorization() {
        let credential = Credential::new("AgEIbG9j", "lnbc1").unwrap();
        let header = compose_authorization_header(&credential, "00ff");
        let auth = parse_authorization(&header).unwrap();
        assert_eq!(auth.token, credential.token());
        assert_eq!(auth.preimage, "00ff");
    }
}
