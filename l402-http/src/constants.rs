//! HTTP-specific constants for the L402 protocol.

/// Challenge header sent by the server on a 402 response.
pub const WWW_AUTHENTICATE_HEADER: &str = "WWW-Authenticate";

/// Header carrying the paid credential on the resend.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Authentication scheme name.
pub const L402_SCHEME: &str = "L402";

/// Former name of the scheme, still emitted by some servers.
pub const LSAT_SCHEME: &str = "LSAT";

/// Challenge parameter holding the macaroon.
pub const TOKEN_PARAM: &str = "token";

/// Alternative name for [`TOKEN_PARAM`] used by LSAT-era servers.
pub const MACAROON_PARAM: &str = "macaroon";

/// Challenge parameter holding the BOLT11 invoice.
pub const INVOICE_PARAM: &str = "invoice";

/// HTTP 402 Payment Required status code.
pub const HTTP_STATUS_PAYMENT_REQUIRED: u16 = 402;
