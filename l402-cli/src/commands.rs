//! Subcommand implementations.
//!
//! Each command writes its result to `out` and reads interactive input from
//! `input`, so the whole flow can be driven from tests without a terminal.

use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::process;
use std::time::Duration;

use l402::{Caveat, CaveatKind, Credential, MacaroonEnvelope};
use l402_http::{
    ChallengeOutcome, compose_authorization_header, parse_response, parse_www_authenticate,
};

use crate::cli::{AuthorizeArgs, Command, CurlArgs, DecodeArgs, IdentityArgs, ParseArgs};
use crate::error::CliError;
use crate::identity::{EnvTokenProvider, IdentityToken, TokenProvider};

const PREIMAGE_PROMPT: &str = "Please enter the preimage after paying: ";

/// Dispatches a parsed subcommand.
///
/// # Errors
///
/// Returns the first error raised by the subcommand.
pub fn run<W: Write, R: BufRead>(
    command: &Command,
    out: &mut W,
    input: &mut R,
) -> Result<(), CliError> {
    match command {
        Command::Curl(args) => curl(args, out, input),
        Command::Parse(args) => parse(args, out, input),
        Command::Authorize(args) => authorize(args, out),
        Command::Decode(args) => decode(args, out),
        Command::Identity(args) => identity(args, out),
    }
}

/// Logs a failed command and writes `error: <message>` to `err`.
///
/// The message is written whatever the log filter, so a failing run is never
/// silent.
pub fn report_error<W: Write>(error: &CliError, err: &mut W) {
    tracing::error!(error = ?error, "command failed");
    let _ = writeln!(err, "error: {error}");
}

/// Runs the HTTP client and completes a challenge if one comes back.
///
/// # Errors
///
/// Returns [`CliError::Curl`] if the client cannot be spawned, and challenge
/// or input errors otherwise.
pub fn curl<W: Write, R: BufRead>(
    args: &CurlArgs,
    out: &mut W,
    input: &mut R,
) -> Result<(), CliError> {
    tracing::info!(program = %args.curl_bin, args = ?args.args, "running http client");
    let output = process::Command::new(&args.curl_bin)
        .args(&args.args)
        .output()
        .map_err(|source| CliError::Curl {
            program: args.curl_bin.clone(),
            source,
        })?;
    if !output.status.success() {
        tracing::warn!(status = %output.status, "http client exited unsuccessfully");
    }

    let mut transcript = String::from_utf8_lossy(&output.stdout).into_owned();
    transcript.push_str(&String::from_utf8_lossy(&output.stderr));

    let outcome = parse_response(&transcript)?;
    let Some(credential) = outcome.credential() else {
        tracing::debug!("response is not an L402 challenge");
        out.write_all(transcript.as_bytes())?;
        return Ok(());
    };

    write_credential(out, credential)?;
    let preimage = match &args.preimage {
        Some(preimage) => preimage.clone(),
        None => prompt_preimage(out, input)?,
    };
    writeln!(out, "Auth header to resend curl with: -H")?;
    writeln!(out, "\"{}\"", compose_authorization_header(credential, &preimage))?;
    Ok(())
}

/// Detects a challenge in a saved transcript.
///
/// # Errors
///
/// Returns I/O errors from reading the transcript and challenge errors.
pub fn parse<W: Write, R: BufRead>(
    args: &ParseArgs,
    out: &mut W,
    input: &mut R,
) -> Result<(), CliError> {
    let transcript = if args.input.as_os_str() == "-" {
        let mut buf = String::new();
        input.read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.input)?
    };

    match parse_response(&transcript)? {
        ChallengeOutcome::NotAChallenge => {
            out.write_all(transcript.as_bytes())?;
        }
        ChallengeOutcome::Challenge(credential) => {
            write_credential(out, &credential)?;
            if let Some(preimage) = &args.preimage {
                writeln!(out, "{}", compose_authorization_header(&credential, preimage))?;
            }
        }
    }
    Ok(())
}

/// Prints the `Authorization` header for a challenge header and preimage.
///
/// # Errors
///
/// Returns [`l402::L402Error::MalformedChallenge`] if the header does not parse.
pub fn authorize<W: Write>(args: &AuthorizeArgs, out: &mut W) -> Result<(), CliError> {
    let credential = parse_www_authenticate(&args.header)?;
    let header = compose_authorization_header(&credential, &args.preimage);
    if args.curl_flag {
        writeln!(out, "-H '{header}'")?;
    } else {
        writeln!(out, "{header}")?;
    }
    Ok(())
}

/// Prints the decoded fields of a macaroon.
///
/// # Errors
///
/// Returns decoding errors and JSON serialization errors.
pub fn decode<W: Write>(args: &DecodeArgs, out: &mut W) -> Result<(), CliError> {
    let envelope = MacaroonEnvelope::decode(&args.macaroon)?;
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &envelope)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{envelope}")?;
    if args.caveats {
        for caveat in &envelope.caveats {
            write_caveat(out, caveat)?;
        }
    }
    Ok(())
}

/// Prints the identity token as JSON.
///
/// # Errors
///
/// Returns [`CliError::Identity`] if the token is unavailable.
pub fn identity<W: Write>(args: &IdentityArgs, out: &mut W) -> Result<(), CliError> {
    let provider = EnvTokenProvider::new(&args.token_var, Duration::from_secs(args.timeout_secs));
    tracing::debug!(var = provider.var(), "reading identity token");
    write_identity(out, &provider)
}

fn write_identity<W: Write>(out: &mut W, provider: &dyn TokenProvider) -> Result<(), CliError> {
    let identity = IdentityToken::fetch(provider)?;
    serde_json::to_writer(&mut *out, &identity)?;
    writeln!(out)?;
    Ok(())
}

fn write_credential<W: Write>(out: &mut W, credential: &Credential) -> io::Result<()> {
    writeln!(out, "Token: {}", credential.token())?;
    writeln!(out, "Invoice: {}", credential.invoice())
}

fn write_caveat<W: Write>(out: &mut W, caveat: &Caveat) -> io::Result<()> {
    writeln!(out, "Caveat: {}", caveat.predicate())?;
    if caveat.kind() == CaveatKind::ThirdParty {
        if let Some(vid) = &caveat.verification_id {
            writeln!(out, "  vid: {}", hex::encode(vid))?;
        }
        if let Some(location) = &caveat.location {
            writeln!(out, "  cl: {location}")?;
        }
    }
    Ok(())
}

fn prompt_preimage<W: Write, R: BufRead>(out: &mut W, input: &mut R) -> Result<String, CliError> {
    write!(out, "{PREIMAGE_PROMPT}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CliError::usage("no preimage entered"));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
