//! Protection-scheme descriptors and their resolver.
//!
//! A descriptor names how a secret password is produced or recovered:
//!
//! ```text
//! descriptor := "pass:" text | "share:" options
//! options    := ["-t" threshold] ["-l" level] "-pass" descriptor path+
//! threshold  := 2..16 ; level := 128 | 192 | 256
//! ```
//!
//! The grammar is recursive — a share set's protector may itself be a share
//! set — so descriptors parse into the recursive [`Scheme`] value and the
//! resolver walks it, rather than re-testing string prefixes at each level.

pub mod key_container;
pub mod share_scheme;
pub mod tokenize;

use std::path::PathBuf;

use crate::config::Config;
use crate::entropy::generator::Generator;
use crate::error::Error;
use crate::secure::SecretPassword;
use crate::storage::OverwritePrompt;

/// Nominal symmetric-equivalent strength, fixing secret and key lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    L128,
    L192,
    L256,
}

impl SecurityLevel {
    pub fn bits(self) -> u32 {
        match self {
            SecurityLevel::L128 => 128,
            SecurityLevel::L192 => 192,
            SecurityLevel::L256 => 256,
        }
    }

    /// Length of a generated shared secret.
    pub fn secret_len(self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Wire length of one share: secret length plus the index byte.
    pub fn share_payload_len(self) -> usize {
        self.secret_len() + 1
    }

    /// Raw private-key length at this level (32/48/64 bytes).
    pub fn key_len(self) -> usize {
        (self.bits() / 4) as usize
    }

    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            128 => Some(SecurityLevel::L128),
            192 => Some(SecurityLevel::L192),
            256 => Some(SecurityLevel::L256),
            _ => None,
        }
    }

    pub fn from_share_payload_len(len: usize) -> Option<Self> {
        match len {
            17 => Some(SecurityLevel::L128),
            25 => Some(SecurityLevel::L192),
            33 => Some(SecurityLevel::L256),
            _ => None,
        }
    }

    pub fn from_key_len(len: usize) -> Option<Self> {
        match len {
            32 => Some(SecurityLevel::L128),
            48 => Some(SecurityLevel::L192),
            64 => Some(SecurityLevel::L256),
            _ => None,
        }
    }
}

/// Parameters of a `share:` scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareParams {
    /// Shares required to reconstruct (2..=16).
    pub threshold: u8,
    /// Security level; `None` means unspecified (`-l0` or absent), which
    /// defaults to 256 on generation and auto-detects on recovery.
    pub level: Option<SecurityLevel>,
    /// The nested descriptor protecting each share container.
    pub protector: Box<Scheme>,
    /// Share file paths.
    pub files: Vec<PathBuf>,
}

/// A parsed protection-scheme descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    /// A literal passphrase, used verbatim.
    Pass(String),
    /// An M-of-N share set.
    Share(ShareParams),
}

impl Scheme {
    /// Parses a descriptor string.
    pub fn parse(descriptor: &str) -> Result<Self, Error> {
        if let Some(text) = descriptor.strip_prefix("pass:") {
            return Ok(Scheme::Pass(text.to_owned()));
        }
        if let Some(args) = descriptor.strip_prefix("share:") {
            return parse_share(args).map(Scheme::Share);
        }
        Err(Error::Parameter)
    }
}

fn parse_share(args: &str) -> Result<ShareParams, Error> {
    let tokens = tokenize::tokenize(args)?;

    let mut threshold: Option<u8> = None;
    let mut level: Option<Option<SecurityLevel>> = None;
    let mut protector: Option<Box<Scheme>> = None;
    let mut files: Vec<PathBuf> = Vec::new();

    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        if token == "-pass" {
            if protector.is_some() {
                return Err(Error::DuplicateOption);
            }
            let nested = iter.next().ok_or(Error::Parameter)?;
            protector = Some(Box::new(Scheme::parse(&nested)?));
        } else if let Some(value) = token.strip_prefix("-t") {
            if threshold.is_some() {
                return Err(Error::DuplicateOption);
            }
            let t: u8 = value.parse().map_err(|_| Error::Parameter)?;
            if !(2..=16).contains(&t) {
                return Err(Error::Parameter);
            }
            threshold = Some(t);
        } else if let Some(value) = token.strip_prefix("-l") {
            if level.is_some() {
                return Err(Error::DuplicateOption);
            }
            let bits: u32 = value.parse().map_err(|_| Error::Parameter)?;
            if bits == 0 {
                level = Some(None);
            } else {
                level = Some(Some(SecurityLevel::from_bits(bits).ok_or(Error::Parameter)?));
            }
        } else if token.starts_with('-') {
            return Err(Error::Parameter);
        } else {
            files.push(PathBuf::from(token));
        }
    }

    Ok(ShareParams {
        threshold: threshold.unwrap_or(2),
        level: level.unwrap_or(None),
        protector: protector.ok_or(Error::Parameter)?,
        files,
    })
}

/// Produces a new secret password under the scheme: a `pass:` literal is
/// duplicated as-is; a `share:` scheme draws a fresh secret from the
/// generator, splits it, and writes one protected container per share
/// file. Nested protectors are generated recursively first.
pub fn generate(
    scheme: &Scheme,
    cfg: &Config,
    gen: &mut Generator,
    prompt: &mut dyn OverwritePrompt,
) -> Result<SecretPassword, Error> {
    match scheme {
        Scheme::Pass(text) => SecretPassword::from_text(text),
        Scheme::Share(params) => share_scheme::generate(params, cfg, gen, prompt),
    }
}

/// Recovers the secret password under the scheme: a `pass:` literal is
/// duplicated as-is; a `share:` scheme reads and unwraps the supplied
/// containers and recombines the shares. Needs no randomness.
pub fn read(scheme: &Scheme) -> Result<SecretPassword, Error> {
    match scheme {
        Scheme::Pass(text) => SecretPassword::from_text(text),
        Scheme::Share(params) => share_scheme::recover(params),
    }
}
