//! # selftls - Self-Signed TLS Certificates in Pure Rust
//!
//! selftls produces a self-signed X.509 certificate and its matching RSA
//! private key, both PEM-encoded, for bootstrapping a server that needs HTTPS
//! without a certificate authority. It is built entirely on rustcrypto
//! libraries; OpenSSL is only used by the test suite to cross-check the output.
//!
//! ## What gets issued
//!
//! - a fresh **2048-bit RSA** key pair from the operating system's random source
//! - a random serial number in `[0, 2^128)`
//! - subject and issuer `O=Etoron Tech Inc`
//! - validity from now until now + 365 days
//! - key usage: key encipherment, digital signature, certificate signing
//! - extended key usage: server authentication
//! - basic constraints: CA
//! - subject alternative names: the DNS names and IP addresses you pass in
//!
//! The certificate is returned as a `CERTIFICATE` PEM block and the key as a
//! PKCS#1 `RSA PRIVATE KEY` PEM block.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::net::{IpAddr, Ipv4Addr};
//!
//! # fn main() -> Result<(), selftls::SelfTlsError> {
//! let pem = selftls::self_signed_cert_key(
//!     &["localhost".to_string()],
//!     &[IpAddr::V4(Ipv4Addr::LOCALHOST)],
//! )?;
//!
//! std::io::Write::write_all(&mut std::io::stdout(), &pem.certificate_pem).ok();
//! # Ok(())
//! # }
//! ```
//!
//! ### Changing the defaults
//!
//! ```rust,no_run
//! use selftls::issuer::SelfSignedIssuer;
//!
//! # fn main() -> Result<(), selftls::SelfTlsError> {
//! let issuer = SelfSignedIssuer::builder()
//!     .organization("Example Corp".to_string())
//!     .key_bits(3072)
//!     .validity_days(90)
//!     .build();
//! let pem = issuer.issue(&["dev.example.com".to_string()], &[])?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Inspecting the result
//!
//! ```rust,no_run
//! use selftls::cert::Certificate;
//!
//! # fn main() -> Result<(), selftls::SelfTlsError> {
//! let pem = selftls::self_signed_cert_key(&["localhost".to_string()], &[])?;
//! let cert = Certificate::from_pem(std::str::from_utf8(&pem.certificate_pem).unwrap())?;
//! cert.verify_self_signed()?;
//!
//! let info = cert.to_cert_info()?;
//! assert_eq!(info.subject_alt_name.dns_names, vec!["localhost".to_string()]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use selftls::{SelfTlsError, issuer::SelfSignedIssuer};
//!
//! match SelfSignedIssuer::builder().key_bits(512).build().issue(&[], &[]) {
//!     Ok(_) => println!("issued"),
//!     Err(SelfTlsError::InvalidInput(msg)) => println!("bad settings: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Logging
//!
//! Progress is reported through the [`log`](https://docs.rs/log) facade at
//! `debug` level. Private key material is never logged.
//!
//! ## Module Organization
//!
//! - [`issuer`]: the self-signed issuing operation and its settings
//! - [`key`]: RSA key generation, PKCS#1 import/export and signing
//! - [`cert`]: certificate encoding, decoding and inspection
//! - [`error`]: error types
//! - [`tbs_certificate`]: low-level certificate structure assembly
//! - [`pem_utils`]: PEM helpers

pub mod cert;
pub mod error;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod tbs_certificate;

pub use error::{Result, SelfTlsError};
pub use issuer::{CertKeyPem, SelfSignedIssuer, self_signed_cert_key};
