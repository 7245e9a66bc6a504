use std::net::IpAddr;

use bon::Builder;
use der::Encode;
use log::{debug, warn};
use x509_cert::certificate::CertificateInner;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::extensions::{
    BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage, KeyUsages,
    SubjectAltName, SubjectKeyIdentifier,
};
use crate::cert::params::{
    CertificateTemplate, DistinguishedName, ExtensionParam, Validity, generate_serial_number,
};
use crate::cert::{Certificate, CertificateWithPrivateKey, SignatureAlgorithm};
use crate::error::{Result, SelfTlsError};
use crate::key::{KeyPair, MIN_RSA_BITS};
use crate::tbs_certificate::TbsCertificate;

/// Organization written into the subject (and issuer) of every certificate by default.
pub const DEFAULT_ORGANIZATION: &str = "Etoron Tech Inc";
pub const DEFAULT_KEY_BITS: usize = 2048;
pub const DEFAULT_VALIDITY_DAYS: i64 = 365;

/// Largest modulus accepted; the `rsa` crate refuses to verify with bigger keys.
pub const MAX_RSA_BITS: usize = 4096;

/// Represents an entity capable of signing certificates.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Signs a certificate built from `template` for `subject_public_key_info`.
    ///
    /// Extensions are written as key usage, extended key usage, basic
    /// constraints, subject key identifier (CA only) and subject alternative
    /// names (only when there is at least one name). Every failure surfaces as
    /// `SigningError`.
    fn issue(
        &self,
        template: &CertificateTemplate,
        subject_public_key_info: SubjectPublicKeyInfoOwned,
    ) -> Result<Certificate> {
        sign_template(
            self.issuer_name(),
            self.signing_key(),
            template,
            subject_public_key_info,
        )
        .map_err(into_signing_error)
    }
}

fn sign_template(
    issuer: DistinguishedName,
    signing_key: &KeyPair,
    template: &CertificateTemplate,
    subject_public_key_info: SubjectPublicKeyInfoOwned,
) -> Result<Certificate> {
    let signature_algo = SignatureAlgorithm::Sha256WithRSA;
    let mut extensions: Vec<ExtensionParam> = Vec::new();

    if !template.key_usage.0.is_empty() {
        extensions.push(ExtensionParam::from_extension(&template.key_usage, true)?);
    }

    if !template.usages.is_empty() {
        let extended_key_usage = ExtendedKeyUsage {
            usage: template.usages.clone(),
        };
        extensions.push(ExtensionParam::from_extension(&extended_key_usage, false)?);
    }

    let basic_constraints = BasicConstraints {
        is_ca: template.is_ca,
        max_path_length: None,
    };
    extensions.push(ExtensionParam::from_extension(&basic_constraints, true)?);

    if template.is_ca {
        let ski = SubjectKeyIdentifier::from_public_key_bits(
            subject_public_key_info.subject_public_key.raw_bytes(),
        );
        extensions.push(ExtensionParam::from_extension(&ski, false)?);
    }

    if !template.subject_alt_name.is_empty() {
        extensions.push(ExtensionParam::from_extension(
            &template.subject_alt_name,
            false,
        )?);
    }

    let tbs_cert = TbsCertificate {
        serial_number: template.serial_number.clone(),
        signature_algorithm: signature_algo,
        issuer,
        validity: template.validity.clone(),
        subject: template.subject.clone(),
        subject_public_key_info,
        extensions,
    };

    let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
    let tbs_der = tbs_cert_inner
        .to_der()
        .map_err(|e| SelfTlsError::EncodingError(e.to_string()))?;
    let signature = signing_key.sign_data(&tbs_der)?;

    let cert_inner = CertificateInner {
        tbs_certificate: tbs_cert_inner,
        signature_algorithm: signature_algo.into(),
        signature: der::asn1::BitString::from_bytes(&signature)
            .map_err(|e| SelfTlsError::EncodingError(e.to_string()))?,
    };

    Ok(Certificate { inner: cert_inner })
}

fn into_signing_error(err: SelfTlsError) -> SelfTlsError {
    match err {
        SelfTlsError::SigningError(_) => err,
        other => SelfTlsError::SigningError(other.to_string()),
    }
}

// Helper struct for self-signed certificates
struct SelfIssuer<'a> {
    name: DistinguishedName,
    key: &'a KeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> DistinguishedName {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }
}

impl Certificate {
    /// Signs `template` with `key`, using the template subject as issuer.
    pub fn new_self_signed(template: &CertificateTemplate, key: &KeyPair) -> Result<Self> {
        let self_issuer = SelfIssuer {
            name: template.subject.clone(),
            key,
        };
        self_issuer.issue(template, key.as_spki()?)
    }
}

/// PEM output of a self-signed issuance.
#[derive(Clone, PartialEq, Eq)]
pub struct CertKeyPem {
    /// A single `CERTIFICATE` PEM block.
    pub certificate_pem: Vec<u8>,
    /// A single PKCS#1 `RSA PRIVATE KEY` PEM block.
    pub private_key_pem: Vec<u8>,
}

impl CertKeyPem {
    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>) {
        (self.certificate_pem, self.private_key_pem)
    }
}

impl std::fmt::Debug for CertKeyPem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertKeyPem")
            .field("certificate_pem", &String::from_utf8_lossy(&self.certificate_pem))
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

/// Settings for issuing self-signed server certificates.
///
/// `SelfSignedIssuer::default()` issues a 2048-bit RSA certificate for
/// `Etoron Tech Inc`, valid for 365 days.
///
/// ```rust,no_run
/// use selftls::issuer::SelfSignedIssuer;
///
/// # fn main() -> selftls::Result<()> {
/// let issuer = SelfSignedIssuer::builder()
///     .organization("Example Org".to_string())
///     .validity_days(30)
///     .build();
/// let pem = issuer.issue(&["localhost".to_string()], &["127.0.0.1".parse().unwrap()])?;
/// assert!(!pem.certificate_pem.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Builder, PartialEq, Eq)]
pub struct SelfSignedIssuer {
    #[builder(default = DEFAULT_ORGANIZATION.to_string())]
    pub organization: String,
    #[builder(default = DEFAULT_KEY_BITS)]
    pub key_bits: usize,
    #[builder(default = DEFAULT_VALIDITY_DAYS)]
    pub validity_days: i64,
}

impl Default for SelfSignedIssuer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SelfSignedIssuer {
    fn validate(&self) -> Result<()> {
        if !(MIN_RSA_BITS..=MAX_RSA_BITS).contains(&self.key_bits) {
            return Err(SelfTlsError::InvalidInput(format!(
                "RSA key size must be between {MIN_RSA_BITS} and {MAX_RSA_BITS} bits, got {}",
                self.key_bits
            )));
        }
        if self.validity_days <= 0 {
            return Err(SelfTlsError::InvalidInput(format!(
                "validity must be at least one day, got {}",
                self.validity_days
            )));
        }
        // GeneralizedTime cannot express years past 9999.
        let not_after = self
            .validity_days
            .checked_mul(86_400)
            .map(time::Duration::seconds)
            .and_then(|days| time::OffsetDateTime::now_utc().checked_add(days));
        if !not_after.is_some_and(|t| t.year() <= 9999) {
            return Err(SelfTlsError::InvalidInput(format!(
                "validity of {} days ends past year 9999",
                self.validity_days
            )));
        }
        Ok(())
    }

    /// Generates a key pair and a self-signed server certificate for it.
    pub fn issue_certificate(
        &self,
        dns_names: &[String],
        ip_addresses: &[IpAddr],
    ) -> Result<CertificateWithPrivateKey> {
        self.validate()?;

        if dns_names.is_empty() && ip_addresses.is_empty() {
            warn!("issuing certificate without DNS names or IP addresses");
        }

        let key = KeyPair::generate_rsa(self.key_bits)?;
        let validity = Validity::for_days(self.validity_days)?;
        let serial_number = generate_serial_number()?;

        debug!(
            "building certificate template serial={} dns_names={} ip_addresses={}",
            serial_number
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<String>(),
            dns_names.len(),
            ip_addresses.len()
        );

        let template = CertificateTemplate::builder()
            .serial_number(serial_number)
            .subject(
                DistinguishedName::builder()
                    .organization(self.organization.clone())
                    .build(),
            )
            .validity(validity)
            .subject_alt_name(SubjectAltName {
                dns_names: dns_names.to_vec(),
                ip_addresses: ip_addresses.to_vec(),
            })
            .is_ca(true)
            .key_usage(KeyUsage(
                KeyUsages::KeyEncipherment | KeyUsages::DigitalSignature | KeyUsages::KeyCertSign,
            ))
            .usages(vec![ExtendedKeyUsageOption::ServerAuth])
            .build();

        let cert = Certificate::new_self_signed(&template, &key)?;
        debug!(
            "signed self-signed certificate ({} DER bytes)",
            cert.to_der()?.len()
        );

        Ok(CertificateWithPrivateKey { cert, key })
    }

    /// Generates a key pair and a self-signed server certificate, returning both as PEM.
    pub fn issue(&self, dns_names: &[String], ip_addresses: &[IpAddr]) -> Result<CertKeyPem> {
        let CertificateWithPrivateKey { cert, key } =
            self.issue_certificate(dns_names, ip_addresses)?;

        Ok(CertKeyPem {
            certificate_pem: cert.to_pem()?.into_bytes(),
            private_key_pem: key.to_pkcs1_pem()?.into_bytes(),
        })
    }
}

/// Generates a self-signed certificate and matching 2048-bit RSA private key.
///
/// The certificate is a CA certificate for `Etoron Tech Inc`, valid for 365
/// days from now, usable for server authentication, and lists `dns_names`
/// and `ip_addresses` as subject alternative names. Both lists may be empty.
pub fn self_signed_cert_key(dns_names: &[String], ip_addresses: &[IpAddr]) -> Result<CertKeyPem> {
    SelfSignedIssuer::default().issue(dns_names, ip_addresses)
}
