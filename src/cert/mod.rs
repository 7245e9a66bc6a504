pub mod extensions;
pub mod params;

use der::{Decode, Encode, EncodePem};
use extensions::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAltName, SubjectKeyIdentifier,
    ToAndFromX509Extension,
};
use params::{DistinguishedName, ExtendedKeyUsageOption, ExtensionParam, Validity};
use x509_cert::certificate::CertificateInner;

use crate::error::{Result, SelfTlsError};
use crate::pem_utils;

/// PEM label used for certificates.
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Represents the supported signature algorithms for certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption (PKCS#1 v1.5).
    Sha256WithRSA,
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RSA algorithm identifiers carry an explicit NULL parameter (RFC 4055).
    fn from(value: SignatureAlgorithm) -> Self {
        match value {
            SignatureAlgorithm::Sha256WithRSA => x509_cert::spki::AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: Some(der::Any::from(der::AnyRef::NULL)),
            },
        }
    }
}

/// Decoded view of the fields a self-signed certificate carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    /// Serial number as encoded (big-endian, possibly with a leading zero octet).
    pub serial_number: Vec<u8>,
    pub subject: DistinguishedName,
    pub issuer: DistinguishedName,
    pub validity: Validity,
    pub subject_alt_name: SubjectAltName,
    pub is_ca: bool,
    pub key_usage: KeyUsage,
    pub usages: Vec<ExtendedKeyUsageOption>,
    pub subject_key_identifier: Option<Vec<u8>>,
    /// DER-encoded SubjectPublicKeyInfo.
    pub subject_public_key_der: Vec<u8>,
}

/// Represents an X.509 certificate.
///
/// This struct provides methods to encode the certificate into DER or PEM formats.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| SelfTlsError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(pkcs8::LineEnding::LF)
            .map_err(|e| SelfTlsError::EncodingError(e.to_string()))
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der)?;
        Ok(Self { inner })
    }

    /// Decodes a single `CERTIFICATE` PEM block.
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        let der = pem_utils::pem_to_der(pem_str, CERTIFICATE_LABEL)?;
        Self::from_der(&der)
    }

    /// Extracts certificate information into a `CertificateInfo` object.
    pub fn to_cert_info(&self) -> Result<CertificateInfo> {
        let tbs = &self.inner.tbs_certificate;

        let extensions: Vec<ExtensionParam> = tbs
            .extensions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
            .collect();

        let subject_alt_name = find_extension::<SubjectAltName>(&extensions)?.unwrap_or_default();
        let is_ca = find_extension::<BasicConstraints>(&extensions)?
            .map(|bc| bc.is_ca)
            .unwrap_or(false);
        let key_usage = find_extension::<KeyUsage>(&extensions)?.unwrap_or_default();
        let usages = find_extension::<ExtendedKeyUsage>(&extensions)?
            .map(|eku| eku.usage)
            .unwrap_or_default();
        let subject_key_identifier =
            find_extension::<SubjectKeyIdentifier>(&extensions)?.map(|ski| ski.key_identifier);

        Ok(CertificateInfo {
            serial_number: tbs.serial_number.as_bytes().to_vec(),
            subject: DistinguishedName::from_x509_name(&tbs.subject)?,
            issuer: DistinguishedName::from_x509_name(&tbs.issuer)?,
            validity: Validity::from_x509_validity(&tbs.validity),
            subject_alt_name,
            is_ca,
            key_usage,
            usages,
            subject_key_identifier,
            subject_public_key_der: tbs.subject_public_key_info.to_der()?,
        })
    }

    /// Checks that issuer equals subject and that the signature verifies
    /// against the certificate's own public key.
    pub fn verify_self_signed(&self) -> Result<()> {
        let tbs = &self.inner.tbs_certificate;
        if tbs.issuer != tbs.subject {
            return Err(SelfTlsError::SigningError(
                "issuer differs from subject".to_string(),
            ));
        }

        let expected: x509_cert::spki::AlgorithmIdentifierOwned =
            SignatureAlgorithm::Sha256WithRSA.into();
        if self.inner.signature_algorithm.oid != expected.oid {
            return Err(SelfTlsError::SigningError(format!(
                "unsupported signature algorithm {}",
                self.inner.signature_algorithm.oid
            )));
        }

        let signature = self.inner.signature.as_bytes().ok_or_else(|| {
            SelfTlsError::SigningError("signature has unused bits".to_string())
        })?;
        crate::key::verify_signature(
            &tbs.subject_public_key_info.to_der()?,
            &tbs.to_der()?,
            signature,
        )
    }
}

fn find_extension<E: ToAndFromX509Extension>(extensions: &[ExtensionParam]) -> Result<Option<E>> {
    extensions
        .iter()
        .find(|ext| ext.oid == E::OID)
        .map(|ext| ext.to_extension())
        .transpose()
}

/// A certificate together with the key pair it was issued for.
#[derive(Debug, Clone)]
pub struct CertificateWithPrivateKey {
    pub cert: Certificate,
    pub key: crate::key::KeyPair,
}
