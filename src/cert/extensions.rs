use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use const_oid::AssociatedOid;
use der::{
    Decode, Encode,
    asn1::{Ia5String, OctetString},
    oid::ObjectIdentifier,
};
use x509_cert::ext::pkix::name::GeneralName;

use crate::error::SelfTlsError;

/// Trait for converting to and from X.509 extensions.
///
/// This trait provides methods to encode and decode X.509 extension values.
///
/// # Example
/// ```
/// use selftls::cert::extensions::{SubjectAltName, ToAndFromX509Extension};
/// let san = SubjectAltName {
///     dns_names: vec!["example.com".to_string()],
///     ip_addresses: vec!["10.0.0.1".parse().unwrap()],
/// };
/// let encoded = san.to_x509_extension_value().unwrap();
/// let decoded = SubjectAltName::from_x509_extension_value(&encoded).unwrap();
/// assert_eq!(san, decoded);
/// ```
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfTlsError>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SelfTlsError>
    where
        Self: Sized;
}

/// Represents the Subject Alternative Name (SAN) extension.
///
/// DNS names are written first, then IP addresses, each list in the order given.
///
/// # Fields
/// * `dns_names` - DNS host names.
/// * `ip_addresses` - IPv4 or IPv6 addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAltName {
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
}

impl SubjectAltName {
    pub fn is_empty(&self) -> bool {
        self.dns_names.is_empty() && self.ip_addresses.is_empty()
    }
}

fn ip_to_octets(ip: &IpAddr) -> Vec<u8> {
    match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

fn ip_from_octets(octets: &[u8]) -> Result<IpAddr, SelfTlsError> {
    if let Ok(v4) = <[u8; 4]>::try_from(octets) {
        return Ok(IpAddr::V4(Ipv4Addr::from(v4)));
    }
    if let Ok(v6) = <[u8; 16]>::try_from(octets) {
        return Ok(IpAddr::V6(Ipv6Addr::from(v6)));
    }
    Err(SelfTlsError::DecodingError(format!(
        "IP address must be 4 or 16 octets, got {}",
        octets.len()
    )))
}

impl ToAndFromX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectAltName::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfTlsError> {
        let dns = self.dns_names.iter().map(|name| {
            Ia5String::new(name)
                .map(GeneralName::DnsName)
                .map_err(|e| SelfTlsError::InvalidInput(format!("DNS name {name:?}: {e}")))
        });
        let ips = self.ip_addresses.iter().map(|ip| {
            OctetString::new(ip_to_octets(ip))
                .map(GeneralName::IpAddress)
                .map_err(|e| SelfTlsError::InvalidInput(format!("IP address {ip}: {e}")))
        });
        let san = x509_cert::ext::pkix::SubjectAltName(dns.chain(ips).collect::<Result<_, _>>()?);

        san.to_der()
            .map_err(|e| SelfTlsError::EncodingError(e.to_string()))
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SelfTlsError> {
        let san = x509_cert::ext::pkix::SubjectAltName::from_der(extension)?;
        let mut decoded = Self::default();
        for name in san.0.iter() {
            match name {
                GeneralName::DnsName(dns) => decoded.dns_names.push(dns.to_string()),
                GeneralName::IpAddress(ip) => {
                    decoded.ip_addresses.push(ip_from_octets(ip.as_bytes())?)
                }
                _ => {
                    return Err(SelfTlsError::InvalidInput(
                        "Unsupported general name type".to_string(),
                    ));
                }
            }
        }
        Ok(decoded)
    }
}

/// Represents the Basic Constraints extension.
///
/// # Fields
/// * `is_ca` - Indicates if the certificate is a CA.
/// * `max_path_length` - The maximum number of intermediate CAs allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u8>,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfTlsError> {
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length,
        };

        bc.to_der()
            .map_err(|e| SelfTlsError::EncodingError(e.to_string()))
    }

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self, SelfTlsError> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint,
        })
    }
}

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

/// Represents the Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl Default for KeyUsage {
    fn default() -> Self {
        Self(FlagSet::empty())
    }
}

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfTlsError> {
        let ku = X509KeyUsage::from(self.0);
        ku.to_der()
            .map_err(|e| SelfTlsError::EncodingError(e.to_string()))
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SelfTlsError> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

/// Represents the Extended Key Usage extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedKeyUsage {
    pub usage: Vec<ExtendedKeyUsageOption>,
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::ExtendedKeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfTlsError> {
        let oids: Vec<ObjectIdentifier> = self.usage.iter().map(|v| (*v).into()).collect();
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage(oids);
        eku.to_der()
            .map_err(|e| SelfTlsError::EncodingError(e.to_string()))
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SelfTlsError> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(extension)?;
        let usage = eku.0.into_iter().map(ExtendedKeyUsageOption::from).collect();
        Ok(Self { usage })
    }
}

/// Represents an option for the Extended Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedKeyUsageOption {
    ServerAuth,
    /// Any purpose this crate does not name.
    Other(ObjectIdentifier),
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::Other(oid) => oid,
        }
    }
}

impl From<ObjectIdentifier> for ExtendedKeyUsageOption {
    fn from(oid: ObjectIdentifier) -> Self {
        match oid {
            const_oid::db::rfc5912::ID_KP_SERVER_AUTH => ExtendedKeyUsageOption::ServerAuth,
            other => ExtendedKeyUsageOption::Other(other),
        }
    }
}

/// Represents the Subject Key Identifier (SKI) extension.
///
/// `from_public_key_bits` derives the identifier as the SHA-1 digest of the
/// subjectPublicKey bit string (RFC 5280, section 4.2.1.2, method 1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectKeyIdentifier {
    pub key_identifier: Vec<u8>,
}

impl SubjectKeyIdentifier {
    pub fn from_public_key_bits(public_key_bits: &[u8]) -> Self {
        let digest = <sha1::Sha1 as sha1::Digest>::digest(public_key_bits);
        Self {
            key_identifier: digest.to_vec(),
        }
    }
}

impl ToAndFromX509Extension for SubjectKeyIdentifier {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectKeyIdentifier::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, SelfTlsError> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier(
            OctetString::new(self.key_identifier.as_slice())
                .map_err(|e| SelfTlsError::EncodingError(e.to_string()))?,
        );
        ski.to_der()
            .map_err(|e| SelfTlsError::EncodingError(e.to_string()))
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, SelfTlsError> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier::from_der(extension)?;
        Ok(Self {
            key_identifier: ski.0.as_bytes().to_vec(),
        })
    }
}
