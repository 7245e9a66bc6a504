use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{GeneralizedTime, UtcTime};
use der::{Any, Tag};
use rand_core::RngCore;
use time::Duration;
use time::OffsetDateTime;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use super::extensions::{KeyUsage, SubjectAltName, ToAndFromX509Extension};
pub use crate::cert::extensions::ExtendedKeyUsageOption;
use crate::error::{Result, SelfTlsError};

/// Number of random bytes in a serial number: values are drawn from [0, 2^128).
pub const SERIAL_NUMBER_BYTES: usize = 16;

/// Parameters for building a self-signed X.509 certificate.
///
/// # Fields
/// * `serial_number` - Big-endian serial number bytes.
/// * `subject` - The distinguished name of the subject, reused as issuer.
/// * `validity` - The `notBefore`/`notAfter` window.
/// * `subject_alt_name` - DNS names and IP addresses, attached verbatim.
/// * `is_ca` - Marks the certificate as a CA in basic constraints.
/// * `key_usage` - Key usage flags.
/// * `usages` - A list of extended key usage options.
#[derive(Clone, Debug, Builder)]
pub struct CertificateTemplate {
    pub serial_number: Vec<u8>,
    pub subject: DistinguishedName,
    pub validity: Validity,
    #[builder(default)]
    pub subject_alt_name: SubjectAltName,
    #[builder(default)]
    pub is_ca: bool,
    #[builder(default)]
    pub key_usage: KeyUsage,
    #[builder(default)]
    pub usages: Vec<ExtendedKeyUsageOption>,
}

/// Distinguished name of a certificate subject or issuer.
///
/// Only the organization attribute is written.
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub organization: Option<String>,
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509-compatible format.
    ///
    /// The organization is written as a PrintableString when every character
    /// allows it, and as a UTF8String otherwise.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName> {
        let mut rdns = Vec::new();
        if let Some(organization) = &self.organization {
            let tag = if organization.chars().all(is_printable) {
                Tag::PrintableString
            } else {
                Tag::Utf8String
            };
            let attr = AttributeTypeAndValue {
                oid: const_oid::db::rfc4519::O,
                value: Any::new(tag, organization.as_bytes())
                    .map_err(|e| SelfTlsError::EncodingError(e.to_string()))?,
            };
            let attr_set = der::asn1::SetOfVec::try_from(vec![attr])
                .map_err(|e| SelfTlsError::EncodingError(e.to_string()))?;
            rdns.push(RelativeDistinguishedName::from(attr_set));
        }
        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509-compatible format.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Result<Self> {
        let mut organization = None;

        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                if attr.oid == const_oid::db::rfc4519::O {
                    let value = String::from_utf8(attr.value.value().to_vec())
                        .map_err(|e| SelfTlsError::DecodingError(e.to_string()))?;
                    organization = Some(value);
                }
            }
        }

        Ok(DistinguishedName { organization })
    }
}

// PrintableString alphabet, X.680 section 41.4.
fn is_printable(c: char) -> bool {
    c.is_ascii_alphanumeric() || " '()+,-./:=?".contains(c)
}

/// Certificate validity period.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    ///
    /// The start is truncated to whole seconds, the precision X.509 times
    /// carry, so the encoded window is exactly `days` × 24 hours. A window
    /// that overflows the representable range yields `InvalidInput`.
    pub fn for_days(days: i64) -> Result<Self> {
        let now = OffsetDateTime::now_utc();
        let not_before = now.replace_nanosecond(0).unwrap_or(now);
        let not_after = days
            .checked_mul(86_400)
            .map(Duration::seconds)
            .and_then(|window| not_before.checked_add(window))
            .ok_or_else(|| {
                SelfTlsError::InvalidInput(format!("validity of {days} days is out of range"))
            })?;
        Ok(Self {
            not_before,
            not_after,
        })
    }

    pub fn duration(&self) -> Duration {
        self.not_after - self.not_before
    }

    pub fn to_x509_validity(&self) -> Result<x509_cert::time::Validity> {
        Ok(x509_cert::time::Validity {
            not_before: to_x509_time(self.not_before)?,
            not_after: to_x509_time(self.not_after)?,
        })
    }

    pub fn from_x509_validity(validity: &x509_cert::time::Validity) -> Self {
        Self {
            not_before: OffsetDateTime::from(validity.not_before.to_system_time()),
            not_after: OffsetDateTime::from(validity.not_after.to_system_time()),
        }
    }
}

/// UTCTime through 2049, GeneralizedTime from 2050 on (RFC 5280, section 4.1.2.5).
fn to_x509_time(instant: OffsetDateTime) -> Result<x509_cert::time::Time> {
    let time = if instant.year() < 2050 {
        x509_cert::time::Time::UtcTime(UtcTime::from_system_time(instant.into())?)
    } else {
        x509_cert::time::Time::GeneralTime(GeneralizedTime::from_system_time(instant.into())?)
    };
    Ok(time)
}

/// Draws a serial number uniformly from [0, 2^128) using the OS random source.
pub fn generate_serial_number() -> Result<Vec<u8>> {
    generate_serial_number_with(&mut rand_core::OsRng)
}

/// Draws a serial number from `rng`; a failing source yields `SerialGenerationError`.
pub fn generate_serial_number_with<R: RngCore>(rng: &mut R) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; SERIAL_NUMBER_BYTES];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| SelfTlsError::SerialGenerationError(e.to_string()))?;
    Ok(bytes)
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: &E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use der::Tagged;

    use super::*;

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
            Err(NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap().into())
        }
    }

    #[test]
    fn test_serial_number_is_sixteen_bytes() {
        let a = generate_serial_number().unwrap();
        let b = generate_serial_number().unwrap();
        assert_eq!(a.len(), SERIAL_NUMBER_BYTES);
        assert_ne!(a, b);
    }

    #[test]
    fn test_failing_rng_yields_serial_generation_error() {
        let result = generate_serial_number_with(&mut FailingRng);
        assert!(matches!(result, Err(SelfTlsError::SerialGenerationError(_))));
    }

    #[test]
    fn test_validity_for_days_is_exact() {
        let validity = Validity::for_days(365).unwrap();
        assert_eq!(validity.duration(), Duration::hours(365 * 24));
        assert_eq!(validity.not_before.nanosecond(), 0);
    }

    #[test]
    fn test_overflowing_validity_is_rejected() {
        for days in [i64::MAX, i64::MIN, 1_000_000_000] {
            assert!(matches!(
                Validity::for_days(days),
                Err(SelfTlsError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_validity_survives_x509_conversion() {
        let validity = Validity::for_days(365).unwrap();
        let x509 = validity.to_x509_validity().unwrap();
        assert_eq!(Validity::from_x509_validity(&x509), validity);
    }

    #[test]
    fn test_far_future_uses_generalized_time() {
        let instant = OffsetDateTime::from_unix_timestamp(2_600_000_000).unwrap();
        assert!(matches!(
            to_x509_time(instant).unwrap(),
            x509_cert::time::Time::GeneralTime(_)
        ));
    }

    #[test]
    fn test_organization_roundtrip() {
        let dn = DistinguishedName::builder()
            .organization("Etoron Tech Inc".to_string())
            .build();
        let x509 = dn.as_x509_name().unwrap();
        assert_eq!(DistinguishedName::from_x509_name(&x509).unwrap(), dn);
    }

    #[test]
    fn test_non_printable_organization_uses_utf8() {
        let dn = DistinguishedName::builder()
            .organization("Zürich & Co".to_string())
            .build();
        let x509 = dn.as_x509_name().unwrap();
        let attr = x509.0[0].0.iter().next().unwrap();
        assert_eq!(attr.value.tag(), Tag::Utf8String);
        assert_eq!(DistinguishedName::from_x509_name(&x509).unwrap(), dn);
    }
}
