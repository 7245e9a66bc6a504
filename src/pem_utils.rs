use crate::error::Result;

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
///
/// Lines are wrapped at 64 columns and terminated with `\n`.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Convert a PEM‑encoded string to DER‑encoded bytes, checking the label.
pub fn pem_to_der(pem_str: &str, expected_label: &str) -> Result<Vec<u8>> {
    let pem = pem::parse(pem_str)?;
    if pem.tag() != expected_label {
        return Err(crate::error::SelfTlsError::DecodingError(format!(
            "Expected {}, got {}",
            expected_label,
            pem.tag()
        )));
    }
    Ok(pem.contents().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_der_to_pem_delimiters() {
        let pem = der_to_pem(&[0x30, 0x03, 0x02, 0x01, 0x01], "CERTIFICATE");
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert!(pem.ends_with("-----END CERTIFICATE-----\n"));
        assert!(!pem.contains('\r'));
    }

    #[test]
    fn test_pem_to_der_rejects_wrong_label() {
        let pem = der_to_pem(&[1, 2, 3], "RSA PRIVATE KEY");
        assert!(pem_to_der(&pem, "CERTIFICATE").is_err());
        assert_eq!(pem_to_der(&pem, "RSA PRIVATE KEY").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_long_payload_wraps_at_64_columns() {
        let pem = der_to_pem(&[0xAB; 200], "CERTIFICATE");
        for line in pem.lines() {
            assert!(line.len() <= 64);
        }
    }
}
