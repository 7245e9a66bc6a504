use std::net::{IpAddr, Ipv4Addr};

use selftls::CertKeyPem;
use selftls::cert::Certificate;

pub fn issue_localhost() -> CertKeyPem {
    selftls::self_signed_cert_key(
        &["localhost".to_string()],
        &[IpAddr::V4(Ipv4Addr::LOCALHOST)],
    )
    .expect("Failed to issue certificate")
}

pub fn pem_str(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes).expect("PEM output is not UTF-8")
}

pub fn parse_cert(pem: &CertKeyPem) -> Certificate {
    Certificate::from_pem(pem_str(&pem.certificate_pem)).expect("Failed to parse certificate")
}
