use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};

use selftls::cert::Certificate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pem = selftls::self_signed_cert_key(
        &["localhost".to_string()],
        &[IpAddr::V4(Ipv4Addr::LOCALHOST)],
    )?;

    // Check the certificate before handing it out.
    let cert = Certificate::from_pem(std::str::from_utf8(&pem.certificate_pem)?)?;
    cert.verify_self_signed()?;
    let info = cert.to_cert_info()?;
    eprintln!(
        "issued certificate for {:?} {:?}, valid {} to {}",
        info.subject_alt_name.dns_names,
        info.subject_alt_name.ip_addresses,
        info.validity.not_before,
        info.validity.not_after
    );

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&pem.certificate_pem)?;
    stdout.write_all(&pem.private_key_pem)?;
    Ok(())
}
