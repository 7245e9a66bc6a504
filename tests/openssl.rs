mod util;

use std::fs;
use std::process::Command;

use openssl::nid::Nid;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::{X509, X509StoreContext};
use regex::Regex;

#[test]
fn test_openssl_crate_validate_cert() {
    let pem = util::issue_localhost();
    let x509 = X509::from_pem(&pem.certificate_pem).expect("Failed to parse PEM");

    // Check version
    assert_eq!(
        x509.version(),
        2,
        "X509 version should be 3 (0-based index)"
    );

    // Check subject and issuer
    for name in [x509.subject_name(), x509.issuer_name()] {
        let organization = name
            .entries_by_nid(Nid::ORGANIZATIONNAME)
            .next()
            .unwrap()
            .data()
            .as_utf8()
            .unwrap();
        assert_eq!(organization.to_string(), "Etoron Tech Inc");
    }

    // Check serial number fits in 128 bits
    let serial = x509.serial_number().to_bn().unwrap();
    assert!(serial.num_bits() <= 128, "Serial number exceeds 128 bits");

    // Both parsers agree on the serial
    let info = util::parse_cert(&pem).to_cert_info().unwrap();
    let magnitude: Vec<u8> = info
        .serial_number
        .iter()
        .copied()
        .skip_while(|b| *b == 0)
        .collect();
    assert_eq!(serial.to_vec(), magnitude);

    // Check signature algorithm
    assert_eq!(
        x509.signature_algorithm().object().nid(),
        Nid::SHA256WITHRSAENCRYPTION,
        "Signature algorithm should be sha256WithRSAEncryption"
    );

    // Check validity window
    let diff = x509.not_before().diff(x509.not_after()).unwrap();
    assert_eq!(diff.days, 365);
    assert_eq!(diff.secs, 0);

    // Check subject alternative names
    let names = x509.subject_alt_names().expect("Missing subject alt names");
    let dns: Vec<&str> = names.iter().filter_map(|n| n.dnsname()).collect();
    let ips: Vec<&[u8]> = names.iter().filter_map(|n| n.ipaddress()).collect();
    assert_eq!(dns, vec!["localhost"]);
    assert_eq!(ips, vec![&[127u8, 0, 0, 1][..]]);
}

#[test]
fn test_openssl_verifies_self_signature() {
    let pem = util::issue_localhost();
    let x509 = X509::from_pem(&pem.certificate_pem).unwrap();

    let public_key = x509.public_key().unwrap();
    assert!(x509.verify(&public_key).unwrap(), "Self-signature rejected");

    // Trust the certificate as its own root and build a chain to it.
    let mut store = X509StoreBuilder::new().unwrap();
    store.add_cert(x509.clone()).unwrap();
    let store = store.build();
    let chain: Stack<X509> = Stack::new().unwrap();
    let mut context = X509StoreContext::new().unwrap();
    let verified = context
        .init(&store, &x509, &chain, |c| c.verify_cert())
        .unwrap();
    assert!(verified, "OpenSSL rejected the certificate as a trust root");
}

#[test]
fn test_openssl_private_key_matches_certificate() {
    let pem = util::issue_localhost();
    let x509 = X509::from_pem(&pem.certificate_pem).unwrap();

    let rsa = Rsa::private_key_from_pem(&pem.private_key_pem).expect("Not a PKCS#1 RSA key");
    assert!(rsa.check_key().unwrap());
    assert_eq!(rsa.size() * 8, 2048);

    let private_key = PKey::from_rsa(rsa).unwrap();
    assert!(x509.public_key().unwrap().public_eq(&private_key));
}

#[test]
fn test_openssl_accepts_empty_names() {
    let pem = selftls::self_signed_cert_key(&[], &[]).unwrap();
    let x509 = X509::from_pem(&pem.certificate_pem).unwrap();

    assert!(x509.subject_alt_names().is_none());
    assert!(x509.verify(&x509.public_key().unwrap()).unwrap());
}

#[test]
#[ignore = "needs the openssl command line tool"]
fn test_openssl_validate_cert() {
    let pem = util::issue_localhost();

    // Save the certificate to a temporary file
    let cert_path = std::env::temp_dir().join(format!("selftls_cert_{}.pem", std::process::id()));
    fs::write(&cert_path, &pem.certificate_pem).expect("Failed to write certificate");

    // Use OpenSSL CLI to validate the generated certificate
    let output = Command::new("openssl")
        .arg("x509")
        .arg("-in")
        .arg(&cert_path)
        .arg("-noout")
        .arg("-text")
        .output()
        .expect("Failed to execute OpenSSL command");

    fs::remove_file(&cert_path).expect("Failed to remove test certificate");

    assert!(
        output.status.success(),
        "OpenSSL command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output_text = String::from_utf8_lossy(&output.stdout);

    // Validate static fields
    assert!(
        output_text.contains("Version: 3 (0x2)"),
        "Version field is incorrect"
    );
    assert!(
        output_text.contains("Signature Algorithm: sha256WithRSAEncryption"),
        "Signature Algorithm field is incorrect"
    );
    assert!(
        output_text.contains("Public-Key: (2048 bit)"),
        "Key size is incorrect"
    );
    assert!(output_text.contains("CA:TRUE"), "Basic constraints missing");
    assert!(
        output_text.contains("TLS Web Server Authentication"),
        "Extended key usage missing"
    );
    assert!(
        output_text.contains("DNS:localhost, IP Address:127.0.0.1"),
        "Subject alternative names are incorrect"
    );

    // Validate dynamic fields with regex
    let issuer_regex = Regex::new(r"Issuer: O ?= ?Etoron Tech Inc").unwrap();
    let subject_regex = Regex::new(r"Subject: O ?= ?Etoron Tech Inc").unwrap();
    let not_before_regex = Regex::new(r"Not Before: .+ GMT").unwrap();
    let not_after_regex = Regex::new(r"Not After : .+ GMT").unwrap();

    assert!(issuer_regex.is_match(&output_text), "Issuer field is incorrect");
    assert!(subject_regex.is_match(&output_text), "Subject field is incorrect");
    assert!(
        not_before_regex.is_match(&output_text),
        "Missing or incorrect Not Before field"
    );
    assert!(
        not_after_regex.is_match(&output_text),
        "Missing or incorrect Not After field"
    );
}
