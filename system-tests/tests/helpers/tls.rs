// system-tests/tests/helpers/tls.rs
// ============================================================================
// Module: TLS Test Fixtures
// Description: Generate ephemeral gateway PKI and credential directories.
// Purpose: Avoid committing private keys while enabling TLS/mTLS coverage.
// Dependencies: rcgen, rustls-pki-types, tempfile
// ============================================================================

//! ## Overview
//! Generates a throwaway CA, a server certificate for `127.0.0.1`, and one
//! client identity per requested user. Files are laid out the way
//! `authgate-check` expects (`ca.crt`, `user.<id>.key`, `user.<id>.crt`); the
//! DER forms stay in memory so the gateway stub can serve and verify them.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use rcgen::BasicConstraints;
use rcgen::Certificate;
use rcgen::CertificateParams;
use rcgen::DistinguishedName;
use rcgen::DnType;
use rcgen::ExtendedKeyUsagePurpose;
use rcgen::IsCa;
use rcgen::Issuer;
use rcgen::KeyPair;
use rustls_pki_types::CertificateDer;
use rustls_pki_types::PrivateKeyDer;
use rustls_pki_types::PrivatePkcs8KeyDer;
use system_tests::config::SystemTestConfig;
use tempfile::TempDir;

/// Generated PKI plus the on-disk credential directory.
pub struct GatewayPki {
    _tempdir: TempDir,
    /// Directory holding `ca.crt` and the user identities.
    pub certs_dir: PathBuf,
    /// CA certificate that signed every other certificate.
    pub ca_der: CertificateDer<'static>,
    /// Server certificate chain (leaf only).
    pub server_chain: Vec<CertificateDer<'static>>,
    /// Server private key in PKCS#8 form.
    server_key: Vec<u8>,
    /// Client certificates keyed by user id (for example `user.alice`).
    pub users: BTreeMap<String, CertificateDer<'static>>,
}

impl GatewayPki {
    /// Returns the server private key.
    pub fn server_key(&self) -> PrivateKeyDer<'static> {
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.server_key.clone()))
    }

    /// Returns the user whose certificate matches `der`.
    pub fn user_for(&self, der: &CertificateDer<'_>) -> Option<&str> {
        self.users
            .iter()
            .find(|(_, cert)| cert.as_ref() == der.as_ref())
            .map(|(user, _)| user.as_str())
    }

    /// Replaces `ca.crt` with the CA from `other`, so the server chain no
    /// longer verifies.
    pub fn install_foreign_ca(&self, other: &Self) -> Result<(), Box<dyn std::error::Error>> {
        fs::copy(other.certs_dir.join("ca.crt"), self.certs_dir.join("ca.crt"))?;
        Ok(())
    }

    /// Removes `ca.crt` from the credential directory.
    pub fn remove_ca(&self) -> Result<(), Box<dyn std::error::Error>> {
        fs::remove_file(self.certs_dir.join("ca.crt"))?;
        Ok(())
    }
}

/// Generates a CA, a server certificate, and one identity per user id.
pub fn generate_gateway_pki(users: &[&str]) -> Result<GatewayPki, Box<dyn std::error::Error>> {
    let config = SystemTestConfig::load()?;
    let mut builder = tempfile::Builder::new();
    builder.prefix("authgate-certs").keep(config.keep_artifacts);
    let tempdir = match &config.run_root {
        Some(root) => {
            fs::create_dir_all(root)?;
            builder.tempdir_in(root)?
        }
        None => builder.tempdir()?,
    };
    let certs_dir = tempdir.path().to_path_buf();

    let (ca, issuer) = generate_ca()?;
    let (server, server_key_pair) = generate_server_cert(&issuer)?;
    fs::write(certs_dir.join("ca.crt"), ca.pem())?;

    let mut identities = BTreeMap::new();
    for user in users {
        let (client, client_key_pair) = generate_client_cert(&issuer, user)?;
        write_identity(&certs_dir, user, &client, &client_key_pair)?;
        identities.insert((*user).to_string(), client.der().clone());
    }

    Ok(GatewayPki {
        _tempdir: tempdir,
        certs_dir,
        ca_der: ca.der().clone(),
        server_chain: vec![server.der().clone()],
        server_key: server_key_pair.serialize_der(),
        users: identities,
    })
}

fn write_identity(
    dir: &Path,
    user: &str,
    cert: &Certificate,
    key: &KeyPair,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(dir.join(format!("{user}.crt")), cert.pem())?;
    fs::write(dir.join(format!("{user}.key")), key.serialize_pem())?;
    Ok(())
}

fn generate_ca() -> Result<(Certificate, Issuer<'static, KeyPair>), Box<dyn std::error::Error>> {
    let key = KeyPair::generate()?;
    let mut params = CertificateParams::default();
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.distinguished_name = distinguished_name("authgate-check Test CA");
    let cert = params.self_signed(&key)?;
    let issuer = Issuer::new(params, key);
    Ok((cert, issuer))
}

fn generate_server_cert(
    issuer: &Issuer<'_, KeyPair>,
) -> Result<(Certificate, KeyPair), Box<dyn std::error::Error>> {
    let key = KeyPair::generate()?;
    let mut params =
        CertificateParams::new(vec!["localhost".to_string(), "127.0.0.1".to_string()])?;
    params.distinguished_name = distinguished_name("authgate-check Test Gateway");
    params.is_ca = IsCa::NoCa;
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    let cert = params.signed_by(&key, issuer)?;
    Ok((cert, key))
}

fn generate_client_cert(
    issuer: &Issuer<'_, KeyPair>,
    user: &str,
) -> Result<(Certificate, KeyPair), Box<dyn std::error::Error>> {
    let key = KeyPair::generate()?;
    let mut params = CertificateParams::default();
    params.distinguished_name = distinguished_name(user);
    params.is_ca = IsCa::NoCa;
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ClientAuth];
    let cert = params.signed_by(&key, issuer)?;
    Ok((cert, key))
}

fn distinguished_name(common_name: &str) -> DistinguishedName {
    let mut name = DistinguishedName::new();
    name.push(DnType::CommonName, common_name);
    name
}
