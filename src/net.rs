//! Outbound connection setup.
//!
//! Builds the transport for a session: plain TCP, or TLS with roots taken
//! from the platform trust store. Certificate verification can be switched
//! off per connection for servers running self-signed certificates.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{
    ClientConfig, DigitallySignedStruct, Error as RustlsError, RootCertStore, SignatureScheme,
};
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use lurk_proto::Transport;

use crate::config::ConnectionConfig;
use crate::error::{Result, SessionError};

/// Dials transports for one configured connection.
pub struct Connector<'a> {
    config: &'a ConnectionConfig,
}

impl<'a> Connector<'a> {
    /// Create a connector for the given connection configuration.
    pub fn new(config: &'a ConnectionConfig) -> Self {
        Self { config }
    }

    /// Open a new transport to the configured host and port.
    pub async fn connect(&self) -> Result<Transport> {
        let host = self.config.host.as_str();
        let port = self.config.effective_port();

        debug!(host, port, tls = self.config.tls, "dialing");
        let stream = TcpStream::connect((host, port)).await?;

        if !self.config.tls {
            return Ok(Transport::tcp(stream));
        }

        let connector = self.tls_connector();
        let server_name = ServerName::try_from(host.to_owned())
            .map_err(|_| SessionError::TlsName(host.to_owned()))?;
        let tls_stream = connector.connect(server_name, stream).await?;

        Ok(Transport::tls(tls_stream))
    }

    fn tls_connector(&self) -> TlsConnector {
        let config = if self.config.tls_verify {
            let mut roots = RootCertStore::empty();
            let native = rustls_native_certs::load_native_certs();
            for error in &native.errors {
                warn!(host = %self.config.host, %error, "failed to load a native root certificate");
            }
            let (added, ignored) = roots.add_parsable_certificates(native.certs);
            debug!(added, ignored, "loaded native root certificates");

            ClientConfig::builder()
                .with_root_certificates(roots)
                .with_no_client_auth()
        } else {
            warn!(
                host = %self.config.host,
                "certificate verification disabled for this connection"
            );
            ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerifier))
                .with_no_client_auth()
        };

        TlsConnector::from(Arc::new(config))
    }
}

/// Certificate verifier that accepts any certificate.
///
/// Installed only when `tls_verify = false` is set for a connection.
#[derive(Debug)]
struct NoVerifier;

impl ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA1,
            SignatureScheme::ECDSA_SHA1_Legacy,
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
            SignatureScheme::ED448,
        ]
    }
}
