//! Client-side HTTP Digest Access Authentication, as specified by IETF RFC2069, RFC2617 and RFC7616.
//!
//! The building blocks can be used directly:
//!
//! ```
//! use digest_client::{authorization, compute, Challenge, Credentials, NonceSession, RequestContext};
//! use http::Method;
//!
//! let challenge = Challenge::parse(
//!     r#"Digest realm="http-auth@example.org", qop="auth, auth-int", algorithm=SHA-256, nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v""#,
//! ).unwrap();
//! let credentials = Credentials::new("Mufasa", "Circle of Life");
//! let request = RequestContext::new(Method::GET, "/dir/index.html");
//!
//! let session = NonceSession::establish(&challenge);
//! let digest = compute(&credentials, &challenge, &session, &request).unwrap();
//! let header = authorization::build(&credentials, &challenge, &session, &request, digest);
//! assert!(header.starts_with("Digest username=\"Mufasa\""));
//!
//! // The next request on the same nonce uses the successor session.
//! let session = session.advance().unwrap();
//! assert_eq!(session.nc().to_string(), "00000002");
//! ```
//!
//! or an [`Engine`] can drive the whole 401 handshake over any [`Transport`].

pub mod algorithm;
pub mod authorization;
pub mod challenge;
mod engine;
mod error;
pub mod events;
pub mod response;
pub mod session;
mod transport;

pub use algorithm::{Algorithm, HashFunction};
pub use authorization::AuthorizationFields;
pub use challenge::{Challenge, Qop};
pub use engine::{Engine, State};
pub use error::{BoxError, Error, Result};
pub use events::{AuthEvent, EventLog, Observer, Stage};
pub use response::{compute, select_qop, Credentials, DigestResponse, RequestContext};
pub use session::{NonceCount, NonceSession};
#[cfg(feature = "reqwest-transport")]
pub use transport::ReqwestTransport;
pub use transport::{DigestTransport, Transport, TransportConfig, DEFAULT_TIMEOUT};

#[cfg(test)]
mod tests {
    use crate::{
        authorization, challenge::parse_directives, compute, Challenge, Credentials, NonceSession,
        RequestContext,
    };
    use http::Method;
    use std::collections::HashMap;

    fn authorize(
        challenge: &str,
        username: &str,
        password: &str,
        uri: &str,
        cnonce: &str,
    ) -> String {
        let challenge = challenge.parse::<Challenge>().unwrap();
        let credentials = Credentials::new(username, password);
        let session = NonceSession::with_cnonce(&challenge, cnonce);
        let request = RequestContext::new(Method::GET, uri);
        let digest = compute(&credentials, &challenge, &session, &request).unwrap();
        authorization::build(&credentials, &challenge, &session, &request, digest)
    }

    #[test]
    fn rfc2069() {
        let rfc2069_test = r#"Digest realm="testrealm@host.com", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#;
        assert_eq!(
            authorize(rfc2069_test, "Mufasa", "CircleOfLife", "/dir/index.html", "unused"),
            r#"Digest username="Mufasa", realm="testrealm@host.com", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", uri="/dir/index.html", response="1949323746fe6a43ef61f9606e7febea", opaque="5ccc069c403ebaf9f0171e9517f40e41""#
        );
    }

    #[test]
    fn rfc2617() {
        let rfc2617_test = r#"Digest realm="testrealm@host.com", qop="auth", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#;
        assert_eq!(
            authorize(rfc2617_test, "Mufasa", "Circle Of Life", "/dir/index.html", "0a4f113b"),
            r#"Digest username="Mufasa", realm="testrealm@host.com", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", uri="/dir/index.html", qop=auth, nc=00000001, cnonce="0a4f113b", response="6629fae49393a05397450978507c4ef1", opaque="5ccc069c403ebaf9f0171e9517f40e41""#
        );
    }

    #[test]
    fn rfc7616_md5() {
        let rfc7616_test = r#"Digest
        realm="http-auth@example.org",
        qop="auth, auth-int",
        algorithm=MD5,
        nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v",
        opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS""#;

        assert_eq!(
            authorize(
                rfc7616_test,
                "Mufasa",
                "Circle of Life",
                "/dir/index.html",
                "f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ"
            ),
            r#"Digest username="Mufasa", realm="http-auth@example.org", nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v", uri="/dir/index.html", qop=auth, algorithm=MD5, nc=00000001, cnonce="f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ", response="8ca523f5e9506fed4657c9700eebdbec", opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS""#
        );
    }

    #[test]
    fn rfc7616_md5_second_request() {
        let challenge: Challenge = r#"Digest realm="http-auth@example.org", qop="auth, auth-int", algorithm=MD5, nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v""#.parse().unwrap();
        let credentials = Credentials::new("Mufasa", "Circle of Life");
        let request = RequestContext::new(Method::GET, "/dir/index.html");
        let cnonce = "f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ";
        let session = NonceSession::with_cnonce(&challenge, cnonce).advance().unwrap();
        let digest = compute(&credentials, &challenge, &session, &request).unwrap();
        assert_eq!(digest.response, "4b5d595ecf2db9df612ea5b45cd97101");
    }

    #[test]
    fn rfc7616_sha256() {
        let rfc7616_test = r#"Digest
        realm="http-auth@example.org",
        qop="auth, auth-int",
        algorithm=SHA-256,
        nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v",
        opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS""#;

        assert_eq!(
            authorize(
                rfc7616_test,
                "Mufasa",
                "Circle of Life",
                "/dir/index.html",
                "f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ"
            ),
            r#"Digest username="Mufasa", realm="http-auth@example.org", nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v", uri="/dir/index.html", qop=auth, algorithm=SHA-256, nc=00000001, cnonce="f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ", response="753927fa0e85d155564e2e272a28d1802ca10daf4496794697cf8db5856cb6c1", opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS""#
        );
    }

    #[test]
    fn rfc7616_userhash_512_256() {
        let rfc7616_test = r#"Digest
        realm="api@example.org",
        qop="auth",
        algorithm=SHA-512-256,
        nonce="5TsQWLVdgBdmrQ0XsxbDODV+57QdFR34I9HAbC/RVvkK",
        opaque="HRPCssKJSGjCrkzDg8OhwpzCiGPChXYjwrI2QmXDnsOS",
        charset=UTF-8,
        userhash=true"#;

        // Expected results from erata page
        assert_eq!(
            authorize(
                rfc7616_test,
                "Jäsøn Doe",
                "Secret, or not?",
                "/doe.json",
                "NTg6RKcb9boFIAS3KrFK9BGeh+iDa/sm6jUMp2wds69v"
            ),
            r#"Digest username="793263caabb707a56211940d90411ea4a575adeccb7e360aeb624ed06ece9b0b", realm="api@example.org", nonce="5TsQWLVdgBdmrQ0XsxbDODV+57QdFR34I9HAbC/RVvkK", uri="/doe.json", qop=auth, algorithm=SHA-512-256, nc=00000001, cnonce="NTg6RKcb9boFIAS3KrFK9BGeh+iDa/sm6jUMp2wds69v", response="3798d4131c277846293534c3edc11bd8a5e4cdcbff78b05db9d95eeb1cec68a5", opaque="HRPCssKJSGjCrkzDg8OhwpzCiGPChXYjwrI2QmXDnsOS", userhash=true"#
        );
    }

    #[test]
    fn rechallenge_with_same_nonce_is_reproducible() {
        let challenge = r#"Digest realm="api@example.org", qop="auth", nonce="abc", opaque="o""#;
        let header = authorize(challenge, "Mufasa", "Circle of Life", "/x?y=1", "cn");

        // Re-challenge with the realm, nonce and opaque the client echoed back.
        let fields: HashMap<String, String> =
            parse_directives(header.strip_prefix("Digest ").unwrap())
                .unwrap()
                .into_iter()
                .collect();
        assert_eq!(fields["nc"], "00000001");
        let rechallenge = format!(
            r#"Digest realm="{}", qop="{}", nonce="{}", opaque="{}""#,
            fields["realm"], fields["qop"], fields["nonce"], fields["opaque"]
        );
        let again = authorize(
            &rechallenge,
            &fields["username"],
            "Circle of Life",
            &fields["uri"],
            &fields["cnonce"],
        );
        assert_eq!(again, header);
    }
}
