use criterion::{criterion_group, criterion_main, Criterion};
use digest_client::{authorization, compute, Challenge, Credentials, NonceSession, RequestContext};
use http::Method;

fn full_cycle(c: &mut Criterion) {
    let rfc7616_test = r#"Digest
    realm="api@example.org",
    qop="auth",
    algorithm=SHA-512-256,
    nonce="5TsQWLVdgBdmrQ0XsxbDODV+57QdFR34I9HAbC/RVvkK",
    opaque="HRPCssKJSGjCrkzDg8OhwpzCiGPChXYjwrI2QmXDnsOS",
    charset=UTF-8,
    userhash=true"#;

    c.bench_function("parse", |b| {
        b.iter(|| rfc7616_test.parse::<Challenge>().unwrap())
    });

    let challenge = rfc7616_test.parse::<Challenge>().unwrap();
    let credentials = Credentials::new("Jäsøn Doe", "Secret, or not?");
    let request = RequestContext::new(Method::GET, "/doe.json");
    let session =
        NonceSession::with_cnonce(&challenge, "NTg6RKcb9boFIAS3KrFK9BGeh+iDa/sm6jUMp2wds69v");

    c.bench_function("compute response", |b| {
        b.iter(|| compute(&credentials, &challenge, &session, &request).unwrap())
    });

    c.bench_function("generate authorization", |b| {
        b.iter(|| {
            let digest = compute(&credentials, &challenge, &session, &request).unwrap();
            authorization::build(&credentials, &challenge, &session, &request, digest)
        })
    });

    c.bench_function("advance session", |b| {
        b.iter(|| session.advance().unwrap())
    });
}

criterion_group!(benches, full_cycle);
criterion_main!(benches);
