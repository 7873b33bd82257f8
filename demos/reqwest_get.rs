use digest_client::{Credentials, Engine, EventLog, ReqwestTransport};
use http::Request;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    // Send a request to httpbin.org to a url that requires Digest Access Authentication
    let user = "FredJones";
    let password = "P@55w0rd!";
    let test_url = format!("http://httpbin.org/digest-auth/auth/{}/{}", user, password);

    let log = EventLog::new();
    let mut engine = Engine::new(ReqwestTransport::new()?, Credentials::new(user, password))
        .with_observer(log.clone());

    for _ in 0..2 {
        let request = Request::get(test_url.as_str()).body(Vec::new())?;
        let response = engine.execute(request).await?;
        println!("Status: {}", response.status());
        println!("Body:\n{}", String::from_utf8_lossy(response.body()));
    }

    for event in log.events() {
        println!("{}", event);
    }

    Ok(())
}
