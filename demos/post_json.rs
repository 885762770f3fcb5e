use jsonweb_http::{ClientOptions, JsonObject, JsonWebClient, Method, Url};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let url = Url::parse(
        &args
            .next()
            .ok_or_else(|| anyhow::anyhow!("usage: post_json <url> [json-object]"))?,
    )?;
    let body: JsonObject = match args.next() {
        Some(text) => serde_json::from_str(&text)?,
        None => JsonObject::new(),
    };

    let client = JsonWebClient::new().with_options(ClientOptions {
        max_attempts: 3,
        timeout_ms: 5_000,
        log_response_body: false,
    });

    let reply = client.send(url, Method::POST, body).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);

    Ok(())
}
