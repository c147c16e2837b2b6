mod harness;

use harness::config::ConfigBuilder;
use harness::server::TestServer;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

fn file(name: &str, contents: &'static [u8]) -> Part {
    Part::bytes(contents)
        .file_name(name.to_owned())
        .mime_str("application/octet-stream")
        .unwrap()
}

async fn upload(server: &TestServer, form: Form) -> (u16, Value) {
    let resp = server
        .client()
        .post(server.url("/api/uploads"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    (resp.status().as_u16(), resp.json().await.unwrap())
}

#[tokio::test]
async fn accepted_upload_is_described() {
    let server = TestServer::start(ConfigBuilder::new().with_upload_limits(64, 2).build())
        .await
        .unwrap();

    let form = Form::new()
        .text("project", "launchpad-web")
        .part("bundle", file("bundle.tar", b"0123456789"));
    let (status, body) = upload(&server, form).await;

    assert_eq!(status, 200);
    assert_eq!(
        body["data"]["files"],
        json!([{
            "name": "bundle",
            "file_name": "bundle.tar",
            "content_type": "application/octet-stream",
            "size": 10,
        }])
    );
}

#[tokio::test]
async fn oversized_file() {
    let server = TestServer::start(ConfigBuilder::new().with_upload_limits(8, 2).build())
        .await
        .unwrap();

    let (status, body) = upload(&server, Form::new().part("bundle", file("bundle.tar", &[0; 64]))).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "File too large");
}

#[tokio::test]
async fn too_many_files() {
    let server = TestServer::start(ConfigBuilder::new().with_upload_limits(64, 1).build())
        .await
        .unwrap();

    let form = Form::new()
        .part("first", file("a.txt", b"a"))
        .part("second", file("b.txt", b"b"));
    let (status, body) = upload(&server, form).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"]["message"], "Too many files");
}

#[tokio::test]
async fn not_multipart() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server
        .client()
        .post(server.url("/api/uploads"))
        .body("plain")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["fields"], json!(["body"]));
}
