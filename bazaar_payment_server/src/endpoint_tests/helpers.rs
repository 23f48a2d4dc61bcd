use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use log::debug;

pub async fn get_request(path: &str, configure: impl FnOnce(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    send(TestRequest::get().uri(path), configure).await
}

pub async fn post_request(
    path: &str,
    body: impl Into<String>,
    configure: impl FnOnce(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req =
        TestRequest::post().uri(path).insert_header(("content-type", "application/json")).set_payload(body.into());
    send(req, configure).await
}

async fn send(req: TestRequest, configure: impl FnOnce(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
