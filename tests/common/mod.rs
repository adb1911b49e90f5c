#![allow(dead_code)]

use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use contact_relay::contact::Field;
use contact_relay::dispatch::{Dispatcher, RelayConfig, TemplatedApiConfig};
use contact_relay::telemetry::init_subscriber_once;
use contact_relay::workflow::ContactWorkflow;
use std::io::{sink, stdout};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MAILBOX: &str = "inbox@example.com";

/// What the fake provider answers with.
#[derive(Clone)]
pub enum Reply {
    Json(u16, serde_json::Value),
    Text(u16, String),
    Delayed(Duration, Box<Reply>),
}

#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub path: String,
    pub content_type: String,
    pub body: String,
}

struct FakeState {
    reply: Reply,
    received: Mutex<Vec<ReceivedRequest>>,
}

pub struct FakeProvider {
    pub address: String,
    state: Arc<FakeState>,
}

impl FakeProvider {
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            endpoint: self.address.parse().unwrap(),
            mailbox: Some(MAILBOX.to_owned()),
            subject_line: "New Contact Form Submission".to_owned(),
            template: "table".to_owned(),
            captcha: false,
            next_url: None,
        }
    }

    pub fn templated_config(&self) -> TemplatedApiConfig {
        TemplatedApiConfig {
            endpoint: format!("{}/api/v1.0/email/send", self.address)
                .parse()
                .unwrap(),
            service_id: "service_test".to_owned(),
            template_id: "template_contact".to_owned(),
        }
    }

    /// Poll until at least one request arrived or `patience` ran out.
    pub async fn wait_for_request(&self, patience: Duration) -> Option<ReceivedRequest> {
        let deadline = tokio::time::Instant::now() + patience;
        while tokio::time::Instant::now() < deadline {
            if let Some(request) = self.received().into_iter().next() {
                return Some(request);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        None
    }
}

async fn record(request: HttpRequest, body: web::Bytes, state: web::Data<FakeState>) -> HttpResponse {
    state.received.lock().unwrap().push(ReceivedRequest {
        path: request.path().to_owned(),
        content_type: request
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });
    let mut reply = state.reply.clone();
    loop {
        match reply {
            Reply::Json(status, value) => {
                return HttpResponse::build(StatusCode::from_u16(status).unwrap()).json(value)
            }
            Reply::Text(status, text) => {
                return HttpResponse::build(StatusCode::from_u16(status).unwrap())
                    .content_type("text/plain")
                    .body(text)
            }
            Reply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
        }
    }
}

pub fn init_tracing() {
    if std::env::var("TEST_LOG").is_ok() {
        init_subscriber_once("test", "debug", stdout);
    } else {
        init_subscriber_once("test", "debug", sink);
    }
}

// Launch a fake relay / templated API in the background on a random port
pub fn launch_fake_provider(reply: Reply) -> FakeProvider {
    init_tracing();
    let local_addr = "127.0.0.1";
    let listener = TcpListener::bind((local_addr, 0)).expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(FakeState {
        reply,
        received: Mutex::new(Vec::new()),
    });
    let app_state = web::Data::from(state.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .default_service(web::to(record))
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to listen on address")
    .run();
    let _ = tokio::spawn(server);
    FakeProvider {
        address: format!("http://{}:{}", local_addr, port),
        state,
    }
}

/// Address of a port nobody listens on.
pub fn unreachable_address() -> String {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn fill_jane<D: Dispatcher>(workflow: &mut ContactWorkflow<D>) {
    workflow.set_field(Field::Name, "Jane Doe");
    workflow.set_field(Field::Email, "jane@example.com");
    workflow.set_field(Field::Subject, "Project Inquiry");
    workflow.set_field(Field::Message, "I would like a quote.");
}
