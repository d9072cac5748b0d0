#![allow(dead_code)]

use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use serde_json::{json, Value};
use shared::capabilities::{TimerOperation, TimerOutput};
use shared::{App, Effect, Event, GalleryConfig, Model, ViewModel};
use url::Url;

pub fn test_config() -> GalleryConfig {
    GalleryConfig::default().with_access_key("test-key")
}

/// Raw photo objects shaped like the upstream API returns them.
pub fn photos(ids: &[String]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| {
                json!({
                    "id": id,
                    "urls": { "small": format!("https://images.example.com/{id}.jpg") },
                    "user": {
                        "name": format!("author of {id}"),
                        "profile_image": { "medium": format!("https://images.example.com/{id}-avatar.jpg") }
                    },
                    "likes": 1
                })
            })
            .collect(),
    )
}

pub fn ids(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("{prefix}-{n}")).collect()
}

pub fn search_body(ids: &[String]) -> Value {
    json!({ "total": ids.len(), "total_pages": 1, "results": photos(ids) })
}

pub fn ok_json(body: &Value) -> HttpResponse {
    HttpResponse::ok().body(body.to_string()).build()
}

/// Query parameters of a page request.
pub struct PageCall {
    pub path: String,
    pub query: Option<String>,
    pub page: u32,
    pub per_page: u32,
    pub client_id: String,
}

pub fn page_call(request: &Request<HttpRequest>) -> PageCall {
    let url = Url::parse(&request.operation.url).expect("request url parses");
    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    PageCall {
        path: url.path().to_string(),
        query: param("query"),
        page: param("page").and_then(|p| p.parse().ok()).expect("page param"),
        per_page: param("per_page")
            .and_then(|p| p.parse().ok())
            .expect("per_page param"),
        client_id: param("client_id").unwrap_or_default(),
    }
}

/// Drives the app the way a shell would, collecting effects as they appear.
pub struct Harness {
    pub app: AppTester<App, Effect>,
    pub model: Model,
    pub http: Vec<Request<HttpRequest>>,
    pub timers: Vec<Request<TimerOperation>>,
    pub renders: usize,
}

impl Harness {
    pub fn unconfigured() -> Self {
        Self {
            app: AppTester::default(),
            model: Model::default(),
            http: Vec::new(),
            timers: Vec::new(),
            renders: 0,
        }
    }

    pub fn new(config: GalleryConfig) -> Self {
        let mut harness = Self::unconfigured();
        harness.send(Event::Configure(Box::new(config)));
        harness
    }

    pub fn send(&mut self, event: Event) {
        let update = self.app.update(event, &mut self.model);
        self.absorb(update);
    }

    fn absorb(&mut self, update: Update<Effect, Event>) {
        for effect in update.effects {
            match effect {
                Effect::Http(request) => self.http.push(request),
                Effect::Timer(request) => self.timers.push(request),
                Effect::Render(_) => self.renders += 1,
            }
        }
        for event in update.events {
            self.send(event);
        }
    }

    pub fn type_text(&mut self, text: &str) {
        self.send(Event::QueryChanged {
            text: text.to_string(),
        });
    }

    pub fn take_http(&mut self) -> Vec<Request<HttpRequest>> {
        std::mem::take(&mut self.http)
    }

    pub fn take_one_http(&mut self) -> Request<HttpRequest> {
        let mut requests = self.take_http();
        assert_eq!(requests.len(), 1, "expected exactly one page request");
        requests.remove(0)
    }

    /// Removes and returns every `Start` timer request, oldest first.
    pub fn take_started_timers(&mut self) -> Vec<Request<TimerOperation>> {
        let (started, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|r| matches!(r.operation, TimerOperation::Start { .. }));
        self.timers = rest;
        started
    }

    pub fn cancelled_timers(&self) -> usize {
        self.timers
            .iter()
            .filter(|r| matches!(r.operation, TimerOperation::Cancel { .. }))
            .count()
    }

    pub fn fire(&mut self, mut timer: Request<TimerOperation>) {
        let update = self
            .app
            .resolve(&mut timer, TimerOutput::Elapsed)
            .expect("timer request resolves");
        self.absorb(update);
    }

    /// Types `text` and lets the quiet window pass.
    pub fn commit(&mut self, text: &str) {
        self.type_text(text);
        let timer = self
            .take_started_timers()
            .pop()
            .expect("typing starts a debounce timer");
        self.fire(timer);
    }

    pub fn respond(&mut self, mut request: Request<HttpRequest>, response: HttpResponse) {
        let update = self
            .app
            .resolve(&mut request, HttpResult::Ok(response))
            .expect("http request resolves");
        self.absorb(update);
    }

    pub fn respond_json(&mut self, request: Request<HttpRequest>, body: &Value) {
        self.respond(request, ok_json(body));
    }

    pub fn view(&self) -> ViewModel {
        self.app.view(&self.model)
    }

    pub fn image_ids(&self) -> Vec<String> {
        self.view()
            .images
            .into_iter()
            .map(|image| image.id.to_string())
            .collect()
    }
}
