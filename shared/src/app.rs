use tracing::{debug, info, warn};

use crate::capabilities::{decode_page, Capabilities, Endpoint, TimerOutput};
use crate::config::GalleryConfig;
use crate::event::{Event, PageResult};
use crate::model::{Model, ViewModel};
use crate::pagination::{Completion, PageRequest};
use crate::FetchError;

#[derive(Default)]
pub struct App;

impl App {
    fn configure(config: GalleryConfig, model: &mut Model, caps: &Capabilities) {
        if let Err(e) = config.validate() {
            warn!(error = %e, "rejecting configuration");
            model.config_error = Some(e.to_string());
            return;
        }

        info!(
            page_size = config.page_size,
            debounce_ms = config.debounce_ms,
            has_more = ?config.has_more,
            duplicates = ?config.duplicates,
            "configured"
        );
        let interrupted = model.reconfigure(config);

        let committed = model.debouncer.committed().to_string();
        Self::observe_committed(&committed, model, caps);

        // typing was still settling; restart its quiet window under the new config
        if let Some(ticket) = interrupted {
            caps.timer.cancel(ticket);
            let raw = model.debouncer.raw().to_string();
            debug!(%ticket, "rescheduling debounce after reconfigure");
            Self::query_changed(raw, model, caps);
        }
    }

    fn query_changed(text: String, model: &mut Model, caps: &Capabilities) {
        let scheduled = model.debouncer.input(text);
        if let Some(previous) = scheduled.cancelled {
            caps.timer.cancel(previous);
        }

        let ticket = scheduled.ticket;
        caps.timer.start(ticket, model.debouncer.quiet_ms(), move |outcome| {
            Event::DebounceTimer { ticket, outcome }
        });
    }

    fn observe_committed(query: &str, model: &mut Model, caps: &Capabilities) {
        if let Some(request) = model.fetcher.observe(query) {
            info!(query, "query committed");
            Self::request_page(request, model, caps);
        }
    }

    fn request_page(request: PageRequest, model: &mut Model, caps: &Capabilities) {
        let url = match &model.api {
            Some(api) => api.page_url(&request).map_err(|e| FetchError::InvalidRequest {
                reason: e.to_string(),
            }),
            None => Err(FetchError::InvalidRequest {
                reason: "photo API is not configured".to_string(),
            }),
        };

        match url {
            Ok(url) => {
                debug!(query = %request.query, page = request.page, "requesting page");
                caps.http
                    .get(url.as_str())
                    .send(move |result| Event::PageFetched {
                        request,
                        result: Box::new(result),
                    });
            }
            Err(e) => {
                warn!(error = %e, page = request.page, "could not build page request");
                model.fetcher.complete(&request, Err(e));
            }
        }
    }

    fn page_fetched(request: &PageRequest, result: PageResult, model: &mut Model) -> bool {
        let outcome = decode_page(Endpoint::for_query(&request.query), result);

        match model.fetcher.complete(request, outcome) {
            Completion::Appended { page, records } => {
                debug!(query = %request.query, page, records, "page applied");
                true
            }
            Completion::Failed => {
                if let Some(error) = model.fetcher.error() {
                    warn!(query = %request.query, page = request.page, error = %error, "page fetch failed");
                }
                true
            }
            Completion::Stale => {
                debug!(
                    query = %request.query,
                    page = request.page,
                    "discarding result for abandoned request"
                );
                false
            }
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(event = event.name(), "update");

        match event {
            Event::Configure(config) => {
                Self::configure(*config, model, caps);
                caps.render.render();
            }

            Event::QueryChanged { text } => {
                Self::query_changed(text, model, caps);
                caps.render.render();
            }

            Event::DebounceTimer { ticket, outcome } => {
                if outcome != TimerOutput::Elapsed {
                    return;
                }
                let Some(committed) = model.debouncer.elapsed(ticket).map(str::to_string) else {
                    debug!(%ticket, "ignoring stale debounce timer");
                    return;
                };
                Self::observe_committed(&committed, model, caps);
                caps.render.render();
            }

            Event::LoadMore => match model.fetcher.load_more() {
                Some(request) => {
                    Self::request_page(request, model, caps);
                    caps.render.render();
                }
                None => debug!("load more ignored"),
            },

            Event::PageFetched { request, result } => {
                if Self::page_fetched(&request, *result, model) {
                    caps.render.render();
                }
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let fetcher = &model.fetcher;
        let error = model
            .config_error
            .clone()
            .or_else(|| fetcher.error().map(ToString::to_string));

        ViewModel {
            query: model.debouncer.raw().to_string(),
            committed_query: fetcher.query().unwrap_or_default().to_string(),
            images: fetcher.images().cloned().collect(),
            is_loading: fetcher.is_loading(),
            is_fetching_next: fetcher.is_fetching_next(),
            has_more: fetcher.has_more(),
            can_load_more: fetcher.collection().is_some()
                && fetcher.outstanding().is_none()
                && fetcher.has_more(),
            is_debouncing: model.debouncer.is_pending(),
            error,
        }
    }
}
