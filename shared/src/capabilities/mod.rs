mod http;
mod timer;

pub use self::http::{
    decode_body, decode_page, Endpoint, HttpError, PhotoApi, ValidatedUrl, MAX_RESPONSE_BODY_SIZE,
    MAX_URL_LENGTH,
};
pub use self::timer::{Timer, TimerId, TimerOperation, TimerOutput};

// We use Crux's built-in Render and Http capabilities directly; only the
// debounce timer needs a shell operation of our own.
pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub timer: Timer<Event>,
}
